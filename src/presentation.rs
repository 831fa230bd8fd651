use crate::gesture::{Horizontal, SwipeDirection, Vector, Vertical};

const SCALE_STEP: f64 = 0.05;
const OFFSET_STEP_PX: f64 = 10.0;
const OPACITY_STEP: f64 = 0.2;
const DEPTH_CAP: usize = 3;
const TOP_Z_INDEX: i32 = 10;

const DRAG_ROTATION_PER_PX: f64 = 0.1;
const DRAG_FADE_PX: f64 = 300.0;
const DRAG_MIN_OPACITY: f64 = 0.7;

const EXIT_X_VW: f64 = 120.0;
const EXIT_Y_VH: f64 = 30.0;
const EXIT_ROTATION_DEG: f64 = 30.0;
const EXIT_SCALE: f64 = 0.8;

const INDICATOR_SHOW_PX: f64 = 50.0;
const INDICATOR_FULL_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardTransform {
    pub scale: f64,
    pub offset_y: f64,
    pub opacity: f64,
    pub z_index: i32,
    pub interactive: bool,
}

/// Stacked appearance for a card `depth` positions below the top. Consumed
/// cards (negative depth) are not rendered.
pub fn transform_for_depth(depth: isize) -> Option<CardTransform> {
    if depth < 0 {
        return None;
    }
    let step = (depth as usize).min(DEPTH_CAP) as f64;
    Some(CardTransform {
        scale: 1.0 - SCALE_STEP * step,
        offset_y: OFFSET_STEP_PX * step,
        opacity: 1.0 - OPACITY_STEP * step,
        z_index: TOP_Z_INDEX - step as i32,
        interactive: depth == 0,
    })
}

impl CardTransform {
    pub fn to_style(&self) -> String {
        format!(
            "transform: translateY({:.1}px) scale({:.3}); opacity: {:.2}; z-index: {}; \
             transition: transform 0.4s ease-out, opacity 0.4s ease-out;{}",
            self.offset_y,
            self.scale,
            self.opacity,
            self.z_index,
            if self.interactive {
                ""
            } else {
                " pointer-events: none;"
            }
        )
    }
}

/// Follows the pointer with no transition while a drag is live.
pub fn drag_style(offset: Vector) -> String {
    let opacity = (1.0 - offset.x.abs() / DRAG_FADE_PX).max(DRAG_MIN_OPACITY);
    format!(
        "transform: translate({:.1}px, {:.1}px) rotate({:.2}deg); opacity: {:.2}; \
         z-index: 1000; transition: none;",
        offset.x,
        offset.y,
        offset.x * DRAG_ROTATION_PER_PX,
        opacity
    )
}

pub fn exit_style(direction: SwipeDirection, exit_ms: u32) -> String {
    let sign = match direction.horizontal {
        Horizontal::Right => 1.0,
        Horizontal::Left => -1.0,
    };
    let drift = match direction.vertical {
        Some(Vertical::Down) => EXIT_Y_VH,
        Some(Vertical::Up) => -EXIT_Y_VH,
        None => 0.0,
    };
    format!(
        "transform: translate({:.0}vw, {:.0}vh) rotate({:.0}deg) scale({}); opacity: 0; \
         filter: blur(2px); z-index: 1000; pointer-events: none; \
         transition: all {}ms cubic-bezier(0.25, 0.46, 0.45, 0.94);",
        sign * EXIT_X_VW,
        drift,
        sign * EXIT_ROTATION_DEG,
        EXIT_SCALE,
        exit_ms
    )
}

pub fn return_style(return_ms: u32) -> String {
    format!(
        "transform: translate(0px, 0px) rotate(0deg) scale(1); opacity: 1; z-index: {}; \
         pointer-events: none; transition: all {}ms cubic-bezier(0.175, 0.885, 0.32, 1.275);",
        TOP_Z_INDEX, return_ms
    )
}

/// PASS / LIKE badge shown once the drag leans far enough to one side.
pub fn swipe_indicator(dx: f64) -> Option<(Horizontal, f64)> {
    if dx.abs() <= INDICATOR_SHOW_PX {
        return None;
    }
    let side = if dx > 0.0 {
        Horizontal::Right
    } else {
        Horizontal::Left
    };
    Some((side, (dx.abs() / INDICATOR_FULL_PX).min(1.0)))
}
