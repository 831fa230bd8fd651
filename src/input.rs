use web_sys::{Element, PointerEvent};
use wasm_bindgen::JsCast;

use crate::gesture::{Horizontal, Vector};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenGift,
    Swipe(Horizontal),
    Reset,
}

/// Maps a `KeyboardEvent::key` to a command. While the gift is closed only
/// Enter and Space do anything.
pub fn command_for_key(key: &str, gift_open: bool) -> Option<Command> {
    if !gift_open {
        return match key {
            "Enter" | " " => Some(Command::OpenGift),
            _ => None,
        };
    }
    match key {
        "ArrowLeft" => Some(Command::Swipe(Horizontal::Left)),
        "ArrowRight" => Some(Command::Swipe(Horizontal::Right)),
        "r" | "R" => Some(Command::Reset),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub pointer_id: i32,
    pub position: Vector,
    pub time_ms: f64,
}

impl PointerSample {
    pub fn from_event(event: &PointerEvent) -> Self {
        Self {
            pointer_id: event.pointer_id(),
            position: Vector::new(f64::from(event.client_x()), f64::from(event.client_y())),
            time_ms: event.time_stamp(),
        }
    }
}

pub fn capture_pointer(event: &PointerEvent) {
    if let Some(target) = event_element(event) {
        let _ = target.set_pointer_capture(event.pointer_id());
    }
}

pub fn release_pointer(event: &PointerEvent) {
    if let Some(target) = event_element(event) {
        let _ = target.release_pointer_capture(event.pointer_id());
    }
}

/// The element under the pointer. Listeners are delegated to the mount root,
/// so `current_target` is the root and must not receive the capture.
fn event_element(event: &PointerEvent) -> Option<Element> {
    event
        .target()
        .and_then(|t| t.dyn_into::<Element>().ok())
}
