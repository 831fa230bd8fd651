use crate::config::GestureConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    fn minus(self, other: Vector) -> Vector {
        Vector::new(self.x - other.x, self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vertical {
    Up,
    Down,
}

/// Two-axis release direction. `vertical` is `None` for swipes triggered by
/// buttons or keys, which carry no vertical component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeDirection {
    pub horizontal: Horizontal,
    pub vertical: Option<Vertical>,
}

impl SwipeDirection {
    pub fn from_offset(offset: Vector) -> Self {
        Self {
            horizontal: if offset.x > 0.0 {
                Horizontal::Right
            } else {
                Horizontal::Left
            },
            vertical: Some(if offset.y > 0.0 {
                Vertical::Down
            } else {
                Vertical::Up
            }),
        }
    }

    pub fn horizontal(horizontal: Horizontal) -> Self {
        Self {
            horizontal,
            vertical: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Swiped(SwipeDirection),
    Returned,
}

pub fn resolve(offset: Vector, velocity: Vector, config: &GestureConfig) -> Outcome {
    if offset.length() > config.distance_threshold || velocity.length() > config.velocity_threshold
    {
        Outcome::Swiped(SwipeDirection::from_offset(offset))
    } else {
        Outcome::Returned
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    position: Vector,
    time_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub pointer_id: i32,
    pub card: usize,
    start: Vector,
    offset: Vector,
    last: Sample,
    previous: Option<Sample>,
}

impl GestureState {
    pub fn offset(&self) -> Vector {
        self.offset
    }

    fn record(&mut self, position: Vector, time_ms: f64) {
        self.previous = Some(self.last);
        self.last = Sample { position, time_ms };
        self.offset = position.minus(self.start);
    }

    fn release_velocity(&self, release_ms: f64, window_ms: f64) -> Vector {
        let Some(previous) = self.previous else {
            return Vector::ZERO;
        };
        let dt = self.last.time_ms - previous.time_ms;
        if dt <= 0.0 || release_ms - self.last.time_ms > window_ms {
            return Vector::ZERO;
        }
        let delta = self.last.position.minus(previous.position);
        Vector::new(delta.x / dt * 1000.0, delta.y / dt * 1000.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Release {
    pub card: usize,
    pub offset: Vector,
    pub velocity: Vector,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Dragging(GestureState),
    Settling(Release),
}

/// Drag state machine for the top card: `Idle -> Dragging -> Settling -> Idle`.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureTracker {
    config: GestureConfig,
    phase: Phase,
}

impl GestureTracker {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn dragging(&self) -> Option<&GestureState> {
        match &self.phase {
            Phase::Dragging(state) => Some(state),
            _ => None,
        }
    }

    pub fn settling(&self) -> Option<&Release> {
        match &self.phase {
            Phase::Settling(release) => Some(release),
            _ => None,
        }
    }

    /// Starts a drag if nothing is in progress and `card` is the top card.
    pub fn on_start(
        &mut self,
        card: usize,
        top: Option<usize>,
        pointer_id: i32,
        position: Vector,
        time_ms: f64,
    ) -> bool {
        if !self.is_idle() || top != Some(card) {
            return false;
        }
        self.phase = Phase::Dragging(GestureState {
            pointer_id,
            card,
            start: position,
            offset: Vector::ZERO,
            last: Sample { position, time_ms },
            previous: None,
        });
        true
    }

    pub fn on_move(&mut self, pointer_id: i32, position: Vector, time_ms: f64) -> bool {
        match &mut self.phase {
            Phase::Dragging(state) if state.pointer_id == pointer_id => {
                state.record(position, time_ms);
                true
            }
            _ => false,
        }
    }

    pub fn on_end(&mut self, pointer_id: i32, position: Vector, time_ms: f64) -> Option<Release> {
        let Phase::Dragging(state) = &mut self.phase else {
            return None;
        };
        if state.pointer_id != pointer_id {
            return None;
        }
        if position != state.last.position {
            state.record(position, time_ms);
        }
        let velocity = state.release_velocity(time_ms, self.config.velocity_window_ms);
        let release = Release {
            card: state.card,
            offset: state.offset,
            velocity,
            outcome: resolve(state.offset, velocity, &self.config),
        };
        self.phase = Phase::Settling(release);
        Some(release)
    }

    /// A cancelled pointer always snaps back.
    pub fn on_cancel(&mut self, pointer_id: i32) -> Option<Release> {
        let Phase::Dragging(state) = &self.phase else {
            return None;
        };
        if state.pointer_id != pointer_id {
            return None;
        }
        let release = Release {
            card: state.card,
            offset: state.offset,
            velocity: Vector::ZERO,
            outcome: Outcome::Returned,
        };
        self.phase = Phase::Settling(release);
        Some(release)
    }

    /// Swipes `card` without a drag, e.g. from a button or arrow key.
    pub fn swipe(&mut self, card: usize, direction: SwipeDirection) -> Option<Release> {
        if !self.is_idle() {
            return None;
        }
        let release = Release {
            card,
            offset: Vector::ZERO,
            velocity: Vector::ZERO,
            outcome: Outcome::Swiped(direction),
        };
        self.phase = Phase::Settling(release);
        Some(release)
    }

    pub fn finish(&mut self) -> Option<Release> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Settling(release) => Some(release),
            other => {
                self.phase = other;
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }
}
