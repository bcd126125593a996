//! Input sampling types.
//!
//! The simulation polls an [`InputDevice`] once per tick rather than
//! reacting to events, so a tick's input is a plain value that can be
//! recorded and fed back during playback.

/// Directional movement intent sampled for one tick.
///
/// Components are normally in `[-1, 1]` (keyboard axes) but may carry
/// analog magnitudes; the simulation interprets them.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveIntent {
    /// Horizontal axis, positive rightward.
    pub dx: f64,
    /// Vertical axis, positive downward.
    pub dy: f64,
}

impl MoveIntent {
    /// An intent with the given axes.
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Pointer position sampled for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursor {
    /// Horizontal position in world units.
    pub x: f64,
    /// Vertical position in world units.
    pub y: f64,
    /// Whether a pointer position was available this tick. When
    /// `false` the coordinates are meaningless and aiming mechanics
    /// should fall back to their directional defaults.
    pub has: bool,
}

impl Cursor {
    /// A present cursor at the given position.
    pub fn at(x: f64, y: f64) -> Self {
        Self { x, y, has: true }
    }
}

/// Source of per-tick input samples.
///
/// Live play backs this with real key and pointer state; playback
/// substitutes a device scripted from the recorded tick stream. The
/// swap happens through [`Game::swap_input`](crate::game::Game::swap_input)
/// so the simulation never knows which kind it is polling.
pub trait InputDevice: Send {
    /// Movement intent for the current tick.
    fn move_intent(&self) -> MoveIntent;

    /// Pointer state for the current tick.
    fn cursor(&self) -> Cursor;

    /// Clear any held state (pressed keys, stale pointer) so the next
    /// sample starts neutral.
    fn reset(&mut self);
}
