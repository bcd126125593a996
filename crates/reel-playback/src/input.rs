//! Scripted input for playback.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reel_core::{Cursor, InputDevice, MoveIntent};

#[derive(Clone, Copy, Debug, Default)]
struct InputFrame {
    movement: MoveIntent,
    cursor: Cursor,
}

/// Input source driven from recorded tick data.
///
/// The handle and every device it vends share one frame of state. The
/// playback driver writes each tick's recorded sample through the
/// handle; the game reads it back through the installed
/// [`InputDevice`] and cannot tell it from live hardware.
#[derive(Clone, Debug, Default)]
pub struct ReplayInput {
    frame: Arc<Mutex<InputFrame>>,
}

impl ReplayInput {
    /// A neutral input handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the movement sample for the current tick.
    pub fn set_movement(&self, movement: MoveIntent) {
        self.lock().movement = movement;
    }

    /// Set the cursor sample for the current tick.
    pub fn set_cursor(&self, cursor: Cursor) {
        self.lock().cursor = cursor;
    }

    /// Clear back to neutral input.
    pub fn reset(&self) {
        *self.lock() = InputFrame::default();
    }

    /// A device reading this handle's state, for installing into a
    /// game via [`Game::swap_input`](reel_core::Game::swap_input).
    pub fn device(&self) -> Box<dyn InputDevice> {
        Box::new(ReplayDevice {
            frame: Arc::clone(&self.frame),
        })
    }

    fn lock(&self) -> MutexGuard<'_, InputFrame> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct ReplayDevice {
    frame: Arc<Mutex<InputFrame>>,
}

impl ReplayDevice {
    fn lock(&self) -> MutexGuard<'_, InputFrame> {
        self.frame.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl InputDevice for ReplayDevice {
    fn move_intent(&self) -> MoveIntent {
        self.lock().movement
    }

    fn cursor(&self) -> Cursor {
        self.lock().cursor
    }

    fn reset(&mut self) {
        *self.lock() = InputFrame::default();
    }
}
