//! Error types for replay playback.

use std::fmt;

use reel_core::GameError;

/// Errors that can occur while driving a replay.
#[derive(Debug)]
pub enum PlaybackError {
    /// The capture surface supports neither vp9 nor vp8 webm, or
    /// cannot vend a recorder right now.
    CaptureUnsupported,
    /// Capture started but could not be completed.
    CaptureFailed {
        /// What went wrong.
        reason: String,
    },
    /// The simulation failed while replaying a tick.
    Game(GameError),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaptureUnsupported => {
                write!(f, "capture not supported by this surface")
            }
            Self::CaptureFailed { reason } => write!(f, "capture failed: {reason}"),
            Self::Game(e) => write!(f, "game error during playback: {e}"),
        }
    }
}

impl std::error::Error for PlaybackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Game(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GameError> for PlaybackError {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}
