//! Wall-clock frame host for headless playback.

use std::time::{Duration, Instant};

use reel_core::FrameHost;

use crate::pacing::REPLAY_TARGET_FPS;

/// A [`FrameHost`] driven by the system clock.
///
/// Frames arrive at a fixed rate: `next_frame` sleeps out the
/// remainder of the current frame interval before handing back a
/// timestamp. Suits tests and server-side replay where no display
/// loop exists to supply frame callbacks.
#[derive(Debug)]
pub struct SystemFrameHost {
    origin: Instant,
    frame_budget: Duration,
    last_frame: Option<Instant>,
}

impl SystemFrameHost {
    /// A host pacing frames at [`REPLAY_TARGET_FPS`].
    pub fn new() -> Self {
        Self::with_fps(REPLAY_TARGET_FPS)
    }

    /// A host pacing frames at `fps`.
    ///
    /// Non-finite or non-positive rates fall back to 60.
    pub fn with_fps(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self {
            origin: Instant::now(),
            frame_budget: Duration::from_secs_f64(1.0 / fps),
            last_frame: None,
        }
    }

    /// Interval between frames.
    pub fn frame_budget(&self) -> Duration {
        self.frame_budget
    }
}

impl Default for SystemFrameHost {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameHost for SystemFrameHost {
    fn next_frame(&mut self) -> Option<f64> {
        if let Some(last) = self.last_frame {
            if let Some(remaining) = self.frame_budget.checked_sub(last.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
        let now = Instant::now();
        self.last_frame = Some(now);
        Some(now.duration_since(self.origin).as_secs_f64() * 1000.0)
    }

    fn now_ms(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wait_ms(&mut self, ms: f64) {
        if ms.is_finite() && ms > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(ms / 1000.0));
        }
    }

    fn yield_now(&mut self) {
        std::thread::yield_now();
    }
}
