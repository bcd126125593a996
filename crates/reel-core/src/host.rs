//! The frame-scheduling seam.

/// Source of frame callbacks and wall-clock time.
///
/// Pacing policies are written against this trait instead of a
/// concrete clock so playback can run against a real display loop, a
/// headless throttle, or a scripted sequence of timestamps in tests.
/// Timestamps are milliseconds from an arbitrary origin, monotonic
/// within one host.
pub trait FrameHost {
    /// Block until the next frame boundary and return its timestamp,
    /// or `None` when no more frames will be delivered.
    fn next_frame(&mut self) -> Option<f64>;

    /// The current timestamp, without waiting for a frame.
    fn now_ms(&mut self) -> f64;

    /// Sleep for roughly `ms` milliseconds. Non-positive and
    /// non-finite durations are ignored.
    fn wait_ms(&mut self, ms: f64);

    /// Briefly yield to other work between renders. Hosts with nothing
    /// to yield to may ignore it.
    fn yield_now(&mut self) {}
}
