//! Replay playback for Reel: pacing policies, capture, scrubbing, and
//! the session that ties recording to playback.
//!
//! # Architecture
//!
//! - [`ReplaySession`] owns the recorder, the random context, and the
//!   scripted input; [`ReplaySession::play`] drives a complete replay
//! - [`play_ticks`] is the driver: one of three [`PacingPolicy`] modes
//!   feeds recorded ticks to the game against a [`FrameHost`]
//! - [`CaptureAdapter`] records playback frames into a media blob
//! - [`PlaybackController`] is the interactive variant, with
//!   frame-by-frame stepping and seeking for a scrub UI
//!
//! Playback is cooperative and single-threaded: the host hands out
//! frame timestamps, the driver applies recorded ticks and renders in
//! between. Every mutation a playback pass makes to the game or the
//! random context is undone before it returns, success or failure.
//!
//! [`FrameHost`]: reel_core::FrameHost

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capture;
pub mod engine;
pub mod error;
pub mod host;
pub mod input;
pub mod pacing;
pub mod scrub;
pub mod session;

pub use capture::{
    CaptureAdapter, CaptureBlob, CaptureEvent, MediaRecorder, RecordingSurface, FALLBACK_MIME,
    MIME_WEBM_VP8, MIME_WEBM_VP9,
};
pub use engine::{apply_tick, play_ticks, PlaybackReport};
pub use error::PlaybackError;
pub use host::SystemFrameHost;
pub use input::ReplayInput;
pub use pacing::{
    default_render_cadence, tick_step, DeterministicOptions, PacingPolicy, TickBudget,
    BUDGET_EPSILON, DEFAULT_CAPTURE_FPS, DEFAULT_RENDER_FPS, REPLAY_TARGET_FPS, REPLAY_TPS,
};
pub use scrub::{PlaybackController, ScrubState, MAX_SPEED, MIN_SPEED};
pub use session::{
    CaptureRequest, Overlay, PlayOptions, PlayOutcome, ReplaySession, SessionStatus,
};
