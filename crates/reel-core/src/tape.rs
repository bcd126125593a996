//! Recording and replaying the random stream.
//!
//! During a recorded run every value drawn from the installed
//! [`RandSource`] is appended to a shared tape. On playback a
//! [`TapePlayer`] serves the tape back verbatim, so the simulation
//! sees bit-identical randomness without re-deriving it. If playback
//! outruns the tape the player degrades to a seeded stream instead of
//! failing, and counts how many draws were served that way.

use std::sync::{Arc, Mutex};

use crate::rng::{RandSource, SeededStream};

/// Shared tape of recorded random draws.
///
/// The recorder appends through one handle while the session that owns
/// the run keeps another, so the tape can be harvested when the run
/// ends without tearing down the recorder mid-draw.
pub type TapeHandle = Arc<Mutex<Vec<f64>>>;

/// Create a new, empty shared tape.
pub fn new_tape_handle() -> TapeHandle {
    Arc::new(Mutex::new(Vec::new()))
}

// ── TapeRecorder ───────────────────────────────────────────────────

/// A [`RandSource`] that draws from a seeded stream and logs every
/// value onto a shared tape.
///
/// Installed for the duration of a recorded run. The underlying stream
/// is derived from the run seed, so a lost or truncated tape can still
/// be partially reconstructed from the seed alone.
#[derive(Debug)]
pub struct TapeRecorder {
    stream: SeededStream,
    tape: TapeHandle,
}

impl TapeRecorder {
    /// A recorder for a run with the given seed, appending to `tape`.
    pub fn new(seed: &str, tape: TapeHandle) -> Self {
        Self {
            stream: SeededStream::new(seed),
            tape,
        }
    }

    /// Number of values recorded so far.
    pub fn recorded(&self) -> usize {
        self.tape.lock().unwrap_or_else(|p| p.into_inner()).len()
    }
}

impl RandSource for TapeRecorder {
    fn draw(&mut self) -> f64 {
        let value = self.stream.draw();
        // A poisoned tape means a panic elsewhere already ended the
        // run; the partial tape is still worth keeping.
        self.tape
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(value);
        value
    }
}

// ── TapePlayer ─────────────────────────────────────────────────────

/// A [`RandSource`] that replays a recorded tape.
///
/// Values come back in recording order. Once the tape is exhausted the
/// player falls back to a stream seeded from the run seed rather than
/// panicking or repeating values; [`fallback_draws`](TapePlayer::fallback_draws)
/// reports how often that happened, which callers surface as a
/// diagnostics signal that the replay outran its recording.
#[derive(Clone, Debug)]
pub struct TapePlayer {
    tape: Vec<f64>,
    cursor: usize,
    fallback: SeededStream,
    fallback_draws: u64,
}

impl TapePlayer {
    /// A player for `tape`, with a fallback stream derived from `seed`.
    pub fn new(seed: &str, tape: Vec<f64>) -> Self {
        Self {
            tape,
            cursor: 0,
            fallback: SeededStream::new(seed),
            fallback_draws: 0,
        }
    }

    /// Index of the next value to be served.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of recorded values not yet served.
    pub fn remaining(&self) -> usize {
        self.tape.len().saturating_sub(self.cursor)
    }

    /// Number of draws served from the fallback stream.
    pub fn fallback_draws(&self) -> u64 {
        self.fallback_draws
    }
}

impl RandSource for TapePlayer {
    fn draw(&mut self) -> f64 {
        if let Some(value) = self.tape.get(self.cursor) {
            self.cursor += 1;
            return *value;
        }
        if self.fallback_draws == 0 {
            log::warn!(
                "rng tape exhausted after {} values; falling back to seeded stream",
                self.tape.len()
            );
        }
        self.fallback_draws += 1;
        self.fallback.draw()
    }

    fn fallback_draws(&self) -> u64 {
        self.fallback_draws
    }
}
