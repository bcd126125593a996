//! The in-memory replay artifact.

use reel_core::{RandSource, SeededStream, TapePlayer, TickRecord};

/// A recorded run: seed, per-tick input records, and the rng tape.
///
/// Built incrementally by a [`ReplayRecorder`](crate::recorder::ReplayRecorder)
/// and frozen when the run ends. A frozen run carries everything a
/// deterministic re-run needs; [`playback_source`](ReplayRun::playback_source)
/// and the cosmetic source constructors hand back the random streams
/// to install before replaying.
#[derive(Clone, Debug)]
pub struct ReplayRun {
    seed: String,
    ticks: Vec<TickRecord>,
    rng_tape: Vec<f64>,
    ended: bool,
}

impl ReplayRun {
    pub(crate) fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            ticks: Vec::new(),
            rng_tape: Vec::new(),
            ended: false,
        }
    }

    pub(crate) fn from_parts(
        seed: impl Into<String>,
        ticks: Vec<TickRecord>,
        rng_tape: Vec<f64>,
        ended: bool,
    ) -> Self {
        Self {
            seed: seed.into(),
            ticks,
            rng_tape,
            ended,
        }
    }

    pub(crate) fn push_tick(&mut self, record: TickRecord) {
        self.ticks.push(record);
    }

    /// Freeze the run with its harvested rng tape.
    pub(crate) fn finalize(&mut self, rng_tape: Vec<f64>) {
        self.rng_tape = rng_tape;
        self.ended = true;
    }

    /// The seed the run was recorded under.
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Per-tick input records, in tick order.
    pub fn ticks(&self) -> &[TickRecord] {
        &self.ticks
    }

    /// Random values drawn during the run, in draw order.
    pub fn rng_tape(&self) -> &[f64] {
        &self.rng_tape
    }

    /// Whether the run has ended and been frozen.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Whether the run can be replayed: ended, with at least one tick.
    pub fn is_replayable(&self) -> bool {
        self.ended && !self.ticks.is_empty()
    }

    /// Seed for the background cosmetic stream.
    pub fn background_seed(&self) -> String {
        format!("{}:background", self.seed)
    }

    /// Seed for the visual-effects cosmetic stream.
    pub fn visual_seed(&self) -> String {
        format!("{}:visual", self.seed)
    }

    /// The gameplay random source for replaying this run.
    ///
    /// Serves the recorded tape when one exists; a run recorded
    /// without any draws replays from the seed alone.
    pub fn playback_source(&self) -> Box<dyn RandSource> {
        if self.rng_tape.is_empty() {
            Box::new(SeededStream::new(&self.seed))
        } else {
            Box::new(TapePlayer::new(&self.seed, self.rng_tape.clone()))
        }
    }

    /// A fresh background cosmetic stream for this run.
    pub fn background_source(&self) -> Box<dyn RandSource> {
        Box::new(SeededStream::new(&self.background_seed()))
    }

    /// A fresh visual-effects cosmetic stream for this run.
    pub fn visual_source(&self) -> Box<dyn RandSource> {
        Box::new(SeededStream::new(&self.visual_seed()))
    }
}
