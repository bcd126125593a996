//! The randomness seam.
//!
//! All nondeterminism enters the simulation through a single trait,
//! [`RandSource`], so that recording can intercept every draw and
//! playback can substitute a recorded tape. [`SeededStream`] derives a
//! reproducible stream from a string seed; [`PlatformSource`] draws
//! from the operating system's thread RNG for ordinary interactive
//! play. [`RandContext`] holds whichever source is currently installed
//! and pairs every install with an explicit hand-back of the previous
//! source.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

// ── RandSource ─────────────────────────────────────────────────────

/// A supplier of random values in `[0, 1)`.
///
/// The simulation must request every random number it consumes through
/// this trait. A tick that draws the same number of values in the same
/// order on record and on playback is reproducible; any other entropy
/// breaks determinism.
pub trait RandSource: Send {
    /// The next value in `[0, 1)`.
    fn draw(&mut self) -> f64;

    /// Number of draws this source served from a degraded fallback
    /// path rather than its primary stream.
    ///
    /// Always zero except for tape playback that ran past the end of
    /// its recording (see [`TapePlayer`](crate::tape::TapePlayer)).
    fn fallback_draws(&self) -> u64 {
        0
    }
}

// ── Seed hashing ───────────────────────────────────────────────────

/// Reduce a string seed to a 64-bit generator seed (FNV-1a).
///
/// Distinct seed strings map to distinct generator states with
/// overwhelming probability, and the mapping is stable across builds
/// and platforms, which is what replay reproducibility requires.
pub fn seed_hash(seed: &str) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in seed.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

// ── SeededStream ───────────────────────────────────────────────────

/// A deterministic random stream derived from a string seed.
///
/// Two streams built from the same seed yield identical sequences;
/// different seeds yield independent sequences. Used for gameplay RNG
/// during seeded runs and for cosmetic streams (background, visual
/// effects) derived from the run seed.
#[derive(Clone, Debug)]
pub struct SeededStream {
    rng: ChaCha8Rng,
}

impl SeededStream {
    /// Create a stream for the given seed string.
    pub fn new(seed: &str) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed_hash(seed)),
        }
    }
}

impl RandSource for SeededStream {
    fn draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

// ── PlatformSource ─────────────────────────────────────────────────

/// The platform's thread-local RNG, for ordinary unseeded play.
///
/// Not reproducible. Recording wraps this (or a [`SeededStream`]) in a
/// tape recorder so the drawn values can be replayed later.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlatformSource;

impl RandSource for PlatformSource {
    fn draw(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

// ── RandContext ────────────────────────────────────────────────────

/// The currently-installed random source.
///
/// There is no process-wide global: the context is owned by whichever
/// component orchestrates the simulation (typically the playback
/// session) and is passed into [`Game::update`](crate::game::Game::update)
/// each tick. [`install`](RandContext::install) returns the previous
/// source so that every swap can be undone exactly; recording and
/// playback both rely on that pairing to leave live play untouched.
pub struct RandContext {
    source: Box<dyn RandSource>,
}

impl RandContext {
    /// A context drawing from the platform RNG.
    pub fn new() -> Self {
        Self::with_source(Box::new(PlatformSource))
    }

    /// A context drawing from the given source.
    pub fn with_source(source: Box<dyn RandSource>) -> Self {
        Self { source }
    }

    /// Install a new source, returning the one it replaces.
    pub fn install(&mut self, source: Box<dyn RandSource>) -> Box<dyn RandSource> {
        std::mem::replace(&mut self.source, source)
    }

    /// The installed source.
    pub fn source(&self) -> &dyn RandSource {
        &*self.source
    }

    /// The installed source, mutably. Pass this to the simulation's
    /// update call.
    pub fn source_mut(&mut self) -> &mut dyn RandSource {
        &mut *self.source
    }

    /// Draw one value from the installed source.
    pub fn draw(&mut self) -> f64 {
        self.source.draw()
    }
}

impl Default for RandContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RandContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandContext").finish_non_exhaustive()
    }
}
