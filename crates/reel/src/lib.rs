//! Reel: deterministic record and replay for fixed-tick games.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Reel sub-crates. For most users, adding `reel` as a single
//! dependency is sufficient.
//!
//! A game becomes recordable by implementing [`prelude::Game`] and
//! funnelling all randomness through the supplied
//! [`prelude::RandSource`] and all input through its installed
//! [`prelude::InputDevice`]. The session tapes every random draw and
//! every tick's input while the run plays; replaying feeds the same
//! numbers and the same inputs back through the same fixed-dt updates,
//! which reproduces the run bit for bit.
//!
//! # Quick start
//!
//! ```rust
//! use reel::prelude::*;
//!
//! // A game whose entire state is one accumulator.
//! struct Tally {
//!     total: f64,
//!     phase: GamePhase,
//!     input: Box<dyn InputDevice>,
//! }
//!
//! struct NoInput;
//! impl InputDevice for NoInput {
//!     fn move_intent(&self) -> MoveIntent { MoveIntent::default() }
//!     fn cursor(&self) -> Cursor { Cursor::default() }
//!     fn reset(&mut self) {}
//! }
//!
//! impl Game for Tally {
//!     fn update(&mut self, dt: f64, rand: &mut dyn RandSource) -> Result<(), GameError> {
//!         self.total += rand.draw() * dt;
//!         Ok(())
//!     }
//!     fn render(&mut self) {}
//!     fn handle_action(&mut self, _id: &str) {}
//!     fn start_run(&mut self) {
//!         self.total = 0.0;
//!         self.phase = GamePhase::Playing;
//!     }
//!     fn phase(&self) -> GamePhase { self.phase }
//!     fn swap_input(&mut self, device: Box<dyn InputDevice>) -> Box<dyn InputDevice> {
//!         std::mem::replace(&mut self.input, device)
//!     }
//! }
//!
//! // Record one seeded run: the session tapes every random draw.
//! let mut game = Tally {
//!     total: 0.0,
//!     phase: GamePhase::Menu,
//!     input: Box::new(NoInput),
//! };
//! let mut session = ReplaySession::with_source(Box::new(SeededStream::new("daily-7")));
//!
//! game.start_run();
//! session.start_recording("daily-7", &mut game);
//! for _ in 0..120 {
//!     game.update(SIM_DT, session.rand_source()).unwrap();
//!     session.record_tick(MoveIntent::default(), Cursor::default(), Vec::new());
//! }
//! session.mark_ended().unwrap();
//! let live_total = game.total;
//!
//! // Replay reproduces the run bit for bit.
//! let mut host = SystemFrameHost::new();
//! let outcome = session
//!     .play(&mut game, &mut host, PlayOptions::default())
//!     .unwrap();
//! assert_eq!(outcome.report().unwrap().ticks_run, 120);
//! assert_eq!(game.total.to_bits(), live_total.to_bits());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`sim`] | `reel-core` | Game and input seams, fixed-step clock, randomness, rng tape |
//! | [`replay`] | `reel-replay` | Run recording and the upload wire format |
//! | [`playback`] | `reel-playback` | Pacing policies, capture, scrubbing, the replay session |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Simulation and input seams, fixed-step clock, and randomness
/// (`reel-core`).
///
/// Contains the [`sim::Game`] and [`sim::InputDevice`] traits a game
/// implements, the [`sim::FixedStepLoop`] that converts variable
/// frames into fixed ticks, and the rng tape types
/// ([`sim::TapeRecorder`], [`sim::TapePlayer`]) that make replays
/// deterministic.
pub use reel_core as sim;

/// Run recording and the upload wire format (`reel-replay`).
///
/// [`replay::ReplayRecorder`] accumulates a [`replay::ReplayRun`]
/// while a run plays; [`replay::build_payload`] and
/// [`replay::hydrate_payload`] convert frozen runs to and from the
/// JSON document uploaded with a score.
pub use reel_replay as replay;

/// Pacing policies, capture, scrubbing, and the replay session
/// (`reel-playback`).
///
/// [`playback::ReplaySession`] drives complete replays with guaranteed
/// restoration of the live game; [`playback::PlaybackController`] is
/// the interactive scrub-bar variant.
pub use reel_playback as playback;

/// Common imports for typical Reel usage.
///
/// ```rust
/// use reel::prelude::*;
/// ```
///
/// This imports the most frequently used types: the game and input
/// seams, the clock constants, randomness sources, recording, the wire
/// format, and the playback session.
pub mod prelude {
    // Simulation and input seams
    pub use reel_core::{
        Action, Cursor, Game, GameError, GamePhase, InputDevice, MoveIntent, TickRecord,
    };

    // Clock and randomness
    pub use reel_core::{
        FixedStepLoop, FrameHost, PlatformSource, RandSource, SeededStream, SIM_DT, SIM_TPS,
    };

    // Recording and the wire format
    pub use reel_replay::{
        build_payload, hydrate_payload, serialize_payload, PayloadLimits, ReplayRecorder,
        ReplayRun,
    };

    // Playback
    pub use reel_playback::{
        CaptureRequest, DeterministicOptions, Overlay, PacingPolicy, PlayOptions, PlayOutcome,
        PlaybackController, PlaybackError, ReplaySession, ScrubState, SessionStatus,
        SystemFrameHost,
    };
}
