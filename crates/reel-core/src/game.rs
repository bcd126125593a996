//! The simulation seam.
//!
//! [`Game`] is the contract a simulation implements to become
//! recordable and replayable. The engine drives it exclusively through
//! this trait: fixed-dt updates with an explicit random source, string
//! action dispatch, and an input device it can swap out for playback.

use crate::input::InputDevice;
use crate::rng::RandSource;

/// Coarse lifecycle phase of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GamePhase {
    /// No run in progress.
    Menu,
    /// A run is being simulated.
    Playing,
    /// The run has ended; simulation updates are no-ops.
    Over,
}

impl GamePhase {
    /// Whether the current run has ended.
    pub fn is_over(self) -> bool {
        matches!(self, GamePhase::Over)
    }
}

/// Error raised by a simulation step.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GameError {
    /// The update could not be applied.
    UpdateFailed {
        /// Why the step failed.
        reason: String,
    },
    /// The simulation detected a non-finite value in its own state,
    /// which would make every later tick unreproducible.
    NonFiniteState {
        /// Where the bad value was found.
        detail: String,
    },
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameError::UpdateFailed { reason } => {
                write!(f, "simulation update failed: {reason}")
            }
            GameError::NonFiniteState { detail } => {
                write!(f, "non-finite simulation state: {detail}")
            }
        }
    }
}

impl std::error::Error for GameError {}

/// A fixed-timestep simulation the engine can record and replay.
///
/// Implementations must keep all nondeterminism behind the `rand`
/// argument of [`update`](Game::update) and all input behind the
/// installed [`InputDevice`]. Under those two rules, a run is fully
/// determined by its seed, rng tape, and tick records.
pub trait Game {
    /// Advance the simulation by `dt` seconds.
    ///
    /// Called with a constant `dt` for every tick of a run. All random
    /// values consumed during the step must come from `rand`.
    fn update(&mut self, dt: f64, rand: &mut dyn RandSource) -> Result<(), GameError>;

    /// Draw the current state. Never advances the simulation.
    fn render(&mut self);

    /// Apply a discrete action by id.
    ///
    /// Unknown ids must be ignored, not errors; replays may carry
    /// actions from newer builds.
    fn handle_action(&mut self, id: &str);

    /// Reset per-run state and enter [`GamePhase::Playing`].
    fn start_run(&mut self);

    /// Current lifecycle phase.
    fn phase(&self) -> GamePhase;

    /// Replace the polled input device, returning the previous one.
    ///
    /// Playback installs a scripted device and restores the original
    /// afterwards, whatever the outcome.
    fn swap_input(&mut self, device: Box<dyn InputDevice>) -> Box<dyn InputDevice>;

    /// Install a dedicated random stream for background cosmetics.
    ///
    /// Optional: games without seeded cosmetics ignore it. Cosmetic
    /// streams are derived from the run seed but kept separate from
    /// gameplay randomness, so a skipped particle never shifts the
    /// gameplay sequence.
    fn set_background_rand(&mut self, source: Box<dyn RandSource>) {
        let _ = source;
    }

    /// Install a dedicated random stream for visual effects. Optional,
    /// as [`set_background_rand`](Game::set_background_rand).
    fn set_visual_rand(&mut self, source: Box<dyn RandSource>) {
        let _ = source;
    }
}
