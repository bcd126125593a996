//! The per-tick record.

use crate::action::Action;
use crate::input::{Cursor, MoveIntent};

/// Everything external the simulation consumed on one tick.
///
/// A run is replayed by feeding these records back in order at the
/// fixed timestep: the movement sample, the cursor sample, and any
/// actions dispatched before the physics update. Randomness is not
/// stored here; it travels on the run's rng tape.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickRecord {
    /// Movement intent sampled for this tick.
    pub movement: MoveIntent,
    /// Cursor state sampled for this tick.
    pub cursor: Cursor,
    /// Actions dispatched this tick, in dispatch order. `None` when
    /// there were none, which keeps the common case out of the
    /// serialized form entirely.
    pub actions: Option<Vec<Action>>,
}

impl TickRecord {
    /// A record for one tick. An empty `actions` vec is stored as
    /// `None`.
    pub fn new(movement: MoveIntent, cursor: Cursor, actions: Vec<Action>) -> Self {
        Self {
            movement,
            cursor,
            actions: if actions.is_empty() {
                None
            } else {
                Some(actions)
            },
        }
    }

    /// The actions dispatched this tick, empty when none were.
    pub fn actions(&self) -> &[Action] {
        self.actions.as_deref().unwrap_or(&[])
    }
}
