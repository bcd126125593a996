//! Discrete player actions and the per-tick queue.

use smallvec::SmallVec;

use crate::input::Cursor;

/// A discrete action triggered between ticks (dash, ability, menu
/// confirm).
///
/// Actions are identified by a short string id rather than an enum so
/// the replay layer stays agnostic of any particular game's ability
/// set. An action may carry the cursor position observed at trigger
/// time; aimed abilities replay correctly even when the per-tick
/// cursor sample differs from the trigger-time one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Action {
    /// Game-defined identifier, e.g. `"dash"`.
    pub id: String,
    /// Cursor captured when the action fired, if any.
    pub cursor: Option<Cursor>,
}

impl Action {
    /// An action with no cursor attached.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cursor: None,
        }
    }

    /// Attach the cursor observed at trigger time.
    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }
}

/// Actions accumulated since the last tick, in arrival order.
///
/// Input handlers enqueue; the tick loop drains once per tick and
/// dispatches in the drained order. The inline capacity covers the
/// realistic case of a handful of triggers per tick without touching
/// the heap; the queue itself is unbounded.
#[derive(Clone, Debug, Default)]
pub struct ActionQueue {
    buf: SmallVec<[Action; 8]>,
}

impl ActionQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action, preserving arrival order.
    pub fn enqueue(&mut self, action: Action) {
        self.buf.push(action);
    }

    /// Take all queued actions, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Action> {
        self.buf.drain(..).collect()
    }

    /// Discard all queued actions.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
