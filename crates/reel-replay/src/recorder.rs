//! Live-run capture.

use std::sync::Arc;

use reel_core::{
    new_tape_handle, Action, ActionQueue, Cursor, Game, MoveIntent, RandContext, RandSource,
    TapeHandle, TapeRecorder, TickRecord,
};

use crate::run::ReplayRun;

/// Captures a run while it is being played live.
///
/// [`start_recording`](ReplayRecorder::start_recording) swaps a taping
/// random source into the caller's [`RandContext`] and keeps the
/// displaced source so it can be put back when the run ends. Between
/// ticks the game forwards triggered actions through
/// [`queue_action`](ReplayRecorder::queue_action); each tick the game
/// loop drains them, dispatches them, and reports the tick's input
/// sample through [`record_tick`](ReplayRecorder::record_tick).
///
/// Once [`mark_ended`](ReplayRecorder::mark_ended) freezes the run,
/// further queue and record calls are no-ops: the frozen artifact is
/// what replays, and late input must not mutate it.
pub struct ReplayRecorder {
    active: Option<ReplayRun>,
    queue: ActionQueue,
    tape: TapeHandle,
    saved_source: Option<Box<dyn RandSource>>,
}

impl ReplayRecorder {
    /// A recorder with no active run.
    pub fn new() -> Self {
        Self {
            active: None,
            queue: ActionQueue::new(),
            tape: new_tape_handle(),
            saved_source: None,
        }
    }

    /// Begin recording a fresh run under `seed`.
    ///
    /// Installs a taping random source into `rand` and seeds the
    /// game's cosmetic streams from the run seed. Restarting while a
    /// recording is active abandons the old run but keeps the source
    /// saved at the first start, which is the true pre-recording one.
    pub fn start_recording(
        &mut self,
        seed: &str,
        game: &mut dyn Game,
        rand: &mut RandContext,
    ) -> &ReplayRun {
        self.tape = new_tape_handle();
        self.queue.clear();

        let displaced = rand.install(Box::new(TapeRecorder::new(seed, Arc::clone(&self.tape))));
        if self.saved_source.is_none() {
            self.saved_source = Some(displaced);
        }

        let run = self.active.insert(ReplayRun::new(seed));
        game.set_background_rand(run.background_source());
        game.set_visual_rand(run.visual_source());
        log::debug!("recording started under seed {seed:?}");
        run
    }

    /// Queue an action for the next recorded tick.
    ///
    /// Ignored (with a debug log) when no recording is active or the
    /// run has already ended.
    pub fn queue_action(&mut self, action: Action) {
        match &self.active {
            Some(run) if !run.ended() => self.queue.enqueue(action),
            _ => log::debug!("action {:?} ignored: no active recording", action.id),
        }
    }

    /// Take the actions queued since the last drain, in arrival order.
    pub fn drain_pending_actions(&mut self) -> Vec<Action> {
        self.queue.drain()
    }

    /// Discard any queued actions without recording them.
    pub fn clear_pending_actions(&mut self) {
        self.queue.clear();
    }

    /// Record one tick's input sample and dispatched actions.
    ///
    /// Ignored when no recording is active or the run has ended.
    pub fn record_tick(&mut self, movement: MoveIntent, cursor: Cursor, actions: Vec<Action>) {
        match &mut self.active {
            Some(run) if !run.ended() => {
                run.push_tick(TickRecord::new(movement, cursor, actions));
            }
            _ => log::debug!("tick dropped: no active recording"),
        }
    }

    /// Freeze the active run and restore the pre-recording random
    /// source.
    ///
    /// The harvested rng tape moves into the run, which stays
    /// available through [`active_run`](ReplayRecorder::active_run)
    /// until the next start. Calling again on an already frozen run is
    /// a no-op that returns the same run.
    pub fn mark_ended(&mut self, rand: &mut RandContext) -> Option<&ReplayRun> {
        let run = self.active.as_mut()?;
        if !run.ended() {
            let tape =
                std::mem::take(&mut *self.tape.lock().unwrap_or_else(|p| p.into_inner()));
            run.finalize(tape);
            self.queue.clear();
            if let Some(saved) = self.saved_source.take() {
                drop(rand.install(saved));
            }
            log::debug!(
                "recording ended: {} ticks, {} rng draws",
                run.ticks().len(),
                run.rng_tape().len()
            );
        }
        Some(&*run)
    }

    /// The current run, recording or frozen.
    pub fn active_run(&self) -> Option<&ReplayRun> {
        self.active.as_ref()
    }

    /// Whether a run is currently recording (started, not yet ended).
    pub fn is_recording(&self) -> bool {
        matches!(&self.active, Some(run) if !run.ended())
    }

    /// Drop any active run and restore the pre-recording source.
    pub fn reset(&mut self, rand: &mut RandContext) {
        if let Some(saved) = self.saved_source.take() {
            drop(rand.install(saved));
        }
        self.active = None;
        self.queue.clear();
        self.tape = new_tape_handle();
    }
}

impl Default for ReplayRecorder {
    fn default() -> Self {
        Self::new()
    }
}
