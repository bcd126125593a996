//! Benchmark fixtures for the Reel replay engine.
//!
//! Provides a minimal game and canned recorded runs:
//!
//! - [`BenchGame`]: simulates as cheaply as possible so benches
//!   measure engine overhead, not simulation cost
//! - [`recorded_run`]: a frozen run of any length with sparse actions,
//!   recorded through the real recorder

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use reel_core::{
    Action, Cursor, Game, GameError, GamePhase, InputDevice, MoveIntent, RandContext, RandSource,
    SIM_DT,
};
use reel_replay::{ReplayRecorder, ReplayRun};

/// Random values [`BenchGame`] consumes per update.
pub const DRAWS_PER_UPDATE: usize = 2;

struct IdleDevice;

impl InputDevice for IdleDevice {
    fn move_intent(&self) -> MoveIntent {
        MoveIntent::default()
    }

    fn cursor(&self) -> Cursor {
        Cursor::default()
    }

    fn reset(&mut self) {}
}

/// A game with a single-float state and no per-tick allocation.
///
/// Each update samples the input device and folds [`DRAWS_PER_UPDATE`]
/// random values into the accumulator; render is a no-op.
pub struct BenchGame {
    state: f64,
    phase: GamePhase,
    input: Box<dyn InputDevice>,
}

impl BenchGame {
    /// A fresh game in the menu phase.
    pub fn new() -> Self {
        Self {
            state: 0.0,
            phase: GamePhase::Menu,
            input: Box::new(IdleDevice),
        }
    }

    /// The accumulator, for keeping results observable.
    pub fn state(&self) -> f64 {
        self.state
    }
}

impl Default for BenchGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for BenchGame {
    fn update(&mut self, dt: f64, rand: &mut dyn RandSource) -> Result<(), GameError> {
        if self.phase != GamePhase::Playing {
            return Ok(());
        }
        let movement = self.input.move_intent();
        for _ in 0..DRAWS_PER_UPDATE {
            self.state = self.state * 0.75 + rand.draw() + movement.dx * 0.125;
        }
        self.state += movement.dy * dt;
        Ok(())
    }

    fn render(&mut self) {}

    fn handle_action(&mut self, id: &str) {
        self.state += id.len() as f64 * 0.001;
    }

    fn start_run(&mut self) {
        self.phase = GamePhase::Playing;
        self.state = 0.0;
    }

    fn phase(&self) -> GamePhase {
        self.phase
    }

    fn swap_input(&mut self, device: Box<dyn InputDevice>) -> Box<dyn InputDevice> {
        std::mem::replace(&mut self.input, device)
    }
}

/// Record a frozen run of `ticks` ticks with an action every 60th.
///
/// Drives a [`BenchGame`] through the real recorder, so the returned
/// run carries a full rng tape and replays without fallback draws.
pub fn recorded_run(seed: &str, ticks: usize) -> ReplayRun {
    let mut game = BenchGame::new();
    game.start_run();
    let mut rand = RandContext::new();
    let mut recorder = ReplayRecorder::new();
    recorder.start_recording(seed, &mut game, &mut rand);

    for i in 0..ticks {
        let movement = MoveIntent::new((i % 3) as f64 - 1.0, 0.5);
        let cursor = Cursor::at((i % 640) as f64, (i % 360) as f64);
        let actions = if i % 60 == 0 {
            vec![Action::new("dash").with_cursor(cursor)]
        } else {
            Vec::new()
        };
        for action in &actions {
            game.handle_action(&action.id);
        }
        game.update(SIM_DT, rand.source_mut()).unwrap();
        recorder.record_tick(movement, cursor, actions);
    }
    recorder.mark_ended(&mut rand).unwrap().clone()
}
