//! Interactive scrub playback for a replay viewer.
//!
//! [`PlaybackController`] plays a loaded run frame by frame under UI
//! control: play/pause, speed, single-step, and seeking. There are no
//! state snapshots; seeking re-simulates from tick zero with a fresh
//! random source, which is cheap at fixed timestep and keeps the
//! controller on the same determinism guarantees as batch playback.

use reel_core::{Game, MAX_FRAME_DT, RandSource};
use reel_replay::ReplayRun;

use crate::engine::apply_tick;
use crate::error::PlaybackError;
use crate::input::ReplayInput;
use crate::pacing::tick_step;

/// Slowest allowed playback speed multiplier.
pub const MIN_SPEED: f64 = 0.25;

/// Fastest allowed playback speed multiplier.
pub const MAX_SPEED: f64 = 3.0;

fn clamp_speed(speed: f64) -> f64 {
    let speed = if speed.is_finite() { speed } else { 1.0 };
    speed.clamp(MIN_SPEED, MAX_SPEED)
}

/// Progress and transport state for UI binding.
///
/// Returned by every [`PlaybackController::advance_frame`] call so the
/// viewer can rebind its transport controls per frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrubState {
    /// Whether frames currently advance the simulation.
    pub playing: bool,
    /// Whether playback has reached the end of the run.
    pub completed: bool,
    /// Current speed multiplier, within `[MIN_SPEED, MAX_SPEED]`.
    pub speed: f64,
    /// Next tick to apply.
    pub index: usize,
    /// Total ticks in the run.
    pub total: usize,
    /// `index / total`, or zero for an empty run.
    pub progress: f64,
}

/// Frame-driven playback of one run with transport controls.
///
/// The controller owns the run, its replay input handle, and the
/// random source; the caller owns the game and the frame loop. Setup
/// is: install [`input`](PlaybackController::input)'s device into the
/// game, start the game's run lifecycle, then feed frame timestamps to
/// [`advance_frame`](PlaybackController::advance_frame).
/// [`restart`](PlaybackController::restart) and
/// [`seek`](PlaybackController::seek) re-enter the run lifecycle
/// themselves.
pub struct PlaybackController {
    run: ReplayRun,
    input: ReplayInput,
    rand: Box<dyn RandSource>,
    sim_dt: f64,
    tick_step: f64,
    index: usize,
    acc: f64,
    last_ts: Option<f64>,
    playing: bool,
    completed: bool,
    speed: f64,
}

impl PlaybackController {
    /// A paused controller positioned at tick zero of `run`.
    pub fn new(run: ReplayRun, sim_dt: f64) -> Self {
        let rand = run.playback_source();
        Self {
            run,
            input: ReplayInput::new(),
            rand,
            sim_dt,
            tick_step: tick_step(sim_dt),
            index: 0,
            acc: 0.0,
            last_ts: None,
            playing: false,
            completed: false,
            speed: 1.0,
        }
    }

    /// The loaded run.
    pub fn run(&self) -> &ReplayRun {
        &self.run
    }

    /// The replay input handle; install its device into the game.
    pub fn input(&self) -> &ReplayInput {
        &self.input
    }

    /// Advance playback for the frame at `ts_ms`.
    ///
    /// While paused this only resets frame timing. The first playing
    /// frame after a timing reset primes the clock without simulating.
    /// Otherwise the frame delta (clamped to [`MAX_FRAME_DT`], scaled
    /// by speed) buys whole ticks off the accumulator, a render is
    /// issued, and playback finishes on tick exhaustion or a terminal
    /// game phase. A failed step pauses playback before propagating.
    pub fn advance_frame(
        &mut self,
        game: &mut dyn Game,
        ts_ms: f64,
    ) -> Result<ScrubState, PlaybackError> {
        if !self.playing {
            self.reset_timing();
            return Ok(self.state());
        }
        let Some(last) = self.last_ts else {
            self.last_ts = Some(ts_ms);
            return Ok(self.state());
        };

        let frame_dt = ((ts_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT) * self.speed;
        self.last_ts = Some(ts_ms);
        self.acc += frame_dt;

        let mut over = false;
        while self.index < self.run.ticks().len() && self.acc >= self.tick_step {
            self.apply_next(game)?;
            self.acc -= self.tick_step;
            if game.phase().is_over() {
                over = true;
                break;
            }
        }

        game.render();
        if over || self.index >= self.run.ticks().len() {
            self.finish();
        }
        Ok(self.state())
    }

    /// Begin (or resume) playing. A completed run restarts first.
    /// Returns false for an empty run.
    pub fn play(&mut self, game: &mut dyn Game) -> bool {
        if self.run.ticks().is_empty() {
            return false;
        }
        if self.completed {
            self.restart(game);
        }
        self.playing = true;
        true
    }

    /// Stop advancing on frames. Position is kept.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Pause when playing, play when paused. Returns whether playback
    /// is running afterwards.
    pub fn toggle(&mut self, game: &mut dyn Game) -> bool {
        if self.playing {
            self.pause();
            false
        } else {
            self.play(game)
        }
    }

    /// Rewind to tick zero with a fresh random source and render the
    /// initial state. Does not change the play/pause state.
    pub fn restart(&mut self, game: &mut dyn Game) {
        self.index = 0;
        self.completed = false;
        self.reset_timing();
        self.rand = self.run.playback_source();
        game.start_run();
        game.render();
    }

    /// Apply exactly one tick and render, for frame-by-frame stepping
    /// while paused. Returns false when there is nothing to step.
    pub fn step_once(&mut self, game: &mut dyn Game) -> Result<bool, PlaybackError> {
        if self.run.ticks().is_empty() {
            return Ok(false);
        }
        if self.index >= self.run.ticks().len() {
            self.finish();
            return Ok(false);
        }
        self.apply_next(game)?;
        game.render();
        if game.phase().is_over() || self.index >= self.run.ticks().len() {
            self.finish();
        }
        Ok(true)
    }

    /// Jump to `progress` through the run, in `[0, 1]`.
    ///
    /// There are no snapshots to restore: the run restarts and every
    /// tick up to the target index is re-simulated with a fresh random
    /// source, then one frame is rendered. Leaves playback paused.
    /// Out-of-range and non-finite values clamp; returns false for an
    /// empty run.
    pub fn seek(&mut self, game: &mut dyn Game, progress: f64) -> Result<bool, PlaybackError> {
        let total = self.run.ticks().len();
        if total == 0 {
            return Ok(false);
        }
        let normalized = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let target = ((normalized * total as f64).floor() as usize).min(total);

        self.playing = false;
        self.completed = false;
        self.reset_timing();
        self.rand = self.run.playback_source();
        self.index = 0;
        game.start_run();
        while self.index < target {
            self.apply_next(game)?;
        }
        game.render();
        self.completed = self.index >= total;
        Ok(true)
    }

    /// Set the speed multiplier, clamped to `[MIN_SPEED, MAX_SPEED]`
    /// (non-finite values fall back to 1). Returns the applied speed.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.speed = clamp_speed(speed);
        self.speed
    }

    /// Current transport state.
    pub fn state(&self) -> ScrubState {
        let total = self.run.ticks().len();
        ScrubState {
            playing: self.playing,
            completed: self.completed,
            speed: self.speed,
            index: self.index,
            total,
            progress: if total == 0 {
                0.0
            } else {
                self.index as f64 / total as f64
            },
        }
    }

    /// Apply the tick at `index`, pausing playback on failure.
    fn apply_next(&mut self, game: &mut dyn Game) -> Result<(), PlaybackError> {
        let tick = &self.run.ticks()[self.index];
        match apply_tick(game, &self.input, tick, self.sim_dt, &mut *self.rand) {
            Ok(()) => {
                self.index += 1;
                Ok(())
            }
            Err(e) => {
                self.playing = false;
                Err(e.into())
            }
        }
    }

    fn finish(&mut self) {
        self.playing = false;
        self.completed = true;
    }

    fn reset_timing(&mut self) {
        self.acc = 0.0;
        self.last_ts = None;
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("index", &self.index)
            .field("total", &self.run.ticks().len())
            .field("playing", &self.playing)
            .field("completed", &self.completed)
            .field("speed", &self.speed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use reel_core::{Action, Cursor, MoveIntent, RandContext, SIM_DT};
    use reel_replay::ReplayRecorder;
    use reel_test_utils::MockGame;

    use super::*;

    /// Record a short run whose updates consume randomness.
    fn record_run(ticks: usize) -> ReplayRun {
        let mut game = MockGame::new();
        let mut rand = RandContext::new();
        let mut rec = ReplayRecorder::new();
        game.start_run();
        rec.start_recording("scrub-run", &mut game, &mut rand);
        for i in 0..ticks {
            let actions = if i % 4 == 0 {
                vec![Action::new("dash").with_cursor(Cursor::at(i as f64, 1.0))]
            } else {
                Vec::new()
            };
            for action in &actions {
                game.handle_action(&action.id);
            }
            game.update(SIM_DT, rand.source_mut()).unwrap();
            rec.record_tick(
                MoveIntent::new((i % 3) as f64 - 1.0, 0.5),
                Cursor::at(i as f64, i as f64 * 2.0),
                actions,
            );
        }
        rec.mark_ended(&mut rand).unwrap().clone()
    }

    /// A game wired to the controller's input, ready to play.
    fn wired_game(ctrl: &PlaybackController) -> MockGame {
        let mut game = MockGame::new();
        drop(game.swap_input(ctrl.input().device()));
        game.start_run();
        game
    }

    fn play_to_end(ctrl: &mut PlaybackController, game: &mut MockGame) {
        assert!(ctrl.play(game));
        let mut ts = 0.0;
        for _ in 0..200 {
            if ctrl.state().completed {
                return;
            }
            ctrl.advance_frame(game, ts).unwrap();
            ts += 100.0;
        }
        panic!("run did not complete within the frame budget");
    }

    #[test]
    fn speed_clamps_to_range() {
        let mut ctrl = PlaybackController::new(record_run(2), SIM_DT);
        assert_eq!(ctrl.set_speed(10.0), MAX_SPEED);
        assert_eq!(ctrl.set_speed(0.01), MIN_SPEED);
        assert_eq!(ctrl.set_speed(f64::NAN), 1.0);
        assert_eq!(ctrl.set_speed(2.0), 2.0);
        assert_eq!(ctrl.state().speed, 2.0);
    }

    #[test]
    fn paused_frames_do_not_simulate() {
        let mut ctrl = PlaybackController::new(record_run(4), SIM_DT);
        let mut game = wired_game(&ctrl);

        let state = ctrl.advance_frame(&mut game, 0.0).unwrap();
        ctrl.advance_frame(&mut game, 500.0).unwrap();

        assert!(!state.playing);
        assert_eq!(state.index, 0);
        assert!(game.take_ops().is_empty());
    }

    #[test]
    fn first_playing_frame_primes_the_clock() {
        let mut ctrl = PlaybackController::new(record_run(4), SIM_DT);
        let mut game = wired_game(&ctrl);

        assert!(ctrl.play(&mut game));
        let state = ctrl.advance_frame(&mut game, 0.0).unwrap();

        assert_eq!(state.index, 0);
        assert!(game.take_ops().is_empty(), "priming must not simulate");
    }

    #[test]
    fn frames_buy_whole_ticks_and_render_once() {
        let mut ctrl = PlaybackController::new(record_run(8), SIM_DT);
        let mut game = wired_game(&ctrl);

        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        // 20 ms at 120 tps covers two ticks with some accumulator left.
        let state = ctrl.advance_frame(&mut game, 20.0).unwrap();

        assert_eq!(state.index, 2);
        assert_eq!(game.updates(), 2);
        let renders = game
            .take_ops()
            .iter()
            .filter(|op| op.starts_with("render"))
            .count();
        assert_eq!(renders, 1);
    }

    #[test]
    fn speed_scales_the_frame_budget() {
        let mut ctrl = PlaybackController::new(record_run(12), SIM_DT);
        let mut game = wired_game(&ctrl);

        ctrl.set_speed(2.0);
        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        let state = ctrl.advance_frame(&mut game, 20.0).unwrap();

        // 20 ms of wall time is 40 ms of sim time at double speed.
        assert_eq!(state.index, 4);
    }

    #[test]
    fn slow_frames_still_render() {
        let mut ctrl = PlaybackController::new(record_run(4), SIM_DT);
        let mut game = wired_game(&ctrl);

        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        // One millisecond buys no tick at 120 tps.
        let state = ctrl.advance_frame(&mut game, 1.0).unwrap();

        assert_eq!(state.index, 0);
        assert_eq!(game.take_ops(), vec!["render 0".to_string()]);
    }

    #[test]
    fn exhaustion_finishes_playback() {
        let mut ctrl = PlaybackController::new(record_run(3), SIM_DT);
        let mut game = wired_game(&ctrl);

        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        let state = ctrl.advance_frame(&mut game, 100.0).unwrap();

        assert!(state.completed);
        assert!(!state.playing);
        assert_eq!(state.index, 3);
        assert_eq!(state.progress, 1.0);
    }

    #[test]
    fn terminal_phase_finishes_with_a_render() {
        let mut ctrl = PlaybackController::new(record_run(6), SIM_DT);
        let mut game = wired_game(&ctrl);
        game.over_after_updates = Some(2);

        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        let state = ctrl.advance_frame(&mut game, 100.0).unwrap();

        assert!(state.completed);
        assert_eq!(state.index, 2);
        let ops = game.take_ops();
        assert_eq!(ops.last().unwrap(), "render 2");
    }

    #[test]
    fn play_on_completed_run_restarts() {
        let mut ctrl = PlaybackController::new(record_run(3), SIM_DT);
        let mut game = wired_game(&ctrl);
        play_to_end(&mut ctrl, &mut game);

        assert!(ctrl.play(&mut game));
        let state = ctrl.state();
        assert!(state.playing);
        assert!(!state.completed);
        assert_eq!(state.index, 0);
        assert_eq!(game.updates(), 0, "restart re-enters the run lifecycle");
    }

    #[test]
    fn toggle_flips_transport() {
        let mut ctrl = PlaybackController::new(record_run(3), SIM_DT);
        let mut game = wired_game(&ctrl);

        assert!(ctrl.toggle(&mut game));
        assert!(ctrl.state().playing);
        assert!(!ctrl.toggle(&mut game));
        assert!(!ctrl.state().playing);
    }

    #[test]
    fn empty_run_refuses_transport() {
        let mut live = MockGame::new();
        let mut rand = RandContext::new();
        let mut rec = ReplayRecorder::new();
        live.start_run();
        rec.start_recording("empty", &mut live, &mut rand);
        let empty = rec.mark_ended(&mut rand).unwrap().clone();

        let mut ctrl = PlaybackController::new(empty, SIM_DT);
        let mut game = wired_game(&ctrl);
        assert!(!ctrl.play(&mut game));
        assert!(!ctrl.step_once(&mut game).unwrap());
        assert!(!ctrl.seek(&mut game, 0.5).unwrap());
    }

    #[test]
    fn step_once_applies_exactly_one_tick() {
        let mut ctrl = PlaybackController::new(record_run(4), SIM_DT);
        let mut game = wired_game(&ctrl);

        assert!(ctrl.step_once(&mut game).unwrap());
        assert_eq!(ctrl.state().index, 1);
        assert_eq!(game.updates(), 1);
        let ops = game.take_ops();
        assert_eq!(ops.last().unwrap(), "render 1");
    }

    #[test]
    fn stepping_through_the_end_completes() {
        let mut ctrl = PlaybackController::new(record_run(2), SIM_DT);
        let mut game = wired_game(&ctrl);

        assert!(ctrl.step_once(&mut game).unwrap());
        assert!(ctrl.step_once(&mut game).unwrap());
        assert!(ctrl.state().completed);
        assert!(!ctrl.step_once(&mut game).unwrap());
    }

    #[test]
    fn seek_maps_progress_to_tick_index() {
        let mut ctrl = PlaybackController::new(record_run(8), SIM_DT);
        let mut game = wired_game(&ctrl);

        assert!(ctrl.seek(&mut game, 0.5).unwrap());
        let state = ctrl.state();
        assert_eq!(state.index, 4);
        assert!(!state.completed);
        assert!(!state.playing);
        assert_eq!(game.updates(), 4, "seek re-simulates to the target");
    }

    #[test]
    fn seek_clamps_out_of_range_progress() {
        let mut ctrl = PlaybackController::new(record_run(5), SIM_DT);
        let mut game = wired_game(&ctrl);

        ctrl.seek(&mut game, -2.0).unwrap();
        assert_eq!(ctrl.state().index, 0);

        ctrl.seek(&mut game, 7.5).unwrap();
        assert_eq!(ctrl.state().index, 5);
        assert!(ctrl.state().completed);

        ctrl.seek(&mut game, f64::NAN).unwrap();
        assert_eq!(ctrl.state().index, 0);
    }

    #[test]
    fn seek_to_end_matches_played_state() {
        let run = record_run(10);

        let mut played = PlaybackController::new(run.clone(), SIM_DT);
        let mut game_a = wired_game(&played);
        play_to_end(&mut played, &mut game_a);

        let mut seeked = PlaybackController::new(run, SIM_DT);
        let mut game_b = wired_game(&seeked);
        seeked.seek(&mut game_b, 1.0).unwrap();

        // Re-simulation with a fresh source reproduces playback exactly.
        assert_eq!(game_a.state().to_bits(), game_b.state().to_bits());
    }

    #[test]
    fn replay_after_restart_reproduces_state() {
        let mut ctrl = PlaybackController::new(record_run(10), SIM_DT);
        let mut game = wired_game(&ctrl);

        play_to_end(&mut ctrl, &mut game);
        let first = game.state().to_bits();

        ctrl.restart(&mut game);
        play_to_end(&mut ctrl, &mut game);
        assert_eq!(game.state().to_bits(), first);
    }

    #[test]
    fn failed_step_pauses_before_propagating() {
        let mut ctrl = PlaybackController::new(record_run(6), SIM_DT);
        let mut game = wired_game(&ctrl);
        game.fail_at_update = Some(2);

        ctrl.play(&mut game);
        ctrl.advance_frame(&mut game, 0.0).unwrap();
        let err = ctrl.advance_frame(&mut game, 100.0).unwrap_err();

        assert!(matches!(err, PlaybackError::Game(_)));
        let state = ctrl.state();
        assert!(!state.playing);
        assert_eq!(state.index, 1, "the failed tick is not consumed");
    }
}
