//! The playback driver.
//!
//! [`play_ticks`] feeds a recorded tick list to a [`Game`] under one of
//! the three [`PacingPolicy`] modes. Every policy applies ticks through
//! the same [`apply_tick`] body, so a run replays identically whichever
//! way it is scheduled; the policies differ only in when ticks execute
//! relative to frames and renders.

use reel_core::{FrameHost, Game, GameError, RandSource, TickRecord};

use crate::error::PlaybackError;
use crate::input::ReplayInput;
use crate::pacing::{default_render_cadence, DeterministicOptions, PacingPolicy, TickBudget};

// ── PlaybackReport ─────────────────────────────────────────────────

/// What a playback pass actually did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PlaybackReport {
    /// Ticks applied before playback stopped.
    pub ticks_run: usize,
    /// Frames rendered, including any final off-cadence render.
    pub renders: usize,
    /// Whether the simulation reached its terminal phase before the
    /// tick list was exhausted. Remaining ticks are abandoned; this is
    /// a normal outcome, not an error.
    pub ended_early: bool,
    /// Random draws the source served from its degraded fallback path
    /// during this pass. Nonzero means the rng tape ran out and the
    /// replay diverged from the recording at that point.
    pub fallback_draws: u64,
}

// ── apply_tick ─────────────────────────────────────────────────────

/// Apply one recorded tick to the simulation.
///
/// Writes the tick's movement and cursor samples into the replay
/// input, dispatches the tick's actions in order, then runs one fixed
/// step. An action carrying its own cursor overrides the input
/// immediately before its dispatch and the override persists: aimed
/// abilities see the trigger-time cursor, exactly as they did live.
pub fn apply_tick(
    game: &mut dyn Game,
    input: &ReplayInput,
    tick: &TickRecord,
    sim_dt: f64,
    rand: &mut dyn RandSource,
) -> Result<(), GameError> {
    input.set_movement(tick.movement);
    input.set_cursor(tick.cursor);
    for action in tick.actions() {
        if let Some(cursor) = action.cursor {
            input.set_cursor(cursor);
        }
        game.handle_action(&action.id);
    }
    game.update(sim_dt, rand)
}

// ── play_ticks ─────────────────────────────────────────────────────

/// Play a recorded tick list to completion under `policy`.
///
/// An empty tick list returns immediately without touching the game or
/// the host. When the simulation goes terminal mid-run the remaining
/// ticks are abandoned and a final render is still issued. A failed
/// simulation step stops playback and propagates; the caller owns any
/// state restoration.
pub fn play_ticks(
    game: &mut dyn Game,
    input: &ReplayInput,
    rand: &mut dyn RandSource,
    ticks: &[TickRecord],
    sim_dt: f64,
    policy: &PacingPolicy,
    host: &mut dyn FrameHost,
) -> Result<PlaybackReport, PlaybackError> {
    if ticks.is_empty() {
        return Ok(PlaybackReport::default());
    }
    let fallback_base = rand.fallback_draws();
    let mut report = match policy {
        PacingPolicy::Realtime => play_realtime(game, input, rand, ticks, sim_dt, host),
        PacingPolicy::CaptureLocked => play_capture_locked(game, input, rand, ticks, sim_dt, host),
        PacingPolicy::Deterministic(opts) => {
            play_deterministic(game, input, rand, ticks, sim_dt, opts, host)
        }
    }?;
    report.fallback_draws = rand.fallback_draws() - fallback_base;
    Ok(report)
}

/// Policy A: budgeted wall-clock pacing.
///
/// Each frame converts its delta into tick budget, runs the ticks the
/// budget covers, and renders once. After a slow frame several ticks
/// run before the next render, so the replay tracks recorded speed
/// without ever rendering more than once per frame.
fn play_realtime(
    game: &mut dyn Game,
    input: &ReplayInput,
    rand: &mut dyn RandSource,
    ticks: &[TickRecord],
    sim_dt: f64,
    host: &mut dyn FrameHost,
) -> Result<PlaybackReport, PlaybackError> {
    let mut budget = TickBudget::new(sim_dt);
    let mut report = PlaybackReport::default();
    let mut next = 0;

    while let Some(ts) = host.next_frame() {
        budget.push_frame(ts);
        while next < ticks.len() && budget.take_tick() {
            apply_tick(game, input, &ticks[next], sim_dt, rand)?;
            next += 1;
            report.ticks_run += 1;
            if game.phase().is_over() {
                report.ended_early = true;
                break;
            }
        }
        game.render();
        report.renders += 1;
        if next == ticks.len() || report.ended_early {
            break;
        }
    }
    Ok(report)
}

/// Policy B: exactly one tick per frame, render always.
///
/// The host owns the clock; captured frame count equals tick count.
fn play_capture_locked(
    game: &mut dyn Game,
    input: &ReplayInput,
    rand: &mut dyn RandSource,
    ticks: &[TickRecord],
    sim_dt: f64,
    host: &mut dyn FrameHost,
) -> Result<PlaybackReport, PlaybackError> {
    let mut report = PlaybackReport::default();
    let mut next = 0;

    while host.next_frame().is_some() {
        apply_tick(game, input, &ticks[next], sim_dt, rand)?;
        next += 1;
        report.ticks_run += 1;
        if game.phase().is_over() {
            report.ended_early = true;
        }
        game.render();
        report.renders += 1;
        if next == ticks.len() || report.ended_early {
            break;
        }
    }
    Ok(report)
}

/// Policy C: back-to-back ticks with explicit render scheduling.
fn play_deterministic(
    game: &mut dyn Game,
    input: &ReplayInput,
    rand: &mut dyn RandSource,
    ticks: &[TickRecord],
    sim_dt: f64,
    opts: &DeterministicOptions,
    host: &mut dyn FrameHost,
) -> Result<PlaybackReport, PlaybackError> {
    let cadence = opts
        .render_every
        .unwrap_or_else(|| default_render_cadence(sim_dt))
        .max(1) as usize;
    let start_ms = opts.pace_with_sim.then(|| host.now_ms());

    let mut report = PlaybackReport::default();
    // State has advanced past what the last render showed.
    let mut pending_render = false;

    for tick in ticks {
        apply_tick(game, input, tick, sim_dt, rand)?;
        report.ticks_run += 1;
        pending_render = true;
        if game.phase().is_over() {
            report.ended_early = true;
            break;
        }
        if opts.render_always || report.ticks_run % cadence == 0 {
            game.render();
            report.renders += 1;
            pending_render = false;
            if opts.yield_between_renders {
                host.yield_now();
            }
            if let Some(start) = start_ms {
                let target_ms = report.ticks_run as f64 * sim_dt * 1000.0;
                let behind_ms = target_ms - (host.now_ms() - start);
                if behind_ms > 0.0 {
                    host.wait_ms(behind_ms);
                }
            }
        }
    }

    if opts.render_final && pending_render {
        game.render();
        report.renders += 1;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use reel_core::{Action, Cursor, MoveIntent, SeededStream, SIM_DT};
    use reel_test_utils::{MockGame, ScriptedHost};

    use super::*;

    fn playing_game() -> MockGame {
        let mut game = MockGame::new();
        game.start_run();
        game
    }

    fn plain_ticks(n: usize) -> Vec<TickRecord> {
        (0..n)
            .map(|i| {
                TickRecord::new(
                    MoveIntent::new(i as f64, 0.0),
                    Cursor::at(i as f64, i as f64),
                    Vec::new(),
                )
            })
            .collect()
    }

    fn rand() -> SeededStream {
        SeededStream::new("engine-tests")
    }

    #[test]
    fn apply_tick_dispatches_actions_before_update() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let tick = TickRecord::new(
            MoveIntent::new(1.0, -1.0),
            Cursor::at(5.0, 6.0),
            vec![Action::new("dash"), Action::new("phase")],
        );
        // Game reads input through a device vended from the handle.
        drop(game.swap_input(input.device()));

        apply_tick(&mut game, &input, &tick, SIM_DT, &mut rand()).unwrap();

        let ops = game.take_ops();
        assert_eq!(ops.len(), 3);
        assert!(ops[0].starts_with("action dash"));
        assert!(ops[1].starts_with("action phase"));
        assert!(ops[2].starts_with("update 1"));
    }

    #[test]
    fn action_cursor_override_persists_through_update() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        drop(game.swap_input(input.device()));

        let tick = TickRecord::new(
            MoveIntent::default(),
            Cursor::at(1.0, 2.0),
            vec![
                Action::new("teleport").with_cursor(Cursor::at(10.0, 20.0)),
                Action::new("dash"),
            ],
        );
        apply_tick(&mut game, &input, &tick, SIM_DT, &mut rand()).unwrap();

        let ops = game.take_ops();
        // Both dispatches and the update see the override, not the
        // per-tick sample.
        assert!(ops[0].contains("cursor 10.0 20.0 true"), "{}", ops[0]);
        assert!(ops[1].contains("cursor 10.0 20.0 true"), "{}", ops[1]);
        assert!(ops[2].contains("cursor 10.0 20.0 true"), "{}", ops[2]);
    }

    #[test]
    fn tick_without_actions_only_updates() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let tick = TickRecord::new(MoveIntent::new(2.0, 3.0), Cursor::default(), Vec::new());

        apply_tick(&mut game, &input, &tick, SIM_DT, &mut rand()).unwrap();

        let ops = game.take_ops();
        assert_eq!(ops.len(), 1);
        assert!(ops[0].starts_with("update 1"));
    }

    #[test]
    fn empty_ticks_return_without_touching_host() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(vec![0.0, 16.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &[],
            SIM_DT,
            &PacingPolicy::Realtime,
            &mut host,
        )
        .unwrap();

        assert_eq!(report, PlaybackReport::default());
        assert!(game.take_ops().is_empty());
    }

    #[test]
    fn realtime_budgets_ticks_and_renders_once_per_frame() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let ticks = plain_ticks(4);
        // 60 fps frames: the primed first frame covers two ticks at
        // 120 tps, later frames roughly one each plus carry.
        let mut host = ScriptedHost::new(vec![0.0, 16.0, 32.0, 48.0, 64.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &ticks,
            SIM_DT,
            &PacingPolicy::Realtime,
            &mut host,
        )
        .unwrap();

        assert_eq!(report.ticks_run, 4);
        assert_eq!(report.renders, 3);
        assert!(!report.ended_early);
        assert_eq!(game.updates(), 4);
    }

    #[test]
    fn realtime_clamps_long_frames() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let ticks = plain_ticks(30);
        // One second between frames clamps to MAX_FRAME_DT, which is
        // twelve ticks of budget at 120 tps.
        let mut host = ScriptedHost::new(vec![0.0, 1000.0, 2000.0, 3000.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &ticks,
            SIM_DT,
            &PacingPolicy::Realtime,
            &mut host,
        )
        .unwrap();

        // 2 primed + 12 + 12 ticks across three frames, then the rest.
        assert_eq!(report.ticks_run, 30);
        assert_eq!(report.renders, 4);
    }

    #[test]
    fn realtime_ends_when_frames_run_out() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let ticks = plain_ticks(100);
        let mut host = ScriptedHost::new(vec![0.0, 16.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &ticks,
            SIM_DT,
            &PacingPolicy::Realtime,
            &mut host,
        )
        .unwrap();

        assert!(report.ticks_run < 100);
        assert_eq!(report.renders, 2);
        assert!(!report.ended_early);
    }

    #[test]
    fn capture_locked_runs_one_tick_per_frame() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let ticks = plain_ticks(3);
        let mut host = ScriptedHost::new(vec![0.0, 40.0, 80.0, 120.0, 160.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &ticks,
            SIM_DT,
            &PacingPolicy::CaptureLocked,
            &mut host,
        )
        .unwrap();

        assert_eq!(report.ticks_run, 3);
        assert_eq!(report.renders, 3);
    }

    #[test]
    fn terminal_phase_abandons_remaining_ticks() {
        let mut game = playing_game();
        game.over_after_updates = Some(2);
        let input = ReplayInput::new();
        let ticks = plain_ticks(5);
        let mut host = ScriptedHost::new(vec![0.0, 16.0, 32.0, 48.0, 64.0, 80.0]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &ticks,
            SIM_DT,
            &PacingPolicy::CaptureLocked,
            &mut host,
        )
        .unwrap();

        assert!(report.ended_early);
        assert_eq!(report.ticks_run, 2);
        // The terminal tick still gets its frame rendered.
        assert_eq!(report.renders, 2);
    }

    #[test]
    fn deterministic_renders_on_cadence() {
        let opts = DeterministicOptions {
            render_every: Some(2),
            render_final: false,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(5),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert_eq!(report.ticks_run, 5);
        assert_eq!(report.renders, 2);
    }

    #[test]
    fn deterministic_final_render_covers_offcadence_tail() {
        let opts = DeterministicOptions {
            render_every: Some(2),
            render_final: true,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(5),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert_eq!(report.renders, 3);
    }

    #[test]
    fn deterministic_render_always_ignores_cadence() {
        let opts = DeterministicOptions {
            render_every: Some(10),
            render_always: true,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(3),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert_eq!(report.renders, 3);
    }

    #[test]
    fn deterministic_over_still_renders_final_frame() {
        let opts = DeterministicOptions {
            render_every: Some(5),
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        game.over_after_updates = Some(2);
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(4),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert!(report.ended_early);
        assert_eq!(report.ticks_run, 2);
        assert_eq!(report.renders, 1);
    }

    #[test]
    fn deterministic_paces_against_sim_time() {
        let opts = DeterministicOptions {
            render_every: Some(1),
            pace_with_sim: true,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        // First now() anchors the start; one reading per render after.
        let mut host = ScriptedHost::new(Vec::new()).with_now(vec![0.0, 0.0, 4.0, 10.0]);

        play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(3),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        let tick_ms = SIM_DT * 1000.0;
        assert_eq!(host.waits.len(), 3);
        assert!((host.waits[0] - tick_ms).abs() < 1e-6);
        assert!((host.waits[1] - (2.0 * tick_ms - 4.0)).abs() < 1e-6);
        assert!((host.waits[2] - (3.0 * tick_ms - 10.0)).abs() < 1e-6);
    }

    #[test]
    fn deterministic_skips_waits_when_behind_schedule() {
        let opts = DeterministicOptions {
            render_every: Some(1),
            pace_with_sim: true,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new()).with_now(vec![0.0, 20.0, 40.0]);

        play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(2),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert!(host.waits.is_empty());
    }

    #[test]
    fn deterministic_yields_between_renders() {
        let opts = DeterministicOptions {
            render_every: Some(1),
            yield_between_renders: true,
            ..DeterministicOptions::default()
        };
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(4),
            SIM_DT,
            &PacingPolicy::Deterministic(opts),
            &mut host,
        )
        .unwrap();

        assert_eq!(host.yields, report.renders);
    }

    #[test]
    fn update_failure_propagates() {
        let mut game = playing_game();
        game.fail_at_update = Some(2);
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        let err = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(5),
            SIM_DT,
            &PacingPolicy::Deterministic(DeterministicOptions::default()),
            &mut host,
        )
        .unwrap_err();

        assert!(matches!(err, PlaybackError::Game(_)));
        assert_eq!(game.updates(), 2);
    }

    #[test]
    fn exhausted_tape_is_reported() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());
        // Three ticks draw six values; the tape holds two.
        let mut tape = reel_core::TapePlayer::new("short", vec![0.1, 0.2]);

        let report = play_ticks(
            &mut game,
            &input,
            &mut tape,
            &plain_ticks(3),
            SIM_DT,
            &PacingPolicy::Deterministic(DeterministicOptions::default()),
            &mut host,
        )
        .unwrap();

        assert_eq!(report.fallback_draws, 4);
    }

    #[test]
    fn default_cadence_renders_near_sixty_fps() {
        let mut game = playing_game();
        let input = ReplayInput::new();
        let mut host = ScriptedHost::new(Vec::new());

        // 120 ticks at 120 tps is one second, so the default cadence
        // lands close to sixty renders.
        let report = play_ticks(
            &mut game,
            &input,
            &mut rand(),
            &plain_ticks(120),
            SIM_DT,
            &PacingPolicy::Deterministic(DeterministicOptions::default()),
            &mut host,
        )
        .unwrap();

        assert_eq!(report.renders, 60);
    }
}
