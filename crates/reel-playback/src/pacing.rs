//! Pacing policies and the frame-to-tick budget.

use reel_core::MAX_FRAME_DT;

/// Tick rate replays are simulated at, matching the recording rate.
pub const REPLAY_TPS: f64 = reel_core::SIM_TPS;

/// Frame rate the realtime policy budgets against.
pub const REPLAY_TARGET_FPS: f64 = 60.0;

/// Render cadence target for the deterministic policy.
pub const DEFAULT_RENDER_FPS: f64 = 60.0;

/// Capture frame rate when the caller does not specify one.
pub const DEFAULT_CAPTURE_FPS: f64 = 60.0;

/// Slack added when testing the budget, absorbing float drift from
/// repeated accumulate-and-subtract cycles.
pub const BUDGET_EPSILON: f64 = 1e-9;

/// Seconds of budget one replay tick costs.
///
/// Never less than half a tick at [`REPLAY_TPS`], so a degenerate
/// `sim_dt` cannot make playback spin unboundedly within one frame.
pub fn tick_step(sim_dt: f64) -> f64 {
    sim_dt.max(1.0 / (REPLAY_TPS * 2.0))
}

/// Ticks per render that keep the deterministic policy near
/// [`DEFAULT_RENDER_FPS`].
pub fn default_render_cadence(sim_dt: f64) -> u32 {
    let ticks_per_second = 1.0 / sim_dt;
    ((ticks_per_second / DEFAULT_RENDER_FPS).round() as u32).max(1)
}

// ── Policies ───────────────────────────────────────────────────────

/// How replay ticks are scheduled against frames.
#[derive(Clone, Debug)]
pub enum PacingPolicy {
    /// Budgeted wall-clock pacing: ticks accrue from frame deltas, so
    /// the replay advances at recorded speed whatever the frame rate
    /// and renders once per frame.
    Realtime,
    /// Exactly one tick per frame, for hosts that own the clock
    /// (capture pipelines, frame-locked encoders).
    CaptureLocked,
    /// Apply ticks as fast as possible with explicit render
    /// scheduling.
    Deterministic(DeterministicOptions),
}

/// Scheduling knobs for [`PacingPolicy::Deterministic`].
#[derive(Clone, Debug)]
pub struct DeterministicOptions {
    /// Render every N ticks; `None` derives a cadence near
    /// [`DEFAULT_RENDER_FPS`] from the timestep.
    pub render_every: Option<u32>,
    /// Render after every tick, ignoring the cadence.
    pub render_always: bool,
    /// Render the final state even when it falls off-cadence.
    pub render_final: bool,
    /// Yield to the host after each render.
    pub yield_between_renders: bool,
    /// Sleep after renders so playback tracks recorded wall time.
    pub pace_with_sim: bool,
}

impl Default for DeterministicOptions {
    fn default() -> Self {
        Self {
            render_every: None,
            render_always: false,
            render_final: true,
            yield_between_renders: false,
            pace_with_sim: false,
        }
    }
}

// ── TickBudget ─────────────────────────────────────────────────────

/// Converts frame arrivals into tick grants for the realtime policy.
///
/// Budget accrues from frame deltas, clamped per frame to
/// [`MAX_FRAME_DT`] so a stalled host does not trigger a tick
/// avalanche. Priming credits one target frame up front, so playback
/// makes progress on its very first frame instead of idling a full
/// frame interval.
#[derive(Clone, Debug)]
pub struct TickBudget {
    tick_step: f64,
    acc: f64,
    last_ts: Option<f64>,
}

impl TickBudget {
    /// A budget for ticks of `sim_dt` seconds.
    pub fn new(sim_dt: f64) -> Self {
        Self {
            tick_step: tick_step(sim_dt),
            acc: 0.0,
            last_ts: None,
        }
    }

    /// Credit the opening frame at `ts_ms` and start the clock.
    pub fn prime(&mut self, ts_ms: f64) {
        self.last_ts = Some(ts_ms);
        self.acc += MAX_FRAME_DT.min(1.0 / REPLAY_TARGET_FPS);
    }

    /// Credit the frame at `ts_ms`.
    pub fn push_frame(&mut self, ts_ms: f64) {
        let Some(last) = self.last_ts else {
            self.prime(ts_ms);
            return;
        };
        let dt = ((ts_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT);
        self.acc += dt;
        self.last_ts = Some(ts_ms);
    }

    /// Spend one tick of budget, if enough has accrued.
    pub fn take_tick(&mut self) -> bool {
        if self.acc + BUDGET_EPSILON >= self.tick_step {
            self.acc -= self.tick_step;
            return true;
        }
        false
    }

    /// Seconds of unspent budget.
    pub fn remaining(&self) -> f64 {
        self.acc
    }
}
