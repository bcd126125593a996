//! Fixed-timestep accumulation.
//!
//! The simulation advances in constant-`dt` ticks regardless of how
//! frames arrive: each frame's wall-clock delta is added to an
//! accumulator and ticks are drained from it. Tick count is therefore
//! a pure function of elapsed time, which is what makes a recorded run
//! replayable at any frame rate.

/// Simulation ticks per second for runs produced by this engine.
pub const SIM_TPS: f64 = 120.0;

/// Seconds per simulation tick (`1 / `[`SIM_TPS`]).
pub const SIM_DT: f64 = 1.0 / SIM_TPS;

/// Largest wall-clock delta, in seconds, a single frame may contribute
/// to the accumulator.
///
/// A tab left in the background for a minute comes back with one huge
/// frame delta; clamping it keeps the loop from grinding through
/// thousands of catch-up ticks.
pub const MAX_FRAME_DT: f64 = 0.1;

/// Frame-to-tick accumulator for a live game loop.
///
/// Feed it frame timestamps; it calls back once per elapsed tick.
/// The first timestamp only primes the clock. Deltas are clamped to
/// the configured maximum before accumulating.
#[derive(Clone, Debug)]
pub struct FixedStepLoop {
    sim_dt: f64,
    max_frame_dt: f64,
    acc: f64,
    last_ts: Option<f64>,
}

impl FixedStepLoop {
    /// A loop ticking every `sim_dt` seconds, with the default frame
    /// clamp of [`MAX_FRAME_DT`].
    ///
    /// Fails if `sim_dt` is not finite and positive.
    pub fn new(sim_dt: f64) -> Result<Self, String> {
        if !sim_dt.is_finite() || sim_dt <= 0.0 {
            return Err(format!(
                "sim_dt must be finite and positive, got {sim_dt}"
            ));
        }
        Ok(Self {
            sim_dt,
            max_frame_dt: MAX_FRAME_DT,
            acc: 0.0,
            last_ts: None,
        })
    }

    /// Replace the frame clamp.
    ///
    /// Fails if `max_frame_dt` is not finite and positive.
    pub fn with_max_frame(mut self, max_frame_dt: f64) -> Result<Self, String> {
        if !max_frame_dt.is_finite() || max_frame_dt <= 0.0 {
            return Err(format!(
                "max_frame_dt must be finite and positive, got {max_frame_dt}"
            ));
        }
        self.max_frame_dt = max_frame_dt;
        Ok(self)
    }

    /// Advance to the frame at `ts_ms` milliseconds, invoking
    /// `on_tick(sim_dt)` once per elapsed tick. Returns the number of
    /// ticks invoked.
    ///
    /// `on_tick` returns whether to keep ticking; `false` stops the
    /// drain and discards the remaining backlog, so a run that just
    /// ended does not fast-forward on resume. The first call primes
    /// the clock and runs nothing.
    pub fn advance<F>(&mut self, ts_ms: f64, mut on_tick: F) -> u32
    where
        F: FnMut(f64) -> bool,
    {
        let last = match self.last_ts {
            Some(last) => last,
            None => {
                self.last_ts = Some(ts_ms);
                return 0;
            }
        };

        let frame_dt = ((ts_ms - last) / 1000.0).clamp(0.0, self.max_frame_dt);
        self.last_ts = Some(ts_ms);
        self.acc += frame_dt;

        let mut ticks = 0;
        while self.acc >= self.sim_dt {
            self.acc -= self.sim_dt;
            ticks += 1;
            if !on_tick(self.sim_dt) {
                self.acc = 0.0;
                break;
            }
        }
        ticks
    }

    /// Forget the last timestamp and any accumulated backlog. The next
    /// [`advance`](FixedStepLoop::advance) call primes the clock again.
    pub fn reset(&mut self) {
        self.acc = 0.0;
        self.last_ts = None;
    }

    /// Seconds currently accumulated toward the next tick.
    pub fn accumulator(&self) -> f64 {
        self.acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1/128 s: exactly representable, so tick counts are exact too.
    const DT: f64 = 1.0 / 128.0;

    #[test]
    fn rejects_bad_timestep() {
        assert!(FixedStepLoop::new(0.0).is_err());
        assert!(FixedStepLoop::new(-0.01).is_err());
        assert!(FixedStepLoop::new(f64::NAN).is_err());
        assert!(FixedStepLoop::new(f64::INFINITY).is_err());
        assert!(FixedStepLoop::new(DT)
            .unwrap()
            .with_max_frame(0.0)
            .is_err());
    }

    #[test]
    fn first_frame_only_primes() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        let ticks = clock.advance(5_000.0, |_| panic!("tick before priming"));
        assert_eq!(ticks, 0);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn exact_frame_yields_exact_ticks() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        clock.advance(0.0, |_| true);

        // 62.5 ms is 8 ticks of 1/128 s, with no rounding anywhere.
        let ticks = clock.advance(62.5, |dt| {
            assert_eq!(dt, DT);
            true
        });
        assert_eq!(ticks, 8);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        clock.advance(0.0, |_| true);

        // Ten seconds pass, but only MAX_FRAME_DT (0.1 s) accumulates:
        // 0.1 / (1/128) = 12.8, so 12 ticks.
        let ticks = clock.advance(10_000.0, |_| true);
        assert_eq!(ticks, 12);
    }

    #[test]
    fn backwards_time_contributes_nothing() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        clock.advance(1_000.0, |_| true);
        let ticks = clock.advance(500.0, |_| panic!("ticked on negative delta"));
        assert_eq!(ticks, 0);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn callback_false_stops_and_drops_backlog() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        clock.advance(0.0, |_| true);

        let mut ran = 0;
        let ticks = clock.advance(62.5, |_| {
            ran += 1;
            ran < 2
        });
        assert_eq!(ticks, 2);
        assert_eq!(ran, 2);
        assert_eq!(clock.accumulator(), 0.0);
    }

    #[test]
    fn reset_requires_repriming() {
        let mut clock = FixedStepLoop::new(DT).unwrap();
        clock.advance(0.0, |_| true);
        clock.advance(31.25, |_| true);
        clock.reset();

        let ticks = clock.advance(10_000.0, |_| panic!("tick before repriming"));
        assert_eq!(ticks, 0);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn accumulator_stays_under_one_tick(
                deltas in proptest::collection::vec(0.0f64..200.0, 1..50),
            ) {
                let mut clock = FixedStepLoop::new(DT).unwrap();
                let mut ts = 0.0;
                clock.advance(ts, |_| true);
                for d in deltas {
                    ts += d;
                    clock.advance(ts, |_| true);
                    prop_assert!(clock.accumulator() >= 0.0);
                    prop_assert!(clock.accumulator() < DT);
                }
            }
        }
    }
}
