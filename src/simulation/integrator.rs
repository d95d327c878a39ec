//! Fixed-step time integration
//!
//! `integrate` advances one population by one tick. `FixedTimestep` turns
//! variable frame times into a whole number of ticks plus an interpolation alpha.

use std::time::Duration;

use tracing::warn;

use super::boundary::BoundaryPolicy;
use super::states::{Atom, Bounds};
use crate::error::{ConfigError, Result};

/// Advance every atom by one tick and apply the boundary policy.
///
/// Order per atom: snapshot `x_prev`, `x += v`, boundary correction on the
/// post-update (possibly out of bounds) position. Velocity already carries dt,
/// so no scaling happens here.
pub fn integrate(atoms: &mut [Atom], bounds: &Bounds, policy: BoundaryPolicy) {
    for atom in atoms.iter_mut() {
        atom.x_prev = atom.x;
        atom.x += atom.v;
        policy.apply(atom, bounds);
    }
}

/// Time-debt accumulator for a fixed tick decoupled from the render rate.
///
/// Debt is kept as a `Duration` (integer nanoseconds), so the number of ticks
/// produced does not depend on how elapsed time is chunked across calls.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    timestep: Duration,
    overstep: Duration,
    max_steps: Option<usize>, // catch-up cap per call, None = unbounded
}

impl FixedTimestep {
    /// Rejects a zero timestep and a zero cap, either of which stalls `accumulate`
    pub fn new(timestep: Duration, max_steps: Option<usize>) -> Result<Self> {
        if timestep.is_zero() {
            return Err(ConfigError::InvalidTimestep("tick duration must be > 0".into()));
        }
        if max_steps == Some(0) {
            return Err(ConfigError::InvalidTimestep("max_catch_up_steps must be > 0".into()));
        }
        Ok(Self {
            timestep,
            overstep: Duration::ZERO,
            max_steps,
        })
    }

    /// Tick duration for a rate in ticks per second
    pub fn duration_from_rate(ticks_per_second: f64) -> Result<Duration> {
        if !ticks_per_second.is_finite() || ticks_per_second <= 0.0 {
            return Err(ConfigError::InvalidTimestep(format!(
                "fixed_tick_rate must be finite and > 0, got {ticks_per_second}"
            )));
        }
        Duration::try_from_secs_f64(1.0 / ticks_per_second).map_err(|e| {
            ConfigError::InvalidTimestep(format!("fixed_tick_rate {ticks_per_second} gives an unusable tick: {e}"))
        })
    }

    pub fn timestep(&self) -> Duration {
        self.timestep
    }

    pub fn overstep(&self) -> Duration {
        self.overstep
    }

    /// Add elapsed real time and return how many ticks are now due.
    ///
    /// The debt is consumed up front; callers run exactly the returned number of
    /// steps. With a cap, excess whole ticks are dropped and only the fractional
    /// remainder survives.
    pub fn accumulate(&mut self, elapsed: Duration) -> usize {
        self.overstep += elapsed;
        let mut steps = 0usize;
        while self.overstep >= self.timestep {
            if self.max_steps.is_some_and(|cap| steps >= cap) {
                let dropped = (self.overstep.as_nanos() / self.timestep.as_nanos()) as u64;
                self.overstep = remainder(self.overstep, self.timestep);
                warn!(dropped, cap = steps, "catch-up cap reached, dropping ticks");
                break;
            }
            self.overstep -= self.timestep;
            steps += 1;
        }
        steps
    }

    /// Unconsumed debt as a fraction of one tick, in `[0, 1)`
    pub fn alpha(&self) -> f64 {
        self.overstep.as_secs_f64() / self.timestep.as_secs_f64()
    }
}

fn remainder(a: Duration, b: Duration) -> Duration {
    let nanos = a.as_nanos() % b.as_nanos();
    // below one timestep, always fits in u64
    Duration::from_nanos(nanos as u64)
}
