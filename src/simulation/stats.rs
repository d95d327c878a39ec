//! Runtime statistics: named timers and counters for diagnostics
//!
//! Timers record the span between `start` and `stop`; values hold the last
//! number set under a name. Both print sorted by name.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

pub const SIMULATE: &str = "Simulate";
pub const STEPS: &str = "Steps";
pub const TICKS: &str = "Ticks";
pub const FRAME_RATE: &str = "Frame Rate";

#[derive(Debug, Default, Clone)]
struct Timer {
    started: Option<Instant>,
    last: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct Stats {
    timers: BTreeMap<&'static str, Timer>,
    values: BTreeMap<&'static str, u64>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, name: &'static str) {
        self.timers.entry(name).or_default().started = Some(Instant::now());
    }

    /// Stop a running timer. A timer that was never started keeps its last value.
    pub fn stop(&mut self, name: &'static str) {
        let timer = self.timers.entry(name).or_default();
        if let Some(t0) = timer.started.take() {
            timer.last = t0.elapsed();
        }
    }

    pub fn set(&mut self, name: &'static str, value: u64) {
        self.values.insert(name, value);
    }

    pub fn add(&mut self, name: &'static str, delta: u64) {
        *self.values.entry(name).or_default() += delta;
    }

    pub fn value(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    pub fn duration(&self, name: &str) -> Option<Duration> {
        self.timers.get(name).map(|t| t.last)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics:")?;
        for (name, timer) in &self.timers {
            writeln!(f, "{name}: {:.3} ms", timer.last.as_secs_f64() * 1e3)?;
        }
        for (name, v) in &self.values {
            writeln!(f, "{name}: {v}")?;
        }
        Ok(())
    }
}
