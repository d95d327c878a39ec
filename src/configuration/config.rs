//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`DomainConfig`]     – the domain rectangle
//! - [`EngineConfig`]     – tick rate, catch-up cap, boundary policy, force law, seed
//! - [`PopulationConfig`] – one entry per group of atoms
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! domain:
//!   width: 500.0
//!   height: 500.0
//!
//! engine:
//!   fixed_tick_rate: 15.0          # ticks per second
//!   max_catch_up_steps: 8          # optional, omit for unbounded catch-up
//!   boundary_policy: wall_bounce   # wall_bounce | wall_bounce_negate_velocity
//!                                  # | wrap_around | wraparound_clamp_to_boundary
//!   force_law: inverse_distance    # or inverse_square
//!   seed: 42                       # optional
//!
//! populations:
//!   - name: red
//!     count: 50
//!     attraction: -0.2
//!     color: red
//!     influenced_by: [red]
//!   - name: green
//!     count: 50
//!     attraction: -0.1
//!     color: green
//!     spawn: { x: 125.0, y: 125.0, width: 250.0, height: 250.0 }
//!     influenced_by: [red]
//! ```
//!
//! `spawn` defaults to the central half of the domain. Call
//! [`ScenarioConfig::validate`] before building a runtime scenario.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{ConfigError, Result};
use crate::simulation::boundary::BoundaryPolicy;
use crate::simulation::forces::{ForceLaw, InverseDistance, InverseSquare};
use crate::simulation::integrator::FixedTimestep;
use crate::simulation::states::Bounds;

/// Upper limit on the tick rate, keeps the timestep above one nanosecond
pub const MAX_TICK_RATE: f64 = 1.0e6;

/// Domain rectangle, origin at (0, 0)
#[derive(Deserialize, Debug, Clone, Copy)]
pub struct DomainConfig {
    pub width: f64,
    pub height: f64,
}

/// Which force law drives the pairwise interaction
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ForceLawConfig {
    #[default]
    #[serde(rename = "inverse_distance")] // attraction / dist
    InverseDistance,

    #[serde(rename = "inverse_square")] // attraction / dist^2, experimental
    InverseSquare,
}

impl ForceLawConfig {
    pub fn build(self) -> Box<dyn ForceLaw + Send + Sync> {
        match self {
            ForceLawConfig::InverseDistance => Box::new(InverseDistance),
            ForceLawConfig::InverseSquare => Box::new(InverseSquare),
        }
    }
}

/// Engine-level settings
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    pub fixed_tick_rate: f64, // ticks per second
    #[serde(default)]
    pub max_catch_up_steps: Option<usize>, // None reproduces unbounded catch-up
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy, // initial policy, cyclable at runtime
    #[serde(default)]
    pub force_law: ForceLawConfig,
    #[serde(default)]
    pub seed: Option<u64>, // None draws a seed from the thread rng
}

/// Axis-aligned spawn area in domain units
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SpawnRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SpawnRect {
    /// Central half of the domain: `[w/4, 3w/4] x [h/4, 3h/4]`
    pub fn centered(domain: &DomainConfig) -> Self {
        Self {
            x: domain.width / 4.0,
            y: domain.height / 4.0,
            width: domain.width / 2.0,
            height: domain.height / 2.0,
        }
    }

    fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height].iter().all(|c| c.is_finite())
    }
}

/// Configuration for one population
#[derive(Deserialize, Debug, Clone)]
pub struct PopulationConfig {
    pub name: String,
    pub count: usize,
    pub attraction: f64, // shared by every atom of the population
    pub color: String, // opaque to the core, resolved by the renderer
    #[serde(default)]
    pub spawn: Option<SpawnRect>,
    #[serde(default)]
    pub influenced_by: Vec<String>, // names of populations that pull on this one
}

impl PopulationConfig {
    pub fn spawn_rect(&self, domain: &DomainConfig) -> SpawnRect {
        self.spawn.unwrap_or_else(|| SpawnRect::centered(domain))
    }
}

/// Top-level scenario configuration loaded from YAML
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub domain: DomainConfig,
    pub engine: EngineConfig,
    pub populations: Vec<PopulationConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    /// Fail fast on anything that would stop the simulation from running
    pub fn validate(&self) -> Result<()> {
        let bounds = Bounds::new(self.domain.width, self.domain.height)?;

        let rate = self.engine.fixed_tick_rate;
        if !rate.is_finite() || rate <= 0.0 || rate > MAX_TICK_RATE {
            return Err(ConfigError::InvalidTimestep(format!(
                "fixed_tick_rate must be in (0, {MAX_TICK_RATE}], got {rate}"
            )));
        }
        // very small rates overflow `Duration`; same checks the driver runs
        let tick = FixedTimestep::duration_from_rate(rate)?;
        FixedTimestep::new(tick, self.engine.max_catch_up_steps)?;

        if self.populations.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut names = HashSet::new();
        for p in &self.populations {
            if !names.insert(p.name.as_str()) {
                return Err(invalid(p, "duplicate population name"));
            }
        }

        for p in &self.populations {
            if !p.attraction.is_finite() {
                return Err(invalid(p, "attraction must be finite"));
            }
            let r = p.spawn_rect(&self.domain);
            if !r.is_finite() || r.width < 0.0 || r.height < 0.0 {
                return Err(invalid(p, "spawn area must be finite with non-negative size"));
            }
            if r.x < 0.0 || r.y < 0.0 || r.x + r.width > bounds.width() || r.y + r.height > bounds.height() {
                return Err(invalid(p, "spawn area must lie inside the domain"));
            }
            if let Some(unknown) = p.influenced_by.iter().find(|n| !names.contains(n.as_str())) {
                return Err(ConfigError::UnknownInfluencer {
                    population: p.name.clone(),
                    influencer: unknown.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve `influenced_by` names into population indices
    pub fn influencer_indices(&self, p: &PopulationConfig) -> Vec<usize> {
        p.influenced_by
            .iter()
            .filter_map(|n| self.populations.iter().position(|q| &q.name == n))
            .collect()
    }
}

fn invalid(p: &PopulationConfig, reason: &str) -> ConfigError {
    ConfigError::InvalidPopulation {
        name: p.name.clone(),
        reason: reason.to_string(),
    }
}
