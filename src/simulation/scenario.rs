//! Simulation driver
//!
//! `Scenario` owns the populations, the domain, the active boundary policy and
//! the fixed timestep. It is built from a [`ScenarioConfig`] (or assembled
//! directly in tests), advanced with [`Scenario::tick`] and read back through
//! [`Scenario::snapshot`] by the renderer.
//!
//! Inserted into Bevy as a `Resource` and driven by the visualization systems.

use std::time::Duration;

use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::configuration::config::ScenarioConfig;
use crate::error::{ConfigError, Result};
use crate::simulation::boundary::BoundaryPolicy;
use crate::simulation::forces::{apply_forces, positions, ForceLaw, InverseDistance};
use crate::simulation::integrator::{integrate, FixedTimestep};
use crate::simulation::spawn::generate_atoms;
use crate::simulation::states::{Bounds, NVec2, Population};
use crate::simulation::stats::{Stats, FRAME_RATE, SIMULATE, STEPS, TICKS};

/// Discrete events produced by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CycleBoundary,
    DumpState,
    Stop,
}

/// Per-atom render data for one displayed frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderAtom<'a> {
    pub position: NVec2, // interpolated display position
    pub previous: NVec2, // raw position at the start of the last step
    pub current: NVec2, // raw authoritative position
    pub color: &'a str,
}

#[derive(Resource)]
pub struct Scenario {
    pub populations: Vec<Population>,
    bounds: Bounds,
    policy: BoundaryPolicy,
    force_law: Box<dyn ForceLaw + Send + Sync>,
    timestep: FixedTimestep,
    stats: Stats,
    steps: u64,
    running: bool,
}

impl Scenario {
    /// Assemble a scenario from already generated populations.
    /// Defaults: inverse-distance law, `wall_bounce`, unbounded catch-up.
    pub fn new(populations: Vec<Population>, bounds: Bounds, timestep: Duration) -> Result<Self> {
        if populations.is_empty() {
            return Err(ConfigError::Empty);
        }
        for p in &populations {
            if let Some(&bad) = p.influencers.iter().find(|&&i| i >= populations.len()) {
                return Err(ConfigError::UnknownInfluencer {
                    population: p.name.clone(),
                    influencer: format!("#{bad}"),
                });
            }
        }
        Ok(Self {
            populations,
            bounds,
            policy: BoundaryPolicy::default(),
            force_law: Box::new(InverseDistance),
            timestep: FixedTimestep::new(timestep, None)?,
            stats: Stats::new(),
            steps: 0,
            running: true,
        })
    }

    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_force_law<F>(mut self, law: F) -> Self
    where
        F: ForceLaw + Send + Sync + 'static,
    {
        self.force_law = Box::new(law);
        self
    }

    /// Fails on `Some(0)`, which would drop every tick
    pub fn with_max_catch_up(mut self, max_steps: Option<usize>) -> Result<Self> {
        self.timestep = FixedTimestep::new(self.timestep.timestep(), max_steps)?;
        Ok(self)
    }

    /// Validate `cfg` and generate populations, seeding from `cfg.engine.seed`
    pub fn build_scenario(cfg: &ScenarioConfig) -> Result<Self> {
        let seed = cfg.engine.seed.unwrap_or_else(|| rand::rng().random());
        info!(seed, "seeding population generator");
        let mut rng = StdRng::seed_from_u64(seed);
        Self::build_scenario_with_rng(cfg, &mut rng)
    }

    pub fn build_scenario_with_rng<R: Rng>(cfg: &ScenarioConfig, rng: &mut R) -> Result<Self> {
        cfg.validate()?;
        let bounds = Bounds::new(cfg.domain.width, cfg.domain.height)?;

        // Populations: map `PopulationConfig` -> runtime `Population` with freshly spawned atoms
        let populations = cfg
            .populations
            .iter()
            .map(|pc| {
                let area = pc.spawn_rect(&cfg.domain);
                let atoms = generate_atoms(&mut *rng, pc.count, &area, pc.attraction, &pc.color);
                cfg.influencer_indices(pc)
                    .into_iter()
                    .fold(Population::new(pc.name.clone(), atoms), Population::influenced_by)
            })
            .collect();

        let timestep = FixedTimestep::duration_from_rate(cfg.engine.fixed_tick_rate)?;
        let mut scenario = Self::new(populations, bounds, timestep)?
            .with_policy(cfg.engine.boundary_policy)
            .with_max_catch_up(cfg.engine.max_catch_up_steps)?;
        scenario.force_law = cfg.engine.force_law.build();

        info!(
            populations = scenario.populations.len(),
            atoms = scenario.atom_count(),
            width = bounds.width(),
            height = bounds.height(),
            policy = %scenario.policy,
            force_law = scenario.force_law.name(),
            "scenario built"
        );
        Ok(scenario)
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn boundary_policy(&self) -> BoundaryPolicy {
        self.policy
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Fixed steps run since construction
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn atom_count(&self) -> usize {
        self.populations.iter().map(Population::len).sum()
    }

    /// Advance to the next policy, wrapping at the end of the list
    pub fn cycle_boundary_policy(&mut self) -> BoundaryPolicy {
        self.policy = self.policy.next();
        info!(policy = %self.policy, "using boundary policy");
        self.policy
    }

    /// Run exactly one fixed step.
    ///
    /// Every population's velocity is updated from a positions snapshot before
    /// any position moves, then every population is integrated.
    pub fn step(&mut self) {
        let dt = self.timestep.timestep().as_secs_f64();
        let snapshot: Vec<Vec<NVec2>> = self.populations.iter().map(|p| positions(&p.atoms)).collect();

        for p in self.populations.iter_mut() {
            let influencers: Vec<NVec2> = p
                .influencers
                .iter()
                .flat_map(|&i| snapshot[i].iter().copied())
                .collect();
            apply_forces(&*self.force_law, &mut p.atoms, &influencers, dt);
        }

        for p in self.populations.iter_mut() {
            integrate(&mut p.atoms, &self.bounds, self.policy);
        }

        self.steps += 1;
        self.stats.add(STEPS, 1);
    }

    /// Feed elapsed real time and run every fixed step that is now due.
    /// Returns the number of steps run.
    pub fn tick(&mut self, elapsed: Duration) -> usize {
        let due = self.timestep.accumulate(elapsed);
        self.stats.start(SIMULATE);
        for _ in 0..due {
            self.step();
        }
        self.stats.stop(SIMULATE);
        self.stats.add(TICKS, 1);
        if !elapsed.is_zero() {
            self.stats.set(FRAME_RATE, (1.0 / elapsed.as_secs_f64()).round() as u64);
        }
        if due > 1 {
            let simulate_ms = self.stats.duration(SIMULATE).unwrap_or_default().as_secs_f64() * 1e3;
            debug!(due, simulate_ms, "catch-up steps");
        }
        due
    }

    /// Interpolation factor for the current frame, in `[0, 1)`
    pub fn alpha(&self) -> f64 {
        self.timestep.alpha()
    }

    /// Interpolated render data for every atom, population by population
    pub fn snapshot(&self) -> Vec<RenderAtom<'_>> {
        let alpha = self.alpha();
        self.populations
            .iter()
            .flat_map(|p| p.atoms.iter())
            .map(|a| RenderAtom {
                position: a.interpolated(alpha),
                previous: a.x_prev,
                current: a.x,
                color: a.color.as_str(),
            })
            .collect()
    }

    /// Input collaborator entry point. Returns whether the simulation keeps running.
    pub fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::CycleBoundary => {
                self.cycle_boundary_policy();
            }
            Command::DumpState => self.dump_state(),
            Command::Stop => {
                info!(steps = self.steps, "stop requested");
                self.running = false;
            }
        }
        self.running
    }

    /// Log every atom and the statistics table
    pub fn dump_state(&self) {
        for p in &self.populations {
            for (i, a) in p.atoms.iter().enumerate() {
                info!(
                    population = %p.name,
                    index = i,
                    x = a.x.x,
                    y = a.x.y,
                    vx = a.v.x,
                    vy = a.v.y,
                    attraction = a.attraction,
                    color = %a.color,
                    "atom"
                );
            }
        }
        info!(policy = %self.policy, steps = self.steps, "\n{}", self.stats);
    }

    /// Atoms currently outside the domain rectangle
    pub fn out_of_bounds(&self) -> usize {
        self.populations
            .iter()
            .flat_map(|p| p.atoms.iter())
            .filter(|a| !self.bounds.contains(&a.x))
            .count()
    }

    /// One log line per population: size, mean speed
    pub fn log_summary(&self) {
        for p in &self.populations {
            info!(population = %p.name, atoms = p.len(), mean_speed = p.mean_speed(), "population");
        }
        info!(steps = self.steps, out_of_bounds = self.out_of_bounds(), policy = %self.policy, "summary");
    }
}
