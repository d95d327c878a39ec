pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Atom, Population, Bounds, NVec2, ColorTag};
pub use simulation::forces::{ForceLaw, InverseDistance, InverseSquare, apply_forces, net_force};
pub use simulation::boundary::BoundaryPolicy;
pub use simulation::integrator::{integrate, FixedTimestep};
pub use simulation::scenario::{Scenario, Command, RenderAtom};
pub use simulation::stats::Stats;

pub use configuration::config::{ScenarioConfig, DomainConfig, EngineConfig, PopulationConfig, SpawnRect, ForceLawConfig};

pub use error::{ConfigError, Result};

pub use visualization::vis2d::run_2d;

pub use benchmark::benchmark::bench_forces;
