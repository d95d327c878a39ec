pub mod states;
pub mod forces;
pub mod boundary;
pub mod integrator;
pub mod spawn;
pub mod stats;
pub mod scenario;
