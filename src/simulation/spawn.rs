//! Random initial conditions
//!
//! The generator is always passed in, so a seeded `StdRng` reproduces a run exactly.

use rand::Rng;

use crate::configuration::config::SpawnRect;
use crate::simulation::states::{Atom, ColorTag, NVec2};

/// `count` atoms at rest, uniformly placed in `area`
pub fn generate_atoms<R: Rng>(
    rng: &mut R,
    count: usize,
    area: &SpawnRect,
    attraction: f64,
    color: &ColorTag,
) -> Vec<Atom> {
    (0..count)
        .map(|_| {
            let x = NVec2::new(
                area.x + rng.random::<f64>() * area.width,
                area.y + rng.random::<f64>() * area.height,
            );
            Atom::new(x, attraction, color.clone())
        })
        .collect()
}
