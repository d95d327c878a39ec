//! Pairwise attraction / repulsion between atoms
//!
//! Force laws implement [`ForceLaw`]; [`apply_forces`] sums the contribution of
//! every influencer on every target and turns it into a velocity delta.

use crate::simulation::states::{Atom, NVec2};

/// Fixed factor applied when converting accumulated force into a velocity delta
pub const VELOCITY_SCALE: f64 = 0.5;

/// Scalar coefficient of a pairwise interaction.
/// The force on the target is `offset * coefficient(attraction, |offset|)`
/// where `offset = target - influencer`, so a negative coefficient pulls.
pub trait ForceLaw {
    fn coefficient(&self, attraction: f64, dist: f64) -> f64;

    fn name(&self) -> &'static str;
}

/// `attraction / dist`. The force magnitude is independent of distance,
/// only its direction changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseDistance;

impl ForceLaw for InverseDistance {
    fn coefficient(&self, attraction: f64, dist: f64) -> f64 {
        attraction / dist
    }

    fn name(&self) -> &'static str {
        "inverse_distance"
    }
}

/// `attraction / dist^2`. Experimental, decays with distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct InverseSquare;

impl ForceLaw for InverseSquare {
    fn coefficient(&self, attraction: f64, dist: f64) -> f64 {
        attraction / (dist * dist)
    }

    fn name(&self) -> &'static str {
        "inverse_square"
    }
}

/// Net force on a single point from a set of influencer positions.
/// Coincident points (distance zero, including the point itself) contribute nothing.
pub fn net_force(law: &dyn ForceLaw, x: NVec2, attraction: f64, influencers: &[NVec2]) -> NVec2 {
    let mut force = NVec2::zeros();
    for q in influencers {
        let d = x - q;
        let dist = d.norm();
        if dist > 0.0 {
            force += d * law.coefficient(attraction, dist);
        }
    }
    force
}

/// Update the velocity of every target from the influencer positions.
///
/// `influencers` is a position snapshot, so it may be taken from `targets` itself
/// (self-attraction) without aliasing. Positions of `targets` are not modified.
pub fn apply_forces(law: &dyn ForceLaw, targets: &mut [Atom], influencers: &[NVec2], dt: f64) {
    for atom in targets.iter_mut() {
        let f = net_force(law, atom.x, atom.attraction, influencers);
        atom.v += f * dt * VELOCITY_SCALE;
    }
}

/// Collect the current positions of a set of atoms
pub fn positions(atoms: &[Atom]) -> Vec<NVec2> {
    atoms.iter().map(|a| a.x).collect()
}
