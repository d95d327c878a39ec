//! Boundary policies applied after each position update
//!
//! The set is closed and ordered; the driver holds an index into [`BoundaryPolicy::ALL`]
//! and cycles through it at runtime.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::simulation::states::{Atom, Bounds};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Reflective wall: velocity sign is forced back toward the interior.
    #[default]
    WallBounce,
    /// Reflective wall: velocity is negated whenever the atom is outside.
    WallBounceNegateVelocity,
    /// Periodic domain: the extent is added or subtracted.
    WrapAround,
    /// Teleport to the opposite edge.
    WraparoundClampToBoundary,
}

impl BoundaryPolicy {
    pub const ALL: [BoundaryPolicy; 4] = [
        BoundaryPolicy::WallBounce,
        BoundaryPolicy::WallBounceNegateVelocity,
        BoundaryPolicy::WrapAround,
        BoundaryPolicy::WraparoundClampToBoundary,
    ];

    pub fn index(self) -> usize {
        match self {
            BoundaryPolicy::WallBounce => 0,
            BoundaryPolicy::WallBounceNegateVelocity => 1,
            BoundaryPolicy::WrapAround => 2,
            BoundaryPolicy::WraparoundClampToBoundary => 3,
        }
    }

    /// Policy at `index`, wrapping modulo the list length
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            BoundaryPolicy::WallBounce => "wall_bounce",
            BoundaryPolicy::WallBounceNegateVelocity => "wall_bounce_negate_velocity",
            BoundaryPolicy::WrapAround => "wrap_around",
            BoundaryPolicy::WraparoundClampToBoundary => "wraparound_clamp_to_boundary",
        }
    }

    /// React to an atom whose position may lie outside `bounds`.
    /// Atoms inside the closed rectangle are left untouched.
    pub fn apply(self, atom: &mut Atom, bounds: &Bounds) {
        for k in 0..2 {
            let extent = bounds.extent(k);
            let below = atom.x[k] < 0.0;
            let above = atom.x[k] > extent;
            if !below && !above {
                continue;
            }
            match self {
                BoundaryPolicy::WallBounce => {
                    atom.v[k] = if below { atom.v[k].abs() } else { -atom.v[k].abs() };
                }
                BoundaryPolicy::WallBounceNegateVelocity => {
                    atom.v[k] = -atom.v[k];
                }
                BoundaryPolicy::WrapAround => {
                    atom.x[k] += if below { extent } else { -extent };
                }
                BoundaryPolicy::WraparoundClampToBoundary => {
                    atom.x[k] = if below { extent } else { 0.0 };
                }
            }
        }
    }
}

impl fmt::Display for BoundaryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoundaryPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| ConfigError::UnknownBoundaryPolicy(s.to_string()))
    }
}
