//! Core state types for the particle simulation.
//!
//! - `Atom`       a single point particle (position, velocity, attraction, color)
//! - `Population` a named group of atoms and the populations that pull on it
//! - `Bounds`     the domain rectangle `[0, width] x [0, height]`

use nalgebra::Vector2;

use crate::error::{ConfigError, Result};

pub type NVec2 = Vector2<f64>;

/// Opaque visual tag carried through to the renderer.
pub type ColorTag = String;

#[derive(Debug, Clone)]
pub struct Atom {
    pub x: NVec2, // position
    pub v: NVec2, // velocity, displacement per tick
    pub attraction: f64, // signed, negative attracts
    pub color: ColorTag,
    pub x_prev: NVec2, // position at the start of the last step
}

impl Atom {
    pub fn new(x: NVec2, attraction: f64, color: impl Into<ColorTag>) -> Self {
        Self {
            x,
            v: NVec2::zeros(),
            attraction,
            color: color.into(),
            x_prev: x,
        }
    }

    /// Linear blend between the previous and current position.
    /// Read-only: the authoritative state is left untouched.
    pub fn interpolated(&self, alpha: f64) -> NVec2 {
        self.x_prev * (1.0 - alpha) + self.x * alpha
    }
}

#[derive(Debug, Clone)]
pub struct Population {
    pub name: String,
    pub atoms: Vec<Atom>,
    pub influencers: Vec<usize>, // indices of populations that exert force on this one
}

impl Population {
    pub fn new(name: impl Into<String>, atoms: Vec<Atom>) -> Self {
        Self {
            name: name.into(),
            atoms,
            influencers: Vec::new(),
        }
    }

    /// Register another population (or this one, by its own index) as an influencer
    pub fn influenced_by(mut self, index: usize) -> Self {
        if !self.influencers.contains(&index) {
            self.influencers.push(index);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Mean speed (per tick) over the population, zero when empty
    pub fn mean_speed(&self) -> f64 {
        if self.atoms.is_empty() {
            return 0.0;
        }
        self.atoms.iter().map(|a| a.v.norm()).sum::<f64>() / self.atoms.len() as f64
    }
}

/// Domain rectangle with its origin at (0, 0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    extent: NVec2,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(ConfigError::InvalidBounds(format!("width must be finite and > 0, got {width}")));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(ConfigError::InvalidBounds(format!("height must be finite and > 0, got {height}")));
        }
        Ok(Self { extent: NVec2::new(width, height) })
    }

    pub fn width(&self) -> f64 {
        self.extent.x
    }

    pub fn height(&self) -> f64 {
        self.extent.y
    }

    /// Extent along axis `k` (0 = x, 1 = y)
    pub fn extent(&self, k: usize) -> f64 {
        self.extent[k]
    }

    /// Closed-rectangle containment
    pub fn contains(&self, p: &NVec2) -> bool {
        (0.0..=self.extent.x).contains(&p.x) && (0.0..=self.extent.y).contains(&p.y)
    }
}
