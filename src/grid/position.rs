//! Neuron addresses on a square lattice.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the 2-D lattice.
///
/// Positions are serialized row-major: `index = x * size + y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    /// Row coordinate (0 to size-1).
    pub x: usize,
    /// Column coordinate (0 to size-1).
    pub y: usize,
}

impl GridPosition {
    /// Create a new grid position.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Convert from linear index to 2D position.
    #[inline]
    pub fn from_linear(index: usize, size: usize) -> Self {
        Self {
            x: index / size,
            y: index % size,
        }
    }

    /// Convert to linear index.
    #[inline]
    pub fn to_linear(&self, size: usize) -> usize {
        self.x * size + self.y
    }

    /// Squared Euclidean distance between two lattice positions.
    #[inline]
    pub fn distance_squared(&self, other: &GridPosition) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx * dx + dy * dy
    }

    /// Euclidean distance between two lattice positions.
    #[inline]
    pub fn distance(&self, other: &GridPosition) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

impl From<(usize, usize)> for GridPosition {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
