//! Lattice addressing.
//!
//! - [`GridPosition`]: the `(x, y)` address of a neuron on a square 2-D lattice
//! - [`OrthotopicGrid`]: mixed-radix addressing and 2N-connected adjacency for
//!   hyper-rectangular grids of any dimension

mod orthotope;
mod position;

pub use orthotope::{adjacency_matrix, OrthotopicGrid};
pub use position::GridPosition;
