//! Addressing for orthotopic (hyper-rectangular) grids of arbitrary dimension.
//!
//! Nodes are numbered with mixed-radix positional weights, most significant
//! axis first, so a `[rows, cols]` grid numbers its nodes row-major exactly
//! like [`GridPosition`](super::GridPosition).

use crate::error::{Result, SomError};
use ndarray::Array2;

/// An N-dimensional grid with extents `dims`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrthotopicGrid {
    dims: Vec<usize>,
    spacing: Vec<usize>,
    n_nodes: usize,
}

impl OrthotopicGrid {
    /// Creates a grid, rejecting empty dimension lists and zero-extent axes.
    pub fn new(dims: &[usize]) -> Result<Self> {
        if dims.is_empty() {
            return Err(SomError::Grid("grid needs at least one axis".to_string()));
        }
        if let Some(axis) = dims.iter().position(|&d| d == 0) {
            return Err(SomError::Grid(format!(
                "axis {} has extent 0 in {:?}",
                axis, dims
            )));
        }

        // spacing[k] = product of dims[k+1..]
        let mut spacing = vec![1usize; dims.len()];
        let mut acc = 1usize;
        for k in (0..dims.len()).rev() {
            spacing[k] = acc;
            acc = acc
                .checked_mul(dims[k])
                .ok_or_else(|| SomError::Grid(format!("grid {:?} has too many nodes", dims)))?;
        }

        Ok(Self {
            dims: dims.to_vec(),
            spacing,
            n_nodes: acc,
        })
    }

    /// Extent of each axis.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Positional weight of each axis.
    pub fn spacing(&self) -> &[usize] {
        &self.spacing
    }

    /// Number of axes.
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Decodes a linear index into its coordinate vector.
    pub fn unserialize(&self, serial: usize) -> Result<Vec<usize>> {
        if serial >= self.n_nodes {
            return Err(SomError::Grid(format!(
                "index {} out of range for {} nodes",
                serial, self.n_nodes
            )));
        }

        let mut rest = serial;
        let coord = self
            .spacing
            .iter()
            .map(|&s| {
                let c = rest / s;
                rest %= s;
                c
            })
            .collect();
        Ok(coord)
    }

    /// Encodes a coordinate vector as a linear index.
    pub fn serialize(&self, coord: &[usize]) -> Result<usize> {
        if coord.len() != self.dims.len() {
            return Err(SomError::Grid(format!(
                "coordinate has {} components, grid has {} axes",
                coord.len(),
                self.dims.len()
            )));
        }
        if let Some(axis) = coord.iter().zip(&self.dims).position(|(&c, &d)| c >= d) {
            return Err(SomError::Grid(format!(
                "coordinate {:?} out of bounds on axis {} (extent {})",
                coord, axis, self.dims[axis]
            )));
        }

        Ok(coord.iter().zip(&self.spacing).map(|(c, s)| c * s).sum())
    }

    /// Linear indices of the nodes one unit step away along exactly one axis.
    ///
    /// For each axis the lower neighbour (if any) precedes the upper one.
    pub fn neighbours(&self, serial: usize) -> Result<Vec<usize>> {
        let coord = self.unserialize(serial)?;
        let mut neighbours = Vec::with_capacity(2 * self.ndim());

        for (k, (&c, &d)) in coord.iter().zip(&self.dims).enumerate() {
            if c > 0 {
                neighbours.push(serial - self.spacing[k]);
            }
            if c + 1 < d {
                neighbours.push(serial + self.spacing[k]);
            }
        }

        Ok(neighbours)
    }

    /// Whether two nodes are adjacent.
    pub fn are_adjacent(&self, a: usize, b: usize) -> Result<bool> {
        Ok(self.neighbours(a)?.contains(&b))
    }

    /// Number of undirected edges in the grid.
    pub fn edge_count(&self) -> usize {
        self.dims
            .iter()
            .map(|&d| (d - 1) * (self.n_nodes / d))
            .sum()
    }

    /// Builds the `n_nodes × n_nodes` adjacency matrix.
    pub fn adjacency(&self) -> Array2<bool> {
        let mut adjacency = Array2::from_elem((self.n_nodes, self.n_nodes), false);

        for i in 0..self.n_nodes {
            let mut rest = i;
            for (k, &s) in self.spacing.iter().enumerate() {
                let c = rest / s;
                rest %= s;
                if c > 0 {
                    adjacency[[i, i - s]] = true;
                }
                if c + 1 < self.dims[k] {
                    adjacency[[i, i + s]] = true;
                }
            }
        }

        adjacency
    }
}

/// Generates the adjacency matrix for the nodes of an orthotopic grid.
pub fn adjacency_matrix(dims: &[usize]) -> Result<Array2<bool>> {
    Ok(OrthotopicGrid::new(dims)?.adjacency())
}
