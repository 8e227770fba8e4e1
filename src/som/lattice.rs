//! The square neuron lattice.

use crate::error::{Result, SomError};
use crate::grid::{GridPosition, OrthotopicGrid};
use crate::som::schedule::neighborhood_kernel;
use crate::som::Neuron;
use ndarray::{Array3, ArrayBase, ArrayD, ArrayView2, Data, Ix2, Ix3};
use rand::Rng;
use rayon::prelude::*;

/// A square 2-D lattice of neurons.
///
/// The lattice has `size × size` neurons stored row-major, all with weight
/// vectors of length `dim`. Both are fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    size: usize,
    dim: usize,
    neurons: Vec<Neuron>,
}

impl Lattice {
    /// Creates a lattice with weights drawn uniformly from `[0, 1)`.
    pub fn random<R: Rng + ?Sized>(size: usize, dim: usize, rng: &mut R) -> Result<Self> {
        Self::check_extents(size, dim)?;

        let neurons = (0..size * size)
            .map(|i| Neuron::new_random(GridPosition::from_linear(i, size), dim, rng))
            .collect();

        Ok(Self { size, dim, neurons })
    }

    /// Creates a lattice from a `[size, size, dim]` weight array.
    pub fn from_array(weights: &Array3<f64>) -> Result<Self> {
        let (rows, cols, dim) = weights.dim();
        if rows != cols {
            return Err(SomError::Shape(format!(
                "lattice must be square, got {} x {}",
                rows, cols
            )));
        }
        Self::check_extents(rows, dim)?;

        let neurons = weights
            .outer_iter()
            .enumerate()
            .flat_map(|(x, plane)| {
                plane
                    .outer_iter()
                    .enumerate()
                    .map(move |(y, w)| Neuron::new_with_weights(GridPosition::new(x, y), w.to_vec()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Ok(Self {
            size: rows,
            dim,
            neurons,
        })
    }

    /// Creates a lattice from an array of unknown rank, which must be 3-D.
    pub fn from_array_dyn(weights: ArrayD<f64>) -> Result<Self> {
        let ndim = weights.ndim();
        let weights = weights.into_dimensionality::<Ix3>().map_err(|_| {
            SomError::Shape(format!(
                "initial lattice must be a 3-D [size, size, dim] array, got {} dimension(s)",
                ndim
            ))
        })?;
        Self::from_array(&weights)
    }

    fn check_extents(size: usize, dim: usize) -> Result<()> {
        if size == 0 {
            return Err(SomError::Config("lattice size must be positive".to_string()));
        }
        if dim == 0 {
            return Err(SomError::Shape(
                "neuron weight vectors must have at least one component".to_string(),
            ));
        }
        Ok(())
    }

    /// Lattice side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Weight vector dimensionality.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns the total number of neurons.
    #[inline]
    pub fn total_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// The neurons in row-major order.
    #[inline]
    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    /// Gets a neuron by its linear index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Neuron> {
        self.neurons.get(index)
    }

    /// Gets a neuron by its lattice position.
    #[inline]
    pub fn get_at(&self, pos: GridPosition) -> Option<&Neuron> {
        if pos.x < self.size && pos.y < self.size {
            Some(&self.neurons[pos.to_linear(self.size)])
        } else {
            None
        }
    }

    /// Copies the weights into a `[size, size, dim]` array.
    pub fn to_array(&self) -> Array3<f64> {
        let mut out = Array3::zeros((self.size, self.size, self.dim));
        for neuron in &self.neurons {
            let GridPosition { x, y } = neuron.position;
            for (k, &w) in neuron.weights.iter().enumerate() {
                out[[x, y, k]] = w;
            }
        }
        out
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.dim {
            return Err(SomError::DimensionMismatch {
                expected: self.dim,
                found: input.len(),
            });
        }
        if let Some(v) = input.iter().find(|v| !v.is_finite()) {
            return Err(SomError::NonFinite(format!("input contains {}", v)));
        }
        Ok(())
    }

    /// Finds the Best Matching Unit (BMU) for an input vector.
    ///
    /// The BMU is the neuron with the smallest squared Euclidean distance to
    /// the input. Ties go to the lowest linear index.
    pub fn best_matching_centre(&self, input: &[f64]) -> Result<GridPosition> {
        self.check_input(input)?;
        let (idx, _) = self.scan_bmu(input);
        Ok(GridPosition::from_linear(idx, self.size))
    }

    /// Finds the BMU in parallel.
    ///
    /// Returns the same position as [`best_matching_centre`](Self::best_matching_centre);
    /// only worth it for large maps.
    pub fn best_matching_centre_parallel(&self, input: &[f64]) -> Result<GridPosition> {
        self.check_input(input)?;

        let (idx, _) = self
            .neurons
            .par_iter()
            .enumerate()
            .map(|(i, n)| (i, n.distance_squared(input)))
            .reduce(
                || (usize::MAX, f64::INFINITY),
                |a, b| {
                    // Total order on (distance, index) so the reduction tree
                    // cannot change the winner.
                    if b.1 < a.1 || (b.1 == a.1 && b.0 < a.0) || a.0 == usize::MAX {
                        b
                    } else {
                        a
                    }
                },
            );

        Ok(GridPosition::from_linear(idx, self.size))
    }

    /// Sequential BMU scan. Strict `<` keeps the first minimum.
    #[inline]
    fn scan_bmu(&self, input: &[f64]) -> (usize, f64) {
        let mut best_idx = 0;
        let mut best_dist = f64::INFINITY;

        for (i, neuron) in self.neurons.iter().enumerate() {
            let dist = neuron.distance_squared(input);
            if dist < best_dist {
                best_dist = dist;
                best_idx = i;
            }
        }

        (best_idx, best_dist)
    }

    /// Indices of the best and second-best matching units.
    fn two_best(&self, input: &[f64]) -> (usize, Option<usize>) {
        let mut first: Option<(usize, f64)> = None;
        let mut second: Option<(usize, f64)> = None;

        for (i, neuron) in self.neurons.iter().enumerate() {
            let dist = neuron.distance_squared(input);
            if first.map_or(true, |(_, d)| dist < d) {
                second = first;
                first = Some((i, dist));
            } else if second.map_or(true, |(_, d)| dist < d) {
                second = Some((i, dist));
            }
        }

        (first.map_or(0, |(i, _)| i), second.map(|(i, _)| i))
    }

    /// All positions strictly within Euclidean lattice distance `radius` of
    /// `center`, in row-major order.
    ///
    /// A non-positive radius yields no positions; any positive radius
    /// includes the center itself. `center` may lie off the lattice, in which
    /// case only the on-lattice positions within `radius` are returned.
    pub fn neurons_in_radius(&self, center: GridPosition, radius: f64) -> Vec<GridPosition> {
        if radius.is_nan() || radius <= 0.0 {
            return Vec::new();
        }

        // Float-to-int casts saturate, so an infinite radius gives usize::MAX.
        let reach = radius.ceil() as usize;
        let x_lo = center.x.saturating_sub(reach);
        let x_hi = center.x.saturating_add(reach).min(self.size - 1);
        let y_lo = center.y.saturating_sub(reach);
        let y_hi = center.y.saturating_add(reach).min(self.size - 1);

        let mut positions = Vec::new();
        for x in x_lo..=x_hi {
            for y in y_lo..=y_hi {
                let pos = GridPosition::new(x, y);
                if center.distance(&pos) < radius {
                    positions.push(pos);
                }
            }
        }

        positions
    }

    /// Pulls every neuron within `radius` of `bmu` towards `input`.
    ///
    /// Each neuron moves by `exp(−d² / radius) · learning_rate` of its
    /// distance to the input, where `d` is its lattice distance to the BMU.
    pub fn update(
        &mut self,
        input: &[f64],
        bmu: GridPosition,
        learning_rate: f64,
        radius: f64,
    ) -> Result<()> {
        self.check_input(input)?;
        if bmu.x >= self.size || bmu.y >= self.size {
            return Err(SomError::Grid(format!(
                "BMU {} outside a {}x{} lattice",
                bmu, self.size, self.size
            )));
        }

        for pos in self.neurons_in_radius(bmu, radius) {
            let neighborhood = neighborhood_kernel(bmu.distance_squared(&pos), radius);
            self.neurons[pos.to_linear(self.size)].update_weights(input, learning_rate, neighborhood);
        }

        Ok(())
    }

    /// Labels every row of `samples` with its BMU, in row order.
    pub fn best_matching_centres(&self, samples: ArrayView2<'_, f64>) -> Result<Vec<GridPosition>> {
        let standard = samples.as_standard_layout();
        let rows = contiguous_rows(&standard)?;
        if let Some(row) = rows.first() {
            self.check_input(row)?;
        }
        check_finite(&rows)?;

        Ok(rows
            .par_iter()
            .map(|row| GridPosition::from_linear(self.scan_bmu(row).0, self.size))
            .collect())
    }

    /// Mean Euclidean distance between each sample and its BMU's weights.
    pub fn quantization_error(&self, samples: ArrayView2<'_, f64>) -> Result<f64> {
        let standard = samples.as_standard_layout();
        let rows = self.checked_rows(&standard)?;

        let distances: Vec<f64> = rows
            .par_iter()
            .map(|row| self.scan_bmu(row).1.sqrt())
            .collect();
        // Summed in row order so repeated calls agree to the last bit.
        let total: f64 = distances.iter().sum();
        Ok(total / rows.len() as f64)
    }

    /// Fraction of samples whose best and second-best units are not
    /// 4-adjacent on the lattice.
    pub fn topographic_error(&self, samples: ArrayView2<'_, f64>) -> Result<f64> {
        let standard = samples.as_standard_layout();
        let rows = self.checked_rows(&standard)?;
        let grid = OrthotopicGrid::new(&[self.size, self.size])?;

        let errors = rows
            .par_iter()
            .map(|row| match self.two_best(row) {
                (first, Some(second)) => grid.are_adjacent(first, second).map(|adj| !adj as usize),
                (_, None) => Ok(0),
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(errors.iter().sum::<usize>() as f64 / rows.len() as f64)
    }

    fn checked_rows<'a, S>(&self, samples: &'a ArrayBase<S, Ix2>) -> Result<Vec<&'a [f64]>>
    where
        S: Data<Elem = f64>,
    {
        let rows = contiguous_rows(samples)?;
        match rows.first() {
            None => Err(SomError::EmptyInput("no samples to evaluate".to_string())),
            Some(row) => {
                self.check_input(row)?;
                check_finite(&rows)?;
                Ok(rows)
            }
        }
    }
}

/// Borrows the rows of a standard-layout sample matrix as slices.
pub(crate) fn contiguous_rows<'a, S>(samples: &'a ArrayBase<S, Ix2>) -> Result<Vec<&'a [f64]>>
where
    S: Data<Elem = f64>,
{
    samples
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            row.to_slice()
                .ok_or_else(|| SomError::Shape(format!("sample row {} is not contiguous", i)))
        })
        .collect()
}

/// Rejects sample rows holding NaN or an infinity.
pub(crate) fn check_finite(rows: &[&[f64]]) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        if let Some(j) = row.iter().position(|v| !v.is_finite()) {
            return Err(SomError::NonFinite(format!(
                "sample {} feature {} is {}",
                i, j, row[j]
            )));
        }
    }
    Ok(())
}
