//! Neuron representation for the Self-Organizing Map.

use crate::grid::GridPosition;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// A neuron in the Self-Organizing Map.
///
/// Each neuron has a fixed position on the lattice and a prototype weight
/// vector with the same dimensionality as the input samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    /// Position on the lattice.
    pub position: GridPosition,
    /// Prototype weight vector.
    pub weights: Vec<f64>,
}

impl Neuron {
    /// Creates a new neuron with weights drawn uniformly from `[0, 1)`.
    pub fn new_random<R: Rng + ?Sized>(position: GridPosition, dim: usize, rng: &mut R) -> Self {
        let uniform = Uniform::new(0.0, 1.0);
        let weights: Vec<f64> = (0..dim).map(|_| uniform.sample(rng)).collect();

        Self { position, weights }
    }

    /// Creates a new neuron with the given weights.
    pub fn new_with_weights(position: GridPosition, weights: Vec<f64>) -> Self {
        Self { position, weights }
    }

    /// Weight vector dimensionality.
    #[inline]
    pub fn dim(&self) -> usize {
        self.weights.len()
    }

    /// Computes the Euclidean distance between this neuron's weights and an input vector.
    pub fn distance(&self, input: &[f64]) -> f64 {
        self.distance_squared(input).sqrt()
    }

    /// Computes the squared Euclidean distance (avoids sqrt).
    #[inline]
    pub fn distance_squared(&self, input: &[f64]) -> f64 {
        debug_assert_eq!(
            self.weights.len(),
            input.len(),
            "Weight and input dimensions must match"
        );

        self.weights
            .iter()
            .zip(input.iter())
            .map(|(w, i)| (w - i).powi(2))
            .sum()
    }

    /// Moves the weights towards an input vector.
    ///
    /// `learning_rate` is the current learning rate.
    /// `neighborhood` is the kernel value for this neuron (0.0 to 1.0).
    pub fn update_weights(&mut self, input: &[f64], learning_rate: f64, neighborhood: f64) {
        let influence = learning_rate * neighborhood;

        for (w, i) in self.weights.iter_mut().zip(input.iter()) {
            *w += influence * (i - *w);
        }
    }
}
