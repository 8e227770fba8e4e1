//! Configuration for Self-Organizing Map training.

use crate::error::{Result, SomError};
use serde::{Deserialize, Serialize};

/// Default lattice side length.
pub const DEFAULT_SIZE: usize = 16;

/// Default number of training iterations.
pub const DEFAULT_ITERATIONS: usize = 64;

/// Default initial learning rate.
pub const DEFAULT_LEARNING_RATE: f64 = 1.0;

/// Training configuration, fixed for the lifetime of one run.
///
/// The lattice side is not part of the configuration: it comes from the
/// [`InitSpec`](crate::som::InitSpec), either directly or from the shape of
/// a supplied weight array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SomConfig {
    /// Number of training iterations (one sample drawn per iteration).
    /// Default: 64.
    pub n_iterations: usize,

    /// Initial learning rate (alpha in Kohonen 1990).
    /// Default: 1.0.
    pub learning_rate: f64,

    /// Random seed for reproducibility.
    /// Default: None (seeded from entropy).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            n_iterations: DEFAULT_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Sets the number of iterations.
    pub fn with_iterations(mut self, n_iterations: usize) -> Self {
        self.n_iterations = n_iterations;
        self
    }

    /// Sets the initial learning rate.
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that the configuration describes a runnable training schedule.
    pub fn validate(&self) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(SomError::Config(format!(
                "learning_rate must be a positive finite number, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}
