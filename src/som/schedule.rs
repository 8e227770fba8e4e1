//! Exponential decay schedule for the learning rate and neighbourhood radius.

use crate::error::{Result, SomError};

/// Learning-rate and radius decay for one training run.
///
/// Both quantities share the time constant `λ = n_iterations / size`:
///
/// - `lr(t) = α₀ · exp(−t / λ)`
/// - `radius(t) = size · exp(−t / λ)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecaySchedule {
    size: usize,
    n_iterations: usize,
    initial_learning_rate: f64,
    time_constant: f64,
}

impl DecaySchedule {
    /// Creates the schedule for a lattice of side `size`.
    ///
    /// Fails if `size` is zero or the learning rate is not a positive finite
    /// number.
    pub fn new(size: usize, n_iterations: usize, initial_learning_rate: f64) -> Result<Self> {
        if size == 0 {
            return Err(SomError::Config("lattice size must be at least 1".to_string()));
        }
        if !initial_learning_rate.is_finite() || initial_learning_rate <= 0.0 {
            return Err(SomError::Config(format!(
                "learning rate must be positive and finite, got {}",
                initial_learning_rate
            )));
        }

        Ok(Self {
            size,
            n_iterations,
            initial_learning_rate,
            time_constant: n_iterations as f64 / size as f64,
        })
    }

    /// Lattice side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of iterations.
    #[inline]
    pub fn n_iterations(&self) -> usize {
        self.n_iterations
    }

    /// Initial learning rate.
    #[inline]
    pub fn initial_learning_rate(&self) -> f64 {
        self.initial_learning_rate
    }

    /// The time constant `λ`.
    #[inline]
    pub fn time_constant(&self) -> f64 {
        self.time_constant
    }

    #[inline]
    fn decay(&self, iteration: usize) -> f64 {
        // λ is zero for an empty run; t = 0 must still give the initial values.
        if iteration == 0 {
            return 1.0;
        }
        (-(iteration as f64) / self.time_constant).exp()
    }

    /// Computes the learning rate at a given iteration.
    #[inline]
    pub fn learning_rate(&self, iteration: usize) -> f64 {
        self.initial_learning_rate * self.decay(iteration)
    }

    /// Computes the neighborhood radius at a given iteration.
    #[inline]
    pub fn radius(&self, iteration: usize) -> f64 {
        self.size as f64 * self.decay(iteration)
    }
}

/// Neighbourhood kernel `exp(−d² / radius)` for a squared lattice distance `d²`.
///
/// The denominator is the radius itself, not `2·radius²`.
#[inline]
pub fn neighborhood_kernel(distance_squared: f64, radius: f64) -> f64 {
    (-distance_squared / radius).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_constant() {
        let schedule = DecaySchedule::new(4, 100, 0.5).unwrap();
        assert!((schedule.time_constant() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_learning_rate_decay() {
        let schedule = DecaySchedule::new(8, 100, 0.1).unwrap();

        assert_eq!(schedule.learning_rate(0), 0.1);
        let mut prev = schedule.learning_rate(0);
        for t in 1..100 {
            let lr = schedule.learning_rate(t);
            assert!(lr < prev);
            assert!(lr > 0.0);
            prev = lr;
        }
        // exp(-99 / 12.5)
        assert!((schedule.learning_rate(99) - 0.1 * (-7.92f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_radius_decay() {
        let schedule = DecaySchedule::new(8, 100, 0.1).unwrap();

        assert_eq!(schedule.radius(0), 8.0);
        let mut prev = schedule.radius(0);
        for t in 1..100 {
            let r = schedule.radius(t);
            assert!(r < prev);
            prev = r;
        }
        assert!(schedule.radius(99) < 0.01);
    }

    #[test]
    fn test_radius_and_lr_share_decay() {
        let schedule = DecaySchedule::new(5, 40, 2.0).unwrap();
        for t in 0..40 {
            let ratio = schedule.radius(t) / schedule.learning_rate(t);
            assert!((ratio - 2.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_run_starts_at_initial_values() {
        let schedule = DecaySchedule::new(3, 0, 0.7).unwrap();
        assert_eq!(schedule.learning_rate(0), 0.7);
        assert_eq!(schedule.radius(0), 3.0);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        for lr in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                matches!(DecaySchedule::new(2, 5, lr), Err(SomError::Config(_))),
                "learning rate {} accepted",
                lr
            );
        }
        assert!(matches!(DecaySchedule::new(0, 5, 0.5), Err(SomError::Config(_))));
        assert!(DecaySchedule::new(1, 0, 1e-6).is_ok());
    }

    #[test]
    fn test_kernel() {
        // Full strength at the BMU
        assert_eq!(neighborhood_kernel(0.0, 3.0), 1.0);
        assert!((neighborhood_kernel(2.0, 4.0) - (-0.5f64).exp()).abs() < 1e-12);
        assert!(neighborhood_kernel(4.0, 2.0) < neighborhood_kernel(1.0, 2.0));
        assert!(neighborhood_kernel(1.0, 1.0) < neighborhood_kernel(1.0, 4.0));
    }
}
