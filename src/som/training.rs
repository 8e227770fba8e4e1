//! Online SOM training.
//!
//! [`train`] runs the stochastic Kohonen procedure on an existing lattice with
//! an explicit random number generator. [`SelfOrganizingMap`] wraps it with
//! lattice initialisation, seeding and final labelling.

use crate::config::{SomConfig, DEFAULT_SIZE};
use crate::error::{Result, SomError};
use crate::grid::GridPosition;
use crate::som::lattice::{check_finite, contiguous_rows};
use crate::som::{DecaySchedule, IterationEvent, Lattice, NoopObserver, TrainingObserver};
use log::{debug, info};
use ndarray::{Array3, ArrayD, ArrayView2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// How the lattice is initialised.
#[derive(Debug, Clone, PartialEq)]
pub enum InitSpec {
    /// `size × size` neurons with weights uniform in `[0, 1)`; the weight
    /// dimensionality is taken from the training samples.
    Random {
        /// Lattice side length.
        size: usize,
    },
    /// Start from the given `[size, size, dim]` weights.
    Matrix(ArrayD<f64>),
}

impl Default for InitSpec {
    fn default() -> Self {
        InitSpec::Random { size: DEFAULT_SIZE }
    }
}

impl From<Array3<f64>> for InitSpec {
    fn from(weights: Array3<f64>) -> Self {
        InitSpec::Matrix(weights.into_dyn())
    }
}

/// An [`InitSpec`] after validation.
#[derive(Debug, Clone)]
enum Initializer {
    Random { size: usize },
    Matrix(Lattice),
}

impl Initializer {
    fn resolve(spec: InitSpec) -> Result<Self> {
        match spec {
            InitSpec::Random { size: 0 } => Err(SomError::Config(
                "lattice size must be positive".to_string(),
            )),
            InitSpec::Random { size } => Ok(Initializer::Random { size }),
            InitSpec::Matrix(weights) => Ok(Initializer::Matrix(Lattice::from_array_dyn(weights)?)),
        }
    }

    fn size(&self) -> usize {
        match self {
            Initializer::Random { size } => *size,
            Initializer::Matrix(lattice) => lattice.size(),
        }
    }

    fn build<R: Rng + ?Sized>(&self, dim: usize, rng: &mut R) -> Result<Lattice> {
        match self {
            Initializer::Random { size } => Lattice::random(*size, dim, rng),
            Initializer::Matrix(lattice) if lattice.dim() != dim => {
                Err(SomError::DimensionMismatch {
                    expected: lattice.dim(),
                    found: dim,
                })
            }
            Initializer::Matrix(lattice) => Ok(lattice.clone()),
        }
    }
}

/// Trains `lattice` in place on the rows of `samples`.
///
/// Draws `schedule.n_iterations()` sample indices uniformly with replacement,
/// then for each iteration `t` finds the BMU of the drawn sample and pulls
/// every neuron within `radius(t)` of it towards the sample at
/// `learning_rate(t)`. The observer is notified after every update.
///
/// Inputs are validated before the lattice is touched.
pub fn train<R, O>(
    lattice: &mut Lattice,
    samples: ArrayView2<'_, f64>,
    schedule: &DecaySchedule,
    rng: &mut R,
    observer: &mut O,
) -> Result<()>
where
    R: Rng + ?Sized,
    O: TrainingObserver + ?Sized,
{
    let (n_samples, dim) = samples.dim();
    if n_samples == 0 {
        return Err(SomError::EmptyInput("no training samples provided".to_string()));
    }
    if dim != lattice.dim() {
        return Err(SomError::DimensionMismatch {
            expected: lattice.dim(),
            found: dim,
        });
    }
    if schedule.size() != lattice.size() {
        return Err(SomError::Config(format!(
            "schedule is for a lattice of size {}, lattice has size {}",
            schedule.size(),
            lattice.size()
        )));
    }

    let standard = samples.as_standard_layout();
    let rows = contiguous_rows(&standard)?;
    check_finite(&rows)?;

    let n_iterations = schedule.n_iterations();
    let indices: Vec<usize> = (0..n_iterations)
        .map(|_| rng.gen_range(0..n_samples))
        .collect();

    info!(
        "Starting SOM training: {} iterations, {} samples, {}x{} lattice, {} dim",
        n_iterations,
        n_samples,
        lattice.size(),
        lattice.size(),
        dim
    );

    let log_every = (n_iterations / 10).max(1);

    for (t, &sample_index) in indices.iter().enumerate() {
        let input = rows[sample_index];
        let learning_rate = schedule.learning_rate(t);
        let bmu = lattice.best_matching_centre(input)?;
        let radius = schedule.radius(t);

        lattice.update(input, bmu, learning_rate, radius)?;

        observer.on_iteration(
            lattice,
            &IterationEvent {
                iteration: t + 1,
                n_iterations,
                sample_index,
                bmu,
                learning_rate,
                radius,
            },
        );

        if (t + 1) % log_every == 0 {
            debug!(
                "Iteration {}/{}: lr={:.4}, radius={:.3}, bmu={}",
                t + 1,
                n_iterations,
                learning_rate,
                radius,
                bmu
            );
        }
    }

    observer.on_finish(lattice);
    info!("SOM training completed");
    Ok(())
}

/// A Self-Organizing Map estimator.
///
/// ```rust,ignore
/// use somap::{InitSpec, SelfOrganizingMap, SomConfig};
///
/// let mut som = SelfOrganizingMap::new(
///     InitSpec::Random { size: 8 },
///     SomConfig::default().with_iterations(1_000).with_seed(42),
/// )?;
/// som.fit(samples.view())?;
/// let labels = som.labels().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct SelfOrganizingMap {
    init: Initializer,
    config: SomConfig,
    lattice: Option<Lattice>,
    labels: Option<Vec<GridPosition>>,
}

impl SelfOrganizingMap {
    /// Creates an unfitted map, validating the initialisation and configuration.
    pub fn new(init: InitSpec, config: SomConfig) -> Result<Self> {
        config.validate()?;
        let init = Initializer::resolve(init)?;

        Ok(Self {
            init,
            config,
            lattice: None,
            labels: None,
        })
    }

    /// Lattice side length.
    pub fn size(&self) -> usize {
        self.init.size()
    }

    /// Training configuration.
    pub fn config(&self) -> &SomConfig {
        &self.config
    }

    /// Whether `fit` has completed at least once.
    pub fn is_fitted(&self) -> bool {
        self.lattice.is_some()
    }

    /// The trained lattice.
    pub fn lattice(&self) -> Option<&Lattice> {
        self.lattice.as_ref()
    }

    /// The trained weights as a `[size, size, dim]` array.
    pub fn neurons(&self) -> Option<Array3<f64>> {
        self.lattice.as_ref().map(Lattice::to_array)
    }

    /// BMU of every training sample, in input order.
    pub fn labels(&self) -> Option<&[GridPosition]> {
        self.labels.as_deref()
    }

    /// Trains on `samples` with a generator seeded from the configuration.
    pub fn fit(&mut self, samples: ArrayView2<'_, f64>) -> Result<&mut Self> {
        self.fit_with_observer(samples, &mut NoopObserver)
    }

    /// Like [`fit`](Self::fit), reporting every iteration to `observer`.
    pub fn fit_with_observer<O>(
        &mut self,
        samples: ArrayView2<'_, f64>,
        observer: &mut O,
    ) -> Result<&mut Self>
    where
        O: TrainingObserver + ?Sized,
    {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.fit_with_rng(samples, &mut rng, observer)
    }

    /// Trains on `samples` drawing all randomness from `rng`.
    ///
    /// Random initialisation consumes the generator first, then the sample
    /// draws. On error the previous lattice and labels are kept.
    pub fn fit_with_rng<R, O>(
        &mut self,
        samples: ArrayView2<'_, f64>,
        rng: &mut R,
        observer: &mut O,
    ) -> Result<&mut Self>
    where
        R: Rng + ?Sized,
        O: TrainingObserver + ?Sized,
    {
        let (n_samples, dim) = samples.dim();
        if n_samples == 0 {
            return Err(SomError::EmptyInput("no training samples provided".to_string()));
        }
        if dim == 0 {
            return Err(SomError::Shape("samples have no features".to_string()));
        }

        let mut lattice = self.init.build(dim, rng)?;
        let schedule = DecaySchedule::new(
            lattice.size(),
            self.config.n_iterations,
            self.config.learning_rate,
        )?;

        train(&mut lattice, samples, &schedule, rng, observer)?;
        let labels = lattice.best_matching_centres(samples)?;

        self.lattice = Some(lattice);
        self.labels = Some(labels);
        Ok(self)
    }

    fn fitted(&self) -> Result<&Lattice> {
        self.lattice
            .as_ref()
            .ok_or_else(|| SomError::NotFitted("call fit before querying the map".to_string()))
    }

    /// BMU of a single vector on the trained lattice.
    pub fn best_matching_centre(&self, input: &[f64]) -> Result<GridPosition> {
        self.fitted()?.best_matching_centre(input)
    }

    /// BMU of every row of `samples` on the trained lattice.
    pub fn predict(&self, samples: ArrayView2<'_, f64>) -> Result<Vec<GridPosition>> {
        self.fitted()?.best_matching_centres(samples)
    }

    /// Mean distance from each sample to its BMU on the trained lattice.
    pub fn quantization_error(&self, samples: ArrayView2<'_, f64>) -> Result<f64> {
        self.fitted()?.quantization_error(samples)
    }

    /// Share of samples whose two best units are not lattice neighbours.
    pub fn topographic_error(&self, samples: ArrayView2<'_, f64>) -> Result<f64> {
        self.fitted()?.topographic_error(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, IxDyn};

    fn blobs() -> Array2<f64> {
        array![
            [0.05, 0.10],
            [0.10, 0.05],
            [0.08, 0.12],
            [0.90, 0.95],
            [0.95, 0.90],
            [0.92, 0.88],
        ]
    }

    #[test]
    fn test_init_spec_validation() {
        let config = SomConfig::default();
        assert!(matches!(
            SelfOrganizingMap::new(InitSpec::Random { size: 0 }, config.clone()),
            Err(SomError::Config(_))
        ));
        assert!(matches!(
            SelfOrganizingMap::new(InitSpec::Matrix(ArrayD::zeros(IxDyn(&[4, 2]))), config.clone()),
            Err(SomError::Shape(_))
        ));
        assert!(matches!(
            SelfOrganizingMap::new(InitSpec::default(), config.with_learning_rate(0.0)),
            Err(SomError::Config(_))
        ));

        let som = SelfOrganizingMap::new(Array3::<f64>::zeros((3, 3, 2)).into(), SomConfig::default()).unwrap();
        assert_eq!(som.size(), 3);
        assert!(!som.is_fitted());
    }

    #[test]
    fn test_train_zero_iterations_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut lattice = Lattice::random(3, 2, &mut rng).unwrap();
        let before = lattice.clone();

        let mut calls = 0;
        let schedule = DecaySchedule::new(3, 0, 1.0).unwrap();
        train(&mut lattice, blobs().view(), &schedule, &mut rng, &mut |_: &Lattice, _: &IterationEvent| calls += 1)
            .unwrap();

        assert_eq!(lattice, before);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_train_validates_before_mutating() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut lattice = Lattice::random(3, 2, &mut rng).unwrap();
        let before = lattice.clone();
        let schedule = DecaySchedule::new(3, 10, 1.0).unwrap();

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            train(&mut lattice, empty.view(), &schedule, &mut rng, &mut NoopObserver),
            Err(SomError::EmptyInput(_))
        ));

        let wide = Array2::<f64>::zeros((4, 3));
        assert!(matches!(
            train(&mut lattice, wide.view(), &schedule, &mut rng, &mut NoopObserver),
            Err(SomError::DimensionMismatch { expected: 2, found: 3 })
        ));

        let wrong_size = DecaySchedule::new(4, 10, 1.0).unwrap();
        assert!(train(&mut lattice, blobs().view(), &wrong_size, &mut rng, &mut NoopObserver).is_err());

        assert_eq!(lattice, before);
    }

    #[test]
    fn test_train_rejects_non_finite_samples() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut lattice = Lattice::random(2, 1, &mut rng).unwrap();
        let before = lattice.clone();
        let schedule = DecaySchedule::new(2, 5, 0.5).unwrap();

        for bad in [f64::NAN, f64::INFINITY] {
            let samples = array![[0.5], [bad]];
            assert!(matches!(
                train(&mut lattice, samples.view(), &schedule, &mut rng, &mut NoopObserver),
                Err(SomError::NonFinite(_))
            ));
        }
        assert_eq!(lattice, before);

        let mut som = SelfOrganizingMap::new(InitSpec::Random { size: 2 }, SomConfig::default()).unwrap();
        assert!(som.fit(array![[f64::NAN]].view()).is_err());
        assert!(!som.is_fitted());
    }

    #[test]
    fn test_invalid_schedule_never_reaches_lattice() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut lattice = Lattice::random(2, 1, &mut rng).unwrap();
        let before = lattice.clone();

        for lr in [-1.0, 0.0, f64::NAN] {
            let result = DecaySchedule::new(2, 5, lr).and_then(|schedule| {
                train(&mut lattice, array![[0.5]].view(), &schedule, &mut rng, &mut NoopObserver)
            });
            assert!(matches!(result, Err(SomError::Config(_))));
        }
        assert_eq!(lattice, before);
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let mut som = SelfOrganizingMap::new(
            InitSpec::Random { size: 4 },
            SomConfig::default().with_iterations(25).with_seed(3),
        )
        .unwrap();

        let mut events = Vec::new();
        som.fit_with_observer(blobs().view(), &mut |_: &Lattice, e: &IterationEvent| events.push(*e))
            .unwrap();

        assert_eq!(events.len(), 25);
        for (t, e) in events.iter().enumerate() {
            assert_eq!(e.iteration, t + 1);
            assert_eq!(e.n_iterations, 25);
            assert!(e.sample_index < 6);
            assert!(e.radius > 0.0 && e.radius <= 4.0);
        }
        assert_eq!(events[0].learning_rate, 1.0);
        assert_eq!(events[0].radius, 4.0);
        assert!(events.windows(2).all(|w| w[1].radius < w[0].radius));
        assert!(events.windows(2).all(|w| w[1].learning_rate < w[0].learning_rate));
    }

    #[test]
    fn test_observer_does_not_change_outcome() {
        let config = SomConfig::default().with_iterations(40).with_seed(17);

        let mut plain = SelfOrganizingMap::new(InitSpec::Random { size: 3 }, config.clone()).unwrap();
        plain.fit(blobs().view()).unwrap();

        let mut observed = SelfOrganizingMap::new(InitSpec::Random { size: 3 }, config).unwrap();
        let mut seen = 0usize;
        observed
            .fit_with_observer(blobs().view(), &mut |l: &Lattice, _: &IterationEvent| {
                seen += l.total_neurons();
            })
            .unwrap();

        assert_eq!(seen, 40 * 9);
        assert_eq!(plain.neurons(), observed.neurons());
        assert_eq!(plain.labels(), observed.labels());
    }

    #[test]
    fn test_seeded_fit_is_reproducible() {
        let config = SomConfig::default().with_iterations(50).with_seed(99);
        let mut a = SelfOrganizingMap::new(InitSpec::Random { size: 4 }, config.clone()).unwrap();
        let mut b = SelfOrganizingMap::new(InitSpec::Random { size: 4 }, config).unwrap();

        a.fit(blobs().view()).unwrap();
        b.fit(blobs().view()).unwrap();

        assert_eq!(a.neurons(), b.neurons());
        assert_eq!(a.labels(), b.labels());
    }

    #[test]
    fn test_labels_match_predict() {
        let mut som = SelfOrganizingMap::new(
            InitSpec::Random { size: 4 },
            SomConfig::default().with_iterations(200).with_seed(1),
        )
        .unwrap();
        som.fit(blobs().view()).unwrap();

        let labels = som.labels().unwrap().to_vec();
        assert_eq!(labels.len(), 6);
        assert_eq!(som.predict(blobs().view()).unwrap(), labels);
        for (i, row) in blobs().outer_iter().enumerate() {
            assert_eq!(som.best_matching_centre(row.as_slice().unwrap()).unwrap(), labels[i]);
        }
    }

    #[test]
    fn test_matrix_dimension_mismatch_at_fit() {
        let mut som =
            SelfOrganizingMap::new(Array3::<f64>::zeros((2, 2, 3)).into(), SomConfig::default().with_seed(0))
                .unwrap();
        assert!(matches!(
            som.fit(blobs().view()),
            Err(SomError::DimensionMismatch { expected: 3, found: 2 })
        ));
        assert!(!som.is_fitted());
    }

    #[test]
    fn test_failed_fit_keeps_previous_result() {
        let mut som = SelfOrganizingMap::new(
            InitSpec::Random { size: 3 },
            SomConfig::default().with_iterations(30).with_seed(8),
        )
        .unwrap();
        som.fit(blobs().view()).unwrap();
        let neurons = som.neurons();
        let labels = som.labels().map(<[GridPosition]>::to_vec);

        let empty = Array2::<f64>::zeros((0, 2));
        assert!(som.fit(empty.view()).is_err());
        let no_features = Array2::<f64>::zeros((3, 0));
        assert!(matches!(som.fit(no_features.view()), Err(SomError::Shape(_))));

        assert_eq!(som.neurons(), neurons);
        assert_eq!(som.labels().map(<[GridPosition]>::to_vec), labels);
    }

    #[test]
    fn test_queries_before_fit() {
        let som = SelfOrganizingMap::new(InitSpec::default(), SomConfig::default()).unwrap();
        assert!(som.lattice().is_none());
        assert!(som.labels().is_none());
        assert!(matches!(som.best_matching_centre(&[0.0]), Err(SomError::NotFitted(_))));
        assert!(matches!(som.predict(blobs().view()), Err(SomError::NotFitted(_))));
        assert!(som.quantization_error(blobs().view()).is_err());
    }

    #[test]
    fn test_training_reduces_quantization_error() {
        let samples = blobs();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let initial = Lattice::random(3, 2, &mut rng).unwrap();

        let mut lattice = initial.clone();
        let schedule = DecaySchedule::new(3, 300, 0.5).unwrap();
        train(&mut lattice, samples.view(), &schedule, &mut rng, &mut NoopObserver).unwrap();

        let before = initial.quantization_error(samples.view()).unwrap();
        let after = lattice.quantization_error(samples.view()).unwrap();
        assert!(after < before, "before={before}, after={after}");
    }
}
