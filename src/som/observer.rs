//! Per-iteration training hooks.

use crate::grid::GridPosition;
use crate::som::Lattice;

/// What happened during one training iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationEvent {
    /// Number of completed iterations (1-based).
    pub iteration: usize,
    /// Total iterations in the run.
    pub n_iterations: usize,
    /// Row of the sample matrix drawn for this iteration.
    pub sample_index: usize,
    /// Best matching unit of the drawn sample.
    pub bmu: GridPosition,
    /// Learning rate applied this iteration.
    pub learning_rate: f64,
    /// Neighbourhood radius applied this iteration.
    pub radius: f64,
}

/// Observes training progress.
///
/// Observers only see the lattice immutably, so they cannot influence the
/// outcome of a run. Any `FnMut(&Lattice, &IterationEvent)` closure is an
/// observer.
pub trait TrainingObserver {
    /// Called after the neuron update of every iteration.
    fn on_iteration(&mut self, lattice: &Lattice, event: &IterationEvent);

    /// Called once after the last iteration (also for empty runs).
    fn on_finish(&mut self, _lattice: &Lattice) {}
}

/// Observer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl TrainingObserver for NoopObserver {
    #[inline]
    fn on_iteration(&mut self, _lattice: &Lattice, _event: &IterationEvent) {}
}

impl<F> TrainingObserver for F
where
    F: FnMut(&Lattice, &IterationEvent),
{
    #[inline]
    fn on_iteration(&mut self, lattice: &Lattice, event: &IterationEvent) {
        self(lattice, event)
    }
}
