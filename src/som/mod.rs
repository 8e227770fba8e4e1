//! Self-Organizing Map (SOM) module.
//!
//! - **Lattice**: square grid of neurons, BMU search and neighbourhood updates (lattice.rs)
//! - **Schedule**: exponential learning-rate and radius decay (schedule.rs)
//! - **Online Training**: sequential stochastic updates and the estimator (training.rs)
//! - **Observers**: per-iteration hooks that cannot alter training (observer.rs)

mod lattice;
mod neuron;
mod observer;
pub mod schedule;
pub mod training;

pub use lattice::Lattice;
pub use neuron::Neuron;
pub use observer::{IterationEvent, NoopObserver, TrainingObserver};
pub use schedule::{neighborhood_kernel, DecaySchedule};
pub use training::{train, InitSpec, SelfOrganizingMap};
