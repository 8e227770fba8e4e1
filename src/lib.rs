//! # somap - Self-Organizing Maps
//!
//! `somap` trains Kohonen Self-Organizing Maps: a square 2-D lattice of
//! prototype vectors ("neurons") is fitted to high-dimensional samples so
//! that nearby neurons end up representing similar inputs.
//!
//! ## Overview
//!
//! Training is online and stochastic. Each iteration draws one sample at
//! random, finds its Best Matching Unit (BMU), and pulls every neuron within
//! a shrinking lattice radius towards the sample with a decaying learning
//! rate. Afterwards every sample is labelled with the position of its BMU.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use somap::{InitSpec, SelfOrganizingMap, SomConfig};
//!
//! let samples = somap::load_samples("points.txt")?;
//!
//! let mut som = SelfOrganizingMap::new(
//!     InitSpec::Random { size: 16 },
//!     SomConfig::default().with_iterations(5_000).with_seed(42),
//! )?;
//! som.fit(samples.view())?;
//!
//! for (sample, pos) in samples.outer_iter().zip(som.labels().unwrap()) {
//!     println!("{:?} -> {}", sample, pos);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`som`] - Lattice, decay schedule, training loop and estimator
//! - [`grid`] - Lattice addressing and N-dimensional grid adjacency
//! - [`config`] - Training configuration
//! - [`data`] - Sample loading from delimited text
//! - [`error`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod som;

// Re-export commonly used types
pub use config::SomConfig;
pub use data::{load_samples, parse_samples};
pub use error::{Result, SomError};
pub use grid::{adjacency_matrix, GridPosition, OrthotopicGrid};
pub use som::{
    train, DecaySchedule, InitSpec, IterationEvent, Lattice, Neuron, NoopObserver,
    SelfOrganizingMap, TrainingObserver,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
