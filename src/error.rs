//! Error types for SOM training and grid addressing.

use thiserror::Error;

/// The main error type for `somap` operations.
#[derive(Error, Debug)]
pub enum SomError {
    /// A vector's feature count disagrees with the lattice dimensionality.
    #[error("Dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Dimensionality the lattice was built with.
        expected: usize,
        /// Dimensionality of the offending input.
        found: usize,
    },

    /// An array has the wrong number of axes or inconsistent extents.
    #[error("Shape error: {0}")]
    Shape(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Empty input.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Invalid grid dimensions, coordinates or linear indices.
    #[error("Grid error: {0}")]
    Grid(String),

    /// The map was queried before `fit` completed.
    #[error("Model not fitted: {0}")]
    NotFitted(String),

    /// A sample or query vector contains NaN or an infinity.
    #[error("Non-finite value: {0}")]
    NonFinite(String),

    /// Malformed numeric input.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for `somap` operations.
pub type Result<T> = std::result::Result<T, SomError>;
