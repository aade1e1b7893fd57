//! Error types for the physio-pose library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Fewer landmarks than the estimator needs (both eyes and the nose)
    #[error("Insufficient landmarks: expected at least {required}, got {found}")]
    InsufficientData {
        /// Minimum number of landmarks required
        required: usize,
        /// Number of landmarks supplied
        found: usize,
    },

    /// Landmark or bounding box geometry cannot produce a finite estimate
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Recording or configuration document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures that only affect the current frame.
    ///
    /// The caller skips the frame and keeps its previous pose.
    #[must_use]
    pub fn is_per_frame(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::NumericDegeneracy(_))
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
