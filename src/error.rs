//! Error types for the site climate pipeline.
//!
//! Only configuration problems are errors. Numerical outcomes such as a
//! transmissivity search that fails to converge are reported per timestamp
//! as NaN and never surface here.

use thiserror::Error;

/// Errors raised while setting up or running the pipeline.
#[derive(Error, Debug)]
pub enum ClimateError {
    /// The irradiance separation selector is not one of the known models.
    #[error("unknown separation model: '{0}' (expected Nagata, Watanabe, Erbs, Udagawa or Perez)")]
    UnknownModel(String),

    /// A per-field sequence does not match the timestamp sequence length.
    #[error("length mismatch in '{field}': expected {expected} values, found {found}")]
    LengthMismatch {
        field: String,
        expected: usize,
        found: usize,
    },

    /// The four grid series disagree on a timestamp.
    #[error("grid series timestamps diverge at index {index}")]
    TimestampMismatch { index: usize },

    /// A grid series holds no timestamps.
    #[error("grid series is empty")]
    EmptySeries,

    /// A required reference elevation could not be resolved.
    #[error("no elevation available for ({latitude:.4}, {longitude:.4})")]
    MissingElevation { latitude: f64, longitude: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClimateError>;
