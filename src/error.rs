//! Error types for the capture window engine and its batch drivers.

use thiserror::Error;

/// Errors raised while windowing readings or composing fingerprints.
///
/// None of these are retryable: the engine is pure computation over
/// caller-supplied data, so every error aborts the call that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CaptureError {
    /// The configured filter method name is not recognised
    #[error("Unsupported filter method: {0:?}")]
    UnsupportedFilter(String),

    /// Window sizing or thresholds violate their constraints
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A batch record is not a JSON object
    #[error("Record {index} is not an object")]
    NotAnObject { index: usize },

    /// A batch record lacks a required or passthrough field
    #[error("Record {index} is missing field {field:?}")]
    MissingField { index: usize, field: String },

    /// A batch record field holds a value of the wrong type
    #[error("Record {index} field {field:?} is not {expected}")]
    InvalidField {
        index: usize,
        field: String,
        expected: &'static str,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CaptureError>;
