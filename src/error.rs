//! Error types for Metabolic Flux
//!
//! Analyses degrade to neutral results instead of failing, so these errors only
//! surface at the host boundary (request parsing, config validation, encoding)
//! and inside individual insight rules, where they are logged and skipped.

use thiserror::Error;

/// Errors that can occur at the engine boundary
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),

    #[error("Unknown weekly goal: {0}")]
    InvalidGoal(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
