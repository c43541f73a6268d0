//! Error types for the risk engine

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Scoring weights misconfigured
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(String),

    /// Advisory enrichment failed; never blocks the numeric result
    #[error("advisory generation failed: {0}")]
    Advisory(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
