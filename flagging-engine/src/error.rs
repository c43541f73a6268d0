//! Error types for the flagging engine

use thiserror::Error;
use uuid::Uuid;

/// Flagging engine error
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Rule failed load-time validation
    #[error("invalid rule '{rule_id}': {reason}")]
    InvalidRule {
        /// Offending rule
        rule_id: String,
        /// What was wrong
        reason: String,
    },

    /// A single predicate failed; isolated, never aborts evaluation
    #[error("predicate error in rule '{rule_id}': {reason}")]
    Predicate {
        /// Offending rule
        rule_id: String,
        /// What went wrong
        reason: String,
    },

    /// Attempt to resolve a flag that is already resolved
    #[error("flag {0} is already resolved")]
    AlreadyResolved(Uuid),

    /// Rule store failure
    #[error("rule store error: {0}")]
    Store(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
