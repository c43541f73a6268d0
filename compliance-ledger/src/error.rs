//! Error types for the compliance ledger

use thiserror::Error;
use uuid::Uuid;

/// Ledger error
#[derive(Debug, Error, Clone)]
pub enum Error {
    /// Account not found
    #[error("account not found: {0}")]
    AccountNotFound(Uuid),

    /// Conditional write lost against a concurrent update
    #[error("version conflict for account {account_id}: expected {expected}, found {actual}")]
    VersionConflict {
        /// Account whose write failed
        account_id: Uuid,
        /// Version the writer observed
        expected: u64,
        /// Version currently stored
        actual: u64,
    },

    /// No active policy could be read
    #[error("no active policy available: {0}")]
    PolicyUnavailable(String),

    /// Underlying store failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Malformed or missing required fields
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Notification could not be handed to the sink
    #[error("notification delivery failed: {0}")]
    Notification(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
