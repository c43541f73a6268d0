//! Error types for the enforcement engine

use thiserror::Error;

/// Enforcement engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Ledger operation failed
    #[error("ledger error: {0}")]
    Ledger(#[from] compliance_ledger::Error),

    /// No active policy; fatal for a run, retried at the next interval
    #[error("policy unavailable: {0}")]
    Policy(String),

    /// Administrative action applied to an account in the wrong state
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Scheduler started while already running
    #[error("enforcement scheduler is already running")]
    AlreadyRunning,

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
