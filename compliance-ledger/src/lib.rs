//! Compliance ledger for the Aegis licensing portal
//!
//! Shared domain records (accounts, transactions, flags, policy, audit
//! trail) and the collaborator traits through which the risk, flagging,
//! and enforcement engines reach the outside world.

#![forbid(unsafe_code)]

pub mod error;
pub mod execution;
pub mod memory;
pub mod policy;
pub mod stores;
pub mod types;

pub use error::{Error, Result};
pub use execution::{
    AccountActionRecord, AccountError, EnforcementAction, EnforcementExecution, ExecutionCounts,
};
pub use policy::{EscalationPolicy, FeePolicy, Policy, TrainingPolicy};
pub use stores::{AccountStore, AccountStream, AuditSink, NotificationSink, PolicyStore};
pub use types::*;
