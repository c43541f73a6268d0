//! Immutable audit records for enforcement runs

use crate::policy::Policy;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Action applied to one account during a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementAction {
    /// Fee status reset to pending after the balance was settled
    FeeStatusReset,
    /// Late-fee delta charged this run
    LateFeeAccrued {
        /// Amount newly charged (delta over the previous accumulation)
        delta: Decimal,
    },
    /// Overdue warning sent for one interval
    WarningSent {
        /// Days-past-grace interval the warning covers
        interval: i64,
    },
    /// License suspended and services blocked per policy
    Suspended,
    /// Administrative reinstatement
    Reinstated,
}

/// Per-account entry in a run's action log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountActionRecord {
    /// Account acted on
    pub account_id: Uuid,

    /// What happened
    pub action: EnforcementAction,
}

/// Per-account entry in a run's error list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountError {
    /// Account whose transition failed
    pub account_id: Uuid,

    /// Cause, as reported by the failing operation
    pub cause: String,
}

/// Aggregate counts for one run
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExecutionCounts {
    /// Accounts examined
    pub processed: u32,

    /// Warning notifications sent
    pub warned: u32,

    /// Accounts charged a late-fee delta
    pub late_fees_applied: u32,

    /// Accounts suspended
    pub suspended: u32,

    /// Assets flagged for repossession
    pub assets_flagged: u32,
}

/// One enforcement run, appended to the audit trail regardless of outcome
///
/// Never mutated after creation; a run where nothing happened is still
/// recorded so that "nothing happened" is auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementExecution {
    /// Execution ID
    pub id: Uuid,

    /// When the run started
    pub run_at: DateTime<Utc>,

    /// Policy snapshot in effect for the whole run
    pub policy: Policy,

    /// Aggregate counts
    pub counts: ExecutionCounts,

    /// Per-account action log
    pub actions: Vec<AccountActionRecord>,

    /// Accounts that failed to transition; the run continued past them
    pub errors: Vec<AccountError>,
}

impl EnforcementExecution {
    /// Fresh empty record for a run starting now under `policy`
    pub fn begin(policy: Policy, run_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            run_at,
            policy,
            counts: ExecutionCounts::default(),
            actions: Vec::new(),
            errors: Vec::new(),
        }
    }
}
