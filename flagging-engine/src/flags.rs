//! Flag lifecycle: open, then resolve exactly once
//!
//! Side effects (persisting the flag, the review item, and the transaction
//! status) belong to the caller; this module only builds and transitions
//! the records.

use crate::error::{Error, Result};
use crate::types::FlagEvaluation;
use chrono::{DateTime, Utc};
use compliance_ledger::{
    Flag, FlagResolution, ResolutionAction, ReviewItem, Severity, TransactionStatus,
};
use uuid::Uuid;

/// Records produced when a flagged evaluation is materialized
#[derive(Debug, Clone)]
pub struct FlagOutcome {
    /// The flag itself
    pub flag: Flag,

    /// Review item, present iff the evaluation demanded mandatory review
    pub review_item: Option<ReviewItem>,

    /// Status the transaction must be forced to, when review is mandatory;
    /// None leaves the transaction untouched
    pub transaction_status: Option<TransactionStatus>,
}

/// Build the flag (and review item) for a flagged evaluation
///
/// Returns None for evaluations where nothing triggered.
pub fn open_flag(
    evaluation: &FlagEvaluation,
    transaction_id: Uuid,
    now: DateTime<Utc>,
) -> Option<FlagOutcome> {
    if !evaluation.flagged {
        return None;
    }

    let flag_id = Uuid::new_v4();
    let review_item = evaluation.auto_review_required.then(|| ReviewItem {
        id: Uuid::new_v4(),
        flag_id,
        transaction_id,
        open: true,
        created_at: now,
    });

    let flag = Flag {
        id: flag_id,
        transaction_id,
        triggered_rules: evaluation
            .triggered
            .iter()
            .map(|t| t.rule_id.clone())
            .collect(),
        severity: evaluation.highest_severity.unwrap_or(Severity::Low),
        review_required: evaluation.auto_review_required,
        review_item_id: review_item.as_ref().map(|item| item.id),
        resolved: false,
        resolution: None,
        created_at: now,
    };

    Some(FlagOutcome {
        flag,
        review_item,
        transaction_status: evaluation
            .auto_review_required
            .then_some(TransactionStatus::ReviewRequired),
    })
}

/// Resolve an open flag
///
/// `Cleared` returns the transaction to pending; `Blocked` rejects it.
/// Resolving an already-resolved flag is a conflict and mutates nothing.
pub fn resolve_flag(
    flag: &mut Flag,
    action: ResolutionAction,
    reviewer: impl Into<String>,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<TransactionStatus> {
    if flag.resolved {
        return Err(Error::AlreadyResolved(flag.id));
    }

    flag.resolved = true;
    flag.resolution = Some(FlagResolution {
        action,
        reviewer: reviewer.into(),
        note,
        resolved_at: now,
    });

    Ok(match action {
        ResolutionAction::Cleared => TransactionStatus::Pending,
        ResolutionAction::Blocked => TransactionStatus::Rejected,
    })
}
