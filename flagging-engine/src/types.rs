//! Evaluation inputs and outputs

use chrono::{DateTime, Utc};
use compliance_ledger::{Account, Severity};
use serde::{Deserialize, Serialize};

/// Subject-side context for rule evaluation
///
/// Assembled by the caller from ledger records; the engine itself never
/// reads stores.
#[derive(Debug, Clone)]
pub struct SubjectContext {
    /// The subject's account snapshot
    pub account: Account,

    /// Initiation times of the subject's recent transfers, in any order;
    /// the velocity predicate counts within its own window
    pub recent_transfers: Vec<DateTime<Utc>>,
}

impl SubjectContext {
    /// Context with no recent transfer history
    pub fn new(account: Account) -> Self {
        Self {
            account,
            recent_transfers: Vec::new(),
        }
    }
}

/// Counterparty-side context for rule evaluation
#[derive(Debug, Clone)]
pub struct CounterpartyContext {
    /// The counterparty's account snapshot
    pub account: Account,
}

/// One rule that fired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggeredRule {
    /// Rule identifier
    pub rule_id: String,

    /// Severity configured on the rule
    pub severity: Severity,

    /// Whether the rule demands mandatory review
    pub auto_review: bool,

    /// Human-readable trigger detail
    pub detail: String,
}

/// Outcome of evaluating one transaction against the active rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagEvaluation {
    /// True iff at least one rule triggered
    pub flagged: bool,

    /// Every rule that triggered, in rule-set order
    pub triggered: Vec<TriggeredRule>,

    /// Max severity across triggered rules; None when nothing triggered
    pub highest_severity: Option<Severity>,

    /// True iff at least one triggered rule carries auto-review
    pub auto_review_required: bool,
}

impl FlagEvaluation {
    /// Evaluation where nothing triggered
    pub fn clean() -> Self {
        Self {
            flagged: false,
            triggered: Vec::new(),
            highest_severity: None,
            auto_review_required: false,
        }
    }
}
