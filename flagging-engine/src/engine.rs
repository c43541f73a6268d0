//! Rule evaluation
//!
//! Every rule is evaluated independently; a predicate failure is logged
//! with the rule identifier and treated as "not triggered". One bad rule
//! never aborts evaluation of the rest.

use crate::error::{Error, Result};
use crate::rules::{Rule, RuleConditions};
use crate::types::{CounterpartyContext, FlagEvaluation, SubjectContext, TriggeredRule};
use chrono::{Duration, Timelike};
use compliance_ledger::{LicenseStatus, Transaction};
use tracing::{debug, warn};

/// Pure rule evaluator
pub struct FlaggingEngine;

impl FlaggingEngine {
    /// New engine
    pub fn new() -> Self {
        Self
    }

    /// Evaluate one transaction against the active rule set
    ///
    /// Pure function of its inputs: same transaction, contexts, and rules
    /// always yield the same evaluation.
    pub fn evaluate(
        &self,
        transaction: &Transaction,
        subject: &SubjectContext,
        counterparty: Option<&CounterpartyContext>,
        rules: &[Rule],
    ) -> FlagEvaluation {
        let mut triggered = Vec::new();

        for rule in rules {
            if !rule.enabled {
                continue;
            }

            match apply_rule(rule, transaction, subject, counterparty) {
                Ok(Some(detail)) => {
                    debug!(rule_id = %rule.id, %detail, "rule triggered");
                    triggered.push(TriggeredRule {
                        rule_id: rule.id.clone(),
                        severity: rule.severity,
                        auto_review: rule.auto_review,
                        detail,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    // Isolation, not propagation: a failing predicate is
                    // "not triggered" and the sweep over rules continues.
                    warn!(rule_id = %rule.id, error = %e, "predicate failed, treating as not triggered");
                }
            }
        }

        let highest_severity = triggered.iter().map(|t| t.severity).max();
        let auto_review_required = triggered.iter().any(|t| t.auto_review);

        FlagEvaluation {
            flagged: !triggered.is_empty(),
            triggered,
            highest_severity,
            auto_review_required,
        }
    }
}

impl Default for FlaggingEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed predicate dispatch keyed by the conditions variant
fn apply_rule(
    rule: &Rule,
    transaction: &Transaction,
    subject: &SubjectContext,
    counterparty: Option<&CounterpartyContext>,
) -> Result<Option<String>> {
    // Catch rules that slipped past load-time validation.
    rule.validate().map_err(|e| Error::Predicate {
        rule_id: rule.id.clone(),
        reason: e.to_string(),
    })?;

    let detail = match &rule.conditions {
        RuleConditions::HighQuantity { threshold } => {
            (transaction.quantity >= *threshold).then(|| {
                format!(
                    "quantity {} at or above threshold {}",
                    transaction.quantity, threshold
                )
            })
        }

        RuleConditions::RapidSuccession {
            max_in_window,
            window_hours,
        } => {
            let window_start = transaction.created_at - Duration::hours(*window_hours);
            let prior = subject
                .recent_transfers
                .iter()
                .filter(|t| **t >= window_start && **t <= transaction.created_at)
                .count() as u32;
            // The transfer under evaluation counts toward the window.
            (prior + 1 >= *max_in_window).then(|| {
                format!(
                    "{} transfers inside {}h window",
                    prior + 1,
                    window_hours
                )
            })
        }

        RuleConditions::LocationMismatch => {
            match (&subject.account.home_region, &transaction.location) {
                (Some(home), Some(here)) if home != here => {
                    Some(format!("initiated in {} but home region is {}", here, home))
                }
                _ => None,
            }
        }

        RuleConditions::HighRiskScore { min_score } => {
            (transaction.risk_score >= *min_score).then(|| {
                format!(
                    "risk score {} at or above {}",
                    transaction.risk_score, min_score
                )
            })
        }

        RuleConditions::CounterpartySuspended => counterparty.and_then(|ctx| {
            matches!(
                ctx.account.license_status,
                LicenseStatus::Suspended | LicenseStatus::Revoked
            )
            .then(|| {
                format!(
                    "counterparty {} license is {:?}",
                    ctx.account.id, ctx.account.license_status
                )
            })
        }),

        RuleConditions::AfterHours {
            start_hour,
            end_hour,
        } => {
            let hour = transaction.created_at.hour();
            let inside = if start_hour > end_hour {
                hour >= *start_hour || hour < *end_hour
            } else {
                hour >= *start_hour && hour < *end_hour
            };
            inside.then(|| format!("initiated at {:02}:00", hour))
        }
    };

    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{builtin_rules, RuleCategory};
    use chrono::{TimeZone, Utc};
    use compliance_ledger::{
        Account, AccountKind, ItemType, RiskLevel, Severity, TransactionStatus,
    };
    use uuid::Uuid;

    fn transaction(quantity: u32, risk_score: u8) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            item_type: ItemType::Firearm,
            item_category: "long_gun".to_string(),
            quantity,
            risk_score,
            risk_level: RiskLevel::from_score(risk_score),
            risk_factors: Vec::new(),
            location: None,
            status: TransactionStatus::Pending,
            flag_id: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 14, 14, 0, 0).unwrap(),
        }
    }

    fn subject() -> SubjectContext {
        SubjectContext::new(Account::new("Pat Kim", AccountKind::Citizen, Utc::now()))
    }

    #[test]
    fn high_quantity_firearm_triggers() {
        // quantity 60 against high_quantity{threshold: 50}
        let engine = FlaggingEngine::new();
        let evaluation = engine.evaluate(&transaction(60, 10), &subject(), None, &builtin_rules());

        assert!(evaluation.flagged);
        assert!(evaluation
            .triggered
            .iter()
            .any(|t| t.rule_id == "high_quantity"));
        assert_eq!(evaluation.highest_severity, Some(Severity::High));
        assert!(evaluation.auto_review_required);
    }

    #[test]
    fn clean_transaction_not_flagged() {
        let engine = FlaggingEngine::new();
        let evaluation = engine.evaluate(&transaction(1, 5), &subject(), None, &builtin_rules());

        assert!(!evaluation.flagged);
        assert!(evaluation.triggered.is_empty());
        assert_eq!(evaluation.highest_severity, None);
        assert!(!evaluation.auto_review_required);
    }

    #[test]
    fn evaluation_is_pure() {
        let engine = FlaggingEngine::new();
        let tx = transaction(60, 75);
        let ctx = subject();
        let rules = builtin_rules();

        let first = engine.evaluate(&tx, &ctx, None, &rules);
        let second = engine.evaluate(&tx, &ctx, None, &rules);

        assert_eq!(first.flagged, second.flagged);
        assert_eq!(first.triggered.len(), second.triggered.len());
        assert_eq!(first.highest_severity, second.highest_severity);
    }

    #[test]
    fn bad_rule_is_isolated() {
        // A rule whose conditions disagree with its category fails its
        // predicate; the remaining rules still evaluate.
        let engine = FlaggingEngine::new();
        let mut rules = vec![Rule {
            id: "mislabeled".to_string(),
            category: RuleCategory::Temporal,
            enabled: true,
            severity: Severity::Critical,
            conditions: RuleConditions::HighQuantity { threshold: 1 },
            auto_review: true,
        }];
        rules.extend(builtin_rules());

        let evaluation = engine.evaluate(&transaction(60, 10), &subject(), None, &rules);
        assert!(evaluation.flagged);
        assert!(evaluation
            .triggered
            .iter()
            .all(|t| t.rule_id != "mislabeled"));
        assert!(evaluation
            .triggered
            .iter()
            .any(|t| t.rule_id == "high_quantity"));
    }

    #[test]
    fn severity_is_max_across_triggered() {
        let engine = FlaggingEngine::new();
        let mut counter_account = Account::new("Shady Arms", AccountKind::Dealer, Utc::now());
        counter_account.license_status = LicenseStatus::Suspended;
        let counterparty = CounterpartyContext {
            account: counter_account,
        };

        // Triggers high_quantity (High) and counterparty_suspended (Critical).
        let evaluation = engine.evaluate(
            &transaction(60, 10),
            &subject(),
            Some(&counterparty),
            &builtin_rules(),
        );

        assert_eq!(evaluation.highest_severity, Some(Severity::Critical));
    }

    #[test]
    fn rapid_succession_counts_current_transfer() {
        let engine = FlaggingEngine::new();
        let tx = transaction(1, 0);
        let mut ctx = subject();
        // 4 prior transfers in the last day + this one = 5 >= max_in_window.
        for h in 1..=4 {
            ctx.recent_transfers
                .push(tx.created_at - Duration::hours(h));
        }

        let evaluation = engine.evaluate(&tx, &ctx, None, &builtin_rules());
        assert!(evaluation
            .triggered
            .iter()
            .any(|t| t.rule_id == "rapid_succession"));
    }

    #[test]
    fn after_hours_window_wraps_midnight() {
        let engine = FlaggingEngine::new();
        let mut tx = transaction(1, 0);
        tx.created_at = Utc.with_ymd_and_hms(2026, 3, 14, 23, 15, 0).unwrap();

        let evaluation = engine.evaluate(&tx, &subject(), None, &builtin_rules());
        assert!(evaluation
            .triggered
            .iter()
            .any(|t| t.rule_id == "after_hours"));

        tx.created_at = Utc.with_ymd_and_hms(2026, 3, 14, 5, 0, 0).unwrap();
        let evaluation = engine.evaluate(&tx, &subject(), None, &builtin_rules());
        assert!(evaluation
            .triggered
            .iter()
            .any(|t| t.rule_id == "after_hours"));
    }
}
