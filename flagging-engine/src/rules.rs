//! Rules as data
//!
//! A rule is a named predicate with configuration, not code: the predicate
//! implementations are a closed set dispatched on the conditions variant,
//! and `conditions` only parameterizes thresholds. Adding a rule kind means
//! adding a variant, never evaluating untrusted input.

use crate::error::{Error, Result};
use async_trait::async_trait;
use compliance_ledger::Severity;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Family a rule belongs to; must agree with its conditions variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Per-transfer quantity checks
    Quantity,
    /// Transfer-velocity checks
    Velocity,
    /// Region checks
    Geography,
    /// Composite-risk-score checks
    Score,
    /// Counterparty-standing checks
    Counterparty,
    /// Time-of-day checks
    Temporal,
}

/// Typed, per-predicate configuration
///
/// One variant per named predicate; validated against the rule's declared
/// category at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "predicate", rename_all = "snake_case")]
pub enum RuleConditions {
    /// Quantity at or above a threshold
    HighQuantity {
        /// Minimum quantity that triggers
        threshold: u32,
    },
    /// Too many transfers inside a sliding window
    RapidSuccession {
        /// Transfer count (including the one under evaluation) that triggers
        max_in_window: u32,
        /// Window length in hours
        window_hours: i64,
    },
    /// Transfer region differs from the subject's home region
    LocationMismatch,
    /// Composite risk score at or above a floor
    HighRiskScore {
        /// Minimum score that triggers
        min_score: u8,
    },
    /// Counterparty license suspended or revoked
    CounterpartySuspended,
    /// Transfer initiated inside a nightly window
    AfterHours {
        /// Window start hour (0-23)
        start_hour: u32,
        /// Window end hour (0-23), exclusive
        end_hour: u32,
    },
}

impl RuleConditions {
    /// Category this predicate belongs to
    pub fn category(&self) -> RuleCategory {
        match self {
            RuleConditions::HighQuantity { .. } => RuleCategory::Quantity,
            RuleConditions::RapidSuccession { .. } => RuleCategory::Velocity,
            RuleConditions::LocationMismatch => RuleCategory::Geography,
            RuleConditions::HighRiskScore { .. } => RuleCategory::Score,
            RuleConditions::CounterpartySuspended => RuleCategory::Counterparty,
            RuleConditions::AfterHours { .. } => RuleCategory::Temporal,
        }
    }
}

/// Named flagging rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier, e.g. `high_quantity`
    pub id: String,

    /// Declared category; must match the conditions variant
    pub category: RuleCategory,

    /// Disabled rules are skipped entirely
    pub enabled: bool,

    /// Severity attached when this rule triggers
    pub severity: Severity,

    /// Predicate configuration
    pub conditions: RuleConditions,

    /// Whether triggering spawns a mandatory review item
    pub auto_review: bool,
}

impl Rule {
    /// Load-time validation: category agreement and sane thresholds
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidRule {
            rule_id: self.id.clone(),
            reason,
        };

        if self.conditions.category() != self.category {
            return Err(invalid(format!(
                "conditions belong to category {:?}, rule declares {:?}",
                self.conditions.category(),
                self.category
            )));
        }

        match &self.conditions {
            RuleConditions::HighQuantity { threshold } if *threshold == 0 => {
                Err(invalid("threshold must be positive".to_string()))
            }
            RuleConditions::RapidSuccession {
                max_in_window,
                window_hours,
            } if *max_in_window == 0 || *window_hours <= 0 => {
                Err(invalid("window and count must be positive".to_string()))
            }
            RuleConditions::HighRiskScore { min_score } if *min_score > 100 => {
                Err(invalid("min_score must be at most 100".to_string()))
            }
            RuleConditions::AfterHours {
                start_hour,
                end_hour,
            } if *start_hour > 23 || *end_hour > 23 => {
                Err(invalid("hours must be 0-23".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Fixed built-in rule set used when the external store is empty
pub fn builtin_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "high_quantity".to_string(),
            category: RuleCategory::Quantity,
            enabled: true,
            severity: Severity::High,
            conditions: RuleConditions::HighQuantity { threshold: 50 },
            auto_review: true,
        },
        Rule {
            id: "rapid_succession".to_string(),
            category: RuleCategory::Velocity,
            enabled: true,
            severity: Severity::Medium,
            conditions: RuleConditions::RapidSuccession {
                max_in_window: 5,
                window_hours: 24,
            },
            auto_review: false,
        },
        Rule {
            id: "location_mismatch".to_string(),
            category: RuleCategory::Geography,
            enabled: true,
            severity: Severity::Medium,
            conditions: RuleConditions::LocationMismatch,
            auto_review: false,
        },
        Rule {
            id: "high_risk_score".to_string(),
            category: RuleCategory::Score,
            enabled: true,
            severity: Severity::High,
            conditions: RuleConditions::HighRiskScore { min_score: 70 },
            auto_review: true,
        },
        Rule {
            id: "counterparty_suspended".to_string(),
            category: RuleCategory::Counterparty,
            enabled: true,
            severity: Severity::Critical,
            conditions: RuleConditions::CounterpartySuspended,
            auto_review: true,
        },
        Rule {
            id: "after_hours".to_string(),
            category: RuleCategory::Temporal,
            enabled: true,
            severity: Severity::Low,
            conditions: RuleConditions::AfterHours {
                start_hour: 22,
                end_hour: 6,
            },
            auto_review: false,
        },
    ]
}

/// External rule store
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Every enabled rule; an empty result is valid (first run)
    async fn enabled_rules(&self) -> Result<Vec<Rule>>;
}

/// Resolve the active rule set, falling back to the built-ins when the
/// store is empty or unreachable
pub async fn load_active_rules(store: &dyn RuleStore) -> Vec<Rule> {
    match store.enabled_rules().await {
        Ok(rules) if !rules.is_empty() => rules,
        Ok(_) => {
            info!("rule store empty, using built-in default rule set");
            builtin_rules()
        }
        Err(e) => {
            warn!(error = %e, "rule store unavailable, using built-in default rule set");
            builtin_rules()
        }
    }
}

/// In-memory rule store
#[derive(Default)]
pub struct MemoryRuleStore {
    rules: DashMap<String, Rule>,
}

impl MemoryRuleStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a rule after validating it
    pub fn upsert(&self, rule: Rule) -> Result<()> {
        rule.validate()?;
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn enabled_rules(&self) -> Result<Vec<Rule>> {
        let mut rules: Vec<Rule> = self
            .rules
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|rule| rule.enabled)
            .collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_all_validate() {
        for rule in builtin_rules() {
            rule.validate().unwrap();
        }
    }

    #[test]
    fn category_mismatch_rejected() {
        let rule = Rule {
            id: "mislabeled".to_string(),
            category: RuleCategory::Temporal,
            enabled: true,
            severity: Severity::Low,
            conditions: RuleConditions::HighQuantity { threshold: 10 },
            auto_review: false,
        };
        assert!(matches!(rule.validate(), Err(Error::InvalidRule { .. })));
    }

    #[tokio::test]
    async fn empty_store_falls_back_to_builtins() {
        let store = MemoryRuleStore::new();
        let rules = load_active_rules(&store).await;
        assert_eq!(rules.len(), builtin_rules().len());
    }

    #[tokio::test]
    async fn populated_store_wins_over_builtins() {
        let store = MemoryRuleStore::new();
        store
            .upsert(Rule {
                id: "high_quantity".to_string(),
                category: RuleCategory::Quantity,
                enabled: true,
                severity: Severity::Critical,
                conditions: RuleConditions::HighQuantity { threshold: 5 },
                auto_review: true,
            })
            .unwrap();

        let rules = load_active_rules(&store).await;
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].severity, Severity::Critical);
    }

    #[tokio::test]
    async fn disabled_rules_not_listed() {
        let store = MemoryRuleStore::new();
        let mut rule = builtin_rules().remove(0);
        rule.enabled = false;
        store.upsert(rule).unwrap();

        assert!(store.enabled_rules().await.unwrap().is_empty());
    }
}
