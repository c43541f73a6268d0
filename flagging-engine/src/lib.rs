//! Flagging rule engine for the Aegis licensing portal
//!
//! Decides whether a marketplace transaction needs human review: rules are
//! data, predicates are a fixed built-in set, and evaluation is a pure
//! function of the transaction, its parties, and the active rule set.

#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod flags;
pub mod rules;
pub mod types;

pub use engine::FlaggingEngine;
pub use error::{Error, Result};
pub use flags::{open_flag, resolve_flag, FlagOutcome};
pub use rules::{builtin_rules, load_active_rules, MemoryRuleStore, Rule, RuleCategory, RuleConditions, RuleStore};
pub use types::{CounterpartyContext, FlagEvaluation, SubjectContext, TriggeredRule};
