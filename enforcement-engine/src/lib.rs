//! Enforcement engine for the Aegis licensing portal
//!
//! Walks every account through the compliance lifecycle (grace, overdue,
//! warned, suspended, reinstated) on a fixed cadence, with progressive
//! idempotent late fees and an append-only audit trail.

#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod error;
pub mod fees;
pub mod scheduler;
pub mod sweep;

pub use config::EnforcementConfig;
pub use engine::EnforcementEngine;
pub use error::{Error, Result};
pub use scheduler::{EnforcementScheduler, SchedulerStatus};
pub use sweep::{plan_account, AccountPlan, ComplianceState};
