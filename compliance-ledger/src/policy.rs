//! Active portal policy: fee schedule, escalation thresholds, training

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Base license fee per cycle
    pub base_fee: Decimal,

    /// Late-fee penalty as a percentage of the base fee, per month overdue
    pub penalty_percent: Decimal,
}

/// Escalation thresholds driving the enforcement state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Days after the due date during which no penalty applies
    pub grace_period_days: i64,

    /// Days past grace at which warnings fire, ascending
    pub warning_intervals: Vec<i64>,

    /// Days past the last warning interval before suspension
    pub suspension_trigger_days: i64,

    /// Block dealer services on suspension
    pub block_dealer_services: bool,

    /// Block government portal services on suspension
    pub block_government_services: bool,

    /// Flag the suspended account's active assets for repossession
    pub flag_repossession: bool,

    /// Reset warning counters when an account is reinstated
    pub reset_warnings_on_reinstate: bool,
}

/// Training requirements feeding the trajectory estimator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPolicy {
    /// Courses required for a license cycle
    pub required_course_count: u32,

    /// Window before expiry within which renewal training counts
    pub renewal_window_days: i64,
}

/// The single active configuration read by every component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Monotonic policy version
    pub version: u32,

    /// Fee schedule
    pub fees: FeePolicy,

    /// Escalation thresholds
    pub escalation: EscalationPolicy,

    /// Training requirements
    pub training: TrainingPolicy,

    /// Last update time
    pub updated_at: DateTime<Utc>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: 1,
            fees: FeePolicy {
                base_fee: Decimal::new(7500, 2),      // 75.00
                penalty_percent: Decimal::new(10, 0), // 10%
            },
            escalation: EscalationPolicy {
                grace_period_days: 30,
                warning_intervals: vec![3, 5, 10],
                suspension_trigger_days: 15,
                block_dealer_services: true,
                block_government_services: true,
                flag_repossession: true,
                reset_warnings_on_reinstate: true,
            },
            training: TrainingPolicy {
                required_course_count: 1,
                renewal_window_days: 90,
            },
            updated_at: Utc::now(),
        }
    }
}

impl Policy {
    /// Highest configured warning interval, zero when none are configured
    pub fn last_warning_interval(&self) -> i64 {
        self.escalation
            .warning_intervals
            .iter()
            .copied()
            .max()
            .unwrap_or(0)
    }
}
