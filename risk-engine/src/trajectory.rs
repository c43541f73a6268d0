//! Predictive risk trajectory
//!
//! Projects where a subject's risk is heading over the next 30 days from
//! the same factor families the scorer uses, plus training completion and
//! violation counts. Read-only and advisory: feeds dashboards and the
//! warning-issuance step, never the ledger.

use crate::scoring;
use crate::types::SubjectHistory;
use chrono::{DateTime, Duration, Utc};
use compliance_ledger::FeeStatus;
use serde::{Deserialize, Serialize};

/// Confidence bounds
const CONFIDENCE_FLOOR: u8 = 50;
const CONFIDENCE_CAP: u8 = 95;

/// Direction a subject's risk is heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    /// Trajectory score >= +10
    Improving,
    /// Trajectory score in 0..+10
    Stable,
    /// Trajectory score in -15..0
    Declining,
    /// Trajectory score below -15
    CriticalDecline,
}

impl Trajectory {
    fn from_score(score: i32) -> Self {
        if score >= 10 {
            Trajectory::Improving
        } else if score >= 0 {
            Trajectory::Stable
        } else if score >= -15 {
            Trajectory::Declining
        } else {
            Trajectory::CriticalDecline
        }
    }
}

/// Forward-looking risk estimate for one subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Subject account
    pub account_id: uuid::Uuid,

    /// Composite risk as of now, history-only (no proposed transfer)
    pub current_risk: u8,

    /// Projected risk 30 days out
    pub predicted_risk_30d: u8,

    /// Direction of travel
    pub trajectory: Trajectory,

    /// Signed adjustment the trajectory was derived from
    pub trajectory_score: i32,

    /// 50-95, scaling with available data points
    pub confidence: u8,

    /// Contributing-factor descriptions
    pub factors: Vec<String>,

    /// Suggested follow-ups for a case officer
    pub recommendations: Vec<String>,

    /// When the prediction was computed
    pub predicted_at: DateTime<Utc>,
}

/// Trajectory estimator
pub struct TrajectoryEstimator;

impl TrajectoryEstimator {
    /// New estimator
    pub fn new() -> Self {
        Self
    }

    /// Project a subject's risk trajectory from history alone
    pub fn predict(&self, history: &SubjectHistory, now: DateTime<Utc>) -> Prediction {
        let current_risk = current_risk(history, now);

        let mut score = 0i32;
        let mut factors = Vec::new();

        // Positive adjustments.
        if history.trainings_completed > 0 {
            let credit = 8 * history.trainings_completed.min(2) as i32;
            score += credit;
            factors.push(format!(
                "{} training course(s) completed recently",
                history.trainings_completed
            ));
        }
        if history.violation_count == 0 && !history.transfers.is_empty() {
            score += 6;
            factors.push("Violation-free transfer history".to_string());
        }
        if history.fee_status == FeeStatus::Paid {
            score += 5;
            factors.push("Fees in good standing".to_string());
        }

        let velocity_ratio = weekly_velocity_ratio(history, now);
        if let Some(ratio) = velocity_ratio {
            if ratio < 0.75 {
                score += 5;
                factors.push("Transfer velocity cooling off".to_string());
            }
        }

        // Negative adjustments.
        if history.violation_count > 0 {
            let penalty = 10 * history.violation_count.min(3) as i32;
            score -= penalty;
            factors.push(format!(
                "{} violation(s) on record",
                history.violation_count
            ));
        }
        if let Some(ratio) = velocity_ratio {
            if ratio >= 2.0 {
                score -= 8;
                factors.push("Transfer velocity spiking".to_string());
            }
        }
        if let Some(expires_at) = history.license_expires_at {
            if (expires_at - now).num_days() < 30 {
                score -= 10;
                factors.push("License expiring within 30 days".to_string());
            }
        }
        if history.fee_status == FeeStatus::Overdue {
            score -= 12;
            factors.push("License fee overdue".to_string());
        }

        let trajectory = Trajectory::from_score(score);
        let predicted_risk_30d = (current_risk as i32 - score).clamp(0, 100) as u8;

        Prediction {
            account_id: history.account_id,
            current_risk,
            predicted_risk_30d,
            trajectory,
            trajectory_score: score,
            confidence: confidence(history),
            recommendations: recommendations(trajectory, history),
            factors,
            predicted_at: Utc::now(),
        }
    }
}

impl Default for TrajectoryEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// History-only composite: violations, expiry, velocity, fee standing
fn current_risk(history: &SubjectHistory, now: DateTime<Utc>) -> u8 {
    let (violations, _) = scoring::compliance_history(history);
    let (expiry, _) = scoring::expiry_proximity(history, now);
    let (velocity, _) = scoring::frequency_spike(history, now);
    let fees = if history.fee_status == FeeStatus::Overdue {
        100.0
    } else {
        0.0
    };

    let weighted = violations * 0.35 + expiry * 0.25 + velocity * 0.25 + fees * 0.15;
    weighted.clamp(0.0, 100.0).round() as u8
}

/// Trailing-week transfer rate over baseline; None without a baseline
fn weekly_velocity_ratio(history: &SubjectHistory, now: DateTime<Utc>) -> Option<f64> {
    let observed_since = history.observed_since?;
    if history.transfers.is_empty() {
        return None;
    }

    let weeks = ((now - observed_since).num_days().max(7)) as f64 / 7.0;
    let baseline = history.transfers.len() as f64 / weeks;
    if baseline <= 0.0 {
        return None;
    }

    let week_ago = now - Duration::days(7);
    let recent = history
        .transfers
        .iter()
        .filter(|t| t.occurred_at >= week_ago && t.occurred_at <= now)
        .count() as f64;

    Some(recent / baseline)
}

fn confidence(history: &SubjectHistory) -> u8 {
    let mut data_points = history.transfers.len() as u32 + history.trainings_completed;
    if history.violation_count > 0 {
        data_points += 1;
    }
    if history.license_expires_at.is_some() {
        data_points += 1;
    }

    (CONFIDENCE_FLOOR as u32 + 5 * data_points).min(CONFIDENCE_CAP as u32) as u8
}

fn recommendations(trajectory: Trajectory, history: &SubjectHistory) -> Vec<String> {
    let mut out = Vec::new();

    match trajectory {
        Trajectory::CriticalDecline => {
            out.push("Escalate to a case officer for immediate outreach".to_string());
        }
        Trajectory::Declining => {
            out.push("Schedule a compliance check-in".to_string());
        }
        Trajectory::Stable | Trajectory::Improving => {
            out.push("Continue standard monitoring".to_string());
        }
    }

    if history.fee_status == FeeStatus::Overdue {
        out.push("Settle the outstanding license fee".to_string());
    }
    if let Some(expires_at) = history.license_expires_at {
        if (expires_at - Utc::now()).num_days() < 90 {
            out.push("Book renewal training before the license expires".to_string());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::HistoricalTransfer;
    use compliance_ledger::ItemType;
    use uuid::Uuid;

    fn clean_history() -> SubjectHistory {
        let now = Utc::now();
        let mut history = SubjectHistory::empty(Uuid::new_v4());
        history.observed_since = Some(now - Duration::days(56));
        history.transfers.push(HistoricalTransfer {
            occurred_at: now - Duration::days(30),
            quantity: 1,
            item_type: ItemType::Accessory,
            location: None,
        });
        history
    }

    #[test]
    fn clean_subject_trends_improving() {
        let mut history = clean_history();
        history.trainings_completed = 1;

        let prediction = TrajectoryEstimator::new().predict(&history, Utc::now());
        // +8 training, +6 violation-free, +5 fees paid, +5 cooling velocity
        assert!(prediction.trajectory_score >= 10);
        assert_eq!(prediction.trajectory, Trajectory::Improving);
        assert!(prediction.predicted_risk_30d <= prediction.current_risk);
    }

    #[test]
    fn delinquent_subject_trends_critical() {
        let mut history = clean_history();
        history.violation_count = 2;
        history.fee_status = FeeStatus::Overdue;
        history.license_expires_at = Some(Utc::now() + Duration::days(10));

        let prediction = TrajectoryEstimator::new().predict(&history, Utc::now());
        assert!(prediction.trajectory_score < -15);
        assert_eq!(prediction.trajectory, Trajectory::CriticalDecline);
        assert!(prediction.predicted_risk_30d >= prediction.current_risk);
        assert!(prediction
            .recommendations
            .iter()
            .any(|r| r.contains("immediate outreach")));
    }

    #[test]
    fn trajectory_thresholds() {
        assert_eq!(Trajectory::from_score(10), Trajectory::Improving);
        assert_eq!(Trajectory::from_score(9), Trajectory::Stable);
        assert_eq!(Trajectory::from_score(0), Trajectory::Stable);
        assert_eq!(Trajectory::from_score(-1), Trajectory::Declining);
        assert_eq!(Trajectory::from_score(-15), Trajectory::Declining);
        assert_eq!(Trajectory::from_score(-16), Trajectory::CriticalDecline);
    }

    #[test]
    fn confidence_bounds() {
        let empty = SubjectHistory::empty(Uuid::new_v4());
        let prediction = TrajectoryEstimator::new().predict(&empty, Utc::now());
        assert_eq!(prediction.confidence, 50);

        let mut rich = clean_history();
        for _ in 0..20 {
            rich.transfers.push(rich.transfers[0].clone());
        }
        let prediction = TrajectoryEstimator::new().predict(&rich, Utc::now());
        assert_eq!(prediction.confidence, 95);
    }
}
