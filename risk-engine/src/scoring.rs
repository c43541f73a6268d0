//! Weighted-signal risk scoring
//!
//! Seven independent signals, each clamped to [0,100] before weighting.
//! Weights sum to 1.0, so the composite lands in [0,100] by construction;
//! the final value is clamped anyway.

use crate::advisory::AdvisoryGenerator;
use crate::types::{CounterpartyProfile, ProposedTransfer, RiskAssessment, SubjectHistory};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Timelike, Utc};
use compliance_ledger::{LicenseStatus, RiskLevel};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hours of the day considered ordinary trading time (inclusive start,
/// exclusive end)
const TRADING_HOURS: (u32, u32) = (6, 22);

/// Per-signal weights; must sum to 1.0
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Trailing-week transfer rate vs baseline
    pub frequency_spike: f64,

    /// Proposed quantity vs historical average
    pub quantity_anomaly: f64,

    /// Transfer region differs from home region
    pub location_mismatch: f64,

    /// License expiry proximity
    pub expiry_proximity: f64,

    /// Recorded violations
    pub compliance_history: f64,

    /// Initiation outside ordinary hours
    pub time_of_day: f64,

    /// Counterparty standing
    pub counterparty: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            frequency_spike: 0.20,
            quantity_anomaly: 0.20,
            location_mismatch: 0.15,
            expiry_proximity: 0.10,
            compliance_history: 0.15,
            time_of_day: 0.10,
            counterparty: 0.10,
        }
    }
}

impl ScoringWeights {
    fn sum(&self) -> f64 {
        self.frequency_spike
            + self.quantity_anomaly
            + self.location_mismatch
            + self.expiry_proximity
            + self.compliance_history
            + self.time_of_day
            + self.counterparty
    }

    /// Reject weight sets that do not sum to 1.0
    pub fn validate(&self) -> Result<()> {
        if (self.sum() - 1.0).abs() > 1e-9 {
            return Err(Error::InvalidConfig(format!(
                "scoring weights sum to {}, expected 1.0",
                self.sum()
            )));
        }
        Ok(())
    }
}

/// Deterministic, side-effect-free transfer scorer
pub struct RiskScorer {
    weights: ScoringWeights,
}

impl RiskScorer {
    /// Scorer with the standard weights
    pub fn new() -> Self {
        Self {
            weights: ScoringWeights::default(),
        }
    }

    /// Scorer with custom weights, validated up front
    pub fn with_weights(weights: ScoringWeights) -> Result<Self> {
        weights.validate()?;
        Ok(Self { weights })
    }

    /// Score a proposed transfer
    ///
    /// Pure: same history, counterparty, and proposal always produce the
    /// same score, level, and factor list.
    pub fn score(
        &self,
        history: &SubjectHistory,
        counterparty: Option<&CounterpartyProfile>,
        proposal: &ProposedTransfer,
    ) -> Result<RiskAssessment> {
        if proposal.quantity == 0 {
            return Err(Error::InvalidInput("quantity must be positive".to_string()));
        }

        let mut factors = Vec::new();
        let mut weighted = 0.0f64;

        let mut apply = |points: f64, weight: f64, factor: Option<String>| {
            let clamped = points.clamp(0.0, 100.0);
            weighted += clamped * weight;
            if clamped > 0.0 {
                if let Some(text) = factor {
                    factors.push(text);
                }
            }
        };

        let (points, factor) = frequency_spike(history, proposal.initiated_at);
        apply(points, self.weights.frequency_spike, factor);

        let (points, factor) = quantity_anomaly(history, proposal.quantity);
        apply(points, self.weights.quantity_anomaly, factor);

        let (points, factor) = location_mismatch(history, proposal);
        apply(points, self.weights.location_mismatch, factor);

        let (points, factor) = expiry_proximity(history, proposal.initiated_at);
        apply(points, self.weights.expiry_proximity, factor);

        let (points, factor) = compliance_history(history);
        apply(points, self.weights.compliance_history, factor);

        let (points, factor) = time_of_day(proposal);
        apply(points, self.weights.time_of_day, factor);

        let (points, factor) = counterparty_risk(counterparty);
        apply(points, self.weights.counterparty, factor);

        let score = weighted.clamp(0.0, 100.0).round() as u8;

        Ok(RiskAssessment {
            account_id: history.account_id,
            score,
            level: RiskLevel::from_score(score),
            factors,
            advisory: None,
            assessed_at: Utc::now(),
        })
    }

    /// Score, then attach best-effort advisory text under a timeout
    ///
    /// Enrichment failure or timeout leaves `advisory` absent; the numeric
    /// result is always returned.
    pub async fn assess_with_advisory(
        &self,
        history: &SubjectHistory,
        counterparty: Option<&CounterpartyProfile>,
        proposal: &ProposedTransfer,
        generator: &dyn AdvisoryGenerator,
        timeout: std::time::Duration,
    ) -> Result<RiskAssessment> {
        let mut assessment = self.score(history, counterparty, proposal)?;

        match tokio::time::timeout(timeout, generator.advisory(&assessment)).await {
            Ok(Ok(text)) => assessment.advisory = Some(text),
            Ok(Err(e)) => {
                warn!(account_id = %history.account_id, error = %e, "advisory generation failed");
            }
            Err(_) => {
                warn!(account_id = %history.account_id, "advisory generation timed out");
            }
        }

        Ok(assessment)
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Transfers in the trailing week vs the subject's baseline weekly rate
pub(crate) fn frequency_spike(
    history: &SubjectHistory,
    now: DateTime<Utc>,
) -> (f64, Option<String>) {
    let Some(observed_since) = history.observed_since else {
        return (0.0, None);
    };
    if history.transfers.is_empty() {
        return (0.0, None);
    }

    let observed_days = (now - observed_since).num_days().max(7);
    let weeks = observed_days as f64 / 7.0;
    let baseline = history.transfers.len() as f64 / weeks;
    if baseline <= 0.0 {
        return (0.0, None);
    }

    let week_ago = now - Duration::days(7);
    let recent = history
        .transfers
        .iter()
        .filter(|t| t.occurred_at >= week_ago && t.occurred_at <= now)
        .count() as f64;

    let ratio = recent / baseline;
    let points = ((ratio - 1.0) * 40.0).clamp(0.0, 100.0);
    let factor = (points > 0.0).then(|| {
        format!(
            "Frequency spike: {} transfers in the last 7 days vs {:.1}/week baseline",
            recent as u64, baseline
        )
    });
    (points, factor)
}

/// Proposed quantity vs historical average quantity
pub(crate) fn quantity_anomaly(history: &SubjectHistory, quantity: u32) -> (f64, Option<String>) {
    if history.transfers.is_empty() {
        return (0.0, None);
    }

    let total: u64 = history.transfers.iter().map(|t| t.quantity as u64).sum();
    let average = total as f64 / history.transfers.len() as f64;
    if average <= 0.0 {
        return (0.0, None);
    }

    let ratio = quantity as f64 / average;
    let points = ((ratio - 1.0) * 30.0).clamp(0.0, 100.0);
    let factor = (points > 0.0).then(|| {
        format!(
            "Quantity {} above historical average {:.1}",
            quantity, average
        )
    });
    (points, factor)
}

/// Transfer initiated outside the subject's home region
pub(crate) fn location_mismatch(
    history: &SubjectHistory,
    proposal: &ProposedTransfer,
) -> (f64, Option<String>) {
    match (&history.home_region, &proposal.location) {
        (Some(home), Some(here)) if home != here => (
            70.0,
            Some(format!("Location mismatch: {} vs home region {}", here, home)),
        ),
        _ => (0.0, None),
    }
}

/// License expired or expiring soon
pub(crate) fn expiry_proximity(
    history: &SubjectHistory,
    now: DateTime<Utc>,
) -> (f64, Option<String>) {
    let Some(expires_at) = history.license_expires_at else {
        return (0.0, None);
    };

    let days_left = (expires_at - now).num_days();
    if days_left <= 0 {
        (100.0, Some("License expired".to_string()))
    } else if days_left < 30 {
        (
            80.0,
            Some(format!("License expires in {} days", days_left)),
        )
    } else if days_left < 90 {
        (
            40.0,
            Some(format!("License expires in {} days", days_left)),
        )
    } else {
        (0.0, None)
    }
}

/// Recorded violations, 25 points each
pub(crate) fn compliance_history(history: &SubjectHistory) -> (f64, Option<String>) {
    if history.violation_count == 0 {
        return (0.0, None);
    }
    let points = (history.violation_count as f64 * 25.0).min(100.0);
    (
        points,
        Some(format!(
            "{} compliance violation(s) on record",
            history.violation_count
        )),
    )
}

/// Initiation outside ordinary trading hours
pub(crate) fn time_of_day(proposal: &ProposedTransfer) -> (f64, Option<String>) {
    let hour = proposal.initiated_at.hour();
    if hour < TRADING_HOURS.0 || hour >= TRADING_HOURS.1 {
        (
            65.0,
            Some(format!("Initiated at {:02}:00, outside ordinary hours", hour)),
        )
    } else {
        (0.0, None)
    }
}

/// Counterparty license standing
pub(crate) fn counterparty_risk(
    counterparty: Option<&CounterpartyProfile>,
) -> (f64, Option<String>) {
    let Some(profile) = counterparty else {
        return (0.0, None);
    };

    match profile.license_status {
        LicenseStatus::Suspended | LicenseStatus::Revoked => (
            100.0,
            Some("Counterparty license suspended or revoked".to_string()),
        ),
        LicenseStatus::OverdueWarned => (
            60.0,
            Some("Counterparty under overdue warnings".to_string()),
        ),
        _ if profile.warning_count > 0 => (
            30.0,
            Some(format!(
                "Counterparty has {} prior warning(s)",
                profile.warning_count
            )),
        ),
        _ => (0.0, None),
    }
}
