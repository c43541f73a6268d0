//! Input and output types for risk scoring

use chrono::{DateTime, Utc};
use compliance_ledger::{FeeStatus, ItemType, LicenseStatus, RiskLevel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One past transfer in a subject's trailing history window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalTransfer {
    /// When the transfer happened
    pub occurred_at: DateTime<Utc>,

    /// Units transferred
    pub quantity: u32,

    /// Item type transferred
    pub item_type: ItemType,

    /// Region code of the transfer, when recorded
    pub location: Option<String>,
}

/// Everything the scorer knows about a subject
///
/// Assembled by the caller from ledger records. An empty history is valid:
/// every signal that depends on missing data contributes zero, never a
/// penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectHistory {
    /// Subject account
    pub account_id: Uuid,

    /// Registered home region
    pub home_region: Option<String>,

    /// License expiry, if the license type expires
    pub license_expires_at: Option<DateTime<Utc>>,

    /// Recorded compliance violations
    pub violation_count: u32,

    /// Training courses completed in the current cycle
    pub trainings_completed: u32,

    /// Current fee standing
    pub fee_status: FeeStatus,

    /// Transfers in the trailing history window
    pub transfers: Vec<HistoricalTransfer>,

    /// Start of the observed history window
    pub observed_since: Option<DateTime<Utc>>,
}

impl SubjectHistory {
    /// History with nothing observed yet
    pub fn empty(account_id: Uuid) -> Self {
        Self {
            account_id,
            home_region: None,
            license_expires_at: None,
            violation_count: 0,
            trainings_completed: 0,
            fee_status: FeeStatus::Paid,
            transfers: Vec::new(),
            observed_since: None,
        }
    }
}

/// Compliance standing of the counterparty (typically the dealer)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterpartyProfile {
    /// Counterparty account
    pub account_id: Uuid,

    /// License standing
    pub license_status: LicenseStatus,

    /// Warnings on record
    pub warning_count: u32,

    /// Violations on record
    pub violation_count: u32,
}

/// The transfer being scored, before it exists in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedTransfer {
    /// Units to transfer
    pub quantity: u32,

    /// Item type
    pub item_type: ItemType,

    /// Region code where the transfer is being initiated
    pub location: Option<String>,

    /// Initiation time, the reference point for every time-based signal
    pub initiated_at: DateTime<Utc>,
}

/// Scoring outcome for one proposed transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Subject that was scored
    pub account_id: Uuid,

    /// Composite score, 0-100
    pub score: u8,

    /// Tier derived from the score
    pub level: RiskLevel,

    /// Ordered contributing-factor descriptions, one per fired signal
    pub factors: Vec<String>,

    /// Optional advisory text; absent whenever enrichment fails
    pub advisory: Option<String>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}
