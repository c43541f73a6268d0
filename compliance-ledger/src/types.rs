//! Core records for the compliance ledger

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// License standing of a regulated subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// License in good standing
    Active,
    /// Fee overdue, still inside the grace period
    OverdueGrace,
    /// Past grace, at least one warning issued
    OverdueWarned,
    /// Suspended by enforcement; cleared only by reinstatement
    Suspended,
    /// Permanently revoked
    Revoked,
}

/// Fee standing of a subject's current billing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeStatus {
    /// Fee issued, not yet due or not yet paid
    Pending,
    /// Fee settled for the cycle
    Paid,
    /// Fee unpaid past the due date
    Overdue,
}

/// Kind of regulated account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Individual license holder
    Citizen,
    /// Licensed dealer
    Dealer,
}

/// One regulated subject with license/fee state
///
/// Compliance fields (status, fees, warnings, blocks) are written only by
/// the enforcement sweep or an explicit reinstatement action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: Uuid,

    /// Display name of the holder
    pub holder: String,

    /// Citizen or dealer
    pub kind: AccountKind,

    /// Registered home region code
    pub home_region: Option<String>,

    /// License standing
    pub license_status: LicenseStatus,

    /// Fee standing
    pub fee_status: FeeStatus,

    /// When the current license fee fell (or falls) due
    pub fee_due_at: DateTime<Utc>,

    /// Total late fee accrued so far for the current delinquency
    pub accumulated_late_fee: Decimal,

    /// Warnings issued for the current delinquency
    pub warning_count: u32,

    /// Interval value (days past grace) of the most recent warning sent
    pub last_warning_day: Option<i64>,

    /// Whether dealer/government services are blocked
    pub services_blocked: bool,

    /// License expiry, if the license type expires
    pub license_expires_at: Option<DateTime<Utc>>,

    /// Optimistic-concurrency token, bumped on every conditional write
    pub version: u64,

    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New active account with a clean compliance record
    pub fn new(holder: impl Into<String>, kind: AccountKind, fee_due_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            holder: holder.into(),
            kind,
            home_region: None,
            license_status: LicenseStatus::Active,
            fee_status: FeeStatus::Pending,
            fee_due_at,
            accumulated_late_fee: Decimal::ZERO,
            warning_count: 0,
            last_warning_day: None,
            services_blocked: false,
            license_expires_at: None,
            version: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Registered asset owned by an account (e.g. a licensed item)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    /// Asset ID
    pub id: Uuid,

    /// Owning account
    pub owner_id: Uuid,

    /// Serial or registration number
    pub serial: String,

    /// Whether the registration is active
    pub active: bool,

    /// Marked for recovery after owner suspension
    pub repossession_flagged: bool,
}

impl Asset {
    /// New active asset for an owner
    pub fn new(owner_id: Uuid, serial: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            serial: serial.into(),
            active: true,
            repossession_flagged: false,
        }
    }
}

/// Risk tier derived from a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Score below 40
    Green,
    /// Score 40-69
    Amber,
    /// Score 70 and above
    Red,
}

impl RiskLevel {
    /// Deterministic mapping from score to tier
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=39 => RiskLevel::Green,
            40..=69 => RiskLevel::Amber,
            _ => RiskLevel::Red,
        }
    }
}

/// Category of item being transferred
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// Regulated firearm
    Firearm,
    /// Ammunition
    Ammunition,
    /// Accessory or part
    Accessory,
    /// Anything else carried by the marketplace
    Other(String),
}

/// Lifecycle status of a marketplace transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Awaiting completion
    Pending,
    /// A flag forced mandatory human review
    ReviewRequired,
    /// Approved by the parties (and reviewer, where required)
    Approved,
    /// Rejected by a reviewer
    Rejected,
}

/// One marketplace transfer between two accounts
///
/// Immutable once created except for `status` and `flag_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction ID
    pub id: Uuid,

    /// Acquiring party
    pub buyer_id: Uuid,

    /// Transferring party
    pub seller_id: Uuid,

    /// Item type
    pub item_type: ItemType,

    /// Free-form item category label
    pub item_category: String,

    /// Units transferred
    pub quantity: u32,

    /// Computed risk score, 0-100
    pub risk_score: u8,

    /// Tier derived from the score
    pub risk_level: RiskLevel,

    /// Ordered contributing-factor descriptions
    pub risk_factors: Vec<String>,

    /// Region code where the transfer was initiated
    pub location: Option<String>,

    /// Lifecycle status
    pub status: TransactionStatus,

    /// Flag raised against this transaction, if any
    pub flag_id: Option<Uuid>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Severity carried by a flagging rule, ordered low to critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational
    Low,
    /// Worth a look
    Medium,
    /// Serious
    High,
    /// Drop everything
    Critical,
}

/// Action taken by a reviewer when resolving a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    /// Flag dismissed; transaction returns to pending
    Cleared,
    /// Transaction rejected
    Blocked,
}

/// Reviewer resolution of a flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagResolution {
    /// Cleared or blocked
    pub action: ResolutionAction,

    /// Reviewer identity
    pub reviewer: String,

    /// Optional note
    pub note: Option<String>,

    /// When the resolution was recorded
    pub resolved_at: DateTime<Utc>,
}

/// Derived record marking a transaction as rule-triggered
///
/// Append-only apart from resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    /// Flag ID
    pub id: Uuid,

    /// Flagged transaction
    pub transaction_id: Uuid,

    /// IDs of every rule that triggered
    pub triggered_rules: Vec<String>,

    /// Highest severity across triggered rules
    pub severity: Severity,

    /// Whether a mandatory review item was spawned
    pub review_required: bool,

    /// The spawned review item, when review was required
    pub review_item_id: Option<Uuid>,

    /// Whether a reviewer has resolved this flag
    pub resolved: bool,

    /// Resolution details, set exactly once
    pub resolution: Option<FlagResolution>,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Work item for mandatory human review of a flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewItem {
    /// Review item ID
    pub id: Uuid,

    /// Flag under review
    pub flag_id: Uuid,

    /// Transaction under review
    pub transaction_id: Uuid,

    /// Open until the flag is resolved
    pub open: bool,

    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Kind of notification emitted toward an account holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Fee overdue, inside grace
    FeeReminder,
    /// Overdue warning at a configured interval
    Warning,
    /// License suspended
    Suspended,
    /// License reinstated
    Reinstated,
}
