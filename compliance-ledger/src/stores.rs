//! Collaborator interfaces consumed by the engines
//!
//! The portal's record store, policy store, notification sink, and audit
//! sink all live outside the core. The engines see them only through these
//! traits; the in-memory implementations in [`crate::memory`] back the demo
//! and the test suites.

use crate::error::Result;
use crate::execution::EnforcementExecution;
use crate::policy::Policy;
use crate::types::{Account, Asset, NotificationKind};
use async_trait::async_trait;
use std::pin::Pin;
use tokio_stream::Stream;
use uuid::Uuid;

/// Stream of accounts produced by an enforcement sweep query
pub type AccountStream = Pin<Box<dyn Stream<Item = Account> + Send>>;

/// Reader/writer for account compliance state
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Fetch one account
    async fn get_account(&self, id: Uuid) -> Result<Account>;

    /// Conditional write: succeeds only if the stored version still equals
    /// `expected_version`, and returns the updated record
    async fn update_account(&self, account: &Account, expected_version: u64) -> Result<Account>;

    /// Accounts that the enforcement sweep should examine
    async fn accounts_needing_enforcement(&self) -> Result<AccountStream>;

    /// Active assets registered to an owner
    async fn list_active_assets(&self, owner_id: Uuid) -> Result<Vec<Asset>>;

    /// Flag every active asset of an owner for repossession in one batch,
    /// returning how many were newly flagged
    async fn flag_assets_for_repossession(&self, owner_id: Uuid) -> Result<u32>;
}

/// Reader for the single active policy
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Currently active configuration; an outage is an error, not a default
    async fn active_policy(&self) -> Result<Policy>;
}

/// Outbound notification sink, fire-and-forget from the core's perspective
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Hand one notification to the delivery pipeline
    async fn notify(
        &self,
        account_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<()>;
}

/// Append-only audit trail for enforcement runs
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one execution record
    async fn append_execution(&self, record: &EnforcementExecution) -> Result<()>;
}
