//! In-memory store implementations
//!
//! DashMap-backed reference implementations of the collaborator traits,
//! used by the demo orchestrator and the test suites. Not a persistence
//! design; a real deployment points the traits at the portal's document
//! store.

use crate::error::{Error, Result};
use crate::execution::EnforcementExecution;
use crate::policy::Policy;
use crate::stores::{AccountStore, AccountStream, AuditSink, NotificationSink, PolicyStore};
use crate::types::{Account, Asset, LicenseStatus, NotificationKind};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

/// In-memory account ledger
#[derive(Default)]
pub struct MemoryLedger {
    accounts: Arc<DashMap<Uuid, Account>>,
    assets: Arc<DashMap<Uuid, Asset>>,
}

impl MemoryLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account (test/bootstrap helper, bypasses versioning)
    pub fn insert_account(&self, account: Account) {
        self.accounts.insert(account.id, account);
    }

    /// Seed an asset
    pub fn insert_asset(&self, asset: Asset) {
        self.assets.insert(asset.id, asset);
    }

    /// Number of accounts held
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

#[async_trait]
impl AccountStore for MemoryLedger {
    async fn get_account(&self, id: Uuid) -> Result<Account> {
        self.accounts
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(Error::AccountNotFound(id))
    }

    async fn update_account(&self, account: &Account, expected_version: u64) -> Result<Account> {
        let mut entry = self
            .accounts
            .get_mut(&account.id)
            .ok_or(Error::AccountNotFound(account.id))?;

        let current = entry.value_mut();
        if current.version != expected_version {
            return Err(Error::VersionConflict {
                account_id: account.id,
                expected: expected_version,
                actual: current.version,
            });
        }

        let mut next = account.clone();
        next.version = expected_version + 1;
        next.updated_at = Utc::now();
        *current = next.clone();

        Ok(next)
    }

    async fn accounts_needing_enforcement(&self) -> Result<AccountStream> {
        // Revoked licenses are terminal; everything else is swept.
        let accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|account| account.license_status != LicenseStatus::Revoked)
            .collect();

        Ok(Box::pin(tokio_stream::iter(accounts)))
    }

    async fn list_active_assets(&self, owner_id: Uuid) -> Result<Vec<Asset>> {
        Ok(self
            .assets
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|asset| asset.owner_id == owner_id && asset.active)
            .collect())
    }

    async fn flag_assets_for_repossession(&self, owner_id: Uuid) -> Result<u32> {
        let mut flagged = 0u32;
        for mut entry in self.assets.iter_mut() {
            let asset = entry.value_mut();
            if asset.owner_id == owner_id && asset.active && !asset.repossession_flagged {
                asset.repossession_flagged = true;
                flagged += 1;
            }
        }
        debug!(%owner_id, flagged, "flagged assets for repossession");
        Ok(flagged)
    }
}

/// In-memory policy store holding at most one active policy
#[derive(Default)]
pub struct MemoryPolicyStore {
    policy: RwLock<Option<Policy>>,
}

impl MemoryPolicyStore {
    /// Store with an active policy already installed
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            policy: RwLock::new(Some(policy)),
        }
    }

    /// Empty store: `active_policy` fails until one is installed
    pub fn empty() -> Self {
        Self::default()
    }

    /// Install or replace the active policy
    pub async fn set_policy(&self, policy: Policy) {
        *self.policy.write().await = Some(policy);
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn active_policy(&self) -> Result<Policy> {
        self.policy
            .read()
            .await
            .clone()
            .ok_or_else(|| Error::PolicyUnavailable("no policy installed".to_string()))
    }
}

/// Notification captured by [`MemoryNotificationSink`]
#[derive(Debug, Clone)]
pub struct SentNotification {
    /// Addressee
    pub account_id: Uuid,

    /// Notification kind
    pub kind: NotificationKind,

    /// Structured payload
    pub payload: serde_json::Value,
}

/// Notification sink that records everything it is handed
#[derive(Default)]
pub struct MemoryNotificationSink {
    sent: Mutex<Vec<SentNotification>>,
}

impl MemoryNotificationSink {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far
    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }

    /// Count of a given kind
    pub async fn count_of(&self, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

#[async_trait]
impl NotificationSink for MemoryNotificationSink {
    async fn notify(
        &self,
        account_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) -> Result<()> {
        debug!(%account_id, ?kind, "notification queued");
        self.sent.lock().await.push(SentNotification {
            account_id,
            kind,
            payload,
        });
        Ok(())
    }
}

/// Append-only in-memory audit trail
#[derive(Default)]
pub struct MemoryAuditSink {
    records: Mutex<Vec<EnforcementExecution>>,
}

impl MemoryAuditSink {
    /// Empty trail
    pub fn new() -> Self {
        Self::default()
    }

    /// All appended records, oldest first
    pub async fn records(&self) -> Vec<EnforcementExecution> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append_execution(&self, record: &EnforcementExecution) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}
