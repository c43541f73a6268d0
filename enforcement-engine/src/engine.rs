//! Enforcement sweep execution
//!
//! Walks every account needing enforcement, applies the planned transition
//! with a version-conditional write, and appends exactly one execution
//! record per run, transitions or not.

use crate::error::{Error, Result};
use crate::sweep;
use chrono::Utc;
use compliance_ledger::{
    Account, AccountActionRecord, AccountError, AccountStore, AuditSink, EnforcementAction,
    EnforcementExecution, LicenseStatus, NotificationKind, NotificationSink, Policy, PolicyStore,
};
use serde_json::json;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tracing::{info, warn};
use uuid::Uuid;

/// Effectful enforcement engine over the collaborator stores
pub struct EnforcementEngine {
    accounts: Arc<dyn AccountStore>,
    policies: Arc<dyn PolicyStore>,
    notifier: Arc<dyn NotificationSink>,
    audit: Arc<dyn AuditSink>,
}

impl EnforcementEngine {
    /// New engine over the given collaborators
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        policies: Arc<dyn PolicyStore>,
        notifier: Arc<dyn NotificationSink>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            accounts,
            policies,
            notifier,
            audit,
        }
    }

    /// One full sweep over the account set
    ///
    /// No enforcement without a policy: a policy-store outage fails the
    /// run. A single account's failure is recorded and skipped; the sweep
    /// itself never aborts for one account.
    pub async fn run_once(&self) -> Result<EnforcementExecution> {
        let policy = self
            .policies
            .active_policy()
            .await
            .map_err(|e| Error::Policy(e.to_string()))?;

        let now = Utc::now();
        let mut record = EnforcementExecution::begin(policy.clone(), now);

        info!(policy_version = policy.version, "enforcement run started");

        let mut accounts = self.accounts.accounts_needing_enforcement().await?;
        while let Some(account) = accounts.next().await {
            record.counts.processed += 1;
            let account_id = account.id;

            if let Err(e) = self.enforce_account(account_id, &policy, &mut record).await {
                warn!(%account_id, error = %e, "account transition failed, continuing sweep");
                record.errors.push(AccountError {
                    account_id,
                    cause: e.to_string(),
                });
            }
        }

        // "Nothing happened" is itself auditable: the record is appended
        // unconditionally.
        self.audit.append_execution(&record).await?;

        info!(
            processed = record.counts.processed,
            warned = record.counts.warned,
            late_fees = record.counts.late_fees_applied,
            suspended = record.counts.suspended,
            assets_flagged = record.counts.assets_flagged,
            errors = record.errors.len(),
            "enforcement run complete"
        );

        Ok(record)
    }

    /// Transition one account
    async fn enforce_account(
        &self,
        account_id: Uuid,
        policy: &Policy,
        record: &mut EnforcementExecution,
    ) -> Result<()> {
        // Re-read immediately before writing so a payment that landed
        // after the sweep started is planned against, not overwritten.
        let current = self.accounts.get_account(account_id).await?;
        let plan = sweep::plan_account(&current, policy, record.run_at);

        if !plan.changed {
            return Ok(());
        }

        self.accounts
            .update_account(&plan.updated, current.version)
            .await?;

        if plan.fee_status_reset {
            record.actions.push(AccountActionRecord {
                account_id,
                action: EnforcementAction::FeeStatusReset,
            });
        }

        if plan.fee_delta > rust_decimal::Decimal::ZERO {
            record.counts.late_fees_applied += 1;
            record.actions.push(AccountActionRecord {
                account_id,
                action: EnforcementAction::LateFeeAccrued {
                    delta: plan.fee_delta,
                },
            });
        }

        if let Some(interval) = plan.warning_interval {
            record.counts.warned += 1;
            record.actions.push(AccountActionRecord {
                account_id,
                action: EnforcementAction::WarningSent { interval },
            });
            self.send(
                account_id,
                NotificationKind::Warning,
                json!({
                    "interval_days_past_grace": interval,
                    "warning_number": plan.updated.warning_count,
                    "accumulated_late_fee": plan.updated.accumulated_late_fee,
                }),
            )
            .await;
        }

        if plan.suspend {
            record.counts.suspended += 1;
            record.actions.push(AccountActionRecord {
                account_id,
                action: EnforcementAction::Suspended,
            });

            if plan.flag_repossession {
                let flagged = self
                    .accounts
                    .flag_assets_for_repossession(account_id)
                    .await?;
                record.counts.assets_flagged += flagged;
            }

            self.send(
                account_id,
                NotificationKind::Suspended,
                json!({
                    "services_blocked": plan.updated.services_blocked,
                    "accumulated_late_fee": plan.updated.accumulated_late_fee,
                }),
            )
            .await;
        }

        Ok(())
    }

    /// Administrative reinstatement of a suspended account
    ///
    /// Rejected when the account is not suspended; the account is left
    /// untouched in that case.
    pub async fn reinstate(&self, account_id: Uuid, reviewer: &str) -> Result<Account> {
        let account = self.accounts.get_account(account_id).await?;

        if account.license_status != LicenseStatus::Suspended {
            return Err(Error::InvalidState(format!(
                "account {} is {:?}, only suspended accounts can be reinstated",
                account_id, account.license_status
            )));
        }

        let policy = self
            .policies
            .active_policy()
            .await
            .map_err(|e| Error::Policy(e.to_string()))?;

        let mut updated = account.clone();
        updated.license_status = LicenseStatus::Active;
        updated.services_blocked = false;
        if policy.escalation.reset_warnings_on_reinstate {
            updated.warning_count = 0;
            updated.last_warning_day = None;
        }

        let saved = self
            .accounts
            .update_account(&updated, account.version)
            .await?;

        info!(%account_id, reviewer, "account reinstated");
        self.send(
            account_id,
            NotificationKind::Reinstated,
            json!({ "reviewer": reviewer }),
        )
        .await;

        Ok(saved)
    }

    /// Fire-and-forget notification; delivery failures are logged only
    async fn send(&self, account_id: Uuid, kind: NotificationKind, payload: serde_json::Value) {
        if let Err(e) = self.notifier.notify(account_id, kind, payload).await {
            warn!(%account_id, ?kind, error = %e, "notification delivery failed");
        }
    }
}
