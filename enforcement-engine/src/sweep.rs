//! Per-account compliance transition planning
//!
//! `plan_account` is the pure heart of the enforcement state machine:
//! given one account, the active policy, and the current time, it decides
//! every mutation and side effect for this run without touching a store.
//! The effectful layer in [`crate::engine`] re-reads the account and
//! applies the plan with a version-conditional write.

use crate::fees;
use chrono::{DateTime, Utc};
use compliance_ledger::{Account, FeeStatus, LicenseStatus, Policy};
use rust_decimal::Decimal;

/// Where an account sits in the compliance lifecycle after planning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceState {
    /// Fee not yet due
    Current,
    /// Overdue, inside the grace period
    Grace,
    /// Past grace, no warning issued yet
    Overdue,
    /// Past grace with warnings on record
    Warned,
    /// Suspended
    Suspended,
}

/// Planned transition for one account in one run
#[derive(Debug, Clone)]
pub struct AccountPlan {
    /// Lifecycle state the account lands in
    pub state: ComplianceState,

    /// The account with every planned mutation applied
    pub updated: Account,

    /// Late-fee delta to charge this run; zero on reruns
    pub fee_delta: Decimal,

    /// Warning interval to notify for this run, at most one
    pub warning_interval: Option<i64>,

    /// Fee status flipped back to pending after settlement
    pub fee_status_reset: bool,

    /// Account newly suspended this run
    pub suspend: bool,

    /// Batch-flag the account's active assets for repossession
    pub flag_repossession: bool,

    /// Whether anything actually changed (a write is needed)
    pub changed: bool,
}

/// Compute the transition for one account
pub fn plan_account(account: &Account, policy: &Policy, now: DateTime<Utc>) -> AccountPlan {
    let mut updated = account.clone();
    let mut changed = false;

    let days_overdue = (now - account.fee_due_at).num_days();
    let grace = policy.escalation.grace_period_days;

    // Step 1: not overdue. Clear any stale delinquency bookkeeping left
    // from before the balance was settled.
    if days_overdue <= 0 {
        let mut fee_status_reset = false;
        if updated.fee_status == FeeStatus::Overdue {
            updated.fee_status = FeeStatus::Pending;
            fee_status_reset = true;
            changed = true;
        }
        if matches!(
            updated.license_status,
            LicenseStatus::OverdueGrace | LicenseStatus::OverdueWarned
        ) {
            updated.license_status = LicenseStatus::Active;
            changed = true;
        }
        return AccountPlan {
            state: ComplianceState::Current,
            updated,
            fee_delta: Decimal::ZERO,
            warning_interval: None,
            fee_status_reset,
            suspend: false,
            flag_repossession: false,
            changed,
        };
    }

    // Overdue in any degree: the fee is no longer pending.
    if updated.fee_status != FeeStatus::Overdue {
        updated.fee_status = FeeStatus::Overdue;
        changed = true;
    }

    // Step 2: inside grace, boundary inclusive. No penalty, no warning.
    if days_overdue <= grace {
        if updated.license_status == LicenseStatus::Active {
            updated.license_status = LicenseStatus::OverdueGrace;
            changed = true;
        }
        return AccountPlan {
            state: ComplianceState::Grace,
            updated,
            fee_delta: Decimal::ZERO,
            warning_interval: None,
            fee_status_reset: false,
            suspend: false,
            flag_repossession: false,
            changed,
        };
    }

    // Step 3: beyond grace. Progressive fee, recomputed from scratch and
    // applied as a delta so reruns never double-charge.
    let days_past_grace = days_overdue - grace;
    let computed = fees::monthly_late_fee(
        policy.fees.base_fee,
        policy.fees.penalty_percent,
        days_past_grace,
    );
    let accrual = fees::accrue(account.accumulated_late_fee, computed);
    if accrual.delta > Decimal::ZERO {
        updated.accumulated_late_fee = accrual.next;
        changed = true;
    }

    let already_suspended = account.license_status == LicenseStatus::Suspended;

    // Step 4: at most one warning per run, first unsent interval in
    // ascending order; `last_warning_day` is the dedup token.
    let mut warning_interval = None;
    if !already_suspended {
        let mut intervals = policy.escalation.warning_intervals.clone();
        intervals.sort_unstable();
        let last_sent = account.last_warning_day.unwrap_or(i64::MIN);
        for interval in intervals {
            if days_past_grace >= interval && interval > last_sent {
                warning_interval = Some(interval);
                updated.last_warning_day = Some(interval);
                updated.warning_count += 1;
                updated.license_status = LicenseStatus::OverdueWarned;
                changed = true;
                break;
            }
        }
        if warning_interval.is_none() && updated.warning_count > 0 {
            // Keep the warned status sticky between intervals.
            if updated.license_status != LicenseStatus::OverdueWarned {
                updated.license_status = LicenseStatus::OverdueWarned;
                changed = true;
            }
        }
    }

    // Step 5: suspension, once, past the last warning interval.
    let mut suspend = false;
    let mut flag_repossession = false;
    let suspension_at = policy.last_warning_interval() + policy.escalation.suspension_trigger_days;
    if !already_suspended && days_past_grace >= suspension_at {
        suspend = true;
        updated.license_status = LicenseStatus::Suspended;
        if policy.escalation.block_dealer_services || policy.escalation.block_government_services {
            updated.services_blocked = true;
        }
        flag_repossession = policy.escalation.flag_repossession;
        changed = true;
    }

    let state = if suspend || already_suspended {
        ComplianceState::Suspended
    } else if updated.warning_count > 0 {
        ComplianceState::Warned
    } else {
        ComplianceState::Overdue
    };

    AccountPlan {
        state,
        updated,
        fee_delta: accrual.delta,
        warning_interval,
        fee_status_reset: false,
        suspend,
        flag_repossession,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use compliance_ledger::AccountKind;
    use rust_decimal_macros::dec;

    fn account_due(days_ago: i64) -> Account {
        Account::new(
            "Jo Marsh",
            AccountKind::Citizen,
            Utc::now() - Duration::days(days_ago),
        )
    }

    fn policy() -> Policy {
        Policy::default() // grace 30, warnings [3,5,10], suspension +15
    }

    #[test]
    fn current_account_is_untouched() {
        let account = account_due(-10);
        let plan = plan_account(&account, &policy(), Utc::now());
        assert_eq!(plan.state, ComplianceState::Current);
        assert!(!plan.changed);
    }

    #[test]
    fn settled_account_gets_fee_status_reset() {
        let mut account = account_due(-1);
        account.fee_status = FeeStatus::Overdue;
        account.license_status = LicenseStatus::OverdueWarned;

        let plan = plan_account(&account, &policy(), Utc::now());
        assert_eq!(plan.state, ComplianceState::Current);
        assert!(plan.fee_status_reset);
        assert_eq!(plan.updated.fee_status, FeeStatus::Pending);
        assert_eq!(plan.updated.license_status, LicenseStatus::Active);
    }

    #[test]
    fn ten_days_overdue_is_grace_with_no_side_effects() {
        let plan = plan_account(&account_due(10), &policy(), Utc::now());
        assert_eq!(plan.state, ComplianceState::Grace);
        assert_eq!(plan.fee_delta, Decimal::ZERO);
        assert!(plan.warning_interval.is_none());
        assert_eq!(plan.updated.fee_status, FeeStatus::Overdue);
        assert_eq!(plan.updated.license_status, LicenseStatus::OverdueGrace);
    }

    #[test]
    fn grace_boundary_is_inclusive() {
        // Exactly at the grace edge: still grace, no penalty.
        let plan = plan_account(&account_due(30), &policy(), Utc::now());
        assert_eq!(plan.state, ComplianceState::Grace);
        assert_eq!(plan.fee_delta, Decimal::ZERO);

        // One day further: overdue, fee accrues.
        let plan = plan_account(&account_due(31), &policy(), Utc::now());
        assert_ne!(plan.state, ComplianceState::Grace);
        assert!(plan.fee_delta > Decimal::ZERO);
    }

    #[test]
    fn day_three_sends_exactly_one_warning() {
        // days_past_grace = 3 against intervals [3,5,10]
        let plan = plan_account(&account_due(33), &policy(), Utc::now());
        assert_eq!(plan.warning_interval, Some(3));
        assert_eq!(plan.updated.warning_count, 1);
        assert_eq!(plan.updated.last_warning_day, Some(3));
        assert_eq!(plan.updated.license_status, LicenseStatus::OverdueWarned);
    }

    #[test]
    fn warning_not_repeated_for_same_interval() {
        let mut account = account_due(33);
        account.last_warning_day = Some(3);
        account.warning_count = 1;
        account.license_status = LicenseStatus::OverdueWarned;
        account.fee_status = FeeStatus::Overdue;
        account.accumulated_late_fee = dec!(7.5);

        let plan = plan_account(&account, &policy(), Utc::now());
        assert!(plan.warning_interval.is_none());
        assert_eq!(plan.updated.warning_count, 1);
        assert!(!plan.changed);
    }

    #[test]
    fn multiple_overdue_intervals_catch_up_one_per_run() {
        // days_past_grace = 7: intervals 3 and 5 both crossed, nothing sent.
        let mut account = account_due(37);
        let plan = plan_account(&account, &policy(), Utc::now());
        assert_eq!(plan.warning_interval, Some(3));

        // Next run catches up to interval 5.
        account = plan.updated.clone();
        let plan = plan_account(&account, &policy(), Utc::now());
        assert_eq!(plan.warning_interval, Some(5));
        assert_eq!(plan.updated.warning_count, 2);

        // Interval 10 not crossed yet; no third warning.
        account = plan.updated.clone();
        let plan = plan_account(&account, &policy(), Utc::now());
        assert!(plan.warning_interval.is_none());
    }

    #[test]
    fn suspension_past_last_interval_plus_trigger() {
        // days_past_grace = 25 >= 10 + 15
        let mut account = account_due(55);
        account.last_warning_day = Some(10);
        account.warning_count = 3;
        account.license_status = LicenseStatus::OverdueWarned;

        let plan = plan_account(&account, &policy(), Utc::now());
        assert!(plan.suspend);
        assert!(plan.flag_repossession);
        assert_eq!(plan.state, ComplianceState::Suspended);
        assert_eq!(plan.updated.license_status, LicenseStatus::Suspended);
        assert!(plan.updated.services_blocked);
    }

    #[test]
    fn one_day_short_of_suspension_stays_warned() {
        // days_past_grace = 24 < 25
        let mut account = account_due(54);
        account.last_warning_day = Some(10);
        account.warning_count = 3;
        account.license_status = LicenseStatus::OverdueWarned;

        let plan = plan_account(&account, &policy(), Utc::now());
        assert!(!plan.suspend);
        assert_eq!(plan.state, ComplianceState::Warned);
    }

    #[test]
    fn suspended_account_not_suspended_twice() {
        let mut account = account_due(60);
        account.license_status = LicenseStatus::Suspended;
        account.services_blocked = true;
        account.fee_status = FeeStatus::Overdue;
        account.accumulated_late_fee = dec!(15);

        let plan = plan_account(&account, &policy(), Utc::now());
        assert!(!plan.suspend);
        assert!(plan.warning_interval.is_none());
        assert_eq!(plan.state, ComplianceState::Suspended);
    }

    #[test]
    fn rerun_produces_no_new_effects() {
        let first = plan_account(&account_due(33), &policy(), Utc::now());
        assert!(first.changed);

        let second = plan_account(&first.updated, &policy(), Utc::now());
        assert!(!second.changed);
        assert_eq!(second.fee_delta, Decimal::ZERO);
        assert!(second.warning_interval.is_none());
    }
}
