//! Progressive late-fee arithmetic
//!
//! The accrued fee is always recomputed from days overdue and applied as a
//! delta over what has already been charged, never incremented blindly, so
//! repeated runs on the same day charge nothing twice.

use rust_decimal::Decimal;

/// Days per billing month in the penalty formula
const DAYS_PER_MONTH: i64 = 30;

/// Late fee owed after `days_past_grace` days beyond the grace period
///
/// `base_fee x penalty_percent/100 x months`, where `months` is
/// `days_past_grace / 30` floored at 1. The fee therefore steps up at each
/// 30-day boundary rather than growing linearly; confirmed-pending with
/// policy owners, see DESIGN.md.
pub fn monthly_late_fee(base_fee: Decimal, penalty_percent: Decimal, days_past_grace: i64) -> Decimal {
    if days_past_grace <= 0 {
        return Decimal::ZERO;
    }
    let months = (days_past_grace / DAYS_PER_MONTH).max(1);
    base_fee * penalty_percent / Decimal::from(100) * Decimal::from(months)
}

/// Result of reconciling a computed fee against the accumulated one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeAccrual {
    /// New accumulated total, `max(existing, computed)`
    pub next: Decimal,

    /// Amount newly charged this run; zero on a rerun
    pub delta: Decimal,
}

/// Reconcile: the accumulated fee only ever moves up to the computed value
pub fn accrue(existing: Decimal, computed: Decimal) -> FeeAccrual {
    let next = existing.max(computed);
    FeeAccrual {
        next,
        delta: next - existing,
    }
}
