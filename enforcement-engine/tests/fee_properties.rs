//! Property-based tests for late-fee invariants
//!
//! The accrual step must make enforcement reruns idempotent for every
//! input, and the computed fee must behave monotonically in time.

use enforcement_engine::fees::{accrue, monthly_late_fee};
use proptest::prelude::*;
use rust_decimal::Decimal;

proptest! {
    /// Property: re-accruing the same computed fee charges nothing
    #[test]
    fn accrual_is_idempotent(
        existing_cents in 0i64..10_000_000,
        computed_cents in 0i64..10_000_000,
    ) {
        let existing = Decimal::new(existing_cents, 2);
        let computed = Decimal::new(computed_cents, 2);

        let first = accrue(existing, computed);
        let rerun = accrue(first.next, computed);

        prop_assert_eq!(rerun.delta, Decimal::ZERO);
        prop_assert_eq!(rerun.next, first.next);
    }

    /// Property: the accumulated fee never decreases and the delta is the
    /// exact difference charged
    #[test]
    fn accrual_is_monotone(
        existing_cents in 0i64..10_000_000,
        computed_cents in 0i64..10_000_000,
    ) {
        let existing = Decimal::new(existing_cents, 2);
        let computed = Decimal::new(computed_cents, 2);

        let accrual = accrue(existing, computed);
        prop_assert!(accrual.next >= existing);
        prop_assert!(accrual.delta >= Decimal::ZERO);
        prop_assert_eq!(accrual.next - accrual.delta, existing);
    }

    /// Property: the computed fee never shrinks as days past grace grow
    #[test]
    fn fee_grows_with_days(
        base_cents in 1i64..1_000_000,
        percent in 1i64..100,
        days in 1i64..2000,
    ) {
        let base = Decimal::new(base_cents, 2);
        let percent = Decimal::from(percent);

        let today = monthly_late_fee(base, percent, days);
        let tomorrow = monthly_late_fee(base, percent, days + 1);

        prop_assert!(today > Decimal::ZERO);
        prop_assert!(tomorrow >= today);
    }
}
