//! Property-based tests for scoring invariants
//!
//! The composite score must stay inside [0,100] and map onto the fixed
//! tier thresholds for every input, not just the curated cases.

use chrono::{Duration, TimeZone, Utc};
use compliance_ledger::{FeeStatus, ItemType, LicenseStatus, RiskLevel};
use proptest::prelude::*;
use risk_engine::{
    CounterpartyProfile, HistoricalTransfer, ProposedTransfer, RiskScorer, SubjectHistory,
};
use uuid::Uuid;

fn arb_license_status() -> impl Strategy<Value = LicenseStatus> {
    prop_oneof![
        Just(LicenseStatus::Active),
        Just(LicenseStatus::OverdueGrace),
        Just(LicenseStatus::OverdueWarned),
        Just(LicenseStatus::Suspended),
        Just(LicenseStatus::Revoked),
    ]
}

proptest! {
    /// Property: score stays in [0,100] and the tier matches the thresholds
    #[test]
    fn score_bounded_and_tier_consistent(
        quantity in 1u32..10_000,
        transfer_count in 0usize..50,
        per_transfer_quantity in 1u32..200,
        violation_count in 0u32..10,
        hour in 0u32..24,
        days_to_expiry in -400i64..400,
        observed_days in 7i64..365,
        warning_count in 0u32..5,
        status in arb_license_status(),
    ) {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, hour, 30, 0).unwrap();

        let mut history = SubjectHistory::empty(Uuid::new_v4());
        history.observed_since = Some(now - Duration::days(observed_days));
        history.violation_count = violation_count;
        history.fee_status = FeeStatus::Pending;
        history.license_expires_at = Some(now + Duration::days(days_to_expiry));
        history.home_region = Some("NW".to_string());
        for i in 0..transfer_count {
            history.transfers.push(HistoricalTransfer {
                occurred_at: now - Duration::hours(i as i64 * 17 % (observed_days * 24)),
                quantity: per_transfer_quantity,
                item_type: ItemType::Firearm,
                location: None,
            });
        }

        let counterparty = CounterpartyProfile {
            account_id: Uuid::new_v4(),
            license_status: status,
            warning_count,
            violation_count: 0,
        };

        let proposal = ProposedTransfer {
            quantity,
            item_type: ItemType::Firearm,
            location: Some("SE".to_string()),
            initiated_at: now,
        };

        let assessment = RiskScorer::new()
            .score(&history, Some(&counterparty), &proposal)
            .unwrap();

        prop_assert!(assessment.score <= 100);

        let expected = match assessment.score {
            0..=39 => RiskLevel::Green,
            40..=69 => RiskLevel::Amber,
            _ => RiskLevel::Red,
        };
        prop_assert_eq!(assessment.level, expected);
    }

    /// Property: scoring twice with identical inputs is identical
    #[test]
    fn scoring_is_pure(quantity in 1u32..1000, violations in 0u32..5) {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let mut history = SubjectHistory::empty(Uuid::new_v4());
        history.violation_count = violations;

        let proposal = ProposedTransfer {
            quantity,
            item_type: ItemType::Ammunition,
            location: None,
            initiated_at: now,
        };

        let scorer = RiskScorer::new();
        let a = scorer.score(&history, None, &proposal).unwrap();
        let b = scorer.score(&history, None, &proposal).unwrap();
        prop_assert_eq!(a.score, b.score);
        prop_assert_eq!(a.level, b.level);
        prop_assert_eq!(a.factors, b.factors);
    }
}
