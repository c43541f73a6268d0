// Demo orchestrator - drives the full compliance pipeline end to end:
// score a transfer, evaluate the flagging rules, then run an enforcement
// sweep over a seeded ledger and print the audit summary.

use anyhow::Result;
use chrono::{Duration, Utc};
use compliance_ledger::memory::{
    MemoryAuditSink, MemoryLedger, MemoryNotificationSink, MemoryPolicyStore,
};
use compliance_ledger::{
    Account, AccountKind, AccountStore, Asset, FeeStatus, ItemType, LicenseStatus, Policy,
    RiskLevel, Transaction, TransactionStatus,
};
use enforcement_engine::{EnforcementConfig, EnforcementEngine, EnforcementScheduler};
use flagging_engine::{
    builtin_rules, open_flag, CounterpartyContext, FlaggingEngine, SubjectContext,
};
use risk_engine::{
    CounterpartyProfile, HistoricalTransfer, ProposedTransfer, RiskScorer, SubjectHistory,
    TemplateAdvisor, TrajectoryEstimator,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    println!("\n=== Aegis Compliance Core Demo ===\n");

    // --- Seed the ledger ------------------------------------------------
    let ledger = Arc::new(MemoryLedger::new());
    let mut policy = Policy::default();
    policy.fees.base_fee = dec!(100.00);
    policy.fees.penalty_percent = dec!(12.5);
    let policies = Arc::new(MemoryPolicyStore::with_policy(policy));
    let notifier = Arc::new(MemoryNotificationSink::new());
    let audit = Arc::new(MemoryAuditSink::new());

    let now = Utc::now();

    let mut citizen = Account::new("Casey Oduya", AccountKind::Citizen, now - Duration::days(33));
    citizen.home_region = Some("NW".to_string());
    citizen.license_expires_at = Some(now + Duration::days(45));
    let citizen_id = citizen.id;
    ledger.insert_account(citizen);
    ledger.insert_asset(Asset::new(citizen_id, "SN-4411"));

    let mut dealer = Account::new("Voss Outfitters", AccountKind::Dealer, now + Duration::days(90));
    dealer.license_status = LicenseStatus::Suspended;
    dealer.services_blocked = true;
    let dealer_id = dealer.id;
    ledger.insert_account(dealer.clone());

    // --- 1. Risk scoring ------------------------------------------------
    let history = SubjectHistory {
        account_id: citizen_id,
        home_region: Some("NW".to_string()),
        license_expires_at: Some(now + Duration::days(45)),
        violation_count: 1,
        trainings_completed: 0,
        fee_status: FeeStatus::Overdue,
        transfers: vec![HistoricalTransfer {
            occurred_at: now - Duration::days(20),
            quantity: 2,
            item_type: ItemType::Firearm,
            location: Some("NW".to_string()),
        }],
        observed_since: Some(now - Duration::days(120)),
    };
    let counterparty = CounterpartyProfile {
        account_id: dealer_id,
        license_status: dealer.license_status,
        warning_count: dealer.warning_count,
        violation_count: 0,
    };
    let proposal = ProposedTransfer {
        quantity: 60,
        item_type: ItemType::Firearm,
        location: Some("SE".to_string()),
        initiated_at: now,
    };

    let scorer = RiskScorer::new();
    let assessment = scorer
        .assess_with_advisory(
            &history,
            Some(&counterparty),
            &proposal,
            &TemplateAdvisor,
            std::time::Duration::from_millis(250),
        )
        .await?;

    println!("risk score:   {} ({:?})", assessment.score, assessment.level);
    for factor in &assessment.factors {
        println!("  - {}", factor);
    }
    if let Some(advisory) = &assessment.advisory {
        println!("advisory:     {}", advisory);
    }

    // --- 2. Flag evaluation ---------------------------------------------
    let transaction = Transaction {
        id: Uuid::new_v4(),
        buyer_id: citizen_id,
        seller_id: dealer_id,
        item_type: ItemType::Firearm,
        item_category: "long_gun".to_string(),
        quantity: proposal.quantity,
        risk_score: assessment.score,
        risk_level: RiskLevel::from_score(assessment.score),
        risk_factors: assessment.factors.clone(),
        location: proposal.location.clone(),
        status: TransactionStatus::Pending,
        flag_id: None,
        created_at: now,
    };

    let subject_ctx = SubjectContext::new(ledger.get_account(citizen_id).await?);
    let counterparty_ctx = CounterpartyContext { account: dealer };

    let evaluation = FlaggingEngine::new().evaluate(
        &transaction,
        &subject_ctx,
        Some(&counterparty_ctx),
        &builtin_rules(),
    );

    println!("\nflagged:      {}", evaluation.flagged);
    for triggered in &evaluation.triggered {
        println!("  - {} ({:?}): {}", triggered.rule_id, triggered.severity, triggered.detail);
    }
    if let Some(outcome) = open_flag(&evaluation, transaction.id, now) {
        println!(
            "flag {} opened, review required: {}",
            outcome.flag.id, outcome.flag.review_required
        );
    }

    // --- 3. Predictive trajectory ---------------------------------------
    let prediction = TrajectoryEstimator::new().predict(&history, now);
    println!(
        "\ntrajectory:   {:?} (score {}, confidence {}%)",
        prediction.trajectory, prediction.trajectory_score, prediction.confidence
    );
    println!(
        "risk now {} -> {} in 30 days",
        prediction.current_risk, prediction.predicted_risk_30d
    );
    for recommendation in &prediction.recommendations {
        println!("  - {}", recommendation);
    }

    // --- 4. Enforcement sweep -------------------------------------------
    let engine = Arc::new(EnforcementEngine::new(
        ledger.clone(),
        policies,
        notifier.clone(),
        audit.clone(),
    ));
    let scheduler = Arc::new(EnforcementScheduler::new(
        engine,
        &EnforcementConfig::default(),
    ));

    let record = scheduler.run_now().await?;
    println!(
        "\nenforcement run {}: processed={} warned={} late_fees={} suspended={}",
        record.id,
        record.counts.processed,
        record.counts.warned,
        record.counts.late_fees_applied,
        record.counts.suspended,
    );
    for sent in notifier.sent().await {
        println!("  notification -> {} {:?}", sent.account_id, sent.kind);
    }

    let citizen = ledger.get_account(citizen_id).await?;
    println!(
        "citizen now:  {:?}, warnings={}, late fee={}",
        citizen.license_status, citizen.warning_count, citizen.accumulated_late_fee
    );

    println!("\naudit records appended: {}", audit.records().await.len());
    println!("\n=== demo complete ===");

    Ok(())
}
