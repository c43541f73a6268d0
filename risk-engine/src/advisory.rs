//! Best-effort advisory text for risk assessments
//!
//! Advisory generation may call out to slow external services, so it sits
//! behind a trait and a timeout. Failure leaves the assessment's advisory
//! absent; it never blocks or fails the numeric result.

use crate::types::RiskAssessment;
use crate::Result;
use async_trait::async_trait;
use compliance_ledger::RiskLevel;

/// Source of advisory text for a completed assessment
#[async_trait]
pub trait AdvisoryGenerator: Send + Sync {
    /// Produce advisory text for the assessment
    async fn advisory(&self, assessment: &RiskAssessment) -> Result<String>;
}

/// Built-in template advisor; always succeeds
pub struct TemplateAdvisor;

#[async_trait]
impl AdvisoryGenerator for TemplateAdvisor {
    async fn advisory(&self, assessment: &RiskAssessment) -> Result<String> {
        let text = match assessment.level {
            RiskLevel::Red => format!(
                "HIGH RISK (score {}): hold for review. Contributing factors: {}",
                assessment.score,
                join_factors(&assessment.factors)
            ),
            RiskLevel::Amber => format!(
                "ELEVATED RISK (score {}): monitor closely. Contributing factors: {}",
                assessment.score,
                join_factors(&assessment.factors)
            ),
            RiskLevel::Green => format!(
                "LOW RISK (score {}): proceed with standard monitoring",
                assessment.score
            ),
        };
        Ok(text)
    }
}

fn join_factors(factors: &[String]) -> String {
    if factors.is_empty() {
        "none recorded".to_string()
    } else {
        factors.join("; ")
    }
}
