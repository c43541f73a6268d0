//! Risk engine for the Aegis licensing portal
//!
//! Per-transfer risk scoring and predictive risk trajectory

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod advisory;
pub mod error;
pub mod scoring;
pub mod trajectory;
pub mod types;

pub use advisory::{AdvisoryGenerator, TemplateAdvisor};
pub use error::{Error, Result};
pub use scoring::{RiskScorer, ScoringWeights};
pub use trajectory::{Prediction, Trajectory, TrajectoryEstimator};
pub use types::*;
