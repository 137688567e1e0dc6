//! Category evaluators.
//!
//! Each evaluator is a pure function over a validated request, the rule
//! set fetched for it, and the scoring parameters. No evaluator touches
//! the repository or the cache; the service owns that sequencing.

mod compliance;
mod credit;
mod documents;
mod income;
mod intake;
mod pricing;
mod qualification;
mod underwriting;

pub use compliance::{evaluate_compliance, ComplianceResult, ComplianceStatus};
pub use credit::{evaluate_credit, CreditResult, CreditTier};
pub use documents::{evaluate_documents, DocumentsResult, DocumentsStatus};
pub use income::{evaluate_income, IncomeResult, IncomeStability};
pub use intake::{evaluate_intake, IntakeResult, IntakeStatus};
pub use pricing::{evaluate_pricing, PricingResult, RateAdjustment};
pub use qualification::{
    evaluate_qualification, QualificationGap, QualificationResult, QualificationStatus,
};
pub use underwriting::{evaluate_underwriting, UnderwritingDecision, UnderwritingResult};

use serde::Serialize;

/// One coded observation on a result. The code is the stable
/// machine-readable identifier callers branch on; the message is for
/// display only and carries no contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub code: String,
    pub message: String,
}

impl Finding {
    pub(crate) fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

/// The category-specific outcome of one evaluation. Serialized untagged
/// so each verdict renders as its own result object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Verdict {
    Intake(IntakeResult),
    Qualification(QualificationResult),
    Credit(CreditResult),
    Income(IncomeResult),
    Documents(DocumentsResult),
    Underwriting(UnderwritingResult),
    Pricing(PricingResult),
    Compliance(ComplianceResult),
}
