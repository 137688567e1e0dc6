//! Typed input/output contracts for the eight rule categories.
//!
//! Inbound payloads are loosely typed JSON; this layer decodes them into
//! the typed request records before any rule lookup happens, collecting
//! every field violation in one pass so the caller gets the complete
//! list in a single round trip.

mod fields;
mod output;
mod requests;

pub(crate) use fields::FieldReader;
pub use output::check_verdict;
pub use requests::{
    validate_input, AdditionalIncome, ComplianceRequest, CreditIssue, CreditRequest,
    DocumentsRequest, IncomeRequest, IncomeTrend, IntakeRequest, IntakeSection, PricingRequest,
    QualificationRequest, SectionFields, UnderwritingRequest, ValidatedRequest,
};

use serde::{Deserialize, Serialize};

/// One offending field, with a machine-readable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub code: ViolationCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    Missing,
    WrongType,
    OutOfRange,
    UnknownValue,
}

/// Complete list of input problems for one request. Never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("request failed validation with {} violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

/// Raised when an evaluator output fails its own invariant check. A
/// programming defect, reported as fatal and never corrected in place.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("output schema violation in {context}: {detail}")]
pub struct SchemaViolation {
    pub context: &'static str,
    pub detail: String,
}
