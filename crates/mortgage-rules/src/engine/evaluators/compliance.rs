use super::Finding;
use crate::engine::domain::{rule_types, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::ComplianceRequest;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    RequiresReview,
    NonCompliant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub status: ComplianceStatus,
    pub findings: Vec<Finding>,
    pub demographics_recorded: bool,
}

/// Annual income multiple above which affordability review is required.
const AFFORDABILITY_INCOME_MULTIPLE: f64 = 6.0;

/// Regulatory screening. Demographic data, when present, is recorded
/// for monitoring and has no influence on the outcome.
pub fn evaluate_compliance(
    request: &ComplianceRequest,
    rules: &RuleSet,
) -> Result<ComplianceResult, SelectionConflict> {
    let context = EvaluationContext::default();
    let mut findings = Vec::new();
    let mut non_compliant = false;
    let mut review = false;

    if let Some(max_amount) = rules.resolve_number(rule_types::MAX_LOAN_AMOUNT, &context)? {
        if request.loan_amount > max_amount {
            non_compliant = true;
            findings.push(Finding::new(
                "loan_amount_over_limit",
                format!(
                    "loan amount {:.0} exceeds the lending limit {max_amount:.0}",
                    request.loan_amount
                ),
            ));
        }
    }

    if let Some(limit) = rules.resolve_number(rule_types::CONFORMING_LOAN_LIMIT, &context)? {
        if request.loan_amount > limit {
            findings.push(Finding::new(
                "non_conforming_amount",
                format!(
                    "loan amount {:.0} is above the conforming limit {limit:.0}",
                    request.loan_amount
                ),
            ));
        }
    }

    let ltv = request.loan_amount / request.property_value;
    if ltv > 1.0 {
        non_compliant = true;
        findings.push(Finding::new(
            "negative_equity",
            format!("loan-to-value {:.1}% exceeds 100%", ltv * 100.0),
        ));
    }

    let annual_income = request.borrower_income * 12.0;
    if annual_income > 0.0 && request.loan_amount > annual_income * AFFORDABILITY_INCOME_MULTIPLE {
        review = true;
        findings.push(Finding::new(
            "affordability_review",
            format!(
                "loan amount is {:.1}x annual income",
                request.loan_amount / annual_income
            ),
        ));
    } else if annual_income == 0.0 {
        review = true;
        findings.push(Finding::new(
            "no_stated_income",
            "borrower income is zero; ability-to-repay must be reviewed",
        ));
    }

    let status = if non_compliant {
        ComplianceStatus::NonCompliant
    } else if review {
        ComplianceStatus::RequiresReview
    } else {
        ComplianceStatus::Compliant
    };

    Ok(ComplianceResult {
        status,
        findings,
        demographics_recorded: request.borrower_demographics.is_some(),
    })
}
