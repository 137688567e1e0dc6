use super::Finding;
use crate::engine::domain::{rule_types, EmploymentType, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::{IncomeRequest, IncomeTrend};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeStability {
    Stable,
    NeedsReview,
    Unstable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeResult {
    pub qualifying_monthly_income: f64,
    pub stability: IncomeStability,
    pub issues: Vec<Finding>,
    pub recommendations: Vec<String>,
}

fn tenure_rule_type(employment: EmploymentType) -> Option<&'static str> {
    match employment {
        EmploymentType::W2 | EmploymentType::Military => {
            Some(rule_types::MIN_EMPLOYMENT_YEARS_W2)
        }
        EmploymentType::SelfEmployed => Some(rule_types::MIN_EMPLOYMENT_YEARS_SELF_EMPLOYED),
        EmploymentType::Contract => Some(rule_types::MIN_EMPLOYMENT_YEARS_CONTRACT),
        EmploymentType::Retired => None,
    }
}

/// Compute qualifying income and flag stability concerns. Unverified
/// additional income never counts toward the qualifying figure.
pub fn evaluate_income(
    request: &IncomeRequest,
    rules: &RuleSet,
) -> Result<IncomeResult, SelectionConflict> {
    let context = EvaluationContext::default();
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let verified_extra: f64 = request
        .additional_income
        .iter()
        .filter(|source| source.verified)
        .map(|source| source.monthly_amount)
        .sum();
    let unverified: Vec<&str> = request
        .additional_income
        .iter()
        .filter(|source| !source.verified)
        .map(|source| source.source.as_str())
        .collect();
    if !unverified.is_empty() {
        issues.push(Finding::new(
            "unverified_income",
            format!("unverified income sources excluded: {}", unverified.join(", ")),
        ));
        recommendations.push("verify_income_sources".to_string());
    }

    let qualifying_monthly_income = request.monthly_income + verified_extra;

    let mut tenure_short = false;
    if let Some(rule_type) = tenure_rule_type(request.employment_type) {
        if let Some(min_years) = rules.resolve_number(rule_type, &context)? {
            if request.years_employed < min_years {
                tenure_short = true;
                issues.push(Finding::new(
                    "insufficient_tenure",
                    format!(
                        "{:.1} years in current employment, {:.1} required",
                        request.years_employed, min_years
                    ),
                ));
                recommendations.push("document_employment_history".to_string());
            }
        }
    }

    let declining = matches!(request.income_trend, Some(IncomeTrend::Declining));
    if declining {
        issues.push(Finding::new("declining_income", "income trend is declining"));
        recommendations.push("explain_income_trend".to_string());
    }

    let stability = match (tenure_short, declining) {
        (false, false) => IncomeStability::Stable,
        (true, true) => IncomeStability::Unstable,
        _ => {
            if declining && request.employment_type == EmploymentType::SelfEmployed {
                IncomeStability::Unstable
            } else {
                IncomeStability::NeedsReview
            }
        }
    };

    Ok(IncomeResult {
        qualifying_monthly_income,
        stability,
        issues,
        recommendations,
    })
}
