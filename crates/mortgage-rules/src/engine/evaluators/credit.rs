use super::Finding;
use crate::engine::domain::{rule_types, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::{CreditIssue, CreditRequest};
use crate::engine::scoring::{clamp, ScoringConfig};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl CreditTier {
    pub fn from_score(score: u16) -> Self {
        match score {
            740.. => CreditTier::Excellent,
            680..=739 => CreditTier::Good,
            620..=679 => CreditTier::Fair,
            _ => CreditTier::Poor,
        }
    }

    fn base_boost(self) -> f64 {
        match self {
            CreditTier::Excellent => 25.0,
            CreditTier::Good => 15.0,
            CreditTier::Fair => 5.0,
            CreditTier::Poor => -5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditResult {
    pub tier: CreditTier,
    pub qualification_boost: f64,
    pub risk_factors: Vec<Finding>,
    pub recommendations: Vec<String>,
}

const THIN_FILE_YEARS: f64 = 2.0;
const INQUIRY_ALERT_COUNT: u32 = 6;
const UTILIZATION_PENALTY: f64 = 5.0;
const INQUIRY_PENALTY: f64 = 2.0;

fn issue_rule_type(issue: CreditIssue) -> &'static str {
    match issue {
        CreditIssue::Bankruptcy => rule_types::PENALTY_BANKRUPTCY,
        CreditIssue::Foreclosure => rule_types::PENALTY_FORECLOSURE,
        CreditIssue::Collection => rule_types::PENALTY_COLLECTION,
        CreditIssue::LatePayment => rule_types::PENALTY_LATE_PAYMENT,
        CreditIssue::ChargeOff => rule_types::PENALTY_CHARGE_OFF,
    }
}

fn issue_finding(issue: CreditIssue) -> Finding {
    match issue {
        CreditIssue::Bankruptcy => Finding::new("bankruptcy", "bankruptcy on record"),
        CreditIssue::Foreclosure => Finding::new("foreclosure", "foreclosure on record"),
        CreditIssue::Collection => Finding::new("collection", "account in collection"),
        CreditIssue::LatePayment => Finding::new("late_payment", "recent late payment"),
        CreditIssue::ChargeOff => Finding::new("charge_off", "charged-off account"),
    }
}

/// Tier the score, then subtract rule-driven penalties for derogatory
/// items and behavioral risk factors. The boost feeds the qualification
/// score downstream and is clamped to its published range.
pub fn evaluate_credit(
    request: &CreditRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> Result<CreditResult, SelectionConflict> {
    let context = EvaluationContext::default();
    let tier = CreditTier::from_score(request.credit_score);

    let mut boost = tier.base_boost();
    let mut risk_factors = Vec::new();
    let mut recommendations = Vec::new();

    for issue in &request.credit_issues {
        if let Some(penalty) = rules.resolve_number(issue_rule_type(*issue), &context)? {
            boost -= penalty;
        }
        risk_factors.push(issue_finding(*issue));
    }
    if !request.credit_issues.is_empty() {
        recommendations.push("resolve_derogatory_accounts".to_string());
    }

    if let Some(max_utilization) = rules.resolve_number(rule_types::MAX_UTILIZATION, &context)? {
        if request.credit_utilization > max_utilization {
            boost -= UTILIZATION_PENALTY;
            risk_factors.push(Finding::new(
                "high_utilization",
                format!(
                    "credit utilization {:.0}% exceeds {:.0}%",
                    request.credit_utilization * 100.0,
                    max_utilization * 100.0
                ),
            ));
            recommendations.push("reduce_credit_utilization".to_string());
        }
    }

    if request.recent_inquiries >= INQUIRY_ALERT_COUNT {
        boost -= INQUIRY_PENALTY;
        risk_factors.push(Finding::new(
            "excessive_inquiries",
            format!(
                "{} credit inquiries in the recent window",
                request.recent_inquiries
            ),
        ));
        recommendations.push("limit_new_credit_applications".to_string());
    }

    if request.credit_history_years < THIN_FILE_YEARS {
        risk_factors.push(Finding::new(
            "thin_file",
            format!(
                "thin credit file ({:.1} years of history)",
                request.credit_history_years
            ),
        ));
    }

    let qualification_boost = clamp(boost, scoring.boost_floor, scoring.boost_ceiling);

    Ok(CreditResult {
        tier,
        qualification_boost,
        risk_factors,
        recommendations,
    })
}
