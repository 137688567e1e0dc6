use super::Finding;
use crate::engine::domain::{rule_types, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::UnderwritingRequest;
use crate::engine::scoring::{clamp, ScoringConfig};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnderwritingDecision {
    Approved,
    Conditional,
    ManualReview,
    Denied,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderwritingResult {
    pub decision: UnderwritingDecision,
    pub risk_score: f64,
    pub findings: Vec<Finding>,
    pub conditions: Vec<Finding>,
    pub compensating_factors: Vec<Finding>,
    pub recommendations: Vec<String>,
}

/// Render the underwriting decision. A file with any hard guideline
/// violation can never come out APPROVED; compensating factors route it
/// to manual review instead of denial. Conflicting repository rules are
/// downgraded to a manual-review finding rather than failing the call,
/// so an underwriter always sees the file.
pub fn evaluate_underwriting(
    request: &UnderwritingRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> UnderwritingResult {
    match assess(request, rules, scoring) {
        Ok(result) => result,
        Err(conflict) => UnderwritingResult {
            decision: UnderwritingDecision::ManualReview,
            risk_score: 100.0,
            findings: vec![Finding::new(
                "rule_conflict",
                format!("rule data requires review: {conflict}"),
            )],
            conditions: Vec::new(),
            compensating_factors: Vec::new(),
            recommendations: vec!["escalate_to_underwriter".to_string()],
        },
    }
}

fn assess(
    request: &UnderwritingRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> Result<UnderwritingResult, SelectionConflict> {
    let context = EvaluationContext::default();
    let mut findings = Vec::new();
    let mut conditions = Vec::new();
    let mut compensating_factors = Vec::new();
    let mut recommendations = Vec::new();
    let mut hard_violation = false;
    let mut incomplete = false;
    let mut risk = 0.0;

    let max_dti = rules.resolve_number(rule_types::MAX_DTI, &context)?;
    let max_ltv = rules.resolve_number(rule_types::MAX_LTV, &context)?;
    let min_credit = rules.resolve_number(rule_types::MIN_CREDIT_SCORE, &context)?;
    let min_reserves = rules.resolve_number(rule_types::MIN_RESERVE_MONTHS, &context)?;

    if request.verification_failed {
        hard_violation = true;
        findings.push(Finding::new(
            "verification_failed",
            "income or asset verification failed",
        ));
        recommendations.push("re_verify_income_and_assets".to_string());
        risk += 40.0;
    }

    match request.credit_score {
        Some(score) => {
            if let Some(minimum) = min_credit {
                if f64::from(score) < minimum {
                    hard_violation = true;
                    findings.push(Finding::new(
                        "credit_below_minimum",
                        format!("credit score {score} below minimum {minimum:.0}"),
                    ));
                }
            }
            risk += match score {
                740.. => 0.0,
                680..=739 => 10.0,
                620..=679 => 20.0,
                _ => 30.0,
            };
        }
        None => {
            incomplete = true;
            findings.push(Finding::new(
                "credit_score_missing",
                "credit score not provided",
            ));
            risk += 10.0;
        }
    }

    match request.dti_ratio {
        Some(dti) => {
            if let Some(maximum) = max_dti {
                if dti > maximum {
                    hard_violation = true;
                    findings.push(Finding::new(
                        "dti_exceeds_maximum",
                        format!(
                            "debt-to-income {:.1}% exceeds maximum {:.1}%",
                            dti * 100.0,
                            maximum * 100.0
                        ),
                    ));
                    recommendations.push("reduce_monthly_debt".to_string());
                    risk += 25.0;
                } else if dti > maximum - 0.07 {
                    conditions.push(Finding::new(
                        "dti_near_maximum",
                        "debt-to-income near guideline maximum",
                    ));
                    risk += 15.0;
                } else if dti > maximum - 0.15 {
                    risk += 5.0;
                }
            }
        }
        None => {
            incomplete = true;
            findings.push(Finding::new(
                "dti_ratio_missing",
                "debt-to-income ratio not provided",
            ));
            risk += 10.0;
        }
    }

    match request.ltv_ratio {
        Some(ltv) => {
            if let Some(maximum) = max_ltv {
                if ltv > maximum {
                    hard_violation = true;
                    findings.push(Finding::new(
                        "ltv_exceeds_maximum",
                        format!(
                            "loan-to-value {:.1}% exceeds maximum {:.1}%",
                            ltv * 100.0,
                            maximum * 100.0
                        ),
                    ));
                    recommendations.push("increase_down_payment".to_string());
                    risk += 20.0;
                }
            }
            if ltv > 0.90 {
                risk += 10.0;
            } else if ltv > 0.80 {
                risk += 5.0;
            }
        }
        None => {
            incomplete = true;
            findings.push(Finding::new(
                "ltv_ratio_missing",
                "loan-to-value ratio not provided",
            ));
            risk += 10.0;
        }
    }

    let reserve_months = reserve_months(request, scoring);
    if let Some(minimum) = min_reserves {
        match reserve_months {
            Some(months) if months < minimum => {
                conditions.push(Finding::new(
                    "reserves_below_minimum",
                    format!("reserves cover {months:.1} months, {minimum:.0} required"),
                ));
                recommendations.push("document_additional_reserves".to_string());
                risk += 10.0;
            }
            Some(months) if months >= minimum * scoring.compensating_reserve_factor => {
                compensating_factors.push(Finding::new(
                    "strong_reserves",
                    format!("reserves cover {months:.1} months"),
                ));
            }
            _ => {}
        }
    }

    if let Some(percent) = request.down_payment_percent {
        if percent >= scoring.compensating_down_payment {
            compensating_factors.push(Finding::new(
                "large_down_payment",
                format!("down payment of {:.0}%", percent * 100.0),
            ));
        }
    }

    let risk_score = clamp(risk, 0.0, 100.0);

    if incomplete {
        recommendations.push("supply_missing_underwriting_data".to_string());
    }

    let decision = if hard_violation {
        if compensating_factors.is_empty() {
            UnderwritingDecision::Denied
        } else {
            UnderwritingDecision::ManualReview
        }
    } else if incomplete {
        UnderwritingDecision::ManualReview
    } else if risk_score < scoring.risk_approve_below && conditions.is_empty() {
        UnderwritingDecision::Approved
    } else if risk_score < scoring.risk_conditional_below {
        UnderwritingDecision::Conditional
    } else {
        UnderwritingDecision::ManualReview
    };

    Ok(UnderwritingResult {
        decision,
        risk_score,
        findings,
        conditions,
        compensating_factors,
        recommendations,
    })
}

fn reserve_months(request: &UnderwritingRequest, scoring: &ScoringConfig) -> Option<f64> {
    let reserves = request.asset_reserves?;
    let loan_amount = request.loan_amount?;
    let payment = loan_amount * scoring.payment_factor;
    if payment > 0.0 {
        Some(reserves / payment)
    } else {
        None
    }
}
