use super::{CreditTier, Finding};
use crate::engine::domain::{rule_types, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::PricingRequest;
use crate::engine::scoring::ScoringConfig;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateAdjustment {
    pub reason: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingResult {
    pub eligible: bool,
    pub base_rate: Option<f64>,
    pub adjusted_rate: Option<f64>,
    pub adjustments: Vec<RateAdjustment>,
    pub notes: Vec<Finding>,
}

fn lock_rule_type(lock_period_days: u32) -> Option<(&'static str, &'static str)> {
    match lock_period_days {
        15 => Some((rule_types::RATE_ADJUSTMENT_LOCK_15, "15-day rate lock")),
        45 => Some((rule_types::RATE_ADJUSTMENT_LOCK_45, "45-day rate lock")),
        60 => Some((rule_types::RATE_ADJUSTMENT_LOCK_60, "60-day rate lock")),
        _ => None,
    }
}

fn tier_adjustment(credit_score: u16, scoring: &ScoringConfig) -> f64 {
    match CreditTier::from_score(credit_score) {
        CreditTier::Excellent => 0.0,
        CreditTier::Good => scoring.rate_adjustment_good_credit,
        CreditTier::Fair => scoring.rate_adjustment_fair_credit,
        CreditTier::Poor => scoring.rate_adjustment_poor_credit,
    }
}

fn ltv_adjustment(ltv: f64, scoring: &ScoringConfig) -> f64 {
    if ltv > 0.90 {
        scoring.rate_adjustment_high_ltv
    } else if ltv > 0.80 {
        scoring.rate_adjustment_mid_ltv
    } else {
        0.0
    }
}

/// Price the loan: the program's base rate plus level adjustments for
/// credit tier, leverage, lock period, and loan size. Lock and size
/// adjustments come from the repository, so a program without a lock
/// rule simply prices without one.
pub fn evaluate_pricing(
    request: &PricingRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> Result<PricingResult, SelectionConflict> {
    let context = EvaluationContext {
        loan_program: Some(request.loan_program.clone()),
        property_type: None,
        occupancy_type: None,
    };

    let mut notes = Vec::new();
    let mut eligible = true;

    if let Some(max_amount) = rules.resolve_number(rule_types::MAX_LOAN_AMOUNT, &context)? {
        if request.loan_amount > max_amount {
            eligible = false;
            notes.push(Finding::new(
                "loan_exceeds_ceiling",
                format!(
                    "loan amount {:.0} exceeds the lending ceiling {max_amount:.0}",
                    request.loan_amount
                ),
            ));
        }
    }

    let Some(base_rate) = rules.resolve_number(rule_types::BASE_RATE, &context)? else {
        notes.push(Finding::new(
            "no_base_rate",
            format!(
                "no base rate published for program '{}'",
                request.loan_program
            ),
        ));
        return Ok(PricingResult {
            eligible: false,
            base_rate: None,
            adjusted_rate: None,
            adjustments: Vec::new(),
            notes,
        });
    };

    let mut adjustments = Vec::new();

    let tier = tier_adjustment(request.credit_score, scoring);
    if tier != 0.0 {
        adjustments.push(RateAdjustment {
            reason: format!("credit score {}", request.credit_score),
            amount: tier,
        });
    }

    let leverage = ltv_adjustment(request.ltv_ratio, scoring);
    if leverage != 0.0 {
        adjustments.push(RateAdjustment {
            reason: format!("loan-to-value {:.0}%", request.ltv_ratio * 100.0),
            amount: leverage,
        });
    }

    if let Some((rule_type, reason)) = lock_rule_type(request.lock_period_days) {
        if let Some(amount) = rules.resolve_number(rule_type, &context)? {
            adjustments.push(RateAdjustment {
                reason: reason.to_string(),
                amount,
            });
        }
    }

    if let Some(limit) = rules.resolve_number(rule_types::CONFORMING_LOAN_LIMIT, &context)? {
        if request.loan_amount > limit {
            if let Some(amount) =
                rules.resolve_number(rule_types::RATE_ADJUSTMENT_NON_CONFORMING, &context)?
            {
                adjustments.push(RateAdjustment {
                    reason: "loan amount above the conforming limit".to_string(),
                    amount,
                });
            }
        }
    }

    if request.down_payment_percent >= scoring.large_down_payment_floor {
        if let Some(amount) =
            rules.resolve_number(rule_types::RATE_DISCOUNT_LARGE_DOWN_PAYMENT, &context)?
        {
            adjustments.push(RateAdjustment {
                reason: format!(
                    "down payment of {:.0}%",
                    request.down_payment_percent * 100.0
                ),
                amount,
            });
        }
    }

    let total: f64 = adjustments.iter().map(|adjustment| adjustment.amount).sum();
    let adjusted_rate = ((base_rate + total) * 1000.0).round() / 1000.0;

    Ok(PricingResult {
        eligible,
        base_rate: Some(base_rate),
        adjusted_rate: Some(adjusted_rate),
        adjustments,
        notes,
    })
}
