use crate::engine::domain::{rule_types, EvaluationContext, RuleSet, SelectionConflict};
use crate::engine::schema::QualificationRequest;
use crate::engine::scoring::{clamp, ScoringConfig};
use serde::Serialize;

// Serialized in PascalCase, matching the published tool contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualificationStatus {
    HighlyQualified,
    Qualified,
    QualifiedWithConditions,
    NotQualified,
}

/// One unmet program requirement, reported when no program fits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationGap {
    pub program: String,
    pub requirement: String,
    pub required: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationResult {
    pub status: QualificationStatus,
    pub qualification_score: f64,
    pub front_end_dti: f64,
    pub back_end_dti: f64,
    pub eligible_programs: Vec<String>,
    pub gaps: Vec<QualificationGap>,
    pub recommendations: Vec<String>,
}

/// Sweep every loan program's entry thresholds, then score the file
/// against the most favorable applicable requirements.
pub fn evaluate_qualification(
    request: &QualificationRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> Result<QualificationResult, SelectionConflict> {
    let context = EvaluationContext {
        loan_program: None,
        property_type: Some(request.property_type),
        occupancy_type: Some(request.occupancy_type),
    };

    let housing_payment = request.loan_amount * scoring.payment_factor;
    let front_end_dti = if request.monthly_income > 0.0 {
        housing_payment / request.monthly_income
    } else {
        f64::INFINITY
    };
    let back_end_dti = if request.monthly_income > 0.0 {
        request.monthly_debts / request.monthly_income
    } else {
        f64::INFINITY
    };
    let down_payment_percent = request.down_payment_percent();

    let max_front = rules
        .resolve_number(rule_types::MAX_FRONT_END_DTI, &context)?
        .unwrap_or(f64::INFINITY);
    let max_back = rules
        .resolve_number(rule_types::MAX_BACK_END_DTI, &context)?
        .unwrap_or(f64::INFINITY);

    let credit_minimums = rules.per_program(rule_types::MIN_CREDIT_SCORE);
    let down_minimums = rules.per_program(rule_types::MIN_DOWN_PAYMENT);

    let mut eligible_programs = Vec::new();
    let mut gaps = Vec::new();

    for (program, rule) in &credit_minimums {
        let min_credit = rule.threshold.as_number().unwrap_or(f64::INFINITY);
        let min_down = down_minimums
            .get(program)
            .and_then(|rule| rule.threshold.as_number())
            .unwrap_or(0.0);

        let mut fits = true;
        if f64::from(request.credit_score) < min_credit {
            fits = false;
            gaps.push(QualificationGap {
                program: program.to_string(),
                requirement: rule_types::MIN_CREDIT_SCORE.to_string(),
                required: min_credit,
                actual: f64::from(request.credit_score),
            });
        }
        if down_payment_percent < min_down {
            fits = false;
            gaps.push(QualificationGap {
                program: program.to_string(),
                requirement: rule_types::MIN_DOWN_PAYMENT.to_string(),
                required: min_down,
                actual: down_payment_percent,
            });
        }
        if back_end_dti > max_back || front_end_dti > max_front {
            fits = false;
        }
        if fits {
            eligible_programs.push(program.to_string());
        }
    }

    // DTI caps are universal, so a breach is one gap, not one per program.
    if back_end_dti > max_back {
        gaps.push(QualificationGap {
            program: "all".to_string(),
            requirement: rule_types::MAX_BACK_END_DTI.to_string(),
            required: max_back,
            actual: back_end_dti,
        });
    }
    if front_end_dti > max_front {
        gaps.push(QualificationGap {
            program: "all".to_string(),
            requirement: rule_types::MAX_FRONT_END_DTI.to_string(),
            required: max_front,
            actual: front_end_dti,
        });
    }

    // Score against the most lenient thresholds on the books, so the
    // score reflects headroom rather than one program's strictness.
    let lowest_min_credit = credit_minimums
        .values()
        .filter_map(|rule| rule.threshold.as_number())
        .fold(f64::INFINITY, f64::min);
    let lowest_min_down = down_minimums
        .values()
        .filter_map(|rule| rule.threshold.as_number())
        .fold(f64::INFINITY, f64::min);

    let credit_component = if lowest_min_credit.is_finite() {
        clamp(
            scoring.credit_margin_weight * (f64::from(request.credit_score) - lowest_min_credit),
            0.0,
            scoring.credit_margin_cap,
        )
    } else {
        0.0
    };
    let dti_component = if max_back.is_finite() && back_end_dti.is_finite() {
        clamp(
            scoring.dti_margin_weight * (max_back - back_end_dti),
            0.0,
            scoring.dti_margin_cap,
        )
    } else {
        0.0
    };
    let down_component = if lowest_min_down.is_finite() {
        clamp(
            scoring.down_payment_weight * (down_payment_percent - lowest_min_down),
            0.0,
            scoring.down_payment_cap,
        )
    } else {
        0.0
    };
    let reserve_months = match request.asset_reserves {
        Some(reserves) if housing_payment > 0.0 => reserves / housing_payment,
        _ => 0.0,
    };
    let reserve_component = clamp(
        scoring.reserve_month_weight * reserve_months,
        0.0,
        scoring.reserve_month_cap,
    );

    let qualification_score = clamp(
        credit_component + dti_component + down_component + reserve_component,
        0.0,
        scoring.qualification_score_max,
    );

    let status = if eligible_programs.is_empty() {
        QualificationStatus::NotQualified
    } else if qualification_score >= scoring.highly_qualified_band {
        QualificationStatus::HighlyQualified
    } else if qualification_score >= scoring.qualified_band {
        QualificationStatus::Qualified
    } else if qualification_score >= scoring.conditional_band {
        QualificationStatus::QualifiedWithConditions
    } else {
        QualificationStatus::NotQualified
    };

    let mut recommendations = Vec::new();
    for gap in &gaps {
        let action = match gap.requirement.as_str() {
            rule_types::MIN_CREDIT_SCORE => "improve_credit_score",
            rule_types::MIN_DOWN_PAYMENT => "increase_down_payment",
            rule_types::MAX_BACK_END_DTI | rule_types::MAX_FRONT_END_DTI => "reduce_monthly_debt",
            _ => continue,
        };
        if !recommendations.iter().any(|existing| existing == action) {
            recommendations.push(action.to_string());
        }
    }

    Ok(QualificationResult {
        status,
        qualification_score,
        front_end_dti,
        back_end_dti,
        eligible_programs,
        gaps,
        recommendations,
    })
}
