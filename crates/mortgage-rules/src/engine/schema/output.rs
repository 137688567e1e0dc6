use super::SchemaViolation;
use crate::engine::evaluators::Verdict;

fn check_range(
    context: &'static str,
    name: &str,
    value: f64,
    low: f64,
    high: f64,
) -> Result<(), SchemaViolation> {
    if value.is_finite() && value >= low && value <= high {
        Ok(())
    } else {
        Err(SchemaViolation {
            context,
            detail: format!("{name} = {value} outside [{low}, {high}]"),
        })
    }
}

/// Invariant check over an evaluator's output before it leaves the
/// engine. A failure here is a defect in the evaluator, not bad input.
pub fn check_verdict(verdict: &Verdict) -> Result<(), SchemaViolation> {
    match verdict {
        Verdict::Intake(result) => check_range(
            "intake",
            "completeness_percent",
            result.completeness_percent,
            0.0,
            100.0,
        ),
        Verdict::Qualification(result) => check_range(
            "qualification",
            "qualification_score",
            result.qualification_score,
            0.0,
            150.0,
        ),
        Verdict::Credit(result) => check_range(
            "credit",
            "qualification_boost",
            result.qualification_boost,
            -10.0,
            25.0,
        ),
        Verdict::Income(result) => check_range(
            "income",
            "qualifying_monthly_income",
            result.qualifying_monthly_income,
            0.0,
            f64::MAX,
        ),
        Verdict::Underwriting(result) => {
            check_range("underwriting", "risk_score", result.risk_score, 0.0, 100.0)
        }
        Verdict::Pricing(result) => match result.adjusted_rate {
            Some(rate) => check_range("pricing", "adjusted_rate", rate, 0.0, 25.0),
            None => Ok(()),
        },
        Verdict::Documents(_) | Verdict::Compliance(_) => Ok(()),
    }
}
