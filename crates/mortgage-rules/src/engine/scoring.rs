use serde::{Deserialize, Serialize};

/// Scoring weights and decision bands for the evaluators.
///
/// The numeric bands are operating parameters, not guideline law: they
/// are injected at service construction so deployments can tune them
/// alongside the rule repository instead of recompiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Qualification score at or above which a file is HighlyQualified.
    pub highly_qualified_band: f64,
    /// Band for Qualified.
    pub qualified_band: f64,
    /// Band for QualifiedWithConditions; below it the file is NotQualified.
    pub conditional_band: f64,
    /// Upper clamp for the qualification score.
    pub qualification_score_max: f64,

    /// Points awarded per credit point above the best applicable minimum.
    pub credit_margin_weight: f64,
    pub credit_margin_cap: f64,
    /// Points per unit of back-end DTI margin below the maximum.
    pub dti_margin_weight: f64,
    pub dti_margin_cap: f64,
    /// Points per unit of down payment above the program minimum.
    pub down_payment_weight: f64,
    pub down_payment_cap: f64,
    /// Points per reserve month above the required minimum.
    pub reserve_month_weight: f64,
    pub reserve_month_cap: f64,

    /// Estimated monthly principal-and-interest per loan dollar, used to
    /// derive a housing payment when the caller does not supply one.
    pub payment_factor: f64,

    /// Underwriting risk score below which a clean file is APPROVED.
    pub risk_approve_below: f64,
    /// Risk score below which a file with compensating factors is
    /// CONDITIONAL rather than MANUAL_REVIEW.
    pub risk_conditional_below: f64,
    /// Down payment fraction that counts as a compensating factor.
    pub compensating_down_payment: f64,
    /// Multiple of the minimum reserves that counts as compensating.
    pub compensating_reserve_factor: f64,

    /// Clamp for the credit assessment qualification boost.
    pub boost_floor: f64,
    pub boost_ceiling: f64,

    /// Rate adjustments by credit tier; excellent pays no premium.
    pub rate_adjustment_good_credit: f64,
    pub rate_adjustment_fair_credit: f64,
    pub rate_adjustment_poor_credit: f64,
    /// Rate adjustments for leverage above 90% and 80% LTV.
    pub rate_adjustment_high_ltv: f64,
    pub rate_adjustment_mid_ltv: f64,
    /// Down payment fraction at which the pricing discount applies.
    pub large_down_payment_floor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            highly_qualified_band: 110.0,
            qualified_band: 75.0,
            conditional_band: 40.0,
            qualification_score_max: 150.0,
            credit_margin_weight: 0.6,
            credit_margin_cap: 60.0,
            dti_margin_weight: 200.0,
            dti_margin_cap: 40.0,
            down_payment_weight: 100.0,
            down_payment_cap: 30.0,
            reserve_month_weight: 5.0,
            reserve_month_cap: 15.0,
            payment_factor: 0.005,
            risk_approve_below: 35.0,
            risk_conditional_below: 55.0,
            compensating_down_payment: 0.20,
            compensating_reserve_factor: 2.0,
            boost_floor: -10.0,
            boost_ceiling: 25.0,
            rate_adjustment_good_credit: 0.25,
            rate_adjustment_fair_credit: 0.5,
            rate_adjustment_poor_credit: 1.0,
            rate_adjustment_high_ltv: 0.375,
            rate_adjustment_mid_ltv: 0.25,
            large_down_payment_floor: 0.25,
        }
    }
}

/// Clamp helper shared by the scoring paths.
pub(crate) fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}
