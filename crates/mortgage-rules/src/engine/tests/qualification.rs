use super::common::{seeded_service, strong_qualification_payload};
use crate::engine::domain::{rule_types, RuleCategory};
use crate::engine::evaluators::{QualificationResult, QualificationStatus, Verdict};
use serde_json::{json, Value};

async fn qualify(payload: &Value) -> QualificationResult {
    let service = seeded_service();
    let evaluation = service
        .evaluate(RuleCategory::Qualification, payload, None)
        .await
        .expect("qualification evaluates");
    match evaluation.result {
        Verdict::Qualification(result) => result,
        other => panic!("unexpected verdict: {other:?}"),
    }
}

#[tokio::test]
async fn strong_file_is_highly_qualified_for_every_program() {
    let result = qualify(&strong_qualification_payload()).await;

    assert_eq!(result.status, QualificationStatus::HighlyQualified);
    assert!(result.qualification_score >= 110.0);
    assert!(result.qualification_score <= 150.0);
    assert_eq!(result.eligible_programs.len(), 5);
    assert!((result.back_end_dti - 0.25).abs() < 1e-9);
    assert!((result.front_end_dti - 0.25).abs() < 1e-9);
}

#[tokio::test]
async fn deep_subprime_score_fails_every_program_with_gaps() {
    let mut payload = strong_qualification_payload();
    payload["credit_score"] = json!(550);

    let result = qualify(&payload).await;
    assert_eq!(result.status, QualificationStatus::NotQualified);
    assert!(result.eligible_programs.is_empty());

    // Every program reports its credit floor as the unmet requirement.
    let credit_gaps = result
        .gaps
        .iter()
        .filter(|gap| gap.requirement == rule_types::MIN_CREDIT_SCORE)
        .count();
    assert_eq!(credit_gaps, 5);
    assert!(result
        .gaps
        .iter()
        .any(|gap| gap.program == "fha" && (gap.required - 580.0).abs() < 1e-9));
}

#[tokio::test]
async fn debt_load_over_the_cap_disqualifies_globally() {
    let mut payload = strong_qualification_payload();
    payload["monthly_debts"] = json!(4000);

    let result = qualify(&payload).await;
    assert_eq!(result.status, QualificationStatus::NotQualified);
    assert!(result.eligible_programs.is_empty());
    assert!(result
        .gaps
        .iter()
        .any(|gap| gap.requirement == rule_types::MAX_BACK_END_DTI && gap.program == "all"));
}

#[tokio::test]
async fn a_better_credit_score_never_scores_lower() {
    let mut fair = strong_qualification_payload();
    fair["credit_score"] = json!(650);
    let mut good = strong_qualification_payload();
    good["credit_score"] = json!(700);

    let fair = qualify(&fair).await;
    let good = qualify(&good).await;
    assert!(good.qualification_score >= fair.qualification_score);
}

#[tokio::test]
async fn reserves_lift_the_score() {
    let without = qualify(&strong_qualification_payload()).await;

    let mut payload = strong_qualification_payload();
    payload["asset_reserves"] = json!(12_000);
    let with_reserves = qualify(&payload).await;

    assert!(with_reserves.qualification_score > without.qualification_score);
    assert!(with_reserves.qualification_score <= 150.0);
}

#[tokio::test]
async fn mid_strength_file_lands_in_a_middle_band() {
    let payload = json!({
        "credit_score": 640,
        "monthly_income": 6000,
        "monthly_debts": 2200,
        "down_payment_percent": 0.05,
        "loan_amount": 285_000,
        "property_value": 300_000,
        "loan_purpose": "purchase",
        "property_type": "single_family",
        "occupancy_type": "primary",
    });

    let result = qualify(&payload).await;
    assert!(matches!(
        result.status,
        QualificationStatus::Qualified | QualificationStatus::QualifiedWithConditions
    ));
    assert!(!result.eligible_programs.is_empty());
}
