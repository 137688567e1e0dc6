use super::common::{rule, rule_set, seeded_service};
use crate::engine::domain::{rule_types, Applicability, RuleCategory, RuleValue};
use crate::engine::evaluators::{
    evaluate_underwriting, UnderwritingDecision, UnderwritingResult, Verdict,
};
use crate::engine::schema::{validate_input, ValidatedRequest};
use crate::engine::scoring::ScoringConfig;
use serde_json::{json, Value};

async fn underwrite(payload: &Value) -> UnderwritingResult {
    let service = seeded_service();
    let evaluation = service
        .evaluate(RuleCategory::Underwriting, payload, None)
        .await
        .expect("underwriting evaluates");
    match evaluation.result {
        Verdict::Underwriting(result) => result,
        other => panic!("unexpected verdict: {other:?}"),
    }
}

#[tokio::test]
async fn clean_strong_file_is_approved() {
    let result = underwrite(&json!({
        "credit_score": 760,
        "dti_ratio": 0.25,
        "ltv_ratio": 0.75,
        "loan_amount": 400_000,
        "asset_reserves": 12_000,
        "down_payment_percent": 0.25,
    }))
    .await;

    assert_eq!(result.decision, UnderwritingDecision::Approved);
    assert!(result.risk_score < 35.0);
    assert!(result.findings.is_empty());
}

#[tokio::test]
async fn dti_breach_with_compensating_factors_goes_to_manual_review() {
    let result = underwrite(&json!({
        "credit_score": 720,
        "dti_ratio": 0.50,
        "ltv_ratio": 0.70,
        "loan_amount": 300_000,
        "asset_reserves": 9_000,
        "down_payment_percent": 0.30,
    }))
    .await;

    assert_eq!(result.decision, UnderwritingDecision::ManualReview);
    assert!(result
        .findings
        .iter()
        .any(|finding| finding.code == "dti_exceeds_maximum"));
    assert!(!result.compensating_factors.is_empty());
    assert!(result
        .recommendations
        .contains(&"reduce_monthly_debt".to_string()));
}

#[tokio::test]
async fn dti_breach_without_compensating_factors_is_denied() {
    let result = underwrite(&json!({
        "credit_score": 700,
        "dti_ratio": 0.50,
        "ltv_ratio": 0.90,
        "loan_amount": 300_000,
        "down_payment_percent": 0.05,
    }))
    .await;

    assert_eq!(result.decision, UnderwritingDecision::Denied);
    assert_ne!(result.decision, UnderwritingDecision::Approved);
}

#[tokio::test]
async fn failed_verification_never_comes_back_approved() {
    let result = underwrite(&json!({
        "credit_score": 790,
        "dti_ratio": 0.20,
        "ltv_ratio": 0.60,
        "loan_amount": 200_000,
        "verification_failed": true,
    }))
    .await;

    assert!(matches!(
        result.decision,
        UnderwritingDecision::Denied | UnderwritingDecision::ManualReview
    ));
}

#[tokio::test]
async fn missing_core_facts_route_to_manual_review() {
    let result = underwrite(&json!({
        "loan_amount": 250_000,
    }))
    .await;

    assert_eq!(result.decision, UnderwritingDecision::ManualReview);
    assert!(result.findings.len() >= 3);
}

#[test]
fn conflicting_rule_data_downgrades_to_manual_review() {
    let rules = rule_set(vec![
        rule(
            "uw.max_dti.a",
            RuleCategory::Underwriting,
            rule_types::MAX_DTI,
            Applicability::universal(),
            RuleValue::Number(0.43),
        ),
        rule(
            "uw.max_dti.b",
            RuleCategory::Underwriting,
            rule_types::MAX_DTI,
            Applicability::universal(),
            RuleValue::Number(0.45),
        ),
    ]);

    let ValidatedRequest::Underwriting(request) = validate_input(
        RuleCategory::Underwriting,
        &json!({"credit_score": 720, "dti_ratio": 0.30, "ltv_ratio": 0.80}),
    )
    .expect("payload validates") else {
        panic!("wrong request variant");
    };

    let result = evaluate_underwriting(&request, &rules, &ScoringConfig::default());
    assert_eq!(result.decision, UnderwritingDecision::ManualReview);
    assert!(result
        .findings
        .iter()
        .any(|finding| finding.code == "rule_conflict"));
}

#[tokio::test]
async fn near_limit_file_is_conditional_not_clean_approval() {
    let result = underwrite(&json!({
        "credit_score": 700,
        "dti_ratio": 0.40,
        "ltv_ratio": 0.85,
        "loan_amount": 350_000,
        "asset_reserves": 6_000,
        "down_payment_percent": 0.10,
    }))
    .await;

    assert_eq!(result.decision, UnderwritingDecision::Conditional);
    assert!(!result.conditions.is_empty());
    assert!(result
        .conditions
        .iter()
        .any(|condition| condition.code == "dti_near_maximum"));
}
