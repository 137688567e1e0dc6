use super::common::strong_qualification_payload;
use crate::engine::domain::RuleCategory;
use crate::engine::evaluators::{CreditResult, CreditTier, Verdict};
use crate::engine::schema::{check_verdict, validate_input, ValidatedRequest, ViolationCode};
use serde_json::json;

#[test]
fn collects_every_violation_in_one_pass() {
    let payload = json!({
        "credit_score": 200,
        "monthly_debts": "a lot",
        "loan_purpose": "speculation",
    });

    let error = validate_input(RuleCategory::Qualification, &payload)
        .expect_err("bad payload is rejected");

    let fields: Vec<&str> = error
        .violations
        .iter()
        .map(|violation| violation.field.as_str())
        .collect();
    assert!(fields.contains(&"credit_score"));
    assert!(fields.contains(&"monthly_debts"));
    assert!(fields.contains(&"loan_purpose"));
    assert!(fields.contains(&"loan_amount"));
    assert!(error.violations.len() >= 5);
}

#[test]
fn non_object_payload_is_one_root_violation() {
    let error = validate_input(RuleCategory::Credit, &json!([1, 2, 3]))
        .expect_err("arrays are not requests");
    assert!(error
        .violations
        .iter()
        .any(|violation| violation.field == "$" && violation.code == ViolationCode::WrongType));
}

#[test]
fn annual_income_is_folded_into_monthly() {
    let mut payload = strong_qualification_payload();
    let object = payload.as_object_mut().expect("payload is an object");
    object.remove("monthly_income");
    object.insert("annual_income".to_string(), json!(96_000));

    let request = validate_input(RuleCategory::Qualification, &payload).expect("valid payload");
    let ValidatedRequest::Qualification(request) = request else {
        panic!("wrong request variant");
    };
    assert!((request.monthly_income - 8000.0).abs() < 1e-9);
}

#[test]
fn down_payment_percent_derives_the_amount() {
    let mut payload = strong_qualification_payload();
    let object = payload.as_object_mut().expect("payload is an object");
    object.remove("down_payment");
    object.insert("down_payment_percent".to_string(), json!(0.20));

    let request = validate_input(RuleCategory::Qualification, &payload).expect("valid payload");
    let ValidatedRequest::Qualification(request) = request else {
        panic!("wrong request variant");
    };
    assert!((request.down_payment - 100_000.0).abs() < 1e-9);
}

#[test]
fn equivalent_phrasings_share_a_cache_key() {
    let monthly = validate_input(RuleCategory::Qualification, &strong_qualification_payload())
        .expect("valid payload");

    let mut annual_payload = strong_qualification_payload();
    let object = annual_payload.as_object_mut().expect("payload is an object");
    object.remove("monthly_income");
    object.insert("annual_income".to_string(), json!(96_000));
    let annual =
        validate_input(RuleCategory::Qualification, &annual_payload).expect("valid payload");

    assert_eq!(
        monthly.input_hash().expect("hashable"),
        annual.input_hash().expect("hashable")
    );

    let mut different = strong_qualification_payload();
    different["credit_score"] = json!(721);
    let different =
        validate_input(RuleCategory::Qualification, &different).expect("valid payload");
    assert_ne!(
        monthly.input_hash().expect("hashable"),
        different.input_hash().expect("hashable")
    );
}

#[test]
fn unknown_enum_values_are_named_violations() {
    let payload = json!({
        "loan_purpose": "purchase",
        "employment_type": "freelancer",
        "property_type": "single_family",
        "documents_provided": ["photo_id"],
    });
    let error =
        validate_input(RuleCategory::Documents, &payload).expect_err("unknown employment type");
    assert!(error.violations.iter().any(|violation| {
        violation.field == "employment_type" && violation.code == ViolationCode::UnknownValue
    }));
}

#[test]
fn underwriting_accepts_missing_facts() {
    let request = validate_input(RuleCategory::Underwriting, &json!({}))
        .expect("an empty underwriting payload validates");
    let ValidatedRequest::Underwriting(request) = request else {
        panic!("wrong request variant");
    };
    assert!(request.credit_score.is_none());
    assert!(!request.verification_failed);
}

#[test]
fn out_of_range_boost_fails_the_output_check() {
    let verdict = Verdict::Credit(CreditResult {
        tier: CreditTier::Excellent,
        qualification_boost: 40.0,
        risk_factors: Vec::new(),
        recommendations: Vec::new(),
    });
    let violation = check_verdict(&verdict).expect_err("boost beyond its range");
    assert_eq!(violation.context, "credit");
}
