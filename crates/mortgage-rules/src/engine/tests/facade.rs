use super::common::{
    complete_intake_payload, seeded_service, strong_qualification_payload, test_config,
    SlowRepository,
};
use crate::engine::facade::{error_envelope, tool_category, tool_specs, ToolError, ToolFacade};
use crate::engine::service::{EngineError, RulesEvaluationService};
use crate::engine::RuleCategory;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn catalogue_publishes_all_eight_tools() {
    let specs = tool_specs();
    assert_eq!(specs.len(), 8);

    let names: HashSet<&str> = specs.iter().map(|spec| spec.name).collect();
    assert_eq!(names.len(), 8);
    assert!(names.contains("check_qualification_thresholds"));
    assert!(names.contains("assess_underwriting_rules"));

    for spec in &specs {
        assert!(spec.input_schema.is_object());
        assert!(!spec.description.is_empty());
    }
}

#[test]
fn tool_names_map_to_their_categories() {
    assert_eq!(
        tool_category("evaluate_application_intake"),
        Some(RuleCategory::Intake)
    );
    assert_eq!(
        tool_category("check_compliance_rules"),
        Some(RuleCategory::Compliance)
    );
    assert_eq!(tool_category("make_coffee"), None);
}

#[tokio::test]
async fn successful_dispatch_returns_the_full_envelope() {
    let facade = ToolFacade::new(Arc::new(seeded_service()));

    let envelope = facade
        .dispatch(
            "check_qualification_thresholds",
            &strong_qualification_payload(),
            None,
        )
        .await
        .expect("dispatch succeeds");

    assert_eq!(envelope["success"], json!(true));
    assert_eq!(envelope["category"], json!("qualification"));
    assert!(envelope["timestamp"].is_string());
    assert!(envelope["execution_time_ms"].is_number());
    assert_eq!(envelope["result"]["status"], json!("HighlyQualified"));
}

#[tokio::test]
async fn status_tokens_serialize_per_the_wire_contract() {
    let facade = ToolFacade::new(Arc::new(seeded_service()));

    let intake = facade
        .dispatch("evaluate_application_intake", &complete_intake_payload(), None)
        .await
        .expect("intake evaluates");
    assert_eq!(intake["result"]["status"], json!("VALID"));

    let credit = facade
        .dispatch(
            "assess_credit_score_rules",
            &json!({
                "credit_score": 760,
                "credit_history_length": 12,
                "recent_inquiries": 1,
                "credit_utilization": 0.10,
            }),
            None,
        )
        .await
        .expect("credit evaluates");
    assert_eq!(credit["result"]["tier"], json!("excellent"));

    let income = facade
        .dispatch(
            "evaluate_income_calculation_rules",
            &json!({
                "employment_type": "w2",
                "monthly_income": 7000,
                "years_employed": 0.5,
                "income_stability": "stable",
            }),
            None,
        )
        .await
        .expect("income evaluates");
    assert_eq!(income["result"]["stability"], json!("needs_review"));

    let documents = facade
        .dispatch(
            "check_document_verification_rules",
            &json!({
                "loan_purpose": "refinance",
                "employment_type": "w2",
                "property_type": "single_family",
                "documents_provided": [],
                "documents_pending": [
                    "photo_id", "pay_stubs", "w2_forms", "bank_statements", "tax_returns",
                    "current_mortgage_statement", "homeowners_insurance_policy",
                ],
            }),
            None,
        )
        .await
        .expect("documents evaluate");
    assert_eq!(documents["result"]["status"], json!("PENDING"));

    let underwriting = facade
        .dispatch(
            "assess_underwriting_rules",
            &json!({
                "credit_score": 700,
                "dti_ratio": 0.40,
                "ltv_ratio": 0.85,
                "loan_amount": 350_000,
                "asset_reserves": 6_000,
                "down_payment_percent": 0.10,
            }),
            None,
        )
        .await
        .expect("underwriting evaluates");
    assert_eq!(underwriting["result"]["decision"], json!("CONDITIONAL"));

    let compliance = facade
        .dispatch(
            "check_compliance_rules",
            &json!({
                "loan_amount": 700_000,
                "property_value": 900_000,
                "borrower_income": 8000,
            }),
            None,
        )
        .await
        .expect("compliance evaluates");
    assert_eq!(compliance["result"]["status"], json!("REQUIRES_REVIEW"));
}

#[tokio::test]
async fn unknown_tools_are_rejected_by_name() {
    let facade = ToolFacade::new(Arc::new(seeded_service()));
    let error = facade
        .dispatch("make_coffee", &json!({}), None)
        .await
        .expect_err("no such tool");
    assert!(matches!(error, ToolError::UnknownTool(name) if name == "make_coffee"));
}

#[tokio::test]
async fn engine_failures_envelope_with_stable_codes() {
    let facade = ToolFacade::new(Arc::new(seeded_service()));
    let error = facade
        .dispatch("assess_credit_score_rules", &json!({}), None)
        .await
        .expect_err("missing credit score");

    let ToolError::Engine(engine_error) = error else {
        panic!("expected an engine error");
    };
    let envelope = error_envelope(&engine_error);
    assert_eq!(envelope["success"], json!(false));
    assert_eq!(envelope["error"]["code"], json!("VALIDATION_ERROR"));
    assert_eq!(envelope["error"]["retryable"], json!(false));
    assert!(envelope["error"]["details"].is_array());
}

#[tokio::test]
async fn deadline_overruns_envelope_as_retryable_timeouts() {
    let repository = Arc::new(SlowRepository::seeded(Duration::from_millis(80)));
    let service = Arc::new(RulesEvaluationService::new(repository, test_config()));
    let facade = ToolFacade::new(service);

    let error = facade
        .dispatch(
            "check_qualification_thresholds",
            &strong_qualification_payload(),
            Some(Duration::from_millis(10)),
        )
        .await
        .expect_err("deadline expires");

    let ToolError::Engine(engine_error) = error else {
        panic!("expected an engine error");
    };
    assert_eq!(engine_error, EngineError::Timeout);

    let envelope = error_envelope(&engine_error);
    assert_eq!(envelope["error"]["code"], json!("TIMEOUT"));
    assert_eq!(envelope["error"]["retryable"], json!(true));
}
