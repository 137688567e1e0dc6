//! Integration specifications for the rules evaluation pipeline.
//!
//! Scenarios exercise the public service and tool facade end to end
//! over the seeded graph repository, the same stack the HTTP service
//! runs, without reaching into private modules.

use mortgage_rules::config::EngineConfig;
use mortgage_rules::engine::domain::{Applicability, Rule, RuleCategory, RuleId, RuleValue};
use mortgage_rules::engine::facade::{tool_specs, ToolFacade};
use mortgage_rules::engine::repository::GraphRuleRepository;
use mortgage_rules::engine::RulesEvaluationService;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn engine_config() -> EngineConfig {
    EngineConfig {
        repository_timeout: Duration::from_millis(500),
        retry_backoff: Duration::from_millis(10),
        cache_ttl: Duration::from_secs(60),
    }
}

fn seeded_facade() -> ToolFacade<GraphRuleRepository> {
    let repository = Arc::new(GraphRuleRepository::seeded());
    ToolFacade::new(Arc::new(RulesEvaluationService::new(
        repository,
        engine_config(),
    )))
}

#[tokio::test]
async fn a_strong_file_clears_qualification_underwriting_and_pricing() {
    let facade = seeded_facade();

    let qualification = facade
        .dispatch(
            "check_qualification_thresholds",
            &json!({
                "credit_score": 720,
                "monthly_income": 8000,
                "monthly_debts": 2000,
                "down_payment": 100_000,
                "loan_amount": 400_000,
                "property_value": 500_000,
                "loan_purpose": "purchase",
                "property_type": "single_family",
                "occupancy_type": "primary",
            }),
            None,
        )
        .await
        .expect("qualification dispatches");
    assert_eq!(qualification["result"]["status"], json!("HighlyQualified"));

    let underwriting = facade
        .dispatch(
            "assess_underwriting_rules",
            &json!({
                "credit_score": 720,
                "dti_ratio": 0.25,
                "ltv_ratio": 0.80,
                "loan_amount": 400_000,
                "asset_reserves": 10_000,
                "down_payment_percent": 0.20,
            }),
            None,
        )
        .await
        .expect("underwriting dispatches");
    assert_eq!(underwriting["result"]["decision"], json!("APPROVED"));

    let pricing = facade
        .dispatch(
            "evaluate_pricing_rules",
            &json!({
                "credit_score": 720,
                "loan_amount": 400_000,
                "ltv_ratio": 0.80,
                "down_payment_percent": 0.20,
                "lock_period": 30,
                "loan_program": "conventional",
            }),
            None,
        )
        .await
        .expect("pricing dispatches");
    assert_eq!(pricing["result"]["eligible"], json!(true));
    // 6.5 base + 0.25 for the 680-739 credit tier.
    assert_eq!(pricing["result"]["adjusted_rate"], json!(6.75));
}

#[tokio::test]
async fn over_leveraged_file_is_never_approved() {
    let facade = seeded_facade();

    let envelope = facade
        .dispatch(
            "assess_underwriting_rules",
            &json!({
                "credit_score": 700,
                "dti_ratio": 0.50,
                "ltv_ratio": 0.85,
                "loan_amount": 350_000,
                "down_payment_percent": 0.25,
                "asset_reserves": 8_000,
            }),
            None,
        )
        .await
        .expect("underwriting dispatches");

    assert_eq!(envelope["result"]["decision"], json!("MANUAL_REVIEW"));
}

#[tokio::test]
async fn graph_administration_flows_through_to_verdicts() {
    let repository = Arc::new(GraphRuleRepository::seeded());
    let service = Arc::new(RulesEvaluationService::new(
        Arc::clone(&repository),
        engine_config(),
    ));
    let facade = ToolFacade::new(Arc::clone(&service));

    let payload = json!({
        "credit_score": 700,
        "loan_amount": 300_000,
        "ltv_ratio": 0.75,
        "down_payment_percent": 0.25,
        "lock_period": 30,
        "loan_program": "heloc",
    });

    let before = facade
        .dispatch("evaluate_pricing_rules", &payload, None)
        .await
        .expect("pricing dispatches");
    assert_eq!(before["result"]["eligible"], json!(false));

    repository
        .upsert_rule(&Rule {
            id: RuleId::new("price.base.heloc"),
            category: RuleCategory::Pricing,
            rule_type: "base_rate".to_string(),
            applicability: Applicability::for_program("heloc"),
            threshold: RuleValue::Number(7.5),
            description: "pilot HELOC pricing".to_string(),
        })
        .expect("rule stores");
    service.invalidate_category(RuleCategory::Pricing);

    let after = facade
        .dispatch("evaluate_pricing_rules", &payload, None)
        .await
        .expect("pricing dispatches");
    assert_eq!(after["result"]["eligible"], json!(true));
    assert_eq!(after["result"]["base_rate"], json!(7.5));
}

#[tokio::test]
async fn every_published_tool_dispatches_against_the_seeded_rules() {
    let facade = seeded_facade();
    let payloads = [
        ("evaluate_application_intake", json!({})),
        (
            "check_qualification_thresholds",
            json!({
                "credit_score": 680, "monthly_income": 7000, "monthly_debts": 2100,
                "down_payment_percent": 0.10, "loan_amount": 315_000,
                "property_value": 350_000, "loan_purpose": "purchase",
                "property_type": "condo", "occupancy_type": "primary",
            }),
        ),
        ("assess_credit_score_rules", json!({"credit_score": 700})),
        (
            "evaluate_income_calculation_rules",
            json!({"employment_type": "w2", "monthly_income": 7000, "years_employed": 3}),
        ),
        (
            "check_document_verification_rules",
            json!({
                "loan_purpose": "refinance", "employment_type": "w2",
                "property_type": "single_family", "documents_provided": ["photo_id"],
            }),
        ),
        ("assess_underwriting_rules", json!({})),
        (
            "evaluate_pricing_rules",
            json!({
                "credit_score": 700, "loan_amount": 300_000, "ltv_ratio": 0.80,
                "down_payment_percent": 0.20, "lock_period": 45,
            }),
        ),
        (
            "check_compliance_rules",
            json!({"loan_amount": 300_000, "property_value": 400_000, "borrower_income": 7000}),
        ),
    ];
    assert_eq!(payloads.len(), tool_specs().len());

    for (tool, payload) in payloads {
        let envelope = facade
            .dispatch(tool, &payload, None)
            .await
            .unwrap_or_else(|error| panic!("{tool} failed: {error}"));
        assert_eq!(envelope["success"], json!(true), "{tool}");
        assert!(envelope["result"].is_object(), "{tool}");
    }
}
