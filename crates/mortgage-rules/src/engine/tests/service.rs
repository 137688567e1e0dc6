use super::common::{
    seeded_service, strong_qualification_payload, test_config, CountingRepository,
    FlakyRepository, SlowRepository,
};
use crate::engine::domain::{rule_types, Applicability, Rule, RuleCategory, RuleId, RuleValue};
use crate::engine::repository::InMemoryRuleRepository;
use crate::engine::service::{EngineError, RulesEvaluationService};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn repeated_calls_hit_the_cache() {
    let repository = Arc::new(CountingRepository::seeded());
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());
    let payload = strong_qualification_payload();

    let first = service
        .evaluate(RuleCategory::Qualification, &payload, None)
        .await
        .expect("first call evaluates");
    let second = service
        .evaluate(RuleCategory::Qualification, &payload, None)
        .await
        .expect("second call evaluates");

    assert!(!first.meta.cached);
    assert!(second.meta.cached);
    assert_eq!(first.result, second.result);
    assert_eq!(repository.fetches(), 1);
}

#[tokio::test]
async fn invalidation_forces_a_fresh_fetch() {
    let repository = Arc::new(CountingRepository::seeded());
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());
    let payload = strong_qualification_payload();

    service
        .evaluate(RuleCategory::Qualification, &payload, None)
        .await
        .expect("first call evaluates");
    service.invalidate_category(RuleCategory::Qualification);
    let refreshed = service
        .evaluate(RuleCategory::Qualification, &payload, None)
        .await
        .expect("call after invalidation evaluates");

    assert!(!refreshed.meta.cached);
    assert_eq!(repository.fetches(), 2);
}

#[tokio::test]
async fn invalidation_is_scoped_to_one_category() {
    let repository = Arc::new(CountingRepository::seeded());
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());
    let credit_payload = json!({"credit_score": 720});

    service
        .evaluate(RuleCategory::Credit, &credit_payload, None)
        .await
        .expect("credit evaluates");
    service.invalidate_category(RuleCategory::Qualification);
    let again = service
        .evaluate(RuleCategory::Credit, &credit_payload, None)
        .await
        .expect("credit evaluates again");

    assert!(again.meta.cached);
}

#[tokio::test]
async fn validation_failures_never_reach_the_repository() {
    let repository = Arc::new(CountingRepository::seeded());
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());

    let error = service
        .evaluate(RuleCategory::Qualification, &json!({"credit_score": 9000}), None)
        .await
        .expect_err("invalid payload is rejected");

    assert_eq!(error.code(), "VALIDATION_ERROR");
    assert!(!error.retryable());
    assert_eq!(repository.fetches(), 0);
}

#[tokio::test]
async fn one_transient_failure_is_retried_through() {
    let repository = Arc::new(FlakyRepository::seeded(1));
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());

    let evaluation = service
        .evaluate(
            RuleCategory::Qualification,
            &strong_qualification_payload(),
            None,
        )
        .await
        .expect("retry recovers the call");

    assert!(!evaluation.meta.cached);
    assert_eq!(repository.fetches(), 2);
}

#[tokio::test]
async fn persistent_outage_surfaces_as_retryable_unavailability() {
    let repository = Arc::new(FlakyRepository::seeded(usize::MAX));
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());

    let error = service
        .evaluate(
            RuleCategory::Qualification,
            &strong_qualification_payload(),
            None,
        )
        .await
        .expect_err("outage fails the call");

    assert_eq!(error.code(), "REPOSITORY_UNAVAILABLE");
    assert!(error.retryable());
    assert_eq!(repository.fetches(), 2);
}

#[tokio::test]
async fn a_tight_deadline_times_out_and_skips_the_cache() {
    let repository = Arc::new(SlowRepository::seeded(Duration::from_millis(80)));
    let service = RulesEvaluationService::new(Arc::clone(&repository), test_config());
    let payload = strong_qualification_payload();

    let error = service
        .evaluate(
            RuleCategory::Qualification,
            &payload,
            Some(Duration::from_millis(10)),
        )
        .await
        .expect_err("deadline expires before the fetch completes");
    assert_eq!(error, EngineError::Timeout);
    assert_eq!(error.code(), "TIMEOUT");

    // Nothing was cached: the next call still pays the fetch.
    let evaluation = service
        .evaluate(RuleCategory::Qualification, &payload, None)
        .await
        .expect("unbounded call evaluates");
    assert!(!evaluation.meta.cached);
}

#[tokio::test]
async fn empty_rule_category_is_rules_not_found() {
    let repository = Arc::new(InMemoryRuleRepository::new());
    let service = RulesEvaluationService::new(repository, test_config());

    let error = service
        .evaluate(
            RuleCategory::Qualification,
            &strong_qualification_payload(),
            None,
        )
        .await
        .expect_err("no rules to evaluate against");

    assert_eq!(error.code(), "RULES_NOT_FOUND");
    assert!(!error.retryable());
}

#[tokio::test]
async fn tied_rules_surface_as_an_ambiguous_match() {
    let service = seeded_service();
    service
        .repository()
        .insert(Rule {
            id: RuleId::new("qual.max_back_end_dti.shadow"),
            category: RuleCategory::Qualification,
            rule_type: rule_types::MAX_BACK_END_DTI.to_string(),
            applicability: Applicability::universal(),
            threshold: RuleValue::Number(0.45),
            description: String::new(),
        })
        .expect("insert succeeds");

    let error = service
        .evaluate(
            RuleCategory::Qualification,
            &strong_qualification_payload(),
            None,
        )
        .await
        .expect_err("two universal caps tie");

    assert_eq!(error.code(), "AMBIGUOUS_RULE_MATCH");
    assert!(!error.retryable());
}

#[tokio::test]
async fn validation_error_details_list_the_violations() {
    let service = seeded_service();
    let error = service
        .evaluate(RuleCategory::Credit, &json!({}), None)
        .await
        .expect_err("empty credit payload is missing its score");

    let details = error.details().expect("validation carries details");
    let violations = details.as_array().expect("details are a list");
    assert!(violations
        .iter()
        .any(|violation| violation["field"] == "credit_score"));
}
