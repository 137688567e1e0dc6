use crate::config::EngineConfig;
use crate::engine::domain::{
    Applicability, EvaluationContext, Rule, RuleCategory, RuleId, RuleSet, RuleValue,
};
use crate::engine::repository::{InMemoryRuleRepository, RepositoryError, RuleRepository};
use crate::engine::service::RulesEvaluationService;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn test_config() -> EngineConfig {
    EngineConfig {
        repository_timeout: Duration::from_millis(200),
        retry_backoff: Duration::from_millis(10),
        cache_ttl: Duration::from_secs(60),
    }
}

pub fn seeded_service() -> RulesEvaluationService<InMemoryRuleRepository> {
    RulesEvaluationService::new(Arc::new(InMemoryRuleRepository::seeded()), test_config())
}

pub fn rule(
    id: &str,
    category: RuleCategory,
    rule_type: &str,
    applicability: Applicability,
    threshold: RuleValue,
) -> Rule {
    Rule {
        id: RuleId::new(id),
        category,
        rule_type: rule_type.to_string(),
        applicability,
        threshold,
        description: String::new(),
    }
}

pub fn rule_set(rules: Vec<Rule>) -> RuleSet {
    RuleSet::from_rules(rules)
}

/// A well-qualified purchase file: 720 score, 25% back-end DTI, 20%
/// down on a 500k home.
pub fn strong_qualification_payload() -> Value {
    json!({
        "credit_score": 720,
        "monthly_income": 8000,
        "monthly_debts": 2000,
        "down_payment": 100_000,
        "loan_amount": 400_000,
        "property_value": 500_000,
        "loan_purpose": "purchase",
        "property_type": "single_family",
        "occupancy_type": "primary",
    })
}

pub fn complete_intake_payload() -> Value {
    json!({
        "personal_info": {
            "first_name": "Ada",
            "last_name": "Moreno",
            "date_of_birth": "1988-04-12",
            "ssn": "123-44-5678",
        },
        "address": {"street": "12 Elm St", "city": "Tulsa", "state": "OK", "zip": "74101"},
        "employment": {
            "employer_name": "Northwind",
            "employment_type": "w2",
            "years_employed": 6,
        },
        "loan_details": {"loan_amount": 400_000, "loan_purpose": "purchase", "loan_term_years": 30},
        "financial": {"monthly_income": 8000, "monthly_debts": 2000},
        "property_info": {
            "property_value": 500_000,
            "property_type": "single_family",
            "occupancy_type": "primary",
        },
    })
}

/// Repository spy counting fetches.
pub struct CountingRepository {
    inner: InMemoryRuleRepository,
    fetches: AtomicUsize,
}

impl CountingRepository {
    pub fn seeded() -> Self {
        Self {
            inner: InMemoryRuleRepository::seeded(),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleRepository for CountingRepository {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(category, context).await
    }
}

/// Fails the first `failures` fetches, then behaves normally.
pub struct FlakyRepository {
    inner: InMemoryRuleRepository,
    failures_left: AtomicUsize,
    fetches: AtomicUsize,
}

impl FlakyRepository {
    pub fn seeded(failures: usize) -> Self {
        Self {
            inner: InMemoryRuleRepository::seeded(),
            failures_left: AtomicUsize::new(failures),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuleRepository for FlakyRepository {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let previous = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| {
                left.checked_sub(1)
            });
        if previous.is_ok() {
            return Err(RepositoryError::Unavailable(
                "simulated outage".to_string(),
            ));
        }
        self.inner.fetch(category, context).await
    }
}

/// Delays every fetch, for deadline tests.
pub struct SlowRepository {
    inner: InMemoryRuleRepository,
    delay: Duration,
}

impl SlowRepository {
    pub fn seeded(delay: Duration) -> Self {
        Self {
            inner: InMemoryRuleRepository::seeded(),
            delay,
        }
    }
}

#[async_trait]
impl RuleRepository for SlowRepository {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(category, context).await
    }
}
