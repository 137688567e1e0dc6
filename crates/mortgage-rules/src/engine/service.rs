use crate::config::EngineConfig;
use crate::engine::cache::EvaluationCache;
use crate::engine::domain::{RuleCategory, RuleSet, SelectionConflict};
use crate::engine::evaluators::{
    evaluate_compliance, evaluate_credit, evaluate_documents, evaluate_income, evaluate_intake,
    evaluate_pricing, evaluate_qualification, evaluate_underwriting, Verdict,
};
use crate::engine::repository::{RepositoryError, RuleRepository};
use crate::engine::schema::{
    check_verdict, validate_input, SchemaViolation, ValidatedRequest, ValidationError,
};
use crate::engine::scoring::ScoringConfig;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Evaluation failure, with a stable wire code and a retryability hint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no rules found for category '{}'", .category.label())]
    RulesNotFound { category: RuleCategory },
    #[error(transparent)]
    AmbiguousRuleMatch(#[from] SelectionConflict),
    #[error("rule repository unavailable: {0}")]
    RepositoryUnavailable(String),
    #[error("evaluation deadline exceeded")]
    Timeout,
    #[error("internal evaluation error: {0}")]
    Internal(String),
}

impl EngineError {
    pub const fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(_) => "VALIDATION_ERROR",
            EngineError::RulesNotFound { .. } => "RULES_NOT_FOUND",
            EngineError::AmbiguousRuleMatch(_) => "AMBIGUOUS_RULE_MATCH",
            EngineError::RepositoryUnavailable(_) => "REPOSITORY_UNAVAILABLE",
            EngineError::Timeout => "TIMEOUT",
            EngineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub const fn retryable(&self) -> bool {
        matches!(
            self,
            EngineError::RepositoryUnavailable(_) | EngineError::Timeout
        )
    }

    /// Structured details for the wire envelope, where the variant
    /// carries more than its message.
    pub fn details(&self) -> Option<Value> {
        match self {
            EngineError::Validation(error) => serde_json::to_value(&error.violations).ok(),
            _ => None,
        }
    }
}

impl From<SchemaViolation> for EngineError {
    fn from(violation: SchemaViolation) -> Self {
        EngineError::Internal(violation.to_string())
    }
}

/// Call metadata stamped on every evaluation, cached or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationMeta {
    pub category: RuleCategory,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    #[serde(flatten)]
    pub meta: EvaluationMeta,
    pub result: Verdict,
}

/// The evaluation pipeline: validate, consult the cache, fetch rules
/// with one retry, evaluate, check the output, store, respond. An
/// optional per-call deadline is honored at every blocking step.
pub struct RulesEvaluationService<R> {
    repository: Arc<R>,
    cache: EvaluationCache,
    scoring: ScoringConfig,
    repository_timeout: Duration,
    retry_backoff: Duration,
}

impl<R: RuleRepository> RulesEvaluationService<R> {
    pub fn new(repository: Arc<R>, config: EngineConfig) -> Self {
        Self::with_scoring(repository, config, ScoringConfig::default())
    }

    pub fn with_scoring(repository: Arc<R>, config: EngineConfig, scoring: ScoringConfig) -> Self {
        Self {
            repository,
            cache: EvaluationCache::new(config.cache_ttl),
            scoring,
            repository_timeout: config.repository_timeout,
            retry_backoff: config.retry_backoff,
        }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Drop cached verdicts for one category after its rules change.
    pub fn invalidate_category(&self, category: RuleCategory) {
        self.cache.invalidate_category(category);
    }

    pub async fn evaluate(
        &self,
        category: RuleCategory,
        payload: &Value,
        deadline: Option<Duration>,
    ) -> Result<Evaluation, EngineError> {
        let started = Instant::now();

        let request = validate_input(category, payload)?;
        check_deadline(deadline, started)?;

        let input_hash = request
            .input_hash()
            .map_err(|error| EngineError::Internal(error.to_string()))?;

        if let Some(verdict) = self.cache.get(category, input_hash) {
            tracing::debug!(category = category.label(), "evaluation served from cache");
            return Ok(self.finish(category, started, verdict, true));
        }

        let rules = self.fetch_rules(&request, deadline, started).await?;
        if rules.is_empty() {
            return Err(EngineError::RulesNotFound { category });
        }

        let verdict = dispatch(&request, &rules, &self.scoring)?;
        check_verdict(&verdict)?;
        check_deadline(deadline, started)?;

        self.cache.put(category, input_hash, verdict.clone());
        Ok(self.finish(category, started, verdict, false))
    }

    async fn fetch_rules(
        &self,
        request: &ValidatedRequest,
        deadline: Option<Duration>,
        started: Instant,
    ) -> Result<RuleSet, EngineError> {
        let category = request.category();
        let context = request.context();

        match self.fetch_once(category, &context, deadline, started).await {
            Ok(rules) => Ok(rules),
            Err(retry_cause @ EngineError::RepositoryUnavailable(_)) => {
                tracing::warn!(
                    category = category.label(),
                    error = %retry_cause,
                    "rule fetch failed, retrying once"
                );
                check_deadline(deadline, started)?;
                tokio::time::sleep(self.retry_backoff).await;
                check_deadline(deadline, started)?;
                self.fetch_once(category, &context, deadline, started).await
            }
            Err(other) => Err(other),
        }
    }

    async fn fetch_once(
        &self,
        category: RuleCategory,
        context: &crate::engine::domain::EvaluationContext,
        deadline: Option<Duration>,
        started: Instant,
    ) -> Result<RuleSet, EngineError> {
        let (budget, deadline_bound) = match remaining(deadline, started) {
            Some(left) if left < self.repository_timeout => (left, true),
            _ => (self.repository_timeout, false),
        };

        match tokio::time::timeout(budget, self.repository.fetch(category, context)).await {
            Ok(Ok(rules)) => Ok(rules),
            Ok(Err(RepositoryError::Unavailable(reason))) => {
                Err(EngineError::RepositoryUnavailable(reason))
            }
            Ok(Err(malformed @ RepositoryError::Malformed { .. })) => {
                Err(EngineError::Internal(malformed.to_string()))
            }
            Err(_elapsed) => {
                // The caller's deadline and the per-query timeout are
                // reported differently: only the former is TIMEOUT.
                if deadline_bound {
                    Err(EngineError::Timeout)
                } else {
                    Err(EngineError::RepositoryUnavailable(
                        "rule query timed out".to_string(),
                    ))
                }
            }
        }
    }

    fn finish(
        &self,
        category: RuleCategory,
        started: Instant,
        verdict: Verdict,
        cached: bool,
    ) -> Evaluation {
        Evaluation {
            meta: EvaluationMeta {
                category,
                timestamp: Utc::now(),
                execution_time_ms: started.elapsed().as_millis() as u64,
                cached,
            },
            result: verdict,
        }
    }
}

fn dispatch(
    request: &ValidatedRequest,
    rules: &RuleSet,
    scoring: &ScoringConfig,
) -> Result<Verdict, EngineError> {
    let verdict = match request {
        ValidatedRequest::Intake(request) => Verdict::Intake(evaluate_intake(request, rules)),
        ValidatedRequest::Qualification(request) => {
            Verdict::Qualification(evaluate_qualification(request, rules, scoring)?)
        }
        ValidatedRequest::Credit(request) => {
            Verdict::Credit(evaluate_credit(request, rules, scoring)?)
        }
        ValidatedRequest::Income(request) => Verdict::Income(evaluate_income(request, rules)?),
        ValidatedRequest::Documents(request) => {
            Verdict::Documents(evaluate_documents(request, rules))
        }
        ValidatedRequest::Underwriting(request) => {
            Verdict::Underwriting(evaluate_underwriting(request, rules, scoring))
        }
        ValidatedRequest::Pricing(request) => {
            Verdict::Pricing(evaluate_pricing(request, rules, scoring)?)
        }
        ValidatedRequest::Compliance(request) => {
            Verdict::Compliance(evaluate_compliance(request, rules)?)
        }
    };
    Ok(verdict)
}

fn remaining(deadline: Option<Duration>, started: Instant) -> Option<Duration> {
    deadline.map(|budget| budget.saturating_sub(started.elapsed()))
}

fn check_deadline(deadline: Option<Duration>, started: Instant) -> Result<(), EngineError> {
    match remaining(deadline, started) {
        Some(left) if left.is_zero() => Err(EngineError::Timeout),
        _ => Ok(()),
    }
}
