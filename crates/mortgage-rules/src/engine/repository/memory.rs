use super::{applicable, RepositoryError, RuleRepository};
use crate::engine::domain::{EvaluationContext, Rule, RuleCategory, RuleId, RuleSet};
use async_trait::async_trait;
use std::sync::Mutex;

/// Flat in-memory rule store. Used by tests and by deployments that
/// load their rules at startup without graph tooling.
#[derive(Debug, Default)]
pub struct InMemoryRuleRepository {
    rules: Mutex<Vec<Rule>>,
}

impl InMemoryRuleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        Self::with_rules(super::seed::default_rules())
    }

    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules: Mutex::new(rules),
        }
    }

    pub fn insert(&self, rule: Rule) -> Result<(), RepositoryError> {
        let mut rules = self.lock()?;
        rules.retain(|existing| existing.id != rule.id);
        rules.push(rule);
        Ok(())
    }

    pub fn remove(&self, id: &RuleId) -> Result<bool, RepositoryError> {
        let mut rules = self.lock()?;
        let before = rules.len();
        rules.retain(|existing| &existing.id != id);
        Ok(rules.len() != before)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Rule>>, RepositoryError> {
        self.rules
            .lock()
            .map_err(|_| RepositoryError::Unavailable("rule store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RuleRepository for InMemoryRuleRepository {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError> {
        let rules = self.lock()?.clone();
        Ok(applicable(rules, category, context))
    }
}
