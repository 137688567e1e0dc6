//! Rule storage.
//!
//! The engine reads rules through the [`RuleRepository`] trait. The
//! graph-backed store is the primary implementation; the flat in-memory
//! store exists for tests and for running without seeded graph data.

mod graph;
mod memory;
pub mod seed;

pub use graph::{GraphRuleRepository, Relation, RuleGraph};
pub use memory::InMemoryRuleRepository;

use crate::engine::domain::{EvaluationContext, Rule, RuleCategory, RuleSet};
use async_trait::async_trait;

/// Failure fetching rules. Unavailability is transient and worth one
/// retry; a malformed record is a data defect and is not.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("rule repository unavailable: {0}")]
    Unavailable(String),
    #[error("malformed rule record '{id}': {detail}")]
    Malformed { id: String, detail: String },
}

/// Read access to the rule store, scoped by category and applicability.
#[async_trait]
pub trait RuleRepository: Send + Sync + 'static {
    async fn fetch(
        &self,
        category: RuleCategory,
        context: &EvaluationContext,
    ) -> Result<RuleSet, RepositoryError>;
}

/// Category-and-context filter shared by the storage backends.
pub(crate) fn applicable(
    rules: impl IntoIterator<Item = Rule>,
    category: RuleCategory,
    context: &EvaluationContext,
) -> RuleSet {
    let matching = rules
        .into_iter()
        .filter(|rule| rule.category == category && rule.applicability.matches(context))
        .collect();
    RuleSet::from_rules(matching)
}
