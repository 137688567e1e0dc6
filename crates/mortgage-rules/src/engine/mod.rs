//! The business-rules evaluation engine.
//!
//! Rules live in a repository behind [`repository::RuleRepository`];
//! the [`service::RulesEvaluationService`] pipeline validates input,
//! fetches the applicable rules, runs the category evaluator, and
//! caches the verdict. [`facade`] publishes the whole thing as named
//! tools for protocol clients.

pub mod cache;
pub mod domain;
pub mod evaluators;
pub mod facade;
pub mod repository;
pub mod schema;
pub mod scoring;
pub mod service;

pub use domain::{
    Applicability, EvaluationContext, Rule, RuleCategory, RuleId, RuleSet, RuleValue,
    SelectionConflict,
};
pub use service::{EngineError, Evaluation, EvaluationMeta, RulesEvaluationService};

#[cfg(test)]
mod tests;
