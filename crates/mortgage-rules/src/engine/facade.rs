//! Tool-protocol surface over the evaluation service.
//!
//! Each rule category is published as a named tool with a JSON input
//! schema; results and failures travel in a uniform envelope so
//! protocol clients never branch on transport details.

use crate::engine::domain::RuleCategory;
use crate::engine::repository::RuleRepository;
use crate::engine::service::{EngineError, RulesEvaluationService};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Published description of one tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub category: RuleCategory,
    pub description: &'static str,
    pub input_schema: Value,
}

/// Failure dispatching a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

const TOOL_TABLE: [(&str, RuleCategory, &str); 8] = [
    (
        "evaluate_application_intake",
        RuleCategory::Intake,
        "Check a loan application submission for completeness and field validity.",
    ),
    (
        "check_qualification_thresholds",
        RuleCategory::Qualification,
        "Score a borrower against program entry thresholds and report eligible programs.",
    ),
    (
        "assess_credit_score_rules",
        RuleCategory::Credit,
        "Tier a credit profile and compute its qualification boost and risk factors.",
    ),
    (
        "evaluate_income_calculation_rules",
        RuleCategory::Income,
        "Compute qualifying income and flag employment stability concerns.",
    ),
    (
        "check_document_verification_rules",
        RuleCategory::Documents,
        "Diff provided documents against the required checklist for the file's profile.",
    ),
    (
        "assess_underwriting_rules",
        RuleCategory::Underwriting,
        "Render an underwriting decision with a risk score and compensating factors.",
    ),
    (
        "evaluate_pricing_rules",
        RuleCategory::Pricing,
        "Price a loan from the program base rate plus level adjustments.",
    ),
    (
        "check_compliance_rules",
        RuleCategory::Compliance,
        "Screen a loan for regulatory limits and affordability review triggers.",
    ),
];

/// Specs for every published tool, in catalogue order.
pub fn tool_specs() -> Vec<ToolSpec> {
    TOOL_TABLE
        .iter()
        .map(|&(name, category, description)| ToolSpec {
            name,
            category,
            description,
            input_schema: input_schema(category),
        })
        .collect()
}

/// The category behind a tool name, if the tool exists.
pub fn tool_category(name: &str) -> Option<RuleCategory> {
    TOOL_TABLE
        .iter()
        .find(|&&(tool, _, _)| tool == name)
        .map(|&(_, category, _)| category)
}

fn input_schema(category: RuleCategory) -> Value {
    match category {
        RuleCategory::Intake => json!({
            "type": "object",
            "properties": {
                "personal_info": {"type": "object"},
                "address": {"type": "object"},
                "employment": {"type": "object"},
                "loan_details": {"type": "object"},
                "financial": {"type": "object"},
                "property_info": {"type": "object"}
            }
        }),
        RuleCategory::Qualification => json!({
            "type": "object",
            "required": [
                "credit_score", "monthly_debts", "loan_amount",
                "property_value", "loan_purpose", "property_type", "occupancy_type"
            ],
            "properties": {
                "credit_score": {"type": "number", "minimum": 300, "maximum": 850},
                "monthly_income": {"type": "number", "minimum": 0},
                "annual_income": {"type": "number", "minimum": 0},
                "monthly_debts": {"type": "number", "minimum": 0},
                "down_payment": {"type": "number", "minimum": 0},
                "down_payment_percent": {"type": "number", "minimum": 0, "maximum": 1},
                "loan_amount": {"type": "number", "minimum": 0},
                "property_value": {"type": "number", "exclusiveMinimum": 0},
                "loan_purpose": {"type": "string", "enum": ["purchase", "refinance", "cash_out_refinance"]},
                "property_type": {"type": "string", "enum": ["single_family", "condo", "townhouse", "multi_family", "manufactured_home"]},
                "occupancy_type": {"type": "string", "enum": ["primary", "second_home", "investment"]},
                "asset_reserves": {"type": "number", "minimum": 0}
            }
        }),
        RuleCategory::Credit => json!({
            "type": "object",
            "required": ["credit_score"],
            "properties": {
                "credit_score": {"type": "number", "minimum": 300, "maximum": 850},
                "credit_issues": {
                    "type": "array",
                    "items": {"type": "string", "enum": ["bankruptcy", "foreclosure", "collection", "late_payment", "charge_off"]}
                },
                "credit_history_length": {"type": "number", "minimum": 0},
                "recent_inquiries": {"type": "integer", "minimum": 0},
                "credit_utilization": {"type": "number", "minimum": 0, "maximum": 1}
            }
        }),
        RuleCategory::Income => json!({
            "type": "object",
            "required": ["employment_type", "years_employed"],
            "properties": {
                "employment_type": {"type": "string", "enum": ["w2", "self_employed", "contract", "retired", "military"]},
                "monthly_income": {"type": "number", "minimum": 0},
                "annual_income": {"type": "number", "minimum": 0},
                "years_employed": {"type": "number", "minimum": 0},
                "income_stability": {"type": "string", "enum": ["increasing", "stable", "declining"]},
                "additional_income": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["source", "monthly_amount", "verified"],
                        "properties": {
                            "source": {"type": "string"},
                            "monthly_amount": {"type": "number", "minimum": 0},
                            "verified": {"type": "boolean"}
                        }
                    }
                }
            }
        }),
        RuleCategory::Documents => json!({
            "type": "object",
            "required": ["loan_purpose", "employment_type", "property_type", "documents_provided"],
            "properties": {
                "loan_purpose": {"type": "string", "enum": ["purchase", "refinance", "cash_out_refinance"]},
                "employment_type": {"type": "string", "enum": ["w2", "self_employed", "contract", "retired", "military"]},
                "property_type": {"type": "string", "enum": ["single_family", "condo", "townhouse", "multi_family", "manufactured_home"]},
                "documents_provided": {"type": "array", "items": {"type": "string"}},
                "documents_pending": {"type": "array", "items": {"type": "string"}}
            }
        }),
        RuleCategory::Underwriting => json!({
            "type": "object",
            "properties": {
                "credit_score": {"type": "number", "minimum": 300, "maximum": 850},
                "dti_ratio": {"type": "number", "minimum": 0, "maximum": 1},
                "ltv_ratio": {"type": "number", "minimum": 0, "maximum": 2},
                "loan_amount": {"type": "number", "minimum": 0},
                "property_value": {"type": "number", "minimum": 0},
                "asset_reserves": {"type": "number", "minimum": 0},
                "down_payment_percent": {"type": "number", "minimum": 0, "maximum": 1},
                "verification_failed": {"type": "boolean"}
            }
        }),
        RuleCategory::Pricing => json!({
            "type": "object",
            "required": ["credit_score", "loan_amount", "ltv_ratio", "down_payment_percent", "lock_period"],
            "properties": {
                "credit_score": {"type": "number", "minimum": 300, "maximum": 850},
                "loan_amount": {"type": "number", "exclusiveMinimum": 0},
                "ltv_ratio": {"type": "number", "minimum": 0, "maximum": 1},
                "down_payment_percent": {"type": "number", "minimum": 0, "maximum": 1},
                "lock_period": {"type": "integer", "enum": [15, 30, 45, 60]},
                "loan_program": {"type": "string"}
            }
        }),
        RuleCategory::Compliance => json!({
            "type": "object",
            "required": ["loan_amount", "property_value", "borrower_income"],
            "properties": {
                "loan_amount": {"type": "number", "minimum": 0},
                "property_value": {"type": "number", "exclusiveMinimum": 0},
                "borrower_income": {"type": "number", "minimum": 0},
                "borrower_demographics": {"type": "object"}
            }
        }),
    }
}

/// Envelope for a failed call, carrying the stable error code.
pub fn error_envelope(error: &EngineError) -> Value {
    let mut body = json!({
        "code": error.code(),
        "message": error.to_string(),
        "retryable": error.retryable(),
    });
    if let Some(details) = error.details() {
        body["details"] = details;
    }
    json!({
        "success": false,
        "timestamp": Utc::now(),
        "error": body,
    })
}

/// Dispatcher routing tool calls to the evaluation service.
pub struct ToolFacade<R> {
    service: Arc<RulesEvaluationService<R>>,
}

impl<R: RuleRepository> ToolFacade<R> {
    pub fn new(service: Arc<RulesEvaluationService<R>>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<RulesEvaluationService<R>> {
        &self.service
    }

    /// Run the named tool. Success returns the full response envelope;
    /// engine failures surface as errors so callers can map transport
    /// status before enveloping them.
    pub async fn dispatch(
        &self,
        name: &str,
        payload: &Value,
        deadline: Option<Duration>,
    ) -> Result<Value, ToolError> {
        let category =
            tool_category(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let evaluation = self.service.evaluate(category, payload, deadline).await?;
        let envelope = json!({
            "success": true,
            "timestamp": evaluation.meta.timestamp,
            "category": evaluation.meta.category,
            "execution_time_ms": evaluation.meta.execution_time_ms,
            "cached": evaluation.meta.cached,
            "result": evaluation.result,
        });
        Ok(envelope)
    }
}
