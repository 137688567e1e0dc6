use crate::engine::domain::{rule_types, EmploymentType, LoanPurpose, RuleSet};
use crate::engine::schema::DocumentsRequest;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentsStatus {
    Complete,
    Incomplete,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentsResult {
    pub status: DocumentsStatus,
    pub required_documents: Vec<String>,
    pub missing_documents: Vec<String>,
    pub pending_documents: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Assemble the required document list for this file's profile and
/// diff it against what was provided. A checklist with nothing missing
/// but items still in flight reports as pending rather than incomplete.
pub fn evaluate_documents(request: &DocumentsRequest, rules: &RuleSet) -> DocumentsResult {
    let mut applicable_types = vec![rule_types::REQUIRED_DOCUMENT];
    if request.employment_type == EmploymentType::SelfEmployed {
        applicable_types.push(rule_types::REQUIRED_DOCUMENT_SELF_EMPLOYED);
    }
    match request.loan_purpose {
        LoanPurpose::Purchase => applicable_types.push(rule_types::REQUIRED_DOCUMENT_PURCHASE),
        LoanPurpose::Refinance | LoanPurpose::CashOutRefinance => {
            applicable_types.push(rule_types::REQUIRED_DOCUMENT_REFINANCE)
        }
    }

    let mut required: BTreeSet<String> = BTreeSet::new();
    for rule_type in applicable_types {
        for rule in rules.of_type(rule_type) {
            if let Some(documents) = rule.threshold.as_list() {
                required.extend(documents.iter().map(|name| name.to_ascii_lowercase()));
            }
        }
    }

    let provided: BTreeSet<&str> = request
        .documents_provided
        .iter()
        .map(String::as_str)
        .collect();
    let pending: BTreeSet<&str> = request
        .documents_pending
        .iter()
        .map(String::as_str)
        .collect();

    let mut missing_documents = Vec::new();
    let mut pending_documents = Vec::new();
    for name in &required {
        if provided.contains(name.as_str()) {
            continue;
        }
        if pending.contains(name.as_str()) {
            pending_documents.push(name.clone());
        } else {
            missing_documents.push(name.clone());
        }
    }

    let status = if missing_documents.is_empty() && pending_documents.is_empty() {
        DocumentsStatus::Complete
    } else if missing_documents.is_empty() {
        DocumentsStatus::Pending
    } else {
        DocumentsStatus::Incomplete
    };

    let mut recommendations = Vec::new();
    if !missing_documents.is_empty() {
        recommendations.push("submit_missing_documents".to_string());
    }
    if !pending_documents.is_empty() {
        recommendations.push("await_pending_documents".to_string());
    }

    DocumentsResult {
        status,
        required_documents: required.into_iter().collect(),
        missing_documents,
        pending_documents,
        recommendations,
    }
}
