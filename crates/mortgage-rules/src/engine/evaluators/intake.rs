use crate::engine::domain::{rule_types, RuleSet};
use crate::engine::schema::IntakeRequest;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeStatus {
    Valid,
    Incomplete,
    Invalid,
}

/// Completeness report for a submitted application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeResult {
    pub status: IntakeStatus,
    pub missing_sections: Vec<String>,
    pub missing_fields: Vec<String>,
    pub invalid_fields: Vec<String>,
    pub completeness_percent: f64,
}

/// Check a submission against the required-section rules. Each rule
/// lists dotted `section.field` paths; a section with none of its
/// required fields present counts as missing outright.
pub fn evaluate_intake(request: &IntakeRequest, rules: &RuleSet) -> IntakeResult {
    let mut missing_sections = Vec::new();
    let mut missing_fields = Vec::new();
    let mut invalid_fields = Vec::new();
    let mut required_total = 0usize;
    let mut satisfied = 0usize;

    for rule in rules.of_type(rule_types::REQUIRED_SECTION) {
        let Some(paths) = rule.threshold.as_list() else {
            continue;
        };

        for path in paths {
            let Some((section_key, field)) = path.split_once('.') else {
                continue;
            };
            required_total += 1;

            let section = request
                .sections
                .iter()
                .find(|(section, _)| section.key() == section_key);

            match section {
                None => {
                    if !missing_sections.contains(&section_key.to_string()) {
                        missing_sections.push(section_key.to_string());
                    }
                    missing_fields.push(path.clone());
                }
                Some((_, fields)) => {
                    if fields.invalid.contains(field) {
                        invalid_fields.push(path.clone());
                    } else if fields.provided.contains(field) {
                        satisfied += 1;
                    } else {
                        missing_fields.push(path.clone());
                    }
                }
            }
        }
    }

    // Present-but-unparseable values outside the required list still
    // make the submission invalid.
    for (section, fields) in &request.sections {
        for field in &fields.invalid {
            let path = format!("{}.{}", section.key(), field);
            if !invalid_fields.contains(&path) {
                invalid_fields.push(path);
            }
        }
    }

    let status = if !invalid_fields.is_empty() {
        IntakeStatus::Invalid
    } else if !missing_fields.is_empty() || !missing_sections.is_empty() {
        IntakeStatus::Incomplete
    } else {
        IntakeStatus::Valid
    };

    let completeness_percent = if required_total == 0 {
        100.0
    } else {
        (satisfied as f64 / required_total as f64) * 100.0
    };

    IntakeResult {
        status,
        missing_sections,
        missing_fields,
        invalid_fields,
        completeness_percent,
    }
}
