use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier wrapper for rules held in the repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub String);

impl RuleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

/// The eight evaluation categories the engine serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Intake,
    Qualification,
    Credit,
    Income,
    Documents,
    Underwriting,
    Pricing,
    Compliance,
}

impl RuleCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RuleCategory::Intake => "intake",
            RuleCategory::Qualification => "qualification",
            RuleCategory::Credit => "credit",
            RuleCategory::Income => "income",
            RuleCategory::Documents => "documents",
            RuleCategory::Underwriting => "underwriting",
            RuleCategory::Pricing => "pricing",
            RuleCategory::Compliance => "compliance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "intake" => Some(Self::Intake),
            "qualification" => Some(Self::Qualification),
            "credit" => Some(Self::Credit),
            "income" => Some(Self::Income),
            "documents" => Some(Self::Documents),
            "underwriting" => Some(Self::Underwriting),
            "pricing" => Some(Self::Pricing),
            "compliance" => Some(Self::Compliance),
            _ => None,
        }
    }

    pub const ALL: [RuleCategory; 8] = [
        RuleCategory::Intake,
        RuleCategory::Qualification,
        RuleCategory::Credit,
        RuleCategory::Income,
        RuleCategory::Documents,
        RuleCategory::Underwriting,
        RuleCategory::Pricing,
        RuleCategory::Compliance,
    ];
}

/// Threshold payload attached to a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl RuleValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RuleValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RuleValue::List(values) => Some(values),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    SingleFamily,
    Condo,
    Townhouse,
    MultiFamily,
    ManufacturedHome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyType {
    Primary,
    SecondHome,
    Investment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    Purchase,
    Refinance,
    CashOutRefinance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    W2,
    SelfEmployed,
    Contract,
    Retired,
    Military,
}

/// Optional filters restricting when a rule applies. A rule with no
/// conditions set is a universal default for its category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Applicability {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_program: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupancy_type: Option<OccupancyType>,
}

impl Applicability {
    pub fn universal() -> Self {
        Self::default()
    }

    pub fn for_program(program: impl Into<String>) -> Self {
        Self {
            loan_program: Some(program.into()),
            ..Self::default()
        }
    }

    /// Number of set conditions; the tie-break metric between
    /// overlapping rules of the same type.
    pub fn specificity(&self) -> u8 {
        u8::from(self.loan_program.is_some())
            + u8::from(self.property_type.is_some())
            + u8::from(self.occupancy_type.is_some())
    }

    /// A condition is satisfied when the context leaves the dimension
    /// unspecified or matches it exactly.
    pub fn matches(&self, context: &EvaluationContext) -> bool {
        let program_ok = match (&self.loan_program, &context.loan_program) {
            (Some(required), Some(given)) => required == given,
            _ => true,
        };
        let property_ok = match (self.property_type, context.property_type) {
            (Some(required), Some(given)) => required == given,
            _ => true,
        };
        let occupancy_ok = match (self.occupancy_type, context.occupancy_type) {
            (Some(required), Some(given)) => required == given,
            _ => true,
        };
        program_ok && property_ok && occupancy_ok
    }
}

/// The applicability side of an evaluation request: which loan program,
/// property type, and occupancy the caller is asking about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationContext {
    pub loan_program: Option<String>,
    pub property_type: Option<PropertyType>,
    pub occupancy_type: Option<OccupancyType>,
}

/// A single decoded rule. Repository records are loosely typed at rest;
/// they are decoded into this shape at the query boundary and nothing
/// untyped flows past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub category: RuleCategory,
    pub rule_type: String,
    pub applicability: Applicability,
    pub threshold: RuleValue,
    pub description: String,
}

/// Well-known rule type names used by the seeded repository and the
/// evaluators. Free-form strings are allowed; these are the vocabulary
/// the default rule set speaks.
pub mod rule_types {
    pub const MIN_CREDIT_SCORE: &str = "min_credit_score";
    pub const MIN_DOWN_PAYMENT: &str = "min_down_payment";
    pub const MAX_FRONT_END_DTI: &str = "max_front_end_dti";
    pub const MAX_BACK_END_DTI: &str = "max_back_end_dti";
    pub const MAX_LTV: &str = "max_ltv";
    pub const MAX_DTI: &str = "max_dti";
    pub const MIN_RESERVE_MONTHS: &str = "min_reserve_months";
    pub const PENALTY_BANKRUPTCY: &str = "penalty_bankruptcy";
    pub const PENALTY_FORECLOSURE: &str = "penalty_foreclosure";
    pub const PENALTY_COLLECTION: &str = "penalty_collection";
    pub const PENALTY_LATE_PAYMENT: &str = "penalty_late_payment";
    pub const PENALTY_CHARGE_OFF: &str = "penalty_charge_off";
    pub const MAX_UTILIZATION: &str = "max_utilization";
    pub const MIN_EMPLOYMENT_YEARS_W2: &str = "min_employment_years_w2";
    pub const MIN_EMPLOYMENT_YEARS_SELF_EMPLOYED: &str = "min_employment_years_self_employed";
    pub const MIN_EMPLOYMENT_YEARS_CONTRACT: &str = "min_employment_years_contract";
    pub const REQUIRED_DOCUMENT: &str = "required_document";
    pub const REQUIRED_DOCUMENT_SELF_EMPLOYED: &str = "required_document_self_employed";
    pub const REQUIRED_DOCUMENT_PURCHASE: &str = "required_document_purchase";
    pub const REQUIRED_DOCUMENT_REFINANCE: &str = "required_document_refinance";
    pub const REQUIRED_SECTION: &str = "required_section";
    pub const BASE_RATE: &str = "base_rate";
    pub const RATE_ADJUSTMENT_LOCK_15: &str = "rate_adjustment_lock_15";
    pub const RATE_ADJUSTMENT_LOCK_45: &str = "rate_adjustment_lock_45";
    pub const RATE_ADJUSTMENT_LOCK_60: &str = "rate_adjustment_lock_60";
    pub const RATE_ADJUSTMENT_NON_CONFORMING: &str = "rate_adjustment_non_conforming";
    pub const RATE_DISCOUNT_LARGE_DOWN_PAYMENT: &str = "rate_discount_large_down_payment";
    pub const MAX_LOAN_AMOUNT: &str = "max_loan_amount";
    pub const CONFORMING_LOAN_LIMIT: &str = "conforming_loan_limit";
}

/// Raised when two applicable rules of the same type tie on
/// specificity; the repository data is ambiguous and the engine refuses
/// to pick one arbitrarily.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("ambiguous rule match for '{rule_type}': rules {rule_ids:?} tie on specificity")]
pub struct SelectionConflict {
    pub rule_type: String,
    pub rule_ids: Vec<RuleId>,
}

/// Ordered, deduplicated rules fetched for one evaluation. Ephemeral:
/// built per call, discarded (or cached by verdict, not by rule set)
/// when the call completes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn from_rules(mut rules: Vec<Rule>) -> Self {
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        rules.dedup_by(|a, b| a.id == b.id);
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn of_type<'a>(&'a self, rule_type: &str) -> impl Iterator<Item = &'a Rule> + 'a {
        let rule_type = rule_type.to_string();
        self.rules.iter().filter(move |rule| rule.rule_type == rule_type)
    }

    /// Resolve the single governing rule of `rule_type` for `context`:
    /// the most specific applicable rule wins; an equal-specificity tie
    /// is a data-integrity error, never silently broken.
    pub fn resolve(
        &self,
        rule_type: &str,
        context: &EvaluationContext,
    ) -> Result<Option<&Rule>, SelectionConflict> {
        let candidates: Vec<&Rule> = self
            .of_type(rule_type)
            .filter(|rule| rule.applicability.matches(context))
            .collect();

        let Some(best) = candidates
            .iter()
            .map(|rule| rule.applicability.specificity())
            .max()
        else {
            return Ok(None);
        };

        let winners: Vec<&Rule> = candidates
            .into_iter()
            .filter(|rule| rule.applicability.specificity() == best)
            .collect();

        if winners.len() > 1 {
            return Err(SelectionConflict {
                rule_type: rule_type.to_string(),
                rule_ids: winners.iter().map(|rule| rule.id.clone()).collect(),
            });
        }

        Ok(winners.into_iter().next())
    }

    /// Resolved numeric threshold for `rule_type`, if a governing rule
    /// exists and carries a number.
    pub fn resolve_number(
        &self,
        rule_type: &str,
        context: &EvaluationContext,
    ) -> Result<Option<f64>, SelectionConflict> {
        Ok(self
            .resolve(rule_type, context)?
            .and_then(|rule| rule.threshold.as_number()))
    }

    /// Program-specific rules of `rule_type`, keyed by program name.
    /// Used where an evaluator reasons across every program at once
    /// (eligibility sweeps) rather than resolving a single winner.
    pub fn per_program(&self, rule_type: &str) -> BTreeMap<&str, &Rule> {
        self.of_type(rule_type)
            .filter_map(|rule| {
                rule.applicability
                    .loan_program
                    .as_deref()
                    .map(|program| (program, rule))
            })
            .collect()
    }
}
