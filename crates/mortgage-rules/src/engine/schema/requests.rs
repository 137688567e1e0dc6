use super::{FieldReader, ValidationError, ViolationCode};
use crate::engine::domain::{
    EmploymentType, EvaluationContext, LoanPurpose, OccupancyType, PropertyType, RuleCategory,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

/// The six intake sections a complete application carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IntakeSection {
    PersonalInfo,
    Address,
    Employment,
    LoanDetails,
    Financial,
    PropertyInfo,
}

impl IntakeSection {
    pub const ALL: [IntakeSection; 6] = [
        IntakeSection::PersonalInfo,
        IntakeSection::Address,
        IntakeSection::Employment,
        IntakeSection::LoanDetails,
        IntakeSection::Financial,
        IntakeSection::PropertyInfo,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            IntakeSection::PersonalInfo => "personal_info",
            IntakeSection::Address => "address",
            IntakeSection::Employment => "employment",
            IntakeSection::LoanDetails => "loan_details",
            IntakeSection::Financial => "financial",
            IntakeSection::PropertyInfo => "property_info",
        }
    }
}

/// Field names observed inside one intake section, classified at the
/// schema boundary so no raw JSON reaches the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionFields {
    pub provided: BTreeSet<String>,
    pub invalid: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakeRequest {
    pub sections: BTreeMap<IntakeSection, SectionFields>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualificationRequest {
    pub credit_score: u16,
    pub monthly_income: f64,
    pub monthly_debts: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub property_value: f64,
    pub loan_purpose: LoanPurpose,
    pub property_type: PropertyType,
    pub occupancy_type: OccupancyType,
    pub asset_reserves: Option<f64>,
}

impl QualificationRequest {
    pub fn down_payment_percent(&self) -> f64 {
        self.down_payment / self.property_value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditIssue {
    Bankruptcy,
    Foreclosure,
    Collection,
    LatePayment,
    ChargeOff,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditRequest {
    pub credit_score: u16,
    pub credit_issues: Vec<CreditIssue>,
    pub credit_history_years: f64,
    pub recent_inquiries: u32,
    pub credit_utilization: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeTrend {
    Increasing,
    Stable,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalIncome {
    pub source: String,
    pub monthly_amount: f64,
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeRequest {
    pub employment_type: EmploymentType,
    pub monthly_income: f64,
    pub years_employed: f64,
    pub income_trend: Option<IncomeTrend>,
    pub additional_income: Vec<AdditionalIncome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentsRequest {
    pub loan_purpose: LoanPurpose,
    pub employment_type: EmploymentType,
    pub property_type: PropertyType,
    pub documents_provided: Vec<String>,
    pub documents_pending: Vec<String>,
}

/// Underwriting inputs are individually optional: a missing fact is an
/// explicit issue routed to manual review by the evaluator, never a
/// validation rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnderwritingRequest {
    pub credit_score: Option<u16>,
    pub dti_ratio: Option<f64>,
    pub ltv_ratio: Option<f64>,
    pub loan_amount: Option<f64>,
    pub property_value: Option<f64>,
    pub asset_reserves: Option<f64>,
    pub down_payment_percent: Option<f64>,
    pub verification_failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingRequest {
    pub credit_score: u16,
    pub loan_amount: f64,
    pub ltv_ratio: f64,
    pub down_payment_percent: f64,
    pub lock_period_days: u32,
    pub loan_program: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRequest {
    pub loan_amount: f64,
    pub property_value: f64,
    pub borrower_income: f64,
    /// Collected for HMDA monitoring only; no verdict reads these.
    pub borrower_demographics: Option<BTreeMap<String, String>>,
}

/// A request that has passed field validation and normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ValidatedRequest {
    Intake(IntakeRequest),
    Qualification(QualificationRequest),
    Credit(CreditRequest),
    Income(IncomeRequest),
    Documents(DocumentsRequest),
    Underwriting(UnderwritingRequest),
    Pricing(PricingRequest),
    Compliance(ComplianceRequest),
}

impl ValidatedRequest {
    pub fn category(&self) -> RuleCategory {
        match self {
            ValidatedRequest::Intake(_) => RuleCategory::Intake,
            ValidatedRequest::Qualification(_) => RuleCategory::Qualification,
            ValidatedRequest::Credit(_) => RuleCategory::Credit,
            ValidatedRequest::Income(_) => RuleCategory::Income,
            ValidatedRequest::Documents(_) => RuleCategory::Documents,
            ValidatedRequest::Underwriting(_) => RuleCategory::Underwriting,
            ValidatedRequest::Pricing(_) => RuleCategory::Pricing,
            ValidatedRequest::Compliance(_) => RuleCategory::Compliance,
        }
    }

    /// Applicability context used to scope the rule fetch. Categories
    /// that sweep every loan program leave `loan_program` unset.
    pub fn context(&self) -> EvaluationContext {
        match self {
            ValidatedRequest::Qualification(request) => EvaluationContext {
                loan_program: None,
                property_type: Some(request.property_type),
                occupancy_type: Some(request.occupancy_type),
            },
            ValidatedRequest::Documents(request) => EvaluationContext {
                loan_program: None,
                property_type: Some(request.property_type),
                occupancy_type: None,
            },
            ValidatedRequest::Pricing(request) => EvaluationContext {
                loan_program: Some(request.loan_program.clone()),
                property_type: None,
                occupancy_type: None,
            },
            _ => EvaluationContext::default(),
        }
    }

    /// Stable hash over the normalized request, the cache key together
    /// with the category. Derived fields are already folded in, so two
    /// differently-phrased but equivalent inputs collide here.
    pub fn input_hash(&self) -> Result<u64, serde_json::Error> {
        let canonical = serde_json::to_string(self)?;
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

/// Decode and validate one raw payload for `category`, collecting the
/// complete violation list before returning.
pub fn validate_input(
    category: RuleCategory,
    payload: &Value,
) -> Result<ValidatedRequest, ValidationError> {
    match category {
        RuleCategory::Intake => validate_intake(payload).map(ValidatedRequest::Intake),
        RuleCategory::Qualification => {
            validate_qualification(payload).map(ValidatedRequest::Qualification)
        }
        RuleCategory::Credit => validate_credit(payload).map(ValidatedRequest::Credit),
        RuleCategory::Income => validate_income(payload).map(ValidatedRequest::Income),
        RuleCategory::Documents => validate_documents(payload).map(ValidatedRequest::Documents),
        RuleCategory::Underwriting => {
            validate_underwriting(payload).map(ValidatedRequest::Underwriting)
        }
        RuleCategory::Pricing => validate_pricing(payload).map(ValidatedRequest::Pricing),
        RuleCategory::Compliance => validate_compliance(payload).map(ValidatedRequest::Compliance),
    }
}

/// Intake fields that must decode as non-negative numbers when present.
const INTAKE_NUMERIC_FIELDS: [(&str, &str); 5] = [
    ("loan_details", "loan_amount"),
    ("loan_details", "loan_term_years"),
    ("financial", "monthly_income"),
    ("financial", "monthly_debts"),
    ("property_info", "property_value"),
];

fn validate_intake(payload: &Value) -> Result<IntakeRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);
    let mut sections = BTreeMap::new();

    for section in IntakeSection::ALL {
        let Some(object) = reader.optional_object(section.key()) else {
            continue;
        };

        let mut fields = SectionFields::default();
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            fields.provided.insert(name.clone());

            let numeric = INTAKE_NUMERIC_FIELDS
                .iter()
                .any(|(owner, field)| *owner == section.key() && *field == name.as_str());
            if numeric {
                match value.as_f64() {
                    Some(number) if number >= 0.0 => {}
                    _ => {
                        fields.invalid.insert(name.clone());
                    }
                }
            }
        }

        let enum_ok = match section {
            IntakeSection::Employment => object
                .get("employment_type")
                .map(|value| {
                    serde_json::from_value::<EmploymentType>(value.clone())
                        .map(|_| "employment_type")
                })
                .transpose(),
            IntakeSection::LoanDetails => object
                .get("loan_purpose")
                .map(|value| serde_json::from_value::<LoanPurpose>(value.clone()).map(|_| "loan_purpose"))
                .transpose(),
            IntakeSection::PropertyInfo => object
                .get("property_type")
                .map(|value| {
                    serde_json::from_value::<PropertyType>(value.clone()).map(|_| "property_type")
                })
                .transpose(),
            _ => Ok(None),
        };
        if enum_ok.is_err() {
            let field = match section {
                IntakeSection::Employment => "employment_type",
                IntakeSection::LoanDetails => "loan_purpose",
                _ => "property_type",
            };
            fields.invalid.insert(field.to_string());
        }

        sections.insert(section, fields);
    }

    reader.finish()?;
    Ok(IntakeRequest { sections })
}

fn validate_qualification(payload: &Value) -> Result<QualificationRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let credit_score = reader.require_credit_score("credit_score");

    // Derive monthly income once when only the annual figure is given;
    // nothing downstream re-derives it.
    let monthly_income = match reader.optional_amount("monthly_income") {
        Some(monthly) => Some(monthly),
        None => match reader.optional_amount("annual_income") {
            Some(annual) => Some(annual / 12.0),
            None => {
                if !reader.has("monthly_income") && !reader.has("annual_income") {
                    reader.violate(
                        "monthly_income",
                        ViolationCode::Missing,
                        "provide monthly_income or annual_income",
                    );
                }
                None
            }
        },
    };

    let monthly_debts = reader.require_amount("monthly_debts");
    let loan_amount = reader.require_amount("loan_amount");
    let property_value = reader.require_positive_amount("property_value");

    // Down payment may arrive as an amount or a fraction of value.
    let down_payment = match reader.optional_amount("down_payment") {
        Some(amount) => Some(amount),
        None => match (reader.optional_ratio("down_payment_percent"), property_value) {
            (Some(percent), Some(value)) => Some(percent * value),
            _ => {
                if !reader.has("down_payment") && !reader.has("down_payment_percent") {
                    reader.violate(
                        "down_payment",
                        ViolationCode::Missing,
                        "provide down_payment or down_payment_percent",
                    );
                }
                None
            }
        },
    };

    let loan_purpose = reader.require_enum::<LoanPurpose>("loan_purpose");
    let property_type = reader.require_enum::<PropertyType>("property_type");
    let occupancy_type = reader.require_enum::<OccupancyType>("occupancy_type");
    let asset_reserves = reader.optional_amount("asset_reserves");

    reader.finish()?;

    Ok(QualificationRequest {
        credit_score: credit_score.unwrap_or_default(),
        monthly_income: monthly_income.unwrap_or_default(),
        monthly_debts: monthly_debts.unwrap_or_default(),
        down_payment: down_payment.unwrap_or_default(),
        loan_amount: loan_amount.unwrap_or_default(),
        property_value: property_value.unwrap_or_default(),
        loan_purpose: loan_purpose.unwrap_or(LoanPurpose::Purchase),
        property_type: property_type.unwrap_or(PropertyType::SingleFamily),
        occupancy_type: occupancy_type.unwrap_or(OccupancyType::Primary),
        asset_reserves,
    })
}

fn validate_credit(payload: &Value) -> Result<CreditRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let credit_score = reader.require_credit_score("credit_score");
    let credit_issues = match reader.optional_array("credit_issues") {
        Some(items) => {
            let mut issues = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match serde_json::from_value::<CreditIssue>(item.clone()) {
                    Ok(issue) => issues.push(issue),
                    Err(_) => reader.violate(
                        &format!("credit_issues[{index}]"),
                        ViolationCode::UnknownValue,
                        "not a recognized credit issue",
                    ),
                }
            }
            issues
        }
        None => Vec::new(),
    };
    let credit_history_years = reader.optional_f64_in("credit_history_length", 0.0..=100.0);
    let recent_inquiries = reader.optional_u32("recent_inquiries");
    let credit_utilization = reader.optional_ratio("credit_utilization");

    reader.finish()?;

    Ok(CreditRequest {
        credit_score: credit_score.unwrap_or_default(),
        credit_issues,
        credit_history_years: credit_history_years.unwrap_or_default(),
        recent_inquiries: recent_inquiries.unwrap_or_default(),
        credit_utilization: credit_utilization.unwrap_or_default(),
    })
}

fn validate_income(payload: &Value) -> Result<IncomeRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let employment_type = reader.require_enum::<EmploymentType>("employment_type");
    let monthly_income = match reader.optional_amount("monthly_income") {
        Some(monthly) => Some(monthly),
        None => match reader.optional_amount("annual_income") {
            Some(annual) => Some(annual / 12.0),
            None => {
                reader.violate(
                    "monthly_income",
                    ViolationCode::Missing,
                    "provide monthly_income or annual_income",
                );
                None
            }
        },
    };
    let years_employed = reader.require_f64_in("years_employed", 0.0..=80.0);
    let income_trend = reader.optional_enum::<IncomeTrend>("income_stability");

    let additional_income = match reader.optional_array("additional_income") {
        Some(items) => {
            let mut sources = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match serde_json::from_value::<AdditionalIncome>(item.clone()) {
                    Ok(source) if source.monthly_amount >= 0.0 => sources.push(source),
                    Ok(_) => reader.violate(
                        &format!("additional_income[{index}].monthly_amount"),
                        ViolationCode::OutOfRange,
                        "must be within [0, inf]",
                    ),
                    Err(_) => reader.violate(
                        &format!("additional_income[{index}]"),
                        ViolationCode::WrongType,
                        "expected {source, monthly_amount, verified}",
                    ),
                }
            }
            sources
        }
        None => Vec::new(),
    };

    reader.finish()?;

    Ok(IncomeRequest {
        employment_type: employment_type.unwrap_or(EmploymentType::W2),
        monthly_income: monthly_income.unwrap_or_default(),
        years_employed: years_employed.unwrap_or_default(),
        income_trend,
        additional_income,
    })
}

fn validate_documents(payload: &Value) -> Result<DocumentsRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let loan_purpose = reader.require_enum::<LoanPurpose>("loan_purpose");
    let employment_type = reader.require_enum::<EmploymentType>("employment_type");
    let property_type = reader.require_enum::<PropertyType>("property_type");
    let documents_provided = reader.require_string_list("documents_provided");
    let documents_pending = reader.optional_string_list("documents_pending");

    reader.finish()?;

    Ok(DocumentsRequest {
        loan_purpose: loan_purpose.unwrap_or(LoanPurpose::Purchase),
        employment_type: employment_type.unwrap_or(EmploymentType::W2),
        property_type: property_type.unwrap_or(PropertyType::SingleFamily),
        documents_provided: documents_provided.unwrap_or_default(),
        documents_pending: documents_pending.unwrap_or_default(),
    })
}

fn validate_underwriting(payload: &Value) -> Result<UnderwritingRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let credit_score = reader.optional_credit_score("credit_score");
    let dti_ratio = reader.optional_ratio("dti_ratio");
    let ltv_ratio = reader.optional_f64_in("ltv_ratio", 0.0..=2.0);
    let loan_amount = reader.optional_amount("loan_amount");
    let property_value = reader.optional_amount("property_value");
    let asset_reserves = reader.optional_amount("asset_reserves");
    let down_payment_percent = reader.optional_ratio("down_payment_percent");
    let verification_failed = reader.optional_bool("verification_failed").unwrap_or(false);

    reader.finish()?;

    Ok(UnderwritingRequest {
        credit_score,
        dti_ratio,
        ltv_ratio,
        loan_amount,
        property_value,
        asset_reserves,
        down_payment_percent,
        verification_failed,
    })
}

const LOCK_PERIODS: [u32; 4] = [15, 30, 45, 60];

fn validate_pricing(payload: &Value) -> Result<PricingRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let credit_score = reader.require_credit_score("credit_score");
    let loan_amount = reader.require_positive_amount("loan_amount");
    let ltv_ratio = reader.require_f64_in("ltv_ratio", 0.0..=1.0);
    let down_payment_percent = reader.require_ratio("down_payment_percent");
    let lock_period_days = match reader.require_u32("lock_period") {
        Some(days) if LOCK_PERIODS.contains(&days) => Some(days),
        Some(_) => {
            reader.violate(
                "lock_period",
                ViolationCode::UnknownValue,
                "lock period must be one of 15, 30, 45, 60 days",
            );
            None
        }
        None => None,
    };
    let loan_program = reader
        .optional_str("loan_program")
        .map(|program| program.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "conventional".to_string());

    reader.finish()?;

    Ok(PricingRequest {
        credit_score: credit_score.unwrap_or_default(),
        loan_amount: loan_amount.unwrap_or_default(),
        ltv_ratio: ltv_ratio.unwrap_or_default(),
        down_payment_percent: down_payment_percent.unwrap_or_default(),
        lock_period_days: lock_period_days.unwrap_or(30),
        loan_program,
    })
}

fn validate_compliance(payload: &Value) -> Result<ComplianceRequest, ValidationError> {
    let mut reader = FieldReader::new(payload);

    let loan_amount = reader.require_amount("loan_amount");
    let property_value = reader.require_positive_amount("property_value");
    let borrower_income = reader.require_amount("borrower_income");

    let borrower_demographics = reader.optional_object("borrower_demographics").map(|object| {
        object
            .iter()
            .filter_map(|(key, value)| {
                value.as_str().map(|text| (key.clone(), text.to_string()))
            })
            .collect::<BTreeMap<String, String>>()
    });

    reader.finish()?;

    Ok(ComplianceRequest {
        loan_amount: loan_amount.unwrap_or_default(),
        property_value: property_value.unwrap_or_default(),
        borrower_income: borrower_income.unwrap_or_default(),
        borrower_demographics,
    })
}
