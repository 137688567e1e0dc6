//! Default lending guideline rules loaded into a fresh repository.

use crate::engine::domain::{
    rule_types, Applicability, Rule, RuleCategory, RuleId, RuleValue,
};

fn rule(
    id: &str,
    category: RuleCategory,
    rule_type: &str,
    applicability: Applicability,
    threshold: RuleValue,
    description: &str,
) -> Rule {
    Rule {
        id: RuleId::new(id),
        category,
        rule_type: rule_type.to_string(),
        applicability,
        threshold,
        description: description.to_string(),
    }
}

fn number(value: f64) -> RuleValue {
    RuleValue::Number(value)
}

fn list(values: &[&str]) -> RuleValue {
    RuleValue::List(values.iter().map(|value| value.to_string()).collect())
}

/// The complete default rule set across all eight categories.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = Vec::new();
    rules.extend(intake_rules());
    rules.extend(qualification_rules());
    rules.extend(credit_rules());
    rules.extend(income_rules());
    rules.extend(document_rules());
    rules.extend(underwriting_rules());
    rules.extend(pricing_rules());
    rules.extend(compliance_rules());
    rules
}

fn intake_rules() -> Vec<Rule> {
    let sections: [(&str, &[&str]); 6] = [
        (
            "personal_info",
            &["first_name", "last_name", "date_of_birth", "ssn"],
        ),
        ("address", &["street", "city", "state", "zip"]),
        (
            "employment",
            &["employer_name", "employment_type", "years_employed"],
        ),
        (
            "loan_details",
            &["loan_amount", "loan_purpose", "loan_term_years"],
        ),
        ("financial", &["monthly_income", "monthly_debts"]),
        (
            "property_info",
            &["property_value", "property_type", "occupancy_type"],
        ),
    ];

    sections
        .iter()
        .map(|(section, fields)| {
            let paths: Vec<String> = fields
                .iter()
                .map(|field| format!("{section}.{field}"))
                .collect();
            rule(
                &format!("intake.section.{section}"),
                RuleCategory::Intake,
                rule_types::REQUIRED_SECTION,
                Applicability::universal(),
                RuleValue::List(paths),
                &format!("required fields in the {section} section"),
            )
        })
        .collect()
}

fn qualification_rules() -> Vec<Rule> {
    let programs: [(&str, f64, f64); 5] = [
        ("conventional", 620.0, 0.03),
        ("fha", 580.0, 0.035),
        ("va", 580.0, 0.0),
        ("usda", 640.0, 0.0),
        ("jumbo", 700.0, 0.10),
    ];

    let mut rules: Vec<Rule> = programs
        .iter()
        .flat_map(|(program, min_credit, min_down)| {
            vec![
                rule(
                    &format!("qual.min_credit.{program}"),
                    RuleCategory::Qualification,
                    rule_types::MIN_CREDIT_SCORE,
                    Applicability::for_program(*program),
                    number(*min_credit),
                    &format!("minimum credit score for {program} loans"),
                ),
                rule(
                    &format!("qual.min_down.{program}"),
                    RuleCategory::Qualification,
                    rule_types::MIN_DOWN_PAYMENT,
                    Applicability::for_program(*program),
                    number(*min_down),
                    &format!("minimum down payment for {program} loans"),
                ),
            ]
        })
        .collect();

    rules.push(rule(
        "qual.max_front_end_dti",
        RuleCategory::Qualification,
        rule_types::MAX_FRONT_END_DTI,
        Applicability::universal(),
        number(0.28),
        "maximum housing-payment share of monthly income",
    ));
    rules.push(rule(
        "qual.max_back_end_dti",
        RuleCategory::Qualification,
        rule_types::MAX_BACK_END_DTI,
        Applicability::universal(),
        number(0.43),
        "maximum total-debt share of monthly income",
    ));
    rules.push(rule(
        "qual.max_ltv",
        RuleCategory::Qualification,
        rule_types::MAX_LTV,
        Applicability::universal(),
        number(0.97),
        "maximum loan-to-value at qualification",
    ));
    rules
}

fn credit_rules() -> Vec<Rule> {
    let penalties: [(&str, &str, f64); 5] = [
        ("bankruptcy", rule_types::PENALTY_BANKRUPTCY, 10.0),
        ("foreclosure", rule_types::PENALTY_FORECLOSURE, 8.0),
        ("collection", rule_types::PENALTY_COLLECTION, 4.0),
        ("late_payment", rule_types::PENALTY_LATE_PAYMENT, 2.0),
        ("charge_off", rule_types::PENALTY_CHARGE_OFF, 5.0),
    ];

    let mut rules: Vec<Rule> = penalties
        .iter()
        .map(|(name, rule_type, points)| {
            rule(
                &format!("credit.penalty.{name}"),
                RuleCategory::Credit,
                rule_type,
                Applicability::universal(),
                number(*points),
                &format!("boost penalty for a {name} record"),
            )
        })
        .collect();

    rules.push(rule(
        "credit.max_utilization",
        RuleCategory::Credit,
        rule_types::MAX_UTILIZATION,
        Applicability::universal(),
        number(0.30),
        "revolving utilization above this level is a risk factor",
    ));
    rules
}

fn income_rules() -> Vec<Rule> {
    vec![
        rule(
            "income.min_years.w2",
            RuleCategory::Income,
            rule_types::MIN_EMPLOYMENT_YEARS_W2,
            Applicability::universal(),
            number(1.0),
            "minimum tenure for wage earners",
        ),
        rule(
            "income.min_years.self_employed",
            RuleCategory::Income,
            rule_types::MIN_EMPLOYMENT_YEARS_SELF_EMPLOYED,
            Applicability::universal(),
            number(2.0),
            "minimum business history for self-employed borrowers",
        ),
        rule(
            "income.min_years.contract",
            RuleCategory::Income,
            rule_types::MIN_EMPLOYMENT_YEARS_CONTRACT,
            Applicability::universal(),
            number(2.0),
            "minimum tenure for contract workers",
        ),
    ]
}

fn document_rules() -> Vec<Rule> {
    vec![
        rule(
            "docs.required",
            RuleCategory::Documents,
            rule_types::REQUIRED_DOCUMENT,
            Applicability::universal(),
            list(&[
                "photo_id",
                "pay_stubs",
                "w2_forms",
                "bank_statements",
                "tax_returns",
            ]),
            "documents required on every file",
        ),
        rule(
            "docs.required.self_employed",
            RuleCategory::Documents,
            rule_types::REQUIRED_DOCUMENT_SELF_EMPLOYED,
            Applicability::universal(),
            list(&["profit_and_loss_statement", "business_tax_returns"]),
            "additional documents for self-employed borrowers",
        ),
        rule(
            "docs.required.purchase",
            RuleCategory::Documents,
            rule_types::REQUIRED_DOCUMENT_PURCHASE,
            Applicability::universal(),
            list(&["purchase_agreement", "homeowners_insurance_quote"]),
            "additional documents for purchase transactions",
        ),
        rule(
            "docs.required.refinance",
            RuleCategory::Documents,
            rule_types::REQUIRED_DOCUMENT_REFINANCE,
            Applicability::universal(),
            list(&[
                "current_mortgage_statement",
                "homeowners_insurance_policy",
            ]),
            "additional documents for refinance transactions",
        ),
    ]
}

fn underwriting_rules() -> Vec<Rule> {
    vec![
        rule(
            "uw.max_dti",
            RuleCategory::Underwriting,
            rule_types::MAX_DTI,
            Applicability::universal(),
            number(0.43),
            "hard debt-to-income ceiling at underwriting",
        ),
        rule(
            "uw.max_ltv",
            RuleCategory::Underwriting,
            rule_types::MAX_LTV,
            Applicability::universal(),
            number(0.95),
            "hard loan-to-value ceiling at underwriting",
        ),
        rule(
            "uw.min_credit",
            RuleCategory::Underwriting,
            rule_types::MIN_CREDIT_SCORE,
            Applicability::universal(),
            number(580.0),
            "absolute credit floor at underwriting",
        ),
        rule(
            "uw.min_reserves",
            RuleCategory::Underwriting,
            rule_types::MIN_RESERVE_MONTHS,
            Applicability::universal(),
            number(2.0),
            "months of reserves expected after closing",
        ),
    ]
}

fn pricing_rules() -> Vec<Rule> {
    let base_rates: [(&str, f64); 5] = [
        ("conventional", 6.5),
        ("fha", 6.25),
        ("va", 6.0),
        ("usda", 6.375),
        ("jumbo", 6.875),
    ];

    let mut rules: Vec<Rule> = base_rates
        .iter()
        .map(|(program, rate)| {
            rule(
                &format!("price.base.{program}"),
                RuleCategory::Pricing,
                rule_types::BASE_RATE,
                Applicability::for_program(*program),
                number(*rate),
                &format!("base note rate for {program} loans"),
            )
        })
        .collect();

    rules.push(rule(
        "price.lock15",
        RuleCategory::Pricing,
        rule_types::RATE_ADJUSTMENT_LOCK_15,
        Applicability::universal(),
        number(-0.125),
        "discount for a 15-day rate lock",
    ));
    rules.push(rule(
        "price.lock45",
        RuleCategory::Pricing,
        rule_types::RATE_ADJUSTMENT_LOCK_45,
        Applicability::universal(),
        number(0.125),
        "premium for a 45-day rate lock",
    ));
    rules.push(rule(
        "price.lock60",
        RuleCategory::Pricing,
        rule_types::RATE_ADJUSTMENT_LOCK_60,
        Applicability::universal(),
        number(0.25),
        "premium for a 60-day rate lock",
    ));
    rules.push(rule(
        "price.conforming_limit",
        RuleCategory::Pricing,
        rule_types::CONFORMING_LOAN_LIMIT,
        Applicability::universal(),
        number(766_550.0),
        "conforming loan limit",
    ));
    rules.push(rule(
        "price.non_conforming",
        RuleCategory::Pricing,
        rule_types::RATE_ADJUSTMENT_NON_CONFORMING,
        Applicability::universal(),
        number(0.25),
        "premium for loans above the conforming limit",
    ));
    rules.push(rule(
        "price.large_down_discount",
        RuleCategory::Pricing,
        rule_types::RATE_DISCOUNT_LARGE_DOWN_PAYMENT,
        Applicability::universal(),
        number(-0.125),
        "discount for a large down payment",
    ));
    rules.push(rule(
        "price.max_loan",
        RuleCategory::Pricing,
        rule_types::MAX_LOAN_AMOUNT,
        Applicability::universal(),
        number(3_000_000.0),
        "largest loan the institution will price",
    ));
    rules
}

fn compliance_rules() -> Vec<Rule> {
    vec![
        rule(
            "comp.max_loan",
            RuleCategory::Compliance,
            rule_types::MAX_LOAN_AMOUNT,
            Applicability::universal(),
            number(3_000_000.0),
            "largest loan the institution will originate",
        ),
        rule(
            "comp.conforming_limit",
            RuleCategory::Compliance,
            rule_types::CONFORMING_LOAN_LIMIT,
            Applicability::universal(),
            number(766_550.0),
            "conforming loan limit for disclosure purposes",
        ),
    ]
}
