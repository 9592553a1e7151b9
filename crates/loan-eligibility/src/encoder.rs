//! Feature encoding for the loan classifier.
//!
//! The classifier consumes a fixed 14-column vector. Everything in this module is total:
//! malformed or missing applicant data degrades to zero-valued features instead of failing.

use serde::{Deserialize, Serialize};

pub const FEATURE_COUNT: usize = 14;

/// Upper bound of the raw credit score scale.
pub const CREDIT_SCORE_MAX: f64 = 1000.0;

const DEFAULT_CREDIT_FLOOR: f64 = 850.0;

/// Threshold used to binarise a raw credit score into the credit-history flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditPolicy {
    floor: f64,
}

impl CreditPolicy {
    /// Returns `None` unless `floor` lies within `[0, 1000]`.
    pub fn with_floor(floor: f64) -> Option<Self> {
        if floor.is_finite() && (0.0..=CREDIT_SCORE_MAX).contains(&floor) {
            Some(Self { floor })
        } else {
            None
        }
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Values of exactly 0 or 1 are already binary; anything else is a raw score.
    pub fn credit_flag(&self, credit: f64) -> f64 {
        if credit == 0.0 || credit == 1.0 {
            credit
        } else if credit >= self.floor && credit <= CREDIT_SCORE_MAX {
            1.0
        } else {
            0.0
        }
    }
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            floor: DEFAULT_CREDIT_FLOOR,
        }
    }
}

/// Named-field view of one application, ready for encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicantRecord {
    pub gender: String,
    pub married: String,
    pub dependents: String,
    pub education: String,
    pub self_employed: String,
    pub applicant_income: f64,
    pub coapplicant_income: f64,
    pub loan_amount: f64,
    pub loan_amount_term: f64,
    pub credit: f64,
    pub property_area: String,
}

/// A form field that may arrive as a JSON string or number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Boolean(bool),
    Text(String),
}

impl RawField {
    fn as_text(&self) -> String {
        match self {
            RawField::Number(value) => format_number(*value),
            RawField::Boolean(value) => value.to_string(),
            RawField::Text(text) => text.clone(),
        }
    }

    fn as_number(&self) -> f64 {
        match self {
            RawField::Number(value) if value.is_finite() => *value,
            RawField::Number(_) => 0.0,
            RawField::Boolean(true) => 1.0,
            RawField::Boolean(false) => 0.0,
            RawField::Text(text) => lenient_number(text),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Unvalidated application form as posted by the prediction page or read from a CSV export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawApplication {
    #[serde(default, alias = "Gender")]
    pub gender: Option<RawField>,
    #[serde(default, alias = "Married")]
    pub married: Option<RawField>,
    #[serde(default, alias = "Dependents")]
    pub dependents: Option<RawField>,
    #[serde(default, alias = "Education")]
    pub education: Option<RawField>,
    #[serde(default, alias = "employed", alias = "Self_Employed")]
    pub self_employed: Option<RawField>,
    #[serde(default, alias = "ApplicantIncome")]
    pub applicant_income: Option<RawField>,
    #[serde(default, alias = "CoapplicantIncome")]
    pub coapplicant_income: Option<RawField>,
    #[serde(default, alias = "LoanAmount")]
    pub loan_amount: Option<RawField>,
    #[serde(default, alias = "Loan_Amount_Term")]
    pub loan_amount_term: Option<RawField>,
    #[serde(default, alias = "credit_history", alias = "Credit_History")]
    pub credit: Option<RawField>,
    #[serde(default, alias = "area", alias = "Property_Area")]
    pub property_area: Option<RawField>,
}

impl From<&RawApplication> for ApplicantRecord {
    fn from(raw: &RawApplication) -> Self {
        let text = |field: &Option<RawField>, default: &str| {
            field
                .as_ref()
                .map(RawField::as_text)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let number = |field: &Option<RawField>| field.as_ref().map_or(0.0, RawField::as_number);

        Self {
            gender: text(&raw.gender, ""),
            married: text(&raw.married, ""),
            dependents: text(&raw.dependents, "0"),
            education: text(&raw.education, ""),
            self_employed: text(&raw.self_employed, ""),
            applicant_income: number(&raw.applicant_income),
            coapplicant_income: number(&raw.coapplicant_income),
            loan_amount: number(&raw.loan_amount),
            loan_amount_term: number(&raw.loan_amount_term),
            credit: number(&raw.credit),
            property_area: text(&raw.property_area, ""),
        }
    }
}

/// Parses a trimmed real number, mapping failures and non-finite values to `0.0`.
pub fn lenient_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Encoded inputs in the column order the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub credit_history: f64,
    pub applicant_income_log: f64,
    pub loan_amount_log: f64,
    pub loan_amount_term_log: f64,
    pub total_income_log: f64,
    pub male: f64,
    pub married: f64,
    pub dependents_1: f64,
    pub dependents_2: f64,
    pub dependents_3_plus: f64,
    pub not_graduate: f64,
    pub self_employed: f64,
    pub semiurban: f64,
    pub urban: f64,
}

impl FeatureVector {
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.credit_history,
            self.applicant_income_log,
            self.loan_amount_log,
            self.loan_amount_term_log,
            self.total_income_log,
            self.male,
            self.married,
            self.dependents_1,
            self.dependents_2,
            self.dependents_3_plus,
            self.not_graduate,
            self.self_employed,
            self.semiurban,
            self.urban,
        ]
    }
}

fn positive_ln(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.ln()
    } else {
        0.0
    }
}

fn flag(value: &str, expected: &str) -> f64 {
    if value.trim().eq_ignore_ascii_case(expected) {
        1.0
    } else {
        0.0
    }
}

fn dependents_one_hot(value: &str) -> (f64, f64, f64) {
    match value.trim() {
        "1" => (1.0, 0.0, 0.0),
        "2" => (0.0, 1.0, 0.0),
        "3" | "3+" => (0.0, 0.0, 1.0),
        _ => (0.0, 0.0, 0.0),
    }
}

pub fn encode(record: &ApplicantRecord, policy: &CreditPolicy) -> FeatureVector {
    let (dependents_1, dependents_2, dependents_3_plus) = dependents_one_hot(&record.dependents);

    FeatureVector {
        credit_history: policy.credit_flag(record.credit),
        applicant_income_log: positive_ln(record.applicant_income),
        loan_amount_log: positive_ln(record.loan_amount),
        loan_amount_term_log: positive_ln(record.loan_amount_term),
        total_income_log: positive_ln(record.applicant_income + record.coapplicant_income),
        male: flag(&record.gender, "male"),
        married: flag(&record.married, "yes"),
        dependents_1,
        dependents_2,
        dependents_3_plus,
        not_graduate: flag(&record.education, "not graduate"),
        self_employed: flag(&record.self_employed, "yes"),
        semiurban: flag(&record.property_area, "semiurban"),
        urban: flag(&record.property_area, "urban"),
    }
}
