use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::{EmploymentCode, FeatureRow, FeatureVector, PurposeCode};

/// Request-shaped applicant attributes. Every field is optional; absent values fall back to
/// the defaults applied by [`encode`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenure_months: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_debt: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_purpose: Option<String>,
    /// Annual percentage; only the rule-based assessor reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
}

/// Failure to coerce a raw request payload into an [`ApplicantRecord`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodingError {
    #[error("malformed JSON body: {0}")]
    InvalidJson(String),
    #[error("request body must be a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ApplicantRecord {
    /// Parse a raw request body, then coerce it with [`ApplicantRecord::from_json`].
    pub fn from_slice(body: &[u8]) -> Result<Self, EncodingError> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|err| EncodingError::InvalidJson(err.to_string()))?;
        Self::from_json(&payload)
    }

    /// Lenient coercion from an arbitrary JSON payload.
    ///
    /// Numbers and numeric strings are accepted for numeric fields, `null` counts as absent,
    /// and categorical fields take the text form of any scalar. Unknown keys are ignored.
    pub fn from_json(payload: &Value) -> Result<Self, EncodingError> {
        let object = payload
            .as_object()
            .ok_or_else(|| EncodingError::NotAnObject(json_kind(payload)))?;

        Ok(Self {
            monthly_income: numeric_field(object, "monthlyIncome")?,
            credit_score: numeric_field(object, "creditScore")?,
            principal: numeric_field(object, "principal")?,
            tenure_months: numeric_field(object, "tenureMonths")?,
            existing_debt: numeric_field(object, "existingDebt")?,
            employment_status: text_field(object, "employmentStatus"),
            loan_purpose: text_field(object, "loanPurpose"),
            interest_rate: numeric_field(object, "interestRate")?,
        })
    }
}

fn numeric_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<f64>, EncodingError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| EncodingError::InvalidField {
                field,
                reason: format!("number {number} is not representable as f64"),
            }),
        Some(Value::String(raw)) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(EncodingError::InvalidField {
                field,
                reason: format!("could not convert string to float: '{raw}'"),
            }),
        },
        Some(other) => Err(EncodingError::InvalidField {
            field,
            reason: format!("expected a number, found {}", json_kind(other)),
        }),
    }
}

fn text_field(object: &Map<String, Value>, field: &str) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Employment label to code. SALARIED is checked before SELF, so a label carrying both
/// resolves to salaried.
pub fn employment_code(label: &str) -> EmploymentCode {
    let label = label.to_uppercase();
    if label.contains("SALARIED") {
        EmploymentCode::Salaried
    } else if label.contains("SELF") {
        EmploymentCode::SelfEmployed
    } else {
        EmploymentCode::Unemployed
    }
}

/// Loan purpose label to code, checked in education, home, business order.
pub fn purpose_code(label: &str) -> PurposeCode {
    let label = label.to_uppercase();
    if label.contains("EDUCATION") {
        PurposeCode::Education
    } else if label.contains("HOME") {
        PurposeCode::Home
    } else if label.contains("BUSINESS") {
        PurposeCode::Business
    } else {
        PurposeCode::Personal
    }
}

/// Map a record into model space. Ranges are not validated; out-of-range values reach the
/// classifier unchanged.
pub fn encode_row(record: &ApplicantRecord) -> FeatureRow {
    FeatureRow {
        monthly_income: record.monthly_income.unwrap_or(0.0),
        credit_score: record.credit_score.unwrap_or(0.0),
        loan_amount: record.principal.unwrap_or(0.0),
        tenure_months: record.tenure_months.unwrap_or(0.0),
        existing_debt: record.existing_debt.unwrap_or(0.0),
        employment: employment_code(record.employment_status.as_deref().unwrap_or("")),
        purpose: purpose_code(record.loan_purpose.as_deref().unwrap_or("")),
    }
}

pub fn encode(record: &ApplicantRecord) -> FeatureVector {
    encode_row(record).to_vector()
}
