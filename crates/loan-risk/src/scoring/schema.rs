use serde::{Deserialize, Serialize};

/// Number of numeric columns consumed by the classifier.
pub const FEATURE_COUNT: usize = 7;

/// Column layout shared by the synthetic generator, the request encoder, and the
/// persisted artifact. Any change to the order or count must bump `version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSchema {
    pub version: u32,
    pub columns: [&'static str; FEATURE_COUNT],
}

pub const FEATURE_SCHEMA: FeatureSchema = FeatureSchema {
    version: 1,
    columns: [
        "monthly_income",
        "credit_score",
        "loan_amount",
        "tenure_months",
        "existing_debt",
        "employment_status",
        "loan_purpose",
    ],
};

impl FeatureSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|name| name.to_string()).collect()
    }

    /// True when a persisted column list was produced with this exact layout.
    pub fn matches(&self, version: u32, columns: &[String]) -> bool {
        version == self.version
            && columns.len() == FEATURE_COUNT
            && columns
                .iter()
                .zip(self.columns.iter())
                .all(|(stored, expected)| stored == expected)
    }
}

/// Employment category in the integer space the classifier was trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentCode {
    Unemployed = 0,
    SelfEmployed = 1,
    Salaried = 2,
}

impl EmploymentCode {
    pub const ALL: [EmploymentCode; 3] = [Self::Unemployed, Self::SelfEmployed, Self::Salaried];

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Loan purpose category in the classifier's integer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurposeCode {
    Personal = 0,
    Education = 1,
    Home = 2,
    Business = 3,
}

impl PurposeCode {
    pub const ALL: [PurposeCode; 4] = [
        Self::Personal,
        Self::Education,
        Self::Home,
        Self::Business,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Named view of one applicant in model space, before flattening into a vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub monthly_income: f64,
    pub credit_score: f64,
    pub loan_amount: f64,
    pub tenure_months: f64,
    pub existing_debt: f64,
    pub employment: EmploymentCode,
    pub purpose: PurposeCode,
}

impl FeatureRow {
    /// The single place where named fields become positional columns.
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector([
            self.monthly_income,
            self.credit_score,
            self.loan_amount,
            self.tenure_months,
            self.existing_debt,
            f64::from(self.employment.code()),
            f64::from(self.purpose.code()),
        ])
    }
}

/// Positional input to the classifier, ordered per [`FEATURE_SCHEMA`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, column: usize) -> f64 {
        self.0[column]
    }

    /// Index and schema name of the first non-finite value, if any.
    pub fn first_non_finite(&self) -> Option<(usize, &'static str)> {
        self.0
            .iter()
            .position(|value| !value.is_finite())
            .map(|index| (index, FEATURE_SCHEMA.columns[index]))
    }
}

/// Binary training target and prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Rejected,
    Approved,
}

impl Label {
    pub fn is_approved(self) -> bool {
        matches!(self, Label::Approved)
    }

    pub fn as_int(self) -> u8 {
        match self {
            Label::Rejected => 0,
            Label::Approved => 1,
        }
    }
}

impl From<bool> for Label {
    fn from(approved: bool) -> Self {
        if approved {
            Label::Approved
        } else {
            Label::Rejected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_flattens_in_schema_order() {
        let row = FeatureRow {
            monthly_income: 1.0,
            credit_score: 2.0,
            loan_amount: 3.0,
            tenure_months: 4.0,
            existing_debt: 5.0,
            employment: EmploymentCode::Salaried,
            purpose: PurposeCode::Business,
        };

        assert_eq!(row.to_vector().0, [1.0, 2.0, 3.0, 4.0, 5.0, 2.0, 3.0]);
    }

    #[test]
    fn schema_match_requires_version_and_order() {
        let columns = FEATURE_SCHEMA.column_names();
        assert!(FEATURE_SCHEMA.matches(1, &columns));
        assert!(!FEATURE_SCHEMA.matches(2, &columns));

        let mut swapped = columns.clone();
        swapped.swap(0, 1);
        assert!(!FEATURE_SCHEMA.matches(1, &swapped));
        assert!(!FEATURE_SCHEMA.matches(1, &columns[..6]));
    }
}
