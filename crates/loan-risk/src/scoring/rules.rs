use super::encoder::{ApplicantRecord, EncodingError};
use super::service::{Decision, ScoringError};

/// Deterministic fallback assessor: a credit floor plus a debt-to-income ceiling on the
/// projected monthly installment. Needs no model.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBasedAssessor {
    pub min_credit_score: f64,
    pub max_debt_to_income: f64,
}

impl Default for RuleBasedAssessor {
    fn default() -> Self {
        Self {
            min_credit_score: 600.0,
            max_debt_to_income: 0.4,
        }
    }
}

impl RuleBasedAssessor {
    /// Principal spread over the tenure, plus one month of simple interest when a rate is given.
    pub fn monthly_installment(&self, record: &ApplicantRecord) -> Result<f64, ScoringError> {
        let tenure = record.tenure_months.unwrap_or(0.0);
        if tenure <= 0.0 {
            return Err(EncodingError::InvalidField {
                field: "tenureMonths",
                reason: "must be positive to compute an installment".to_string(),
            }
            .into());
        }

        let principal = record.principal.unwrap_or(0.0);
        let mut installment = principal / tenure;
        if let Some(rate) = record.interest_rate {
            installment += principal * (rate / 100.0) / 12.0;
        }
        Ok(installment)
    }

    pub fn assess(&self, record: &ApplicantRecord) -> Result<Decision, ScoringError> {
        let credit_score = record.credit_score.unwrap_or(0.0);
        if credit_score < self.min_credit_score {
            return Ok(Decision {
                is_approved: false,
                risk_score: 0.0,
                reason: format!(
                    "Credit score is below minimum requirement of {}",
                    self.min_credit_score
                ),
            });
        }

        let installment = self.monthly_installment(record)?;
        let income = record.monthly_income.unwrap_or(0.0);
        if income <= 0.0 {
            return Err(EncodingError::InvalidField {
                field: "monthlyIncome",
                reason: "must be positive to compute a debt-to-income ratio".to_string(),
            }
            .into());
        }

        let debt_to_income = installment / income;
        if debt_to_income > self.max_debt_to_income {
            return Ok(Decision {
                is_approved: false,
                risk_score: debt_to_income,
                reason: format!(
                    "Debt-to-Income ratio {:.2} exceeds maximum of {}",
                    debt_to_income, self.max_debt_to_income
                ),
            });
        }

        Ok(Decision {
            is_approved: true,
            risk_score: 1.0 - debt_to_income,
            reason: "Approved based on credit score and income analysis".to_string(),
        })
    }

    pub fn assess_body(&self, body: &[u8]) -> Result<Decision, ScoringError> {
        let record = ApplicantRecord::from_slice(body)?;
        self.assess(&record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(credit: f64, income: f64, principal: f64, tenure: f64) -> ApplicantRecord {
        ApplicantRecord {
            credit_score: Some(credit),
            monthly_income: Some(income),
            principal: Some(principal),
            tenure_months: Some(tenure),
            ..ApplicantRecord::default()
        }
    }

    #[test]
    fn low_credit_is_rejected_first() {
        let decision = RuleBasedAssessor::default()
            .assess(&record(550.0, 100_000.0, 1_000.0, 12.0))
            .expect("assessed");
        assert!(!decision.is_approved);
        assert_eq!(decision.risk_score, 0.0);
        assert_eq!(
            decision.reason,
            "Credit score is below minimum requirement of 600"
        );
    }

    #[test]
    fn high_debt_to_income_is_rejected() {
        let decision = RuleBasedAssessor::default()
            .assess(&record(700.0, 1_000.0, 12_000.0, 24.0))
            .expect("assessed");
        assert!(!decision.is_approved);
        assert!((decision.risk_score - 0.5).abs() < 1e-12);
        assert_eq!(
            decision.reason,
            "Debt-to-Income ratio 0.50 exceeds maximum of 0.4"
        );
    }

    #[test]
    fn interest_raises_the_installment() {
        let mut applicant = record(700.0, 10_000.0, 120_000.0, 60.0);
        let assessor = RuleBasedAssessor::default();
        assert_eq!(assessor.monthly_installment(&applicant), Ok(2_000.0));

        applicant.interest_rate = Some(12.0);
        let installment = assessor.monthly_installment(&applicant).expect("installment");
        assert!((installment - 3_200.0).abs() < 1e-9);

        let decision = assessor.assess(&applicant).expect("assessed");
        assert!(decision.is_approved);
        assert!((decision.risk_score - 0.68).abs() < 1e-12);
    }

    #[test]
    fn zero_tenure_names_the_field() {
        let err = RuleBasedAssessor::default()
            .assess(&record(700.0, 10_000.0, 1_000.0, 0.0))
            .expect_err("tenure is required");
        assert_eq!(err.field(), Some("tenureMonths"));
    }
}
