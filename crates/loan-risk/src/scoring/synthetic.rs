//! Synthetic applicant generator. The approval formula here is the only definition of
//! ground truth the classifier ever sees.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use super::dataset::TrainingDataset;
use super::schema::{EmploymentCode, FeatureRow, Label, PurposeCode};

pub const APPROVAL_THRESHOLD: f64 = 0.45;
pub const TENURE_CHOICES: [f64; 5] = [12.0, 24.0, 36.0, 48.0, 60.0];
/// Sampling weights for unemployed, self-employed, salaried.
pub const EMPLOYMENT_WEIGHTS: [f64; 3] = [0.1, 0.3, 0.6];

/// Mean and standard deviation of a normally distributed column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub mean: f64,
    pub std_dev: f64,
}

impl NormalParams {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }

    fn distribution(&self, column: &'static str) -> Result<Normal<f64>, SyntheticError> {
        let invalid = || SyntheticError::InvalidDistribution {
            column,
            mean: self.mean,
            std_dev: self.std_dev,
        };
        // rand_distr accepts a negative spread and mirrors the samples.
        if !(self.mean.is_finite() && self.std_dev.is_finite() && self.std_dev >= 0.0) {
            return Err(invalid());
        }
        Normal::new(self.mean, self.std_dev).map_err(|_| invalid())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticConfig {
    pub samples: usize,
    pub seed: u64,
    pub monthly_income: NormalParams,
    pub credit_score: NormalParams,
    pub loan_amount: NormalParams,
    pub existing_debt: NormalParams,
    pub noise_std_dev: f64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            samples: 4000,
            seed: 42,
            monthly_income: NormalParams::new(50_000.0, 15_000.0),
            credit_score: NormalParams::new(650.0, 100.0),
            loan_amount: NormalParams::new(200_000.0, 100_000.0),
            existing_debt: NormalParams::new(15_000.0, 5_000.0),
            noise_std_dev: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyntheticError {
    #[error("sample count must be positive")]
    NoSamples,
    #[error("invalid normal distribution for {column} (mean {mean}, std dev {std_dev})")]
    InvalidDistribution {
        column: &'static str,
        mean: f64,
        std_dev: f64,
    },
}

/// Noise-free approval score: weighted linear terms minus the three indicator penalties.
pub fn approval_score(row: &FeatureRow) -> f64 {
    let mut score = 0.4 * (row.monthly_income / 100_000.0) + 0.3 * (row.credit_score / 850.0)
        - 0.15 * (row.loan_amount / 500_000.0)
        - 0.2 * (row.existing_debt / 50_000.0)
        + 0.1 * f64::from(row.employment.code());

    if row.loan_amount > row.monthly_income * 15.0 {
        score -= 0.3;
    }
    if row.monthly_income < 10_000.0 {
        score -= 0.4;
    }
    if row.credit_score < 600.0 {
        score -= 0.4;
    }

    score
}

pub fn label_for_score(score: f64) -> Label {
    Label::from(score > APPROVAL_THRESHOLD)
}

/// Seeded sampler producing labeled datasets.
pub struct SyntheticGenerator {
    config: SyntheticConfig,
}

impl SyntheticGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    /// Draw the dataset column by column so each column consumes one contiguous run of the
    /// random stream.
    pub fn generate(&self) -> Result<TrainingDataset, SyntheticError> {
        let n = self.config.samples;
        if n == 0 {
            return Err(SyntheticError::NoSamples);
        }

        let income = self.config.monthly_income.distribution("monthly_income")?;
        let credit = self.config.credit_score.distribution("credit_score")?;
        let loan = self.config.loan_amount.distribution("loan_amount")?;
        let debt = self.config.existing_debt.distribution("existing_debt")?;
        let noise = NormalParams::new(0.0, self.config.noise_std_dev).distribution("noise")?;
        let employment = WeightedIndex::new(EMPLOYMENT_WEIGHTS).map_err(|_| {
            SyntheticError::InvalidDistribution {
                column: "employment_status",
                mean: 0.0,
                std_dev: 0.0,
            }
        })?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let incomes: Vec<f64> = (0..n).map(|_| income.sample(&mut rng)).collect();
        let credits: Vec<f64> = (0..n).map(|_| credit.sample(&mut rng)).collect();
        let loans: Vec<f64> = (0..n).map(|_| loan.sample(&mut rng)).collect();
        let tenures: Vec<f64> = (0..n)
            .map(|_| *TENURE_CHOICES.choose(&mut rng).unwrap_or(&TENURE_CHOICES[0]))
            .collect();
        let debts: Vec<f64> = (0..n).map(|_| debt.sample(&mut rng)).collect();
        let employments: Vec<EmploymentCode> = (0..n)
            .map(|_| EmploymentCode::ALL[employment.sample(&mut rng)])
            .collect();
        let purposes: Vec<PurposeCode> = (0..n)
            .map(|_| *PurposeCode::ALL.choose(&mut rng).unwrap_or(&PurposeCode::Personal))
            .collect();
        let noises: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();

        let mut dataset = TrainingDataset::with_capacity(n);
        for i in 0..n {
            let row = FeatureRow {
                monthly_income: incomes[i],
                credit_score: credits[i],
                loan_amount: loans[i],
                tenure_months: tenures[i],
                existing_debt: debts[i],
                employment: employments[i],
                purpose: purposes[i],
            };
            let label = label_for_score(approval_score(&row) + noises[i]);
            dataset.push(row.to_vector(), label);
        }

        tracing::debug!(
            samples = n,
            seed = self.config.seed,
            approved = dataset.approved_count(),
            "generated synthetic applicants"
        );

        Ok(dataset)
    }
}
