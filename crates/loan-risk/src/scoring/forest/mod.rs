//! Bagged ensemble of CART trees standing behind the [`Classifier`] capability.

mod tree;

pub use tree::{DecisionTree, Node};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::classifier::{ensure_finite, ensure_trainable, Classifier, ClassifierError};
use super::schema::{FeatureVector, Label, FEATURE_COUNT};
use tree::GrowthParams;

/// Number of candidate columns examined at each split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

impl MaxFeatures {
    fn resolve(self) -> usize {
        match self {
            MaxFeatures::Sqrt => ((FEATURE_COUNT as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::All => FEATURE_COUNT,
            MaxFeatures::Fixed(count) => count.clamp(1, FEATURE_COUNT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.config.n_trees == 0 {
            return Err(ClassifierError::InvalidConfig(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.config.min_samples_split < 2 {
            return Err(ClassifierError::InvalidConfig(
                "min_samples_split must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl Classifier for RandomForest {
    fn fit(&mut self, rows: &[FeatureVector], labels: &[Label]) -> Result<(), ClassifierError> {
        self.validate()?;
        ensure_trainable(rows, labels)?;

        let params = GrowthParams {
            max_features: self.config.max_features.resolve(),
            min_samples_split: self.config.min_samples_split,
            max_depth: self.config.max_depth,
        };

        let n = rows.len();
        let mut seeds = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);
        for _ in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(seeds.gen());
            let samples: Vec<usize> = if self.config.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(DecisionTree::grow(rows, labels, samples, params, &mut rng));
        }

        tracing::debug!(
            trees = trees.len(),
            rows = n,
            max_features = params.max_features,
            "fitted random forest"
        );

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, row: &FeatureVector) -> Result<Label, ClassifierError> {
        let probability = self.predict_probability(row)?;
        Ok(Label::from(probability > 0.5))
    }

    fn predict_probability(&self, row: &FeatureVector) -> Result<f64, ClassifierError> {
        if self.trees.is_empty() {
            return Err(ClassifierError::NotFitted);
        }
        ensure_finite(row)?;

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.approved_fraction(row)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}
