use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::scoring::classifier::ClassifierError;
use crate::scoring::schema::{FeatureVector, Label, FEATURE_COUNT};

/// Flat node storage. Children always sit at higher indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Share of approved training samples that reached this leaf.
        approved: f64,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct GrowthParams {
    pub max_features: usize,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
}

/// Binary CART tree split on Gini impurity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    weighted_impurity: f64,
}

impl DecisionTree {
    /// Grow a tree over `samples`, which may repeat indices (bootstrap draws).
    pub(crate) fn grow(
        rows: &[FeatureVector],
        labels: &[Label],
        samples: Vec<usize>,
        params: GrowthParams,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { approved: 0.0 }];
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let approved = samples
                .iter()
                .filter(|&&index| labels[index].is_approved())
                .count();
            let leaf = Node::Leaf {
                approved: approved as f64 / samples.len().max(1) as f64,
            };

            let pure = approved == 0 || approved == samples.len();
            let too_small = samples.len() < params.min_samples_split;
            let too_deep = params.max_depth.is_some_and(|max| depth >= max);
            if pure || too_small || too_deep {
                nodes[node] = leaf;
                continue;
            }

            let Some(split) = best_split(rows, labels, &samples, params.max_features, rng) else {
                nodes[node] = leaf;
                continue;
            };

            let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                .iter()
                .partition(|&&index| rows[index].get(split.feature) <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { approved: 0.0 });
            nodes.push(Node::Leaf { approved: 0.0 });
            nodes[node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(Pending {
                node: right,
                samples: right_samples,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }

        Self { nodes }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], index: usize) -> usize {
            match nodes.get(index) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    /// Approved-class share of the leaf `row` lands in.
    pub fn approved_fraction(&self, row: &FeatureVector) -> Result<f64, ClassifierError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf { approved }) => return Ok(*approved),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    if *feature >= FEATURE_COUNT {
                        return Err(ClassifierError::MalformedModel(format!(
                            "node {index} splits on unknown column {feature}"
                        )));
                    }
                    let next = if row.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= index {
                        return Err(ClassifierError::MalformedModel(format!(
                            "node {index} points back to node {next}"
                        )));
                    }
                    index = next;
                }
                None => {
                    return Err(ClassifierError::MalformedModel(format!(
                        "node {index} does not exist"
                    )))
                }
            }
        }
    }
}

fn gini(approved: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = approved as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

/// Evaluate up to `max_features` non-constant columns in random order and return the split
/// with the lowest weighted child impurity.
fn best_split(
    rows: &[FeatureVector],
    labels: &[Label],
    samples: &[usize],
    max_features: usize,
    rng: &mut StdRng,
) -> Option<Candidate> {
    let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
    features.shuffle(rng);

    let total = samples.len();
    let total_approved = samples
        .iter()
        .filter(|&&index| labels[index].is_approved())
        .count();

    let mut best: Option<Candidate> = None;
    let mut evaluated = 0;
    let mut sorted: Vec<(f64, bool)> = Vec::with_capacity(total);

    for feature in features {
        if evaluated >= max_features {
            break;
        }

        sorted.clear();
        sorted.extend(
            samples
                .iter()
                .map(|&index| (rows[index].get(feature), labels[index].is_approved())),
        );
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        if sorted[0].0 == sorted[total - 1].0 {
            continue;
        }
        evaluated += 1;

        let mut left_total = 0;
        let mut left_approved = 0;
        for position in 0..total - 1 {
            let (value, approved) = sorted[position];
            left_total += 1;
            if approved {
                left_approved += 1;
            }

            let next_value = sorted[position + 1].0;
            if value == next_value {
                continue;
            }

            let right_total = total - left_total;
            let right_approved = total_approved - left_approved;
            let weighted_impurity = left_total as f64 * gini(left_approved, left_total)
                + right_total as f64 * gini(right_approved, right_total);

            if best
                .as_ref()
                .map_or(true, |current| weighted_impurity < current.weighted_impurity)
            {
                let mut threshold = value + (next_value - value) / 2.0;
                if threshold >= next_value || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some(Candidate {
                    feature,
                    threshold,
                    weighted_impurity,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn vector(income: f64, credit: f64) -> FeatureVector {
        FeatureVector([income, credit, 0.0, 12.0, 0.0, 2.0, 0.0])
    }

    fn params() -> GrowthParams {
        GrowthParams {
            max_features: FEATURE_COUNT,
            min_samples_split: 2,
            max_depth: None,
        }
    }

    #[test]
    fn separable_data_yields_single_split() {
        let rows = vec![
            vector(1_000.0, 700.0),
            vector(2_000.0, 700.0),
            vector(60_000.0, 700.0),
            vector(70_000.0, 700.0),
        ];
        let labels = vec![
            Label::Rejected,
            Label::Rejected,
            Label::Approved,
            Label::Approved,
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::grow(&rows, &labels, (0..4).collect(), params(), &mut rng);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.depth(), 1);
        match &tree.nodes[0] {
            Node::Split {
                feature, threshold, ..
            } => {
                assert_eq!(*feature, 0);
                assert_eq!(*threshold, 31_000.0);
            }
            other => panic!("expected split, found {other:?}"),
        }
        assert_eq!(tree.approved_fraction(&vector(500.0, 0.0)), Ok(0.0));
        assert_eq!(tree.approved_fraction(&vector(90_000.0, 0.0)), Ok(1.0));
    }

    #[test]
    fn constant_features_produce_a_leaf() {
        let rows = vec![vector(1.0, 1.0), vector(1.0, 1.0), vector(1.0, 1.0)];
        let labels = vec![Label::Approved, Label::Rejected, Label::Approved];
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::grow(&rows, &labels, vec![0, 1, 2], params(), &mut rng);

        assert_eq!(tree.node_count(), 1);
        let fraction = tree.approved_fraction(&vector(5.0, 5.0)).expect("leaf");
        assert!((fraction - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn depth_limit_is_respected() {
        let rows: Vec<FeatureVector> = (0..32).map(|i| vector(i as f64, 0.0)).collect();
        let labels: Vec<Label> = (0..32).map(|i| Label::from(i % 2 == 0)).collect();
        let mut rng = StdRng::seed_from_u64(5);
        let limited = GrowthParams {
            max_depth: Some(2),
            ..params()
        };
        let tree = DecisionTree::grow(&rows, &labels, (0..32).collect(), limited, &mut rng);
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn rejects_backward_links() {
        let tree = DecisionTree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 1.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(matches!(
            tree.approved_fraction(&vector(0.0, 0.0)),
            Err(ClassifierError::MalformedModel(_))
        ));
    }
}
