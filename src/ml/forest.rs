//! Bagged decision trees over binary symptom vectors.

use crate::domain::model::TrainingSample;
use crate::utils::error::{MatchError, Result};
use rand::seq::SliceRandom;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Candidate features per split, `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 20,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Node {
    Leaf {
        counts: Vec<u32>,
    },
    Split {
        feature: usize,
        absent: usize,
        present: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn leaf_counts(&self, features: &[u8]) -> &[u32] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { counts } => return counts,
                Node::Split {
                    feature,
                    absent,
                    present,
                } => {
                    index = if features[*feature] == 0 { *absent } else { *present };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    samples: &'a [TrainingSample],
    n_classes: usize,
    n_features: usize,
    max_features: usize,
    params: &'a ForestParams,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn class_counts(&self, indices: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &i in indices {
            counts[self.samples[i].label] += 1;
        }
        counts
    }

    /// Returns the index of the node built for `indices`.
    fn build(&mut self, indices: &[usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let node_index = self.nodes.len();
        self.nodes.push(Node::Leaf {
            counts: counts.clone(),
        });

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if pure || depth >= self.params.max_depth || indices.len() < self.params.min_samples_split
        {
            return node_index;
        }

        let Some(feature) = self.best_split(indices, &counts, rng) else {
            return node_index;
        };

        let (absent, present): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.samples[i].features[feature] == 0);

        let absent_index = self.build(&absent, depth + 1, rng);
        let present_index = self.build(&present, depth + 1, rng);
        self.nodes[node_index] = Node::Split {
            feature,
            absent: absent_index,
            present: present_index,
        };
        node_index
    }

    /// Lowest weighted Gini impurity among `max_features` non-constant candidates.
    fn best_split(&self, indices: &[usize], counts: &[u32], rng: &mut StdRng) -> Option<usize> {
        let total = indices.len() as f64;
        let parent = gini(counts, total);

        let mut order: Vec<usize> = (0..self.n_features).collect();
        order.shuffle(rng);

        let mut best: Option<(usize, f64)> = None;
        let mut evaluated = 0;

        for feature in order {
            if evaluated >= self.max_features {
                break;
            }

            let mut present_counts = vec![0u32; self.n_classes];
            let mut n_present = 0usize;
            for &i in indices {
                let sample = &self.samples[i];
                if sample.features[feature] != 0 {
                    present_counts[sample.label] += 1;
                    n_present += 1;
                }
            }
            if n_present == 0 || n_present == indices.len() {
                continue;
            }
            evaluated += 1;

            let absent_counts: Vec<u32> = counts
                .iter()
                .zip(&present_counts)
                .map(|(all, present)| all - present)
                .collect();
            let n_absent = indices.len() - n_present;

            let impurity = (n_present as f64 * gini(&present_counts, n_present as f64)
                + n_absent as f64 * gini(&absent_counts, n_absent as f64))
                / total;

            if best.map_or(true, |(_, b)| impurity < b) {
                best = Some((feature, impurity));
            }
        }

        best.filter(|&(_, impurity)| impurity < parent - 1e-12)
            .map(|(feature, _)| feature)
    }
}

fn gini(counts: &[u32], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    classes: Vec<String>,
    n_features: usize,
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        samples: &[TrainingSample],
        n_features: usize,
        classes: Vec<String>,
        params: ForestParams,
    ) -> Result<Self> {
        if samples.is_empty() {
            return Err(MatchError::TrainingError {
                message: "cannot fit a forest on an empty corpus".to_string(),
            });
        }
        if params.n_trees == 0 || n_features == 0 {
            return Err(MatchError::TrainingError {
                message: "forest needs at least one tree and one feature".to_string(),
            });
        }
        if let Some(bad) = samples
            .iter()
            .find(|s| s.features.len() != n_features || s.label >= classes.len())
        {
            return Err(MatchError::TrainingError {
                message: format!(
                    "sample with {} features and label {} does not fit {} features / {} classes",
                    bad.features.len(),
                    bad.label,
                    n_features,
                    classes.len()
                ),
            });
        }

        let max_features = params
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().round() as usize)
            .clamp(1, n_features);

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);

        for _ in 0..params.n_trees {
            let bootstrap: Vec<usize> = (0..samples.len())
                .map(|_| rng.gen_range(0..samples.len()))
                .collect();

            let mut builder = TreeBuilder {
                samples,
                n_classes: classes.len(),
                n_features,
                max_features,
                params: &params,
                nodes: Vec::new(),
            };
            builder.build(&bootstrap, 0, &mut rng);
            trees.push(DecisionTree {
                nodes: builder.nodes,
            });
        }

        Ok(Self {
            classes,
            n_features,
            params,
            trees,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Structural check for a forest read back from storage.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| MatchError::ArtifactError {
            artifact: "model".to_string(),
            message,
        };

        if self.trees.is_empty() {
            return Err(invalid("forest has no trees".to_string()));
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(invalid(format!("tree {} has no nodes", t)));
            }
            for (index, node) in tree.nodes.iter().enumerate() {
                match node {
                    Node::Leaf { counts } => {
                        if counts.len() != self.classes.len() {
                            return Err(invalid(format!(
                                "tree {} leaf {} has {} class counts, expected {}",
                                t,
                                index,
                                counts.len(),
                                self.classes.len()
                            )));
                        }
                    }
                    Node::Split {
                        feature,
                        absent,
                        present,
                    } => {
                        if *feature >= self.n_features {
                            return Err(invalid(format!(
                                "tree {} node {} splits on feature {} of {}",
                                t, index, feature, self.n_features
                            )));
                        }
                        // 節點以前序建立，子節點索引必定大於父節點
                        for &child in [absent, present] {
                            if child <= index || child >= tree.nodes.len() {
                                return Err(invalid(format!(
                                    "tree {} node {} points to child {} of {} nodes",
                                    t,
                                    index,
                                    child,
                                    tree.nodes.len()
                                )));
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Mean of the per-tree leaf class distributions, indexed like `classes()`.
    pub fn predict_proba(&self, features: &[u8]) -> Result<Vec<f64>> {
        if features.len() != self.n_features {
            return Err(MatchError::TrainingError {
                message: format!(
                    "expected {} features, got {}",
                    self.n_features,
                    features.len()
                ),
            });
        }

        let mut probabilities = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let counts = tree.leaf_counts(features);
            let total: u32 = counts.iter().sum();
            if total == 0 {
                continue;
            }
            for (p, &c) in probabilities.iter_mut().zip(counts) {
                *p += c as f64 / total as f64;
            }
        }

        let n_trees = self.trees.len() as f64;
        for p in probabilities.iter_mut() {
            *p /= n_trees;
        }
        Ok(probabilities)
    }

    pub fn predict(&self, features: &[u8]) -> Result<usize> {
        let probabilities = self.predict_proba(features)?;
        let mut best = 0;
        for (i, &p) in probabilities.iter().enumerate() {
            if p > probabilities[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Fraction of `samples` whose predicted class equals their label.
    pub fn accuracy(&self, samples: &[TrainingSample]) -> Result<f64> {
        if samples.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for sample in samples {
            if self.predict(&sample.features)? == sample.label {
                correct += 1;
            }
        }
        Ok(correct as f64 / samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(features: &[u8], label: usize) -> TrainingSample {
        TrainingSample {
            features: features.to_vec(),
            label,
        }
    }

    fn separable() -> Vec<TrainingSample> {
        let mut samples = Vec::new();
        for _ in 0..20 {
            samples.push(sample(&[1, 1, 0, 0], 0));
            samples.push(sample(&[0, 0, 1, 1], 1));
            samples.push(sample(&[1, 0, 0, 1], 2));
        }
        samples
    }

    fn classes() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    fn params() -> ForestParams {
        ForestParams {
            n_trees: 15,
            max_features: Some(4),
            ..Default::default()
        }
    }

    #[test]
    fn test_fits_separable_data() {
        let samples = separable();
        let forest = RandomForest::fit(&samples, 4, classes(), params()).unwrap();

        assert_eq!(forest.accuracy(&samples).unwrap(), 1.0);
        assert_eq!(forest.predict(&[0, 0, 1, 1]).unwrap(), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let forest = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();
        let probabilities = forest.predict_proba(&[1, 1, 1, 1]).unwrap();
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_feature_count_is_rejected() {
        let forest = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();
        assert!(forest.predict_proba(&[1, 0]).is_err());
    }

    #[test]
    fn test_same_seed_same_forest() {
        let a = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();
        let b = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn test_invalid_training_input() {
        assert!(RandomForest::fit(&[], 4, classes(), params()).is_err());
        let bad_label = vec![sample(&[1, 0, 0, 0], 9)];
        assert!(RandomForest::fit(&bad_label, 4, classes(), params()).is_err());
    }

    #[test]
    fn test_fitted_forest_passes_validation() {
        let forest = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();
        assert!(forest.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_broken_structure() {
        let forest = RandomForest::fit(&separable(), 4, classes(), params()).unwrap();

        let mut bad_feature = forest.clone();
        bad_feature.trees[0].nodes[0] = Node::Split {
            feature: 999,
            absent: 1,
            present: 2,
        };
        assert!(matches!(
            bad_feature.validate(),
            Err(MatchError::ArtifactError { .. })
        ));

        let mut cycle = forest.clone();
        cycle.trees[0].nodes = vec![Node::Split {
            feature: 0,
            absent: 0,
            present: 0,
        }];
        assert!(cycle.validate().is_err());

        let mut dangling = forest.clone();
        dangling.trees[0].nodes = vec![Node::Split {
            feature: 0,
            absent: 1,
            present: 5,
        }];
        assert!(dangling.validate().is_err());

        let mut short_leaf = forest.clone();
        short_leaf.trees[0].nodes = vec![Node::Leaf { counts: vec![1] }];
        assert!(short_leaf.validate().is_err());

        let mut empty = forest;
        empty.trees.clear();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_depth_limit_produces_single_leaf() {
        let forest = RandomForest::fit(
            &separable(),
            4,
            classes(),
            ForestParams {
                n_trees: 3,
                max_depth: 0,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(forest.trees.iter().all(|t| t.nodes.len() == 1));
    }
}
