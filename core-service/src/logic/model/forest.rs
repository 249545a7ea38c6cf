//! Isolation Forest
//!
//! Unsupervised outlier ensemble over fixed-width feature vectors.
//!
//! ## Scoring
//! - Each tree isolates a sub-sample with random axis-aligned splits
//! - Path length h(x) = depth reached + c(leaf size)
//! - score_samples(x) = -2^(-E[h(x)] / c(sample_size))
//! - offset = contamination percentile of training scores
//! - normality = score_samples - offset (negative = outlier)

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::types::{AnomalyResult, ModelError};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use crate::logic::math::{clamp_or_min, round_to};

const EULER_GAMMA: f64 = 0.577_215_664_9;

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    /// Upper bound on the per-tree sub-sample
    pub max_samples: usize,
    /// Expected outlier fraction
    pub contamination: f64,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_samples: 256,
            contamination: 0.05,
            seed: 42,
        }
    }
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf { size: usize },
    Split { feature: usize, threshold: f64, left: usize, right: usize },
}

/// One isolation tree, nodes stored in an arena with the root at 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn fit(data: &[[f64; FEATURE_COUNT]], indices: &mut [usize], max_depth: usize, rng: &mut StdRng) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(data, indices, 0, max_depth, rng);
        tree
    }

    fn grow(
        &mut self,
        data: &[[f64; FEATURE_COUNT]],
        indices: &mut [usize],
        depth: usize,
        max_depth: usize,
        rng: &mut StdRng,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { size: indices.len() });

        if indices.len() <= 1 || depth >= max_depth {
            return id;
        }

        // Only features with spread inside this node can split it
        let splittable: Vec<(usize, f64, f64)> = (0..FEATURE_COUNT)
            .filter_map(|f| {
                let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    (lo.min(data[i][f]), hi.max(data[i][f]))
                });
                (lo < hi).then_some((f, lo, hi))
            })
            .collect();

        if splittable.is_empty() {
            return id;
        }

        let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
        let threshold = rng.gen_range(lo..hi);

        // Partition in place: values <= threshold go left
        let mut mid = 0;
        for k in 0..indices.len() {
            if data[indices[k]][feature] <= threshold {
                indices.swap(k, mid);
                mid += 1;
            }
        }

        let (left_idx, right_idx) = indices.split_at_mut(mid);
        let left = self.grow(data, left_idx, depth + 1, max_depth, rng);
        let right = self.grow(data, right_idx, depth + 1, max_depth, rng);
        self.nodes[id] = Node::Split { feature, threshold, left, right };
        id
    }

    /// Depth reached by `x` plus the expected remaining depth at the leaf
    pub fn path_length(&self, x: &[f64]) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes.get(id) {
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = x.get(*feature).copied().unwrap_or(0.0);
                    id = if value <= *threshold { *left } else { *right };
                    depth += 1.0;
                }
                Some(Node::Leaf { size }) => return depth + average_path_length(*size),
                None => return depth,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationForest {
    pub params: ForestParams,
    /// Effective per-tree sub-sample size
    pub sample_size: usize,
    /// Decision threshold on score_samples
    pub offset: f64,
    trees: Vec<IsolationTree>,
}

impl IsolationForest {
    /// Fit on at least one vector
    pub fn fit(vectors: &[FeatureVector], params: ForestParams) -> Result<Self, ModelError> {
        if vectors.is_empty() {
            return Err(ModelError::InsufficientData { required: 1, available: 0 });
        }

        let data: Vec<[f64; FEATURE_COUNT]> = vectors.iter().map(|v| v.values).collect();
        let n = data.len();
        let sample_size = params.max_samples.clamp(1, n);
        let max_depth = (sample_size.max(2) as f64).log2().ceil() as usize;

        let mut rng = StdRng::seed_from_u64(params.seed);
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let mut indices = sample(&mut rng, n, sample_size).into_vec();
            trees.push(IsolationTree::fit(&data, &mut indices, max_depth, &mut rng));
        }

        let mut forest = Self {
            params,
            sample_size,
            offset: 0.0,
            trees,
        };

        let training_scores: Vec<f64> = data.iter().map(|x| forest.score_samples(x)).collect();
        forest.offset = percentile(&training_scores, params.contamination * 100.0);

        log::info!(
            "Isolation forest fitted: {} trees, sample_size={}, offset={:.4}",
            forest.trees.len(),
            sample_size,
            forest.offset
        );

        Ok(forest)
    }

    /// Opposite of the anomaly score: in [-1, 0), lower = more abnormal
    pub fn score_samples(&self, x: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return -1.0;
        }
        let mean_depth: f64 =
            self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        let norm = average_path_length(self.sample_size);
        let norm = if norm > 0.0 { norm } else { 1.0 };
        -(2f64.powf(-mean_depth / norm))
    }

    /// score_samples shifted by offset; negative means outlier
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.score_samples(x) - self.offset
    }

    pub fn score(&self, vector: &FeatureVector) -> AnomalyResult {
        let normality = self.decision_function(vector.as_slice());
        AnomalyResult {
            is_anomaly: normality < 0.0,
            normality,
            anomaly_score: anomaly_score_from_normality(normality),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Expected path length of an unsuccessful BST search over n points
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// clamp((0.5 - normality) * 100, 0, 100), 2 decimals
pub fn anomaly_score_from_normality(normality: f64) -> f64 {
    round_to(clamp_or_min((0.5 - normality) * 100.0, 0.0, 100.0), 2)
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
