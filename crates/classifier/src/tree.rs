//! CART decision tree for classification.
//!
//! ## Algorithm
//! 1. Start with every sample index at the root
//! 2. Stop and make a leaf if the node is pure, too small, or at max depth
//! 3. Otherwise visit features in random order, skipping features that are
//!    constant in the node, until `max_features` usable ones were scored
//! 4. For each scored feature, try every midpoint between adjacent distinct
//!    values and keep the split with the lowest weighted Gini impurity
//! 5. Samples with `x <= threshold` go left, the rest go right
//!
//! Nodes are stored in a flat arena rather than as boxed children, so a
//! deep tree serializes without deep nesting.

use crate::config::MaxFeatures;
use pipeline::FeatureMatrix;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

// ============================================================================
// Tree structure
// ============================================================================

/// A node in the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Internal decision node; children are arena indices
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding class proportions of its training samples
    Leaf { proportions: Vec<f64> },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
}

/// A fitted classification tree. The root is node 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
    n_classes: usize,
}

impl DecisionTree {
    /// Grow a tree on the rows of `x` listed in `samples`.
    ///
    /// `samples` may repeat indices (bootstrap draws); a repeated row
    /// counts once per occurrence. `y` holds one class id per row of `x`,
    /// each below `n_classes`. Callers validate shapes.
    pub fn fit(
        x: &FeatureMatrix,
        y: &[usize],
        samples: Vec<usize>,
        n_classes: usize,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_candidates = params.max_features.resolve(x.n_cols());
        let mut features: Vec<usize> = (0..x.n_cols()).collect();

        let mut nodes = vec![TreeNode::Leaf {
            proportions: Vec::new(),
        }];
        // (node slot, samples reaching it, depth)
        let mut pending = vec![(0usize, samples, 0usize)];

        while let Some((slot, samples, depth)) = pending.pop() {
            let counts = class_counts(y, &samples, n_classes);

            let can_split = samples.len() >= params.min_samples_split.max(2)
                && params.max_depth.is_none_or(|max| depth < max)
                && counts.iter().filter(|&&c| c > 0).count() > 1;

            let split = if can_split {
                features.shuffle(rng);
                best_split(x, y, &samples, &counts, &features, n_candidates)
            } else {
                None
            };

            match split {
                Some((feature, threshold)) => {
                    let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                        .into_iter()
                        .partition(|&i| x.get(i, feature) <= threshold);

                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(TreeNode::Leaf { proportions: Vec::new() });
                    nodes.push(TreeNode::Leaf { proportions: Vec::new() });
                    nodes[slot] = TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    };

                    pending.push((right, right_samples, depth + 1));
                    pending.push((left, left_samples, depth + 1));
                }
                None => {
                    let total = samples.len().max(1) as f64;
                    nodes[slot] = TreeNode::Leaf {
                        proportions: counts.iter().map(|&c| c as f64 / total).collect(),
                    };
                }
            }
        }

        Self { nodes, n_classes }
    }

    /// Class proportions of the leaf `row` lands in
    pub fn predict_proba_row(&self, row: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold { *left } else { *right };
                }
                TreeNode::Leaf { proportions } => return proportions,
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path (a single leaf has depth 0)
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match &self.nodes[idx] {
                TreeNode::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                TreeNode::Leaf { .. } => deepest = deepest.max(depth),
            }
        }
        deepest
    }

    /// Arena consistency: children in range, leaves sized to `n_classes`
    pub(crate) fn is_well_formed(&self, n_features: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().all(|node| match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => *feature < n_features && *left < self.nodes.len() && *right < self.nodes.len(),
                TreeNode::Leaf { proportions } => proportions.len() == self.n_classes,
            })
    }
}

// ============================================================================
// Split search
// ============================================================================

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in samples {
        counts[y[i]] += 1;
    }
    counts
}

/// Gini impurity `1 - Σ p_i²` of a count vector
#[cfg(test)]
fn gini_impurity(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// `Σ c_i² / n`. Minimising weighted Gini is the same as maximising the
/// sum of this score over both children.
fn purity_score(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    counts.iter().map(|&c| (c * c) as f64).sum::<f64>() / n as f64
}

/// Best `(feature, threshold)` over up to `n_candidates` non-constant features.
fn best_split(
    x: &FeatureMatrix,
    y: &[usize],
    samples: &[usize],
    counts: &[usize],
    features: &[usize],
    n_candidates: usize,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;
    let mut scored = 0;
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(samples.len());

    for &feature in features {
        if scored == n_candidates {
            break;
        }

        column.clear();
        column.extend(samples.iter().map(|&i| (x.get(i, feature), y[i])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        let (first, last) = (column[0].0, column[column.len() - 1].0);
        if first == last {
            // Constant here; does not count towards the candidate budget
            continue;
        }
        scored += 1;

        if let Some((threshold, score)) = best_threshold(&column, counts) {
            if best.is_none_or(|(_, _, s)| score > s) {
                best = Some((feature, threshold, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Sweep a sorted `(value, class)` column, returning the best midpoint
/// threshold and its purity score.
fn best_threshold(column: &[(f64, usize)], counts: &[usize]) -> Option<(f64, f64)> {
    let n = column.len();
    let mut left = vec![0usize; counts.len()];
    let mut right = counts.to_vec();
    let mut best: Option<(f64, f64)> = None;

    for i in 0..n - 1 {
        let (value, class) = column[i];
        left[class] += 1;
        right[class] -= 1;

        let next = column[i + 1].0;
        if value == next {
            continue;
        }

        let score = purity_score(&left, i + 1) + purity_score(&right, n - i - 1);
        if best.is_none_or(|(_, s)| score > s) {
            let mut threshold = value + (next - value) / 2.0;
            // Rounding can land on `next`, which would send it left
            if threshold >= next {
                threshold = value;
            }
            best = Some((threshold, score));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::All,
        }
    }

    fn xor_like() -> (FeatureMatrix, Vec<usize>) {
        let x = FeatureMatrix::from_rows(
            vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
            ],
            2,
        )
        .unwrap();
        (x, vec![0, 1, 1, 0])
    }

    #[test]
    fn test_gini_impurity() {
        assert_eq!(gini_impurity(&[4, 0]), 0.0);
        assert!((gini_impurity(&[2, 2]) - 0.5).abs() < 1e-12);
        assert_eq!(gini_impurity(&[]), 0.0);
    }

    #[test]
    fn test_fits_training_data_exactly() {
        let (x, y) = xor_like();
        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(&x, &y, (0..4).collect(), 2, &params(), &mut rng);

        for (row, &label) in x.rows().zip(&y) {
            let proba = tree.predict_proba_row(row);
            assert_eq!(proba[label], 1.0);
        }
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.n_leaves(), 4);
        assert!(tree.is_well_formed(2));
    }

    #[test]
    fn test_pure_node_is_a_leaf() {
        let (x, _) = xor_like();
        let y = vec![1, 1, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, (0..4).collect(), 2, &params(), &mut rng);

        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict_proba_row(&[5.0, 5.0]), &[0.0, 1.0]);
    }

    #[test]
    fn test_max_depth_zero_gives_proportions() {
        let (x, y) = xor_like();
        let mut rng = StdRng::seed_from_u64(0);
        let limited = TreeParams {
            max_depth: Some(0),
            ..params()
        };
        let tree = DecisionTree::fit(&x, &y, (0..4).collect(), 2, &limited, &mut rng);
        assert_eq!(tree.predict_proba_row(&[0.0, 0.0]), &[0.5, 0.5]);
    }

    #[test]
    fn test_identical_rows_with_different_labels_stop() {
        let x = FeatureMatrix::from_rows(vec![vec![1.0], vec![1.0], vec![1.0]], 1).unwrap();
        let y = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&x, &y, (0..3).collect(), 2, &params(), &mut rng);

        assert_eq!(tree.n_nodes(), 1);
        let proba = tree.predict_proba_row(&[1.0]);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_samples_weigh_more() {
        let x = FeatureMatrix::from_rows(vec![vec![0.0], vec![1.0]], 1).unwrap();
        let y = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let stump = TreeParams {
            max_depth: Some(0),
            ..params()
        };
        let tree = DecisionTree::fit(&x, &y, vec![0, 0, 0, 1], 2, &stump, &mut rng);
        assert_eq!(tree.predict_proba_row(&[0.0]), &[0.75, 0.25]);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let column = vec![(1.0, 0), (3.0, 1)];
        let (threshold, _) = best_threshold(&column, &[1, 1]).unwrap();
        assert_eq!(threshold, 2.0);
    }
}
