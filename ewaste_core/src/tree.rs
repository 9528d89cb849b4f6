//! CART regression tree (squared-error criterion).
//!
//! Array-based representation: node 0 is the root, children are indices
//! into the same vector, and `feature < 0` marks a leaf. Samples with
//! `x[feature] <= threshold` go left.

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index to split on (`-1` for leaves).
    pub feature: i32,
    pub threshold: f64,
    /// Index of left child (`-1` for leaves).
    pub left: i32,
    /// Index of right child (`-1` for leaves).
    pub right: i32,
    /// Mean target of the training samples reaching this node.
    pub value: f64,
    /// Training samples reaching this node (bootstrap duplicates included).
    pub samples: u32,
}

impl TreeNode {
    fn leaf(value: f64, samples: usize) -> Self {
        Self {
            feature: -1,
            threshold: 0.0,
            left: -1,
            right: -1,
            value,
            samples: u32::try_from(samples).unwrap_or(u32::MAX),
        }
    }

    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.feature < 0
    }
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Number of candidate features per split; `>= n_features` means all.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
}

struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` selected by `samples` (repeats allowed).
    ///
    /// `rng` drives feature subsampling only; with `max_features` covering
    /// every column the result is fully determined by the inputs.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Result<Self, BuildError> {
        if x.len() != y.len() {
            return Err(BuildError::LengthMismatch {
                features: x.len(),
                targets: y.len(),
            });
        }
        if samples.is_empty() || x.is_empty() {
            return Err(BuildError::EmptyTrainingSet);
        }
        let n_features = x[0].len();
        if n_features == 0 {
            return Err(BuildError::InvalidConfig("rows have no features"));
        }

        let mut nodes = vec![TreeNode::leaf(mean_of(y, &samples), samples.len())];
        let mut stack = vec![(0usize, samples, 0usize)];
        let mut features: Vec<usize> = (0..n_features).collect();

        while let Some((node_idx, idx, depth)) = stack.pop() {
            let depth_ok = params.max_depth.is_none_or(|d| depth < d);
            if !depth_ok || idx.len() < params.min_samples_split.max(2) {
                continue;
            }

            let k = params.max_features.clamp(1, n_features);
            if k < n_features {
                // partial Fisher-Yates: first k entries become the candidates
                for i in 0..k {
                    let j = rng.random_range(i..n_features);
                    features.swap(i, j);
                }
            }

            let Some(split) = best_split(x, y, &idx, &features[..k], params.min_samples_leaf)
            else {
                continue;
            };

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                .into_iter()
                .partition(|&i| x[i][split.feature] <= split.threshold);
            // a one-sided partition would re-queue the parent's samples forever
            if left_idx.is_empty() || right_idx.is_empty() {
                continue;
            }

            let left_node = nodes.len();
            let (Ok(feature), Ok(left), Ok(right)) = (
                i32::try_from(split.feature),
                i32::try_from(left_node),
                i32::try_from(left_node + 1),
            ) else {
                return Err(BuildError::InvalidConfig("tree exceeds i32 node indices"));
            };
            nodes.push(TreeNode::leaf(mean_of(y, &left_idx), left_idx.len()));
            nodes.push(TreeNode::leaf(mean_of(y, &right_idx), right_idx.len()));

            let n = &mut nodes[node_idx];
            n.feature = feature;
            n.threshold = split.threshold;
            n.left = left;
            n.right = right;

            stack.push((left_node, left_idx, depth + 1));
            stack.push((left_node + 1, right_idx, depth + 1));
        }

        Ok(Self { nodes, n_features })
    }

    /// Predict a single sample. Missing trailing features read as 0.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        loop {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                return node.value;
            }
            let v = features.get(node.feature as usize).copied().unwrap_or(0.0);
            idx = if v <= node.threshold {
                node.left as usize
            } else {
                node.right as usize
            };
        }
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Tree depth (longest root-to-leaf path).
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            let node = &self.nodes[idx];
            if node.is_leaf() {
                max_depth = max_depth.max(d);
            } else {
                stack.push((node.left as usize, d + 1));
                stack.push((node.right as usize, d + 1));
            }
        }
        max_depth
    }

    /// Check child pointers so `predict` cannot index out of bounds or loop.
    /// Used after deserializing an artifact.
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }
        for (i, n) in self.nodes.iter().enumerate() {
            if n.is_leaf() {
                continue;
            }
            let in_range =
                |c: i32| usize::try_from(c).is_ok_and(|c| c > i && c < self.nodes.len());
            if !in_range(n.left) || !in_range(n.right) {
                return Err(format!("node {i} has invalid children"));
            }
            if !usize::try_from(n.feature).is_ok_and(|f| f < self.n_features) {
                return Err(format!("node {i} splits on unknown feature {}", n.feature));
            }
        }
        Ok(())
    }
}

fn mean_of(y: &[f64], idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    idx.iter().map(|&i| y[i]).sum::<f64>() / idx.len() as f64
}

/// Best squared-error split over `candidates`.
///
/// Maximizes `sum_l^2 / n_l + sum_r^2 / n_r`, which is equivalent to
/// minimizing the children's total squared error. A feature holding any
/// non-finite value is never split on.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    idx: &[usize],
    candidates: &[usize],
    min_samples_leaf: usize,
) -> Option<Split> {
    let n = idx.len();
    let min_leaf = min_samples_leaf.max(1);
    if n < 2 * min_leaf {
        return None;
    }
    let total: f64 = idx.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;

    // Pure node: nothing to gain
    let first = y[idx[0]];
    if idx.iter().all(|&i| y[i].total_cmp(&first).is_eq()) {
        return None;
    }

    let mut best: Option<Split> = None;
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
    for &f in candidates {
        pairs.clear();
        pairs.extend(
            idx.iter()
                .filter(|&&i| x[i][f].is_finite())
                .map(|&i| (x[i][f], y[i])),
        );
        if pairs.len() < n {
            // split statistics below assume every sample has a usable value
            continue;
        }
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        if pairs[0].0 >= pairs[n - 1].0 {
            continue;
        }

        let mut left_sum = 0.0;
        for j in 1..n {
            left_sum += pairs[j - 1].1;
            if j < min_leaf || n - j < min_leaf {
                continue;
            }
            let (lo, hi) = (pairs[j - 1].0, pairs[j].0);
            if lo >= hi {
                continue;
            }
            let right_sum = total - left_sum;
            let score = left_sum * left_sum / j as f64 + right_sum * right_sum / (n - j) as f64;
            if best.as_ref().is_none_or(|b| score > b.score) {
                let mid = lo + (hi - lo) / 2.0;
                // guard against the midpoint rounding up onto `hi`
                let threshold = if mid < hi { mid } else { lo };
                best = Some(Split {
                    feature: f,
                    threshold,
                    score,
                });
            }
        }
    }

    best.filter(|b| b.score > parent_score + 1e-12 * parent_score.abs().max(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }

    fn fit(x: &[Vec<f64>], y: &[f64], p: &TreeParams) -> RegressionTree {
        let mut rng = StdRng::seed_from_u64(0);
        RegressionTree::fit(x, y, (0..y.len()).collect(), p, &mut rng).unwrap()
    }

    #[test]
    fn step_function_is_learned_exactly() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 3.0 }).collect();
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.nodes[0].threshold, 4.5);
        assert_eq!(tree.predict(&[2.0]), 1.0);
        assert_eq!(tree.predict(&[4.5]), 1.0); // <= threshold goes left
        assert_eq!(tree.predict(&[8.0]), 3.0);
    }

    #[test]
    fn picks_the_informative_feature() {
        // feature 0 is noise, feature 1 determines y
        let x: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![f64::from((i * 7) % 5), f64::from(i % 2)])
            .collect();
        let y: Vec<f64> = (0..20).map(|i| if i % 2 == 0 { -1.0 } else { 1.0 }).collect();
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.nodes[0].feature, 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn depth_limit_is_respected() {
        let x: Vec<Vec<f64>> = (0..64).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<f64> = (0..64).map(f64::from).collect();
        let mut p = params();
        p.max_depth = Some(3);
        let tree = fit(&x, &y, &p);
        assert_eq!(tree.depth(), 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn min_samples_leaf_blocks_tiny_leaves() {
        let x: Vec<Vec<f64>> = (0..6).map(|i| vec![f64::from(i)]).collect();
        let y = vec![0.0, 0.0, 0.0, 0.0, 0.0, 100.0];
        let mut p = params();
        p.min_samples_leaf = 2;
        let tree = fit(&x, &y, &p);
        for n in &tree.nodes {
            assert!(n.samples >= 2, "leaf with {} samples", n.samples);
        }
    }

    #[test]
    fn constant_target_yields_single_leaf() {
        let x: Vec<Vec<f64>> = (0..5).map(|i| vec![f64::from(i)]).collect();
        let tree = fit(&x, &[7.0; 5], &params());
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[100.0]), 7.0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn non_finite_column_is_never_split_on() {
        // column 0 is poisoned, column 1 carries the signal
        let x: Vec<Vec<f64>> = (0..12)
            .map(|i| vec![f64::NAN, f64::from(i % 2)])
            .collect();
        let y: Vec<f64> = (0..12).map(|i| f64::from(i % 2) * 10.0).collect();
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.nodes[0].feature, 1);
        assert_eq!(tree.n_leaves(), 2);
        assert!(tree.validate().is_ok());
    }

    #[rstest::rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn single_non_finite_value_terminates(#[case] bad: f64) {
        let mut x: Vec<Vec<f64>> = (0..16).map(|i| vec![f64::from(i)]).collect();
        x[3][0] = bad;
        let y: Vec<f64> = (0..16).map(f64::from).collect();
        let tree = fit(&x, &y, &params());
        assert_eq!(tree.n_nodes(), 1);
        assert!(tree.predict(&[2.0]).is_finite());
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = RegressionTree::fit(&[vec![1.0]], &[1.0, 2.0], vec![0], &params(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, BuildError::LengthMismatch { .. }));
    }
}
