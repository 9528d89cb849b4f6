//! Random forest regressor: bagged [`RegressionTree`]s averaged at predict time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::ForestCfg;
use crate::error::BuildError;
use crate::tree::{RegressionTree, TreeParams};

/// Per-tree seed. Independent of fitting order, so forests fitted on
/// different threads are identical to sequential ones.
#[inline]
pub fn tree_seed(base: u64, tree_idx: usize) -> u64 {
    // splitmix64 finalizer
    let mut z = base.wrapping_add((tree_idx as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn fit(x: &[Vec<f64>], y: &[f64], cfg: &ForestCfg, seed: u64) -> Result<Self, BuildError> {
        if cfg.n_estimators == 0 {
            return Err(BuildError::InvalidConfig("n_estimators must be >= 1"));
        }
        if !(cfg.max_features > 0.0 && cfg.max_features <= 1.0) {
            return Err(BuildError::InvalidConfig("max_features must be in (0, 1]"));
        }
        if x.is_empty() {
            return Err(BuildError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(BuildError::LengthMismatch {
                features: x.len(),
                targets: y.len(),
            });
        }

        let n = x.len();
        let n_features = x[0].len();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let k = ((cfg.max_features * n_features as f64).ceil() as usize).max(1);
        let params = TreeParams {
            max_depth: cfg.max_depth,
            min_samples_split: cfg.min_samples_split,
            min_samples_leaf: cfg.min_samples_leaf,
            max_features: k,
        };

        let mut trees = Vec::with_capacity(cfg.n_estimators);
        for t in 0..cfg.n_estimators {
            let mut rng = StdRng::seed_from_u64(tree_seed(seed, t));
            let samples: Vec<usize> = if cfg.bootstrap {
                (0..n).map(|_| rng.random_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            trees.push(RegressionTree::fit(x, y, samples, &params, &mut rng)?);
        }

        Ok(Self { trees, n_features })
    }

    /// Mean of the per-tree predictions.
    #[must_use]
    pub fn predict(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.predict(features)).sum::<f64>() / self.trees.len() as f64
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub const fn n_features(&self) -> usize {
        self.n_features
    }

    /// Average tree depth across the forest.
    #[must_use]
    pub fn avg_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / self.trees.len() as f64
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("empty forest".into());
        }
        for (i, t) in self.trees.iter().enumerate() {
            if t.n_features() != self.n_features {
                return Err(format!("tree {i} expects {} features", t.n_features()));
            }
            t.validate().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg(n_estimators: usize) -> ForestCfg {
        ForestCfg {
            n_estimators,
            ..ForestCfg::default()
        }
    }

    fn linear_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![f64::from(i), f64::from(i % 3)]).collect();
        let y: Vec<f64> = (0..50).map(|i| 2.0 * f64::from(i)).collect();
        (x, y)
    }

    #[test]
    fn same_seed_same_forest() {
        let (x, y) = linear_data();
        let a = RandomForestRegressor::fit(&x, &y, &small_cfg(8), 7).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &small_cfg(8), 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_usually_differ() {
        let (x, y) = linear_data();
        let a = RandomForestRegressor::fit(&x, &y, &small_cfg(8), 1).unwrap();
        let b = RandomForestRegressor::fit(&x, &y, &small_cfg(8), 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prediction_tracks_the_target() {
        let (x, y) = linear_data();
        let f = RandomForestRegressor::fit(&x, &y, &small_cfg(30), 3).unwrap();
        assert_eq!(f.n_trees(), 30);
        let p = f.predict(&[25.0, 1.0]);
        assert!((p - 50.0).abs() < 6.0, "prediction {p}");
        // predictions stay inside the training target range
        assert!(f.predict(&[1_000.0, 0.0]) <= 98.0);
        assert!(f.validate().is_ok());
    }

    #[test]
    fn without_bootstrap_every_tree_is_identical() {
        let (x, y) = linear_data();
        let cfg = ForestCfg {
            n_estimators: 3,
            bootstrap: false,
            ..ForestCfg::default()
        };
        let f = RandomForestRegressor::fit(&x, &y, &cfg, 9).unwrap();
        assert_eq!(f.predict(&[10.0, 1.0]), 20.0);
    }

    #[test]
    fn rejects_zero_estimators() {
        let (x, y) = linear_data();
        let err = RandomForestRegressor::fit(&x, &y, &small_cfg(0), 0).unwrap_err();
        assert_eq!(err, BuildError::InvalidConfig("n_estimators must be >= 1"));
    }

    #[test]
    fn tree_seeds_are_distinct() {
        let seeds: std::collections::HashSet<u64> = (0..100).map(|t| tree_seed(42, t)).collect();
        assert_eq!(seeds.len(), 100);
    }
}
