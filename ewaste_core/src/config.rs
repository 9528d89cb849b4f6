//! Runtime configuration for generation and training.
//!
//! These are separate from the TOML-deserialized schema in `ewaste_config`;
//! see `conversions` for the mapping.

/// Synthetic data generation parameters.
#[derive(Debug, Clone)]
pub struct GeneratorCfg {
    pub samples: usize,
    pub seed: u64,
    /// Upper bound used for age sampling: age <= reference_year - launch_year.
    pub reference_year: i32,
}

impl Default for GeneratorCfg {
    fn default() -> Self {
        Self {
            samples: 1000,
            seed: 42,
            reference_year: 2024,
        }
    }
}

/// Random forest hyperparameters (per target).
#[derive(Debug, Clone)]
pub struct ForestCfg {
    pub n_estimators: usize,
    /// `None` grows trees until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of features tried at each split, in (0, 1].
    pub max_features: f64,
    /// Draw a bootstrap resample per tree.
    pub bootstrap: bool,
}

impl Default for ForestCfg {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 1.0,
            bootstrap: true,
        }
    }
}

/// Train/test split and fitting parameters.
#[derive(Debug, Clone)]
pub struct TrainingCfg {
    pub seed: u64,
    pub test_fraction: f64,
    pub forest: ForestCfg,
}

impl Default for TrainingCfg {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            forest: ForestCfg::default(),
        }
    }
}
