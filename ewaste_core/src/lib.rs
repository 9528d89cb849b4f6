#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core estimation logic for e-waste material recovery.
//!
//! ## Architecture
//!
//! - **Reference table**: ordered device specs with fuzzy lookup (`catalog`)
//! - **Merge policy**: fill unset request fields from a table hit (`merge`)
//! - **Synthetic data**: heuristic sample generator (`generator`)
//! - **Model**: scaling + one-hot preprocessing, CART trees, random forests
//!   (`preprocess`, `tree`, `forest`), bundled into a JSON artifact (`pipeline`)
//! - **Training**: seeded split, threaded fitting, held-out metrics (`training`)
//! - **Service**: request → prediction with output clamping (`service`)
//!
//! The model sits behind `ewaste_traits::Regressor`, so the service can be
//! driven by the fitted artifact or by any of the doubles in `mocks`.

pub mod catalog;
pub mod config;
pub mod conversions;
pub mod error;
pub mod forest;
pub mod generator;
pub mod merge;
pub mod metrics;
pub mod mocks;
pub mod pipeline;
pub mod preprocess;
pub mod service;
pub mod training;
pub mod tree;
pub mod types;

pub use catalog::{CatalogEntry, entries, lookup};
pub use config::{ForestCfg, GeneratorCfg, TrainingCfg};
pub use error::{BuildError, EstimatorError, Report, Result};
pub use generator::{Generator, SyntheticSample, generate};
pub use merge::{MergePolicy, merge_defaults, resolve};
pub use pipeline::{ARTIFACT_FORMAT_VERSION, ModelArtifact};
pub use service::Estimator;
pub use training::{TrainingReport, load_examples, train, train_test_split};
pub use types::{
    BatteryType, Condition, DeviceInput, DeviceSpec, DeviceType, PredictionResponse,
    PredictionResult, ResolvedDevice, TrainingExample,
};

pub use ewaste_traits::{FeatureRow, Regressor, TARGET_NAMES, Targets};

/// Write generated examples to the dataset CSV.
pub fn write_examples(path: &std::path::Path, examples: &[TrainingExample]) -> Result<()> {
    let rows: Vec<ewaste_config::DatasetRow> =
        examples.iter().map(ewaste_config::DatasetRow::from).collect();
    ewaste_config::write_dataset_csv(path, &rows)
}
