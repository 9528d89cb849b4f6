//! Offline training: split, fit, evaluate.

use std::path::Path;

use eyre::WrapErr;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Serialize;

use ewaste_traits::{FeatureRow, TARGET_COUNT, TARGET_NAMES, Targets};

use crate::config::TrainingCfg;
use crate::conversions::examples_from_rows;
use crate::error::EstimatorError;
use crate::metrics::TargetMetrics;
use crate::pipeline::ModelArtifact;
use crate::types::TrainingExample;

#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub target: &'static str,
    #[serde(flatten)]
    pub metrics: TargetMetrics,
}

/// Held-out evaluation of a freshly fitted artifact.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub trees_per_target: usize,
    pub targets: Vec<TargetReport>,
}

/// Shuffle indices with `seed` and cut off `ceil(n * test_fraction)` for testing.
///
/// Both halves are non-empty whenever `n >= 2`.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n_test = ((n as f64 * test_fraction - 1e-9).ceil() as usize)
        .clamp(1, n.saturating_sub(1).max(1));
    let train = idx.split_off(n_test.min(n));
    (train, idx)
}

/// Read the dataset CSV and decode its rows.
pub fn load_examples(path: &Path) -> eyre::Result<Vec<TrainingExample>> {
    let rows = ewaste_config::load_dataset_csv(path)?;
    let examples = examples_from_rows(&rows)
        .wrap_err_with(|| format!("decoding dataset {}", path.display()))?;
    Ok(examples)
}

fn non_finite_field(ex: &TrainingExample) -> Option<&'static str> {
    let d = &ex.device;
    [
        ("age_years", d.age_years),
        ("weight_g", d.weight_g),
        ("screen_size_in", d.screen_size_in),
    ]
    .into_iter()
    .chain(TARGET_NAMES.iter().copied().zip(ex.target_vector()))
    .find(|(_, v)| !v.is_finite())
    .map(|(name, _)| name)
}

pub fn train(
    examples: &[TrainingExample],
    cfg: &TrainingCfg,
) -> Result<(ModelArtifact, TrainingReport), EstimatorError> {
    if examples.len() < 2 {
        return Err(EstimatorError::Training(format!(
            "need at least 2 examples, got {}",
            examples.len()
        )));
    }
    if let Some((i, field)) = examples
        .iter()
        .enumerate()
        .find_map(|(i, ex)| non_finite_field(ex).map(|f| (i, f)))
    {
        return Err(EstimatorError::Dataset(format!(
            "example {i}: {field} is not a finite number"
        )));
    }
    let (train_idx, test_idx) = train_test_split(examples.len(), cfg.test_fraction, cfg.seed);
    tracing::info!(
        train = train_idx.len(),
        test = test_idx.len(),
        trees = cfg.forest.n_estimators,
        seed = cfg.seed,
        "fitting forests"
    );

    let rows: Vec<FeatureRow> = train_idx
        .iter()
        .map(|&i| examples[i].device.to_feature_row())
        .collect();
    let targets: Vec<Targets> = train_idx.iter().map(|&i| examples[i].target_vector()).collect();

    let started = std::time::Instant::now();
    let artifact = ModelArtifact::fit(&rows, &targets, &cfg.forest, cfg.seed)
        .map_err(|e| EstimatorError::Training(e.to_string()))?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(elapsed_ms, "fit complete");

    let mut truth: Vec<Vec<f64>> = vec![Vec::with_capacity(test_idx.len()); TARGET_COUNT];
    let mut pred: Vec<Vec<f64>> = vec![Vec::with_capacity(test_idx.len()); TARGET_COUNT];
    for &i in &test_idx {
        let p = artifact.predict_raw(&examples[i].device.to_feature_row());
        let t = examples[i].target_vector();
        for k in 0..TARGET_COUNT {
            truth[k].push(t[k]);
            pred[k].push(p[k]);
        }
    }

    let targets = TARGET_NAMES
        .iter()
        .enumerate()
        .map(|(k, &name)| {
            let metrics = TargetMetrics::compute(&truth[k], &pred[k]);
            tracing::info!(
                output = name,
                mae = metrics.mae,
                rmse = metrics.rmse,
                r2 = metrics.r2,
                "held-out metrics"
            );
            TargetReport {
                target: name,
                metrics,
            }
        })
        .collect();

    let report = TrainingReport {
        train_rows: train_idx.len(),
        test_rows: test_idx.len(),
        trees_per_target: cfg.forest.n_estimators,
        targets,
    };
    Ok((artifact, report))
}
