//! Fitted preprocessing + per-target forests, persisted as one JSON artifact.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crossbeam_channel::unbounded;
use ewaste_traits::{FEATURE_NAMES, FeatureRow, Regressor, TARGET_COUNT, TARGET_NAMES, Targets};
use serde::{Deserialize, Serialize};

use crate::config::ForestCfg;
use crate::error::{BuildError, EstimatorError};
use crate::forest::RandomForestRegressor;
use crate::preprocess::Preprocessor;

/// Bumped whenever the serialized layout changes.
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
    pub preprocessor: Preprocessor,
    /// One forest per target, in [`TARGET_NAMES`] order.
    pub forests: Vec<RandomForestRegressor>,
}

impl ModelArtifact {
    /// Fit the preprocessor, then one forest per target on its own thread.
    ///
    /// Every forest is seeded with `seed`; the result does not depend on
    /// which thread finishes first.
    pub fn fit(
        rows: &[FeatureRow],
        targets: &[Targets],
        cfg: &ForestCfg,
        seed: u64,
    ) -> Result<Self, BuildError> {
        if rows.len() != targets.len() {
            return Err(BuildError::LengthMismatch {
                features: rows.len(),
                targets: targets.len(),
            });
        }
        let preprocessor = Preprocessor::fit(rows)?;
        let x: Vec<Vec<f64>> = rows.iter().map(|r| preprocessor.transform(r)).collect();
        let columns: Vec<Vec<f64>> = (0..TARGET_COUNT)
            .map(|t| targets.iter().map(|row| row[t]).collect())
            .collect();

        let (tx, rx) = unbounded::<(usize, Result<RandomForestRegressor, BuildError>)>();
        std::thread::scope(|s| {
            for (t, y) in columns.iter().enumerate() {
                let tx = tx.clone();
                let x = &x;
                s.spawn(move || {
                    let span = tracing::debug_span!("fit_forest", output = TARGET_NAMES[t]);
                    let _enter = span.enter();
                    let res = RandomForestRegressor::fit(x, y, cfg, seed);
                    // receiver outlives the scope
                    let _ = tx.send((t, res));
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<RandomForestRegressor>> = vec![None; TARGET_COUNT];
        for (t, res) in rx {
            slots[t] = Some(res?);
        }
        let forests = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(BuildError::InvalidConfig("forest worker exited without a result"))?;

        Ok(Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            target_names: TARGET_NAMES.iter().map(|s| (*s).to_string()).collect(),
            preprocessor,
            forests,
        })
    }

    /// Raw (unclamped) predictions for one row.
    #[must_use]
    pub fn predict_raw(&self, row: &FeatureRow) -> Targets {
        let x = self.preprocessor.transform(row);
        let mut out = [0.0; TARGET_COUNT];
        for (o, f) in out.iter_mut().zip(&self.forests) {
            *o = f.predict(&x);
        }
        out
    }

    #[must_use]
    pub fn total_trees(&self) -> usize {
        self.forests.iter().map(RandomForestRegressor::n_trees).sum()
    }

    /// Structural checks run after deserializing.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        let bad = |msg: String| Err(EstimatorError::Artifact(msg));
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return bad(format!(
                "unsupported format_version {} (expected {ARTIFACT_FORMAT_VERSION})",
                self.format_version
            ));
        }
        if self.feature_names != FEATURE_NAMES {
            return bad(format!("unexpected feature_names {:?}", self.feature_names));
        }
        if self.target_names != TARGET_NAMES {
            return bad(format!("unexpected target_names {:?}", self.target_names));
        }
        if self.forests.len() != TARGET_COUNT {
            return bad(format!(
                "expected {TARGET_COUNT} forests, found {}",
                self.forests.len()
            ));
        }
        let scaler = &self.preprocessor.scaler;
        if scaler.mean.len() != crate::preprocess::NUMERIC_FEATURES.len()
            || scaler.scale.len() != scaler.mean.len()
        {
            return bad("scaler shape does not match numeric features".into());
        }
        if self.preprocessor.encoder.categories.len()
            != crate::preprocess::CATEGORICAL_FEATURES.len()
        {
            return bad("encoder shape does not match categorical features".into());
        }
        if scaler.mean.iter().any(|m| !m.is_finite())
            || scaler.scale.iter().any(|s| !s.is_finite() || *s <= 0.0)
        {
            return bad("scaler holds non-finite or non-positive values".into());
        }
        // lookups binary-search each category list
        for (name, cats) in crate::preprocess::CATEGORICAL_FEATURES
            .iter()
            .zip(&self.preprocessor.encoder.categories)
        {
            if cats.windows(2).any(|w| w[0] >= w[1]) {
                return bad(format!("categories for {name} are not sorted and unique"));
            }
        }
        let width = self.preprocessor.n_outputs();
        for (name, f) in TARGET_NAMES.iter().zip(&self.forests) {
            if f.n_features() != width {
                return bad(format!(
                    "forest for {name} expects {} inputs, preprocessor yields {width}",
                    f.n_features()
                ));
            }
            f.validate().map_err(|e| EstimatorError::Artifact(format!("{name}: {e}")))?;
        }
        Ok(())
    }

    /// Write the artifact as JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), EstimatorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                EstimatorError::Artifact(format!("create {}: {e}", parent.display()))
            })?;
        }
        let write_err = |e: &dyn std::fmt::Display| {
            EstimatorError::Artifact(format!("write {}: {e}", path.display()))
        };
        let file = fs::File::create(path)
            .map_err(|e| EstimatorError::Artifact(format!("create {}: {e}", path.display())))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, self).map_err(|e| write_err(&e))?;
        w.flush().map_err(|e| write_err(&e))?;
        let file = w.into_inner().map_err(|e| write_err(&e.into_error()))?;
        file.sync_all().map_err(|e| write_err(&e))?;
        tracing::info!(path = %path.display(), trees = self.total_trees(), "saved model artifact");
        Ok(())
    }

    /// Read and validate an artifact written by [`ModelArtifact::save`].
    pub fn load(path: &Path) -> Result<Self, EstimatorError> {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(EstimatorError::ArtifactMissing(path.to_path_buf()));
            }
            Err(e) => {
                return Err(EstimatorError::Artifact(format!(
                    "open {}: {e}",
                    path.display()
                )));
            }
        };
        let artifact: Self = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| EstimatorError::Artifact(format!("parse {}: {e}", path.display())))?;
        artifact.validate()?;
        tracing::info!(
            path = %path.display(),
            trees = artifact.total_trees(),
            "loaded model artifact"
        );
        Ok(artifact)
    }
}

impl Regressor for ModelArtifact {
    fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        let out = self.predict_raw(row);
        if let Some(i) = out.iter().position(|v| !v.is_finite()) {
            return Err(format!("non-finite output for {}", TARGET_NAMES[i]).into());
        }
        Ok(out)
    }

    fn estimator_count(&self) -> usize {
        self.total_trees()
    }
}
