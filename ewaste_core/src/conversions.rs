//! `From`/`TryFrom` implementations bridging `ewaste_config` types to `ewaste_core` types.

use ewaste_config::DatasetRow;

use crate::config::{ForestCfg, GeneratorCfg, TrainingCfg};
use crate::error::EstimatorError;
use crate::types::{PredictionResult, ResolvedDevice, TrainingExample};

// ── GeneratorCfg ─────────────────────────────────────────────────────────────

impl From<&ewaste_config::GeneratorCfg> for GeneratorCfg {
    fn from(c: &ewaste_config::GeneratorCfg) -> Self {
        Self {
            samples: c.samples,
            seed: c.seed,
            reference_year: c.reference_year,
        }
    }
}

// ── TrainingCfg ──────────────────────────────────────────────────────────────

impl From<&ewaste_config::TrainingCfg> for TrainingCfg {
    fn from(c: &ewaste_config::TrainingCfg) -> Self {
        Self {
            seed: c.seed,
            test_fraction: c.test_fraction,
            forest: ForestCfg {
                n_estimators: c.n_estimators,
                max_depth: (c.max_depth > 0).then_some(c.max_depth),
                min_samples_split: c.min_samples_split,
                min_samples_leaf: c.min_samples_leaf,
                max_features: c.max_features,
                bootstrap: true,
            },
        }
    }
}

// ── Dataset rows ─────────────────────────────────────────────────────────────

impl From<&TrainingExample> for DatasetRow {
    fn from(e: &TrainingExample) -> Self {
        let d = &e.device;
        let t = &e.targets;
        Self {
            device_model: d.device_model.clone(),
            device_type: d.device_type.as_str().to_string(),
            brand: d.brand.clone(),
            launch_year: d.launch_year,
            age_years: d.age_years,
            weight_g: d.weight_g,
            battery_type: d.battery_type.as_str().to_string(),
            condition: d.condition.as_str().to_string(),
            is_refurbished: d.is_refurbished,
            has_metal_chassis: d.has_metal_chassis,
            screen_size_in: d.screen_size_in,
            copper_g: t.copper_g,
            gold_mg: t.gold_mg,
            plastic_g: t.plastic_g,
            lithium_g: t.lithium_g,
            recycling_difficulty: t.recycling_difficulty,
            environmental_risk: t.environmental_risk,
        }
    }
}

fn check_range(name: &str, value: f64, positive: bool) -> Result<(), EstimatorError> {
    let ok = value.is_finite() && if positive { value > 0.0 } else { value >= 0.0 };
    if ok {
        return Ok(());
    }
    let bound = if positive { "> 0" } else { ">= 0" };
    Err(EstimatorError::InvalidInput(format!(
        "{name} must be a finite number {bound}, got {value}"
    )))
}

impl TryFrom<&DatasetRow> for TrainingExample {
    type Error = EstimatorError;

    fn try_from(r: &DatasetRow) -> Result<Self, Self::Error> {
        check_range("weight_g", r.weight_g, true)?;
        check_range("age_years", r.age_years, false)?;
        check_range("screen_size_in", r.screen_size_in, false)?;
        for (name, v) in [
            ("copper_g", r.copper_g),
            ("gold_mg", r.gold_mg),
            ("plastic_g", r.plastic_g),
            ("lithium_g", r.lithium_g),
            ("recycling_difficulty", r.recycling_difficulty),
            ("environmental_risk", r.environmental_risk),
        ] {
            check_range(name, v, false)?;
        }
        let device = ResolvedDevice {
            device_model: r.device_model.clone(),
            device_type: r.device_type.parse()?,
            brand: r.brand.clone(),
            launch_year: r.launch_year,
            age_years: r.age_years,
            weight_g: r.weight_g,
            battery_type: r.battery_type.parse()?,
            condition: r.condition.parse()?,
            is_refurbished: r.is_refurbished,
            has_metal_chassis: r.has_metal_chassis,
            screen_size_in: r.screen_size_in,
        };
        let targets = PredictionResult {
            copper_g: r.copper_g,
            gold_mg: r.gold_mg,
            plastic_g: r.plastic_g,
            lithium_g: r.lithium_g,
            recycling_difficulty: r.recycling_difficulty,
            environmental_risk: r.environmental_risk,
        };
        Ok(Self { device, targets })
    }
}

/// Convert loaded CSV rows, reporting the 1-based file line of the first bad row.
pub fn examples_from_rows(rows: &[DatasetRow]) -> Result<Vec<TrainingExample>, EstimatorError> {
    rows.iter()
        .enumerate()
        .map(|(i, r)| {
            TrainingExample::try_from(r)
                .map_err(|e| EstimatorError::Dataset(format!("row {}: {e}", i + 2)))
        })
        .collect()
}
