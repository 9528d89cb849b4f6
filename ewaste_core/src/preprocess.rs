//! Feature preprocessing: standard scaling for numeric columns and one-hot
//! encoding for categorical columns, concatenated numeric-first.

use ewaste_traits::{FEATURE_NAMES, FeatureRow};
use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Numeric input columns, in [`FeatureRow::numeric`] order.
pub const NUMERIC_FEATURES: [&str; 6] = [
    "launch_year",
    "age_years",
    "weight_g",
    "is_refurbished",
    "has_metal_chassis",
    "screen_size_in",
];

/// Categorical input columns, in [`FeatureRow::categorical`] order.
pub const CATEGORICAL_FEATURES: [&str; 4] = ["device_type", "brand", "battery_type", "condition"];

/// Per-column `(x - mean) / scale` with population standard deviation.
/// Zero-variance columns get scale 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn fit<const N: usize>(rows: &[[f64; N]]) -> Result<Self, BuildError> {
        if rows.is_empty() {
            return Err(BuildError::EmptyTrainingSet);
        }
        let n = rows.len() as f64;
        let mut mean = vec![0.0; N];
        for r in rows {
            for (m, x) in mean.iter_mut().zip(r) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }
        let mut var = vec![0.0; N];
        for r in rows {
            for ((v, x), m) in var.iter_mut().zip(r).zip(&mean) {
                let d = x - m;
                *v += d * d;
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let sd = (v / n).sqrt();
                if sd.is_finite() && sd > f64::EPSILON { sd } else { 1.0 }
            })
            .collect();
        Ok(Self { mean, scale })
    }

    pub fn transform_into(&self, values: &[f64], out: &mut Vec<f64>) {
        for ((x, m), s) in values.iter().zip(&self.mean).zip(&self.scale) {
            out.push((x - m) / s);
        }
    }
}

/// One indicator column per category seen during fitting; categories are
/// sorted per column. Values unseen at fit time encode as all zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Vec<Vec<String>>,
}

impl OneHotEncoder {
    pub fn fit<const N: usize>(rows: &[[&str; N]]) -> Result<Self, BuildError> {
        if rows.is_empty() {
            return Err(BuildError::EmptyTrainingSet);
        }
        let mut categories: Vec<Vec<String>> = vec![Vec::new(); N];
        for r in rows {
            for (cats, v) in categories.iter_mut().zip(r) {
                if let Err(pos) = cats.binary_search_by(|c| c.as_str().cmp(v)) {
                    cats.insert(pos, (*v).to_string());
                }
            }
        }
        Ok(Self { categories })
    }

    pub fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    pub fn transform_into(&self, values: &[&str], out: &mut Vec<f64>) {
        for (cats, v) in self.categories.iter().zip(values) {
            let hit = cats.binary_search_by(|c| c.as_str().cmp(v)).ok();
            out.extend((0..cats.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
        }
    }
}

/// Fitted column transformer mapping a [`FeatureRow`] to a dense vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    pub scaler: StandardScaler,
    pub encoder: OneHotEncoder,
}

impl Preprocessor {
    pub fn fit(rows: &[FeatureRow]) -> Result<Self, BuildError> {
        let numeric: Vec<[f64; 6]> = rows.iter().map(FeatureRow::numeric).collect();
        let categorical: Vec<[&str; 4]> = rows.iter().map(FeatureRow::categorical).collect();
        Ok(Self {
            scaler: StandardScaler::fit(&numeric)?,
            encoder: OneHotEncoder::fit(&categorical)?,
        })
    }

    /// Width of the transformed vector.
    pub fn n_outputs(&self) -> usize {
        NUMERIC_FEATURES.len() + self.encoder.width()
    }

    pub fn transform(&self, row: &FeatureRow) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.n_outputs());
        self.scaler.transform_into(&row.numeric(), &mut out);
        self.encoder.transform_into(&row.categorical(), &mut out);
        out
    }

    /// Output column names, e.g. `weight_g` or `brand=Dell`.
    pub fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|s| (*s).to_string()).collect();
        for (col, cats) in CATEGORICAL_FEATURES.iter().zip(&self.encoder.categories) {
            names.extend(cats.iter().map(|c| format!("{col}={c}")));
        }
        names
    }

    /// Raw input feature names, in training order.
    pub fn input_names() -> [&'static str; 10] {
        FEATURE_NAMES
    }
}
