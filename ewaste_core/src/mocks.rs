//! Test and helper regressors for ewaste_core

use ewaste_traits::{FeatureRow, Regressor, Targets};

/// Returns the same raw output for every row; useful for exercising the
/// clamping and merge paths without fitting a model.
#[derive(Debug, Clone, Copy)]
pub struct FixedRegressor(pub Targets);

impl Regressor for FixedRegressor {
    fn predict(
        &self,
        _row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.0)
    }

    fn estimator_count(&self) -> usize {
        1
    }
}

/// A regressor that always errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingRegressor;

impl Regressor for FailingRegressor {
    fn predict(
        &self,
        _row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::other("model unavailable")))
    }
}

/// Echoes selected feature values back as targets so tests can observe
/// exactly what reached the model: `[weight_g, launch_year,
/// screen_size_in, age_years, has_metal_chassis, is_refurbished]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoRegressor;

impl Regressor for EchoRegressor {
    fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        Ok([
            row.weight_g,
            f64::from(row.launch_year),
            row.screen_size_in,
            row.age_years,
            f64::from(u8::from(row.has_metal_chassis)),
            f64::from(u8::from(row.is_refurbished)),
        ])
    }
}
