//! Model-facing seam shared by the estimator crates.
//!
//! Everything that crosses the boundary between the request layer and a
//! fitted model lives here, with no dependencies, so alternative regressors
//! (or test doubles) can be plugged into the prediction service.

pub mod features;

pub use features::{FEATURE_NAMES, FeatureRow, TARGET_COUNT, TARGET_NAMES, Targets};

/// A fitted multi-output regressor.
///
/// Implementations must be pure: the same row always yields the same output,
/// and `predict` never mutates shared state, so one instance can serve many
/// concurrent callers.
pub trait Regressor: Send + Sync {
    fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>>;

    /// Total number of fitted trees (or other estimators), for health output.
    fn estimator_count(&self) -> usize {
        0
    }
}

impl<R: Regressor + ?Sized> Regressor for std::sync::Arc<R> {
    fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        (**self).predict(row)
    }

    fn estimator_count(&self) -> usize {
        (**self).estimator_count()
    }
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Targets, Box<dyn std::error::Error + Send + Sync>> {
        (**self).predict(row)
    }

    fn estimator_count(&self) -> usize {
        (**self).estimator_count()
    }
}
