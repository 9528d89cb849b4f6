//! Prediction service: lookup, merge, resolve, infer, clamp.

use std::sync::Arc;

use ewaste_traits::Regressor;

use crate::catalog;
use crate::error::EstimatorError;
use crate::merge::{MergePolicy, merge_defaults, resolve};
use crate::types::{DeviceInput, PredictionResponse, PredictionResult};

/// Shared, immutable prediction entry point. Cheap to clone.
#[derive(Clone)]
pub struct Estimator {
    regressor: Arc<dyn Regressor>,
    policy: MergePolicy,
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("estimators", &self.regressor.estimator_count())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Estimator {
    pub fn new(regressor: Arc<dyn Regressor>, policy: MergePolicy) -> Self {
        Self { regressor, policy }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    pub fn estimator_count(&self) -> usize {
        self.regressor.estimator_count()
    }

    pub fn predict(&self, mut input: DeviceInput) -> Result<PredictionResponse, EstimatorError> {
        let mut found = false;
        if let Some(query) = input.model_query()
            && let Some(spec) = catalog::lookup(query)
        {
            found = true;
            merge_defaults(&mut input, &spec, self.policy);
        }

        let device = resolve(input)?;
        let raw = self
            .regressor
            .predict(&device.to_feature_row())
            .map_err(|e| EstimatorError::Inference(e.to_string()))?;
        let prediction = PredictionResult::from_raw(raw);

        tracing::debug!(
            device_type = %device.device_type,
            brand = %device.brand,
            device_found_in_db = found,
            "prediction served"
        );
        Ok(PredictionResponse {
            input: device,
            prediction,
            device_found_in_db: found,
        })
    }
}
