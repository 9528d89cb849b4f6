#![no_main]
use std::sync::Arc;

use ewaste_core::mocks::EchoRegressor;
use ewaste_core::{DeviceInput, Estimator, MergePolicy};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(input) = serde_json::from_str::<DeviceInput>(data) else {
        return;
    };
    for policy in [MergePolicy::Explicit, MergePolicy::LegacySentinel] {
        let est = Estimator::new(Arc::new(EchoRegressor), policy);
        if let Ok(resp) = est.predict(input.clone()) {
            let p = resp.prediction;
            assert!(p.copper_g >= 0.0 && p.gold_mg >= 0.0);
            assert!((0.0..=100.0).contains(&p.recycling_difficulty));
            assert!(resp.input.weight_g > 0.0);
        }
    }
});
