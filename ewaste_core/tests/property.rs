use std::sync::Arc;

use ewaste_core::generator::{Generator, profile_for};
use ewaste_core::mocks::FixedRegressor;
use ewaste_core::{
    BatteryType, Condition, DeviceInput, DeviceType, Estimator, GeneratorCfg, MergePolicy,
    PredictionResult, generate,
};
use proptest::prelude::*;

fn raw_output() -> impl Strategy<Value = f64> {
    prop_oneof![
        -1.0e6..1.0e6,
        Just(f64::NAN),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn request() -> DeviceInput {
    DeviceInput {
        device_type: Some(DeviceType::Tablet),
        brand: Some("Samsung".into()),
        launch_year: Some(2019),
        age_years: Some(5.0),
        weight_g: Some(480.0),
        battery_type: Some(BatteryType::LiPoly),
        condition: Some(Condition::Damaged),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn clamped_outputs_stay_in_range(raw in prop::array::uniform6(raw_output())) {
        let est = Estimator::new(Arc::new(FixedRegressor(raw)), MergePolicy::Explicit);
        let p = est.predict(request()).unwrap().prediction;
        for m in [p.copper_g, p.gold_mg, p.plastic_g, p.lithium_g] {
            prop_assert!(m >= 0.0);
        }
        for s in [p.recycling_difficulty, p.environmental_risk] {
            prop_assert!((0.0..=100.0).contains(&s));
        }
    }

    #[test]
    fn in_range_outputs_pass_through(raw in prop::array::uniform6(0.0f64..100.0)) {
        let p = PredictionResult::from_raw(raw);
        prop_assert_eq!(p.copper_g, raw[0]);
        prop_assert_eq!(p.environmental_risk, raw[5]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generator_is_deterministic(seed in any::<u64>()) {
        let cfg = GeneratorCfg { samples: 25, seed, ..GeneratorCfg::default() };
        prop_assert_eq!(generate(&cfg).unwrap(), generate(&cfg).unwrap());
    }

    #[test]
    fn generated_samples_respect_profiles(seed in any::<u64>()) {
        let cfg = GeneratorCfg { samples: 0, seed, ..GeneratorCfg::default() };
        for s in Generator::new(&cfg).unwrap().take(60) {
            let d = &s.example.device;
            let t = &s.example.targets;
            let prof = profile_for(d.device_type);

            // rounding to 1 decimal can move a draw by at most 0.05
            prop_assert!(
                d.weight_g >= prof.weight_g.min - 0.05 && d.weight_g <= prof.weight_g.max + 0.05
            );
            prop_assert!((2010..=2023).contains(&d.launch_year));
            prop_assert!(d.age_years >= 0.5 - 0.05 && d.age_years <= 15.0 + 0.05);
            prop_assert!(d.age_years <= f64::from(2024 - d.launch_year).max(0.5) + 0.05);

            prop_assert!(prof.copper_g.contains(s.base.copper_g));
            prop_assert!(prof.gold_mg.contains(s.base.gold_mg));
            prop_assert!(prof.plastic_g.contains(s.base.plastic_g));
            prop_assert!(prof.difficulty.contains(s.base.difficulty));
            prop_assert!(prof.risk.contains(s.base.risk));
            if d.battery_type == BatteryType::None {
                prop_assert_eq!(s.base.lithium_g, 0.0);
                prop_assert_eq!(t.lithium_g, 0.0);
            } else {
                prop_assert!(prof.lithium_g.contains(s.base.lithium_g));
            }

            if !d.device_type.may_have_metal_chassis() {
                prop_assert!(!d.has_metal_chassis);
            }
            if !prof.has_screen() {
                prop_assert_eq!(d.screen_size_in, 0.0);
            }

            prop_assert!((0.0..=100.0).contains(&t.recycling_difficulty));
            prop_assert!((0.0..=100.0).contains(&t.environmental_risk));
            prop_assert!(t.copper_g >= 0.0 && t.gold_mg >= 0.0 && t.plastic_g >= 0.0);
            prop_assert!(d.device_model.starts_with(&d.brand));
        }
    }
}
