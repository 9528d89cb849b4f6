use std::sync::Arc;

use ewaste_core::mocks::{EchoRegressor, FailingRegressor, FixedRegressor};
use ewaste_core::{
    BatteryType, Condition, DeviceInput, DeviceType, Estimator, EstimatorError, MergePolicy,
};
use rstest::rstest;

fn iphone_request(model: &str) -> DeviceInput {
    DeviceInput {
        device_model: Some(model.into()),
        device_type: Some(DeviceType::Smartphone),
        brand: Some("Apple".into()),
        launch_year: Some(2020),
        age_years: Some(2.0),
        weight_g: Some(164.0),
        battery_type: Some(BatteryType::LiIon),
        condition: Some(Condition::Working),
        is_refurbished: false,
        has_metal_chassis: None,
        screen_size_in: Some(6.1),
    }
}

fn echo(policy: MergePolicy) -> Estimator {
    Estimator::new(Arc::new(EchoRegressor), policy)
}

#[rstest]
#[case(MergePolicy::Explicit)]
#[case(MergePolicy::LegacySentinel)]
fn known_model_is_found_and_keeps_weight(#[case] policy: MergePolicy) {
    let resp = echo(policy).predict(iphone_request("iPhone 12")).unwrap();
    assert!(resp.device_found_in_db);
    assert_eq!(resp.input.weight_g, 164.0);
    assert_eq!(resp.input.device_model, "iPhone 12");
    // echoed weight reached the model unchanged
    assert_eq!(resp.prediction.copper_g, 164.0);
}

#[rstest]
#[case(MergePolicy::Explicit)]
#[case(MergePolicy::LegacySentinel)]
fn empty_model_overwrites_nothing(#[case] policy: MergePolicy) {
    let mut req = iphone_request("");
    req.weight_g = Some(170.0);
    let resp = echo(policy).predict(req).unwrap();
    assert!(!resp.device_found_in_db);
    assert_eq!(resp.input.brand, "Apple");
    assert_eq!(resp.input.weight_g, 170.0);
    assert_eq!(resp.input.screen_size_in, 6.1);
    assert!(!resp.input.has_metal_chassis);
}

#[test]
fn unknown_model_uses_only_supplied_fields() {
    let req = DeviceInput {
        device_model: Some("Unknown Gadget XYZ".into()),
        device_type: Some(DeviceType::Other),
        brand: Some("Generic".into()),
        launch_year: Some(2016),
        age_years: Some(8.0),
        weight_g: Some(320.0),
        battery_type: Some(BatteryType::None),
        condition: Some(Condition::NonWorking),
        ..Default::default()
    };
    let resp = echo(MergePolicy::Explicit).predict(req).unwrap();
    assert!(!resp.device_found_in_db);
    assert_eq!(resp.input.device_type, DeviceType::Other);
    assert_eq!(resp.input.screen_size_in, 0.0);
    assert_eq!(resp.prediction.copper_g, 320.0);
    assert_eq!(resp.prediction.gold_mg, 2016.0);
}

#[test]
fn model_name_alone_is_enough_with_age_and_condition() {
    let req = DeviceInput {
        device_model: Some("macbook air m1".into()),
        age_years: Some(4.0),
        condition: Some(Condition::Working),
        ..Default::default()
    };
    let resp = echo(MergePolicy::Explicit).predict(req).unwrap();
    assert!(resp.device_found_in_db);
    assert_eq!(resp.input.device_type, DeviceType::Laptop);
    assert_eq!(resp.input.battery_type, BatteryType::LiPoly);
    assert_eq!(resp.input.weight_g, 1200.0);
    assert!(resp.input.has_metal_chassis);
    assert_eq!(resp.prediction.environmental_risk, 0.0); // not refurbished
    assert_eq!(resp.prediction.recycling_difficulty, 1.0); // metal chassis
}

#[test]
fn table_never_supplies_condition() {
    let req = DeviceInput {
        device_model: Some("ipad pro".into()),
        age_years: Some(1.0),
        ..Default::default()
    };
    let err = echo(MergePolicy::Explicit).predict(req).unwrap_err();
    assert_eq!(err, EstimatorError::MissingField("condition"));
}

#[test]
fn regressor_failure_is_an_inference_error() {
    let est = Estimator::new(Arc::new(FailingRegressor), MergePolicy::Explicit);
    let err = est.predict(iphone_request("iPhone 12")).unwrap_err();
    assert_eq!(err, EstimatorError::Inference("model unavailable".into()));
    assert!(err.to_string().contains("model unavailable"));
}

#[test]
fn outputs_are_clamped() {
    let est = Estimator::new(
        Arc::new(FixedRegressor([-5.0, 12.0, -0.1, 3.0, 140.0, -20.0])),
        MergePolicy::Explicit,
    );
    let p = est.predict(iphone_request("")).unwrap().prediction;
    assert_eq!(p.copper_g, 0.0);
    assert_eq!(p.gold_mg, 12.0);
    assert_eq!(p.plastic_g, 0.0);
    assert_eq!(p.lithium_g, 3.0);
    assert_eq!(p.recycling_difficulty, 100.0);
    assert_eq!(p.environmental_risk, 0.0);
    assert_eq!(est.estimator_count(), 1);
}

#[test]
fn response_serializes_with_wire_names() {
    let resp = echo(MergePolicy::Explicit).predict(iphone_request("iphone 12")).unwrap();
    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["device_found_in_db"], true);
    assert_eq!(json["input"]["battery_type"], "li-ion");
    assert_eq!(json["input"]["condition"], "working");
    assert!(json["prediction"]["recycling_difficulty"].is_number());
}
