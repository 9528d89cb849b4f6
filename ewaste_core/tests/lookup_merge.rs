use ewaste_core::merge::{MergePolicy, merge_defaults, resolve};
use ewaste_core::{BatteryType, Condition, DeviceInput, DeviceType, EstimatorError, lookup};
use rstest::rstest;

fn sentinel_input(model: &str) -> DeviceInput {
    DeviceInput {
        device_model: Some(model.into()),
        device_type: Some(DeviceType::Smartphone),
        brand: Some("Apple".into()),
        launch_year: Some(2020),
        age_years: Some(3.0),
        weight_g: Some(164.0),
        battery_type: Some(BatteryType::LiIon),
        condition: Some(Condition::Damaged),
        is_refurbished: true,
        has_metal_chassis: Some(false),
        screen_size_in: Some(6.1),
    }
}

#[rstest]
#[case("iphone 12", "Apple", 164.0)]
#[case("  Galaxy S21 ", "Samsung", 169.0)]
#[case("DELL XPS 13", "Dell", 1200.0)]
#[case("surface pro 8", "Microsoft", 891.0)]
fn exact_lookup_returns_entry(#[case] query: &str, #[case] brand: &str, #[case] weight: f64) {
    let spec = lookup(query).expect("known model");
    assert_eq!(spec.brand, brand);
    assert_eq!(spec.weight_g, weight);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("Unknown Gadget XYZ")]
#[case("nokia 3310")]
fn lookup_miss_is_absent(#[case] query: &str) {
    assert_eq!(lookup(query), None);
}

#[rstest]
#[case("my galaxy s9 from 2018", "galaxy s9")]
#[case("HP Spectre x360 13-aw0", "hp spectre x360")]
#[case("thinkpad", "lenovo thinkpad x1")]
fn partial_lookup_is_first_match(#[case] query: &str, #[case] key: &str) {
    let entry = ewaste_core::catalog::lookup_entry(query).expect("partial hit");
    assert_eq!(entry.key, key);
}

#[test]
fn lookups_return_independent_copies() {
    let mut first = lookup("iphone 12").unwrap();
    first.brand.push_str(" (modified)");
    first.weight_g = 1.0;
    let second = lookup("iphone 12").unwrap();
    assert_eq!(second.brand, "Apple");
    assert_eq!(second.weight_g, 164.0);
}

#[test]
fn explicit_policy_fills_only_absent_fields() {
    let spec = lookup("dell xps 13").unwrap();
    let mut input = DeviceInput {
        device_model: Some("dell xps 13".into()),
        weight_g: Some(999.0),
        age_years: Some(2.0),
        condition: Some(Condition::Working),
        ..Default::default()
    };
    merge_defaults(&mut input, &spec, MergePolicy::Explicit);
    assert_eq!(input.device_type, Some(DeviceType::Laptop));
    assert_eq!(input.brand.as_deref(), Some("Dell"));
    assert_eq!(input.launch_year, Some(2021));
    assert_eq!(input.weight_g, Some(999.0));
    assert_eq!(input.screen_size_in, Some(13.4));
    assert_eq!(input.has_metal_chassis, Some(true));
}

#[test]
fn explicit_policy_keeps_values_that_look_like_sentinels() {
    let spec = lookup("dell xps 13").unwrap();
    let mut input = sentinel_input("dell xps 13");
    let before = input.clone();
    merge_defaults(&mut input, &spec, MergePolicy::Explicit);
    assert_eq!(input, before);
}

#[test]
fn legacy_policy_overwrites_sentinels() {
    let spec = lookup("dell xps 13").unwrap();
    let mut input = sentinel_input("dell xps 13");
    merge_defaults(&mut input, &spec, MergePolicy::LegacySentinel);
    assert_eq!(input.device_type, Some(DeviceType::Laptop));
    assert_eq!(input.brand.as_deref(), Some("Dell"));
    assert_eq!(input.launch_year, Some(2021));
    assert_eq!(input.weight_g, Some(1200.0));
    assert_eq!(input.screen_size_in, Some(13.4));
    assert_eq!(input.has_metal_chassis, Some(true));
    // never merged
    assert_eq!(input.age_years, Some(3.0));
    assert_eq!(input.condition, Some(Condition::Damaged));
    assert!(input.is_refurbished);
}

#[rstest]
#[case::weight(
    |i: &mut DeviceInput| i.weight_g = Some(999.0),
    |i: &DeviceInput| i.weight_g == Some(999.0)
)]
#[case::year(
    |i: &mut DeviceInput| i.launch_year = Some(2015),
    |i: &DeviceInput| i.launch_year == Some(2015)
)]
#[case::brand(
    |i: &mut DeviceInput| i.brand = Some("Framework".into()),
    |i: &DeviceInput| i.brand.as_deref() == Some("Framework")
)]
#[case::screen(
    |i: &mut DeviceInput| i.screen_size_in = Some(12.5),
    |i: &DeviceInput| i.screen_size_in == Some(12.5)
)]
fn legacy_policy_keeps_non_sentinel_values(
    #[case] tweak: fn(&mut DeviceInput),
    #[case] kept: fn(&DeviceInput) -> bool,
) {
    let spec = lookup("dell xps 13").unwrap();
    let mut input = sentinel_input("dell xps 13");
    tweak(&mut input);
    merge_defaults(&mut input, &spec, MergePolicy::LegacySentinel);
    assert!(kept(&input), "{input:?}");
    // the untouched sentinels still get replaced
    assert_eq!(input.device_type, Some(DeviceType::Laptop));
}

#[test]
fn legacy_brand_sentinel_is_case_insensitive() {
    let spec = lookup("galaxy s21").unwrap();
    let mut input = sentinel_input("galaxy s21");
    input.brand = Some("APPLE".into());
    merge_defaults(&mut input, &spec, MergePolicy::LegacySentinel);
    assert_eq!(input.brand.as_deref(), Some("Samsung"));
}

#[rstest]
#[case::device_type(|i: &mut DeviceInput| i.device_type = None, "device_type")]
#[case::brand(|i: &mut DeviceInput| i.brand = Some("  ".into()), "brand")]
#[case::age(|i: &mut DeviceInput| i.age_years = None, "age_years")]
#[case::battery(|i: &mut DeviceInput| i.battery_type = None, "battery_type")]
fn resolve_reports_missing_field(#[case] tweak: fn(&mut DeviceInput), #[case] field: &str) {
    let mut input = sentinel_input("");
    tweak(&mut input);
    match resolve(input) {
        Err(EstimatorError::MissingField(f)) => assert_eq!(f, field),
        other => panic!("expected MissingField({field}), got {other:?}"),
    }
}

#[rstest]
#[case::negative_age(|i: &mut DeviceInput| i.age_years = Some(-1.0))]
#[case::nan_weight(|i: &mut DeviceInput| i.weight_g = Some(f64::NAN))]
#[case::negative_screen(|i: &mut DeviceInput| i.screen_size_in = Some(-0.5))]
fn resolve_rejects_out_of_range_numbers(#[case] tweak: fn(&mut DeviceInput)) {
    let mut input = sentinel_input("");
    tweak(&mut input);
    assert!(matches!(resolve(input), Err(EstimatorError::InvalidInput(_))));
}
