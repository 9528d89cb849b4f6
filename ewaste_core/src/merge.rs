//! Default-merge policy: fill request gaps from a matched reference entry,
//! then resolve the request into a fully concrete [`ResolvedDevice`].

use crate::error::EstimatorError;
use crate::types::{BatteryType, DeviceInput, DeviceSpec, DeviceType, ResolvedDevice};

/// What counts as "caller left this field unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Only absent fields are filled.
    #[default]
    Explicit,
    /// Absent fields and fields equal to the historical magic defaults are
    /// filled. Those defaults are iPhone 12 values, so a non-iPhone request
    /// that really means `weight_g = 164` cannot keep it under this policy.
    LegacySentinel,
}

/// Historical magic defaults recognized by [`MergePolicy::LegacySentinel`].
pub mod sentinel {
    use crate::types::{BatteryType, DeviceType};

    pub const DEVICE_TYPE: DeviceType = DeviceType::Smartphone;
    pub const BRAND: &str = "apple";
    pub const LAUNCH_YEAR: i32 = 2020;
    pub const WEIGHT_G: f64 = 164.0;
    pub const BATTERY_TYPE: BatteryType = BatteryType::LiIon;
    pub const SCREEN_SIZES_IN: [f64; 2] = [0.0, 6.1];
}

impl MergePolicy {
    fn is_unset<T>(self, value: &Option<T>, is_sentinel: impl FnOnce(&T) -> bool) -> bool {
        match (self, value) {
            (_, None) => true,
            (MergePolicy::Explicit, Some(_)) => false,
            (MergePolicy::LegacySentinel, Some(v)) => is_sentinel(v),
        }
    }
}

/// Overwrite every unset mergeable field of `input` with the value from `spec`.
///
/// `age_years`, `condition` and `is_refurbished` are never touched.
pub fn merge_defaults(input: &mut DeviceInput, spec: &DeviceSpec, policy: MergePolicy) {
    if policy.is_unset(&input.device_type, |t: &DeviceType| *t == sentinel::DEVICE_TYPE) {
        input.device_type = Some(spec.device_type);
    }
    if policy.is_unset(&input.brand, |b: &String| {
        b.trim().is_empty() || b.eq_ignore_ascii_case(sentinel::BRAND)
    }) {
        input.brand = Some(spec.brand.clone());
    }
    if policy.is_unset(&input.launch_year, |y: &i32| *y == sentinel::LAUNCH_YEAR) {
        input.launch_year = Some(spec.launch_year);
    }
    if policy.is_unset(&input.weight_g, |w: &f64| *w == sentinel::WEIGHT_G) {
        input.weight_g = Some(spec.weight_g);
    }
    if policy.is_unset(&input.battery_type, |b: &BatteryType| *b == sentinel::BATTERY_TYPE) {
        input.battery_type = Some(spec.battery_type);
    }
    if policy.is_unset(&input.screen_size_in, |s: &f64| {
        sentinel::SCREEN_SIZES_IN.contains(s)
    }) {
        input.screen_size_in = Some(spec.screen_size_in);
    }
    if policy.is_unset(&input.has_metal_chassis, |m: &bool| !*m) {
        input.has_metal_chassis = Some(spec.has_metal_chassis);
    }
}

/// Turn a (possibly merged) request into a concrete, validated device.
///
/// Required: device_type, brand, launch_year, age_years, weight_g,
/// battery_type, condition. `has_metal_chassis` defaults to false and
/// `screen_size_in` to 0.0.
pub fn resolve(input: DeviceInput) -> Result<ResolvedDevice, EstimatorError> {
    let device_model = input.model_query().unwrap_or_default().to_string();
    let device_type = input
        .device_type
        .ok_or(EstimatorError::MissingField("device_type"))?;
    let brand = input
        .brand
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .ok_or(EstimatorError::MissingField("brand"))?;
    let launch_year = input
        .launch_year
        .ok_or(EstimatorError::MissingField("launch_year"))?;
    let age_years = input
        .age_years
        .ok_or(EstimatorError::MissingField("age_years"))?;
    let weight_g = input
        .weight_g
        .ok_or(EstimatorError::MissingField("weight_g"))?;
    let battery_type = input
        .battery_type
        .ok_or(EstimatorError::MissingField("battery_type"))?;
    let condition = input
        .condition
        .ok_or(EstimatorError::MissingField("condition"))?;
    let has_metal_chassis = input.has_metal_chassis.unwrap_or(false);
    let screen_size_in = input.screen_size_in.unwrap_or(0.0);

    if !(weight_g.is_finite() && weight_g > 0.0) {
        return Err(EstimatorError::InvalidInput(format!(
            "weight_g must be a positive number, got {weight_g}"
        )));
    }
    if !(age_years.is_finite() && age_years >= 0.0) {
        return Err(EstimatorError::InvalidInput(format!(
            "age_years must be >= 0, got {age_years}"
        )));
    }
    if !(screen_size_in.is_finite() && screen_size_in >= 0.0) {
        return Err(EstimatorError::InvalidInput(format!(
            "screen_size_in must be >= 0, got {screen_size_in}"
        )));
    }

    Ok(ResolvedDevice {
        device_model,
        device_type,
        brand,
        launch_year,
        age_years,
        weight_g,
        battery_type,
        condition,
        is_refurbished: input.is_refurbished,
        has_metal_chassis,
        screen_size_in,
    })
}

impl From<ewaste_config::MergePolicy> for MergePolicy {
    fn from(p: ewaste_config::MergePolicy) -> Self {
        match p {
            ewaste_config::MergePolicy::Explicit => MergePolicy::Explicit,
            ewaste_config::MergePolicy::LegacySentinel => MergePolicy::LegacySentinel,
        }
    }
}
