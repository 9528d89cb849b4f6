//! Request, response, and reference-table types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EstimatorError;

/// Device category. Wire names are the lowercase snake_case variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Smartphone,
    Laptop,
    Tablet,
    Desktop,
    Monitor,
    Charger,
    BatteryPack,
    Other,
}

impl DeviceType {
    pub const ALL: [DeviceType; 8] = [
        DeviceType::Smartphone,
        DeviceType::Laptop,
        DeviceType::Tablet,
        DeviceType::Desktop,
        DeviceType::Monitor,
        DeviceType::Charger,
        DeviceType::BatteryPack,
        DeviceType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::Smartphone => "smartphone",
            DeviceType::Laptop => "laptop",
            DeviceType::Tablet => "tablet",
            DeviceType::Desktop => "desktop",
            DeviceType::Monitor => "monitor",
            DeviceType::Charger => "charger",
            DeviceType::BatteryPack => "battery_pack",
            DeviceType::Other => "other",
        }
    }

    /// Chargers and battery packs, whose difficulty hinges on the cell.
    pub fn is_power_accessory(self) -> bool {
        matches!(self, DeviceType::Charger | DeviceType::BatteryPack)
    }

    /// Categories that may ship with a metal chassis.
    pub fn may_have_metal_chassis(self) -> bool {
        matches!(
            self,
            DeviceType::Laptop | DeviceType::Tablet | DeviceType::Desktop
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatteryType {
    #[serde(rename = "li-ion")]
    LiIon,
    #[serde(rename = "li-poly")]
    LiPoly,
    #[serde(rename = "none")]
    None,
}

impl BatteryType {
    pub const ALL: [BatteryType; 3] = [BatteryType::LiIon, BatteryType::LiPoly, BatteryType::None];

    pub fn as_str(self) -> &'static str {
        match self {
            BatteryType::LiIon => "li-ion",
            BatteryType::LiPoly => "li-poly",
            BatteryType::None => "none",
        }
    }

    pub fn is_present(self) -> bool {
        !matches!(self, BatteryType::None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    Working,
    NonWorking,
    Damaged,
}

impl Condition {
    pub const ALL: [Condition; 3] = [Condition::Working, Condition::NonWorking, Condition::Damaged];

    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Working => "working",
            Condition::NonWorking => "non-working",
            Condition::Damaged => "damaged",
        }
    }
}

macro_rules! wire_enum_impls {
    ($ty:ty, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = EstimatorError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| {
                        EstimatorError::InvalidInput(format!("unknown {} '{}'", $what, s))
                    })
            }
        }
    };
}

wire_enum_impls!(DeviceType, "device_type");
wire_enum_impls!(BatteryType, "battery_type");
wire_enum_impls!(Condition, "condition");

/// Partial hardware specification from the device reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub device_type: DeviceType,
    pub brand: String,
    pub launch_year: i32,
    pub weight_g: f64,
    pub battery_type: BatteryType,
    /// 0.0 means the device has no screen.
    pub screen_size_in: f64,
    pub has_metal_chassis: bool,
}

/// A prediction request.
///
/// Every attribute the reference table can supply is optional, so "left
/// unset" is distinguishable from "explicitly set". `age_years` and
/// `condition` must still be present once the request is resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceInput {
    pub device_model: Option<String>,
    pub device_type: Option<DeviceType>,
    pub brand: Option<String>,
    pub launch_year: Option<i32>,
    pub age_years: Option<f64>,
    pub weight_g: Option<f64>,
    pub battery_type: Option<BatteryType>,
    pub condition: Option<Condition>,
    pub is_refurbished: bool,
    pub has_metal_chassis: Option<bool>,
    pub screen_size_in: Option<f64>,
}

impl DeviceInput {
    /// The model name to look up, if any. Blank strings count as absent.
    pub fn model_query(&self) -> Option<&str> {
        self.device_model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// A request with every field concrete, as fed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedDevice {
    pub device_model: String,
    pub device_type: DeviceType,
    pub brand: String,
    pub launch_year: i32,
    pub age_years: f64,
    pub weight_g: f64,
    pub battery_type: BatteryType,
    pub condition: Condition,
    pub is_refurbished: bool,
    pub has_metal_chassis: bool,
    pub screen_size_in: f64,
}

impl ResolvedDevice {
    pub fn to_feature_row(&self) -> ewaste_traits::FeatureRow {
        ewaste_traits::FeatureRow {
            device_type: self.device_type.as_str().to_string(),
            brand: self.brand.clone(),
            launch_year: self.launch_year,
            age_years: self.age_years,
            weight_g: self.weight_g,
            battery_type: self.battery_type.as_str().to_string(),
            condition: self.condition.as_str().to_string(),
            is_refurbished: self.is_refurbished,
            has_metal_chassis: self.has_metal_chassis,
            screen_size_in: self.screen_size_in,
        }
    }
}

/// Estimated recoverable materials and risk scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub copper_g: f64,
    pub gold_mg: f64,
    pub plastic_g: f64,
    pub lithium_g: f64,
    /// 0..=100
    pub recycling_difficulty: f64,
    /// 0..=100
    pub environmental_risk: f64,
}

impl PredictionResult {
    /// Clamp raw model outputs into their physical ranges.
    ///
    /// Materials are floored at zero and scores bounded to `[0, 100]`.
    /// NaN maps to the lower bound.
    pub fn from_raw(raw: ewaste_traits::Targets) -> Self {
        Self {
            copper_g: clamp_non_negative(raw[0]),
            gold_mg: clamp_non_negative(raw[1]),
            plastic_g: clamp_non_negative(raw[2]),
            lithium_g: clamp_non_negative(raw[3]),
            recycling_difficulty: clamp_score(raw[4]),
            environmental_risk: clamp_score(raw[5]),
        }
    }
}

#[inline]
fn clamp_non_negative(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.max(0.0) }
}

#[inline]
fn clamp_score(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 100.0) }
}

/// Response body of a successful prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub input: ResolvedDevice,
    pub prediction: PredictionResult,
    pub device_found_in_db: bool,
}

/// One synthetic training row: device attributes plus regression targets.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    pub device: ResolvedDevice,
    pub targets: PredictionResult,
}

impl TrainingExample {
    pub fn target_vector(&self) -> ewaste_traits::Targets {
        let t = &self.targets;
        [
            t.copper_g,
            t.gold_mg,
            t.plastic_g,
            t.lithium_g,
            t.recycling_difficulty,
            t.environmental_risk,
        ]
    }
}
