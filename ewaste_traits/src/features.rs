/// Number of regression targets.
pub const TARGET_COUNT: usize = 6;

/// One model output per target, in [`TARGET_NAMES`] order.
pub type Targets = [f64; TARGET_COUNT];

/// Target column names, in output order.
pub const TARGET_NAMES: [&str; TARGET_COUNT] = [
    "copper_g",
    "gold_mg",
    "plastic_g",
    "lithium_g",
    "recycling_difficulty",
    "environmental_risk",
];

/// Feature column names, in the order the pipeline was trained on.
pub const FEATURE_NAMES: [&str; 10] = [
    "device_type",
    "brand",
    "launch_year",
    "age_years",
    "weight_g",
    "battery_type",
    "condition",
    "is_refurbished",
    "has_metal_chassis",
    "screen_size_in",
];

/// A single model input row.
///
/// Categorical features are carried as their wire strings so a model can
/// decide for itself how to treat values it never saw during fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub device_type: String,
    pub brand: String,
    pub launch_year: i32,
    pub age_years: f64,
    pub weight_g: f64,
    pub battery_type: String,
    pub condition: String,
    pub is_refurbished: bool,
    pub has_metal_chassis: bool,
    pub screen_size_in: f64,
}

impl FeatureRow {
    /// Numeric features in scaler column order. Booleans map to 0/1.
    pub fn numeric(&self) -> [f64; 6] {
        [
            f64::from(self.launch_year),
            self.age_years,
            self.weight_g,
            if self.is_refurbished { 1.0 } else { 0.0 },
            if self.has_metal_chassis { 1.0 } else { 0.0 },
            self.screen_size_in,
        ]
    }

    /// Categorical features in encoder column order.
    pub fn categorical(&self) -> [&str; 4] {
        [
            self.device_type.as_str(),
            self.brand.as_str(),
            self.battery_type.as_str(),
            self.condition.as_str(),
        ]
    }
}
