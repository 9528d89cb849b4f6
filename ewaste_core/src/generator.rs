//! Synthetic training data.
//!
//! Samples are drawn from hand-tuned per-category ranges and then shaped by
//! fixed multiplicative/additive heuristics. The constants are empirical;
//! changing any of them changes every model trained downstream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GeneratorCfg;
use crate::error::BuildError;
use crate::types::{
    BatteryType, Condition, DeviceType, PredictionResult, ResolvedDevice, TrainingExample,
};

/// Inclusive uniform sampling range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    fn sample(&self, rng: &mut impl Rng) -> f64 {
        if self.max <= self.min {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }
}

/// Per-category ranges for attributes and unadjusted targets.
#[derive(Debug, Clone, Copy)]
pub struct CategoryProfile {
    pub device_type: DeviceType,
    pub weight_g: Span,
    pub copper_g: Span,
    pub gold_mg: Span,
    pub plastic_g: Span,
    pub lithium_g: Span,
    /// A zero-width `0..0` span means "no screen".
    pub screen_in: Span,
    pub difficulty: Span,
    pub risk: Span,
}

impl CategoryProfile {
    pub fn has_screen(&self) -> bool {
        self.screen_in.max > 0.0
    }
}

const fn profile(
    device_type: DeviceType,
    spans: [(f64, f64); 8],
) -> CategoryProfile {
    CategoryProfile {
        device_type,
        weight_g: Span::new(spans[0].0, spans[0].1),
        copper_g: Span::new(spans[1].0, spans[1].1),
        gold_mg: Span::new(spans[2].0, spans[2].1),
        plastic_g: Span::new(spans[3].0, spans[3].1),
        lithium_g: Span::new(spans[4].0, spans[4].1),
        screen_in: Span::new(spans[5].0, spans[5].1),
        difficulty: Span::new(spans[6].0, spans[6].1),
        risk: Span::new(spans[7].0, spans[7].1),
    }
}

// spans: weight, copper, gold, plastic, lithium, screen, difficulty, risk
static PROFILES: [CategoryProfile; 8] = [
    profile(
        DeviceType::Smartphone,
        [
            (100.0, 250.0),
            (8.0, 20.0),
            (30.0, 60.0),
            (20.0, 50.0),
            (2.0, 5.0),
            (4.5, 7.0),
            (30.0, 45.0),
            (35.0, 50.0),
        ],
    ),
    profile(
        DeviceType::Laptop,
        [
            (1000.0, 2500.0),
            (200.0, 400.0),
            (150.0, 300.0),
            (200.0, 500.0),
            (25.0, 60.0),
            (11.0, 17.0),
            (50.0, 70.0),
            (45.0, 65.0),
        ],
    ),
    profile(
        DeviceType::Tablet,
        [
            (300.0, 800.0),
            (15.0, 40.0),
            (50.0, 120.0),
            (50.0, 150.0),
            (10.0, 30.0),
            (7.0, 13.0),
            (40.0, 60.0),
            (40.0, 60.0),
        ],
    ),
    profile(
        DeviceType::Desktop,
        [
            (5000.0, 15000.0),
            (800.0, 2000.0),
            (500.0, 2000.0),
            (1000.0, 3000.0),
            (0.0, 5.0),
            (0.0, 0.0),
            (70.0, 90.0),
            (60.0, 80.0),
        ],
    ),
    profile(
        DeviceType::Monitor,
        [
            (2000.0, 8000.0),
            (300.0, 1500.0),
            (200.0, 1000.0),
            (500.0, 2500.0),
            (0.0, 2.0),
            (15.0, 32.0),
            (60.0, 85.0),
            (55.0, 75.0),
        ],
    ),
    profile(
        DeviceType::Charger,
        [
            (50.0, 200.0),
            (1.0, 5.0),
            (0.1, 1.0),
            (20.0, 50.0),
            (0.0, 0.0),
            (0.0, 0.0),
            (5.0, 20.0),
            (3.0, 15.0),
        ],
    ),
    profile(
        DeviceType::BatteryPack,
        [
            (200.0, 1000.0),
            (5.0, 15.0),
            (0.3, 2.0),
            (50.0, 200.0),
            (50.0, 200.0),
            (0.0, 0.0),
            (50.0, 70.0),
            (70.0, 90.0),
        ],
    ),
    profile(
        DeviceType::Other,
        [
            (50.0, 500.0),
            (1.0, 100.0),
            (0.1, 100.0),
            (10.0, 200.0),
            (0.0, 10.0),
            (0.0, 0.0),
            (20.0, 80.0),
            (20.0, 80.0),
        ],
    ),
];

pub const BRANDS: [&str; 11] = [
    "Apple", "Samsung", "Dell", "HP", "Lenovo", "Microsoft", "Google", "OnePlus", "Sony", "LG",
    "Generic",
];

pub const LAUNCH_YEARS: (i32, i32) = (2010, 2023);
pub const MIN_AGE_YEARS: f64 = 0.5;
pub const MAX_AGE_YEARS: f64 = 15.0;

pub fn profiles() -> &'static [CategoryProfile; 8] {
    &PROFILES
}

pub fn profile_for(device_type: DeviceType) -> &'static CategoryProfile {
    // PROFILES is declared in DeviceType::ALL order
    let idx = DeviceType::ALL
        .iter()
        .position(|t| *t == device_type)
        .unwrap_or(DeviceType::ALL.len() - 1);
    &PROFILES[idx]
}

fn model_suffixes(device_type: DeviceType) -> &'static [&'static str] {
    match device_type {
        DeviceType::Smartphone => &["12", "13", "14", "S21", "S20", "S9", "Pixel 6", "9 Pro"],
        DeviceType::Laptop => &[
            "Latitude 3520",
            "XPS 13",
            "Pavilion 14",
            "ThinkPad X1",
            "MacBook Air M1",
            "Spectre x360",
        ],
        DeviceType::Tablet => &["iPad Pro", "Tab S7", "Surface Pro 8"],
        _ => &[],
    }
}

/// Target values as drawn from the category ranges, before any adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseQuantities {
    pub copper_g: f64,
    pub gold_mg: f64,
    pub plastic_g: f64,
    /// Already zero when the device has no battery.
    pub lithium_g: f64,
    pub difficulty: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSample {
    pub example: TrainingExample,
    pub base: BaseQuantities,
}

/// Apply the adjustment heuristics to a device's base quantities.
///
/// Uses the unrounded device attributes; the result is not rounded.
pub fn derive_targets(device: &ResolvedDevice, base: &BaseQuantities) -> PredictionResult {
    let mut copper = base.copper_g;
    let mut gold = base.gold_mg;
    let mut plastic = base.plastic_g;

    let weight_kg = device.weight_g / 1000.0;
    copper *= 0.8 + 0.4 * weight_kg;
    gold *= 0.9 + 0.2 * weight_kg;
    plastic *= 0.8 + 0.4 * weight_kg;

    let age_factor = 1.0 + (device.age_years / 20.0) * 0.3;
    copper *= age_factor;
    gold *= age_factor;

    match device.condition {
        Condition::Damaged => {
            copper *= 0.9;
            gold *= 0.95;
            plastic *= 0.85;
        }
        Condition::NonWorking => {
            copper *= 0.95;
            gold *= 0.98;
            plastic *= 0.9;
        }
        Condition::Working => {}
    }

    if device.has_metal_chassis {
        copper *= 1.2;
        gold *= 1.1;
    }

    let battery = device.battery_type.is_present();
    let lithium = if battery { base.lithium_g } else { 0.0 };

    let mut difficulty = base.difficulty;
    if device.device_type.is_power_accessory() {
        difficulty += if battery { 10.0 } else { -5.0 };
    }
    if device.condition == Condition::Damaged {
        difficulty += 10.0;
    }
    if device.age_years > 10.0 {
        difficulty += 5.0;
    }

    let mut risk = base.risk;
    if battery {
        risk += 15.0;
    }
    if lithium > 50.0 {
        risk += 10.0;
    }
    if device.condition == Condition::Damaged {
        risk += 5.0;
    }

    PredictionResult {
        copper_g: copper,
        gold_mg: gold,
        plastic_g: plastic,
        lithium_g: lithium,
        recycling_difficulty: difficulty.clamp(0.0, 100.0),
        environmental_risk: risk.clamp(0.0, 100.0),
    }
}

#[inline]
fn round_to(x: f64, decimals: i32) -> f64 {
    let p = 10f64.powi(decimals);
    (x * p).round() / p
}

/// Seeded, reproducible sample stream.
pub struct Generator {
    rng: StdRng,
    reference_year: i32,
    index: usize,
}

impl Generator {
    pub fn new(cfg: &GeneratorCfg) -> Result<Self, BuildError> {
        if cfg.reference_year <= LAUNCH_YEARS.0 {
            return Err(BuildError::InvalidConfig(
                "reference_year must be after the earliest launch year",
            ));
        }
        Ok(Self {
            rng: StdRng::seed_from_u64(cfg.seed),
            reference_year: cfg.reference_year,
            index: 0,
        })
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.random_range(0..items.len())]
    }

    pub fn next_sample(&mut self) -> SyntheticSample {
        let idx = self.index;
        self.index += 1;

        let profile = *self.pick(&PROFILES);
        let device_type = profile.device_type;
        let brand = *self.pick(&BRANDS);

        let launch_year = self.rng.random_range(LAUNCH_YEARS.0..=LAUNCH_YEARS.1);
        let max_age = MAX_AGE_YEARS
            .min(f64::from(self.reference_year - launch_year))
            .max(MIN_AGE_YEARS);
        let age_years = Span::new(MIN_AGE_YEARS, max_age).sample(&mut self.rng);
        let weight_g = profile.weight_g.sample(&mut self.rng);
        let battery_type = *self.pick(&BatteryType::ALL);
        let condition = *self.pick(&Condition::ALL);
        let is_refurbished = self.rng.random_bool(0.5);
        let has_metal_chassis =
            device_type.may_have_metal_chassis() && self.rng.random_bool(0.5);
        let screen_size_in = if profile.has_screen() {
            profile.screen_in.sample(&mut self.rng)
        } else {
            0.0
        };

        let copper_g = profile.copper_g.sample(&mut self.rng);
        let gold_mg = profile.gold_mg.sample(&mut self.rng);
        let plastic_g = profile.plastic_g.sample(&mut self.rng);
        let lithium_g = if battery_type.is_present() {
            profile.lithium_g.sample(&mut self.rng)
        } else {
            0.0
        };
        let difficulty = profile.difficulty.sample(&mut self.rng);
        let risk = profile.risk.sample(&mut self.rng);
        let base = BaseQuantities {
            copper_g,
            gold_mg,
            plastic_g,
            lithium_g,
            difficulty,
            risk,
        };

        let suffixes = model_suffixes(device_type);
        let device_model = if suffixes.is_empty() {
            format!("{brand} Model {}", idx % 100)
        } else {
            format!("{brand} {}", self.pick(suffixes))
        };

        let raw = ResolvedDevice {
            device_model,
            device_type,
            brand: brand.to_string(),
            launch_year,
            age_years,
            weight_g,
            battery_type,
            condition,
            is_refurbished,
            has_metal_chassis,
            screen_size_in,
        };
        let t = derive_targets(&raw, &base);

        let device = ResolvedDevice {
            age_years: round_to(raw.age_years, 1),
            weight_g: round_to(raw.weight_g, 1),
            screen_size_in: round_to(raw.screen_size_in, 1),
            ..raw
        };
        let targets = PredictionResult {
            copper_g: round_to(t.copper_g, 2),
            gold_mg: round_to(t.gold_mg, 2),
            plastic_g: round_to(t.plastic_g, 2),
            lithium_g: round_to(t.lithium_g, 2),
            recycling_difficulty: round_to(t.recycling_difficulty, 1),
            environmental_risk: round_to(t.environmental_risk, 1),
        };

        SyntheticSample {
            example: TrainingExample { device, targets },
            base,
        }
    }
}

impl Iterator for Generator {
    type Item = SyntheticSample;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_sample())
    }
}

/// Generate `cfg.samples` training examples.
pub fn generate(cfg: &GeneratorCfg) -> Result<Vec<TrainingExample>, BuildError> {
    let generator = Generator::new(cfg)?;
    let examples: Vec<TrainingExample> = generator
        .take(cfg.samples)
        .map(|s| s.example)
        .collect();
    tracing::info!(samples = examples.len(), seed = cfg.seed, "synthetic dataset generated");
    Ok(examples)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(condition: Condition, battery_type: BatteryType) -> ResolvedDevice {
        ResolvedDevice {
            device_model: String::new(),
            device_type: DeviceType::Charger,
            brand: "Generic".into(),
            launch_year: 2012,
            age_years: 11.0,
            weight_g: 1000.0,
            battery_type,
            condition,
            is_refurbished: false,
            has_metal_chassis: true,
            screen_size_in: 0.0,
        }
    }

    fn base() -> BaseQuantities {
        BaseQuantities {
            copper_g: 10.0,
            gold_mg: 10.0,
            plastic_g: 10.0,
            lithium_g: 60.0,
            difficulty: 95.0,
            risk: 50.0,
        }
    }

    #[test]
    fn multipliers_compose_in_order() {
        let t = derive_targets(&device(Condition::Damaged, BatteryType::LiIon), &base());
        // weight 1 kg, age 11 y, damaged, metal chassis
        let age = 1.0 + 11.0 / 20.0 * 0.3;
        assert!((t.copper_g - 10.0 * 1.2 * age * 0.9 * 1.2).abs() < 1e-9);
        assert!((t.gold_mg - 10.0 * 1.1 * age * 0.95 * 1.1).abs() < 1e-9);
        assert!((t.plastic_g - 10.0 * 1.2 * 0.85).abs() < 1e-9);
        assert_eq!(t.lithium_g, 60.0);
    }

    #[test]
    fn scores_are_adjusted_then_clamped() {
        let t = derive_targets(&device(Condition::Damaged, BatteryType::LiIon), &base());
        // 95 + 10 (accessory w/ battery) + 10 (damaged) + 5 (age) -> clamped
        assert_eq!(t.recycling_difficulty, 100.0);
        // 50 + 15 (battery) + 10 (lithium > 50) + 5 (damaged)
        assert_eq!(t.environmental_risk, 80.0);
    }

    #[test]
    fn accessory_without_battery_is_easier() {
        let t = derive_targets(&device(Condition::Working, BatteryType::None), &base());
        assert_eq!(t.lithium_g, 0.0);
        assert_eq!(t.recycling_difficulty, 95.0 - 5.0 + 5.0);
        assert_eq!(t.environmental_risk, 50.0);
    }

    #[test]
    fn profile_lookup_matches_category() {
        for t in DeviceType::ALL {
            assert_eq!(profile_for(t).device_type, t);
        }
    }
}
