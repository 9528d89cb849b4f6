#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and dataset CSV parsing for the e-waste estimator.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; a missing config file means built-in defaults.
//! - The synthetic dataset CSV loader enforces the exact header row and
//!   reports parse failures with their 1-based file line.
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Column order of the synthetic dataset CSV.
pub const DATASET_HEADERS: [&str; 17] = [
    "device_model",
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
    "copper_g",
    "gold_mg",
    "plastic_g",
    "lithium_g",
    "recycling_difficulty",
    "environmental_risk",
];

/// One row of the synthetic dataset CSV.
///
/// Categorical columns stay as strings here; the core crate maps them to
/// its typed enums. Boolean columns accept `true/false`, `True/False`,
/// `1/0` and `yes/no`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub device_model: String,
    pub device_type: String,
    pub brand: String,
    pub launch_year: i32,
    pub age_years: f64,
    pub weight_g: f64,
    pub battery_type: String,
    pub condition: String,
    #[serde(deserialize_with = "de_flexible_bool")]
    pub is_refurbished: bool,
    #[serde(deserialize_with = "de_flexible_bool")]
    pub has_metal_chassis: bool,
    pub screen_size_in: f64,
    pub copper_g: f64,
    pub gold_mg: f64,
    pub plastic_g: f64,
    pub lithium_g: f64,
    pub recycling_difficulty: f64,
    pub environmental_risk: f64,
}

impl DatasetRow {
    /// Name of the first numeric column holding NaN or an infinity.
    #[must_use]
    pub fn non_finite_column(&self) -> Option<&'static str> {
        [
            ("age_years", self.age_years),
            ("weight_g", self.weight_g),
            ("screen_size_in", self.screen_size_in),
            ("copper_g", self.copper_g),
            ("gold_mg", self.gold_mg),
            ("plastic_g", self.plastic_g),
            ("lithium_g", self.lithium_g),
            ("recycling_difficulty", self.recycling_difficulty),
            ("environmental_risk", self.environmental_risk),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

fn de_flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Synthetic dataset CSV (written by `generate`, read by `train`)
    pub data: PathBuf,
    /// Fitted pipeline artifact (written by `train`, read by `serve`/`predict`)
    pub model: PathBuf,
    /// Front-end pages served next to the API
    pub static_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data/synthetic_ewaste.csv"),
            model: PathBuf::from("models/ewaste_estimator.json"),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorCfg {
    pub samples: usize,
    pub seed: u64,
    /// Year the synthetic devices are "collected" in; bounds age_years.
    pub reference_year: i32,
}

impl Default for GeneratorCfg {
    fn default() -> Self {
        Self {
            samples: 1000,
            seed: 42,
            reference_year: 2024,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrainingCfg {
    pub seed: u64,
    /// Fraction of rows held out for evaluation. Range: (0.0, 1.0).
    pub test_fraction: f64,
    /// Trees per target forest
    pub n_estimators: usize,
    /// Maximum tree depth; 0 means unlimited
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Fraction of features considered per split. Range: (0.0, 1.0].
    pub max_features: f64,
}

impl Default for TrainingCfg {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            n_estimators: 200,
            max_depth: 0,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 1.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub bind: String,
    /// Overridden by the PORT environment variable when it parses.
    pub port: u16,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Only absent request fields are filled from the device table.
    #[default]
    Explicit,
    /// Absent fields and fields holding the historical magic defaults are filled.
    LegacySentinel,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ServiceCfg {
    pub merge_policy: MergePolicy,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub paths: Paths,
    pub generator: GeneratorCfg,
    pub training: TrainingCfg,
    pub server: ServerCfg,
    pub service: ServiceCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_dataset_csv(path: &Path) -> eyre::Result<Vec<DatasetRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open dataset CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.trim().to_string()).collect();
    if actual != DATASET_HEADERS {
        eyre::bail!(
            "dataset CSV must have headers '{}', got: {}",
            DATASET_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<DatasetRow>().enumerate() {
        match rec {
            Ok(row) => {
                if let Some(col) = row.non_finite_column() {
                    eyre::bail!("invalid CSV row {}: {col} is not a finite number", idx + 2);
                }
                rows.push(row);
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    if rows.is_empty() {
        eyre::bail!("dataset CSV {:?} has no rows", path);
    }
    Ok(rows)
}

/// Write rows with the canonical header, creating parent directories.
pub fn write_dataset_csv(path: &Path, rows: &[DatasetRow]) -> eyre::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| eyre::eyre!("create directory {:?}: {}", parent, e))?;
    }
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create dataset CSV {:?}: {}", path, e))?;
    // serialize() writes the header from field names on the first row only
    if rows.is_empty() {
        wtr.write_record(DATASET_HEADERS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Generator
        if self.generator.samples == 0 {
            eyre::bail!("generator.samples must be >= 1");
        }
        if self.generator.reference_year <= 2010 {
            eyre::bail!("generator.reference_year must be > 2010");
        }

        // Training
        if !(self.training.test_fraction > 0.0 && self.training.test_fraction < 1.0) {
            eyre::bail!("training.test_fraction must be in (0.0, 1.0)");
        }
        if self.training.n_estimators == 0 {
            eyre::bail!("training.n_estimators must be >= 1");
        }
        if self.training.n_estimators > 10_000 {
            eyre::bail!("training.n_estimators is unreasonably large (>10000)");
        }
        if self.training.min_samples_split < 2 {
            eyre::bail!("training.min_samples_split must be >= 2");
        }
        if self.training.min_samples_leaf == 0 {
            eyre::bail!("training.min_samples_leaf must be >= 1");
        }
        if !(self.training.max_features > 0.0 && self.training.max_features <= 1.0) {
            eyre::bail!("training.max_features must be in (0.0, 1.0]");
        }

        // Server
        if self.server.bind.trim().is_empty() {
            eyre::bail!("server.bind must not be empty");
        }

        // Logging
        if let Some(rotation) = self.logging.rotation.as_deref()
            && !matches!(rotation, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Service: no extra validation; serde restricts to known policies

        Ok(())
    }
}
