//! Device reference table and fuzzy model lookup.
//!
//! The table is an ordered slice; substring lookup is first-match in that
//! order, so the order is part of the lookup contract.

use crate::types::{BatteryType, DeviceSpec, DeviceType};

/// A reference-table row. Keys are lowercase and trimmed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub key: &'static str,
    pub device_type: DeviceType,
    pub brand: &'static str,
    pub launch_year: i32,
    pub weight_g: f64,
    pub battery_type: BatteryType,
    pub screen_size_in: f64,
    pub has_metal_chassis: bool,
}

impl CatalogEntry {
    /// An owned copy; callers may mutate it freely.
    pub fn to_spec(&self) -> DeviceSpec {
        DeviceSpec {
            device_type: self.device_type,
            brand: self.brand.to_string(),
            launch_year: self.launch_year,
            weight_g: self.weight_g,
            battery_type: self.battery_type,
            screen_size_in: self.screen_size_in,
            has_metal_chassis: self.has_metal_chassis,
        }
    }
}

#[allow(clippy::too_many_arguments)]
const fn entry(
    key: &'static str,
    device_type: DeviceType,
    brand: &'static str,
    launch_year: i32,
    weight_g: f64,
    battery_type: BatteryType,
    screen_size_in: f64,
    has_metal_chassis: bool,
) -> CatalogEntry {
    CatalogEntry {
        key,
        device_type,
        brand,
        launch_year,
        weight_g,
        battery_type,
        screen_size_in,
        has_metal_chassis,
    }
}

use BatteryType::{LiIon, LiPoly};
use DeviceType::{Laptop, Smartphone, Tablet};

static ENTRIES: &[CatalogEntry] = &[
    // Apple
    entry("iphone 12", Smartphone, "Apple", 2020, 164.0, LiIon, 6.1, false),
    entry("iphone 13", Smartphone, "Apple", 2021, 174.0, LiIon, 6.1, false),
    entry("iphone 14", Smartphone, "Apple", 2022, 172.0, LiIon, 6.1, false),
    entry("macbook air m1", Laptop, "Apple", 2020, 1200.0, LiPoly, 13.3, true),
    entry("macbook pro 13", Laptop, "Apple", 2020, 1400.0, LiPoly, 13.3, true),
    entry("ipad pro", Tablet, "Apple", 2021, 466.0, LiIon, 12.9, true),
    // Samsung
    entry("galaxy s21", Smartphone, "Samsung", 2021, 169.0, LiIon, 6.2, false),
    entry("galaxy s20", Smartphone, "Samsung", 2020, 163.0, LiIon, 6.2, false),
    entry("galaxy s9", Smartphone, "Samsung", 2018, 189.0, LiIon, 5.8, false),
    entry("galaxy tab s7", Tablet, "Samsung", 2020, 498.0, LiIon, 11.0, true),
    // Dell
    entry("dell latitude 3520", Laptop, "Dell", 2021, 1500.0, LiIon, 15.6, true),
    entry("dell xps 13", Laptop, "Dell", 2021, 1200.0, LiIon, 13.4, true),
    entry("dell inspiron 15", Laptop, "Dell", 2020, 1800.0, LiIon, 15.6, false),
    // HP
    entry("hp pavilion 14", Laptop, "HP", 2017, 1300.0, LiIon, 14.0, false),
    entry("hp spectre x360", Laptop, "HP", 2021, 1350.0, LiIon, 13.3, true),
    // Lenovo
    entry("lenovo thinkpad x1", Laptop, "Lenovo", 2021, 1100.0, LiIon, 14.0, true),
    entry("lenovo yoga", Laptop, "Lenovo", 2020, 1400.0, LiIon, 14.0, true),
    // Other
    entry("google pixel 6", Smartphone, "Google", 2021, 207.0, LiIon, 6.4, false),
    entry("oneplus 9", Smartphone, "OnePlus", 2021, 192.0, LiIon, 6.55, false),
    entry("surface pro 8", Tablet, "Microsoft", 2021, 891.0, LiIon, 13.0, true),
];

/// The reference table in lookup order.
pub fn entries() -> &'static [CatalogEntry] {
    ENTRIES
}

/// Look up a free-text model name.
///
/// Exact (normalized) key match wins; otherwise the first entry, in table
/// order, where key and input contain one another. Blank input never matches.
pub fn lookup(model_name: &str) -> Option<DeviceSpec> {
    lookup_entry(model_name).map(CatalogEntry::to_spec)
}

/// Like [`lookup`], returning the matched table row itself.
pub fn lookup_entry(model_name: &str) -> Option<&'static CatalogEntry> {
    let normalized = model_name.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }
    if let Some(exact) = ENTRIES.iter().find(|e| e.key == normalized) {
        return Some(exact);
    }
    let hit = ENTRIES
        .iter()
        .find(|e| normalized.contains(e.key) || e.key.contains(normalized.as_str()));
    if let Some(e) = hit {
        tracing::debug!(query = %normalized, matched = e.key, "partial catalog match");
    }
    hit
}
