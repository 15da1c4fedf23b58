//! Serde data file structs for page content overrides.
//!
//! These structs define the on-disk format for the machine catalog and the
//! scenario list. They are deserialized from RON, JSON, or TOML data files
//! and then validated into engine types by the loader.

use serde::Deserialize;

use orbitcycle_core::catalog::MachineProfile;

// ===========================================================================
// Catalog
// ===========================================================================

/// One machine profile in a catalog file. `key` is the `data-machine`
/// spelling (`ai`, `refab`, `oscar`, `hmc`, `facm`).
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntryData {
    pub key: String,
    pub profile: MachineProfile,
}

// ===========================================================================
// Scenarios
// ===========================================================================

/// A scenario in a data file. Rates are plain numbers; the loader converts
/// them to fixed-point after checking they are finite and non-negative.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub outputs: OutputsData,
}

/// Base output rates of a scenario.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OutputsData {
    pub water: f64,
    pub tools: u32,
    pub fuel: f64,
    pub shield: f64,
}

impl OutputsData {
    /// The first rate that is negative or not finite, by name.
    pub fn invalid_rate(&self) -> Option<(&'static str, f64)> {
        [("water", self.water), ("fuel", self.fuel), ("shield", self.shield)]
            .into_iter()
            .find(|&(_, v)| !v.is_finite() || v < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entry_nests_profile() {
        let json = r#"{
            "key": "ai",
            "profile": {
                "name": "AI Sorter",
                "subtitle": "Sorting",
                "description": "Sorts waste.",
                "features": ["vision"],
                "specifications": {
                    "accuracy": "99%", "power": "1 kW", "size": "1 m",
                    "temperature": "20 C", "rate": "5 kg/h"
                },
                "advantages": ["fast"],
                "limitations": ["heavy"]
            }
        }"#;
        let entry: CatalogEntryData = serde_json::from_str(json).unwrap();
        assert_eq!(entry.key, "ai");
        assert_eq!(entry.profile.name, "AI Sorter");
        assert_eq!(entry.profile.specifications.rate, "5 kg/h");
    }

    #[test]
    fn scenario_description_defaults_empty() {
        let s: ScenarioData = ron::from_str(
            r#"(id: "x", title: "X", outputs: (water: 1.0, tools: 2, fuel: 0.5, shield: 0.1))"#,
        )
        .unwrap();
        assert_eq!(s.description, "");
        assert_eq!(s.outputs.tools, 2);
    }

    #[test]
    fn invalid_rates_are_named() {
        let ok = OutputsData {
            water: 1.0,
            tools: 0,
            fuel: 0.0,
            shield: 2.0,
        };
        assert_eq!(ok.invalid_rate(), None);
        let bad = OutputsData { fuel: -1.0, ..ok };
        assert_eq!(bad.invalid_rate(), Some(("fuel", -1.0)));
        let nan = OutputsData {
            shield: f64::NAN,
            ..ok
        };
        assert_eq!(nan.invalid_rate().map(|(n, _)| n), Some("shield"));
    }
}
