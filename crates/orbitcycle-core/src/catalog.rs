//! Machine catalog: immutable profiles for the five machine concepts.
//!
//! The catalog is frozen at construction. [`Catalog::builtin`] holds the
//! content shipped with the page; [`CatalogBuilder`] assembles a
//! replacement (e.g. from a data file) and refuses to freeze until every
//! machine key has a valid profile.

use serde::{Deserialize, Serialize};

use crate::id::MachineKey;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while assembling a catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("machine '{0}' registered twice")]
    DuplicateKey(MachineKey),
    #[error("machine '{0}' has no profile")]
    MissingKey(MachineKey),
    #[error("machine '{key}' has an empty {list} list")]
    EmptyList { key: MachineKey, list: &'static str },
    #[error("machine '{key}' has a blank {field}")]
    BlankField { key: MachineKey, field: &'static str },
}

// ---------------------------------------------------------------------------
// Profile types
// ---------------------------------------------------------------------------

/// The five technical specifications shown for every machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specifications {
    pub accuracy: String,
    pub power: String,
    pub size: String,
    pub temperature: String,
    pub rate: String,
}

impl Specifications {
    /// Display labels paired with values, in spec-grid order.
    pub fn labeled(&self) -> [(&'static str, &str); 5] {
        [
            ("Accuracy", self.accuracy.as_str()),
            ("Power", self.power.as_str()),
            ("Size", self.size.as_str()),
            ("Temperature", self.temperature.as_str()),
            ("Processing Rate", self.rate.as_str()),
        ]
    }
}

/// Everything the detail modal shows about one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineProfile {
    pub name: String,
    pub subtitle: String,
    pub description: String,
    pub features: Vec<String>,
    pub specifications: Specifications,
    pub advantages: Vec<String>,
    pub limitations: Vec<String>,
}

impl MachineProfile {
    /// Check the profile is presentable: a name and non-empty lists.
    pub fn validate(&self, key: MachineKey) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::BlankField { key, field: "name" });
        }
        for (field, value) in self.specifications.labeled() {
            if value.trim().is_empty() {
                return Err(CatalogError::BlankField { key, field });
            }
        }
        let lists = [
            ("features", &self.features),
            ("advantages", &self.advantages),
            ("limitations", &self.limitations),
        ];
        for (list, items) in lists {
            if items.is_empty() {
                return Err(CatalogError::EmptyList { key, list });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Frozen lookup from machine key to profile. Always complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    profiles: [MachineProfile; MachineKey::COUNT],
}

impl Catalog {
    /// The profile for a key. Infallible: a catalog is complete by construction.
    pub fn get(&self, key: MachineKey) -> &MachineProfile {
        &self.profiles[key.index()]
    }

    /// Look up by attribute spelling (`data-machine`). Unknown keys yield `None`.
    pub fn lookup(&self, key: &str) -> Option<&MachineProfile> {
        key.parse::<MachineKey>().ok().map(|k| self.get(k))
    }

    /// Iterate `(key, profile)` in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (MachineKey, &MachineProfile)> {
        MachineKey::ALL.into_iter().zip(self.profiles.iter())
    }

    /// The catalog shipped with the page.
    pub fn builtin() -> Self {
        Self {
            profiles: [
                builtin_ai(),
                builtin_refab(),
                builtin_oscar(),
                builtin_hmc(),
                builtin_facm(),
            ],
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Assembles a [`Catalog`] one profile at a time.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    slots: [Option<MachineProfile>; MachineKey::COUNT],
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile. Each key may be registered once.
    pub fn register(
        &mut self,
        key: MachineKey,
        profile: MachineProfile,
    ) -> Result<&mut Self, CatalogError> {
        profile.validate(key)?;
        let slot = &mut self.slots[key.index()];
        if slot.is_some() {
            return Err(CatalogError::DuplicateKey(key));
        }
        *slot = Some(profile);
        Ok(self)
    }

    /// Freeze the catalog. Fails if any key is still missing.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if let Some(missing) = MachineKey::ALL
            .into_iter()
            .find(|k| self.slots[k.index()].is_none())
        {
            return Err(CatalogError::MissingKey(missing));
        }
        let [Some(ai), Some(refab), Some(oscar), Some(hmc), Some(facm)] = self.slots else {
            return Err(CatalogError::MissingKey(MachineKey::Ai));
        };
        Ok(Catalog {
            profiles: [ai, refab, oscar, hmc, facm],
        })
    }
}

// ---------------------------------------------------------------------------
// Built-in content
// ---------------------------------------------------------------------------

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn profile(
    header: [&str; 3],
    features: &[&str],
    specs: [&str; 5],
    advantages: &[&str],
    limitations: &[&str],
) -> MachineProfile {
    let [name, subtitle, description] = header;
    let [accuracy, power, size, temperature, rate] = specs;
    MachineProfile {
        name: name.to_string(),
        subtitle: subtitle.to_string(),
        description: description.to_string(),
        features: strings(features),
        specifications: Specifications {
            accuracy: accuracy.to_string(),
            power: power.to_string(),
            size: size.to_string(),
            temperature: temperature.to_string(),
            rate: rate.to_string(),
        },
        advantages: strings(advantages),
        limitations: strings(limitations),
    }
}

fn builtin_ai() -> MachineProfile {
    profile(
        [
            "AI Sorting Machine",
            "Hyperspectral Vision System",
            "Advanced robotic arms equipped with hyperspectral cameras for precise waste \
             identification and sorting with 99% accuracy.",
        ],
        &[
            "Hyperspectral cameras with 200+ bands (vs human 3)",
            "99% material classification accuracy",
            "Detects invisible chemical signatures",
            "Identifies contaminated and degraded waste",
            "Separates plastics, metals, fabrics automatically",
        ],
        ["99%", "0.5 kW", "Desktop-sized unit", "25°C", "50 items/minute"],
        &[
            "Highest accuracy in material identification",
            "Low power consumption",
            "Compact design suitable for space",
            "Real-time chemical analysis capability",
        ],
        &[
            "Requires clean optical surfaces",
            "Cannot process heavily contaminated items",
            "Limited to surface analysis only",
        ],
    )
}

fn builtin_refab() -> MachineProfile {
    profile(
        [
            "Refabricator",
            "3D Printing & Plastic Recycling",
            "Mini-fridge sized device that shreds and melts plastic waste into 3D printing \
             filament for tool fabrication.",
        ],
        &[
            "Integrated shredding and melting system",
            "Converts waste to 3D printer filament",
            "Closed-loop recycling capability",
            "Fabricates tools and daily-use items",
            "Space-tested technology on ISS",
        ],
        [
            "85%",
            "0.3 kW",
            "Mini-fridge sized (60cm³)",
            "150°C",
            "2 kg plastic/hour",
        ],
        &[
            "Proven space technology (tested on ISS)",
            "Low power requirements",
            "Compact and lightweight design",
            "Enables on-demand tool manufacturing",
        ],
        &[
            "Works only on thermoplastics",
            "Filament quality degrades after repeated cycles",
            "Cannot process mixed material waste",
            "Limited to plastic materials only",
        ],
    )
}

fn builtin_oscar() -> MachineProfile {
    profile(
        [
            "OSCAR",
            "Orbital Syngas/Commodity Augmentation Reactor",
            "High-temperature pyrolysis system converting mixed waste into syngas for fuel \
             and propellant production.",
        ],
        &[
            "Pyrolysis at 800-1200°C temperatures",
            "Converts mixed waste to syngas (H₂, CO, CO₂, CH₄)",
            "Produces fuel cell electricity",
            "Generates rocket propellant components",
            "Enables water recovery from waste",
        ],
        [
            "90%",
            "2.0 kW",
            "Large cabinet (2m³)",
            "800-1200°C",
            "5 kg waste/hour",
        ],
        &[
            "Handles mixed waste streams",
            "Produces valuable propellant components",
            "High energy recovery potential",
            "Can process organic and inorganic waste",
        ],
        &[
            "High energy demand for operation",
            "Requires extensive cooling systems",
            "Complex safety protocols needed",
            "Produces some toxic intermediates",
        ],
    )
}

fn builtin_hmc() -> MachineProfile {
    profile(
        [
            "HMC",
            "Heat Melt Compactor",
            "Thermal compaction system creating sterile tiles for radiation shielding while \
             recovering water.",
        ],
        &[
            "Thermal compaction at 150°C",
            "Creates odor-free waste tiles",
            "Water recovery up to 100ml/kg waste",
            "Radiation shielding material production",
            "Complete sterilization capability",
        ],
        [
            "95%",
            "1.0 kW",
            "Washing machine sized (1.5m³)",
            "150°C",
            "10 kg waste/cycle",
        ],
        &[
            "Excellent volume reduction (87.5%)",
            "Produces useful radiation shielding",
            "Water recovery capability",
            "Complete sterilization of waste",
        ],
        &[
            "Power-intensive operation (1 kW per cycle)",
            "Multi-hour processing time",
            "Cannot separate materials",
            "Limited to compactable waste types",
        ],
    )
}

fn builtin_facm() -> MachineProfile {
    profile(
        [
            "FACM",
            "Fully Automatic",
            "Melting System Of Metals To Form Essential Metal Parts",
        ],
        &[
            "DC Melting Furnace",
            "Titanium Pipe For Passing Molten Metal",
            "Transfer Pipe Covered With Thermal Insulation",
            "Ingot Mold Pre-Heated To Avoid Slack",
            "Robotic Arm Will Shift The Mold",
        ],
        [
            "95%",
            "0.3 kW",
            "Mid Washing machine sized (1.3 m³)",
            "800°C",
            "1 kg waste/cycle",
        ],
        &[
            "DC Furnace Allowing Less Maintenance",
            "Compact Build Allowing Smoother Process",
            "Integrated Manufacturing System",
            "Metal Recovering System",
        ],
        &[
            "High Power Consuming Process",
            "High Temperature Requirements",
            "Compact Build Restricting To Less Payload Acceptance",
            "Only Metals Are Recyclable",
        ],
    )
}
