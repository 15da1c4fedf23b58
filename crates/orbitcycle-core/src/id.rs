use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;
use std::str::FromStr;

new_key_type! {
    /// Identifies an element in the page [`Document`](crate::document::Document).
    pub struct ElementId;

    /// Identifies a live decorative particle.
    pub struct ParticleId;

    /// Identifies an armed timer in the [`Scheduler`](crate::scheduler::Scheduler).
    pub struct TimerId;
}

// ---------------------------------------------------------------------------
// Machine keys
// ---------------------------------------------------------------------------

/// One of the five recycling machine concepts on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineKey {
    /// AI sorting machine.
    Ai,
    /// Refabricator.
    Refab,
    /// Orbital syngas reactor.
    Oscar,
    /// Heat melt compactor.
    Hmc,
    /// Fully automatic metal caster.
    Facm,
}

/// Error returned when an attribute string names no known machine or waste.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);

impl MachineKey {
    /// Number of machine keys.
    pub const COUNT: usize = 5;

    /// Every key in catalog order.
    pub const ALL: [MachineKey; Self::COUNT] = [
        MachineKey::Ai,
        MachineKey::Refab,
        MachineKey::Oscar,
        MachineKey::Hmc,
        MachineKey::Facm,
    ];

    /// The attribute spelling used in `data-machine` and element ids.
    pub fn as_str(self) -> &'static str {
        match self {
            MachineKey::Ai => "ai",
            MachineKey::Refab => "refab",
            MachineKey::Oscar => "oscar",
            MachineKey::Hmc => "hmc",
            MachineKey::Facm => "facm",
        }
    }

    /// Dense index for array-backed tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Inverse of [`MachineKey::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for MachineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MachineKey {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownKey(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Waste kinds
// ---------------------------------------------------------------------------

/// The material carried by a draggable waste item (`data-type`).
///
/// Any non-empty spelling is accepted; unrecognized ones are kept verbatim
/// in [`WasteKind::Other`] and simply never count as a high-efficiency match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteKind {
    Plastic,
    Metal,
    Paper,
    Fabric,
    Organic,
    Foam,
    Other(String),
}

impl WasteKind {
    /// Waste kinds with a stable numeric code (used by the FFI surface).
    pub const KNOWN: [WasteKind; 6] = [
        WasteKind::Plastic,
        WasteKind::Metal,
        WasteKind::Paper,
        WasteKind::Fabric,
        WasteKind::Organic,
        WasteKind::Foam,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            WasteKind::Plastic => "plastic",
            WasteKind::Metal => "metal",
            WasteKind::Paper => "paper",
            WasteKind::Fabric => "fabric",
            WasteKind::Organic => "organic",
            WasteKind::Foam => "foam",
            WasteKind::Other(s) => s,
        }
    }

    /// Parse a `data-type` value. Empty strings carry no waste.
    pub fn parse(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let known = Self::KNOWN.into_iter().find(|k| k.as_str() == s);
        Some(known.unwrap_or_else(|| WasteKind::Other(s.to_string())))
    }
}

impl fmt::Display for WasteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_key_round_trips_through_str() {
        for key in MachineKey::ALL {
            assert_eq!(key.as_str().parse::<MachineKey>(), Ok(key));
        }
        assert!("toaster".parse::<MachineKey>().is_err());
    }

    #[test]
    fn machine_key_index_is_dense() {
        for (i, key) in MachineKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), i);
            assert_eq!(MachineKey::from_index(i), Some(*key));
        }
        assert_eq!(MachineKey::from_index(MachineKey::COUNT), None);
    }

    #[test]
    fn waste_parse_keeps_unknown_spellings() {
        assert_eq!(WasteKind::parse("metal"), Some(WasteKind::Metal));
        assert_eq!(
            WasteKind::parse("glass"),
            Some(WasteKind::Other("glass".into()))
        );
        assert_eq!(WasteKind::parse(""), None);
    }

    #[test]
    fn machine_key_serde_uses_attribute_spelling() {
        let json = serde_json::to_string(&MachineKey::Oscar).unwrap();
        assert_eq!(json, "\"oscar\"");
    }
}
