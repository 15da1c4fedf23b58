//! Loading pipeline: finds data files, deserializes them, validates them
//! into engine types.
//!
//! A data directory may hold up to three files, each optional and each in
//! any one of RON, TOML, or JSON:
//!
//! - `page.*`: a [`PageConfig`] (partial files fill in defaults).
//! - `catalog.*`: a list of `{ key, profile }` replacing the built-in catalog.
//! - `scenarios.*`: an ordered scenario list replacing the built-in one.
//!
//! TOML lists live under a top-level `machines` or `scenarios` array.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use orbitcycle_core::catalog::{Catalog, CatalogBuilder, CatalogError};
use orbitcycle_core::config::{ConfigError, PageConfig};
use orbitcycle_core::document::{Document, Viewport};
use orbitcycle_core::id::MachineKey;
use orbitcycle_core::page::Page;
use orbitcycle_core::scenario::{Scenario, ScenarioCycle, ScenarioOutputs};

use crate::schema::{CatalogEntryData, ScenarioData};

// ===========================================================================
// Errors
// ===========================================================================

/// Everything that can go wrong turning a data directory into [`PageData`].
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    #[error("{file}: extension is not one of ron, toml, json")]
    UnsupportedFormat { file: PathBuf },

    /// `page.ron` next to `page.json`, say.
    #[error("ambiguous data file: both {a} and {b} exist")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unknown machine key '{key}' in {file}")]
    UnknownMachine { file: PathBuf, key: String },

    /// A catalog key or scenario id appears twice.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    #[error("invalid catalog in {file}: {source}")]
    Catalog {
        file: PathBuf,
        #[source]
        source: CatalogError,
    },

    #[error("invalid page config in {file}: {source}")]
    Config {
        file: PathBuf,
        #[source]
        source: ConfigError,
    },

    /// A value that parsed but makes no sense to the engine.
    #[error("invalid data in {file}: {detail}")]
    Invalid { file: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats
// ===========================================================================

/// On-disk encodings a data file may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Search order when several encodings could exist.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

/// The format implied by `path`'s extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(Format::from_extension)
        .ok_or_else(|| DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        })
}

/// Locate `<base_name>.{ron,toml,json}` in `dir`.
///
/// At most one encoding may be present; two is a
/// [`DataLoadError::ConflictingFormats`].
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .into_iter()
        .map(|f| dir.join(format!("{base_name}.{}", f.extension())))
        .filter(|p| p.is_file());
    let first = present.next();
    if let (Some(a), Some(b)) = (&first, present.next()) {
        return Err(DataLoadError::ConflictingFormats { a: a.clone(), b });
    }
    Ok(first)
}

/// [`find_data_file`] for files the caller cannot do without.
pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    match find_data_file(dir, base_name)? {
        Some(path) => Ok(path),
        None => Err(DataLoadError::MissingRequired {
            file: base_name.to_string(),
            dir: dir.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

/// Parse the whole of `path` as a `T`.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let text = std::fs::read_to_string(path)?;
    match format {
        Format::Ron => ron::from_str(&text).map_err(|e| parse_error(path, e)),
        Format::Toml => toml::from_str(&text).map_err(|e| parse_error(path, e)),
        Format::Json => serde_json::from_str(&text).map_err(|e| parse_error(path, e)),
    }
}

/// Parse a list. TOML has no top-level arrays, so there the list sits
/// under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if detect_format(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let mut table: toml::Table = deserialize_file(path)?;
    let Some(list) = table.remove(toml_key) else {
        return Err(parse_error(path, format!("no `{toml_key}` array")));
    };
    list.try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ===========================================================================
// Validation into engine types
// ===========================================================================

/// Build a catalog from file entries. Keys must be known, unique, and cover
/// all five machines.
pub fn build_catalog(entries: Vec<CatalogEntryData>, file: &Path) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for entry in entries {
        let key: MachineKey = entry
            .key
            .parse()
            .map_err(|_| DataLoadError::UnknownMachine {
                file: file.to_path_buf(),
                key: entry.key.clone(),
            })?;
        builder.register(key, entry.profile).map_err(|e| match e {
            CatalogError::DuplicateKey(k) => DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: k.to_string(),
            },
            other => DataLoadError::Catalog {
                file: file.to_path_buf(),
                source: other,
            },
        })?;
    }
    builder.build().map_err(|source| DataLoadError::Catalog {
        file: file.to_path_buf(),
        source,
    })
}

/// Build the scenario cycle. The list must be non-empty with unique ids
/// and finite, non-negative rates that fit in a `Fixed64`.
pub fn build_scenarios(list: Vec<ScenarioData>, file: &Path) -> Result<ScenarioCycle, DataLoadError> {
    let mut seen = HashSet::new();
    let mut scenarios = Vec::with_capacity(list.len());
    for data in list {
        if !seen.insert(data.id.clone()) {
            return Err(DataLoadError::DuplicateName {
                file: file.to_path_buf(),
                name: data.id,
            });
        }
        if let Some((rate, value)) = data.outputs.invalid_rate() {
            return Err(DataLoadError::Invalid {
                file: file.to_path_buf(),
                detail: format!("scenario '{}' has invalid {rate} rate {value}", data.id),
            });
        }
        let o = data.outputs;
        let Some(outputs) = ScenarioOutputs::try_new(o.water, o.tools, o.fuel, o.shield) else {
            return Err(DataLoadError::Invalid {
                file: file.to_path_buf(),
                detail: format!("scenario '{}' has a rate too large to represent", data.id),
            });
        };
        scenarios.push(Scenario {
            id: data.id,
            title: data.title,
            description: data.description,
            outputs,
        });
    }
    ScenarioCycle::new(scenarios).ok_or_else(|| DataLoadError::Invalid {
        file: file.to_path_buf(),
        detail: "scenario list is empty".to_string(),
    })
}

// ===========================================================================
// Directory loading
// ===========================================================================

/// Everything a page needs from a data directory.
#[derive(Debug, Clone)]
pub struct PageData {
    pub config: PageConfig,
    pub catalog: Catalog,
    pub scenarios: ScenarioCycle,
}

impl Default for PageData {
    fn default() -> Self {
        Self {
            config: PageConfig::default(),
            catalog: Catalog::builtin(),
            scenarios: ScenarioCycle::builtin(),
        }
    }
}

impl PageData {
    /// Build a page over `doc` from this data.
    pub fn into_page(self, doc: Document, viewport: Viewport) -> Page {
        Page::with_data(doc, viewport, self.config, self.catalog, self.scenarios)
    }
}

/// Load `page.*`, or the defaults when absent.
pub fn load_config(dir: &Path) -> Result<PageConfig, DataLoadError> {
    let Some(path) = find_data_file(dir, "page")? else {
        return Ok(PageConfig::default());
    };
    let config: PageConfig = deserialize_file(&path)?;
    if let Err(source) = config.validate() {
        warn!(file = %path.display(), error = %source, "page config rejected");
        return Err(DataLoadError::Config { file: path, source });
    }
    debug!(file = %path.display(), "page config loaded");
    Ok(config)
}

/// Load `catalog.*`, or the built-in catalog when absent.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let Some(path) = find_data_file(dir, "catalog")? else {
        return Ok(Catalog::builtin());
    };
    let entries: Vec<CatalogEntryData> = deserialize_list(&path, "machines")?;
    let catalog = build_catalog(entries, &path)?;
    debug!(file = %path.display(), "catalog loaded");
    Ok(catalog)
}

/// Load `scenarios.*`, or the built-in scenarios when absent.
pub fn load_scenarios(dir: &Path) -> Result<ScenarioCycle, DataLoadError> {
    let Some(path) = find_data_file(dir, "scenarios")? else {
        return Ok(ScenarioCycle::builtin());
    };
    let list: Vec<ScenarioData> = deserialize_list(&path, "scenarios")?;
    let cycle = build_scenarios(list, &path)?;
    debug!(file = %path.display(), count = cycle.len(), "scenarios loaded");
    Ok(cycle)
}

/// Load every optional page data file from `dir`.
pub fn load_page_data(dir: &Path) -> Result<PageData, DataLoadError> {
    Ok(PageData {
        config: load_config(dir)?,
        catalog: load_catalog(dir)?,
        scenarios: load_scenarios(dir)?,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
