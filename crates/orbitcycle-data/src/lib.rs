//! Data-file overrides for the showcase page: page config, machine catalog,
//! and scenario list, each in RON, TOML, or JSON.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, PageData, load_page_data};
