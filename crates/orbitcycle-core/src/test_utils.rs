//! Shared test helpers for integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests and, via the `test-utils` feature, in
//! integration tests of this and dependent crates.

use crate::config::PageConfig;
use crate::document::Viewport;
use crate::fixed::{Fixed64, fixed64_to_f64};
use crate::id::{ElementId, MachineKey};
use crate::layout::standard_page;
use crate::page::Page;

// ===========================================================================
// Page fixtures
// ===========================================================================

/// An initialized standard page with the default configuration.
pub fn standard() -> Page {
    with_config(PageConfig::default())
}

/// An initialized standard page with `config`.
pub fn with_config(config: PageConfig) -> Page {
    let mut page = Page::new(standard_page(), Viewport::default(), config);
    page.initialize();
    page
}

// ===========================================================================
// Element lookup
// ===========================================================================

/// The element with `id`. Panics if absent.
pub fn element(page: &Page, id: &str) -> ElementId {
    page.document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("no element #{id}"))
}

/// The `.waste-item` whose `data-type` is `kind`. Panics if absent.
pub fn waste_item(page: &Page, kind: &str) -> ElementId {
    let doc = page.document();
    doc.query_class("waste-item")
        .into_iter()
        .find(|&i| doc.attr(i, "data-type") == Some(kind))
        .unwrap_or_else(|| panic!("no waste item {kind}"))
}

/// The `sim-<key>` drop target. Panics if absent.
pub fn sim_machine(page: &Page, key: MachineKey) -> ElementId {
    element(page, &format!("sim-{key}"))
}

/// Text of the machine's status element.
pub fn status_text(page: &Page, key: MachineKey) -> Option<String> {
    let doc = page.document();
    let machine = doc.get_element_by_id(&format!("sim-{key}"))?;
    let status = doc.find_in(machine, "machine-status")?;
    doc.text(status).map(str::to_owned)
}

/// Text of the element with `id`.
pub fn text(page: &Page, id: &str) -> Option<String> {
    page.document().text_of(id).map(str::to_owned)
}

// ===========================================================================
// Actions
// ===========================================================================

/// Drag the `kind` waste item onto machine `key` and release.
pub fn drop_waste(page: &mut Page, kind: &str, key: MachineKey) -> bool {
    let item = waste_item(page, kind);
    let machine = sim_machine(page, key);
    page.drag_and_drop(item, machine)
}

/// Advance in frame-sized steps up to `total` milliseconds.
pub fn run_for(page: &mut Page, total: u64) {
    let step = page.config().frame_interval_ms.max(1);
    let mut elapsed = 0;
    while elapsed < total {
        let dt = step.min(total - elapsed);
        page.advance(dt);
        elapsed += dt;
    }
}

// ===========================================================================
// Fixed-point helpers
// ===========================================================================

pub fn approx(v: Fixed64, expected: f64) -> bool {
    (fixed64_to_f64(v) - expected).abs() < 1e-6
}
