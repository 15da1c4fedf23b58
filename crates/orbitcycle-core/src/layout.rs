//! The standard page: a document mirroring the shipped markup.
//!
//! Hosts without a real DOM (the wasm surface, tests, the headless demo)
//! start from this tree. Section heights give a page roughly 4800px tall.

use crate::catalog::Catalog;
use crate::document::Document;
use crate::id::{ElementId, MachineKey, WasteKind};

/// Section ids in document order, with `(offset_top, height)`.
pub const SECTIONS: [(&str, f64, f64); 5] = [
    ("home", 0.0, 900.0),
    ("machines", 900.0, 1400.0),
    ("simulation", 2300.0, 1100.0),
    ("impact", 3400.0, 800.0),
    ("contact", 4200.0, 600.0),
];

/// Height of the fixed navbar.
pub const NAVBAR_HEIGHT: f64 = 70.0;

/// Machines that accept drops in the simulation panel.
pub const SIM_MACHINES: [MachineKey; 4] = [
    MachineKey::Ai,
    MachineKey::Refab,
    MachineKey::Oscar,
    MachineKey::Hmc,
];

const HERO_STATS: [&str; 3] = ["2500", "95", "5"];
const IMPACT_METRICS: [&str; 4] = ["12000", "85", "340", "1500000"];

/// `data-width` of each machine's spec bars.
fn spec_widths(key: MachineKey) -> [&'static str; 3] {
    match key {
        MachineKey::Ai => ["95", "80", "70"],
        MachineKey::Refab => ["85", "75", "90"],
        MachineKey::Oscar => ["90", "65", "80"],
        MachineKey::Hmc => ["75", "70", "85"],
        MachineKey::Facm => ["80", "85", "60"],
    }
}

fn child(doc: &mut Document, parent: ElementId, tag: &str, class: &str) -> ElementId {
    let el = doc.append_new(parent, tag);
    if !class.is_empty() {
        doc.add_class(el, class);
    }
    el
}

fn child_with_id(doc: &mut Document, parent: ElementId, tag: &str, class: &str, id: &str) -> ElementId {
    let el = child(doc, parent, tag, class);
    doc.set_id(el, id);
    el
}

/// Build the standard page document.
pub fn standard_page() -> Document {
    let mut doc = Document::new();
    let body = doc.body();
    let catalog = Catalog::builtin();

    // Navbar
    let nav = child(&mut doc, body, "nav", "navbar");
    doc.set_layout(nav, 0.0, NAVBAR_HEIGHT);
    let menu = child_with_id(&mut doc, nav, "ul", "nav-menu", "nav-menu");
    for (id, _, _) in SECTIONS {
        let item = child(&mut doc, menu, "li", "");
        let link = child(&mut doc, item, "a", "nav-link");
        doc.set_attr(link, "href", &format!("#{id}"));
    }
    child_with_id(&mut doc, nav, "div", "nav-hamburger", "nav-hamburger");

    let mut sections = Vec::new();
    for (id, top, height) in SECTIONS {
        let section = child_with_id(&mut doc, body, "section", "section", id);
        doc.set_layout(section, top, height);
        sections.push(section);
    }
    let [home, machines, simulation, impact, _contact] = sections[..] else {
        return doc;
    };

    // Hero
    child_with_id(&mut doc, home, "div", "particles", "particles");
    let stats = child(&mut doc, home, "div", "hero-stats");
    for target in HERO_STATS {
        let stat = child(&mut doc, stats, "span", "stat-number");
        doc.set_attr(stat, "data-target", target);
        doc.set_text(stat, "0");
    }

    // Machine cards
    let grid = child(&mut doc, machines, "div", "machines-grid");
    for (key, profile) in catalog.iter() {
        let card = child(&mut doc, grid, "div", "machine-card");
        doc.set_attr(card, "data-machine", key.as_str());
        let title = child(&mut doc, card, "h3", "");
        doc.set_text(title, &profile.name);
        for width in spec_widths(key) {
            let bar = child(&mut doc, card, "div", "spec-bar");
            let fill = child(&mut doc, bar, "div", "spec-fill");
            doc.set_attr(fill, "data-width", width);
        }
        let button = child(&mut doc, card, "button", "machine-details-btn");
        doc.set_text(button, "Learn More");
    }

    // Simulation panel
    let header = child(&mut doc, simulation, "div", "scenario");
    child_with_id(&mut doc, header, "h3", "", "scenario-title");
    child_with_id(&mut doc, header, "p", "", "scenario-description");
    let day = child_with_id(&mut doc, header, "span", "", "mission-day");
    doc.set_text(day, "1");

    let bin = child(&mut doc, simulation, "div", "waste-bin");
    for kind in WasteKind::KNOWN {
        let item = child(&mut doc, bin, "div", "waste-item");
        doc.set_attr(item, "data-type", kind.as_str());
        doc.set_attr(item, "draggable", "true");
    }

    let floor = child(&mut doc, simulation, "div", "sim-machines");
    for key in SIM_MACHINES {
        let machine = child_with_id(&mut doc, floor, "div", "sim-machine", &format!("sim-{key}"));
        doc.set_attr(machine, "data-machine", key.as_str());
        let label = child(&mut doc, machine, "span", "machine-label");
        doc.set_text(label, &key.as_str().to_uppercase());
        let status = child(&mut doc, machine, "div", "");
        doc.set_class_name(status, "machine-status idle");
        doc.set_text(status, "Ready");
    }

    let outputs = child(&mut doc, simulation, "div", "sim-outputs");
    for id in ["water-output", "tools-output", "fuel-output", "shield-output"] {
        let out = child_with_id(&mut doc, outputs, "span", "output-value", id);
        doc.set_text(out, if id == "tools-output" { "0" } else { "0.0" });
    }

    let controls = child(&mut doc, simulation, "div", "sim-controls");
    for id in ["process-waste", "change-scenario", "reset-simulation"] {
        child_with_id(&mut doc, controls, "button", "sim-btn", id);
    }

    // Impact metrics
    let metrics = child(&mut doc, impact, "div", "impact-metrics");
    for target in IMPACT_METRICS {
        let metric = child(&mut doc, metrics, "span", "metric-value");
        doc.set_attr(metric, "data-target", target);
        doc.set_text(metric, "0");
    }

    // Modal
    let modal = child_with_id(&mut doc, body, "div", "modal", "machine-modal");
    doc.add_class(modal, "hidden");
    let content = child(&mut doc, modal, "div", "modal-content");
    let head = child(&mut doc, content, "div", "modal-header");
    child_with_id(&mut doc, head, "h3", "", "modal-title");
    let close = child_with_id(&mut doc, head, "button", "modal-close", "modal-close");
    doc.set_text(close, "×");
    child_with_id(&mut doc, content, "div", "modal-body", "modal-body");

    doc
}
