//! Headless tour: builds the standard page, optionally from a data directory,
//! drives a short session, and prints the tally and event counts.
//!
//! Run with: `RUST_LOG=debug cargo run --package orbitcycle-data --example headless_tour -- [data-dir]`

use std::path::Path;

use orbitcycle_core::document::Viewport;
use orbitcycle_core::event::EventKind;
use orbitcycle_core::id::{MachineKey, WasteKind};
use orbitcycle_core::layout::standard_page;
use orbitcycle_data::{PageData, load_page_data};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data = match std::env::args().nth(1) {
        Some(dir) => load_page_data(Path::new(&dir)).unwrap_or_else(|e| {
            eprintln!("failed to load page data: {e}");
            std::process::exit(1);
        }),
        None => PageData::default(),
    };

    let mut page = data.into_page(standard_page(), Viewport::default());
    page.events_mut().suppress(EventKind::ParticleSpawned);
    page.events_mut().suppress(EventKind::ParticleExpired);
    page.initialize();

    page.process_waste(WasteKind::Metal, MachineKey::Ai);
    page.advance(2_000);
    page.change_scenario();
    page.process_all();
    page.advance(10_000);
    page.click_nav_section("impact");
    page.advance(5_000);

    let tally = page.tally();
    println!("=== After {} ms ===", page.now());
    println!("  mission day: {}", page.mission_day());
    println!("  scenario:    {}", page.simulation().scenario().title);
    for (id, text) in tally.readouts() {
        println!("  {id:>14}: {text}");
    }
    println!("  particles:   {}", page.particles().count());

    let events = page.drain_events();
    let completed = events
        .iter()
        .filter(|e| e.kind() == EventKind::ProcessingCompleted)
        .count();
    let revealed = events
        .iter()
        .filter(|e| e.kind() == EventKind::SectionRevealed)
        .count();
    println!("  events: {} total, {completed} completions, {revealed} reveals", events.len());
}
