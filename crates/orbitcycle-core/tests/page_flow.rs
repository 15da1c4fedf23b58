//! End-to-end flows over the standard page.
//!
//! Each test drives a page the way a host would (input, then `advance`)
//! and checks the document and event stream.

use orbitcycle_core::config::PageConfig;
use orbitcycle_core::document::{Document, Viewport};
use orbitcycle_core::event::{EventKind, PageEvent};
use orbitcycle_core::id::MachineKey;
use orbitcycle_core::page::Page;
use orbitcycle_core::simulation::MachineStatus;
use orbitcycle_core::test_utils::*;

// ===========================================================================
// Simulation
// ===========================================================================

#[test]
fn metal_on_ai_full_cycle() {
    let mut page = standard();
    assert!(drop_waste(&mut page, "metal", MachineKey::Ai));
    assert_eq!(status_text(&page, MachineKey::Ai).as_deref(), Some("Processing..."));

    page.advance(2000);
    assert_eq!(status_text(&page, MachineKey::Ai).as_deref(), Some("Complete"));
    let tally = page.tally();
    assert!(approx(tally.water, 0.22));
    assert!(approx(tally.fuel, 0.16));
    assert!(approx(tally.shield, 0.30));
    assert_eq!(tally.tools, 0);
    assert_eq!(text(&page, "mission-day").as_deref(), Some("2"));
    assert_eq!(text(&page, "shield-output").as_deref(), Some("0.3"));

    page.advance(2000);
    assert_eq!(status_text(&page, MachineKey::Ai).as_deref(), Some("Ready"));
    let ai = sim_machine(&page, MachineKey::Ai);
    let status = page.document().find_in(ai, "machine-status").unwrap();
    assert_eq!(
        page.document().class_name(status).as_deref(),
        Some("machine-status idle")
    );
}

#[test]
fn unmatched_pairing_yields_half() {
    let mut page = standard();
    drop_waste(&mut page, "paper", MachineKey::Ai);
    page.advance(2000);
    let tally = page.tally();
    assert!(approx(tally.water, 0.11));
    assert!(approx(tally.fuel, 0.08));
    assert!(approx(tally.shield, 0.15));
    assert_eq!(page.mission_day(), 2);
}

#[test]
fn readouts_round_halves_up() {
    let mut page = standard();
    page.change_scenario();
    assert_eq!(text(&page, "scenario-title").as_deref(), Some("Emergency Repair"));

    // Each unmatched drop adds 0.05 water.
    for expected in ["0.1", "0.1", "0.2", "0.2", "0.3"] {
        assert!(drop_waste(&mut page, "paper", MachineKey::Ai));
        page.advance(4100);
        assert_eq!(text(&page, "water-output").as_deref(), Some(expected));
    }
}

#[test]
fn drop_on_machine_without_status_is_noop() {
    let mut page = standard();
    let ai = sim_machine(&page, MachineKey::Ai);
    let status = page.document().find_in(ai, "machine-status").unwrap();
    page.document_mut().remove(status);

    assert!(!drop_waste(&mut page, "metal", MachineKey::Ai));
    page.advance(5000);
    assert!(page.tally().is_zero());
    assert_eq!(page.mission_day(), 1);
}

#[test]
fn drop_highlight_clears_after_drag_end() {
    let mut page = standard();
    let item = waste_item(&page, "plastic");
    drop_waste(&mut page, "plastic", MachineKey::Refab);
    assert!(page.document().style(item, "background").is_some());
    page.advance(999);
    assert!(page.document().style(item, "background").is_some());
    page.advance(1);
    assert_eq!(page.document().style(item, "background"), None);
}

#[test]
fn process_all_rotates_through_four_machines() {
    let mut page = standard();
    assert_eq!(page.process_all(), 6);
    page.drain_events();

    page.advance(4000);
    let started: Vec<MachineKey> = page
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            PageEvent::ProcessingStarted { machine, .. } => Some(machine),
            _ => None,
        })
        .collect();
    use MachineKey::*;
    assert_eq!(started, vec![Ai, Refab, Oscar, Hmc, Ai, Refab]);
}

#[test]
fn process_all_then_reset_leaves_nothing_behind() {
    let mut page = standard();
    page.process_all();
    page.advance(1000);
    let cancelled = page.reset_simulation();
    assert!(cancelled >= 5);

    page.advance(20_000);
    assert!(page.tally().is_zero());
    assert_eq!(page.mission_day(), 1);
    for key in [MachineKey::Ai, MachineKey::Refab, MachineKey::Oscar, MachineKey::Hmc] {
        assert_eq!(page.simulation().status(key), MachineStatus::Idle);
        assert_eq!(status_text(&page, key).as_deref(), Some("Ready"));
    }
    assert_eq!(text(&page, "water-output").as_deref(), Some("0.0"));
    assert_eq!(text(&page, "tools-output").as_deref(), Some("0"));
}

#[test]
fn reset_mid_processing_is_not_overwritten_later() {
    let mut page = standard();
    drop_waste(&mut page, "metal", MachineKey::Ai);
    page.advance(1500);
    page.reset_simulation();
    page.advance(600);
    assert_eq!(status_text(&page, MachineKey::Ai).as_deref(), Some("Ready"));
    assert!(page.tally().is_zero());
}

#[test]
fn redrop_on_busy_machine_supersedes() {
    let mut page = standard();
    drop_waste(&mut page, "metal", MachineKey::Ai);
    page.advance(1000);
    page.drain_events();
    drop_waste(&mut page, "metal", MachineKey::Ai);
    let events = page.drain_events();
    assert!(
        events
            .iter()
            .any(|e| e.kind() == EventKind::ProcessingSuperseded)
    );

    page.advance(2000);
    // One completion only, from the second drop.
    assert_eq!(page.mission_day(), 2);
}

#[test]
fn scenario_cycle_updates_display() {
    let mut page = standard();
    let expected = [
        ("Emergency Repair", "Fabricate critical spare parts for life support system"),
        ("Propellant Production", "Generate fuel for return journey preparation"),
        ("Daily Operations", "Process routine daily waste from 8 astronauts"),
    ];
    for (title, description) in expected {
        page.change_scenario();
        assert_eq!(text(&page, "scenario-title").as_deref(), Some(title));
        assert_eq!(text(&page, "scenario-description").as_deref(), Some(description));
    }
    assert_eq!(page.simulation().scenario_index(), 0);
}

#[test]
fn emergency_tools_are_floored() {
    let mut page = standard();
    page.change_scenario();
    drop_waste(&mut page, "plastic", MachineKey::Refab);
    page.advance(2000);
    assert_eq!(page.tally().tools, 2);
    assert_eq!(text(&page, "tools-output").as_deref(), Some("2"));
}

// ===========================================================================
// Particles
// ===========================================================================

#[test]
fn particle_population_stabilizes_at_fifty() {
    let mut page = standard();
    page.advance(10_000);
    assert_eq!(page.particles().count(), 50);
    let container = element(&page, "particles");
    for _ in 0..12 {
        page.advance(10_000);
        assert_eq!(page.particles().count(), 50);
        assert_eq!(
            page.document().get(container).unwrap().children().len(),
            50
        );
    }
}

#[test]
fn resize_respawns_particles() {
    let mut page = standard();
    page.advance(12_000);
    page.resize(640.0, 480.0);
    page.advance(100);
    page.resize(600.0, 480.0);
    page.advance(250);
    assert_eq!(
        page.events()
            .iter_kind(EventKind::ParticlesRespawned)
            .count(),
        1
    );
    page.advance(10_000);
    assert_eq!(page.particles().count(), 50);
    assert!(page.particles().particles().all(|(_, p)| p.left <= 600.0));
}

#[test]
fn page_without_particle_container_runs() {
    let mut page = Page::new(Document::new(), Viewport::default(), PageConfig::default());
    page.initialize();
    page.advance(30_000);
    assert_eq!(page.particles().count(), 0);
    assert!(!page.particles().is_enabled());
}

// ===========================================================================
// Navigation and reveal
// ===========================================================================

#[test]
fn nav_click_smooth_scrolls_to_section() {
    let mut page = standard();
    assert!(page.click_nav_section("simulation"));
    assert!(page.is_animating());
    let duration = page.config().smooth_scroll_ms + 32;
    run_for(&mut page, duration);
    // simulation offset 2300 minus the 70px navbar.
    assert_eq!(page.viewport().scroll_y, 2230.0);
    assert_eq!(page.navigation().active(), Some("simulation"));
}

#[test]
fn scroll_reveals_impact_and_runs_metrics() {
    let mut page = standard();
    page.advance(3_500);
    page.drain_events();

    page.scroll_to(3_300.0);
    let impact = element(&page, "impact");
    assert!(page.document().has_class(impact, "animate-in"));

    run_for(&mut page, 500 + 2_000 + 32);
    let metrics = page.document().query_class("metric-value");
    assert_eq!(page.document().text(metrics[3]), Some("1,500,000"));
    assert_eq!(page.document().text(metrics[0]), Some("12,000"));
    assert!(!page.is_animating());

    // Scrolling away and back does not re-trigger.
    page.scroll_to(0.0);
    page.scroll_to(3_300.0);
    let reveals = page
        .events()
        .iter_kind(EventKind::SectionRevealed)
        .filter(|e| matches!(e, PageEvent::SectionRevealed { section, .. } if section == "impact"))
        .count();
    assert_eq!(reveals, 1);
}

#[test]
fn page_load_runs_stats_and_bars() {
    let mut page = standard();
    run_for(&mut page, 1_000 + 2_000 + 15 * 200 + 32);
    let doc = page.document();
    let stats = doc.query_class("stat-number");
    assert_eq!(doc.text(stats[0]), Some("2,500"));
    assert_eq!(doc.text(stats[1]), Some("95"));
    for bar in doc.query_class("spec-fill") {
        let width = doc.attr(bar, "data-width").unwrap();
        assert_eq!(doc.style(bar, "width"), Some(format!("{width}%").as_str()));
    }
}

#[test]
fn hamburger_toggles_and_nav_click_closes() {
    let mut page = standard();
    let burger = element(&page, "nav-hamburger");
    let menu = element(&page, "nav-menu");
    assert!(page.click(burger));
    assert!(page.document().has_class(menu, "active"));
    page.click_nav_section("machines");
    assert!(!page.document().has_class(menu, "active"));
}

// ===========================================================================
// Modal
// ===========================================================================

#[test]
fn modal_escape_and_backdrop() {
    let mut page = standard();
    assert!(!page.key_down("Escape"));
    assert!(page.show_machine(MachineKey::Refab));
    assert!(page.key_down("Escape"));
    assert!(!page.is_modal_open());
    assert!(!page.key_down("Escape"));

    page.show_machine(MachineKey::Ai);
    let modal = element(&page, "machine-modal");
    let title = element(&page, "modal-title");
    assert!(!page.click_modal(title));
    assert!(page.click_modal(modal));
    assert!(!page.click_modal(modal));
    assert_eq!(page.events().iter_kind(EventKind::ModalClosed).count(), 2);
}

// ===========================================================================
// Independence
// ===========================================================================

#[test]
fn pages_do_not_share_state() {
    let mut a = standard();
    let b = standard();
    drop_waste(&mut a, "metal", MachineKey::Ai);
    a.advance(2000);
    assert_eq!(a.mission_day(), 2);
    assert_eq!(b.mission_day(), 1);
    assert!(b.tally().is_zero());
}

#[test]
fn suppressed_particle_events_are_not_buffered() {
    let mut page = standard();
    page.events_mut().suppress(EventKind::ParticleSpawned);
    page.advance(5_000);
    assert_eq!(page.events().iter_kind(EventKind::ParticleSpawned).count(), 0);
    assert!(page.particles().count() > 0);
}
