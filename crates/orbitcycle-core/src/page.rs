//! The page orchestrator.
//!
//! [`Page`] owns the document, the virtual clock, and every component. The
//! host feeds it input (clicks, keys, drags, scroll, resize) and advances
//! time; the page routes each input to its component and writes the result
//! back to the document.
//!
//! # Time
//!
//! [`Page::advance`] runs everything due up to the new time, in order:
//!
//! 1. **Timers**: fire in due order, FIFO at equal times.
//! 2. **Frames**: while a counter or smooth scroll is running, a display
//!    frame runs every `frame_interval_ms`. A timer and a frame due at the
//!    same instant run timer first.

use tracing::{debug, trace};

use crate::catalog::Catalog;
use crate::config::PageConfig;
use crate::document::{Document, Viewport};
use crate::event::{EventBus, PageEvent};
use crate::fixed::Millis;
use crate::id::{ElementId, MachineKey, WasteKind};
use crate::modal::{MODAL_CLOSE_ID, MODAL_ID, ModalPresenter};
use crate::navigation::NavigationController;
use crate::particle::{ParticleField, ParticleTask};
use crate::reveal::{CounterGroup, RevealAnimator, RevealTask};
use crate::scenario::ScenarioCycle;
use crate::scheduler::Scheduler;
use crate::simulation::{MachineStatus, SimTask, SimUpdate, SimulationEngine, SimulationTally};

/// Background given to a waste item right after it is dropped.
pub const DROP_HIGHLIGHT: &str = "rgba(0, 212, 255, 0.4)";

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Every kind of timed work on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTask {
    Particle(ParticleTask),
    Reveal(RevealTask),
    Sim(SimTask),
    /// Remove the drop highlight from a waste item.
    ClearHighlight(ElementId),
    /// Run the page-load counters and bars.
    LoadAnimations,
}

impl From<ParticleTask> for PageTask {
    fn from(task: ParticleTask) -> Self {
        PageTask::Particle(task)
    }
}

impl From<RevealTask> for PageTask {
    fn from(task: RevealTask) -> Self {
        PageTask::Reveal(task)
    }
}

impl From<SimTask> for PageTask {
    fn from(task: SimTask) -> Self {
        PageTask::Sim(task)
    }
}

/// What one call to [`Page::advance`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdvanceResult {
    pub timers_fired: usize,
    pub frames_rendered: usize,
}

#[derive(Debug, Clone, Default)]
struct DragState {
    item: Option<ElementId>,
    payload: Option<String>,
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

/// One independent page: document, clock, and component owners.
#[derive(Debug)]
pub struct Page {
    config: PageConfig,
    doc: Document,
    viewport: Viewport,
    sched: Scheduler<PageTask>,
    events: EventBus,
    catalog: Catalog,
    particles: ParticleField,
    nav: NavigationController,
    reveal: RevealAnimator,
    modal: ModalPresenter,
    sim: SimulationEngine,
    drag: DragState,
    next_frame: Option<Millis>,
    initialized: bool,
}

impl Page {
    /// A page over `doc` with the built-in catalog and scenarios.
    pub fn new(doc: Document, viewport: Viewport, config: PageConfig) -> Self {
        Self::with_data(doc, viewport, config, Catalog::builtin(), ScenarioCycle::builtin())
    }

    /// A page with replacement catalog and scenario data.
    pub fn with_data(
        doc: Document,
        viewport: Viewport,
        config: PageConfig,
        catalog: Catalog,
        scenarios: ScenarioCycle,
    ) -> Self {
        let container = doc.get_element_by_id("particles");
        let particles = ParticleField::new(
            container,
            config.particles.clone(),
            config.seed,
            viewport.width,
        );
        Self {
            nav: NavigationController::new(config.nav.clone()),
            reveal: RevealAnimator::new(config.reveal.clone()),
            sim: SimulationEngine::new(scenarios, config.sim.clone()),
            modal: ModalPresenter::new(),
            particles,
            catalog,
            events: EventBus::default(),
            sched: Scheduler::new(),
            drag: DragState::default(),
            next_frame: None,
            initialized: false,
            config,
            doc,
            viewport,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Wire the page up: start particles, show the first scenario, arm the
    /// page-load animations, run the first visibility check, and mark the
    /// body `loaded`. Later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;

        self.particles.start(&mut self.sched);
        self.render_scenario();
        self.render_outputs();
        self.sched.schedule(
            self.config.load_animation_delay_ms,
            PageTask::LoadAnimations,
        );
        self.reveal
            .observe(&mut self.sched, &mut self.doc, &self.viewport, &mut self.events);
        let body = self.doc.body();
        self.doc.add_class(body, "loaded");
        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            particles = self.particles.is_enabled(),
            "page initialized"
        );
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advance virtual time by `dt` milliseconds.
    pub fn advance(&mut self, dt: Millis) -> AdvanceResult {
        let target = self.sched.now().saturating_add(dt);
        let mut result = AdvanceResult::default();

        loop {
            let timer = self.sched.next_due().filter(|&t| t <= target);
            let frame = self.next_frame.filter(|&f| f <= target);
            match (timer, frame) {
                (Some(t), Some(f)) if t <= f => self.fire_timer(target, &mut result),
                (Some(_), None) => self.fire_timer(target, &mut result),
                (_, Some(f)) => {
                    self.sched.set_now(f);
                    self.render_frame();
                    result.frames_rendered += 1;
                }
                (None, None) => break,
            }
        }

        self.sched.set_now(target);
        result
    }

    /// Current virtual time.
    pub fn now(&self) -> Millis {
        self.sched.now()
    }

    fn fire_timer(&mut self, target: Millis, result: &mut AdvanceResult) {
        let Some(fired) = self.sched.pop_due(target) else {
            return;
        };
        result.timers_fired += 1;
        match fired.task {
            PageTask::Particle(task) => {
                self.particles.handle(
                    &mut self.sched,
                    &mut self.doc,
                    &mut self.events,
                    fired.id,
                    task,
                );
            }
            PageTask::Reveal(task) => {
                self.reveal
                    .handle(&mut self.sched, &mut self.doc, &mut self.events, task);
                self.ensure_frames();
            }
            PageTask::Sim(task) => {
                let update = self.sim.handle(&mut self.sched, fired.id, task);
                self.apply_sim_update(update);
            }
            PageTask::ClearHighlight(item) => {
                self.doc.clear_style(item, "background");
            }
            PageTask::LoadAnimations => {
                let now = self.sched.now();
                self.reveal
                    .start_counters(&self.doc, &mut self.events, CounterGroup::Stats, now);
                self.reveal.start_bars(&mut self.sched, &self.doc);
                self.ensure_frames();
            }
        }
    }

    fn ensure_frames(&mut self) {
        let animating = self.reveal.is_animating() || self.nav.is_scrolling();
        if animating && self.next_frame.is_none() {
            self.next_frame = Some(self.sched.now() + self.config.frame_interval_ms);
        }
    }

    fn render_frame(&mut self) {
        let now = self.sched.now();
        if let Some(y) = self.nav.scroll_frame(now) {
            self.viewport.scroll_y = y;
            self.on_scroll();
        }
        self.reveal.render_frame(&mut self.doc, &mut self.events, now);
        trace!(now, "frame");

        self.next_frame = if self.reveal.is_animating() || self.nav.is_scrolling() {
            Some(now + self.config.frame_interval_ms)
        } else {
            None
        };
    }

    /// Whether display frames are scheduled.
    pub fn is_animating(&self) -> bool {
        self.next_frame.is_some()
    }

    // -----------------------------------------------------------------------
    // Generic input
    // -----------------------------------------------------------------------

    /// Route a click on `target` the way the page's listeners would.
    /// Returns whether any handler took effect.
    pub fn click(&mut self, target: ElementId) -> bool {
        let doc = &self.doc;
        if doc.has_class(target, "nav-link") {
            return self.click_nav_link(target);
        }
        if doc.closest(target, "machine-details-btn").is_some() {
            return self.click_details(target).is_some();
        }
        if doc.closest(target, "nav-hamburger").is_some() {
            return self.toggle_menu().is_some();
        }
        let id = doc.get(target).and_then(|e| e.id()).map(str::to_owned);
        match id.as_deref() {
            Some(MODAL_CLOSE_ID) => self.click_modal_close(),
            Some(MODAL_ID) => self.click_modal(target),
            Some("process-waste") => self.process_all() > 0,
            Some("change-scenario") => {
                self.change_scenario();
                true
            }
            Some("reset-simulation") => {
                self.reset_simulation();
                true
            }
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Navigation
    // -----------------------------------------------------------------------

    /// Click a `.nav-link`.
    pub fn click_nav_link(&mut self, link: ElementId) -> bool {
        let clicked = self.nav.click_link(
            &mut self.doc,
            link,
            self.viewport.scroll_y,
            self.sched.now(),
            self.config.smooth_scroll_ms,
        );
        self.ensure_frames();
        clicked
    }

    /// Click the `.nav-link` pointing at `#section_id`.
    pub fn click_nav_section(&mut self, section_id: &str) -> bool {
        let href = format!("#{section_id}");
        let link = self
            .doc
            .query_class("nav-link")
            .into_iter()
            .find(|&l| self.doc.attr(l, "href") == Some(href.as_str()));
        match link {
            Some(link) => self.click_nav_link(link),
            None => false,
        }
    }

    /// Smooth-scroll to a section. Unknown ids do nothing.
    pub fn scroll_to_section(&mut self, section_id: &str) -> bool {
        let started = self.nav.scroll_to_section(
            &self.doc,
            section_id,
            self.viewport.scroll_y,
            self.sched.now(),
            self.config.smooth_scroll_ms,
        );
        self.ensure_frames();
        started
    }

    /// The hamburger was clicked. `None` if it or the menu is missing.
    pub fn toggle_menu(&mut self) -> Option<bool> {
        self.nav.toggle_menu(&mut self.doc)
    }

    /// The user scrolled to `y`. Interrupts any smooth scroll.
    pub fn scroll_to(&mut self, y: f64) {
        self.nav.cancel_scroll();
        self.viewport.scroll_y = y.max(0.0);
        self.on_scroll();
    }

    fn on_scroll(&mut self) {
        let y = self.viewport.scroll_y;
        if self.nav.update_active(&mut self.doc, y) {
            self.events.emit(PageEvent::NavActivated {
                section: self.nav.active().map(str::to_owned),
                at: self.sched.now(),
            });
        }
        self.reveal
            .observe(&mut self.sched, &mut self.doc, &self.viewport, &mut self.events);
    }

    /// The viewport changed size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
        self.particles.on_resize(&mut self.sched, width);
        self.reveal
            .observe(&mut self.sched, &mut self.doc, &self.viewport, &mut self.events);
    }

    // -----------------------------------------------------------------------
    // Modal
    // -----------------------------------------------------------------------

    /// Click a `.machine-details-btn`.
    pub fn click_details(&mut self, button: ElementId) -> Option<MachineKey> {
        let key = self
            .modal
            .show_for_button(&mut self.doc, &self.catalog, button)?;
        self.events.emit(PageEvent::ModalOpened {
            machine: key,
            at: self.sched.now(),
        });
        Some(key)
    }

    /// Open the modal on a machine directly.
    pub fn show_machine(&mut self, key: MachineKey) -> bool {
        if !self.modal.show(&mut self.doc, &self.catalog, key) {
            return false;
        }
        self.events.emit(PageEvent::ModalOpened {
            machine: key,
            at: self.sched.now(),
        });
        true
    }

    /// Click the modal's close control.
    pub fn click_modal_close(&mut self) -> bool {
        if !self.modal_wired() {
            return false;
        }
        let closed = self.modal.close(&mut self.doc);
        self.emit_closed(closed)
    }

    /// A click landed on the modal; only the backdrop itself closes it.
    pub fn click_modal(&mut self, target: ElementId) -> bool {
        if !self.modal_wired() {
            return false;
        }
        let closed = self.modal.on_backdrop_click(&mut self.doc, target);
        self.emit_closed(closed)
    }

    /// A key was pressed anywhere on the page.
    pub fn key_down(&mut self, key: &str) -> bool {
        if !self.modal_wired() {
            return false;
        }
        let closed = self.modal.on_key(&mut self.doc, key);
        self.emit_closed(closed)
    }

    /// Close handlers are only attached when the page has a close control.
    fn modal_wired(&self) -> bool {
        self.doc.get_element_by_id(MODAL_CLOSE_ID).is_some()
    }

    fn emit_closed(&mut self, closed: bool) -> bool {
        if closed {
            self.events.emit(PageEvent::ModalClosed {
                at: self.sched.now(),
            });
        }
        closed
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal.is_open(&self.doc)
    }

    // -----------------------------------------------------------------------
    // Drag and drop
    // -----------------------------------------------------------------------

    /// Start dragging a `.waste-item`.
    pub fn drag_start(&mut self, item: ElementId) -> bool {
        if !self.doc.has_class(item, "waste-item") {
            return false;
        }
        self.drag = DragState {
            item: Some(item),
            payload: self.doc.attr(item, "data-type").map(str::to_owned),
        };
        self.doc.set_style(item, "opacity", "0.5");
        true
    }

    /// The drag of `item` ended (after any drop).
    pub fn drag_end(&mut self, item: ElementId) {
        self.doc.set_style(item, "opacity", "1");
        self.drag = DragState::default();
    }

    /// The pointer dragged into a `.sim-machine`.
    pub fn drag_enter(&mut self, machine: ElementId) {
        if self.doc.has_class(machine, "sim-machine") {
            self.doc.add_class(machine, "drag-over");
        }
    }

    /// The pointer left `machine`, moving to `related` (if anywhere).
    /// Moving onto one of the machine's own descendants keeps the hover.
    pub fn drag_leave(&mut self, machine: ElementId, related: Option<ElementId>) {
        if related.is_some_and(|r| self.doc.contains(machine, r)) {
            return;
        }
        self.doc.remove_class(machine, "drag-over");
    }

    /// The dragged item was dropped on `machine`. Returns whether
    /// processing started.
    pub fn drop_on(&mut self, machine: ElementId) -> bool {
        if !self.doc.has_class(machine, "sim-machine") {
            return false;
        }
        self.doc.remove_class(machine, "drag-over");

        let waste = self.drag.payload.as_deref().and_then(WasteKind::parse);
        let key = self
            .doc
            .attr(machine, "data-machine")
            .and_then(|k| k.parse::<MachineKey>().ok());
        let (Some(waste), Some(key)) = (waste, key) else {
            trace!("drop without waste payload or machine key");
            return false;
        };

        let started = self.process_waste(waste, key);
        if let Some(item) = self.drag.item {
            self.doc.set_style(item, "background", DROP_HIGHLIGHT);
            self.sched
                .schedule(self.config.drop_highlight_ms, PageTask::ClearHighlight(item));
        }
        started
    }

    /// Drag `item` onto `machine` and release: start, enter, drop, end.
    pub fn drag_and_drop(&mut self, item: ElementId, machine: ElementId) -> bool {
        if !self.drag_start(item) {
            return false;
        }
        self.drag_enter(machine);
        let started = self.drop_on(machine);
        self.drag_end(item);
        started
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Start processing if the machine's status element exists.
    pub fn process_waste(&mut self, waste: WasteKind, machine: MachineKey) -> bool {
        if self.status_element(machine).is_none() {
            trace!(%machine, "no status element for machine");
            return false;
        }
        let update = self.sim.start(&mut self.sched, waste, machine);
        self.apply_sim_update(update);
        true
    }

    /// Queue every `.waste-item`, staggered and rotated across machines.
    /// Items without a `data-type` keep their slot in the rotation.
    pub fn process_all(&mut self) -> usize {
        let wastes: Vec<WasteKind> = self
            .doc
            .query_class("waste-item")
            .into_iter()
            .map(|item| {
                self.doc
                    .attr(item, "data-type")
                    .and_then(WasteKind::parse)
                    .unwrap_or_else(|| WasteKind::Other(String::new()))
            })
            .collect();
        self.sim.process_all(&mut self.sched, &wastes)
    }

    /// Select the next scenario and show it.
    pub fn change_scenario(&mut self) {
        self.sim.change_scenario();
        self.render_scenario();
        let scenario = self.sim.scenario();
        self.events.emit(PageEvent::ScenarioChanged {
            index: self.sim.scenario_index(),
            id: scenario.id.clone(),
            at: self.sched.now(),
        });
    }

    /// Zero the tally, return to day 1, idle every machine, and cancel
    /// pending transitions. Returns the number of timers cancelled.
    pub fn reset_simulation(&mut self) -> usize {
        let cancelled = self.sim.reset(&mut self.sched);
        self.render_outputs();
        for status in self.doc.query_class("machine-status") {
            self.doc.set_text(status, MachineStatus::Idle.label());
            self.doc
                .set_class_name(status, MachineStatus::Idle.class_name());
        }
        self.events.emit(PageEvent::SimulationReset {
            cancelled_timers: cancelled,
            at: self.sched.now(),
        });
        cancelled
    }

    fn apply_sim_update(&mut self, update: SimUpdate) {
        let at = self.sched.now();
        match update {
            SimUpdate::Started {
                machine,
                waste,
                superseded,
            } => {
                if superseded {
                    self.events
                        .emit(PageEvent::ProcessingSuperseded { machine, at });
                }
                self.render_status(machine, MachineStatus::Processing);
                self.events
                    .emit(PageEvent::ProcessingStarted { machine, waste, at });
            }
            SimUpdate::Completed {
                machine,
                waste,
                yielded,
                mission_day,
            } => {
                self.render_status(machine, MachineStatus::Complete);
                self.render_outputs();
                self.events.emit(PageEvent::ProcessingCompleted {
                    machine,
                    waste,
                    water: yielded.water,
                    tools: yielded.tools,
                    fuel: yielded.fuel,
                    shield: yielded.shield,
                    mission_day,
                    at,
                });
            }
            SimUpdate::Idle { machine } => {
                self.render_status(machine, MachineStatus::Idle);
                self.events.emit(PageEvent::MachineIdle { machine, at });
            }
            SimUpdate::Dispatch { waste, machine } => {
                self.process_waste(waste, machine);
            }
        }
    }

    fn status_element(&self, machine: MachineKey) -> Option<ElementId> {
        let container = self.doc.get_element_by_id(&format!("sim-{machine}"))?;
        self.doc.find_in(container, "machine-status")
    }

    fn render_status(&mut self, machine: MachineKey, status: MachineStatus) {
        if let Some(el) = self.status_element(machine) {
            self.doc.set_text(el, status.label());
            self.doc.set_class_name(el, status.class_name());
        }
    }

    fn render_outputs(&mut self) {
        for (id, text) in self.sim.tally().readouts() {
            self.doc.set_text_of(id, &text);
        }
        let day = self.sim.mission_day().to_string();
        self.doc.set_text_of("mission-day", &day);
    }

    fn render_scenario(&mut self) {
        let scenario = self.sim.scenario();
        let (title, description) = (scenario.title.clone(), scenario.description.clone());
        self.doc.set_text_of("scenario-title", &title);
        self.doc.set_text_of("scenario-description", &description);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access, for hosts mirroring DOM changes.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn simulation(&self) -> &SimulationEngine {
        &self.sim
    }

    pub fn tally(&self) -> &SimulationTally {
        self.sim.tally()
    }

    pub fn mission_day(&self) -> u32 {
        self.sim.mission_day()
    }

    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.nav
    }

    pub fn reveal(&self) -> &RevealAnimator {
        &self.reveal
    }

    pub fn modal(&self) -> &ModalPresenter {
        &self.modal
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Event bus access for suppression and listeners.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Take every buffered event, oldest first.
    pub fn drain_events(&mut self) -> Vec<PageEvent> {
        self.events.drain()
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.sched.pending_count()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::standard_page;

    fn page() -> Page {
        let mut page = Page::new(standard_page(), Viewport::default(), PageConfig::default());
        page.initialize();
        page
    }

    fn waste_item(page: &Page, kind: &str) -> ElementId {
        page.document()
            .query_class("waste-item")
            .into_iter()
            .find(|&i| page.document().attr(i, "data-type") == Some(kind))
            .unwrap()
    }

    fn machine(page: &Page, key: &str) -> ElementId {
        page.document()
            .get_element_by_id(&format!("sim-{key}"))
            .unwrap()
    }

    #[test]
    fn initialize_marks_body_and_scenario() {
        let page = page();
        let doc = page.document();
        assert!(doc.has_class(doc.body(), "loaded"));
        assert_eq!(doc.text_of("scenario-title"), Some("Daily Operations"));
        assert_eq!(doc.text_of("water-output"), Some("0.0"));
        assert_eq!(doc.text_of("mission-day"), Some("1"));
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut page = page();
        let pending = page.pending_timers();
        page.initialize();
        assert_eq!(page.pending_timers(), pending);
    }

    #[test]
    fn timers_run_before_frames_at_equal_times() {
        let mut page = page();
        page.advance(1000);
        // The load animation fired at 1000 and armed frames from there.
        assert!(page.is_animating());
        let result = page.advance(16);
        assert_eq!(result.frames_rendered, 1);
    }

    #[test]
    fn drop_starts_processing_and_highlights() {
        let mut page = page();
        let item = waste_item(&page, "metal");
        let ai = machine(&page, "ai");

        assert!(page.drag_start(item));
        assert_eq!(page.document().style(item, "opacity"), Some("0.5"));
        page.drag_enter(ai);
        assert!(page.document().has_class(ai, "drag-over"));
        assert!(page.drop_on(ai));
        assert!(!page.document().has_class(ai, "drag-over"));
        page.drag_end(item);
        assert_eq!(page.document().style(item, "opacity"), Some("1"));
        assert_eq!(page.document().style(item, "background"), Some(DROP_HIGHLIGHT));

        page.advance(1000);
        assert_eq!(page.document().style(item, "background"), None);

        page.advance(1000);
        assert_eq!(page.mission_day(), 2);
        assert_eq!(page.document().text_of("water-output"), Some("0.2"));
    }

    #[test]
    fn drag_leave_to_descendant_keeps_hover() {
        let mut page = page();
        let ai = machine(&page, "ai");
        let status = page.document().find_in(ai, "machine-status").unwrap();
        page.drag_enter(ai);
        page.drag_leave(ai, Some(status));
        assert!(page.document().has_class(ai, "drag-over"));
        page.drag_leave(ai, None);
        assert!(!page.document().has_class(ai, "drag-over"));
    }

    #[test]
    fn drop_without_drag_is_noop() {
        let mut page = page();
        let ai = machine(&page, "ai");
        assert!(!page.drop_on(ai));
        assert_eq!(page.simulation().status(MachineKey::Ai), MachineStatus::Idle);
    }

    #[test]
    fn click_routes_controls() {
        let mut page = page();
        let change = page.document().get_element_by_id("change-scenario").unwrap();
        assert!(page.click(change));
        assert_eq!(page.document().text_of("scenario-title"), Some("Emergency Repair"));

        let button = page.document().query_class("machine-details-btn")[2];
        assert!(page.click(button));
        assert!(page.is_modal_open());
        assert_eq!(page.modal().showing(), Some(MachineKey::Oscar));

        let close = page.document().get_element_by_id(MODAL_CLOSE_ID).unwrap();
        assert!(page.click(close));
        assert!(!page.is_modal_open());
    }

    #[test]
    fn modal_without_close_control_ignores_backdrop_and_escape() {
        let mut page = page();
        let close = page.document().get_element_by_id(MODAL_CLOSE_ID).unwrap();
        assert!(page.document_mut().remove(close));
        assert!(page.show_machine(MachineKey::Ai));

        let modal = page.document().get_element_by_id(MODAL_ID).unwrap();
        assert!(!page.key_down("Escape"));
        assert!(!page.click_modal(modal));
        assert!(!page.click_modal_close());
        assert!(page.is_modal_open());
    }
}
