//! Decorative particle field held at a fixed population.
//!
//! Particles are spawned on a stagger, live for `duration + delay` seconds,
//! and are replaced one-for-one when they expire. A debounced resize clears
//! the field and respawns it against the new viewport width.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, trace};

use crate::config::Span;
use crate::document::Document;
use crate::event::{EventBus, PageEvent};
use crate::fixed::{Millis, secs_to_millis};
use crate::id::{ElementId, ParticleId, TimerId};
use crate::rng::PageRng;
use crate::scheduler::Scheduler;

/// Population and randomization parameters of the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub max_particles: usize,
    /// Spacing between the initial spawns.
    pub stagger_ms: Millis,
    /// Animation duration, in seconds.
    pub duration_secs: Span,
    /// Animation delay, in seconds.
    pub delay_secs: Span,
    pub opacity: Span,
    pub resize_debounce_ms: Millis,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            max_particles: 50,
            stagger_ms: 200,
            duration_secs: Span::new(15.0, 25.0),
            delay_secs: Span::new(0.0, 2.0),
            opacity: Span::new(0.2, 0.8),
            resize_debounce_ms: 250,
        }
    }
}

/// One live particle and its rendered element.
#[derive(Debug, Clone)]
pub struct Particle {
    pub element: ElementId,
    pub left: f64,
    pub duration_secs: f64,
    pub delay_secs: f64,
    pub opacity: f64,
    pub spawned_at: Millis,
    expiry: TimerId,
}

impl Particle {
    pub fn lifetime_ms(&self) -> Millis {
        secs_to_millis(self.duration_secs + self.delay_secs)
    }
}

/// Timed work of the particle field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleTask {
    /// A staggered initial spawn is due.
    Spawn,
    /// A particle's lifetime has elapsed.
    Expire(ParticleId),
    /// The resize debounce settled.
    Respawn,
}

/// Owner of the particle registry.
#[derive(Debug, Clone)]
pub struct ParticleField {
    container: Option<ElementId>,
    particles: SlotMap<ParticleId, Particle>,
    pending_spawns: Vec<TimerId>,
    resize_timer: Option<TimerId>,
    settings: ParticleSettings,
    rng: PageRng,
    width: f64,
}

impl ParticleField {
    /// A field rendering into `container`. `None` disables the field.
    pub fn new(container: Option<ElementId>, settings: ParticleSettings, seed: u64, width: f64) -> Self {
        Self {
            container,
            particles: SlotMap::with_key(),
            pending_spawns: Vec::new(),
            resize_timer: None,
            settings,
            rng: PageRng::new(seed),
            width,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.container.is_some()
    }

    pub fn container(&self) -> Option<ElementId> {
        self.container
    }

    /// Live particle count.
    pub fn count(&self) -> usize {
        self.particles.len()
    }

    /// Initial spawns still waiting on the stagger.
    pub fn pending_spawns(&self) -> usize {
        self.pending_spawns.len()
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, &Particle)> {
        self.particles.iter()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Arm the staggered initial spawns: particle `i` at `i * stagger_ms`.
    pub fn start<T: From<ParticleTask>>(&mut self, sched: &mut Scheduler<T>) -> usize {
        if self.container.is_none() {
            return 0;
        }
        let n = self.settings.max_particles;
        for i in 0..n {
            let delay = self.settings.stagger_ms.saturating_mul(i as Millis);
            let id = sched.schedule(delay, T::from(ParticleTask::Spawn));
            self.pending_spawns.push(id);
        }
        debug!(count = n, stagger = self.settings.stagger_ms, "particle spawns armed");
        n
    }

    /// Note a viewport resize. The respawn fires once resizing has been
    /// quiet for `resize_debounce_ms`.
    pub fn on_resize<T: From<ParticleTask>>(&mut self, sched: &mut Scheduler<T>, width: f64) {
        if self.container.is_none() {
            return;
        }
        self.width = width;
        if let Some(t) = self.resize_timer.take() {
            sched.cancel(t);
        }
        self.resize_timer = Some(sched.schedule(
            self.settings.resize_debounce_ms,
            T::from(ParticleTask::Respawn),
        ));
    }

    /// Apply a fired particle task.
    pub fn handle<T: From<ParticleTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        doc: &mut Document,
        events: &mut EventBus,
        id: TimerId,
        task: ParticleTask,
    ) {
        match task {
            ParticleTask::Spawn => {
                self.pending_spawns.retain(|&t| t != id);
                self.spawn(sched, doc, events);
            }
            ParticleTask::Expire(pid) => {
                let Some(particle) = self.particles.remove(pid) else {
                    return;
                };
                doc.remove(particle.element);
                events.emit(PageEvent::ParticleExpired {
                    particle: pid,
                    at: sched.now(),
                });
                self.spawn(sched, doc, events);
            }
            ParticleTask::Respawn => {
                self.resize_timer = None;
                self.respawn(sched, doc, events);
            }
        }
    }

    /// Clear every particle and pending spawn, then start over.
    pub fn respawn<T: From<ParticleTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        doc: &mut Document,
        events: &mut EventBus,
    ) {
        let Some(container) = self.container else {
            return;
        };
        for t in self.pending_spawns.drain(..) {
            sched.cancel(t);
        }
        for (_, particle) in self.particles.drain() {
            sched.cancel(particle.expiry);
        }
        doc.clear_children(container);
        events.emit(PageEvent::ParticlesRespawned { at: sched.now() });
        debug!(width = self.width, "particle field respawned");
        self.start(sched);
    }

    fn spawn<T: From<ParticleTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        doc: &mut Document,
        events: &mut EventBus,
    ) {
        let Some(container) = self.container.filter(|&c| doc.exists(c)) else {
            trace!("particle container missing");
            return;
        };
        if self.particles.len() >= self.settings.max_particles {
            return;
        }

        let left = self.rng.range(0.0, self.width);
        let duration_secs = self.settings.duration_secs.sample(&mut self.rng);
        let delay_secs = self.settings.delay_secs.sample(&mut self.rng);
        let opacity = self.settings.opacity.sample(&mut self.rng);

        let element = doc.append_new(container, "div");
        doc.add_class(element, "particle");
        doc.set_style(element, "left", &format!("{left:.1}px"));
        doc.set_style(element, "animation-duration", &format!("{duration_secs:.3}s"));
        doc.set_style(element, "animation-delay", &format!("{delay_secs:.3}s"));
        doc.set_style(element, "opacity", &format!("{opacity:.3}"));

        let now = sched.now();
        let lifetime = secs_to_millis(duration_secs + delay_secs);
        let pid = self.particles.insert_with_key(|pid| Particle {
            element,
            left,
            duration_secs,
            delay_secs,
            opacity,
            spawned_at: now,
            expiry: sched.schedule(lifetime, T::from(ParticleTask::Expire(pid))),
        });
        trace!(?pid, lifetime, "particle spawned");
        events.emit(PageEvent::ParticleSpawned {
            particle: pid,
            at: now,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(max: usize) -> (ParticleField, Scheduler<ParticleTask>, Document, EventBus) {
        let mut doc = Document::new();
        let container = doc.append_new(doc.body(), "div");
        doc.set_id(container, "particles");
        let settings = ParticleSettings {
            max_particles: max,
            ..ParticleSettings::default()
        };
        let field = ParticleField::new(Some(container), settings, 42, 1000.0);
        (field, Scheduler::new(), doc, EventBus::default())
    }

    fn run(
        field: &mut ParticleField,
        sched: &mut Scheduler<ParticleTask>,
        doc: &mut Document,
        events: &mut EventBus,
        until: Millis,
    ) {
        while let Some(fired) = sched.pop_due(until) {
            field.handle(sched, doc, events, fired.id, fired.task);
        }
        sched.set_now(until);
    }

    #[test]
    fn initial_spawns_are_staggered() {
        let (mut field, mut sched, mut doc, mut events) = setup(50);
        assert_eq!(field.start(&mut sched), 50);

        run(&mut field, &mut sched, &mut doc, &mut events, 0);
        assert_eq!(field.count(), 1);
        run(&mut field, &mut sched, &mut doc, &mut events, 999);
        assert_eq!(field.count(), 5);
        run(&mut field, &mut sched, &mut doc, &mut events, 9800);
        assert_eq!(field.count(), 50);
        assert_eq!(field.pending_spawns(), 0);

        let container = field.container().unwrap();
        assert_eq!(doc.get(container).unwrap().children().len(), 50);
    }

    #[test]
    fn population_holds_after_expiry() {
        let (mut field, mut sched, mut doc, mut events) = setup(50);
        field.start(&mut sched);
        for t in (10_000..=120_000).step_by(5_000) {
            run(&mut field, &mut sched, &mut doc, &mut events, t);
            assert_eq!(field.count(), 50);
        }
        let container = field.container().unwrap();
        assert_eq!(doc.get(container).unwrap().children().len(), 50);
    }

    #[test]
    fn particle_styles_in_range() {
        let (mut field, mut sched, mut doc, mut events) = setup(20);
        field.start(&mut sched);
        run(&mut field, &mut sched, &mut doc, &mut events, 5_000);
        for (_, p) in field.particles() {
            assert!((0.0..=1000.0).contains(&p.left));
            assert!((15.0..=25.0).contains(&p.duration_secs));
            assert!((0.0..=2.0).contains(&p.delay_secs));
            assert!((0.2..=0.8).contains(&p.opacity));
            assert!(doc.has_class(p.element, "particle"));
            assert!(doc.style(p.element, "animation-duration").unwrap().ends_with('s'));
        }
    }

    #[test]
    fn resize_is_debounced() {
        let (mut field, mut sched, mut doc, mut events) = setup(10);
        field.start(&mut sched);
        run(&mut field, &mut sched, &mut doc, &mut events, 3_000);
        assert_eq!(field.count(), 10);

        field.on_resize(&mut sched, 500.0);
        run(&mut field, &mut sched, &mut doc, &mut events, 3_200);
        field.on_resize(&mut sched, 600.0);
        run(&mut field, &mut sched, &mut doc, &mut events, 3_449);
        assert_eq!(field.count(), 10);

        run(&mut field, &mut sched, &mut doc, &mut events, 3_450);
        let respawns = events
            .iter()
            .filter(|e| matches!(e, PageEvent::ParticlesRespawned { .. }))
            .count();
        assert_eq!(respawns, 1);
        // First respawned particle lands immediately, the rest on the stagger.
        assert_eq!(field.count(), 1);
        assert_eq!(field.width(), 600.0);

        run(&mut field, &mut sched, &mut doc, &mut events, 6_000);
        assert_eq!(field.count(), 10);
        for (_, p) in field.particles() {
            assert!(p.left <= 600.0);
        }
    }

    #[test]
    fn resize_during_stagger_never_overshoots() {
        let (mut field, mut sched, mut doc, mut events) = setup(50);
        field.start(&mut sched);
        run(&mut field, &mut sched, &mut doc, &mut events, 1_000);
        field.on_resize(&mut sched, 800.0);
        for t in (1_100..=40_000).step_by(100) {
            run(&mut field, &mut sched, &mut doc, &mut events, t);
            assert!(field.count() <= 50);
        }
        assert_eq!(field.count(), 50);
    }

    #[test]
    fn missing_container_disables_field() {
        let mut field = ParticleField::new(None, ParticleSettings::default(), 1, 800.0);
        let mut sched: Scheduler<ParticleTask> = Scheduler::new();
        assert_eq!(field.start(&mut sched), 0);
        field.on_resize(&mut sched, 100.0);
        assert!(sched.is_empty());
        assert!(!field.is_enabled());
    }
}
