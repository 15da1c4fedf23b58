//! Typed page events with a bounded ring buffer.
//!
//! Components report what happened (a particle spawned, a section revealed,
//! a machine finished processing) as [`PageEvent`]s. The [`EventBus`]
//! records them for the host to drain after each `advance` and forwards
//! them to passive listeners as they are emitted.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]. Suppressed
//! events are neither buffered nor delivered. Particle churn is the usual
//! candidate: it emits two events every few seconds forever.

use std::collections::VecDeque;

use crate::fixed::{Fixed64, Millis};
use crate::id::{MachineKey, ParticleId, WasteKind};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A page event. All events carry the virtual time at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    // -- Particles --
    ParticleSpawned {
        particle: ParticleId,
        at: Millis,
    },
    ParticleExpired {
        particle: ParticleId,
        at: Millis,
    },
    ParticlesRespawned {
        at: Millis,
    },

    // -- Navigation & reveal --
    SectionRevealed {
        section: String,
        at: Millis,
    },
    NavActivated {
        section: Option<String>,
        at: Millis,
    },
    CounterStarted {
        target: i64,
        at: Millis,
    },
    CounterFinished {
        target: i64,
        at: Millis,
    },
    BarFilled {
        width: String,
        at: Millis,
    },

    // -- Modal --
    ModalOpened {
        machine: MachineKey,
        at: Millis,
    },
    ModalClosed {
        at: Millis,
    },

    // -- Simulation --
    ProcessingStarted {
        machine: MachineKey,
        waste: WasteKind,
        at: Millis,
    },
    ProcessingCompleted {
        machine: MachineKey,
        waste: WasteKind,
        water: Fixed64,
        tools: u32,
        fuel: Fixed64,
        shield: Fixed64,
        mission_day: u32,
        at: Millis,
    },
    ProcessingSuperseded {
        machine: MachineKey,
        at: Millis,
    },
    MachineIdle {
        machine: MachineKey,
        at: Millis,
    },
    ScenarioChanged {
        index: usize,
        id: String,
        at: Millis,
    },
    SimulationReset {
        cancelled_timers: usize,
        at: Millis,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ParticleSpawned,
    ParticleExpired,
    ParticlesRespawned,
    SectionRevealed,
    NavActivated,
    CounterStarted,
    CounterFinished,
    BarFilled,
    ModalOpened,
    ModalClosed,
    ProcessingStarted,
    ProcessingCompleted,
    ProcessingSuperseded,
    MachineIdle,
    ScenarioChanged,
    SimulationReset,
}

impl PageEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> EventKind {
        match self {
            PageEvent::ParticleSpawned { .. } => EventKind::ParticleSpawned,
            PageEvent::ParticleExpired { .. } => EventKind::ParticleExpired,
            PageEvent::ParticlesRespawned { .. } => EventKind::ParticlesRespawned,
            PageEvent::SectionRevealed { .. } => EventKind::SectionRevealed,
            PageEvent::NavActivated { .. } => EventKind::NavActivated,
            PageEvent::CounterStarted { .. } => EventKind::CounterStarted,
            PageEvent::CounterFinished { .. } => EventKind::CounterFinished,
            PageEvent::BarFilled { .. } => EventKind::BarFilled,
            PageEvent::ModalOpened { .. } => EventKind::ModalOpened,
            PageEvent::ModalClosed { .. } => EventKind::ModalClosed,
            PageEvent::ProcessingStarted { .. } => EventKind::ProcessingStarted,
            PageEvent::ProcessingCompleted { .. } => EventKind::ProcessingCompleted,
            PageEvent::ProcessingSuperseded { .. } => EventKind::ProcessingSuperseded,
            PageEvent::MachineIdle { .. } => EventKind::MachineIdle,
            PageEvent::ScenarioChanged { .. } => EventKind::ScenarioChanged,
            PageEvent::SimulationReset { .. } => EventKind::SimulationReset,
        }
    }

    /// Virtual time at which the event occurred.
    pub fn at(&self) -> Millis {
        match self {
            PageEvent::ParticleSpawned { at, .. }
            | PageEvent::ParticleExpired { at, .. }
            | PageEvent::ParticlesRespawned { at }
            | PageEvent::SectionRevealed { at, .. }
            | PageEvent::NavActivated { at, .. }
            | PageEvent::CounterStarted { at, .. }
            | PageEvent::CounterFinished { at, .. }
            | PageEvent::BarFilled { at, .. }
            | PageEvent::ModalOpened { at, .. }
            | PageEvent::ModalClosed { at }
            | PageEvent::ProcessingStarted { at, .. }
            | PageEvent::ProcessingCompleted { at, .. }
            | PageEvent::ProcessingSuperseded { at, .. }
            | PageEvent::MachineIdle { at, .. }
            | PageEvent::ScenarioChanged { at, .. }
            | PageEvent::SimulationReset { at, .. } => *at,
        }
    }
}

impl EventKind {
    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

// ---------------------------------------------------------------------------
// EventBuffer: bounded FIFO
// ---------------------------------------------------------------------------

/// Bounded event FIFO. Pushing onto a full buffer evicts the oldest event.
#[derive(Debug)]
pub struct EventBuffer {
    events: VecDeque<PageEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventBuffer {
    /// `capacity` is at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: PageEvent) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events evicted unread since creation.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageEvent> {
        self.events.iter()
    }

    pub fn drain(&mut self) -> Vec<PageEvent> {
        self.events.drain(..).collect()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A passive listener receives events read-only, as they are emitted.
pub type PassiveListener = Box<dyn FnMut(&PageEvent)>;

/// Default number of buffered events before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Records page events and fans them out to listeners.
pub struct EventBus {
    buffer: EventBuffer,
    /// One bit per [`EventKind`].
    suppressed: u16,
    listeners: Vec<(Option<EventKind>, PassiveListener)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffered", &self.buffer.len())
            .field("dropped", &self.buffer.dropped())
            .field("suppressed", &format_args!("{:#06x}", self.suppressed))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    /// Create a new event bus buffering up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity),
            suppressed: 0,
            listeners: Vec::new(),
        }
    }

    /// Stop recording and delivering an event kind.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed |= kind.bit();
    }

    /// Resume recording an event kind.
    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed &= !kind.bit();
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed & kind.bit() != 0
    }

    /// Register a listener for one event kind, or for all kinds with `None`.
    pub fn on(&mut self, kind: Option<EventKind>, listener: PassiveListener) {
        self.listeners.push((kind, listener));
    }

    /// Record an event and deliver it to matching listeners.
    pub fn emit(&mut self, event: PageEvent) {
        let kind = event.kind();
        if self.is_suppressed(kind) {
            return;
        }
        for (filter, listener) in &mut self.listeners {
            if filter.is_none_or(|k| k == kind) {
                listener(&event);
            }
        }
        self.buffer.push(event);
    }

    /// Buffered events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &PageEvent> {
        self.buffer.iter()
    }

    /// Buffered events of one kind, oldest first.
    pub fn iter_kind(&self, kind: EventKind) -> impl Iterator<Item = &PageEvent> {
        self.buffer.iter().filter(move |e| e.kind() == kind)
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Remove and return every buffered event, oldest first.
    pub fn drain(&mut self) -> Vec<PageEvent> {
        self.buffer.drain()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn closed(at: Millis) -> PageEvent {
        PageEvent::ModalClosed { at }
    }

    #[test]
    fn full_buffer_evicts_oldest() {
        let mut buf = EventBuffer::new(3);
        for t in 0..5 {
            buf.push(closed(t));
        }
        let times: Vec<Millis> = buf.iter().map(|e| e.at()).collect();
        assert_eq!(times, vec![2, 3, 4]);
        assert_eq!(buf.dropped(), 2);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut buf = EventBuffer::new(0);
        buf.push(closed(1));
        assert_eq!(buf.capacity(), 1);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn drain_empties_in_order() {
        let mut bus = EventBus::new(8);
        bus.emit(closed(1));
        bus.emit(PageEvent::ParticlesRespawned { at: 2 });
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].at(), 1);
        assert_eq!(events[1].kind(), EventKind::ParticlesRespawned);
        assert!(bus.is_empty());
    }

    #[test]
    fn drain_after_wraparound() {
        let mut bus = EventBus::new(2);
        for t in 0..3 {
            bus.emit(closed(t));
        }
        let times: Vec<Millis> = bus.drain().iter().map(|e| e.at()).collect();
        assert_eq!(times, vec![1, 2]);
        bus.emit(closed(9));
        assert_eq!(bus.drain()[0].at(), 9);
    }

    #[test]
    fn suppressed_kinds_are_not_recorded() {
        let mut bus = EventBus::default();
        bus.suppress(EventKind::ModalClosed);
        bus.emit(closed(1));
        assert!(bus.is_empty());
        bus.unsuppress(EventKind::ModalClosed);
        bus.emit(closed(2));
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn listeners_filter_by_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::default();
        let sink = Rc::clone(&seen);
        bus.on(
            Some(EventKind::ModalClosed),
            Box::new(move |e| sink.borrow_mut().push(e.at())),
        );
        bus.emit(PageEvent::ParticlesRespawned { at: 1 });
        bus.emit(closed(2));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn iter_kind_filters() {
        let mut bus = EventBus::default();
        bus.emit(closed(1));
        bus.emit(PageEvent::ParticlesRespawned { at: 2 });
        bus.emit(closed(3));
        assert_eq!(bus.iter_kind(EventKind::ModalClosed).count(), 2);
    }
}
