//! WASM bindings for the Orbitcycle page engine.
//!
//! This crate exposes a C-compatible, integer-handle-based API so a browser
//! host can drive a headless [`Page`] from JavaScript: it forwards user
//! input, calls `orbitcycle_advance` once per animation frame, and mirrors
//! the resulting document changes and events onto the real DOM. The same
//! API also works as a plain `cdylib` on native targets.
//!
//! # Handle Table
//!
//! Pages are referenced by integer handles (indices into a fixed-size,
//! thread-local handle table). Up to [`MAX_PAGES`] pages may exist at once.
//!
//! # Codes
//!
//! Machines are passed by [`MachineKey::index`] order (`ai`, `refab`,
//! `oscar`, `hmc`, `facm`); waste by [`WasteKind::KNOWN`] order (`plastic`,
//! `metal`, `paper`, `fabric`, `organic`, `foam`); sections by
//! [`SECTIONS`] order. Fixed-point values cross the boundary as raw
//! Q32.32 bits.
//!
//! # Pull-based Events
//!
//! Every export that changes a page appends the events it produced to that
//! page's flat event cache. `orbitcycle_advance` clears the cache first, so
//! after an advance the cache holds exactly that frame's events plus any
//! input events that follow it.

pub mod event;
pub mod page;
pub mod query;
pub mod simulation;

use std::cell::RefCell;

use orbitcycle_core::event::PageEvent;
use orbitcycle_core::id::{MachineKey, ParticleId, WasteKind};
use orbitcycle_core::layout::SECTIONS;
use orbitcycle_core::page::Page;
use orbitcycle_core::reveal::parse_leading_int;

use slotmap::Key;

// ---------------------------------------------------------------------------
// Result codes
// ---------------------------------------------------------------------------

/// Success.
pub const RESULT_OK: i32 = 0;
/// The page handle is invalid.
pub const RESULT_INVALID_HANDLE: i32 = 1;
/// The target element, section, or event does not exist.
pub const RESULT_NOT_FOUND: i32 = 2;
/// A machine, waste, section, or event-kind code is out of range.
pub const RESULT_INVALID_ARGUMENT: i32 = 3;
/// The input was valid but changed nothing (e.g. Escape with no modal).
pub const RESULT_NO_EFFECT: i32 = 4;
/// An out-pointer was null.
pub const RESULT_NULL_POINTER: i32 = 5;

/// Code used in [`FlatEvent`] fields that carry no value.
pub const CODE_NONE: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Handle table
// ---------------------------------------------------------------------------

/// Maximum number of simultaneous page instances.
pub const MAX_PAGES: usize = 16;

/// Per-page state held in the handle table.
pub struct PageSlot {
    pub page: Page,
    pub event_cache: Vec<FlatEvent>,
}

impl PageSlot {
    /// Move the page's buffered events into the flat cache.
    fn collect_events(&mut self) {
        let events = self.page.drain_events();
        self.event_cache.extend(events.iter().map(convert_event));
    }
}

/// Flat, `repr(C)` event representation for WASM consumers.
///
/// `kind` is the [`EventKind`](orbitcycle_core::event::EventKind)
/// discriminant. Field use per kind:
///
/// | kind | `machine` | `waste` | `value` | `water`/`fuel`/`shield` |
/// |------|-----------|---------|---------|-------------------------|
/// | particle spawned/expired | | | particle id | |
/// | section revealed, nav activated | | | section code | |
/// | counter started/finished | | | target | |
/// | bar filled | | | width percent | |
/// | modal opened | machine | | | |
/// | processing started | machine | waste | | |
/// | processing completed | machine | waste | mission day, tools in `tools` | yields |
/// | superseded, idle | machine | | | |
/// | scenario changed | | | scenario index | |
/// | simulation reset | | | cancelled timers | |
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatEvent {
    pub kind: u32,
    pub machine: u32,
    pub waste: u32,
    pub tools: u32,
    pub at: u64,
    pub value: i64,
    pub water: i64,
    pub fuel: i64,
    pub shield: i64,
}

impl Default for FlatEvent {
    fn default() -> Self {
        Self {
            kind: 0,
            machine: CODE_NONE,
            waste: CODE_NONE,
            tools: 0,
            at: 0,
            value: 0,
            water: 0,
            fuel: 0,
            shield: 0,
        }
    }
}

thread_local! {
    static HANDLE_TABLE: RefCell<Vec<Option<PageSlot>>> = RefCell::new({
        let mut v = Vec::with_capacity(MAX_PAGES);
        v.resize_with(MAX_PAGES, || None);
        v
    });
}

/// Run a closure with mutable access to the [`PageSlot`] at `handle`.
/// Returns [`RESULT_INVALID_HANDLE`] if the handle is out of range or empty.
///
/// Events the closure causes are collected into the slot's cache.
fn with_page<F>(handle: i32, f: F) -> i32
where
    F: FnOnce(&mut PageSlot) -> i32,
{
    HANDLE_TABLE.with(|table| {
        let mut table = table.borrow_mut();
        let Ok(idx) = usize::try_from(handle) else {
            return RESULT_INVALID_HANDLE;
        };
        match table.get_mut(idx).and_then(Option::as_mut) {
            Some(slot) => {
                let rc = f(slot);
                slot.collect_events();
                rc
            }
            None => RESULT_INVALID_HANDLE,
        }
    })
}

/// Like [`with_page`], but writes the closure's value to `out`.
///
/// # Safety
///
/// `out` must be null or a valid, aligned pointer to a `V`.
unsafe fn read_into<V, F>(handle: i32, out: *mut V, f: F) -> i32
where
    F: FnOnce(&PageSlot) -> V,
{
    if out.is_null() {
        return RESULT_NULL_POINTER;
    }
    with_page(handle, |slot| {
        let value = f(slot);
        // SAFETY: checked non-null above; the caller guarantees alignment.
        unsafe { *out = value };
        RESULT_OK
    })
}

// ---------------------------------------------------------------------------
// Code conversion
// ---------------------------------------------------------------------------

fn machine_from_code(code: u32) -> Option<MachineKey> {
    MachineKey::from_index(code as usize)
}

fn waste_from_code(code: u32) -> Option<WasteKind> {
    WasteKind::KNOWN.get(code as usize).cloned()
}

fn waste_to_code(waste: &WasteKind) -> u32 {
    WasteKind::KNOWN
        .iter()
        .position(|k| k == waste)
        .map_or(CODE_NONE, |i| i as u32)
}

fn section_to_code(section: &str) -> i64 {
    SECTIONS
        .iter()
        .position(|(id, _, _)| *id == section)
        .map_or(i64::from(CODE_NONE), |i| i as i64)
}

fn particle_to_ffi(id: ParticleId) -> i64 {
    id.data().as_ffi() as i64
}

// ---------------------------------------------------------------------------
// Event conversion
// ---------------------------------------------------------------------------

fn convert_event(event: &PageEvent) -> FlatEvent {
    let base = FlatEvent {
        kind: event.kind() as u32,
        at: event.at(),
        ..Default::default()
    };
    match event {
        PageEvent::ParticleSpawned { particle, .. } | PageEvent::ParticleExpired { particle, .. } => {
            FlatEvent {
                value: particle_to_ffi(*particle),
                ..base
            }
        }
        PageEvent::SectionRevealed { section, .. } => FlatEvent {
            value: section_to_code(section),
            ..base
        },
        PageEvent::NavActivated { section, .. } => FlatEvent {
            value: section
                .as_deref()
                .map_or(i64::from(CODE_NONE), section_to_code),
            ..base
        },
        PageEvent::CounterStarted { target, .. } | PageEvent::CounterFinished { target, .. } => {
            FlatEvent {
                value: *target,
                ..base
            }
        }
        PageEvent::BarFilled { width, .. } => FlatEvent {
            value: parse_leading_int(width).unwrap_or(0),
            ..base
        },
        PageEvent::ModalOpened { machine, .. }
        | PageEvent::ProcessingSuperseded { machine, .. }
        | PageEvent::MachineIdle { machine, .. } => FlatEvent {
            machine: machine.index() as u32,
            ..base
        },
        PageEvent::ProcessingStarted { machine, waste, .. } => FlatEvent {
            machine: machine.index() as u32,
            waste: waste_to_code(waste),
            ..base
        },
        PageEvent::ProcessingCompleted {
            machine,
            waste,
            water,
            tools,
            fuel,
            shield,
            mission_day,
            ..
        } => FlatEvent {
            machine: machine.index() as u32,
            waste: waste_to_code(waste),
            tools: *tools,
            value: i64::from(*mission_day),
            water: water.to_bits(),
            fuel: fuel.to_bits(),
            shield: shield.to_bits(),
            ..base
        },
        PageEvent::ScenarioChanged { index, .. } => FlatEvent {
            value: *index as i64,
            ..base
        },
        PageEvent::SimulationReset {
            cancelled_timers, ..
        } => FlatEvent {
            value: *cancelled_timers as i64,
            ..base
        },
        PageEvent::ParticlesRespawned { .. } | PageEvent::ModalClosed { .. } => base,
    }
}

// ---------------------------------------------------------------------------
// Linear-memory allocator exports
// ---------------------------------------------------------------------------

/// Allocate `size` bytes aligned to `align` in the WASM linear memory, for
/// out-pointer buffers. Returns null on failure.
///
/// # Safety
///
/// `align` must be a non-zero power of two.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_alloc(size: usize, align: usize) -> *mut u8 {
    if size == 0 || align == 0 || !align.is_power_of_two() {
        return std::ptr::null_mut();
    }
    match std::alloc::Layout::from_size_align(size, align) {
        // SAFETY: the layout has non-zero size.
        Ok(layout) => unsafe { std::alloc::alloc(layout) },
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a region previously allocated by [`orbitcycle_alloc`].
///
/// # Safety
///
/// `ptr` must have been returned by `orbitcycle_alloc` with the same `size`
/// and `align`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_free(ptr: *mut u8, size: usize, align: usize) {
    if ptr.is_null() || size == 0 || align == 0 || !align.is_power_of_two() {
        return;
    }
    if let Ok(layout) = std::alloc::Layout::from_size_align(size, align) {
        // SAFETY: caller guarantees ptr/size/align match a previous alloc.
        unsafe { std::alloc::dealloc(ptr, layout) };
    }
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------

/// Destroy every page so tests on the same thread don't leak into each other.
#[cfg(test)]
pub(crate) fn reset_table() {
    HANDLE_TABLE.with(|table| {
        for slot in table.borrow_mut().iter_mut() {
            *slot = None;
        }
    });
}
