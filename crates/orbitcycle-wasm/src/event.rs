//! Event polling WASM exports.
//!
//! Hosts read the flat event cache with a count followed by indexed reads:
//!
//! ```text
//! orbitcycle_advance(h, 16);
//! orbitcycle_event_count(h, &count);
//! for i in 0..count { orbitcycle_read_event(h, i, &event); }
//! ```

use orbitcycle_core::event::EventKind;

use crate::{
    FlatEvent, RESULT_INVALID_ARGUMENT, RESULT_NOT_FOUND, RESULT_NULL_POINTER, RESULT_OK,
    read_into, with_page,
};

/// Event kinds in [`FlatEvent::kind`] order.
const KINDS: [EventKind; 16] = [
    EventKind::ParticleSpawned,
    EventKind::ParticleExpired,
    EventKind::ParticlesRespawned,
    EventKind::SectionRevealed,
    EventKind::NavActivated,
    EventKind::CounterStarted,
    EventKind::CounterFinished,
    EventKind::BarFilled,
    EventKind::ModalOpened,
    EventKind::ModalClosed,
    EventKind::ProcessingStarted,
    EventKind::ProcessingCompleted,
    EventKind::ProcessingSuperseded,
    EventKind::MachineIdle,
    EventKind::ScenarioChanged,
    EventKind::SimulationReset,
];

/// Write the number of cached events to `*out_count`.
///
/// # Safety
///
/// `out_count` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_event_count(handle: i32, out_count: *mut u32) -> i32 {
    unsafe { read_into(handle, out_count, |slot| slot.event_cache.len() as u32) }
}

/// Copy cached event `index` into `*out_event`.
///
/// # Safety
///
/// `out_event` must be a valid, aligned pointer to a [`FlatEvent`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_read_event(
    handle: i32,
    index: u32,
    out_event: *mut FlatEvent,
) -> i32 {
    if out_event.is_null() {
        return RESULT_NULL_POINTER;
    }
    with_page(handle, |slot| match slot.event_cache.get(index as usize) {
        Some(event) => {
            unsafe { *out_event = *event };
            RESULT_OK
        }
        None => RESULT_NOT_FOUND,
    })
}

/// Stop (`suppressed != 0`) or resume recording events of kind `kind`.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_suppress_event(handle: i32, kind: u32, suppressed: u32) -> i32 {
    let Some(&kind) = KINDS.get(kind as usize) else {
        return RESULT_INVALID_ARGUMENT;
    };
    with_page(handle, |slot| {
        let events = slot.page.events_mut();
        if suppressed != 0 {
            events.suppress(kind);
        } else {
            events.unsuppress(kind);
        }
        RESULT_OK
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
