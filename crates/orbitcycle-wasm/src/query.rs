//! Query WASM exports. Every query writes through out-pointers and returns
//! a result code.

use crate::{RESULT_NULL_POINTER, RESULT_OK, read_into, with_page};

/// Write the resource tally. Real-valued resources are raw Q32.32 bits.
///
/// # Safety
///
/// Every pointer must be a valid, aligned pointer to its type.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_tally(
    handle: i32,
    out_water: *mut i64,
    out_tools: *mut u32,
    out_fuel: *mut i64,
    out_shield: *mut i64,
) -> i32 {
    if out_water.is_null() || out_tools.is_null() || out_fuel.is_null() || out_shield.is_null() {
        return RESULT_NULL_POINTER;
    }
    with_page(handle, |slot| {
        let tally = slot.page.tally();
        unsafe {
            *out_water = tally.water.to_bits();
            *out_tools = tally.tools;
            *out_fuel = tally.fuel.to_bits();
            *out_shield = tally.shield.to_bits();
        }
        RESULT_OK
    })
}

/// Write the current mission day to `*out_day`.
///
/// # Safety
///
/// `out_day` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_mission_day(handle: i32, out_day: *mut u32) -> i32 {
    unsafe { read_into(handle, out_day, |slot| slot.page.mission_day()) }
}

/// Write the index of the current scenario to `*out_index`.
///
/// # Safety
///
/// `out_index` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_scenario_index(handle: i32, out_index: *mut u32) -> i32 {
    unsafe {
        read_into(handle, out_index, |slot| {
            slot.page.simulation().scenario_index() as u32
        })
    }
}

/// Write the number of live particles to `*out_count`.
///
/// # Safety
///
/// `out_count` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_particle_count(handle: i32, out_count: *mut u32) -> i32 {
    unsafe { read_into(handle, out_count, |slot| slot.page.particles().count() as u32) }
}

/// Write 1 if the machine modal is open, 0 otherwise.
///
/// # Safety
///
/// `out_open` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_modal_open(handle: i32, out_open: *mut u32) -> i32 {
    unsafe { read_into(handle, out_open, |slot| u32::from(slot.page.is_modal_open())) }
}

/// Write the page's virtual time in milliseconds to `*out_now`.
///
/// # Safety
///
/// `out_now` must be a valid, aligned pointer to a `u64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_now(handle: i32, out_now: *mut u64) -> i32 {
    unsafe { read_into(handle, out_now, |slot| slot.page.now()) }
}
