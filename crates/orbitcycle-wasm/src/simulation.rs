//! Simulation and machine-detail exports.

use crate::{
    RESULT_INVALID_ARGUMENT, RESULT_NO_EFFECT, RESULT_NOT_FOUND, RESULT_NULL_POINTER, RESULT_OK,
    machine_from_code, waste_from_code, with_page,
};

/// Drag the waste item with code `waste` onto the simulation slot of
/// machine `machine`, as the user would.
///
/// Returns [`RESULT_NOT_FOUND`] if either element is missing from the page,
/// and [`RESULT_NO_EFFECT`] if the drop started nothing.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_drop_waste(handle: i32, waste: u32, machine: u32) -> i32 {
    let (Some(waste), Some(machine)) = (waste_from_code(waste), machine_from_code(machine)) else {
        return RESULT_INVALID_ARGUMENT;
    };
    with_page(handle, |slot| {
        let doc = slot.page.document();
        let item = doc
            .query_class("waste-item")
            .into_iter()
            .find(|&i| doc.attr(i, "data-type") == Some(waste.as_str()));
        let target = doc.get_element_by_id(&format!("sim-{machine}"));
        let (Some(item), Some(target)) = (item, target) else {
            return RESULT_NOT_FOUND;
        };
        if slot.page.drag_and_drop(item, target) {
            RESULT_OK
        } else {
            RESULT_NO_EFFECT
        }
    })
}

/// Queue every waste item on the page for staggered processing and write
/// how many were queued.
///
/// # Safety
///
/// `out_queued` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_process_all(handle: i32, out_queued: *mut u32) -> i32 {
    if out_queued.is_null() {
        return RESULT_NULL_POINTER;
    }
    with_page(handle, |slot| {
        let queued = slot.page.process_all();
        unsafe { *out_queued = queued as u32 };
        RESULT_OK
    })
}

/// Zero the tally, restart at day 1, idle every machine, and cancel every
/// pending transition.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_reset(handle: i32) -> i32 {
    with_page(handle, |slot| {
        slot.page.reset_simulation();
        RESULT_OK
    })
}

/// Step to the next scenario.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_change_scenario(handle: i32) -> i32 {
    with_page(handle, |slot| {
        slot.page.change_scenario();
        RESULT_OK
    })
}

/// Open the detail modal for machine `machine`.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_show_machine(handle: i32, machine: u32) -> i32 {
    let Some(key) = machine_from_code(machine) else {
        return RESULT_INVALID_ARGUMENT;
    };
    with_page(handle, |slot| {
        if slot.page.show_machine(key) {
            RESULT_OK
        } else {
            RESULT_NOT_FOUND
        }
    })
}

/// Click the modal's close control.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_close_modal(handle: i32) -> i32 {
    with_page(handle, |slot| {
        if slot.page.click_modal_close() {
            RESULT_OK
        } else {
            RESULT_NO_EFFECT
        }
    })
}
