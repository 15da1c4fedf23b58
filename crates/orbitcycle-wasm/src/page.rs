//! Page lifecycle, time, and navigation input exports.

use orbitcycle_core::config::PageConfig;
use orbitcycle_core::document::Viewport;
use orbitcycle_core::layout::{SECTIONS, standard_page};
use orbitcycle_core::page::Page;
use tracing::debug;

use crate::{
    HANDLE_TABLE, PageSlot, RESULT_INVALID_ARGUMENT, RESULT_INVALID_HANDLE, RESULT_NO_EFFECT,
    RESULT_NOT_FOUND, RESULT_NULL_POINTER, RESULT_OK, with_page,
};

/// Create and initialize a standard page with a `width` x `height`
/// viewport and particle seed `seed`.
///
/// Returns a handle (>= 0) on success, or -1 if no slot is available.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_create(width: f64, height: f64, seed: u64) -> i32 {
    HANDLE_TABLE.with(|table| {
        let mut table = table.borrow_mut();
        let Some(idx) = table.iter().position(Option::is_none) else {
            debug!("handle table full");
            return -1;
        };
        let config = PageConfig {
            seed,
            ..PageConfig::default()
        };
        let mut page = Page::new(standard_page(), Viewport::new(width, height), config);
        page.initialize();
        let mut slot = PageSlot {
            page,
            event_cache: Vec::new(),
        };
        slot.collect_events();
        table[idx] = Some(slot);
        debug!(handle = idx, "page created");
        idx as i32
    })
}

/// Destroy the page at `handle` and free its slot.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_destroy(handle: i32) -> i32 {
    HANDLE_TABLE.with(|table| {
        let mut table = table.borrow_mut();
        let Some(slot) = usize::try_from(handle)
            .ok()
            .and_then(|idx| table.get_mut(idx))
        else {
            return RESULT_INVALID_HANDLE;
        };
        if slot.take().is_none() {
            return RESULT_INVALID_HANDLE;
        }
        debug!(handle, "page destroyed");
        RESULT_OK
    })
}

/// Advance virtual time by `ms`. Clears the event cache first.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_advance(handle: i32, ms: u64) -> i32 {
    with_page(handle, |slot| {
        slot.event_cache.clear();
        slot.page.advance(ms);
        RESULT_OK
    })
}

/// The user scrolled to `y`.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_scroll(handle: i32, y: f64) -> i32 {
    if !y.is_finite() {
        return RESULT_INVALID_ARGUMENT;
    }
    with_page(handle, |slot| {
        slot.page.scroll_to(y);
        RESULT_OK
    })
}

/// The window was resized.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_resize(handle: i32, width: f64, height: f64) -> i32 {
    if !(width.is_finite() && height.is_finite()) {
        return RESULT_INVALID_ARGUMENT;
    }
    with_page(handle, |slot| {
        slot.page.resize(width, height);
        RESULT_OK
    })
}

/// The Escape key was pressed. [`RESULT_NO_EFFECT`] if no modal was open.
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_escape(handle: i32) -> i32 {
    with_page(handle, |slot| {
        if slot.page.key_down("Escape") {
            RESULT_OK
        } else {
            RESULT_NO_EFFECT
        }
    })
}

/// Toggle the mobile menu and write whether it is now open (0/1).
///
/// # Safety
///
/// `out_open` must be a valid, aligned pointer to a `u32`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn orbitcycle_toggle_menu(handle: i32, out_open: *mut u32) -> i32 {
    if out_open.is_null() {
        return RESULT_NULL_POINTER;
    }
    with_page(handle, |slot| match slot.page.toggle_menu() {
        Some(open) => {
            unsafe { *out_open = u32::from(open) };
            RESULT_OK
        }
        None => RESULT_NOT_FOUND,
    })
}

/// Click the nav link for section code `section` (see [`SECTIONS`]).
#[unsafe(no_mangle)]
pub extern "C" fn orbitcycle_nav_click(handle: i32, section: u32) -> i32 {
    let Some(&(id, _, _)) = SECTIONS.get(section as usize) else {
        return RESULT_INVALID_ARGUMENT;
    };
    with_page(handle, |slot| {
        if slot.page.click_nav_section(id) {
            RESULT_OK
        } else {
            RESULT_NOT_FOUND
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_PAGES, reset_table};

    fn viewport_of(handle: i32) -> Viewport {
        HANDLE_TABLE.with(|t| {
            let table = t.borrow();
            *table[handle as usize].as_ref().unwrap().page.viewport()
        })
    }

    #[test]
    fn create_returns_valid_handle() {
        reset_table();
        let h = orbitcycle_create(1280.0, 800.0, 1);
        assert!(h >= 0);
        assert!((h as usize) < MAX_PAGES);
        assert_eq!(orbitcycle_destroy(h), RESULT_OK);
        reset_table();
    }

    #[test]
    fn table_fills_and_reuses_slots() {
        reset_table();
        let handles: Vec<i32> = (0..MAX_PAGES)
            .map(|i| orbitcycle_create(800.0, 600.0, i as u64))
            .collect();
        assert!(handles.iter().all(|&h| h >= 0));
        assert_eq!(orbitcycle_create(800.0, 600.0, 0), -1);

        assert_eq!(orbitcycle_destroy(handles[3]), RESULT_OK);
        assert_eq!(orbitcycle_create(800.0, 600.0, 0), 3);
        reset_table();
    }

    #[test]
    fn destroy_invalid_handle_returns_error() {
        reset_table();
        assert_eq!(orbitcycle_destroy(-1), RESULT_INVALID_HANDLE);
        assert_eq!(orbitcycle_destroy(99), RESULT_INVALID_HANDLE);
        assert_eq!(orbitcycle_destroy(0), RESULT_INVALID_HANDLE);
        reset_table();
    }

    #[test]
    fn advance_and_input_on_dead_handle() {
        reset_table();
        assert_eq!(orbitcycle_advance(5, 16), RESULT_INVALID_HANDLE);
        assert_eq!(orbitcycle_scroll(5, 10.0), RESULT_INVALID_HANDLE);
        assert_eq!(orbitcycle_escape(-3), RESULT_INVALID_HANDLE);
        reset_table();
    }

    #[test]
    fn scroll_and_resize_reach_the_viewport() {
        reset_table();
        let h = orbitcycle_create(1280.0, 800.0, 0);
        assert_eq!(orbitcycle_scroll(h, 420.0), RESULT_OK);
        assert_eq!(orbitcycle_resize(h, 640.0, 480.0), RESULT_OK);
        let vp = viewport_of(h);
        assert_eq!(vp.scroll_y, 420.0);
        assert_eq!(vp.width, 640.0);
        assert_eq!(orbitcycle_scroll(h, f64::NAN), RESULT_INVALID_ARGUMENT);
        reset_table();
    }

    #[test]
    fn nav_click_scrolls_over_frames() {
        reset_table();
        let h = orbitcycle_create(1280.0, 800.0, 0);
        assert_eq!(orbitcycle_nav_click(h, 9), RESULT_INVALID_ARGUMENT);
        // "impact" sits at 3400 below a 70px navbar.
        assert_eq!(orbitcycle_nav_click(h, 3), RESULT_OK);
        for _ in 0..45 {
            orbitcycle_advance(h, 16);
        }
        assert_eq!(viewport_of(h).scroll_y, 3330.0);
        reset_table();
    }

    #[test]
    fn toggle_menu_reports_state() {
        reset_table();
        let h = orbitcycle_create(1280.0, 800.0, 0);
        let mut open = 9u32;
        assert_eq!(unsafe { orbitcycle_toggle_menu(h, &mut open) }, RESULT_OK);
        assert_eq!(open, 1);
        assert_eq!(unsafe { orbitcycle_toggle_menu(h, &mut open) }, RESULT_OK);
        assert_eq!(open, 0);
        assert_eq!(
            unsafe { orbitcycle_toggle_menu(h, std::ptr::null_mut()) },
            RESULT_NULL_POINTER
        );
        reset_table();
    }

    #[test]
    fn escape_without_modal_has_no_effect() {
        reset_table();
        let h = orbitcycle_create(1280.0, 800.0, 0);
        assert_eq!(orbitcycle_escape(h), RESULT_NO_EFFECT);
        reset_table();
    }
}
