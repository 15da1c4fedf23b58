//! Navigation: smooth scrolling to sections and active-link tracking.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::document::Document;
use crate::fixed::Millis;
use crate::id::ElementId;
use crate::tween::{Easing, Tween};

/// Scroll-offset parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavSettings {
    /// Navbar height assumed when the page has no `.navbar`.
    pub fallback_height: f64,
    /// Extra lead above a section before it counts as current.
    pub lead: f64,
}

impl Default for NavSettings {
    fn default() -> Self {
        Self {
            fallback_height: 80.0,
            lead: 100.0,
        }
    }
}

/// Tracks the highlighted section and any smooth scroll in flight.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    settings: NavSettings,
    active: Option<String>,
    scroll: Option<Tween>,
}

impl NavigationController {
    pub fn new(settings: NavSettings) -> Self {
        Self {
            settings,
            active: None,
            scroll: None,
        }
    }

    /// Id of the section whose link is highlighted.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_some()
    }

    /// Where the current smooth scroll is headed.
    pub fn scroll_destination(&self) -> Option<f64> {
        self.scroll.map(|t| t.end_value())
    }

    /// Height of the `.navbar`, or the fallback when there is none.
    pub fn navbar_height(&self, doc: &Document) -> f64 {
        doc.query_class("navbar")
            .first()
            .and_then(|&nav| doc.layout(nav))
            .map_or(self.settings.fallback_height, |l| l.height)
    }

    /// Scroll offset that puts `section_id` just below the navbar.
    pub fn scroll_target(&self, doc: &Document, section_id: &str) -> Option<f64> {
        let section = doc.get_element_by_id(section_id)?;
        let layout = doc.layout(section)?;
        Some((layout.offset_top - self.navbar_height(doc)).max(0.0))
    }

    /// Start a smooth scroll from `from` to the section. Returns `false`
    /// for an unknown id.
    pub fn scroll_to_section(
        &mut self,
        doc: &Document,
        section_id: &str,
        from: f64,
        now: Millis,
        duration: Millis,
    ) -> bool {
        let Some(target) = self.scroll_target(doc, section_id) else {
            trace!(section_id, "scroll target missing");
            return false;
        };
        self.scroll = Some(Tween::new(from, target, now, duration, Easing::CubicInOut));
        true
    }

    /// Handle a click on a `.nav-link`: scroll to its `#section`, make it
    /// the only active link, and close the mobile menu. Returns `false`
    /// when the link has no usable `href`.
    pub fn click_link(
        &mut self,
        doc: &mut Document,
        link: ElementId,
        from: f64,
        now: Millis,
        duration: Millis,
    ) -> bool {
        let Some(section_id) = doc
            .attr(link, "href")
            .and_then(|href| href.strip_prefix('#'))
            .map(str::to_owned)
        else {
            trace!(?link, "nav link without fragment href");
            return false;
        };

        self.scroll_to_section(doc, &section_id, from, now, duration);

        for other in doc.query_class("nav-link") {
            doc.remove_class(other, "active");
        }
        doc.add_class(link, "active");
        if let Some(menu) = doc.get_element_by_id("nav-menu") {
            doc.remove_class(menu, "active");
        }
        true
    }

    /// Toggle the mobile menu. `None` when the hamburger or menu is absent,
    /// otherwise whether the menu is now open.
    pub fn toggle_menu(&self, doc: &mut Document) -> Option<bool> {
        doc.get_element_by_id("nav-hamburger")?;
        let menu = doc.get_element_by_id("nav-menu")?;
        Some(doc.toggle_class(menu, "active"))
    }

    /// Recompute the current section for `scroll_y` and highlight its link.
    /// Returns `true` when the current section changed.
    pub fn update_active(&mut self, doc: &mut Document, scroll_y: f64) -> bool {
        let nav_height = self.navbar_height(doc);
        let mut current: Option<String> = None;
        for section in doc.query_tag("section") {
            let Some(layout) = doc.layout(section) else {
                continue;
            };
            let top = layout.offset_top - nav_height - self.settings.lead;
            if scroll_y >= top && scroll_y < top + layout.height {
                // A matching section without an id clears the highlight.
                current = doc.get(section).and_then(|e| e.id()).map(str::to_owned);
            }
        }

        for link in doc.query_class("nav-link") {
            let matches = match (&current, doc.attr(link, "href")) {
                (Some(id), Some(href)) => href.strip_prefix('#') == Some(id.as_str()),
                _ => false,
            };
            if matches {
                doc.add_class(link, "active");
            } else {
                doc.remove_class(link, "active");
            }
        }

        let changed = current != self.active;
        self.active = current;
        changed
    }

    /// Sample the smooth scroll at `now`. Returns the new offset, or `None`
    /// when no scroll is running. The scroll ends after its final sample.
    pub fn scroll_frame(&mut self, now: Millis) -> Option<f64> {
        let tween = self.scroll?;
        let y = tween.sample(now);
        if tween.is_finished(now) {
            self.scroll = None;
        }
        Some(y)
    }

    /// Abandon any smooth scroll in flight.
    pub fn cancel_scroll(&mut self) {
        self.scroll = None;
    }
}
