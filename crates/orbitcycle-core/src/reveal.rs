//! Scroll-triggered reveals, counter tweens and spec-bar fills.
//!
//! # Reveal rule
//!
//! A `section` reveals the first time at least `threshold` of its height
//! lies inside the viewport, with the viewport bottom pulled in by
//! `bottom_margin`. Reveals are permanent. Revealing `impact` or `machines`
//! arms their side effect `effect_delay_ms` later.
//!
//! # Counters
//!
//! Each counter is a [`Tween`] from 0 to its `data-target`, sampled on
//! display frames. The text shows `floor(value)` with thousands separators
//! and lands exactly on the target on the last frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::document::{Document, LayoutBox, Viewport};
use crate::event::{EventBus, PageEvent};
use crate::fixed::Millis;
use crate::id::ElementId;
use crate::scheduler::Scheduler;
use crate::tween::{Easing, Tween};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Fraction of a section's height that must be visible.
    pub threshold: f64,
    /// Pixels trimmed off the bottom of the viewport.
    pub bottom_margin: f64,
    /// Delay between a reveal and its counter or bar effect.
    pub effect_delay_ms: Millis,
    pub counter_duration_ms: Millis,
    /// Spacing between consecutive bar fills.
    pub bar_stagger_ms: Millis,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            threshold: 0.2,
            bottom_margin: 50.0,
            effect_delay_ms: 500,
            counter_duration_ms: 2000,
            bar_stagger_ms: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Which set of counters to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterGroup {
    /// Hero statistics (`.stat-number`), run on page load.
    Stats,
    /// Impact metrics (`.metric-value`), run when `impact` reveals.
    Metrics,
}

impl CounterGroup {
    pub fn class(self) -> &'static str {
        match self {
            CounterGroup::Stats => "stat-number",
            CounterGroup::Metrics => "metric-value",
        }
    }
}

/// Timed work of the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealTask {
    Counters(CounterGroup),
    /// Arm the staggered fills of every `.spec-fill`.
    Bars,
    FillBar(ElementId),
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fraction of `layout` inside the viewport after trimming `bottom_margin`.
pub fn visible_fraction(layout: LayoutBox, viewport: &Viewport, bottom_margin: f64) -> f64 {
    let view_top = viewport.scroll_y;
    let view_bottom = viewport.scroll_y + viewport.height - bottom_margin;
    let top = layout.offset_top;
    let bottom = top + layout.height;

    if layout.height <= 0.0 {
        return if top >= view_top && top <= view_bottom { 1.0 } else { 0.0 };
    }
    let overlap = (bottom.min(view_bottom) - top.max(view_top)).max(0.0);
    overlap / layout.height
}

/// Parse a leading integer the lenient way: optional whitespace and sign,
/// then as many digits as there are. Trailing junk is ignored.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let magnitude: i64 = rest[..end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Render an integer with `,` thousands separators.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Animator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Counter {
    element: ElementId,
    target: i64,
    tween: Tween,
}

/// Owner of the revealed-section set and the running counters.
#[derive(Debug, Clone, Default)]
pub struct RevealAnimator {
    settings: RevealSettings,
    revealed: HashSet<ElementId>,
    counters: Vec<Counter>,
}

impl RevealAnimator {
    pub fn new(settings: RevealSettings) -> Self {
        Self {
            settings,
            revealed: HashSet::new(),
            counters: Vec::new(),
        }
    }

    pub fn is_revealed(&self, section: ElementId) -> bool {
        self.revealed.contains(&section)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    /// Whether any counter still needs display frames.
    pub fn is_animating(&self) -> bool {
        !self.counters.is_empty()
    }

    /// Reveal every section that newly meets the threshold. Returns the
    /// number of sections revealed by this call.
    pub fn observe<T: From<RevealTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        doc: &mut Document,
        viewport: &Viewport,
        events: &mut EventBus,
    ) -> usize {
        let mut newly = 0;
        for section in doc.query_tag("section") {
            if self.revealed.contains(&section) {
                continue;
            }
            let Some(layout) = doc.layout(section) else {
                continue;
            };
            let fraction = visible_fraction(layout, viewport, self.settings.bottom_margin);
            if fraction < self.settings.threshold {
                continue;
            }

            self.revealed.insert(section);
            doc.add_class(section, "animate-in");
            newly += 1;

            let id = doc
                .get(section)
                .and_then(|e| e.id())
                .unwrap_or_default()
                .to_string();
            let delay = self.settings.effect_delay_ms;
            match id.as_str() {
                "impact" => {
                    sched.schedule(delay, T::from(RevealTask::Counters(CounterGroup::Metrics)));
                }
                "machines" => {
                    sched.schedule(delay, T::from(RevealTask::Bars));
                }
                _ => {}
            }
            debug!(section = %id, fraction, "section revealed");
            events.emit(PageEvent::SectionRevealed {
                section: id,
                at: sched.now(),
            });
        }
        newly
    }

    /// Apply a fired animator task.
    pub fn handle<T: From<RevealTask>>(
        &mut self,
        sched: &mut Scheduler<T>,
        doc: &mut Document,
        events: &mut EventBus,
        task: RevealTask,
    ) {
        match task {
            RevealTask::Counters(group) => {
                self.start_counters(doc, events, group, sched.now());
            }
            RevealTask::Bars => {
                self.start_bars(sched, doc);
            }
            RevealTask::FillBar(bar) => {
                self.fill_bar(doc, events, bar, sched.now());
            }
        }
    }

    /// Start a tween for every counter in `group` with a readable target.
    /// A counter already running on the same element is restarted.
    pub fn start_counters(
        &mut self,
        doc: &Document,
        events: &mut EventBus,
        group: CounterGroup,
        now: Millis,
    ) -> usize {
        let mut started = 0;
        for element in doc.query_class(group.class()) {
            let Some(target) = doc.attr(element, "data-target").and_then(parse_leading_int) else {
                trace!(?element, "counter without numeric data-target");
                continue;
            };
            self.counters.retain(|c| c.element != element);
            self.counters.push(Counter {
                element,
                target,
                tween: Tween::new(
                    0.0,
                    target as f64,
                    now,
                    self.settings.counter_duration_ms,
                    Easing::CubicOut,
                ),
            });
            events.emit(PageEvent::CounterStarted { target, at: now });
            started += 1;
        }
        debug!(group = group.class(), started, "counters started");
        started
    }

    /// Arm bar `i` of the `.spec-fill` elements at `i * bar_stagger_ms`.
    pub fn start_bars<T: From<RevealTask>>(&mut self, sched: &mut Scheduler<T>, doc: &Document) -> usize {
        let bars = doc.query_class("spec-fill");
        for (i, &bar) in bars.iter().enumerate() {
            let delay = self.settings.bar_stagger_ms.saturating_mul(i as Millis);
            sched.schedule(delay, T::from(RevealTask::FillBar(bar)));
        }
        bars.len()
    }

    /// Set a bar's width from its `data-width`. Returns `false` when the
    /// bar is gone or has no width.
    pub fn fill_bar(&self, doc: &mut Document, events: &mut EventBus, bar: ElementId, now: Millis) -> bool {
        let Some(width) = doc
            .attr(bar, "data-width")
            .filter(|w| !w.is_empty())
            .map(str::to_owned)
        else {
            return false;
        };
        doc.set_style(bar, "width", &format!("{width}%"));
        events.emit(PageEvent::BarFilled { width, at: now });
        true
    }

    /// Write every running counter's value for `now`. Finished counters
    /// show their exact target and stop. Returns whether any remain.
    pub fn render_frame(&mut self, doc: &mut Document, events: &mut EventBus, now: Millis) -> bool {
        self.counters.retain(|counter| {
            let finished = counter.tween.is_finished(now);
            let shown = if finished {
                counter.target
            } else {
                counter.tween.sample(now).floor() as i64
            };
            doc.set_text(counter.element, &format_thousands(shown));
            if finished {
                events.emit(PageEvent::CounterFinished {
                    target: counter.target,
                    at: now,
                });
            }
            !finished
        });
        self.is_animating()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
