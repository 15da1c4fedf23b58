//! Orbitcycle Core -- the behavior engine of the space-recycling showcase page.
//!
//! The page is modeled headlessly: an in-memory [`document::Document`]
//! stands in for the DOM, and a virtual-time [`scheduler::Scheduler`]
//! stands in for browser timers and animation frames. Everything is
//! deterministic, so a run can be replayed exactly in tests.
//!
//! # Components
//!
//! - [`particle::ParticleField`] -- decorative particles held at a fixed
//!   population.
//! - [`navigation::NavigationController`] -- smooth scrolling and the
//!   active nav link.
//! - [`reveal::RevealAnimator`] -- one-shot section reveals, counters, and
//!   spec-bar fills.
//! - [`catalog::Catalog`] -- frozen machine profiles.
//! - [`modal::ModalPresenter`] -- the machine detail overlay.
//! - [`simulation::SimulationEngine`] -- machine slots, the resource tally,
//!   and scenarios.
//!
//! [`page::Page`] owns one of each and routes host input to them.
//!
//! # Driving a page
//!
//! ```rust,ignore
//! let mut page = Page::new(layout::standard_page(), Viewport::default(), PageConfig::default());
//! page.initialize();
//! page.advance(16);
//! for event in page.drain_events() {
//!     // ...
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod document;
pub mod event;
pub mod fixed;
pub mod id;
pub mod layout;
pub mod modal;
pub mod navigation;
pub mod page;
pub mod particle;
pub mod reveal;
pub mod rng;
pub mod scenario;
pub mod scheduler;
pub mod simulation;
pub mod tween;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
