//! Page configuration: every timing and population constant in one place.
//!
//! The defaults reproduce the shipped page. A host may override any field
//! from a data file (see the data crate); [`PageConfig::validate`] rejects
//! combinations the engine cannot run with.

use serde::{Deserialize, Serialize};

use crate::fixed::Millis;
use crate::navigation::NavSettings;
use crate::particle::ParticleSettings;
use crate::reveal::RevealSettings;
use crate::rng::PageRng;
use crate::simulation::SimSettings;

/// A closed range `[min, max]` sampled uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut PageRng) -> f64 {
        rng.range(self.min, self.max)
    }

    fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Errors reported by [`PageConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field}: inverted or non-finite range [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("reveal threshold {0} is outside (0, 1]")]
    Threshold(f64),
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },
}

/// All tunables of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub particles: ParticleSettings,
    pub nav: NavSettings,
    pub reveal: RevealSettings,
    pub sim: SimSettings,
    /// Display-frame cadence while a frame-driven animation runs.
    pub frame_interval_ms: Millis,
    /// Duration of a smooth scroll to a section.
    pub smooth_scroll_ms: Millis,
    /// Delay from initialization to the page-load counters and bars.
    pub load_animation_delay_ms: Millis,
    /// How long a dropped waste item keeps its highlight.
    pub drop_highlight_ms: Millis,
    /// Seed for particle randomness.
    pub seed: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            particles: ParticleSettings::default(),
            nav: NavSettings::default(),
            reveal: RevealSettings::default(),
            sim: SimSettings::default(),
            frame_interval_ms: 16,
            smooth_scroll_ms: 600,
            load_animation_delay_ms: 1000,
            drop_highlight_ms: 1000,
            seed: 0x0B17_C1C1E,
        }
    }
}

impl PageConfig {
    /// Check the configuration for values the engine cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.particles;
        for (field, span) in [
            ("particles.duration_secs", p.duration_secs),
            ("particles.delay_secs", p.delay_secs),
            ("particles.opacity", p.opacity),
        ] {
            if !span.is_valid() || span.min < 0.0 {
                return Err(ConfigError::InvalidRange {
                    field,
                    min: span.min,
                    max: span.max,
                });
            }
        }
        if p.duration_secs.max <= 0.0 {
            return Err(ConfigError::Zero {
                field: "particles.duration_secs",
            });
        }

        let threshold = self.reveal.threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Threshold(threshold));
        }

        for (field, value) in [
            ("reveal.bottom_margin", self.reveal.bottom_margin),
            ("nav.fallback_height", self.nav.fallback_height),
            ("nav.lead", self.nav.lead),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Zero {
                field: "frame_interval_ms",
            });
        }
        if self.reveal.counter_duration_ms == 0 {
            return Err(ConfigError::Zero {
                field: "reveal.counter_duration_ms",
            });
        }
        Ok(())
    }
}
