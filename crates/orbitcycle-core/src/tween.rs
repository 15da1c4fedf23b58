//! Time-based interpolation driven by the scheduler clock.
//!
//! A [`Tween`] knows nothing about what it animates. The owner samples it
//! with the current virtual time on every display frame and writes the
//! value wherever it belongs (a counter's text, the scroll offset).

use crate::fixed::Millis;

/// Easing curve mapping linear progress in `[0, 1]` to eased progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Easing {
    Linear,
    /// `1 - (1 - p)^3`: fast start, gentle landing.
    CubicOut,
    /// Cubic ease in, then cubic ease out.
    CubicInOut,
}

impl Easing {
    /// Apply the curve. Input is clamped to `[0, 1]`.
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::CubicOut => 1.0 - (1.0 - p).powi(3),
            Easing::CubicInOut => {
                if p < 0.5 {
                    4.0 * p * p * p
                } else {
                    1.0 - (-2.0 * p + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// An interpolation from `from` to `to` over `duration` milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    start: Millis,
    duration: Millis,
    easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, start: Millis, duration: Millis, easing: Easing) -> Self {
        Self {
            from,
            to,
            start,
            duration,
            easing,
        }
    }

    pub fn start_value(&self) -> f64 {
        self.from
    }

    pub fn end_value(&self) -> f64 {
        self.to
    }

    /// Time at which the tween reaches its end value.
    pub fn end_time(&self) -> Millis {
        self.start.saturating_add(self.duration)
    }

    /// Linear progress in `[0, 1]`. A zero-length tween is always complete.
    pub fn progress(&self, now: Millis) -> f64 {
        if self.duration == 0 {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start) as f64;
        (elapsed / self.duration as f64).min(1.0)
    }

    /// Eased progress in `[0, 1]`.
    pub fn eased(&self, now: Millis) -> f64 {
        self.easing.apply(self.progress(now))
    }

    /// Interpolated value. Returns exactly `to` once complete, so callers
    /// never see floating drift on the final frame.
    pub fn sample(&self, now: Millis) -> f64 {
        if self.is_finished(now) {
            return self.to;
        }
        self.from + (self.to - self.from) * self.eased(now)
    }

    pub fn is_finished(&self, now: Millis) -> bool {
        self.progress(now) >= 1.0
    }
}
