#![forbid(unsafe_code)]

//! Pixels-per-millisecond scale and tick-interval selection.
//!
//! # Invariants
//!
//! 1. A [`Scale`] always lies in `[min_scale, 1]` (by default `[EPSILON, 1]`).
//! 2. A zero, negative, or NaN span maps to the ceiling `1`.
//! 3. [`TickPolicy::select_step`] returns the smallest power-of-two multiple
//!    of the base step whose on-screen spacing reaches the minimum, or `None`
//!    once the doubling ceiling is exceeded.

use netmon_core::config::{EPSILON, TickSpacing, WaterfallConfig};
use tracing::trace;

/// A clamped pixels-per-millisecond ratio.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Scale(f64);

impl Scale {
    /// One pixel per millisecond, the upper bound.
    pub const MAX: Self = Self(1.0);
    /// The default floor.
    pub const MIN: Self = Self(EPSILON);

    /// Clamp an arbitrary ratio into `[EPSILON, 1]`. NaN maps to the floor.
    #[must_use]
    pub fn clamped(ratio: f64) -> Self {
        Self::clamped_with(ratio, EPSILON)
    }

    fn clamped_with(ratio: f64, min: f64) -> Self {
        let min = if min > 0.0 && min <= 1.0 { min } else { EPSILON };
        if ratio.is_nan() {
            Self(min)
        } else {
            Self(ratio.clamp(min, 1.0))
        }
    }

    #[inline]
    pub const fn px_per_ms(self) -> f64 {
        self.0
    }

    /// Milliseconds per pixel (`1 / scale`), used to undo row scaling on
    /// caps and labels.
    #[inline]
    pub fn inverse(self) -> f64 {
        1.0 / self.0
    }

    /// Pixel length of a duration.
    #[inline]
    pub fn to_px(self, millis: f64) -> f64 {
        millis * self.0
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::MAX
    }
}

/// Width left for the timeline once the trailing safe bounds are reserved.
#[must_use]
pub fn available_width(waterfall_width: f64, safe_bounds: f64) -> f64 {
    let width = waterfall_width - safe_bounds;
    if width > 0.0 { width } else { 0.0 }
}

/// `clamp(available_width / span, EPSILON, 1)`.
#[must_use]
pub fn compute_scale(available_width: f64, span_millis: f64) -> Scale {
    compute_scale_with(available_width, span_millis, EPSILON)
}

/// [`compute_scale`] with a configurable floor.
#[must_use]
pub fn compute_scale_with(available_width: f64, span_millis: f64, min_scale: f64) -> Scale {
    if span_millis.is_nan() || span_millis <= 0.0 {
        return Scale::MAX;
    }
    Scale::clamped_with(available_width / span_millis, min_scale)
}

/// A selected tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStep {
    /// Interval in milliseconds (`base << doublings`).
    pub millis: u64,
    /// How many times the base step was doubled.
    pub doublings: u32,
}

impl TickStep {
    /// On-screen spacing of this step at `scale`.
    #[inline]
    pub fn pixels(self, scale: Scale) -> f64 {
        scale.to_px(self.millis as f64)
    }
}

/// Base step, spacing threshold, and doubling ceiling for one tick family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickPolicy {
    pub base_step_millis: u64,
    pub min_spacing_px: f64,
    pub max_doublings: u32,
}

impl TickPolicy {
    /// Header division labels: 5 ms base, at least 60 px apart.
    pub const HEADER: Self = Self {
        base_step_millis: 5,
        min_spacing_px: 60.0,
        max_doublings: 32,
    };

    /// Background tick lines: 5 ms base, at least 10 px apart.
    pub const BACKGROUND: Self = Self {
        base_step_millis: 5,
        min_spacing_px: 10.0,
        max_doublings: 32,
    };

    #[must_use]
    pub const fn from_spacing(spacing: TickSpacing, max_doublings: u32) -> Self {
        Self {
            base_step_millis: spacing.base_step_millis,
            min_spacing_px: spacing.min_spacing_px,
            max_doublings,
        }
    }

    /// Header policy from configuration.
    #[must_use]
    pub fn header(config: &WaterfallConfig) -> Self {
        Self::from_spacing(config.header_ticks, config.max_tick_doublings)
    }

    /// Background policy from configuration.
    #[must_use]
    pub fn background(config: &WaterfallConfig) -> Self {
        Self::from_spacing(config.background_ticks, config.max_tick_doublings)
    }

    #[must_use]
    pub const fn with_max_doublings(mut self, max_doublings: u32) -> Self {
        self.max_doublings = max_doublings;
        self
    }

    /// Double the base step until ticks are at least `min_spacing_px` apart.
    ///
    /// Returns `None` when more than `max_doublings` doublings would be
    /// needed (or the step overflows): no ticks are rendered then.
    pub fn select_step(&self, scale: Scale) -> Option<TickStep> {
        let mut step = self.base_step_millis;
        let mut doublings = 0u32;
        while scale.to_px(step as f64) < self.min_spacing_px {
            if doublings >= self.max_doublings {
                trace!(
                    base = self.base_step_millis,
                    scale = scale.px_per_ms(),
                    "tick step ceiling reached"
                );
                return None;
            }
            step = step.checked_mul(2)?;
            doublings += 1;
        }
        Some(TickStep {
            millis: step,
            doublings,
        })
    }
}
