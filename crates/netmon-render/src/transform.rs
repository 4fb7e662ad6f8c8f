#![forbid(unsafe_code)]

//! Horizontal transforms applied to each waterfall row.
//!
//! A row's timing segment is drawn in unscaled units (1 px per ms) and then
//! scaled by the shared [`Scale`] and shifted by the row's start delta. Caps
//! and the total-time label sit inside the scaled segment, so they carry the
//! inverse scale to keep their natural size.

use crate::scale::Scale;

/// Layout direction of the waterfall column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    /// `1.0` for left-to-right, `-1.0` for right-to-left.
    #[inline]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Ltr => 1.0,
            Self::Rtl => -1.0,
        }
    }

    #[inline]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

/// `translateX(translate_x) scaleX(scale_x)` for one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowTransform {
    pub translate_x: f64,
    pub scale_x: f64,
}

impl RowTransform {
    pub const IDENTITY: Self = Self {
        translate_x: 0.0,
        scale_x: 1.0,
    };

    /// Map a point in element-local units to row pixels.
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        (x + self.translate_x) * self.scale_x
    }
}

impl Default for RowTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transforms for every positioned element of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowTransforms {
    pub timings: RowTransform,
    pub start_cap: RowTransform,
    pub end_cap: RowTransform,
    pub total_label: RowTransform,
}

impl RowTransforms {
    pub fn compute(started_delta_millis: i64, scale: Scale, direction: Direction) -> Self {
        let sign = direction.sign();
        let inverse = scale.inverse();
        Self {
            timings: RowTransform {
                translate_x: sign * started_delta_millis as f64,
                scale_x: scale.px_per_ms(),
            },
            start_cap: RowTransform {
                translate_x: sign * 0.5,
                scale_x: inverse,
            },
            end_cap: RowTransform {
                translate_x: sign * -0.5,
                scale_x: inverse,
            },
            total_label: RowTransform {
                translate_x: 0.0,
                scale_x: inverse,
            },
        }
    }
}
