#![forbid(unsafe_code)]

//! Header division labels ("0 ms", "80 ms", ...).

use netmon_core::format::format_millis;

use crate::scale::{Scale, TickPolicy};
use crate::transform::Direction;

/// One header label.
#[derive(Debug, Clone, PartialEq)]
pub struct DivisionLabel {
    /// Time at this division, rounded to whole milliseconds.
    pub millis: u64,
    /// Display text, e.g. `"160 ms"`.
    pub text: String,
    /// Horizontal offset in whole pixels; negative for right-to-left.
    pub offset_px: i64,
}

/// Labels every selected step across `available_width`.
///
/// Empty when no step satisfies `policy` (see [`TickPolicy::select_step`]).
pub fn division_labels(
    available_width: f64,
    scale: Scale,
    policy: &TickPolicy,
    direction: Direction,
) -> Vec<DivisionLabel> {
    let Some(step) = policy.select_step(scale) else {
        return Vec::new();
    };
    let step_px = step.pixels(scale);
    if !step_px.is_finite() || step_px <= 0.0 || !available_width.is_finite() {
        return Vec::new();
    }

    let mut labels = Vec::new();
    let mut i = 0u64;
    let mut x = 0.0;
    while x < available_width {
        let millis = (x / scale.px_per_ms()).round() as u64;
        labels.push(DivisionLabel {
            millis,
            text: format_millis(millis),
            offset_px: (direction.sign() * x).trunc() as i64,
        });
        i += 1;
        x = i as f64 * step_px;
    }
    labels
}
