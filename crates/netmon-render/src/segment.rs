#![forbid(unsafe_code)]

//! Per-row timing segments and the details-pane timings breakdown.

use netmon_core::format::format_millis;
use netmon_core::record::{EventTimings, Phase, PhaseTimings};

/// One drawn phase box, in unscaled pixels (1 px per ms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBox {
    pub phase: Phase,
    pub width_px: f64,
}

/// The phase boxes drawn inside a waterfall row.
///
/// Blocked time is not drawn. Phases of zero length get no box. The start and
/// end caps take the color of the first and last drawn box.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallSegment {
    pub boxes: Vec<SegmentBox>,
    pub start_cap: Option<Phase>,
    pub end_cap: Option<Phase>,
    /// Text of the trailing total-time label.
    pub total_label: Option<String>,
}

impl WaterfallSegment {
    pub fn build(timings: &EventTimings) -> Self {
        let boxes: Vec<SegmentBox> = Phase::WATERFALL
            .iter()
            .map(|&phase| SegmentBox {
                phase,
                width_px: timings.timings.get(phase) as f64,
            })
            .filter(|b| b.width_px > 0.0)
            .collect();
        Self {
            start_cap: boxes.first().map(|b| b.phase),
            end_cap: boxes.last().map(|b| b.phase),
            total_label: timings.total_time.map(format_millis),
            boxes,
        }
    }

    /// Unscaled length of all boxes.
    pub fn width_px(&self) -> f64 {
        self.boxes.iter().map(|b| b.width_px).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

/// One phase in the details breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakdownEntry {
    pub phase: Phase,
    pub millis: u64,
    pub offset_px: f64,
    pub width_px: f64,
}

/// Phase bars for the timings tab, laid out across half the pane width.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingsBreakdown {
    /// Pixels per millisecond for this pane.
    pub scale: f64,
    pub entries: Vec<BreakdownEntry>,
    pub total_label: String,
}

impl TimingsBreakdown {
    /// `scale = max((pane_width / 2) / total_time, 0)`; each entry starts
    /// where the previous phases (blocked included) end.
    pub fn compute(timings: &PhaseTimings, total_time: u64, pane_width: f64) -> Self {
        let scale = if total_time == 0 {
            0.0
        } else {
            let s = (pane_width / 2.0) / total_time as f64;
            if s.is_finite() && s > 0.0 { s } else { 0.0 }
        };

        let mut elapsed = 0u64;
        let entries = Phase::ALL
            .iter()
            .map(|&phase| {
                let millis = timings.get(phase);
                let entry = BreakdownEntry {
                    phase,
                    millis,
                    offset_px: elapsed as f64 * scale,
                    width_px: millis as f64 * scale,
                };
                elapsed = elapsed.saturating_add(millis);
                entry
            })
            .collect();

        Self {
            scale,
            entries,
            total_label: format_millis(total_time),
        }
    }

    pub fn entry(&self, phase: Phase) -> Option<&BreakdownEntry> {
        self.entries.iter().find(|e| e.phase == phase)
    }
}
