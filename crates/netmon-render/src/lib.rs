#![forbid(unsafe_code)]

//! Render: time scale, tick policy, tick background, and row geometry for
//! the network waterfall.
//!
//! Everything here is a pure function of bounds, width, and direction, apart
//! from [`TickRasterizer`], which caches the last background it drew.

pub mod color;
pub mod labels;
pub mod scale;
pub mod segment;
pub mod tick_raster;
pub mod transform;

pub use color::Rgba;
pub use labels::{DivisionLabel, division_labels};
pub use scale::{Scale, TickPolicy, TickStep, available_width, compute_scale, compute_scale_with};
pub use segment::{BreakdownEntry, SegmentBox, TimingsBreakdown, WaterfallSegment};
pub use tick_raster::{RasterError, TickImage, TickRasterizer, TickStyle, rasterize};
pub use transform::{Direction, RowTransform, RowTransforms};
