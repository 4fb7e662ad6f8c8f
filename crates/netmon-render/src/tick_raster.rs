#![forbid(unsafe_code)]

//! Shared tick background for waterfall rows.
//!
//! The background is a single 1-pixel-tall image as wide as the timeline.
//! Every row reuses it; nothing is drawn per row.
//!
//! # Invariants
//!
//! 1. Ticks are drawn at `scales` nested levels. Level `i` (1-based) places a
//!    pixel every `step_px * 2^i` pixels with alpha `opacity_min +
//!    opacity_add * (i - 1)`. Coarser levels overwrite finer ones.
//! 2. Right-to-left layout maps `x` to `width - x`. The origin tick lands at
//!    `width`, past the last pixel, and is not drawn.
//! 3. [`TickRasterizer`] redraws only when the width or direction changes, or
//!    after [`TickRasterizer::invalidate`]. A new scale alone reuses the
//!    cached image until then.
//!
//! # Failure Modes
//!
//! - No selectable tick step: the image is fully transparent.
//! - Zero width: the image is empty and [`TickImage::encode_png`] fails with
//!   [`RasterError::Empty`].

use std::fmt;
use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, ImageFormat, RgbaImage};
use netmon_core::config::WaterfallConfig;
use tracing::debug;

use crate::color::Rgba;
use crate::scale::{Scale, TickPolicy};
use crate::transform::Direction;

/// Color and nesting of background ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickStyle {
    pub color: Rgba,
    pub opacity_min: u8,
    pub opacity_add: u8,
    pub scales: u32,
}

impl Default for TickStyle {
    fn default() -> Self {
        Self {
            color: Rgba::TICK_GRAY,
            opacity_min: 32,
            opacity_add: 32,
            scales: 3,
        }
    }
}

impl TickStyle {
    #[must_use]
    pub fn from_config(config: &WaterfallConfig) -> Self {
        Self {
            color: Rgba::from_rgb_array(config.tick_color_rgb, 255),
            opacity_min: config.tick_opacity_min,
            opacity_add: config.tick_opacity_add,
            scales: config.background_tick_scales,
        }
    }

    /// Alpha for 1-based nesting level `level`.
    pub fn alpha(&self, level: u32) -> u8 {
        let extra = u32::from(self.opacity_add).saturating_mul(level.saturating_sub(1));
        let alpha = u32::from(self.opacity_min).saturating_add(extra);
        u8::try_from(alpha).unwrap_or(u8::MAX)
    }
}

/// A 1-pixel-tall RGBA strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickImage {
    width: u32,
    pixels: Vec<Rgba>,
}

impl TickImage {
    /// Fully transparent strip.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            pixels: vec![Rgba::TRANSPARENT; width as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> u32 {
        1
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32) -> Option<Rgba> {
        self.pixels.get(x as usize).copied()
    }

    /// Positions of every non-transparent pixel.
    pub fn tick_positions(&self) -> Vec<u32> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.a() != 0)
            .map(|(x, _)| x as u32)
            .collect()
    }

    /// True when no tick was drawn.
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p.a() == 0)
    }

    fn set(&mut self, x: usize, color: Rgba) {
        if let Some(px) = self.pixels.get_mut(x) {
            *px = color;
        }
    }

    /// Encode as a PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        if self.width == 0 {
            return Err(RasterError::Empty);
        }
        let bytes: Vec<u8> = self.pixels.iter().flat_map(|p| p.to_bytes()).collect();
        let buffer = RgbaImage::from_raw(self.width, 1, bytes).ok_or(RasterError::Empty)?;
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(buffer)
            .write_to(&mut out, ImageFormat::Png)
            .map_err(RasterError::Encode)?;
        Ok(out.into_inner())
    }

    /// `data:image/png;base64,...` URL usable as a repeating background.
    pub fn to_data_url(&self) -> Result<String, RasterError> {
        let png = self.encode_png()?;
        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

/// Draw the tick background for `width` pixels at `scale`.
pub fn rasterize(
    width: u32,
    scale: Scale,
    direction: Direction,
    policy: &TickPolicy,
    style: &TickStyle,
) -> TickImage {
    let mut image = TickImage::new(width);
    if width == 0 {
        return image;
    }
    let Some(step) = policy.select_step(scale) else {
        return image;
    };
    let step_px = step.pixels(scale);
    let width_f = f64::from(width);

    for level in 1..=style.scales {
        let increment = step_px * 2f64.powi(i32::try_from(level).unwrap_or(i32::MAX));
        if !increment.is_finite() || increment <= 0.0 {
            continue;
        }
        let color = style.color.with_alpha(style.alpha(level));
        let mut k = 0u64;
        let mut x = 0.0;
        while x < width_f {
            let pos = if direction.is_rtl() { width_f - x } else { x };
            if pos < width_f {
                image.set(pos as usize, color);
            }
            k += 1;
            x = k as f64 * increment;
        }
    }
    image
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CacheKey {
    width: u32,
    direction: Direction,
}

#[derive(Debug, Clone)]
struct CachedImage {
    key: CacheKey,
    scale: Scale,
    image: TickImage,
}

/// Caches the last drawn background.
#[derive(Debug, Clone)]
pub struct TickRasterizer {
    policy: TickPolicy,
    style: TickStyle,
    cached: Option<CachedImage>,
    generation: u64,
}

impl Default for TickRasterizer {
    fn default() -> Self {
        Self::new(TickPolicy::BACKGROUND, TickStyle::default())
    }
}

impl TickRasterizer {
    pub fn new(policy: TickPolicy, style: TickStyle) -> Self {
        Self {
            policy,
            style,
            cached: None,
            generation: 0,
        }
    }

    pub fn from_config(config: &WaterfallConfig) -> Self {
        Self::new(TickPolicy::background(config), TickStyle::from_config(config))
    }

    /// Background for `width`, redrawn only on a width/direction change or
    /// after [`invalidate`](Self::invalidate).
    pub fn background(&mut self, width: u32, scale: Scale, direction: Direction) -> &TickImage {
        let key = CacheKey { width, direction };
        if self.cached.as_ref().is_some_and(|c| c.key != key) {
            self.cached = None;
        }
        let cached = self.cached.get_or_insert_with(|| {
            let image = rasterize(width, scale, direction, &self.policy, &self.style);
            self.generation += 1;
            debug!(
                width,
                scale = scale.px_per_ms(),
                rtl = direction.is_rtl(),
                generation = self.generation,
                "tick background redrawn"
            );
            CachedImage { key, scale, image }
        });
        &cached.image
    }

    /// Drop the cached image so the next call redraws.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// The cached image, if any.
    pub fn cached(&self) -> Option<&TickImage> {
        self.cached.as_ref().map(|c| &c.image)
    }

    /// Scale the cached image was drawn at.
    pub fn cached_scale(&self) -> Option<Scale> {
        self.cached.as_ref().map(|c| c.scale)
    }

    /// Number of redraws so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Failure to produce an encoded background.
#[derive(Debug)]
pub enum RasterError {
    /// The image has no pixels.
    Empty,
    Encode(image::ImageError),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "tick image is empty"),
            Self::Encode(err) => write!(f, "image encode error: {err}"),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Empty => None,
            Self::Encode(err) => Some(err),
        }
    }
}
