#![forbid(unsafe_code)]

//! Waterfall configuration.
//!
//! Defaults reproduce the stock network monitor. Any value can be overridden
//! through `NETMON_*` environment variables; a bad value keeps the default
//! and is reported in [`ConfigParse::errors`] instead of failing the load.
//!
//! | Variable                          | Field                         |
//! |-----------------------------------|-------------------------------|
//! | `NETMON_UPDATE_DELAY_MS`          | `update_delay_ms`             |
//! | `NETMON_RESIZE_DELAY_MS`          | `resize_delay_ms`             |
//! | `NETMON_LAZY_UPDATES`             | `lazy_updates`                |
//! | `NETMON_WATERFALL_SAFE_BOUNDS`    | `waterfall_safe_bounds_px`    |
//! | `NETMON_HEADER_TICK_SPACING`      | `header_ticks.min_spacing_px` |
//! | `NETMON_BACKGROUND_TICK_SPACING`  | `background_ticks.min_spacing_px` |
//! | `NETMON_BACKGROUND_TICK_SCALES`   | `background_tick_scales`      |
//! | `NETMON_MAX_TICK_DOUBLINGS`       | `max_tick_doublings`          |

use std::env;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENV_UPDATE_DELAY_MS: &str = "NETMON_UPDATE_DELAY_MS";
pub const ENV_RESIZE_DELAY_MS: &str = "NETMON_RESIZE_DELAY_MS";
pub const ENV_LAZY_UPDATES: &str = "NETMON_LAZY_UPDATES";
pub const ENV_WATERFALL_SAFE_BOUNDS: &str = "NETMON_WATERFALL_SAFE_BOUNDS";
pub const ENV_HEADER_TICK_SPACING: &str = "NETMON_HEADER_TICK_SPACING";
pub const ENV_BACKGROUND_TICK_SPACING: &str = "NETMON_BACKGROUND_TICK_SPACING";
pub const ENV_BACKGROUND_TICK_SCALES: &str = "NETMON_BACKGROUND_TICK_SCALES";
pub const ENV_MAX_TICK_DOUBLINGS: &str = "NETMON_MAX_TICK_DOUBLINGS";

/// Smallest allowed pixels-per-millisecond.
pub const EPSILON: f64 = 0.001;

/// Base step and minimum on-screen spacing for one family of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSpacing {
    /// Smallest tick interval considered, in milliseconds.
    pub base_step_millis: u64,
    /// Ticks closer than this (in pixels) are too crowded.
    pub min_spacing_px: f64,
}

/// Configuration for the request list and its waterfall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterfallConfig {
    /// Quiescence window for batched data updates (ms).
    pub update_delay_ms: u64,
    /// Quiescence window for viewport resizes (ms).
    pub resize_delay_ms: u64,
    /// When false, every update is flushed immediately.
    pub lazy_updates: bool,
    /// Pixels reserved at the end of the waterfall column.
    pub waterfall_safe_bounds_px: f64,
    /// Header division labels.
    pub header_ticks: TickSpacing,
    /// Background tick lines.
    pub background_ticks: TickSpacing,
    /// Number of nested background tick scales.
    pub background_tick_scales: u32,
    /// Background tick color.
    pub tick_color_rgb: [u8; 3],
    /// Alpha of the finest background tick scale.
    pub tick_opacity_min: u8,
    /// Alpha added per coarser nesting level.
    pub tick_opacity_add: u8,
    /// Floor of the pixels-per-millisecond scale.
    pub min_scale: f64,
    /// Upper bound on tick-step doublings before giving up on ticks.
    pub max_tick_doublings: u32,
    /// Decimals used for row content sizes.
    pub content_size_decimals: usize,
    /// Decimals used for header sizes in the details pane.
    pub headers_size_decimals: usize,
}

impl Default for WaterfallConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 50,
            resize_delay_ms: 50,
            lazy_updates: true,
            waterfall_safe_bounds_px: 90.0,
            header_ticks: TickSpacing {
                base_step_millis: 5,
                min_spacing_px: 60.0,
            },
            background_ticks: TickSpacing {
                base_step_millis: 5,
                min_spacing_px: 10.0,
            },
            background_tick_scales: 3,
            tick_color_rgb: [128, 136, 144],
            tick_opacity_min: 32,
            tick_opacity_add: 32,
            min_scale: EPSILON,
            max_tick_doublings: 32,
            content_size_decimals: 2,
            headers_size_decimals: 3,
        }
    }
}

impl WaterfallConfig {
    /// Update quiescence window.
    #[inline]
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    /// Resize quiescence window.
    #[inline]
    pub fn resize_delay(&self) -> Duration {
        Duration::from_millis(self.resize_delay_ms)
    }

    #[must_use]
    pub fn with_update_delay_ms(mut self, ms: u64) -> Self {
        self.update_delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_resize_delay_ms(mut self, ms: u64) -> Self {
        self.resize_delay_ms = ms;
        self
    }

    /// Flush every update immediately instead of coalescing.
    #[must_use]
    pub fn with_lazy_updates(mut self, lazy: bool) -> Self {
        self.lazy_updates = lazy;
        self
    }

    #[must_use]
    pub fn with_safe_bounds(mut self, px: f64) -> Self {
        self.waterfall_safe_bounds_px = px;
        self
    }

    #[must_use]
    pub fn with_background_tick_scales(mut self, scales: u32) -> Self {
        self.background_tick_scales = scales;
        self
    }

    #[must_use]
    pub fn with_max_tick_doublings(mut self, doublings: u32) -> Self {
        self.max_tick_doublings = doublings;
        self
    }

    /// Parse config from environment variables.
    #[must_use]
    pub fn from_env() -> ConfigParse {
        Self::from_env_with(|key| env::var(key).ok())
    }

    /// Parse config using a custom environment lookup (for tests).
    pub fn from_env_with<F>(mut get: F) -> ConfigParse
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let mut errors = Vec::new();

        if let Some(value) = get(ENV_UPDATE_DELAY_MS) {
            match value.trim().parse::<u64>() {
                Ok(parsed) => config.update_delay_ms = parsed,
                Err(_) => errors.push(ConfigError::new(
                    "update_delay_ms",
                    value,
                    "expected milliseconds",
                )),
            }
        }

        if let Some(value) = get(ENV_RESIZE_DELAY_MS) {
            match value.trim().parse::<u64>() {
                Ok(parsed) => config.resize_delay_ms = parsed,
                Err(_) => errors.push(ConfigError::new(
                    "resize_delay_ms",
                    value,
                    "expected milliseconds",
                )),
            }
        }

        if let Some(value) = get(ENV_LAZY_UPDATES) {
            match parse_bool(&value) {
                Some(parsed) => config.lazy_updates = parsed,
                None => errors.push(ConfigError::new(
                    "lazy_updates",
                    value,
                    "expected bool (1/0/true/false)",
                )),
            }
        }

        if let Some(value) = get(ENV_WATERFALL_SAFE_BOUNDS) {
            match parse_px(&value) {
                Some(parsed) => config.waterfall_safe_bounds_px = parsed,
                None => errors.push(ConfigError::new(
                    "waterfall_safe_bounds_px",
                    value,
                    "expected non-negative pixels",
                )),
            }
        }

        if let Some(value) = get(ENV_HEADER_TICK_SPACING) {
            match parse_px(&value) {
                Some(parsed) => config.header_ticks.min_spacing_px = parsed,
                None => errors.push(ConfigError::new(
                    "header_ticks.min_spacing_px",
                    value,
                    "expected non-negative pixels",
                )),
            }
        }

        if let Some(value) = get(ENV_BACKGROUND_TICK_SPACING) {
            match parse_px(&value) {
                Some(parsed) => config.background_ticks.min_spacing_px = parsed,
                None => errors.push(ConfigError::new(
                    "background_ticks.min_spacing_px",
                    value,
                    "expected non-negative pixels",
                )),
            }
        }

        if let Some(value) = get(ENV_BACKGROUND_TICK_SCALES) {
            match value.trim().parse::<u32>() {
                Ok(parsed) => config.background_tick_scales = parsed,
                Err(_) => errors.push(ConfigError::new(
                    "background_tick_scales",
                    value,
                    "expected non-negative integer",
                )),
            }
        }

        if let Some(value) = get(ENV_MAX_TICK_DOUBLINGS) {
            match value.trim().parse::<u32>() {
                Ok(parsed) => config.max_tick_doublings = parsed,
                Err(_) => errors.push(ConfigError::new(
                    "max_tick_doublings",
                    value,
                    "expected non-negative integer",
                )),
            }
        }

        if let Err(mut violations) = config.validate() {
            errors.append(&mut violations);
        }

        ConfigParse { config, errors }
    }

    /// Validate config constraints and return all violations.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        if self.header_ticks.base_step_millis == 0 {
            errors.push(ConfigError::new(
                "header_ticks.base_step_millis",
                "0",
                "must be > 0",
            ));
        }
        if self.background_ticks.base_step_millis == 0 {
            errors.push(ConfigError::new(
                "background_ticks.base_step_millis",
                "0",
                "must be > 0",
            ));
        }
        if !(self.min_scale > 0.0 && self.min_scale <= 1.0) {
            errors.push(ConfigError::new(
                "min_scale",
                self.min_scale.to_string(),
                "must be in (0, 1]",
            ));
        }
        if self.max_tick_doublings > 62 {
            errors.push(ConfigError::new(
                "max_tick_doublings",
                self.max_tick_doublings.to_string(),
                "must be <= 62",
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Serialize to a single JSON line (for diagnostics).
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Result of parsing configuration from the environment.
#[derive(Debug, Clone)]
pub struct ConfigParse {
    pub config: WaterfallConfig,
    pub errors: Vec<ConfigError>,
}

/// A configuration value that was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub value: String,
    pub message: String,
}

impl ConfigError {
    fn new(field: &'static str, value: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={} ({})", self.field, self.value, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_px(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
