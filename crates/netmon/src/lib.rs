#![forbid(unsafe_code)]

//! netmon public facade crate.
//!
//! Re-exports the common types of the internal crates, a top-level error,
//! and a prelude for day-to-day use.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use netmon_core::config::{ConfigError, WaterfallConfig};
pub use netmon_core::ingest::{IngestError, NetworkEvent, RequestCreated};
pub use netmon_core::logging::{LoggingConfig, LoggingError};
pub use netmon_core::mime::ContentCategory;
pub use netmon_core::record::{EventTimings, Phase, PhaseTimings, RequestId, RequestRecord};
pub use netmon_core::update::{RequestUpdate, UpdatePatch};

// --- Render re-exports -----------------------------------------------------

pub use netmon_render::{
    Direction, DivisionLabel, RasterError, RowTransform, RowTransforms, Scale, TickImage,
    WaterfallSegment,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use netmon_runtime::{
    Filter, RequestListController, RowLayout, SortDirection, SortKey, Summary, WaterfallLayout,
    WaterfallSurface,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for netmon hosts.
#[derive(Debug)]
pub enum Error {
    /// A transport packet was rejected.
    Ingest(IngestError),
    /// The tick background could not be encoded.
    Raster(RasterError),
    /// Environment configuration was invalid.
    Config(Vec<ConfigError>),
    /// The log subscriber could not be installed.
    Logging(LoggingError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingest(err) => write!(f, "{err}"),
            Self::Raster(err) => write!(f, "{err}"),
            Self::Config(errors) => {
                f.write_str("invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
            Self::Logging(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Ingest(err) => Some(err),
            Self::Raster(err) => Some(err),
            Self::Config(errors) => errors
                .first()
                .map(|e| e as &(dyn std::error::Error + 'static)),
            Self::Logging(err) => Some(err),
        }
    }
}

impl From<IngestError> for Error {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<RasterError> for Error {
    fn from(err: RasterError) -> Self {
        Self::Raster(err)
    }
}

impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

/// Standard result type for netmon APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Read [`WaterfallConfig`] from the `NETMON_*` environment variables.
///
/// Fails on any unparseable variable or on a config that does not validate.
pub fn load_config() -> Result<WaterfallConfig> {
    let parsed = WaterfallConfig::from_env();
    if !parsed.errors.is_empty() {
        return Err(Error::Config(parsed.errors));
    }
    parsed.config.validate().map_err(Error::Config)?;
    Ok(parsed.config)
}

/// Install the global log subscriber from `NETMON_LOG` / `NETMON_LOG_JSON`.
pub fn init_logging() -> Result<()> {
    netmon_core::logging::init_subscriber(&LoggingConfig::from_env())?;
    Ok(())
}

/// Decode one JSON transport packet and hand it to `list`.
#[cfg(feature = "runtime")]
pub fn feed_json(list: &mut RequestListController, packet: &str) -> Result<()> {
    list.handle_event(NetworkEvent::from_json(packet)?);
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Direction, Error, NetworkEvent, RequestId, RequestRecord, Result, UpdatePatch,
        WaterfallConfig,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{Filter, RequestListController, SortKey, Summary, WaterfallSurface};

    pub use crate::{core, render};

    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use netmon_core as core;
pub use netmon_render as render;
#[cfg(feature = "runtime")]
pub use netmon_runtime as runtime;
