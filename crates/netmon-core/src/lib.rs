#![forbid(unsafe_code)]

//! Core: request records, transport ingestion, keyed coalescing, and
//! configuration for the network waterfall.

pub mod config;
pub mod event_coalescer;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod mime;
pub mod record;
pub mod timestamp;
pub mod update;
pub mod url_info;

pub use config::{ConfigError, ConfigParse, TickSpacing, WaterfallConfig};
pub use event_coalescer::{CoalesceKey, KeyedCoalescer};
pub use ingest::{IngestError, NetworkEvent, RequestCreated};
pub use mime::ContentCategory;
pub use record::{EventTimings, Phase, PhaseTimings, RequestId, RequestRecord};
pub use timestamp::{TimestampError, parse_timestamp_millis};
pub use update::{AppliedEffect, RequestUpdate, UpdatePatch};
pub use url_info::{UrlCache, UrlParts};
