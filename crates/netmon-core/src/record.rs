#![forbid(unsafe_code)]

//! Observed network exchanges.
//!
//! A [`RequestRecord`] starts out with only the fields known at creation time
//! (start timestamp, method, URL, XHR flag). Everything else arrives later via
//! [`RequestUpdate`](crate::update::RequestUpdate) patches and is therefore
//! optional.
//!
//! # Invariants
//!
//! 1. `started_delta_millis` is assigned once, when the record is added, and
//!    is never rewritten.
//! 2. `ended_millis == started_millis + total_time` whenever `total_time` is
//!    known; it is `None` otherwise.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::update::{AppliedEffect, RequestUpdate};

/// Opaque request identifier assigned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap a transport identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A named sub-duration of a request's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Blocked,
    Dns,
    Connect,
    Send,
    Wait,
    Receive,
}

impl Phase {
    /// Every phase, in lifecycle order.
    pub const ALL: [Phase; 6] = [
        Phase::Blocked,
        Phase::Dns,
        Phase::Connect,
        Phase::Send,
        Phase::Wait,
        Phase::Receive,
    ];

    /// Phases drawn in a row's waterfall segment.
    ///
    /// `Blocked` is reported by the transport but not drawn in rows.
    pub const WATERFALL: [Phase; 5] = [
        Phase::Dns,
        Phase::Connect,
        Phase::Send,
        Phase::Wait,
        Phase::Receive,
    ];

    /// Stable lowercase name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Dns => "dns",
            Self::Connect => "connect",
            Self::Send => "send",
            Self::Wait => "wait",
            Self::Receive => "receive",
        }
    }
}

/// Per-phase durations in milliseconds.
///
/// Missing phases read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTimings {
    #[serde(default)]
    pub blocked: u64,
    #[serde(default)]
    pub dns: u64,
    #[serde(default)]
    pub connect: u64,
    #[serde(default)]
    pub send: u64,
    #[serde(default)]
    pub wait: u64,
    #[serde(default)]
    pub receive: u64,
}

impl PhaseTimings {
    /// Duration of a single phase.
    #[inline]
    pub const fn get(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Blocked => self.blocked,
            Phase::Dns => self.dns,
            Phase::Connect => self.connect,
            Phase::Send => self.send,
            Phase::Wait => self.wait,
            Phase::Receive => self.receive,
        }
    }

    /// Set a single phase.
    pub fn set(&mut self, phase: Phase, millis: u64) {
        match phase {
            Phase::Blocked => self.blocked = millis,
            Phase::Dns => self.dns = millis,
            Phase::Connect => self.connect = millis,
            Phase::Send => self.send = millis,
            Phase::Wait => self.wait = millis,
            Phase::Receive => self.receive = millis,
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, phase: Phase, millis: u64) -> Self {
        self.set(phase, millis);
        self
    }

    /// Sum of all phases, blocked included.
    pub fn total(&self) -> u64 {
        Phase::ALL
            .iter()
            .fold(0u64, |acc, p| acc.saturating_add(self.get(*p)))
    }
}

/// Event timings packet as delivered by the transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTimings {
    #[serde(default)]
    pub timings: PhaseTimings,
    #[serde(default)]
    pub total_time: Option<u64>,
}

/// One observed network exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: RequestId,
    /// Absolute start, unix milliseconds.
    pub started_millis: i64,
    /// Offset from the first registered start.
    pub started_delta_millis: i64,
    pub method: String,
    pub url: String,
    pub is_xhr: bool,

    pub mime_type: Option<String>,
    /// Content size in bytes.
    pub content_size: Option<u64>,
    /// Total time in milliseconds.
    pub total_time: Option<u64>,
    /// Absolute end, unix milliseconds.
    pub ended_millis: Option<i64>,
    pub event_timings: Option<EventTimings>,

    pub request_headers: Option<Value>,
    pub request_cookies: Option<Value>,
    pub request_post_data: Option<Value>,
    pub response_headers: Option<Value>,
    pub response_cookies: Option<Value>,
    pub response_content: Option<Value>,
    pub http_version: Option<String>,
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub headers_size: Option<u64>,
}

impl RequestRecord {
    /// Create a record with only its creation-time fields populated.
    pub fn new(
        id: impl Into<RequestId>,
        started_millis: i64,
        method: impl Into<String>,
        url: impl Into<String>,
        is_xhr: bool,
    ) -> Self {
        Self {
            id: id.into(),
            started_millis,
            started_delta_millis: 0,
            method: method.into(),
            url: url.into(),
            is_xhr,
            mime_type: None,
            content_size: None,
            total_time: None,
            ended_millis: None,
            event_timings: None,
            request_headers: None,
            request_cookies: None,
            request_post_data: None,
            response_headers: None,
            response_cookies: None,
            response_content: None,
            http_version: None,
            status: None,
            status_text: None,
            headers_size: None,
        }
    }

    /// Phase breakdown, if event timings have arrived.
    #[inline]
    pub fn timings(&self) -> Option<&PhaseTimings> {
        self.event_timings.as_ref().map(|t| &t.timings)
    }

    /// End time if known, otherwise the start time.
    #[inline]
    pub fn end_or_start(&self) -> i64 {
        self.ended_millis.unwrap_or(self.started_millis)
    }

    /// Apply a single field update.
    pub fn apply(&mut self, update: &RequestUpdate) -> AppliedEffect {
        match update {
            RequestUpdate::RequestHeaders(v) => self.request_headers = Some(v.clone()),
            RequestUpdate::RequestCookies(v) => self.request_cookies = Some(v.clone()),
            RequestUpdate::RequestPostData(v) => self.request_post_data = Some(v.clone()),
            RequestUpdate::ResponseHeaders(v) => self.response_headers = Some(v.clone()),
            RequestUpdate::ResponseCookies(v) => self.response_cookies = Some(v.clone()),
            RequestUpdate::ResponseContent(v) => self.response_content = Some(v.clone()),
            RequestUpdate::HttpVersion(v) => self.http_version = Some(v.clone()),
            RequestUpdate::Status(v) => {
                self.status = Some(v.clone());
                return AppliedEffect::RowChanged;
            }
            RequestUpdate::StatusText(v) => {
                self.status_text = Some(v.clone());
                return AppliedEffect::RowChanged;
            }
            RequestUpdate::HeadersSize(v) => self.headers_size = Some(*v),
            RequestUpdate::ContentSize(v) => {
                self.content_size = Some(*v);
                return AppliedEffect::RowChanged;
            }
            RequestUpdate::MimeType(v) => {
                self.mime_type = Some(v.clone());
                return AppliedEffect::RowChanged;
            }
            RequestUpdate::TotalTime(v) => {
                self.total_time = Some(*v);
                let total = i64::try_from(*v).unwrap_or(i64::MAX);
                let ended = self.started_millis.saturating_add(total);
                self.ended_millis = Some(ended);
                return AppliedEffect::EndChanged(ended);
            }
            RequestUpdate::EventTimings(v) => {
                self.event_timings = Some(v.clone());
                return AppliedEffect::TimingsChanged;
            }
        }
        AppliedEffect::DetailsOnly
    }
}
