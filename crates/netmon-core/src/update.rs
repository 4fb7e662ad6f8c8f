#![forbid(unsafe_code)]

//! Partial-field updates for request records.
//!
//! The transport delivers updates as `{ fieldName: value, .. }` objects. Each
//! recognized field name maps to one [`RequestUpdate`] variant carrying a
//! typed payload. Unrecognized names are ignored, and so are `null` values:
//! an absent value means "no-op for this field", never "clear the field".

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::record::EventTimings;

/// A single recognized field update.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestUpdate {
    RequestHeaders(Value),
    RequestCookies(Value),
    RequestPostData(Value),
    ResponseHeaders(Value),
    ResponseCookies(Value),
    HttpVersion(String),
    Status(String),
    StatusText(String),
    HeadersSize(u64),
    ContentSize(u64),
    MimeType(String),
    ResponseContent(Value),
    TotalTime(u64),
    EventTimings(EventTimings),
}

/// Field names accepted by [`RequestUpdate::from_field`].
pub const UPDATE_FIELDS: [&str; 14] = [
    "requestHeaders",
    "requestCookies",
    "requestPostData",
    "responseHeaders",
    "responseCookies",
    "httpVersion",
    "status",
    "statusText",
    "headersSize",
    "contentSize",
    "mimeType",
    "responseContent",
    "totalTime",
    "eventTimings",
];

impl RequestUpdate {
    /// Wire name of the field this update targets.
    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        match self {
            Self::RequestHeaders(_) => "requestHeaders",
            Self::RequestCookies(_) => "requestCookies",
            Self::RequestPostData(_) => "requestPostData",
            Self::ResponseHeaders(_) => "responseHeaders",
            Self::ResponseCookies(_) => "responseCookies",
            Self::HttpVersion(_) => "httpVersion",
            Self::Status(_) => "status",
            Self::StatusText(_) => "statusText",
            Self::HeadersSize(_) => "headersSize",
            Self::ContentSize(_) => "contentSize",
            Self::MimeType(_) => "mimeType",
            Self::ResponseContent(_) => "responseContent",
            Self::TotalTime(_) => "totalTime",
            Self::EventTimings(_) => "eventTimings",
        }
    }

    /// Decode one `name: value` pair.
    ///
    /// Returns `None` for unknown names, `null` values, and payloads of the
    /// wrong shape.
    pub fn from_field(name: &str, value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }
        let update = match name {
            "requestHeaders" => Self::RequestHeaders(value.clone()),
            "requestCookies" => Self::RequestCookies(value.clone()),
            "requestPostData" => Self::RequestPostData(value.clone()),
            "responseHeaders" => Self::ResponseHeaders(value.clone()),
            "responseCookies" => Self::ResponseCookies(value.clone()),
            "responseContent" => Self::ResponseContent(value.clone()),
            "httpVersion" => Self::HttpVersion(as_text(value)?),
            "status" => Self::Status(as_text(value)?),
            "statusText" => Self::StatusText(as_text(value)?),
            "mimeType" => Self::MimeType(as_text(value)?),
            "headersSize" => Self::HeadersSize(as_millis_or_bytes(value)?),
            "contentSize" => Self::ContentSize(as_millis_or_bytes(value)?),
            "totalTime" => Self::TotalTime(as_millis_or_bytes(value)?),
            "eventTimings" => match serde_json::from_value::<EventTimings>(value.clone()) {
                Ok(timings) => Self::EventTimings(timings),
                Err(err) => {
                    debug!(field = name, error = %err, "malformed event timings ignored");
                    return None;
                }
            },
            _ => {
                trace!(field = name, "unknown update field ignored");
                return None;
            }
        };
        Some(update)
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_millis_or_bytes(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 {
        Some(f.round() as u64)
    } else {
        None
    }
}

/// What applying an update changed, so the caller knows what to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppliedEffect {
    /// Only details-pane data changed.
    DetailsOnly,
    /// A value shown in the request row changed.
    RowChanged,
    /// The end time is now known; carries the absolute end in ms.
    EndChanged(i64),
    /// Phase timings arrived; the row's waterfall segment must be rebuilt.
    TimingsChanged,
}

/// An ordered batch of field updates for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePatch {
    updates: Vec<RequestUpdate>,
}

impl UpdatePatch {
    /// Create an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an update (builder form).
    #[must_use]
    pub fn with(mut self, update: RequestUpdate) -> Self {
        self.updates.push(update);
        self
    }

    /// Append an update.
    pub fn push(&mut self, update: RequestUpdate) {
        self.updates.push(update);
    }

    /// Decode a transport `data` object.
    pub fn from_json_object(data: &Map<String, Value>) -> Self {
        let updates = data
            .iter()
            .filter_map(|(name, value)| RequestUpdate::from_field(name, value))
            .collect();
        Self { updates }
    }

    /// Decode any JSON value; non-objects yield an empty patch.
    pub fn from_json_value(data: &Value) -> Self {
        data.as_object()
            .map(Self::from_json_object)
            .unwrap_or_default()
    }

    /// The updates in application order.
    #[inline]
    pub fn updates(&self) -> &[RequestUpdate] {
        &self.updates
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

impl From<Vec<RequestUpdate>> for UpdatePatch {
    fn from(updates: Vec<RequestUpdate>) -> Self {
        Self { updates }
    }
}

impl IntoIterator for UpdatePatch {
    type Item = RequestUpdate;
    type IntoIter = std::vec::IntoIter<RequestUpdate>;

    fn into_iter(self) -> Self::IntoIter {
        self.updates.into_iter()
    }
}
