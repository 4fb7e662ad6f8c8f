#![forbid(unsafe_code)]

//! Transport packets and their validation.
//!
//! Two packet kinds arrive per request id:
//!
//! ```json
//! {"type":"created","id":"r1","startedDateTime":"2012-09-17T19:50:03.699Z",
//!  "method":"GET","url":"https://example.com/","isXHR":false}
//! {"type":"updated","id":"r1","data":{"status":"200","totalTime":42}}
//! ```
//!
//! Timestamps are parsed here; a malformed one rejects the packet before it
//! can reach the timeline.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::record::RequestId;
use crate::timestamp::{TimestampError, parse_timestamp_millis};
use crate::update::UpdatePatch;

/// A validated request-creation packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCreated {
    pub id: RequestId,
    /// Unix milliseconds.
    pub started_millis: i64,
    pub method: String,
    pub url: String,
    pub is_xhr: bool,
}

impl RequestCreated {
    /// Build a creation packet from an already-parsed start time.
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
            method: method.into(),
            url: url.into(),
            is_xhr,
        }
    }

    /// Build a creation packet, parsing the ISO 8601 start time.
    pub fn parse(
        id: impl Into<RequestId>,
        started_date_time: &str,
        method: impl Into<String>,
        url: impl Into<String>,
        is_xhr: bool,
    ) -> Result<Self, TimestampError> {
        let started_millis = parse_timestamp_millis(started_date_time)?;
        Ok(Self::new(id, started_millis, method, url, is_xhr))
    }
}

/// A validated transport event.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    Created(RequestCreated),
    Updated { id: RequestId, patch: UpdatePatch },
}

impl NetworkEvent {
    /// Request id the event refers to.
    pub fn id(&self) -> &RequestId {
        match self {
            Self::Created(c) => &c.id,
            Self::Updated { id, .. } => id,
        }
    }

    /// Decode and validate one JSON packet.
    pub fn from_json(input: &str) -> Result<Self, IngestError> {
        let wire: WirePacket = serde_json::from_str(input).map_err(IngestError::Json)?;
        Self::from_wire(wire)
    }

    /// Decode and validate an already-parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, IngestError> {
        let wire: WirePacket = serde_json::from_value(value).map_err(IngestError::Json)?;
        Self::from_wire(wire)
    }

    fn from_wire(wire: WirePacket) -> Result<Self, IngestError> {
        match wire {
            WirePacket::Created {
                id,
                started_date_time,
                method,
                url,
                is_xhr,
            } => {
                let created = RequestCreated::parse(id, &started_date_time, method, url, is_xhr)
                    .map_err(IngestError::Timestamp)?;
                Ok(Self::Created(created))
            }
            WirePacket::Updated { id, data } => Ok(Self::Updated {
                id,
                patch: UpdatePatch::from_json_value(&data),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WirePacket {
    #[serde(rename_all = "camelCase")]
    Created {
        id: RequestId,
        started_date_time: String,
        method: String,
        url: String,
        #[serde(rename = "isXHR", default)]
        is_xhr: bool,
    },
    Updated {
        id: RequestId,
        #[serde(default)]
        data: Value,
    },
}

/// Rejected transport packet.
#[derive(Debug)]
pub enum IngestError {
    /// Not valid JSON, unknown `type`, or missing required fields.
    Json(serde_json::Error),
    /// The start time could not be parsed.
    Timestamp(TimestampError),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed network event: {err}"),
            Self::Timestamp(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::Timestamp(err) => Some(err),
        }
    }
}

impl From<TimestampError> for IngestError {
    fn from(err: TimestampError) -> Self {
        Self::Timestamp(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::RequestUpdate;

    #[test]
    fn decodes_created_packet() {
        let event = NetworkEvent::from_json(
            r#"{"type":"created","id":"r1","startedDateTime":"1970-01-01T00:00:01.500Z",
                "method":"POST","url":"https://example.com/api","isXHR":true}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            NetworkEvent::Created(RequestCreated::new(
                "r1",
                1_500,
                "POST",
                "https://example.com/api",
                true
            ))
        );
    }

    #[test]
    fn decodes_updated_packet() {
        let event = NetworkEvent::from_json(
            r#"{"type":"updated","id":"r1","data":{"totalTime":12,"unknown":1}}"#,
        )
        .unwrap();
        let NetworkEvent::Updated { id, patch } = event else {
            panic!("expected update");
        };
        assert_eq!(id.as_str(), "r1");
        assert_eq!(patch.updates(), &[RequestUpdate::TotalTime(12)]);
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let err = NetworkEvent::from_json(
            r#"{"type":"created","id":"r1","startedDateTime":"not a date",
                "method":"GET","url":"https://example.com/"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Timestamp(_)));
        assert!(err.to_string().starts_with("could not parse timestamp"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn unknown_type_is_json_error() {
        let err = NetworkEvent::from_json(r#"{"type":"deleted","id":"r1"}"#).unwrap_err();
        assert!(matches!(err, IngestError::Json(_)));
    }

    #[test]
    fn missing_xhr_flag_defaults_false() {
        let event = NetworkEvent::from_value(serde_json::json!({
            "type": "created",
            "id": "r2",
            "startedDateTime": "1970-01-01T00:00:00Z",
            "method": "GET",
            "url": "https://example.com/",
        }))
        .unwrap();
        let NetworkEvent::Created(created) = event else {
            panic!("expected creation");
        };
        assert!(!created.is_xhr);
        assert_eq!(created.id.as_str(), "r2");
    }
}
