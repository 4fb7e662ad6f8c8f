#![forbid(unsafe_code)]

//! Start-time parsing at the ingestion boundary.
//!
//! The transport reports request start times as ISO 8601 strings
//! (`2012-09-17T19:50:03.699Z`). They are validated and converted to unix
//! milliseconds here, so the timeline model only ever sees integers.

use std::fmt;

use time::OffsetDateTime;
use time::format_description::well_known::{Iso8601, Rfc3339};

/// A start-time string that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    input: String,
}

impl TimestampError {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse timestamp: {:?}", self.input)
    }
}

impl std::error::Error for TimestampError {}

/// Parse an RFC 3339 / ISO 8601 timestamp into unix milliseconds.
pub fn parse_timestamp_millis(input: &str) -> Result<i64, TimestampError> {
    let trimmed = input.trim();
    let parsed = OffsetDateTime::parse(trimmed, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(trimmed, &Iso8601::DEFAULT))
        .map_err(|_| TimestampError {
            input: input.to_owned(),
        })?;
    let millis = parsed.unix_timestamp_nanos().div_euclid(1_000_000);
    i64::try_from(millis).map_err(|_| TimestampError {
        input: input.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_utc_with_millis() {
        assert_eq!(
            parse_timestamp_millis("2012-09-17T19:50:03.699Z"),
            Ok(1_347_911_403_699)
        );
    }

    #[test]
    fn parses_offsets() {
        let utc = parse_timestamp_millis("2012-09-17T19:50:03.000Z").unwrap();
        let shifted = parse_timestamp_millis("2012-09-17T21:50:03.000+02:00").unwrap();
        assert_eq!(utc, shifted);
    }

    #[test]
    fn epoch_is_zero() {
        assert_eq!(parse_timestamp_millis("1970-01-01T00:00:00Z"), Ok(0));
    }

    #[test]
    fn pre_epoch_rounds_down() {
        assert_eq!(parse_timestamp_millis("1969-12-31T23:59:59.9995Z").unwrap(), -1);
        assert_eq!(parse_timestamp_millis("1969-12-31T23:59:59.999Z").unwrap(), -1);
        assert_eq!(parse_timestamp_millis("1969-12-31T23:59:58Z").unwrap(), -2000);
    }

    #[test]
    fn rejects_garbage() {
        let err = parse_timestamp_millis("yesterday-ish").unwrap_err();
        assert_eq!(err.input(), "yesterday-ish");
        assert_eq!(
            err.to_string(),
            "could not parse timestamp: \"yesterday-ish\""
        );
    }

    #[test]
    fn rejects_empty() {
        assert!(parse_timestamp_millis("").is_err());
    }
}
