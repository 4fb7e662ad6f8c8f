#![forbid(unsafe_code)]

//! Ordered request records and the global time bounds.
//!
//! # Invariants
//!
//! 1. **First registered wins**: `first_start` is the start of the first
//!    request registered since the last reset. A later request with an
//!    earlier timestamp does not move it.
//! 2. **Monotone end**: `last_end` never decreases within one reset epoch,
//!    except through an explicit [`TimelineModel::recompute_bounds`].
//! 3. **Stable deltas**: a record's `started_delta_millis` is assigned once,
//!    on insert, and is never rewritten.
//! 4. Unset bounds are `None`, which orders below every `Some(_)` timestamp.
//!
//! # Failure Modes
//!
//! None. Every operation is total; timestamps are validated before they get
//! here.

use std::collections::HashMap;

use netmon_core::ingest::RequestCreated;
use netmon_core::record::{RequestId, RequestRecord};
use tracing::{debug, trace};

/// Earliest registered start and latest known end, in unix milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineBounds {
    pub first_start: Option<i64>,
    pub last_end: Option<i64>,
}

impl TimelineBounds {
    pub const UNSET: Self = Self {
        first_start: None,
        last_end: None,
    };

    #[inline]
    pub fn is_set(&self) -> bool {
        self.first_start.is_some()
    }

    /// `last_end - first_start`, or zero while either bound is unset.
    pub fn span_millis(&self) -> i64 {
        match (self.first_start, self.last_end) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }
}

/// Request records in registration order plus the bounds derived from them.
#[derive(Debug, Clone, Default)]
pub struct TimelineModel {
    records: Vec<RequestRecord>,
    index: HashMap<RequestId, usize>,
    bounds: TimelineBounds,
    epoch: u64,
}

impl TimelineModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `millis` as the first start unless one is already set.
    /// Returns the active first start.
    pub fn register_start(&mut self, millis: i64) -> i64 {
        *self.bounds.first_start.get_or_insert(millis)
    }

    /// `last_end = max(last_end, millis)`. Returns the active last end.
    pub fn register_end(&mut self, millis: i64) -> i64 {
        let last = self.bounds.last_end.map_or(millis, |last| last.max(millis));
        self.bounds.last_end = Some(last);
        last
    }

    #[inline]
    pub fn bounds(&self) -> TimelineBounds {
        self.bounds
    }

    /// Number of resets so far.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Register and append a new request.
    ///
    /// The start is registered both as a start and as a provisional end.
    /// Returns `None` (and changes nothing) if the id is already present.
    pub fn insert(&mut self, created: RequestCreated) -> Option<&RequestRecord> {
        if self.index.contains_key(&created.id) {
            debug!(id = %created.id, "duplicate request id ignored");
            return None;
        }
        let first = self.register_start(created.started_millis);
        self.register_end(created.started_millis);

        let mut record = RequestRecord::new(
            created.id,
            created.started_millis,
            created.method,
            created.url,
            created.is_xhr,
        );
        record.started_delta_millis = created.started_millis.saturating_sub(first);
        trace!(
            id = %record.id,
            started = record.started_millis,
            delta = record.started_delta_millis,
            "request registered"
        );

        let slot = self.records.len();
        self.index.insert(record.id.clone(), slot);
        self.records.push(record);
        self.records.last()
    }

    /// Remove a request and recompute the bounds from the survivors.
    pub fn remove(&mut self, id: &RequestId) -> Option<RequestRecord> {
        let slot = self.index.remove(id)?;
        let record = self.records.remove(slot);
        for (i, r) in self.records.iter().enumerate().skip(slot) {
            self.index.insert(r.id.clone(), i);
        }
        self.recompute_bounds();
        Some(record)
    }

    /// Rebuild the bounds from scratch.
    ///
    /// The first start becomes the start of the earliest registered
    /// survivor; the last end the maximum known end (or start) among
    /// survivors. Deltas are left untouched.
    pub fn recompute_bounds(&mut self) {
        self.bounds = TimelineBounds {
            first_start: self.records.first().map(|r| r.started_millis),
            last_end: self.records.iter().map(RequestRecord::end_or_start).max(),
        };
    }

    /// Clear every record and both bounds.
    pub fn reset(&mut self) {
        self.records.clear();
        self.index.clear();
        self.bounds = TimelineBounds::UNSET;
        self.epoch += 1;
    }

    #[inline]
    pub fn get(&self, id: &RequestId) -> Option<&RequestRecord> {
        self.index.get(id).and_then(|&i| self.records.get(i))
    }

    #[inline]
    pub fn get_mut(&mut self, id: &RequestId) -> Option<&mut RequestRecord> {
        self.index.get(id).and_then(|&i| self.records.get_mut(i))
    }

    #[inline]
    pub fn contains(&self, id: &RequestId) -> bool {
        self.index.contains_key(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &RequestRecord> {
        self.records.iter()
    }
}
