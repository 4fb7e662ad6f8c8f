#![forbid(unsafe_code)]

//! Keyed quiescence coalescing ("drain").
//!
//! Network updates and viewport resizes both arrive in bursts. Handling each
//! one as it lands would re-sort the request list and redraw the waterfall
//! dozens of times per second. [`KeyedCoalescer`] holds at most one pending
//! action per key and only releases it once the key has been quiet for the
//! scheduled delay.
//!
//! # Semantics
//!
//! - **Cancel-then-reschedule**: scheduling under a key that already has a
//!   pending action discards that action (it never runs) and restarts the
//!   quiescence window.
//! - **At most once**: an action is handed out by [`KeyedCoalescer::poll_at`]
//!   exactly once and then forgotten.
//! - **Independent keys**: keys never cancel each other. Callers must not
//!   depend on the relative order of actions under different keys.
//!
//! # Usage
//!
//! ```
//! use std::time::{Duration, Instant};
//! use netmon_core::event_coalescer::KeyedCoalescer;
//!
//! let mut drain = KeyedCoalescer::new();
//! let t0 = Instant::now();
//!
//! drain.schedule_at("update-requests", Duration::from_millis(50), 1, t0);
//! drain.schedule_at("update-requests", Duration::from_millis(50), 2, t0 + Duration::from_millis(20));
//!
//! // Still inside the (restarted) quiescence window.
//! assert!(drain.poll_at(t0 + Duration::from_millis(60)).is_empty());
//!
//! // Only the latest action survives.
//! let due = drain.poll_at(t0 + Duration::from_millis(70));
//! assert_eq!(due, vec![("update-requests", 2)]);
//! ```
//!
//! # Thread Safety
//!
//! Not thread-safe. The coalescer is driven from the single event-processing
//! thread that also owns the request list.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Coalescing keys used by the request list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceKey {
    /// Batched per-request data updates.
    UpdateRequests,
    /// Viewport width changes.
    ResizeEvents,
}

impl CoalesceKey {
    /// Stable string name of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UpdateRequests => "update-requests",
            Self::ResizeEvents => "resize-events",
        }
    }
}

#[derive(Debug, Clone)]
struct Pending<A> {
    deadline: Instant,
    seq: u64,
    action: A,
}

/// Holds one pending action per key until its quiescence window elapses.
#[derive(Debug, Clone)]
pub struct KeyedCoalescer<K, A> {
    pending: HashMap<K, Pending<A>>,
    next_seq: u64,
    superseded: u64,
}

impl<K, A> Default for KeyedCoalescer<K, A> {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            next_seq: 0,
            superseded: 0,
        }
    }
}

impl<K, A> KeyedCoalescer<K, A>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty coalescer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` under `key`, measuring the delay from now.
    pub fn schedule(&mut self, key: K, delay: Duration, action: A) -> bool {
        self.schedule_at(key, delay, action, Instant::now())
    }

    /// Schedule `action` under `key` at a specific time (for testing).
    ///
    /// Returns `true` when an action already pending under `key` was
    /// discarded.
    pub fn schedule_at(&mut self, key: K, delay: Duration, action: A, now: Instant) -> bool {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        let entry = Pending {
            deadline: now + delay,
            seq,
            action,
        };
        let replaced = self.pending.insert(key, entry).is_some();
        if replaced {
            self.superseded += 1;
        }
        replaced
    }

    /// Drop the action pending under `key`, if any.
    pub fn cancel(&mut self, key: &K) -> Option<A> {
        self.pending.remove(key).map(|p| p.action)
    }

    /// Drop every pending action.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return all actions whose quiescence window has elapsed.
    pub fn poll(&mut self) -> Vec<(K, A)> {
        self.poll_at(Instant::now())
    }

    /// Remove and return all due actions at a specific time (for testing).
    ///
    /// Due actions are ordered by deadline, then by scheduling order.
    pub fn poll_at(&mut self, now: Instant) -> Vec<(K, A)> {
        let due_keys: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, p)| p.deadline <= now)
            .map(|(k, _)| k.clone())
            .collect();
        if due_keys.is_empty() {
            return Vec::new();
        }

        let mut due: Vec<(K, Pending<A>)> = due_keys
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|p| (k, p)))
            .collect();
        due.sort_by(|(_, a), (_, b)| a.deadline.cmp(&b.deadline).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|(k, p)| (k, p.action)).collect()
    }

    /// Whether an action is pending under `key`.
    #[inline]
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of keys with a pending action.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Total number of actions discarded by rescheduling.
    #[inline]
    pub fn superseded_count(&self) -> u64 {
        self.superseded
    }

    /// Earliest deadline among pending actions.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|p| p.deadline).min()
    }

    /// Time until the next action becomes due, `Duration::ZERO` if overdue.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.checked_duration_since(now).unwrap_or(Duration::ZERO))
    }
}
