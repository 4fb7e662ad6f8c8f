#![forbid(unsafe_code)]

//! Column sort predicates.
//!
//! Every column compares with a strict greater-than predicate. Ascending
//! order uses the predicate as-is; descending uses its logical negation. The
//! list is then reordered by an insertion sort that swaps neighbours only
//! while the predicate holds. Equal rows therefore keep their order when
//! ascending and come out reversed when descending, so a descending sort is
//! always the exact reverse of the ascending one.
//!
//! A missing value on either side makes the predicate false.

use netmon_core::mime::abbreviate_mime;
use netmon_core::record::RequestRecord;
use netmon_core::url_info::UrlCache;

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Status,
    Method,
    File,
    Domain,
    Type,
    Size,
    /// By absolute start time.
    Waterfall,
}

impl SortKey {
    pub const ALL: [SortKey; 7] = [
        Self::Status,
        Self::Method,
        Self::File,
        Self::Domain,
        Self::Type,
        Self::Size,
        Self::Waterfall,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Method => "method",
            Self::File => "file",
            Self::Domain => "domain",
            Self::Type => "type",
            Self::Size => "size",
            Self::Waterfall => "waterfall",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// Strict `a > b` on this column.
    pub fn greater(self, a: &RequestRecord, b: &RequestRecord, urls: &mut UrlCache) -> bool {
        match self {
            Self::Status => gt(a.status.as_deref(), b.status.as_deref()),
            Self::Method => a.method > b.method,
            Self::File => {
                let a = urls.name_with_query(&a.url).to_lowercase();
                let b = urls.name_with_query(&b.url).to_lowercase();
                a > b
            }
            Self::Domain => {
                let a = urls.host_port(&a.url).to_lowercase();
                let b = urls.host_port(&b.url).to_lowercase();
                a > b
            }
            Self::Type => {
                abbreviate_mime(a.mime_type.as_deref()).to_lowercase()
                    > abbreviate_mime(b.mime_type.as_deref()).to_lowercase()
            }
            Self::Size => gt(a.content_size, b.content_size),
            Self::Waterfall => a.started_millis > b.started_millis,
        }
    }
}

fn gt<T: PartialOrd>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a > b,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    /// Apply the direction to a greater-than result.
    #[inline]
    pub const fn apply(self, greater: bool) -> bool {
        match self {
            Self::Ascending => greater,
            Self::Descending => !greater,
        }
    }
}

/// Caller-supplied greater-than predicate.
pub type SortPredicate = Box<dyn Fn(&RequestRecord, &RequestRecord) -> bool>;

/// The active ordering of the request list.
pub enum SortOrder {
    ByKey {
        key: SortKey,
        direction: SortDirection,
    },
    Custom {
        predicate: SortPredicate,
        direction: SortDirection,
    },
}

impl SortOrder {
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::ByKey { direction, .. } | Self::Custom { direction, .. } => *direction,
        }
    }

    pub fn key(&self) -> Option<SortKey> {
        match self {
            Self::ByKey { key, .. } => Some(*key),
            Self::Custom { .. } => None,
        }
    }

    /// Whether `a` must move after `b`.
    pub fn should_swap(&self, a: &RequestRecord, b: &RequestRecord, urls: &mut UrlCache) -> bool {
        match self {
            Self::ByKey { key, direction } => direction.apply(key.greater(a, b, urls)),
            Self::Custom {
                predicate,
                direction,
            } => direction.apply(predicate(a, b)),
        }
    }
}

impl std::fmt::Debug for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByKey { key, direction } => f
                .debug_struct("ByKey")
                .field("key", key)
                .field("direction", direction)
                .finish(),
            Self::Custom { direction, .. } => f
                .debug_struct("Custom")
                .field("direction", direction)
                .finish_non_exhaustive(),
        }
    }
}

/// Stable insertion sort that moves `items[j]` before `items[j - 1]` only
/// while `should_swap(items[j - 1], items[j])` holds.
pub fn insertion_sort_by<T, F>(items: &mut [T], mut should_swap: F)
where
    F: FnMut(&T, &T) -> bool,
{
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && should_swap(&items[j - 1], &items[j]) {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}
