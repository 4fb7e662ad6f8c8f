#![forbid(unsafe_code)]

//! Footer summary over the visible requests.

use netmon_core::format::{format_summary, number_with_decimals};
use netmon_core::record::RequestRecord;

/// Count, size, and elapsed time of a set of requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    /// Sum of known content sizes.
    pub total_bytes: u64,
    /// End of the newest-started request minus the start of the
    /// oldest-started one. Zero while that end is unknown.
    pub total_millis: u64,
}

impl Summary {
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RequestRecord>,
    {
        let mut count = 0usize;
        let mut total_bytes = 0u64;
        let mut oldest: Option<&RequestRecord> = None;
        let mut newest: Option<&RequestRecord> = None;

        for record in records {
            count += 1;
            total_bytes = total_bytes.saturating_add(record.content_size.unwrap_or(0));
            // Ties go to the later record.
            oldest = match oldest {
                Some(prev) if prev.started_millis < record.started_millis => Some(prev),
                _ => Some(record),
            };
            newest = match newest {
                Some(prev) if prev.started_millis > record.started_millis => Some(prev),
                _ => Some(record),
            };
        }

        let total_millis = match (oldest, newest.and_then(|r| r.ended_millis)) {
            (Some(oldest), Some(end)) => {
                u64::try_from(end.saturating_sub(oldest.started_millis)).unwrap_or(0)
            }
            _ => 0,
        };

        Self {
            count,
            total_bytes,
            total_millis,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn total_size_kb(&self) -> f64 {
        self.total_bytes as f64 / 1024.0
    }

    pub fn total_time_secs(&self) -> f64 {
        self.total_millis as f64 / 1000.0
    }

    /// Kilobytes with two decimals, as shown in the footer.
    pub fn size_text(&self) -> String {
        number_with_decimals(self.total_size_kb(), 2)
    }

    /// `"No requests"`, `"One request, 1 KB, 0.50 s"`, ...
    pub fn text(&self) -> String {
        format_summary(self.count, self.total_bytes, self.total_millis)
    }
}
