#![forbid(unsafe_code)]

//! Display strings for sizes, durations, and the list summary.

/// Format a number with at most `decimals` fractional digits.
///
/// Integers are printed without a fractional part. Other values are
/// truncated (not rounded) to `decimals` places, padding with zeros.
///
/// Truncation works on the shortest decimal text of `value`, so `0.29` keeps
/// both digits even though `0.29 * 100.0` lands just below 29.
pub fn number_with_decimals(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "0".to_owned();
    }
    if value.fract() == 0.0 {
        return format!("{}", value as i64);
    }
    let text = value.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    if decimals == 0 {
        return whole.to_owned();
    }
    let kept: String = fraction.chars().take(decimals).collect();
    format!("{whole}.{kept:0<decimals$}")
}

/// `"{kb} KB"` for a byte count.
pub fn format_size_kb(bytes: u64, decimals: usize) -> String {
    format!("{} KB", number_with_decimals(bytes as f64 / 1024.0, decimals))
}

/// `"{ms} ms"` for a whole-millisecond duration.
pub fn format_millis(millis: u64) -> String {
    format!("{millis} ms")
}

/// Footer text for the visible requests.
///
/// A zero count renders the empty notice.
pub fn format_summary(count: usize, total_bytes: u64, total_millis: u64) -> String {
    if count == 0 {
        return "No requests".to_owned();
    }
    let kb = number_with_decimals(total_bytes as f64 / 1024.0, 2);
    let secs = number_with_decimals(total_millis as f64 / 1000.0, 2);
    if count == 1 {
        format!("One request, {kb} KB, {secs} s")
    } else {
        format!("{count} requests, {kb} KB, {secs} s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_have_no_fraction() {
        assert_eq!(number_with_decimals(2.0, 2), "2");
        assert_eq!(number_with_decimals(0.0, 3), "0");
    }

    #[test]
    fn fractions_truncate() {
        assert_eq!(number_with_decimals(1.999, 2), "1.99");
        assert_eq!(number_with_decimals(0.5, 2), "0.50");
        assert_eq!(number_with_decimals(0.29, 2), "0.29");
        assert_eq!(number_with_decimals(1.1, 3), "1.100");
        assert_eq!(number_with_decimals(2.75, 0), "2");
    }

    #[test]
    fn non_finite_is_zero() {
        assert_eq!(number_with_decimals(f64::NAN, 2), "0");
        assert_eq!(number_with_decimals(f64::INFINITY, 2), "0");
    }

    #[test]
    fn size_in_kb() {
        assert_eq!(format_size_kb(2048, 2), "2 KB");
        assert_eq!(format_size_kb(1536, 2), "1.50 KB");
        assert_eq!(format_size_kb(100, 3), "0.097 KB");
    }

    #[test]
    fn summary_strings() {
        assert_eq!(format_summary(0, 0, 0), "No requests");
        assert_eq!(format_summary(1, 1024, 500), "One request, 1 KB, 0.50 s");
        assert_eq!(format_summary(3, 3072, 2000), "3 requests, 3 KB, 2 s");
        assert_eq!(format_summary(1, 0, 290), "One request, 0 KB, 0.29 s");
    }

    #[test]
    fn millis() {
        assert_eq!(format_millis(42), "42 ms");
    }
}
