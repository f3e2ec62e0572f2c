//! Utility functions and helpers module
//!
//! Small formatting helpers shared by the logging and reporting code.

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// Used for log file names.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Formats a count with thousands separators (e.g., 118287 -> "118,287").
#[must_use]
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(118287), "118,287");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_get_timestamp_shape() {
        let ts = get_timestamp();
        assert_eq!(ts.len(), 15);
        assert_eq!(&ts[8..9], "_");
    }
}
