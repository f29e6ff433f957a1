//! Common formatting helpers for reports.
//!
//! - [`format_count_with_separator`] - Format counts with thousands separator (1,234,567)

/// Format a number with thousands separators (commas).
///
/// # Examples
/// ```
/// use banip::utils::format_count_with_separator;
/// assert_eq!(format_count_with_separator(1000), "1,000");
/// assert_eq!(format_count_with_separator(1234567), "1,234,567");
/// ```
pub fn format_count_with_separator<N: ToString>(n: N) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
