//! Centralized validation for user-supplied values.
//!
//! These run at the input boundary (clap value parsers, config loading)
//! so the pipeline only ever sees in-range options.

use std::net::IpAddr;

use crate::error::BanipError;

/// Valid confidence threshold range
pub const THRESHOLD_RANGE: std::ops::RangeInclusive<u8> = 1..=10;

/// Valid compaction threshold range (0 is the "disabled" sentinel)
pub const COMPACT_RANGE: std::ops::RangeInclusive<u8> = 1..=255;

/// Validate a confidence threshold.
pub fn validate_threshold(value: u8) -> Result<u8, BanipError> {
    if THRESHOLD_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(BanipError::InvalidThreshold(value.to_string()))
    }
}

/// Validate a compaction threshold.
pub fn validate_compact(value: u8) -> Result<u8, BanipError> {
    if COMPACT_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(BanipError::InvalidCompact(value.to_string()))
    }
}

/// Parse and validate a threshold argument.
///
/// # Examples
/// ```
/// use banip::validation::parse_threshold;
/// assert_eq!(parse_threshold("3").unwrap(), 3);
/// assert!(parse_threshold("11").is_err());
/// assert!(parse_threshold("three").is_err());
/// ```
pub fn parse_threshold(s: &str) -> Result<u8, BanipError> {
    let value: u8 = s
        .trim()
        .parse()
        .map_err(|_| BanipError::InvalidThreshold(s.to_string()))?;
    validate_threshold(value)
}

/// Parse and validate a compaction argument.
///
/// # Examples
/// ```
/// use banip::validation::parse_compact;
/// assert_eq!(parse_compact("255").unwrap(), 255);
/// assert!(parse_compact("0").is_err());
/// assert!(parse_compact("256").is_err());
/// ```
pub fn parse_compact(s: &str) -> Result<u8, BanipError> {
    let value: u8 = s
        .trim()
        .parse()
        .map_err(|_| BanipError::InvalidCompact(s.to_string()))?;
    validate_compact(value)
}

/// Validate a single IP address (no CIDR).
pub fn validate_ip(ip_str: &str) -> Result<IpAddr, BanipError> {
    ip_str
        .trim()
        .parse()
        .map_err(|_| BanipError::InvalidIp(ip_str.to_string()))
}

/// Validate a two-letter country or continent code, returned uppercased.
pub fn validate_country_code(code: &str) -> Result<String, BanipError> {
    let trimmed = code.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(BanipError::InvalidCountryCode(code.to_string()))
    }
}
