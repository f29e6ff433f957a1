//! Error types for banip.

use std::path::PathBuf;
use thiserror::Error;

/// Hint attached to missing data files.
pub const PROJECT_HINT: &str = "Visit https://github.com/geozeke/banip for more info.";

/// Hint attached to missing GeoLite2 tables.
pub const GEOLITE_HINT: &str = "Download the GeoLite2 country CSV database from MaxMind.";

#[derive(Error, Debug)]
pub enum BanipError {
    #[error("Missing file: {}\n{hint}", path.display())]
    MissingFile { path: PathBuf, hint: String },

    #[error("Invalid IP address or network: {0}")]
    InvalidToken(String),

    #[error("{0} is not a valid IP address")]
    InvalidIp(String),

    #[error("Invalid threshold '{0}': value must be an integer between 1 and 10")]
    InvalidThreshold(String),

    #[error("Invalid compact value '{0}': value must be an integer between 1 and 255")]
    InvalidCompact(String),

    #[error("Invalid country code '{0}': expected two ASCII letters")]
    InvalidCountryCode(String),

    #[error("Country cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BanipError {
    pub fn missing(path: impl Into<PathBuf>, hint: impl Into<String>) -> Self {
        Self::MissingFile {
            path: path.into(),
            hint: hint.into(),
        }
    }
}
