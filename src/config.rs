//! Configuration management for banip.
//!
//! A [`Config`] is built once per invocation (from YAML or defaults) and
//! passed by reference to every component. It names the data directory,
//! the file names inside it and the default build options.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::validation::{validate_compact, validate_threshold};

/// Default configuration file, looked up relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "banip.yaml";

/// Default data directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory that relative file names resolve against
    pub data_dir: PathBuf,

    /// Data file names
    pub files: DataFiles,

    /// Default options for the build command
    pub build: BuildDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            files: DataFiles::default(),
            build: BuildDefaults::default(),
        }
    }
}

/// Locations of every file banip reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataFiles {
    /// Target country codes, one per line
    pub targets: PathBuf,
    /// Operator-maintained blacklist
    pub custom_blacklist: PathBuf,
    /// Operator-maintained whitelist
    pub custom_whitelist: PathBuf,
    /// Threat feed (`<address> <hits>` per line)
    pub threat_feed: PathBuf,
    /// Text mirror of the country map (`<cidr> <cc>` per line)
    pub country_nets: PathBuf,
    /// Binary cache of the country map
    pub country_nets_cache: PathBuf,
    /// GeoLite2 location table
    pub geolite_locations: PathBuf,
    /// GeoLite2 IPv4 block table
    pub geolite_blocks_v4: PathBuf,
    /// GeoLite2 IPv6 block table
    pub geolite_blocks_v6: PathBuf,
    /// Rendered blacklist
    pub rendered_blacklist: PathBuf,
    /// Sorted target countries for the proxy's geo directive
    pub country_whitelist: PathBuf,
}

impl Default for DataFiles {
    fn default() -> Self {
        Self {
            targets: "targets.txt".into(),
            custom_blacklist: "custom_blacklist.txt".into(),
            custom_whitelist: "custom_whitelist.txt".into(),
            threat_feed: "ipsum.txt".into(),
            country_nets: "haproxy_geo_ip.txt".into(),
            country_nets_cache: "country_nets.bin".into(),
            geolite_locations: "geolite/GeoLite2-Country-Locations-en.csv".into(),
            geolite_blocks_v4: "geolite/GeoLite2-Country-Blocks-IPv4.csv".into(),
            geolite_blocks_v6: "geolite/GeoLite2-Country-Blocks-IPv6.csv".into(),
            rendered_blacklist: "ip_blacklist.txt".into(),
            country_whitelist: "country_whitelist.txt".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BuildDefaults {
    /// Minimum hit count for a feed address (1-10)
    pub threshold: u8,
    /// /24 compaction threshold (1-255, 0 disables)
    pub compact: u8,
}

impl Default for BuildDefaults {
    fn default() -> Self {
        Self {
            threshold: 3,
            compact: 0,
        }
    }
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.build.threshold)?;
        if self.build.compact != 0 {
            validate_compact(self.build.compact)?;
        }
        Ok(())
    }

    /// Override the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Every file path resolved against the data directory.
    pub fn paths(&self) -> DataFiles {
        let f = &self.files;
        let at = |p: &PathBuf| self.data_dir.join(p);
        DataFiles {
            targets: at(&f.targets),
            custom_blacklist: at(&f.custom_blacklist),
            custom_whitelist: at(&f.custom_whitelist),
            threat_feed: at(&f.threat_feed),
            country_nets: at(&f.country_nets),
            country_nets_cache: at(&f.country_nets_cache),
            geolite_locations: at(&f.geolite_locations),
            geolite_blocks_v4: at(&f.geolite_blocks_v4),
            geolite_blocks_v6: at(&f.geolite_blocks_v6),
            rendered_blacklist: at(&f.rendered_blacklist),
            country_whitelist: at(&f.country_whitelist),
        }
    }
}
