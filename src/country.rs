//! Country map: network → two-letter country or continent code.
//!
//! Produced by the GeoLite ETL ([`crate::geolite`]) and persisted twice:
//! a bincode cache for fast reloads, and a flat text mirror
//! (`<cidr> <code>` per line, IPv4 block then IPv6 block, ascending)
//! for external tooling such as a proxy's geo-block map.

use anyhow::{Context, Result};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

use crate::error::BanipError;
use crate::fs_abstraction::FileSystem;
use crate::index::NetworkIndex;
use crate::token::COMMENT_MARKER;

/// Mapping from unique networks to their country code.
///
/// `BTreeMap` ordering on `IpNet` puts IPv4 before IPv6 and sorts by base
/// address, which is exactly the mirror file order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryMap {
    networks: BTreeMap<IpNet, String>,
}

/// Network and address counts for one country.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CountryStats {
    pub nets_v4: usize,
    pub nets_v6: usize,
    pub ips_v4: u64,
    pub ips_v6: f64,
}

impl CountryStats {
    pub fn is_empty(&self) -> bool {
        self.nets_v4 == 0 && self.nets_v6 == 0
    }
}

impl CountryMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, net: IpNet, code: impl Into<String>) {
        self.networks.insert(net, code.into());
    }

    pub fn get(&self, net: &IpNet) -> Option<&str> {
        self.networks.get(net).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IpNet, &str)> {
        self.networks.iter().map(|(n, c)| (n, c.as_str()))
    }

    /// Index of the networks tagged with one of `countries`.
    pub fn filter(&self, countries: &BTreeSet<String>) -> NetworkIndex {
        self.networks
            .iter()
            .filter(|(_, code)| countries.contains(code.as_str()))
            .map(|(net, _)| *net)
            .collect()
    }

    /// Index over every network in the map.
    pub fn index(&self) -> NetworkIndex {
        self.networks.keys().copied().collect()
    }

    /// Network and address counts for `country`.
    ///
    /// IPv4 counts exclude network and broadcast addresses except for
    /// single-address networks; IPv6 counts are raw and approximate.
    pub fn stats_for(&self, country: &str) -> CountryStats {
        let mut stats = CountryStats::default();
        for (net, _) in self.networks.iter().filter(|(_, c)| c.as_str() == country) {
            match net {
                IpNet::V4(v4) => {
                    stats.nets_v4 += 1;
                    let size = 1u64 << (32 - v4.prefix_len());
                    stats.ips_v4 += if size == 1 { 1 } else { size - 2 };
                }
                IpNet::V6(v6) => {
                    stats.nets_v6 += 1;
                    stats.ips_v6 += 2f64.powi(128 - v6.prefix_len() as i32);
                }
            }
        }
        stats
    }

    /// Load the binary cache.
    pub fn load_cache(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let bytes = fs
            .read(path)
            .with_context(|| format!("Failed to read country cache {:?}", path))?;
        let map: Self =
            bincode::deserialize(&bytes).map_err(|e| BanipError::Cache(e.to_string()))?;
        info!("Loaded {} tagged networks from cache", map.len());
        Ok(map)
    }

    /// Write the binary cache.
    pub fn save_cache(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        let bytes = bincode::serialize(self).map_err(|e| BanipError::Cache(e.to_string()))?;
        fs.write_atomic(path, &bytes)
            .with_context(|| format!("Failed to write country cache {:?}", path))?;
        debug!("Saved {} tagged networks to {:?}", self.len(), path);
        Ok(())
    }

    /// Render the text mirror.
    pub fn to_mirror(&self) -> String {
        let mut out = String::new();
        for (net, code) in &self.networks {
            out.push_str(&format!("{} {}\n", net, code));
        }
        out
    }

    /// Parse a text mirror, skipping lines that do not parse.
    pub fn from_mirror(content: &str) -> Self {
        let mut map = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(net), Some(code)) = (parts.next(), parts.next()) else {
                continue;
            };
            match net.parse::<IpNet>() {
                Ok(net) => map.insert(net.trunc(), code.to_ascii_uppercase()),
                Err(_) => debug!("Skipping malformed mirror line: {}", line),
            }
        }
        map
    }

    pub fn save_mirror(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write_atomic(path, self.to_mirror().as_bytes())
            .with_context(|| format!("Failed to write country mirror {:?}", path))
    }
}

impl FromIterator<(IpNet, String)> for CountryMap {
    fn from_iter<I: IntoIterator<Item = (IpNet, String)>>(iter: I) -> Self {
        Self {
            networks: iter.into_iter().collect(),
        }
    }
}
