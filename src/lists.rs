//! Operator-maintained custom lists (blacklist and whitelist).
//!
//! A list holds a de-duplicated set of addresses and networks, kept in
//! canonical order: addresses ascending, then networks ascending, IPv4
//! before IPv6 in each.

use anyhow::{Context, Result};
use ipnet::IpNet;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::Path;
use tracing::debug;

use crate::fs_abstraction::FileSystem;
use crate::index::NetworkIndex;
use crate::token::{parse_lines, partition, AddressToken};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomList {
    addresses: Vec<IpAddr>,
    networks: Vec<IpNet>,
}

impl CustomList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse list text; unparseable lines are dropped.
    pub fn parse(content: &str) -> Self {
        parse_lines(content).into_iter().collect()
    }

    /// Load a list file. A list that does not exist yet is empty.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            debug!("{:?} not found, starting with an empty list", path);
            return Ok(Self::new());
        }
        let content = fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read list {:?}", path))?;
        Ok(Self::parse(&content))
    }

    pub fn from_parts(addresses: Vec<IpAddr>, networks: Vec<IpNet>) -> Self {
        let addresses: BTreeSet<IpAddr> = addresses.into_iter().collect();
        let networks: BTreeSet<IpNet> = networks.into_iter().collect();
        Self {
            addresses: addresses.into_iter().collect(),
            networks: networks.into_iter().collect(),
        }
    }

    pub fn addresses(&self) -> &[IpAddr] {
        &self.addresses
    }

    pub fn networks(&self) -> &[IpNet] {
        &self.networks
    }

    pub fn network_index(&self) -> NetworkIndex {
        self.networks.iter().copied().collect()
    }

    pub fn contains_address(&self, addr: &IpAddr) -> bool {
        self.addresses.binary_search(addr).is_ok()
    }

    /// Drop addresses already covered by one of the list's own networks.
    /// Returns how many were dropped.
    pub fn prune_covered(&mut self) -> usize {
        let index = self.network_index();
        let before = self.addresses.len();
        self.addresses.retain(|addr| !index.contains(*addr));
        before - self.addresses.len()
    }

    /// Keep only the addresses for which `keep` returns true.
    pub fn retain_addresses<F: FnMut(&IpAddr) -> bool>(&mut self, keep: F) {
        self.addresses.retain(keep);
    }

    /// The entry that matches `addr`: the address itself, or the first
    /// network (in canonical order) that contains it.
    pub fn lookup(&self, addr: &IpAddr) -> Option<AddressToken> {
        if self.contains_address(addr) {
            return Some(AddressToken::Address(*addr));
        }
        self.networks
            .iter()
            .find(|net| net.contains(addr))
            .map(|net| AddressToken::Network(*net))
    }

    pub fn len(&self) -> usize {
        self.addresses.len() + self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty() && self.networks.is_empty()
    }

    /// Canonical text form, one entry per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for addr in &self.addresses {
            out.push_str(&format!("{}\n", addr));
        }
        for net in &self.networks {
            out.push_str(&format!("{}\n", net));
        }
        out
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write_atomic(path, self.to_text().as_bytes())
            .with_context(|| format!("Failed to write list {:?}", path))
    }
}

impl FromIterator<AddressToken> for CustomList {
    fn from_iter<I: IntoIterator<Item = AddressToken>>(iter: I) -> Self {
        let (addresses, networks) = partition(iter);
        Self::from_parts(addresses, networks)
    }
}
