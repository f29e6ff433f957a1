//! Threat feed: addresses with a hit count (confidence score).
//!
//! The on-disk format is `<address> <hits> ...` per line, whitespace
//! separated; only the first two fields are read. Duplicate addresses
//! overwrite earlier ones.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info};

use crate::fs_abstraction::FileSystem;
use crate::token::COMMENT_MARKER;
use crate::utils::format_count_with_separator;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatFeed {
    hits: HashMap<IpAddr, u32>,
}

/// Outcome of merging extra addresses into a feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchSummary {
    pub original_size: usize,
    pub considered: usize,
    pub added: usize,
    pub final_size: usize,
}

impl ThreatFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse feed text, skipping comments and malformed lines.
    pub fn parse(content: &str) -> Self {
        let mut feed = Self::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }
            let mut fields = line.split_whitespace();
            let parsed = match (fields.next(), fields.next()) {
                (Some(addr), Some(hits)) => addr.parse::<IpAddr>().ok().zip(hits.parse::<u32>().ok()),
                _ => None,
            };
            match parsed {
                Some((addr, hits)) => feed.insert(addr, hits),
                None => debug!("Skipping malformed feed line: {}", line),
            }
        }
        feed
    }

    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs
            .read_to_string(path)
            .with_context(|| format!("Failed to read threat feed {:?}", path))?;
        let feed = Self::parse(&content);
        info!(
            "Loaded {} addresses from threat feed",
            format_count_with_separator(feed.len())
        );
        Ok(feed)
    }

    pub fn insert(&mut self, addr: IpAddr, hits: u32) {
        self.hits.insert(addr, hits);
    }

    pub fn hits(&self, addr: &IpAddr) -> Option<u32> {
        self.hits.get(addr).copied()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IpAddr, u32)> + '_ {
        self.hits.iter().map(|(a, h)| (*a, *h))
    }

    /// Merge `addrs` at `confidence`, raising existing scores but never
    /// lowering them.
    pub fn patch<I>(&mut self, addrs: I, confidence: u32) -> PatchSummary
    where
        I: IntoIterator<Item = IpAddr>,
    {
        let original_size = self.len();
        let mut considered = 0;
        for addr in addrs {
            considered += 1;
            let entry = self.hits.entry(addr).or_insert(0);
            if *entry < confidence {
                *entry = confidence;
            }
        }
        PatchSummary {
            original_size,
            considered,
            added: self.len() - original_size,
            final_size: self.len(),
        }
    }

    /// Feed text ordered by hits descending, then address ascending.
    pub fn to_text(&self) -> String {
        let mut entries: Vec<(IpAddr, u32)> = self.iter().collect();
        entries.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut out = String::new();
        for (addr, hits) in entries {
            out.push_str(&format!("{} {}\n", addr, hits));
        }
        out
    }

    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write_atomic(path, self.to_text().as_bytes())
            .with_context(|| format!("Failed to write threat feed {:?}", path))
    }
}

/// Pick the address at whitespace field `index` of `line`.
///
/// Negative indices count from the end, so `-1` is the last field.
pub fn address_at_field(line: &str, index: isize) -> Option<IpAddr> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let idx = if index < 0 {
        fields.len().checked_sub(index.unsigned_abs())?
    } else {
        index as usize
    };
    fields.get(idx)?.parse().ok()
}
