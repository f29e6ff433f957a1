//! Set reconciliation for the `build` operation.
//!
//! [`reconcile`] is the pure part: it takes loaded inputs and returns the
//! filtered feed, the pruned custom lists and the metrics. [`run_build`]
//! wraps it with the preflight check, loading and persistence.
//!
//! ```text
//! custom blacklist ──prune──┐
//! country map ──filter──────┤
//! whitelist ──index─────────┼──► feed filter ──► compaction ──► re-prune custom
//! threat feed ──────────────┘                                       │
//!                                             render ◄── persist ◄──┘
//! ```

use anyhow::{Context, Result};
use ipnet::IpNet;
use serde::Serialize;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info};

use crate::compaction::compact;
use crate::config::{Config, DataFiles};
use crate::country::CountryMap;
use crate::error::{BanipError, GEOLITE_HINT, PROJECT_HINT};
use crate::feed::ThreatFeed;
use crate::fs_abstraction::FileSystem;
use crate::geolite::load_country_map;
use crate::index::NetworkIndex;
use crate::lists::CustomList;
use crate::render::{render_blacklist, render_country_whitelist};
use crate::token::COMMENT_MARKER;
use crate::utils::format_count_with_separator;
use crate::validation::validate_country_code;

/// Build options, already validated at the input boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Minimum hit count for a feed address to be kept
    pub threshold: u8,
    /// Minimum /24 group size for compaction; 0 disables it
    pub compact: u8,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            threshold: 3,
            compact: 0,
        }
    }
}

/// Summary of a build run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildMetrics {
    pub target_countries: Vec<String>,
    pub feed_ips: usize,
    pub feed_networks: usize,
    pub custom_ips: usize,
    pub custom_networks: usize,
    pub total_entries: usize,
    /// Individual addresses covered, subnets expanded
    pub addresses_blocked: u128,
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub feed_addresses: Vec<IpAddr>,
    pub feed_networks: Vec<IpNet>,
    pub blacklist: CustomList,
    pub whitelist: CustomList,
    pub metrics: BuildMetrics,
}

/// Reconcile the feed, the country map and the custom lists.
pub fn reconcile(
    mut blacklist: CustomList,
    mut whitelist: CustomList,
    feed: &ThreatFeed,
    countries: &CountryMap,
    targets: &BTreeSet<String>,
    options: &BuildOptions,
) -> BuildOutcome {
    // Stage 1: custom addresses already inside a custom network are redundant
    let pruned = blacklist.prune_covered();
    debug!("Pruned {} custom addresses covered by custom networks", pruned);
    let custom_nets = blacklist.network_index();

    // Stage 2: the in-scope networks for this run
    let geo = countries.filter(targets);
    debug!("{} networks tagged with a target country", geo.len());

    // Stage 3
    whitelist.prune_covered();
    let whitelist_nets = whitelist.network_index();

    // Stage 4
    let mut retained: Vec<IpAddr> = feed
        .iter()
        .filter(|(addr, hits)| {
            *hits >= u32::from(options.threshold)
                && geo.contains(*addr)
                && !custom_nets.contains(*addr)
                && !whitelist.contains_address(addr)
                && !whitelist_nets.contains(*addr)
        })
        .map(|(addr, _)| addr)
        .collect();
    retained.sort_unstable();
    debug!("{} feed addresses retained", retained.len());

    // Stage 5
    let (feed_addresses, feed_networks) = compact(&retained, &whitelist, options.compact);

    // Stage 6: drop custom addresses the feed output already carries, or
    // that geolocate outside the targets. Unresolvable ones stay.
    let feed_net_index = feed_networks.iter().copied().collect::<NetworkIndex>();
    let all_countries = countries.index();
    blacklist.retain_addresses(|addr| {
        if feed_addresses.binary_search(addr).is_ok() || feed_net_index.contains(*addr) {
            return false;
        }
        match all_countries.locate(*addr).and_then(|net| countries.get(&net)) {
            Some(code) => targets.contains(code),
            None => true,
        }
    });

    let metrics = BuildMetrics {
        target_countries: targets.iter().cloned().collect(),
        feed_ips: feed_addresses.len(),
        feed_networks: feed_networks.len(),
        custom_ips: blacklist.addresses().len(),
        custom_networks: blacklist.networks().len(),
        total_entries: feed_addresses.len() + feed_networks.len() + blacklist.len(),
        addresses_blocked: (feed_addresses.len() as u128)
            .saturating_add(blacklist.addresses().len() as u128)
            .saturating_add(count_blocked(&feed_networks))
            .saturating_add(count_blocked(blacklist.networks())),
    };

    BuildOutcome {
        feed_addresses,
        feed_networks,
        blacklist,
        whitelist,
        metrics,
    }
}

/// Count the usable addresses in `nets`.
///
/// IPv4 networks exclude their network and broadcast addresses, except
/// single-address networks which count 1. IPv6 sizes are raw. The sum
/// saturates at `u128::MAX`.
pub fn count_blocked(nets: &[IpNet]) -> u128 {
    nets.iter()
        .map(|net| {
            let shift = net.max_prefix_len() - net.prefix_len();
            match net {
                IpNet::V4(_) => {
                    let size = 1u128 << shift;
                    if size <= 2 {
                        size.min(1)
                    } else {
                        size - 2
                    }
                }
                // 1 << 128 would overflow
                IpNet::V6(_) if shift >= 128 => u128::MAX,
                IpNet::V6(_) => 1u128 << shift,
            }
        })
        .fold(0u128, |acc, count| acc.saturating_add(count))
}

/// Fail with [`BanipError::MissingFile`] if any required input is absent.
///
/// Runs before anything is read for computation or written.
pub fn preflight(fs: &dyn FileSystem, paths: &DataFiles) -> Result<(), BanipError> {
    for required in [&paths.threat_feed, &paths.targets] {
        if !fs.exists(required) {
            return Err(BanipError::missing(required, PROJECT_HINT));
        }
    }
    if fs.exists(&paths.country_nets_cache) {
        return Ok(());
    }
    for table in [
        &paths.geolite_locations,
        &paths.geolite_blocks_v4,
        &paths.geolite_blocks_v6,
    ] {
        if !fs.exists(table) {
            return Err(BanipError::missing(table, GEOLITE_HINT));
        }
    }
    Ok(())
}

/// Read the target-country file: one code per line, uppercased.
pub fn load_targets(fs: &dyn FileSystem, path: &Path) -> Result<BTreeSet<String>> {
    let content = fs
        .read_to_string(path)
        .with_context(|| format!("Failed to read target countries {:?}", path))?;
    let mut targets = BTreeSet::new();
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }
        match validate_country_code(line) {
            Ok(code) => {
                targets.insert(code);
            }
            Err(e) => debug!("Skipping target line: {}", e),
        }
    }
    Ok(targets)
}

/// Run the whole build: preflight, load, reconcile, persist, render.
///
/// `outfile` overrides the rendered blacklist path; the default path is
/// refreshed too so `check` always sees the latest list.
pub fn run_build(
    fs: &dyn FileSystem,
    config: &Config,
    options: &BuildOptions,
    outfile: Option<&Path>,
    generated_at: &str,
) -> Result<BuildMetrics> {
    let paths = config.paths();
    preflight(fs, &paths)?;

    info!("Loading target countries");
    let targets = load_targets(fs, &paths.targets)?;
    let countries = load_country_map(fs, &paths)?;
    let feed = ThreatFeed::load(fs, &paths.threat_feed)?;
    let blacklist = CustomList::load(fs, &paths.custom_blacklist)?;
    let whitelist = CustomList::load(fs, &paths.custom_whitelist)?;

    info!("Reconciling lists");
    let outcome = reconcile(blacklist, whitelist, &feed, &countries, &targets, options);

    info!("Saving custom lists");
    outcome.blacklist.save(fs, &paths.custom_blacklist)?;
    outcome.whitelist.save(fs, &paths.custom_whitelist)?;
    fs.write_atomic(
        &paths.country_whitelist,
        render_country_whitelist(&targets).as_bytes(),
    )
    .with_context(|| format!("Failed to write {:?}", paths.country_whitelist))?;

    info!("Rendering blacklist");
    let rendered = render_blacklist(&outcome, generated_at);
    let target = outfile.unwrap_or(&paths.rendered_blacklist);
    fs.write_atomic(target, rendered.as_bytes())
        .with_context(|| format!("Failed to write {:?}", target))?;
    if target != paths.rendered_blacklist {
        fs.write_atomic(&paths.rendered_blacklist, rendered.as_bytes())
            .with_context(|| format!("Failed to write {:?}", paths.rendered_blacklist))?;
    }

    info!(
        "Blacklist built with {} entries",
        format_count_with_separator(outcome.metrics.total_entries)
    );
    Ok(outcome.metrics)
}
