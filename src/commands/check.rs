//! Check command implementation.
//!
//! Read-only view over the rendered blacklist, the threat feed and the
//! country map for a single address.

use anyhow::Result;
use std::net::IpAddr;
use std::path::Path;

use crate::config::{Config, DataFiles};
use crate::country::CountryMap;
use crate::feed::ThreatFeed;
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::lists::CustomList;
use crate::token::AddressToken;
use crate::validation::validate_ip;

/// Run the check command
pub fn run(ip_str: &str, config: &Config) -> Result<()> {
    println!();
    match validate_ip(ip_str) {
        Ok(target) => {
            for line in report(real_fs(), &config.paths(), target)? {
                println!("{}", line);
            }
        }
        // Not fatal: tell the user and exit cleanly
        Err(e) => println!("{}.", e),
    }
    println!();
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Lines describing what is known about `target`.
pub fn report(fs: &dyn FileSystem, paths: &DataFiles, target: IpAddr) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let rendered_name = file_name(&paths.rendered_blacklist);
    if !fs.exists(&paths.rendered_blacklist) {
        lines.push(format!("Source file: {} not found.", rendered_name));
        return Ok(lines);
    }

    let rendered = CustomList::load(fs, &paths.rendered_blacklist)?;
    let mut found = match rendered.lookup(&target) {
        Some(AddressToken::Address(_)) => {
            lines.push(format!("{} found in {}", target, rendered_name));
            true
        }
        Some(AddressToken::Network(net)) => {
            lines.push(format!(
                "{} found in {} (captured in subnet {})",
                target, rendered_name, net
            ));
            true
        }
        None => false,
    };

    if fs.exists(&paths.threat_feed) {
        let feed = ThreatFeed::load(fs, &paths.threat_feed)?;
        if let Some(hits) = feed.hits(&target) {
            let noun = if hits == 1 { "hit" } else { "hits" };
            lines.push(format!(
                "{} found in {} with {} {}.",
                target,
                file_name(&paths.threat_feed),
                hits,
                noun
            ));
            found = true;
        }
    }

    if !found {
        lines.push(format!("{} not found.", target));
    }

    if let Some(countries) = load_countries(fs, paths)? {
        let code = countries
            .index()
            .locate(target)
            .and_then(|net| countries.get(&net).map(|c| (net, c.to_string())));
        if let Some((net, code)) = code {
            lines.push(format!("{} geolocates to {} ({}).", target, code, net));
        }
    }

    Ok(lines)
}

/// The country map from the cache, or from the text mirror as a fallback.
fn load_countries(fs: &dyn FileSystem, paths: &DataFiles) -> Result<Option<CountryMap>> {
    if fs.exists(&paths.country_nets_cache) {
        return CountryMap::load_cache(fs, &paths.country_nets_cache).map(Some);
    }
    if fs.exists(&paths.country_nets) {
        let content = fs.read_to_string(&paths.country_nets)?;
        return Ok(Some(CountryMap::from_mirror(&content)));
    }
    Ok(None)
}
