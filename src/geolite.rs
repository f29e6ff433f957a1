//! GeoLite2 country database conversion.
//!
//! Joins the location table (geoname id → country code, falling back to
//! the continent code when the country column is empty) with the IPv4 and
//! IPv6 block tables (network → geoname id) into a [`CountryMap`].

use anyhow::{anyhow, Context, Result};
use ipnet::IpNet;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::config::DataFiles;
use crate::country::CountryMap;
use crate::fs_abstraction::FileSystem;
use crate::utils::format_count_with_separator;

const GEONAME_ID: &str = "geoname_id";
const COUNTRY_ISO_CODE: &str = "country_iso_code";
const CONTINENT_CODE: &str = "continent_code";
const NETWORK: &str = "network";

/// Load the country map, preferring the binary cache.
///
/// Without a cache the GeoLite tables are converted and both the cache
/// and the text mirror are written for next time.
pub fn load_country_map(fs: &dyn FileSystem, paths: &DataFiles) -> Result<CountryMap> {
    if fs.exists(&paths.country_nets_cache) {
        return CountryMap::load_cache(fs, &paths.country_nets_cache);
    }
    refresh_country_map(fs, paths)
}

/// Convert the GeoLite tables and persist the cache and mirror.
pub fn refresh_country_map(fs: &dyn FileSystem, paths: &DataFiles) -> Result<CountryMap> {
    let map = convert(
        fs,
        &paths.geolite_locations,
        &paths.geolite_blocks_v4,
        &paths.geolite_blocks_v6,
    )?;
    map.save_cache(fs, &paths.country_nets_cache)?;
    map.save_mirror(fs, &paths.country_nets)?;
    info!(
        "Saved country map ({} networks) to {:?}",
        format_count_with_separator(map.len()),
        paths.country_nets
    );
    Ok(map)
}

/// Convert the three GeoLite CSV tables into a country map.
pub fn convert(
    fs: &dyn FileSystem,
    locations: &Path,
    blocks_v4: &Path,
    blocks_v6: &Path,
) -> Result<CountryMap> {
    info!("Pulling country IDs");
    let codes = parse_locations(&read(fs, locations)?)?;

    let mut map = CountryMap::new();
    info!("Geotagging IPv4 networks");
    let v4 = tag_blocks(&read(fs, blocks_v4)?, &codes, &mut map)?;
    info!("Geotagging IPv6 networks");
    let v6 = tag_blocks(&read(fs, blocks_v6)?, &codes, &mut map)?;
    debug!("Tagged {} IPv4 and {} IPv6 networks", v4, v6);

    Ok(map)
}

fn read(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    fs.read_to_string(path)
        .with_context(|| format!("Failed to read GeoLite table {:?}", path))
}

fn column(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| anyhow!("GeoLite table is missing column '{}'", name))
}

/// Geoname id → two-letter code.
pub fn parse_locations(content: &str) -> Result<HashMap<u64, String>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to parse GeoLite location headers")?
        .clone();
    let id_idx = column(&headers, GEONAME_ID)?;
    let country_idx = column(&headers, COUNTRY_ISO_CODE)?;
    let continent_idx = column(&headers, CONTINENT_CODE)?;

    let mut codes = HashMap::new();
    for record in reader.records().filter_map(|r| r.ok()) {
        let Some(id) = record.get(id_idx).and_then(|v| v.parse::<u64>().ok()) else {
            continue;
        };
        // Continent-level entries (e.g. Europe) have no country code
        let code = match record.get(country_idx) {
            Some(cc) if !cc.is_empty() => cc,
            _ => record.get(continent_idx).unwrap_or_default(),
        };
        if !code.is_empty() {
            codes.insert(id, code.to_ascii_uppercase());
        }
    }
    Ok(codes)
}

/// Tag every block row whose geoname id resolves; returns rows tagged.
pub fn tag_blocks(
    content: &str,
    codes: &HashMap<u64, String>,
    map: &mut CountryMap,
) -> Result<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to parse GeoLite block headers")?
        .clone();
    let net_idx = column(&headers, NETWORK)?;
    let id_idx = column(&headers, GEONAME_ID)?;

    let mut tagged = 0;
    for record in reader.records().filter_map(|r| r.ok()) {
        // Anonymous proxies and satellite providers carry no geoname id
        let Some(code) = record
            .get(id_idx)
            .and_then(|v| v.parse::<u64>().ok())
            .and_then(|id| codes.get(&id))
        else {
            continue;
        };
        let Some(net) = record.get(net_idx).and_then(|v| v.parse::<IpNet>().ok()) else {
            continue;
        };
        map.insert(net.trunc(), code.clone());
        tagged += 1;
    }
    Ok(tagged)
}
