//! Geolite command implementation.

use anyhow::Result;

use crate::config::Config;
use crate::error::{BanipError, GEOLITE_HINT};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::geolite::refresh_country_map;
use crate::utils::format_count_with_separator;

/// Run the geolite command: rebuild the country cache and its text mirror.
pub fn run(config: &Config) -> Result<()> {
    let fs = real_fs();
    let paths = config.paths();
    for table in [
        &paths.geolite_locations,
        &paths.geolite_blocks_v4,
        &paths.geolite_blocks_v6,
    ] {
        if !fs.exists(table) {
            return Err(BanipError::missing(table, GEOLITE_HINT).into());
        }
    }

    let map = refresh_country_map(fs, &paths)?;
    println!(
        "Country map rebuilt: {} networks written to {}",
        format_count_with_separator(map.len()),
        paths.country_nets.display()
    );
    Ok(())
}
