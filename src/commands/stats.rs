//! Stats command implementation.

use anyhow::Result;

use crate::commands::print_table;
use crate::config::Config;
use crate::country::{CountryMap, CountryStats};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::utils::format_count_with_separator;
use crate::validation::validate_country_code;

/// Run the stats command
pub fn run(country_code: &str, config: &Config) -> Result<()> {
    let country = validate_country_code(country_code)?;
    match country_stats(real_fs(), config, &country)? {
        None => {
            println!(
                "The country cache is missing. Run 'banip build' before producing \
                 statistics for a particular country. Run 'banip build -h' for more \
                 information."
            );
        }
        Some(stats) if stats.is_empty() => println!("{} not found", country),
        Some(stats) => print_table(
            &format!("RESULTS FOR: {}", country),
            &[
                ("Nets (v4)", format_count_with_separator(stats.nets_v4)),
                ("Nets (v6)", format_count_with_separator(stats.nets_v6)),
                ("", String::new()),
                ("IPs (v4)", format_count_with_separator(stats.ips_v4)),
                ("IPs (v6)", format!("{:.2e}", stats.ips_v6)),
            ],
        ),
    }
    Ok(())
}

/// Stats for `country`, or `None` when no country cache exists yet.
pub fn country_stats(
    fs: &dyn FileSystem,
    config: &Config,
    country: &str,
) -> Result<Option<CountryStats>> {
    let paths = config.paths();
    if !fs.exists(&paths.country_nets_cache) {
        return Ok(None);
    }
    let map = CountryMap::load_cache(fs, &paths.country_nets_cache)?;
    Ok(Some(map.stats_for(country)))
}
