//! Build command implementation.

use anyhow::Result;
use chrono::Local;
use std::path::Path;

use crate::commands::print_table;
use crate::config::Config;
use crate::fs_abstraction::real_fs;
use crate::pipeline::{run_build, BuildMetrics, BuildOptions};
use crate::utils::format_count_with_separator;
use crate::validation::{validate_compact, validate_threshold};

/// Run the build command
///
/// Command-line values win over the config file's `build` defaults.
pub fn run(
    outfile: Option<&Path>,
    threshold: Option<u8>,
    compact: Option<u8>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let options = BuildOptions {
        threshold: validate_threshold(threshold.unwrap_or(config.build.threshold))?,
        compact: match compact {
            Some(c) => validate_compact(c)?,
            None => config.build.compact,
        },
    };

    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let metrics = run_build(real_fs(), config, &options, outfile, &generated_at)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

fn print_metrics(metrics: &BuildMetrics) {
    print_table(
        "BANIP BUILD METRICS",
        &[
            ("Target countries", metrics.target_countries.join(",")),
            (
                "Blacklist IPs from threat feed",
                format_count_with_separator(metrics.feed_ips),
            ),
            (
                "Compacted feed subnets",
                format_count_with_separator(metrics.feed_networks),
            ),
            (
                "Custom blacklist IPs",
                format_count_with_separator(metrics.custom_ips),
            ),
            (
                "Custom blacklist subnets",
                format_count_with_separator(metrics.custom_networks),
            ),
            ("", String::new()),
            (
                "Total entries saved",
                format_count_with_separator(metrics.total_entries),
            ),
            (
                "Addresses blocked",
                format_count_with_separator(metrics.addresses_blocked),
            ),
        ],
    );
}
