//! Patch command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::commands::print_table;
use crate::config::Config;
use crate::error::{BanipError, PROJECT_HINT};
use crate::feed::{address_at_field, PatchSummary, ThreatFeed};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::utils::format_count_with_separator;

/// Run the patch command
pub fn run(newips: &Path, index: isize, confidence: u8, config: &Config) -> Result<()> {
    let summary = patch_feed(real_fs(), config, newips, index, confidence)?;
    print_table(
        "FINAL AUGMENTATION STATS",
        &[
            (
                "Original threat feed size",
                format_count_with_separator(summary.original_size),
            ),
            (
                "New IPs analyzed",
                format_count_with_separator(summary.considered),
            ),
            ("New IPs added", format_count_with_separator(summary.added)),
            (
                "New threat feed size",
                format_count_with_separator(summary.final_size),
            ),
        ],
    );
    Ok(())
}

/// Merge the addresses found in `newips` into the threat feed on disk.
pub fn patch_feed(
    fs: &dyn FileSystem,
    config: &Config,
    newips: &Path,
    index: isize,
    confidence: u8,
) -> Result<PatchSummary> {
    let paths = config.paths();
    for required in [paths.threat_feed.as_path(), newips] {
        if !fs.exists(required) {
            return Err(BanipError::missing(required, PROJECT_HINT).into());
        }
    }

    let mut feed = ThreatFeed::load(fs, &paths.threat_feed)?;
    let content = fs
        .read_to_string(newips)
        .with_context(|| format!("Failed to read {:?}", newips))?;
    let addrs = content
        .lines()
        .filter_map(|line| address_at_field(line, index));

    info!("Patching with new IPs");
    let summary = feed.patch(addrs, u32::from(confidence));
    feed.save(fs, &paths.threat_feed)?;
    Ok(summary)
}
