//! CLI command implementations.

pub mod build;
pub mod check;
pub mod geolite;
pub mod patch;
pub mod stats;

use anyhow::Result;
use std::path::Path;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::error::BanipError;

const RULE: &str = "══════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = " ────────────────────────────────────────────────────────────────";

/// Load the configuration for a command run.
///
/// A missing default config file means defaults; a missing file the user
/// named explicitly is an error. `data_dir` overrides the file's value.
pub fn load_config(config_path: &Path, data_dir: Option<&Path>) -> Result<Config> {
    if !config_path.exists() && config_path != Path::new(DEFAULT_CONFIG_PATH) {
        return Err(BanipError::Config(format!(
            "config file {} not found",
            config_path.display()
        ))
        .into());
    }
    let config = Config::load_or_default(config_path)?;
    Ok(match data_dir {
        Some(dir) => config.with_data_dir(dir),
        None => config,
    })
}

/// Print a two-column report table.
///
/// An empty label inserts a separator row.
pub(crate) fn print_table(title: &str, rows: &[(&str, String)]) {
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    println!();
    println!("{}", RULE);
    println!(" {}", title);
    println!("{}", RULE);
    for (label, value) in rows {
        if label.is_empty() {
            println!("{}", THIN_RULE);
        } else {
            println!(" {:>width$}  {:>16}", label, value, width = width);
        }
    }
    println!("{}", RULE);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_explicit_missing_is_error() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&dir.path().join("nope.yaml"), None).unwrap_err();
        assert!(err.to_string().contains("nope.yaml"));
    }

    #[test]
    fn test_load_config_data_dir_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("banip.yaml");
        std::fs::write(&path, "data_dir: /var/lib/banip\n").unwrap();
        let config = load_config(&path, Some(Path::new("/tmp/other"))).unwrap();
        assert_eq!(config.data_dir, Path::new("/tmp/other"));
    }
}
