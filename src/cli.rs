//! CLI argument parsing with clap.
//!
//! The subcommand set is fixed at compile time; each variant maps to one
//! runner under [`crate::commands`].

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::validation::{parse_compact, parse_threshold};

#[derive(Parser)]
#[command(name = "banip")]
#[command(
    author,
    version,
    about = "Build country-scoped IP blacklists for proxy servers"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Data directory (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the blacklist from the threat feed, country data and custom lists
    Build {
        /// Output file for the rendered blacklist (default: data dir)
        #[arg(short, long)]
        outfile: Option<PathBuf>,

        /// Minimum confidence (1-10) for a threat feed address
        #[arg(short, long, value_parser = parse_threshold)]
        threshold: Option<u8>,

        /// Collapse /24 groups of at least this many addresses (1-255)
        #[arg(short, long, value_parser = parse_compact)]
        compact: Option<u8>,

        /// Print the build metrics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show what banip knows about an IP address
    Check {
        /// IP address to check
        ip: String,
    },

    /// Show network and address counts for one country
    Stats {
        /// Two-letter country or continent code
        country_code: String,
    },

    /// Add addresses from another file to the threat feed
    Patch {
        /// File with one address somewhere on each line
        newips: PathBuf,

        /// Whitespace-separated field holding the address (-1 = last)
        #[arg(short, long, default_value_t = -1, allow_negative_numbers = true)]
        index: isize,

        /// Confidence (1-10) assigned to the new addresses
        #[arg(short = 't', long, default_value = "10", value_parser = parse_threshold)]
        confidence: u8,
    },

    /// Rebuild the country cache from the GeoLite2 CSV tables
    Geolite,

    /// Show version
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_build_defaults() {
        let cli = Cli::try_parse_from(["banip", "build"]).unwrap();
        match cli.command {
            Commands::Build {
                outfile,
                threshold,
                compact,
                json,
            } => {
                assert!(outfile.is_none());
                assert!(threshold.is_none());
                assert!(compact.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Build command"),
        }
        assert_eq!(cli.config.to_str().unwrap(), DEFAULT_CONFIG_PATH);
    }

    #[test]
    fn test_cli_build_options() {
        let cli = Cli::try_parse_from([
            "banip", "build", "-o", "out.txt", "-t", "5", "-c", "12", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Build {
                outfile,
                threshold,
                compact,
                json,
            } => {
                assert_eq!(outfile, Some(PathBuf::from("out.txt")));
                assert_eq!(threshold, Some(5));
                assert_eq!(compact, Some(12));
                assert!(json);
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_rejects_out_of_range() {
        assert!(Cli::try_parse_from(["banip", "build", "-t", "0"]).is_err());
        assert!(Cli::try_parse_from(["banip", "build", "-t", "11"]).is_err());
        assert!(Cli::try_parse_from(["banip", "build", "-c", "0"]).is_err());
        assert!(Cli::try_parse_from(["banip", "build", "-c", "256"]).is_err());
        assert!(Cli::try_parse_from(["banip", "build", "-t", "abc"]).is_err());
    }

    #[test]
    fn test_cli_check_command() {
        let cli = Cli::try_parse_from(["banip", "check", "192.168.1.1"]).unwrap();
        match cli.command {
            Commands::Check { ip } => assert_eq!(ip, "192.168.1.1"),
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_stats_command() {
        let cli = Cli::try_parse_from(["banip", "stats", "us"]).unwrap();
        match cli.command {
            Commands::Stats { country_code } => assert_eq!(country_code, "us"),
            _ => panic!("Expected Stats command"),
        }
    }

    #[test]
    fn test_cli_patch_defaults() {
        let cli = Cli::try_parse_from(["banip", "patch", "fail2ban.log"]).unwrap();
        match cli.command {
            Commands::Patch {
                newips,
                index,
                confidence,
            } => {
                assert_eq!(newips, PathBuf::from("fail2ban.log"));
                assert_eq!(index, -1);
                assert_eq!(confidence, 10);
            }
            _ => panic!("Expected Patch command"),
        }
    }

    #[test]
    fn test_cli_patch_negative_index() {
        let cli =
            Cli::try_parse_from(["banip", "patch", "new.txt", "-i", "-2", "-t", "7"]).unwrap();
        match cli.command {
            Commands::Patch {
                index, confidence, ..
            } => {
                assert_eq!(index, -2);
                assert_eq!(confidence, 7);
            }
            _ => panic!("Expected Patch command"),
        }
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from([
            "banip",
            "-q",
            "-v",
            "--config",
            "/custom/path.yaml",
            "--data-dir",
            "/srv/banip",
            "geolite",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert!(cli.verbose);
        assert_eq!(cli.config.to_str().unwrap(), "/custom/path.yaml");
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/banip")));
        assert!(matches!(cli.command, Commands::Geolite));
    }
}
