//! # banip - IP blacklists for proxy servers
//!
//! Builds a country-scoped blacklist for a reverse proxy (HAProxy ACL
//! include files and the like) from three sources: a threat feed of
//! addresses with confidence scores, a GeoLite2-derived country map, and
//! operator-maintained custom blacklist and whitelist files.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          banip                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: build, check, stats, patch, geolite        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! │    └── Data directory and file names, build defaults        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Country map (csv + bincode)                                │
//! │    ├── GeoLite2 CSV join                                    │
//! │    └── Binary cache and text mirror                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pipeline (ipnet)                                           │
//! │    ├── NetworkIndex binary search                           │
//! │    ├── Feed / custom list / whitelist reconciliation        │
//! │    └── /24 compaction                                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Render                                                     │
//! │    └── Blacklist and country whitelist files                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use banip::config::Config;
//! use banip::fs_abstraction::real_fs;
//! use banip::pipeline::{run_build, BuildOptions};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load_or_default("banip.yaml")?;
//!     let options = BuildOptions { threshold: 3, compact: 0 };
//!     let metrics = run_build(real_fs(), &config, &options, None, "2026-01-01 00:00:00")?;
//!     println!("{} entries", metrics.total_entries);
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`token`] - Address/network token parsing and ordering
//! - [`index`] - Sorted per-version network index with binary search
//! - [`country`] - Network to country code map, cache and mirror
//! - [`geolite`] - GeoLite2 CSV conversion
//! - [`feed`] - Threat feed with hit counts
//! - [`lists`] - Custom blacklist and whitelist files
//! - [`compaction`] - /24 compaction of dense address groups
//! - [`pipeline`] - Set reconciliation for the build command
//! - [`render`] - Output file rendering
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`validation`] - Input validation at the CLI boundary
//! - [`fs_abstraction`] - Filesystem trait for testability
//! - [`error`] - Error types
//! - [`utils`] - Count formatting

pub mod cli;
pub mod commands;
pub mod compaction;
pub mod config;
pub mod country;
pub mod error;
pub mod feed;
pub mod fs_abstraction;
pub mod geolite;
pub mod index;
pub mod lists;
pub mod pipeline;
pub mod render;
pub mod token;
pub mod utils;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::BanipError;
