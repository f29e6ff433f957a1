//! banip - country-scoped IP blacklist builder for proxy servers.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use banip::cli::{Cli, Commands};
use banip::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Version = cli.command {
        println!("banip {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = commands::load_config(&cli.config, cli.data_dir.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Build {
            outfile,
            threshold,
            compact,
            json,
        } => commands::build::run(outfile.as_deref(), threshold, compact, json, &config),
        Commands::Check { ip } => commands::check::run(&ip, &config),
        Commands::Stats { country_code } => commands::stats::run(&country_code, &config),
        Commands::Patch {
            newips,
            index,
            confidence,
        } => commands::patch::run(&newips, index, confidence, &config),
        Commands::Geolite => commands::geolite::run(&config),
        Commands::Version => Ok(()),
    }
}
