//! tiercache - read-through caching storage
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tiercache::cli::{Cli, Commands};
use tiercache::config::{Config, ConfigManager, RemoteConfig};
use tiercache::error::TierResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> TierResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let mut config = config_manager.load()?;

    init_logging(cli.verbose, &config);
    debug!("Using config {}", config_manager.path().display());

    apply_overrides(&cli, &mut config);

    // Dispatch to command
    match cli.command {
        Commands::Get(args) => tiercache::cli::commands::get(args, &config),
        Commands::Put(args) => tiercache::cli::commands::put(args, &config),
        Commands::Cache(args) => tiercache::cli::commands::cache(args, &config),
        Commands::Purge(args) => tiercache::cli::commands::purge(args, &config),
        Commands::Delete(args) => tiercache::cli::commands::delete(args, &config),
        Commands::Clear(args) => tiercache::cli::commands::clear(args, &config),
        Commands::Status(args) => tiercache::cli::commands::status(args, &config),
        Commands::Config(args) => {
            tiercache::cli::commands::config(args, &config, &config_manager)
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, config: &Config) {
    let filter = match verbose {
        0 => EnvFilter::new("tiercache=warn"),
        1 => EnvFilter::new("tiercache=info"),
        _ => EnvFilter::new("tiercache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Command-line flags take precedence over the config file
fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(ref location) = cli.remote {
        config.remote = Some(RemoteConfig::from_location(location));
    }
    if let Some(ref local) = cli.local {
        config.local.path = Some(local.clone());
    }
    if cli.lazy {
        config.cache.lazy = true;
    }
}
