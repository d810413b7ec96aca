//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tiercache - read-through caching storage
///
/// Serves objects from a remote store and keeps complete copies in a local
/// cache directory so repeated reads stay local.
#[derive(Parser, Debug)]
#[command(name = "tiercache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TIERCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote store: a directory path or an http(s) URL
    #[arg(long, global = true, env = "TIERCACHE_REMOTE")]
    pub remote: Option<String>,

    /// Local cache directory
    #[arg(long, global = true, env = "TIERCACHE_LOCAL")]
    pub local: Option<PathBuf>,

    /// Do not populate the local cache on read
    #[arg(long, global = true)]
    pub lazy: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read an object, caching it locally on the way
    Get(GetArgs),

    /// Write an object to the remote store
    Put(PutArgs),

    /// Copy objects into the local cache ahead of use
    Cache(IdsArgs),

    /// Remove local copies, keeping the remote objects
    Purge(IdsArgs),

    /// Delete objects from the remote store and the local cache
    Delete(IdsArgs),

    /// Remove every object from the local cache and, where supported, the remote store
    Clear(ClearArgs),

    /// Show where objects are stored and whether they are cached
    Status(StatusArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Object identifier
    pub id: String,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the put command
#[derive(Parser, Debug)]
pub struct PutArgs {
    /// Object identifier
    pub id: String,

    /// File to upload (reads stdin if omitted)
    pub file: Option<PathBuf>,

    /// Also drop any local copy so the next read fetches the new content
    #[arg(long)]
    pub purge: bool,
}

/// Arguments naming one or more objects
#[derive(Parser, Debug)]
pub struct IdsArgs {
    /// Object identifiers
    #[arg(required = true)]
    pub ids: Vec<String>,
}

/// Arguments for the clear command
#[derive(Parser, Debug)]
pub struct ClearArgs {
    /// Confirm removal
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Object identifiers (lists cached objects if omitted)
    pub ids: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.lazy)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for status reports
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
