//! Configuration schema for tiercache
//!
//! Configuration is stored at `~/.config/tiercache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Authoritative store (required for any storage command)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<RemoteConfig>,

    /// Local cache tier
    pub local: LocalConfig,

    /// Caching behaviour
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Remote store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RemoteConfig {
    /// A directory, typically on a network mount
    Directory { path: PathBuf },

    /// An HTTP endpoint serving objects below `url`
    Http {
        url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

fn default_timeout_secs() -> u64 {
    crate::storage::http::DEFAULT_TIMEOUT_SECS
}

impl RemoteConfig {
    /// Interpret a command-line location: URLs select HTTP, anything else a directory
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Self::Http {
                url: location.to_string(),
                timeout_secs: default_timeout_secs(),
            }
        } else {
            Self::Directory {
                path: PathBuf::from(location),
            }
        }
    }
}

/// Local cache tier settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Cache directory (defaults to the user data directory)
    pub path: Option<PathBuf>,
}

/// Caching behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Serve uncached reads from remote without populating local
    pub lazy: bool,

    /// Chunk size in bytes for explicit cache copies
    pub chunk_size: usize,

    /// Remember fully-cached identifiers across runs
    pub persist_state: bool,

    /// State file (defaults to the user state directory)
    pub state_file: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            lazy: false,
            chunk_size: crate::cache::DEFAULT_CHUNK_SIZE,
            persist_state: true,
            state_file: None,
        }
    }
}
