//! Store factory
//!
//! Builds the remote store, local store and state tracker described by a
//! [`Config`] and wires them into a [`CachedStorage`].

use crate::cache::{CacheStates, CachedStorage, FileCacheStates, MemoryCacheStates};
use crate::config::{Config, ConfigManager, RemoteConfig};
use crate::error::{TierError, TierResult};
use crate::storage::{DirectoryStorage, HttpStorage, Storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// State file kept beside the local objects unless configured elsewhere
pub const STATE_FILE_NAME: &str = "cache-state.json";

/// Create the remote store for a remote configuration
pub fn create_remote(remote: &RemoteConfig) -> TierResult<Arc<dyn Storage>> {
    match remote {
        RemoteConfig::Directory { path } => {
            if !path.is_dir() {
                return Err(TierError::User(format!(
                    "Remote directory does not exist: {}",
                    path.display()
                )));
            }
            Ok(Arc::new(DirectoryStorage::open(path.clone())?))
        }
        RemoteConfig::Http { url, timeout_secs } => Ok(Arc::new(HttpStorage::with_timeout(
            url.clone(),
            Duration::from_secs(*timeout_secs),
        ))),
    }
}

/// Directory holding the local cache tier
pub fn local_dir(config: &Config) -> PathBuf {
    config
        .local
        .path
        .clone()
        .unwrap_or_else(ConfigManager::default_local_dir)
}

/// Create the state tracker selected by the cache settings
pub fn create_states(config: &Config) -> TierResult<Arc<dyn CacheStates>> {
    if !config.cache.persist_state {
        debug!("Tracking cache state in memory");
        return Ok(Arc::new(MemoryCacheStates::new()));
    }

    let path = config
        .cache
        .state_file
        .clone()
        .unwrap_or_else(|| local_dir(config).join(STATE_FILE_NAME));
    debug!("Tracking cache state in {}", path.display());
    Ok(Arc::new(FileCacheStates::open(path)?))
}

/// Create the cached store described by `config`
pub fn create_cached_storage(config: &Config) -> TierResult<CachedStorage> {
    let remote_config = config.remote.as_ref().ok_or(TierError::RemoteNotConfigured)?;
    let remote = create_remote(remote_config)?;
    let local: Arc<dyn Storage> = Arc::new(DirectoryStorage::open(local_dir(config))?);
    let states = create_states(config)?;

    debug!("Caching {} in {}", remote.name(), local.name());
    let store = CachedStorage::with_states(remote, local, states)
        .with_chunk_size(config.cache.chunk_size);
    store.set_lazy_caching(config.cache.lazy);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn test_config(temp: &TempDir) -> Config {
        let remote = temp.path().join("remote");
        std::fs::create_dir_all(&remote).unwrap();

        let mut config = Config::default();
        config.remote = Some(RemoteConfig::Directory { path: remote });
        config.local.path = Some(temp.path().join("local"));
        config.cache.state_file = Some(temp.path().join("state.json"));
        config
    }

    #[test]
    fn missing_remote_is_reported() {
        let err = create_cached_storage(&Config::default()).err().unwrap();
        assert!(matches!(err, TierError::RemoteNotConfigured));
    }

    #[test]
    fn missing_remote_directory_is_reported() {
        let temp = TempDir::new().unwrap();
        let remote = RemoteConfig::Directory {
            path: temp.path().join("absent"),
        };
        assert!(create_remote(&remote).is_err());
    }

    #[test]
    fn builds_from_config() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(&temp);
        config.cache.lazy = true;

        let store = create_cached_storage(&config).unwrap();
        assert!(store.lazy_caching());
        assert!(store.local().name().starts_with("dir:"));
        assert!(temp.path().join("local").join("objects").is_dir());
    }

    #[test]
    fn http_remote_is_built_without_network() {
        let remote = RemoteConfig::from_location("http://127.0.0.1:9/objects");
        let store = create_remote(&remote).unwrap();
        assert_eq!(store.name(), "http:http://127.0.0.1:9/objects");
    }

    #[test]
    fn state_file_defaults_to_local_dir() {
        let temp = TempDir::new().unwrap();
        let mut config = test_config(&temp);
        config.cache.state_file = None;

        let store = create_cached_storage(&config).unwrap();
        let mut out = store.remote().open_output_stream("a").unwrap();
        out.write_all(b"abc").unwrap();
        out.close().unwrap();
        store.cache("a").unwrap();

        assert!(temp.path().join("local").join(STATE_FILE_NAME).is_file());

        let reopened = create_cached_storage(&config).unwrap();
        assert!(reopened.is_fully_cached("a").unwrap());
    }
}
