//! Fully-cached state tracking
//!
//! Remembers, per (store, identifier), whether a complete copy of the
//! identifier's bytes is present in that store. Unknown pairs are never
//! fully cached.

use crate::error::{TierError, TierResult};
use crate::fsutil;
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};
use tracing::debug;

/// Tracker of which identifiers are fully cached in which store
///
/// Implementations are shared between threads and decorator instances; they
/// must allow concurrent lookups and serialize their own writes.
pub trait CacheStates: Send + Sync {
    /// Whether `id` is fully cached in `store`
    fn is_fully_cached(&self, store: &dyn Storage, id: &str) -> TierResult<bool>;

    /// Record whether `id` is fully cached in `store`
    fn set_fully_cached(&self, store: &dyn Storage, id: &str, value: bool) -> TierResult<()>;

    /// Forget every identifier recorded for `store`
    fn clear(&self, store: &dyn Storage) -> TierResult<()>;

    /// Identifiers currently fully cached in `store`, sorted
    fn cached_ids(&self, store: &dyn Storage) -> TierResult<Vec<String>>;
}

/// Tracker held in memory, lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryCacheStates {
    cached: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryCacheStates {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStates for MemoryCacheStates {
    fn is_fully_cached(&self, store: &dyn Storage, id: &str) -> TierResult<bool> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cached
            .get(store.name())
            .is_some_and(|ids| ids.contains(id)))
    }

    fn set_fully_cached(&self, store: &dyn Storage, id: &str, value: bool) -> TierResult<()> {
        let mut cached = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        if value {
            cached
                .entry(store.name().to_string())
                .or_default()
                .insert(id.to_string());
        } else if let Some(ids) = cached.get_mut(store.name()) {
            ids.remove(id);
        }
        Ok(())
    }

    fn clear(&self, store: &dyn Storage) -> TierResult<()> {
        self.cached
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(store.name());
        Ok(())
    }

    fn cached_ids(&self, store: &dyn Storage) -> TierResult<Vec<String>> {
        let cached = self.cached.read().unwrap_or_else(PoisonError::into_inner);
        let mut ids: Vec<String> = cached
            .get(store.name())
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}

/// Persisted record of one fully cached identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry {
    /// When the identifier was last marked fully cached
    pub cached_at: DateTime<Utc>,
}

/// On-disk format of [`FileCacheStates`]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    #[serde(default)]
    stores: BTreeMap<String, BTreeMap<String, CachedEntry>>,
}

const STATE_FILE_VERSION: u32 = 1;

/// Tracker persisted as a JSON file
///
/// The whole file is rewritten through a temporary file and renamed into
/// place on every change, so a crash never leaves a torn state file. The
/// in-memory state only changes once the new file is in place.
pub struct FileCacheStates {
    path: PathBuf,
    state: Mutex<StateFile>,
}

impl FileCacheStates {
    /// Load the tracker from `path`, starting empty if the file does not exist
    pub fn open(path: impl Into<PathBuf>) -> TierResult<Self> {
        let path = path.into();
        let state = match fs::read_to_string(&path) {
            Ok(content) => {
                let state: StateFile = serde_json::from_str(&content)?;
                if state.version != STATE_FILE_VERSION {
                    return Err(TierError::InvalidState(format!(
                        "unsupported cache state version {} in {}",
                        state.version,
                        path.display()
                    )));
                }
                debug!("Loaded cache state from {}", path.display());
                state
            }
            Err(e) if e.kind() == ErrorKind::NotFound => StateFile {
                version: STATE_FILE_VERSION,
                stores: BTreeMap::new(),
            },
            Err(e) => {
                return Err(TierError::io(
                    format!("reading cache state {}", path.display()),
                    e,
                ))
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted entry for an identifier, if fully cached
    pub fn entry(&self, store: &dyn Storage, id: &str) -> Option<CachedEntry> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .stores
            .get(store.name())
            .and_then(|ids| ids.get(id))
            .cloned()
    }

    fn persist(&self, state: &StateFile) -> TierResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let (temp_path, mut file) = fsutil::temp_file(dir)?;

        let content = serde_json::to_vec_pretty(state)?;
        let written = file
            .write_all(&content)
            .and_then(|()| file.sync_all())
            .map_err(|e| TierError::io(format!("writing {}", temp_path.display()), e));
        drop(file);

        if let Err(e) = written.and_then(|()| fsutil::move_file(&temp_path, &self.path)) {
            let _ = fsutil::delete_recursive(&temp_path);
            return Err(e);
        }
        Ok(())
    }
}

impl CacheStates for FileCacheStates {
    fn is_fully_cached(&self, store: &dyn Storage, id: &str) -> TierResult<bool> {
        Ok(self.entry(store, id).is_some())
    }

    fn set_fully_cached(&self, store: &dyn Storage, id: &str, value: bool) -> TierResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = state.clone();

        let changed = if value {
            next.stores
                .entry(store.name().to_string())
                .or_default()
                .insert(
                    id.to_string(),
                    CachedEntry {
                        cached_at: Utc::now(),
                    },
                );
            true
        } else {
            let removed = next
                .stores
                .get_mut(store.name())
                .is_some_and(|ids| ids.remove(id).is_some());
            if next.stores.get(store.name()).is_some_and(|ids| ids.is_empty()) {
                next.stores.remove(store.name());
            }
            removed
        };

        if changed {
            self.persist(&next)?;
            *state = next;
        }
        Ok(())
    }

    fn clear(&self, store: &dyn Storage) -> TierResult<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.stores.contains_key(store.name()) {
            return Ok(());
        }

        let mut next = state.clone();
        next.stores.remove(store.name());
        self.persist(&next)?;
        *state = next;
        Ok(())
    }

    fn cached_ids(&self, store: &dyn Storage) -> TierResult<Vec<String>> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state
            .stores
            .get(store.name())
            .map(|ids| ids.keys().cloned().collect())
            .unwrap_or_default())
    }
}
