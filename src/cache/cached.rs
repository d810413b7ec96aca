//! Caching decorator over a remote and a local store

use super::inflight::{Generations, InFlight, Snapshot};
use super::state::{CacheStates, MemoryCacheStates};
use super::tee::TeeStream;
use crate::error::{TierError, TierResult};
use crate::storage::{InputStream, OutputStream, Storage};
use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Chunk size used by [`CachedStorage::cache`]
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Storage that promotes remote content into a local store as it is read
///
/// The remote store is the source of truth: writes go straight to it and the
/// local store only ever holds copies. Reads of identifiers the tracker
/// reports as fully cached are served locally; everything else streams from
/// remote through a [`TeeStream`] that fills the local copy on the way.
///
/// Writing through [`Storage::open_output_stream`] does not invalidate an
/// existing local copy. Callers that overwrite remote content must
/// [`purge`](CachedStorage::purge) the identifier themselves.
///
/// A purge or bulk delete that overlaps a population wins: the population
/// still finishes its copy but never records the identifier as fully cached.
pub struct CachedStorage {
    name: String,
    remote: Arc<dyn Storage>,
    local: Arc<dyn Storage>,
    states: Arc<dyn CacheStates>,
    lazy_caching: AtomicBool,
    chunk_size: usize,
    in_flight: Arc<InFlight>,
    generations: Arc<Generations>,
}

impl CachedStorage {
    /// Create a cached store tracking state in memory
    pub fn new(remote: Arc<dyn Storage>, local: Arc<dyn Storage>) -> Self {
        Self::with_states(remote, local, Arc::new(MemoryCacheStates::new()))
    }

    /// Create a cached store with a shared state tracker
    pub fn with_states(
        remote: Arc<dyn Storage>,
        local: Arc<dyn Storage>,
        states: Arc<dyn CacheStates>,
    ) -> Self {
        Self {
            name: format!("cached:{}", remote.name()),
            remote,
            local,
            states,
            lazy_caching: AtomicBool::new(false),
            chunk_size: DEFAULT_CHUNK_SIZE,
            in_flight: InFlight::new(),
            generations: Generations::new(),
        }
    }

    /// Set the chunk size used by [`CachedStorage::cache`]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The authoritative store
    pub fn remote(&self) -> &Arc<dyn Storage> {
        &self.remote
    }

    /// The cache tier
    pub fn local(&self) -> &Arc<dyn Storage> {
        &self.local
    }

    /// The shared state tracker
    pub fn states(&self) -> &Arc<dyn CacheStates> {
        &self.states
    }

    /// Whether reads leave the local store untouched
    pub fn lazy_caching(&self) -> bool {
        self.lazy_caching.load(Ordering::Relaxed)
    }

    /// Enable or disable populating the local store on read
    pub fn set_lazy_caching(&self, lazy_caching: bool) {
        self.lazy_caching.store(lazy_caching, Ordering::Relaxed);
    }

    /// Whether `id` has a complete copy in the local store
    pub fn is_fully_cached(&self, id: &str) -> TierResult<bool> {
        self.states.is_fully_cached(&*self.local, id)
    }

    /// Copy `id` from remote to local, blocking until done.
    ///
    /// Does nothing if the identifier is already fully cached. Fails with
    /// [`TierError::InvalidState`] without waiting when another population of
    /// the same identifier is running, including an unclosed stream returned
    /// by [`Storage::open_input_stream`] on the calling thread. Also fails that
    /// way when the identifier is purged before the copy completes. On failure
    /// the identifier is left not fully cached.
    pub fn cache(&self, id: &str) -> TierResult<()> {
        if self.is_fully_cached(id)? {
            return Ok(());
        }

        let Some(_claim) = self.in_flight.try_claim(id) else {
            return Err(TierError::InvalidState(format!(
                "population of {} is already in progress",
                id
            )));
        };
        if self.is_fully_cached(id)? {
            debug!("{} was cached by another population", id);
            return Ok(());
        }
        let snapshot = self.generations.snapshot(id);

        let mut source = match self.remote.open_input_stream(id) {
            Ok(source) => source,
            Err(e) if e.is_not_found() => {
                return Err(TierError::InvalidState(format!(
                    "remote store {} has no stream for {}",
                    self.remote.name(),
                    id
                )))
            }
            Err(e) => return Err(e),
        };

        let copied = self.copy_to_local(id, &mut *source, &snapshot);
        let closed = source.close();
        let bytes = copied?;
        closed?;

        info!("Cached {} ({} bytes)", id, bytes);
        Ok(())
    }

    fn copy_to_local(
        &self,
        id: &str,
        source: &mut dyn InputStream,
        snapshot: &Snapshot,
    ) -> TierResult<u64> {
        let mut sink = self.local.open_output_stream(id)?;

        let copied = copy_chunks(source, &mut *sink, self.chunk_size).and_then(|bytes| {
            sink.flush()
                .map_err(|e| TierError::io(format!("flushing cache for {}", id), e))?;
            Ok(bytes)
        });
        let closed = sink.close();

        if copied.is_err() || closed.is_err() {
            self.states.set_fully_cached(&*self.local, id, false)?;
        }
        let bytes = copied?;
        closed?;

        let local = &*self.local;
        match snapshot.record_if_current(id, || self.states.set_fully_cached(local, id, true)) {
            Some(recorded) => recorded?,
            None => {
                return Err(TierError::InvalidState(format!(
                    "{} was purged while caching",
                    id
                )))
            }
        }
        Ok(bytes)
    }

    /// Remove the local copy of `id`, leaving remote untouched.
    ///
    /// Returns whether a local copy existed.
    pub fn purge(&self, id: &str) -> TierResult<bool> {
        self.generations.invalidate(id);
        let deleted = self.local.delete(id)?;
        if deleted {
            self.states.set_fully_cached(&*self.local, id, false)?;
            debug!("Purged {} from {}", id, self.local.name());
        }
        Ok(deleted)
    }
}

fn copy_chunks(
    source: &mut dyn InputStream,
    sink: &mut dyn OutputStream,
    chunk_size: usize,
) -> TierResult<u64> {
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let read = source
            .read(&mut buffer)
            .map_err(|e| TierError::io("reading remote stream", e))?;
        if read == 0 {
            return Ok(total);
        }
        sink.write_all(&buffer[..read])
            .map_err(|e| TierError::io("writing local cache", e))?;
        total += read as u64;
    }
}

impl Storage for CachedStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, id: &str) -> TierResult<bool> {
        Ok(self.local.contains(id)? || self.remote.contains(id)?)
    }

    fn open_output_stream(&self, id: &str) -> TierResult<Box<dyn OutputStream>> {
        self.remote.open_output_stream(id)
    }

    fn open_input_stream(&self, id: &str) -> TierResult<Box<dyn InputStream>> {
        if self.is_fully_cached(id)? {
            debug!("Reading {} from local storage", id);
            return self.local.open_input_stream(id);
        }

        let source = self.remote.open_input_stream(id)?;
        if self.lazy_caching() {
            debug!("Reading {} from remote storage (lazy)", id);
            return Ok(source);
        }

        let Some(claim) = self.in_flight.try_claim(id) else {
            debug!("Reading {} from remote storage (population in flight)", id);
            return Ok(source);
        };

        let snapshot = self.generations.snapshot(id);
        let sink = match self.local.open_output_stream(id) {
            Ok(sink) => sink,
            Err(e) => {
                warn!("Cannot open cache for {}: {}", id, e);
                return Ok(source);
            }
        };

        debug!("Reading {} from remote storage", id);
        Ok(Box::new(TeeStream::new(
            id,
            source,
            sink,
            Arc::clone(&self.local),
            Arc::clone(&self.states),
            snapshot,
            Some(claim),
        )))
    }

    fn delete(&self, id: &str) -> TierResult<bool> {
        Ok(self.remote.delete(id)? && self.purge(id)?)
    }

    fn delete_all(&self) -> TierResult<()> {
        self.generations.invalidate_all();
        self.local.delete_all()?;
        self.states.clear(&*self.local)?;

        match self.remote.delete_all() {
            Err(e) if e.is_unsupported() => {
                debug!("Remote {} does not support delete_all", self.remote.name());
                Ok(())
            }
            other => other,
        }
    }
}
