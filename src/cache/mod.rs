//! Read-through caching over two stores
//!
//! [`CachedStorage`] composes an authoritative remote store with a fast local
//! store. Reads stream from remote while a [`TeeStream`] copies the bytes into
//! local; once a copy completes cleanly the tracker marks the identifier fully
//! cached and later reads are served locally.
//!
//! # Entry States
//!
//! | State | Reads served from | Leaves via |
//! |-------|-------------------|------------|
//! | Absent | remote (tee fills local) | complete tee read, `cache()` |
//! | FullyCached | local | `purge()`, `delete()`, `delete_all()` |
//!
//! Partially written local bytes are never reported as cached; the next
//! read overwrites them from the start.

pub mod cached;
pub mod inflight;
pub mod state;
pub mod tee;

pub use cached::{CachedStorage, DEFAULT_CHUNK_SIZE};
pub use inflight::{Generation, Generations, InFlight, PopulationClaim, Snapshot};
pub use state::{CacheStates, CachedEntry, FileCacheStates, MemoryCacheStates};
pub use tee::TeeStream;
