//! Coordination between cache populations and invalidations
//!
//! [`InFlight`] allows at most one population (tee read or explicit copy) per
//! identifier at a time. A claim is released when its [`PopulationClaim`] is
//! dropped.
//!
//! [`Generations`] orders populations against purges: a population records
//! "fully cached" only if no purge or bulk delete of its identifier happened
//! since it started.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifiers whose local copy is currently being written
#[derive(Debug, Default)]
pub struct InFlight {
    active: Mutex<HashSet<String>>,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claim `id` if no population is running for it
    pub fn try_claim(self: &Arc<Self>, id: &str) -> Option<PopulationClaim> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(id.to_string()) {
            return None;
        }
        Some(PopulationClaim {
            owner: Arc::clone(self),
            id: id.to_string(),
        })
    }

    /// Whether a population is running for `id`
    pub fn is_active(&self, id: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Exclusive right to populate one identifier
#[derive(Debug)]
pub struct PopulationClaim {
    owner: Arc<InFlight>,
    id: String,
}

impl PopulationClaim {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Drop for PopulationClaim {
    fn drop(&mut self) {
        self.owner
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

/// Snapshot of an identifier's invalidation counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation {
    epoch: u64,
    id: u64,
}

#[derive(Debug, Default)]
struct Counters {
    epoch: u64,
    ids: HashMap<String, u64>,
}

impl Counters {
    fn current(&self, id: &str) -> Generation {
        Generation {
            epoch: self.epoch,
            id: self.ids.get(id).copied().unwrap_or(0),
        }
    }
}

/// Invalidation counters, per identifier and store-wide
#[derive(Debug, Default)]
pub struct Generations {
    counters: Mutex<Counters>,
}

impl Generations {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Capture the counters for a population of `id` that starts now
    pub fn snapshot(self: &Arc<Self>, id: &str) -> Snapshot {
        Snapshot {
            owner: Arc::clone(self),
            seen: self.current(id),
        }
    }

    /// Counters to compare against when a population finishes
    pub fn current(&self, id: &str) -> Generation {
        self.counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current(id)
    }

    /// Invalidate populations of `id` that started before this call
    pub fn invalidate(&self, id: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        *counters.ids.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Invalidate every population that started before this call
    pub fn invalidate_all(&self) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        counters.epoch += 1;
        counters.ids.clear();
    }

    /// Run `record` only if `id` was not invalidated since `seen`.
    ///
    /// The check and `record` happen under the counters lock, so an
    /// invalidation is either observed here or runs after `record`.
    pub fn record_if_current<T>(
        &self,
        id: &str,
        seen: Generation,
        record: impl FnOnce() -> T,
    ) -> Option<T> {
        let counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        if counters.current(id) != seen {
            return None;
        }
        Some(record())
    }
}

/// Counters captured when a population started
#[derive(Debug, Clone)]
pub struct Snapshot {
    owner: Arc<Generations>,
    seen: Generation,
}

impl Snapshot {
    /// Run `record` only if `id` was not invalidated since the snapshot
    pub fn record_if_current<T>(&self, id: &str, record: impl FnOnce() -> T) -> Option<T> {
        self.owner.record_if_current(id, self.seen, record)
    }
}
