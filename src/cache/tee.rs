//! Read-through tee stream
//!
//! Yields the remote bytes to the caller while mirroring them into the local
//! store. Mirroring is best effort: the first local failure latches the
//! stream write-protected and the caller keeps reading from remote.
//!
//! Finalization runs exactly once, on [`InputStream::close`] or on drop:
//!
//! 1. close the remote source
//! 2. flush and close the local sink (failures latch write-protected)
//! 3. record `completed && !write_protected` in the tracker, unless the
//!    identifier was purged while the stream was open

use super::inflight::{PopulationClaim, Snapshot};
use super::state::CacheStates;
use crate::error::TierResult;
use crate::storage::{InputStream, OutputStream, Storage};
use std::io::{self, Read, Write};
use std::sync::Arc;
use tracing::{debug, warn};

/// Stream that mirrors every byte it yields into the local store
pub struct TeeStream {
    id: String,
    source: Option<Box<dyn InputStream>>,
    sink: Option<Box<dyn OutputStream>>,
    local: Arc<dyn Storage>,
    states: Arc<dyn CacheStates>,
    snapshot: Snapshot,
    completed: bool,
    write_protected: bool,
    // Dropped after finalize(), releasing the identifier for other populations
    _claim: Option<PopulationClaim>,
}

impl TeeStream {
    pub(crate) fn new(
        id: &str,
        source: Box<dyn InputStream>,
        sink: Box<dyn OutputStream>,
        local: Arc<dyn Storage>,
        states: Arc<dyn CacheStates>,
        snapshot: Snapshot,
        claim: Option<PopulationClaim>,
    ) -> Self {
        Self {
            id: id.to_string(),
            source: Some(source),
            sink: Some(sink),
            local,
            states,
            snapshot,
            completed: false,
            write_protected: false,
            _claim: claim,
        }
    }

    /// Whether end of data has been read
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether mirroring has been abandoned after a local failure
    pub fn is_write_protected(&self) -> bool {
        self.write_protected
    }

    fn mirror(&mut self, bytes: &[u8]) {
        if self.write_protected {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if let Err(e) = sink.write_all(bytes) {
            debug!("Cannot write {} to cache: {}", self.id, e);
            self.write_protected = true;
        }
    }

    fn finalize(&mut self) -> TierResult<()> {
        let Some(source) = self.source.take() else {
            return Ok(());
        };
        let closed = source.close();

        if let Some(mut sink) = self.sink.take() {
            if let Err(e) = sink.flush() {
                debug!("Cannot flush cache for {}: {}", self.id, e);
                self.write_protected = true;
            }
            if let Err(e) = sink.close() {
                debug!("Cannot commit cache for {}: {}", self.id, e);
                self.write_protected = true;
            }
        }

        let recorded = if self.completed && !self.write_protected {
            let states = &self.states;
            let local = &*self.local;
            let id = &self.id;
            match self
                .snapshot
                .record_if_current(id, || states.set_fully_cached(local, id, true))
            {
                Some(recorded) => {
                    debug!("Cached {} in {}", id, local.name());
                    recorded
                }
                None => {
                    debug!("Not caching {}: purged while reading", id);
                    Ok(())
                }
            }
        } else {
            debug!(
                "Not caching {} (completed: {}, write protected: {})",
                self.id, self.completed, self.write_protected
            );
            self.states.set_fully_cached(&*self.local, &self.id, false)
        };

        closed.and(recorded)
    }
}

impl Read for TeeStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let source = self
            .source
            .as_mut()
            .ok_or_else(|| io::Error::other("stream already closed"))?;

        let count = source.read(buf)?;
        if count == 0 {
            if !buf.is_empty() {
                self.completed = true;
            }
            return Ok(0);
        }

        self.mirror(&buf[..count]);
        Ok(count)
    }
}

impl InputStream for TeeStream {
    fn close(mut self: Box<Self>) -> TierResult<()> {
        self.finalize()
    }
}

impl Drop for TeeStream {
    fn drop(&mut self) {
        if let Err(e) = self.finalize() {
            warn!("Failed to finalize cached read of {}: {}", self.id, e);
        }
    }
}
