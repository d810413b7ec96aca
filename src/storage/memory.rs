//! In-memory storage
//!
//! Content lives in a shared map for the lifetime of the store. Useful as a
//! local tier in tests and for short-lived processes.

use super::{InputStream, OutputStream, Storage};
use crate::error::{TierError, TierResult};
use std::collections::HashMap;
use std::io::{self, Cursor, Write};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

type Entries = Arc<RwLock<HashMap<String, Vec<u8>>>>;

/// Storage backed by a process-local map
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    name: String,
    entries: Entries,
}

impl MemoryStorage {
    /// Create an empty store with a unique name
    pub fn new() -> Self {
        Self::named(format!("memory:{}", Uuid::new_v4()))
    }

    /// Create an empty store with an explicit name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert content directly, bypassing the stream interface
    pub fn insert(&self, id: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.into(), bytes.into());
    }

    /// Copy of the content stored for an identifier
    pub fn get(&self, id: &str) -> Option<Vec<u8>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of stored identifiers
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the store holds no identifiers
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, id: &str) -> TierResult<bool> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id))
    }

    fn open_output_stream(&self, id: &str) -> TierResult<Box<dyn OutputStream>> {
        Ok(Box::new(MemoryOutput {
            id: id.to_string(),
            buffer: Vec::new(),
            entries: Arc::clone(&self.entries),
        }))
    }

    fn open_input_stream(&self, id: &str) -> TierResult<Box<dyn InputStream>> {
        match self.get(id) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes))),
            None => Err(TierError::NotFound(id.to_string())),
        }
    }

    fn delete(&self, id: &str) -> TierResult<bool> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
            .is_some())
    }

    fn delete_all(&self) -> TierResult<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }
}

/// Buffered writer that publishes its bytes on close
struct MemoryOutput {
    id: String,
    buffer: Vec<u8>,
    entries: Entries,
}

impl Write for MemoryOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl OutputStream for MemoryOutput {
    fn close(self: Box<Self>) -> TierResult<()> {
        let MemoryOutput {
            id,
            buffer,
            entries,
        } = *self;
        entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, buffer);
        Ok(())
    }
}
