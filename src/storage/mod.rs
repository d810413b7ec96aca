//! Storage capability
//!
//! Every backing store, local or remote, implements [`Storage`]. The caching
//! decorator in [`crate::cache`] implements it too, so a cached store can be
//! handed to any code that expects a plain store.

pub mod directory;
pub mod http;
pub mod memory;

pub use directory::DirectoryStorage;
pub use http::HttpStorage;
pub use memory::MemoryStorage;

use crate::error::{TierError, TierResult};
use std::fs::File;
use std::io::{self, Cursor, Read, Write};

/// Largest single read issued by [`InputStream::skip`]
pub const SKIP_BUFFER_SIZE: usize = 1024;

/// Readable byte source returned by [`Storage::open_input_stream`]
pub trait InputStream: Read + Send {
    /// Skip up to `n` bytes by reading them.
    ///
    /// Streams never seek: skipped bytes flow through [`Read::read`] so that
    /// wrappers observing reads see them too. Returns the number of bytes
    /// actually skipped, which is short only at end of data.
    fn skip(&mut self, n: u64) -> io::Result<u64> {
        let mut buffer = [0u8; SKIP_BUFFER_SIZE];
        let mut skipped = 0u64;
        while skipped < n {
            let want = (n - skipped).min(SKIP_BUFFER_SIZE as u64) as usize;
            let read = self.read(&mut buffer[..want])?;
            if read == 0 {
                break;
            }
            skipped += read as u64;
        }
        Ok(skipped)
    }

    /// Whether [`InputStream::mark`] and [`InputStream::reset`] are available
    fn mark_supported(&self) -> bool {
        false
    }

    /// Remember the current position for a later [`InputStream::reset`]
    fn mark(&mut self, _read_limit: usize) -> TierResult<()> {
        Err(TierError::unsupported("input stream", "mark"))
    }

    /// Rewind to a previously marked position
    fn reset(&mut self) -> TierResult<()> {
        Err(TierError::unsupported("input stream", "reset"))
    }

    /// Release the stream
    fn close(self: Box<Self>) -> TierResult<()> {
        Ok(())
    }
}

/// Writable byte sink returned by [`Storage::open_output_stream`]
///
/// Content becomes visible only after [`OutputStream::close`] returns `Ok`.
/// Dropping a sink without closing it discards what was written.
pub trait OutputStream: Write + Send {
    /// Commit the written bytes
    fn close(self: Box<Self>) -> TierResult<()>;
}

/// Byte-addressable container keyed by string identifiers
pub trait Storage: Send + Sync {
    /// Stable name of this store, used as the cache-state key
    fn name(&self) -> &str;

    /// Check whether the identifier exists
    fn contains(&self, id: &str) -> TierResult<bool>;

    /// Create or overwrite the identifier's content
    fn open_output_stream(&self, id: &str) -> TierResult<Box<dyn OutputStream>>;

    /// Open the identifier's content for reading.
    ///
    /// Returns [`TierError::NotFound`] if the identifier is absent.
    fn open_input_stream(&self, id: &str) -> TierResult<Box<dyn InputStream>>;

    /// Remove the identifier, returning whether it existed
    fn delete(&self, id: &str) -> TierResult<bool>;

    /// Remove every identifier.
    ///
    /// Stores that cannot enumerate or bulk-clear their content return
    /// [`TierError::Unsupported`].
    fn delete_all(&self) -> TierResult<()>;
}

impl InputStream for Cursor<Vec<u8>> {}

impl InputStream for File {}
