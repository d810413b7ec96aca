//! Directory-backed storage
//!
//! Layout under the root directory:
//!
//! | Path | Purpose |
//! |------|---------|
//! | `objects/<sha256(id)>` | Committed content, one file per identifier |
//! | `tmp/<uuid>.tmp` | Writes in progress, renamed into `objects/` on close |
//!
//! Identifiers are hashed so that any string is a legal identifier and two
//! identifiers never collide on case-insensitive filesystems.

use super::{InputStream, OutputStream, Storage};
use crate::error::{TierError, TierResult};
use crate::fsutil;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const OBJECTS_DIR: &str = "objects";
const TMP_DIR: &str = "tmp";

/// Storage rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
    name: String,
}

impl DirectoryStorage {
    /// Open a store rooted at `root`, creating the directory layout if needed.
    ///
    /// The root is canonicalized, so the store name (and with it the cache
    /// state key) does not depend on the working directory or on how the
    /// path was spelled.
    pub fn open(root: impl Into<PathBuf>) -> TierResult<Self> {
        let root = root.into();
        for dir in [root.join(OBJECTS_DIR), root.join(TMP_DIR)] {
            fs::create_dir_all(&dir)
                .map_err(|e| TierError::io(format!("creating directory {}", dir.display()), e))?;
        }
        let root = fs::canonicalize(&root)
            .map_err(|e| TierError::io(format!("resolving {}", root.display()), e))?;

        let name = format!("dir:{}", root.display());
        Ok(Self { root, name })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Total bytes of committed content
    pub fn size_bytes(&self) -> TierResult<u64> {
        fsutil::dir_size(&self.root.join(OBJECTS_DIR))
    }

    /// File holding the committed content for an identifier
    pub fn object_path(&self, id: &str) -> PathBuf {
        self.root.join(OBJECTS_DIR).join(object_key(id))
    }
}

/// Filename for an identifier
fn object_key(id: &str) -> String {
    hex::encode(Sha256::digest(id.as_bytes()))
}

impl Storage for DirectoryStorage {
    fn name(&self) -> &str {
        &self.name
    }

    fn contains(&self, id: &str) -> TierResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn open_output_stream(&self, id: &str) -> TierResult<Box<dyn OutputStream>> {
        let (temp_path, file) = fsutil::temp_file(&self.root.join(TMP_DIR))?;
        debug!("Writing {} via {}", id, temp_path.display());

        Ok(Box::new(FileOutput {
            writer: Some(BufWriter::new(file)),
            temp_path,
            target: self.object_path(id),
        }))
    }

    fn open_input_stream(&self, id: &str) -> TierResult<Box<dyn InputStream>> {
        let path = self.object_path(id);
        match File::open(&path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(TierError::NotFound(id.to_string())),
            Err(e) => Err(TierError::io(format!("opening {}", path.display()), e)),
        }
    }

    fn delete(&self, id: &str) -> TierResult<bool> {
        fsutil::delete_recursive(&self.object_path(id))
    }

    fn delete_all(&self) -> TierResult<()> {
        let objects = self.root.join(OBJECTS_DIR);
        fsutil::delete_recursive(&objects)?;
        fs::create_dir_all(&objects)
            .map_err(|e| TierError::io(format!("creating directory {}", objects.display()), e))
    }
}

/// Temp-file writer renamed over the target on close
struct FileOutput {
    writer: Option<BufWriter<File>>,
    temp_path: PathBuf,
    target: PathBuf,
}

impl FileOutput {
    fn writer(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.writer
            .as_mut()
            .ok_or_else(|| io::Error::other("output stream already closed"))
    }
}

impl Write for FileOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer()?.flush()
    }
}

impl OutputStream for FileOutput {
    fn close(mut self: Box<Self>) -> TierResult<()> {
        let Some(writer) = self.writer.take() else {
            return Ok(());
        };

        let committed = writer
            .into_inner()
            .map_err(|e| TierError::io("flushing output", e.into_error()))
            .and_then(|file| {
                file.sync_all().map_err(|e| {
                    TierError::io(format!("syncing {}", self.temp_path.display()), e)
                })
            })
            .and_then(|()| fsutil::move_file(&self.temp_path, &self.target));

        if committed.is_err() {
            let _ = fsutil::delete_recursive(&self.temp_path);
        }
        committed
    }
}

impl Drop for FileOutput {
    fn drop(&mut self) {
        // Still holding the writer means close() never committed
        if self.writer.take().is_some() {
            if let Err(e) = fsutil::delete_recursive(&self.temp_path) {
                warn!("Failed to remove {}: {}", self.temp_path.display(), e);
            }
        }
    }
}
