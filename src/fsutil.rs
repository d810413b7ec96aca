//! Filesystem helpers for directory-backed stores
//!
//! Atomic moves, recursive removal and sizing, and unique temporary files.

use crate::error::{TierError, TierResult};
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Rename `src` to `dst`, replacing `dst` if it exists.
///
/// Both paths must live on the same filesystem for the rename to be atomic.
pub fn move_file(src: &Path, dst: &Path) -> TierResult<()> {
    fs::rename(src, dst).map_err(|e| {
        TierError::io(
            format!(
                "renaming {} (exists: {}) to {} (exists: {})",
                src.display(),
                src.exists(),
                dst.display(),
                dst.exists()
            ),
            e,
        )
    })
}

/// Move every entry below `from` into `to`, merging with what `to` holds.
///
/// Directories are recreated under `to` and files are moved one by one with
/// [`move_file`], replacing same-named files. `from` keeps its (now empty)
/// directory structure.
pub fn move_all_files(from: &Path, to: &Path) -> TierResult<()> {
    fs::create_dir_all(to)
        .map_err(|e| TierError::io(format!("creating directory {}", to.display()), e))?;

    let entries =
        fs::read_dir(from).map_err(|e| TierError::io(format!("reading {}", from.display()), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| TierError::io("reading directory entry", e))?;
        let file_type = entry
            .file_type()
            .map_err(|e| TierError::io(format!("inspecting {}", entry.path().display()), e))?;
        let target = to.join(entry.file_name());

        if file_type.is_dir() {
            move_all_files(&entry.path(), &target)?;
        } else {
            move_file(&entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Remove a file or directory tree.
///
/// Returns `true` if something was removed, `false` if the path did not exist.
pub fn delete_recursive(path: &Path) -> TierResult<bool> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(TierError::io(format!("inspecting {}", path.display()), e)),
    };

    let result = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TierError::io(format!("removing {}", path.display()), e)),
    }
}

/// Total size in bytes of all regular files below `path`
pub fn dir_size(path: &Path) -> TierResult<u64> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(TierError::io(format!("inspecting {}", path.display()), e)),
    };

    if !meta.is_dir() {
        return Ok(if meta.is_file() { meta.len() } else { 0 });
    }

    let entries =
        fs::read_dir(path).map_err(|e| TierError::io(format!("reading {}", path.display()), e))?;

    let mut total = 0;
    for entry in entries {
        let entry = entry.map_err(|e| TierError::io("reading directory entry", e))?;
        total += dir_size(&entry.path())?;
    }
    Ok(total)
}

/// Random name suitable for a temporary file
pub fn temp_name() -> String {
    Uuid::new_v4().to_string()
}

/// Create a new, uniquely named file inside `dir`
pub fn temp_file(dir: &Path) -> TierResult<(PathBuf, File)> {
    fs::create_dir_all(dir)
        .map_err(|e| TierError::io(format!("creating directory {}", dir.display()), e))?;

    let path = dir.join(format!("{}.tmp", temp_name()));
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| TierError::io(format!("creating temp file {}", path.display()), e))?;

    Ok((path, file))
}
