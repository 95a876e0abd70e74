//! Key-value slot persistence
//!
//! The moment list lives as one opaque blob under a fixed key. This module
//! defines the slot interface and a file-backed implementation that keeps
//! each key in its own file, written atomically (temp file, then rename).
//!
//! Storage location: `~/.local/share/moments/` (configurable via `Config`)
//!
//! Files:
//! - `<key>.json` - The blob stored under `key`

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::{StorageError, StorageResult};

/// A platform key-value slot holding opaque blobs
pub trait KeyValueStore {
    /// Read the blob stored under `key`, `None` if nothing is stored
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`
    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()>;
}

/// File-backed key-value slot
///
/// Each key maps to `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    /// Create a slot store rooted at `dir`
    ///
    /// The directory is created lazily on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.path_for(key);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path).map_err(|source| StorageError::ReadError {
            path: path.clone(),
            source,
        })?;

        debug!("Read {} bytes from {:?}", bytes.len(), path);
        Ok(Some(bytes))
    }

    fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        let path = self.path_for(key);
        atomic_write(&path, value)?;
        debug!("Wrote {} bytes to {:?}", value.len(), path);
        Ok(())
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The target file is never left in a partially-written state, and a failed
/// write removes its temp file.
pub(crate) fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    write_via_temp(path, |file| {
        file.write_all(data)?;
        file.sync_all()
    })
}

fn write_via_temp(
    path: &Path,
    write: impl FnOnce(&mut File) -> io::Result<()>,
) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("tmp");

    let written = File::create(&temp_path).and_then(|mut file| write(&mut file));
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::from_io(e, temp_path));
    }

    fs::rename(&temp_path, path).map_err(|source| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
