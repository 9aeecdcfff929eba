//! Backing storage primitives.
//!
//! The cache only needs three operations from its backing store: the
//! modification time of a document, its full contents, and a whole-document
//! overwrite. [`FileStorage`] implements them on the local filesystem.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::SystemTime;

use tempfile::NamedTempFile;

/// Stat/read/write primitives used by the cache.
pub trait Storage: Send + Sync {
    /// Modification time of the document at `path`.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Full contents of the document at `path`.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the document at `path` with `data`.
    ///
    /// Readers must never observe a partially written document.
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// Local filesystem storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl Storage for FileStorage {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Stage next to the target so the rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(data)?;
        staged.as_file().sync_all()?;
        staged.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}
