//! In-memory storage that counts every primitive call.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::cache::storage::Storage;

#[derive(Default)]
pub(crate) struct MemoryStorage {
    docs: Mutex<HashMap<PathBuf, (SystemTime, Vec<u8>)>>,
    stats: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    /// Seed a document with a modification time safely in the past.
    pub(crate) fn seed(&self, path: &str, data: &[u8]) {
        let mtime = SystemTime::now() - Duration::from_secs(1);
        self.docs
            .lock()
            .insert(PathBuf::from(path), (mtime, data.to_vec()));
    }

    /// Replace a document, advancing its modification time.
    pub(crate) fn put(&self, path: &str, data: &[u8]) {
        self.store(Path::new(path), data);
    }

    pub(crate) fn remove(&self, path: &str) {
        self.docs.lock().remove(Path::new(path));
    }

    /// Make every following write fail with `ErrorKind::NotFound`, the way a
    /// removed directory does.
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub(crate) fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn store(&self, path: &Path, data: &[u8]) {
        let mut docs = self.docs.lock();
        let mut mtime = SystemTime::now();
        if let Some((previous, _)) = docs.get(path) {
            if mtime <= *previous {
                mtime = *previous + Duration::from_nanos(1);
            }
        }
        docs.insert(path.to_path_buf(), (mtime, data.to_vec()));
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
    }
}

impl Storage for MemoryStorage {
    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        self.stats.fetch_add(1, Ordering::SeqCst);
        self.docs
            .lock()
            .get(path)
            .map(|(mtime, _)| *mtime)
            .ok_or_else(|| Self::not_found(path))
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.docs
            .lock()
            .get(path)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::not_found(path));
        }
        self.store(path, data);
        Ok(())
    }
}
