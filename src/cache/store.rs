//! Staleness-checked config store.
//!
//! # Freshness protocol
//! ```text
//! shared lock:
//!     entry fresh (within sync window)      → serve entry
//!     stat file fails                       → error (stale entry not served)
//!     mtime <= entry.loaded_at              → serve entry
//! release shared, take exclusive:
//!     entry now covers mtime (raced reload) → serve that entry
//!     read file, install new entry          → serve, flagged reloaded
//! ```
//!
//! The shared lock is always fully released before the exclusive lock is
//! requested, so no caller ever waits for exclusive access while holding
//! shared access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use parking_lot::RwLock;
use serde::Serialize;

use crate::cache::cancel::CancelToken;
use crate::cache::entry::Entry;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::storage::{FileStorage, Storage};
use crate::observability::metrics;

/// Default freshness window.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(60);

/// Extension of every backing document.
pub const CONFIG_EXTENSION: &str = "json";

/// Diagnostics snapshot of a cache.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub directory: PathBuf,
    /// Every resident config name, in no particular order.
    pub configs: Vec<String>,
    /// Documents read from storage since creation.
    pub reloads: u64,
    /// Typed decodes performed since creation.
    pub decodes: u64,
}

/// An entry together with whether this resolution loaded it.
pub(crate) struct Resolved {
    pub(crate) entry: Arc<Entry>,
    pub(crate) reloaded: bool,
}

/// Process-local cache of JSON config documents stored as
/// `<directory>/<name>.json`.
///
/// Reads within the sync window are served from memory. Past the window the
/// file is re-stat'ed and only re-read when its modification time advanced.
/// There is no eviction: every name ever resolved stays resident.
pub struct ConfigCache<S = FileStorage> {
    directory: PathBuf,
    storage: S,
    sync_timeout: Duration,
    pub(crate) entries: RwLock<HashMap<String, Arc<Entry>>>,
    reloads: AtomicU64,
    pub(crate) decodes: AtomicU64,
}

impl ConfigCache<FileStorage> {
    /// Create a filesystem-backed cache over `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self::with_storage(directory, FileStorage)
    }
}

impl<S: Storage> ConfigCache<S> {
    /// Create a cache over `directory` using a custom storage backend.
    pub fn with_storage(directory: impl Into<PathBuf>, storage: S) -> Self {
        Self {
            directory: directory.into(),
            storage,
            sync_timeout: DEFAULT_SYNC_TIMEOUT,
            entries: RwLock::new(HashMap::new()),
            reloads: AtomicU64::new(0),
            decodes: AtomicU64::new(0),
        }
    }

    /// Set the freshness window. Within it, cached entries are served without
    /// touching storage.
    pub fn with_sync_timeout(mut self, sync_timeout: Duration) -> Self {
        self.sync_timeout = sync_timeout;
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn sync_timeout(&self) -> Duration {
        self.sync_timeout
    }

    /// Current raw bytes of `name`, reloading from storage if needed.
    pub fn get(&self, name: &str) -> CacheResult<Bytes> {
        self.get_cancellable(name, &CancelToken::never())
    }

    /// [`get`](Self::get) that gives up with [`CacheError::Cancelled`] if
    /// `cancel` fires before a lock stage starts.
    pub fn get_cancellable(&self, name: &str, cancel: &CancelToken) -> CacheResult<Bytes> {
        let resolved = self.resolve(name, cancel)?;
        Ok(resolved.entry.raw().clone())
    }

    /// Overwrite the backing document of `name` with `data`.
    ///
    /// The in-memory entry is left alone: a reader inside the current sync
    /// window keeps seeing the previous bytes until the window lapses and the
    /// newer modification time is observed.
    pub fn update(&self, name: &str, data: impl AsRef<[u8]>) -> CacheResult<()> {
        self.update_cancellable(name, data, &CancelToken::never())
    }

    pub fn update_cancellable(
        &self,
        name: &str,
        data: impl AsRef<[u8]>,
        cancel: &CancelToken,
    ) -> CacheResult<()> {
        let name = normalize_name(name)?;
        let path = self.path_for(name);
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        let _guard = self.entries.write();
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }
        let data = data.as_ref();
        self.storage
            .write(&path, data)
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;

        metrics::record_update();
        tracing::info!(config = %name, bytes = data.len(), "Config document written");
        Ok(())
    }

    /// Snapshot of the directory and resident names.
    pub fn stats(&self) -> Stats {
        let entries = self.entries.read();
        Stats {
            directory: self.directory.clone(),
            configs: entries.keys().cloned().collect(),
            reloads: self.reloads.load(Ordering::Relaxed),
            decodes: self.decodes.load(Ordering::Relaxed),
        }
    }

    /// Resolve `name` to its current entry, reloading when storage changed.
    pub(crate) fn resolve(&self, name: &str, cancel: &CancelToken) -> CacheResult<Resolved> {
        let name = normalize_name(name)?;
        let path = self.path_for(name);
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        let modified = {
            let entries = self.entries.read();
            let existing = entries.get(name);

            if let Some(entry) = existing {
                if entry.is_fresh(Instant::now(), self.sync_timeout) {
                    return Ok(Resolved {
                        entry: Arc::clone(entry),
                        reloaded: false,
                    });
                }
            }

            let modified = self
                .storage
                .modified(&path)
                .map_err(|e| CacheError::from_io(path.clone(), e))?;

            if let Some(entry) = existing {
                if entry.covers(modified) {
                    tracing::trace!(config = %name, "Sync window lapsed, document unchanged");
                    return Ok(Resolved {
                        entry: Arc::clone(entry),
                        reloaded: false,
                    });
                }
            }
            modified
        };

        let mut entries = self.entries.write();
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }

        // Another caller may have reloaded while we waited for the lock.
        if let Some(entry) = entries.get(name) {
            if entry.covers(modified) {
                return Ok(Resolved {
                    entry: Arc::clone(entry),
                    reloaded: false,
                });
            }
        }

        let loaded_at = SystemTime::now();
        let loaded_instant = Instant::now();
        let raw = self
            .storage
            .read(&path)
            .map_err(|e| CacheError::from_io(path.clone(), e))?;
        let entry = Arc::new(Entry::new(Bytes::from(raw), loaded_at, loaded_instant));
        entries.insert(name.to_string(), Arc::clone(&entry));

        self.reloads.fetch_add(1, Ordering::Relaxed);
        metrics::record_reload();
        tracing::debug!(config = %name, bytes = entry.raw().len(), "Config reloaded");

        Ok(Resolved {
            entry,
            reloaded: true,
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(format!("{name}.{CONFIG_EXTENSION}"))
    }
}

/// Trim `name` and reject anything that would escape the cache directory.
fn normalize_name(name: &str) -> CacheResult<&str> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\', '\0']);
    if invalid {
        return Err(CacheError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cancel::CancelSource;
    use crate::cache::testing::MemoryStorage;

    fn cache_with(docs: &[(&str, &str)], window: Duration) -> ConfigCache<MemoryStorage> {
        let storage = MemoryStorage::default();
        for (name, body) in docs {
            storage.seed(&format!("/cfg/{name}.json"), body.as_bytes());
        }
        ConfigCache::with_storage("/cfg", storage).with_sync_timeout(window)
    }

    #[test]
    fn test_first_get_loads_then_serves_from_memory() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::from_secs(3600));

        assert_eq!(cache.get("app").unwrap(), Bytes::from_static(br#"{"a":1}"#));
        assert_eq!(cache.get("app").unwrap(), Bytes::from_static(br#"{"a":1}"#));

        // Second call is inside the window: no stat, no read.
        assert_eq!(cache.storage.stat_count(), 1);
        assert_eq!(cache.storage.read_count(), 1);
        assert_eq!(cache.stats().reloads, 1);
    }

    #[test]
    fn test_mtime_short_circuit() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::ZERO);

        let first = cache.resolve("app", &CancelToken::never()).unwrap();
        assert!(first.reloaded);
        let second = cache.resolve("app", &CancelToken::never()).unwrap();
        assert!(!second.reloaded);
        assert!(Arc::ptr_eq(&first.entry, &second.entry));

        assert_eq!(cache.storage.stat_count(), 2);
        assert_eq!(cache.storage.read_count(), 1);
    }

    #[test]
    fn test_reload_when_mtime_advances() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::ZERO);
        let first = cache.resolve("app", &CancelToken::never()).unwrap();

        cache.storage.put("/cfg/app.json", br#"{"a":2}"#);
        let second = cache.resolve("app", &CancelToken::never()).unwrap();

        assert!(second.reloaded);
        assert_eq!(second.entry.raw(), &Bytes::from_static(br#"{"a":2}"#));
        assert!(second.entry.loaded_at() >= first.entry.loaded_at());
        assert_eq!(cache.storage.read_count(), 2);
    }

    #[test]
    fn test_stat_failure_is_not_masked_by_stale_entry() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::ZERO);
        cache.get("app").unwrap();

        cache.storage.remove("/cfg/app.json");
        let err = cache.get("app").unwrap_err();
        assert!(err.is_not_found(), "got {err:?}");
    }

    #[test]
    fn test_missing_document() {
        let cache = cache_with(&[], DEFAULT_SYNC_TIMEOUT);
        let err = cache.get("missing").unwrap_err();
        assert!(err.is_not_found());
        assert!(cache.stats().configs.is_empty());
    }

    #[test]
    fn test_no_redundant_reload_under_contention() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::ZERO);

        std::thread::scope(|s| {
            for _ in 0..16 {
                s.spawn(|| {
                    for _ in 0..50 {
                        cache.get("app").unwrap();
                    }
                });
            }
        });

        assert_eq!(cache.storage.read_count(), 1);
        assert_eq!(cache.stats().reloads, 1);
    }

    #[test]
    fn test_update_is_not_visible_inside_window() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::from_secs(3600));
        cache.get("app").unwrap();

        cache.update("app", br#"{"a":2}"#).unwrap();
        assert_eq!(cache.get("app").unwrap(), Bytes::from_static(br#"{"a":1}"#));
    }

    #[test]
    fn test_update_visible_after_window() {
        let cache = cache_with(&[("app", r#"{"a":1}"#)], Duration::ZERO);
        cache.get("app").unwrap();

        cache.update("app", br#"{"a":2}"#).unwrap();
        assert_eq!(cache.get("app").unwrap(), Bytes::from_static(br#"{"a":2}"#));
    }

    #[test]
    fn test_update_creates_document() {
        let cache = cache_with(&[], Duration::ZERO);
        cache.update("fresh", b"[1,2,3]").unwrap();
        assert_eq!(cache.get("fresh").unwrap(), Bytes::from_static(b"[1,2,3]"));
    }

    #[test]
    fn test_failed_write_is_io_error_not_missing_document() {
        let cache = cache_with(&[("app", "{}")], Duration::ZERO);
        cache.storage.fail_writes(true);

        let err = cache.update("app", b"{\"a\":2}").unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }), "got {err:?}");
        assert!(!err.is_not_found());
        assert!(!err.to_string().contains("not found"));
        assert_eq!(cache.storage.write_count(), 1);

        // The stored document is untouched.
        assert_eq!(cache.get("app").unwrap(), Bytes::from_static(b"{}"));
    }

    #[test]
    fn test_cancelled_before_io() {
        let cache = cache_with(&[("app", "{}")], DEFAULT_SYNC_TIMEOUT);
        let source = CancelSource::new();
        source.cancel();

        let err = cache.get_cancellable("app", &source.token()).unwrap_err();
        assert!(matches!(err, CacheError::Cancelled));
        let err = cache
            .update_cancellable("app", b"[]", &source.token())
            .unwrap_err();
        assert!(matches!(err, CacheError::Cancelled));

        assert_eq!(cache.storage.stat_count(), 0);
        assert_eq!(cache.storage.read_count(), 0);
        assert_eq!(cache.storage.write_count(), 0);
    }

    #[test]
    fn test_names_are_trimmed_and_validated() {
        let cache = cache_with(&[("app", "{}")], DEFAULT_SYNC_TIMEOUT);
        cache.get("  app\n").unwrap();
        assert_eq!(cache.stats().configs, vec!["app".to_string()]);

        for bad in ["", "   ", "..", "../etc/passwd", "a/b", "a\\b", "a\0b"] {
            let err = cache.get(bad).unwrap_err();
            assert!(matches!(err, CacheError::InvalidName(_)), "{bad:?}: {err:?}");
        }
    }

    #[test]
    fn test_stats_lists_resident_names() {
        let cache = cache_with(&[("a", "{}"), ("b", "{}"), ("c", "{}")], DEFAULT_SYNC_TIMEOUT);
        cache.get("a").unwrap();
        cache.get("c").unwrap();

        let mut stats = cache.stats();
        stats.configs.sort();
        assert_eq!(stats.directory, PathBuf::from("/cfg"));
        assert_eq!(stats.configs, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(stats.reloads, 2);
    }

    #[test]
    fn test_default_sync_timeout() {
        let cache = ConfigCache::new("/tmp");
        assert_eq!(cache.sync_timeout(), Duration::from_secs(60));
        assert_eq!(cache.directory(), Path::new("/tmp"));
    }
}
