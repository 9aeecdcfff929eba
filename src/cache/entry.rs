//! Cached entry for a single config name.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant, SystemTime};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::cache::error::{CacheError, CacheResult};

/// Decoded form of an entry, tagged with the type it was decoded as.
struct Decoded {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// One generation of a cached config document.
///
/// `raw` never changes for the lifetime of an entry. A reload installs a new
/// `Entry` rather than mutating this one, which discards any decoded value
/// cached on the old generation.
pub struct Entry {
    raw: Bytes,
    /// Wall-clock load time, compared against file modification times.
    loaded_at: SystemTime,
    /// Monotonic load time, drives the freshness window.
    loaded_instant: Instant,
    decoded: OnceLock<Decoded>,
}

impl Entry {
    pub(crate) fn new(raw: Bytes, loaded_at: SystemTime, loaded_instant: Instant) -> Self {
        Self {
            raw,
            loaded_at,
            loaded_instant,
            decoded: OnceLock::new(),
        }
    }

    /// The document bytes as read from storage.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// When this generation was loaded.
    pub fn loaded_at(&self) -> SystemTime {
        self.loaded_at
    }

    /// Type name of the cached decoded value, if any.
    pub fn decoded_type(&self) -> Option<&'static str> {
        self.decoded.get().map(|d| d.type_name)
    }

    pub(crate) fn is_fresh(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.loaded_instant) < window
    }

    /// Whether storage modified at `modified` has nothing newer than this entry.
    ///
    /// File mtimes come from a coarse kernel clock. A write landing within one
    /// tick of the reload can be stamped at or before `loaded_at` and is then
    /// treated as covered until the file changes again.
    pub(crate) fn covers(&self, modified: SystemTime) -> bool {
        modified <= self.loaded_at
    }

    /// The cached decoded value, if this generation has one.
    ///
    /// Returns `Some(Err(TypeMismatch))` when the value was decoded as a
    /// different type.
    pub(crate) fn cached<T>(&self, name: &str) -> Option<CacheResult<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        let decoded = self.decoded.get()?;
        Some(downcast(decoded, name))
    }

    /// Decode `raw` as `T` and cache the result on this generation.
    ///
    /// If a value is already cached it wins, and is type-checked against `T`.
    pub(crate) fn decode<T>(&self, name: &str) -> CacheResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let value: T = serde_json::from_slice(&self.raw).map_err(|source| CacheError::Decode {
            name: name.to_string(),
            source,
        })?;
        let stored = self.decoded.get_or_init(|| Decoded {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        });
        downcast(stored, name)
    }
}

fn downcast<T>(decoded: &Decoded, name: &str) -> CacheResult<Arc<T>>
where
    T: Any + Send + Sync,
{
    Arc::clone(&decoded.value)
        .downcast::<T>()
        .map_err(|_| CacheError::TypeMismatch {
            name: name.to_string(),
            cached: decoded.type_name,
            requested: type_name::<T>(),
        })
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("len", &self.raw.len())
            .field("loaded_at", &self.loaded_at)
            .field("decoded", &self.decoded_type())
            .finish()
    }
}
