//! Typed access on top of the raw store.
//!
//! The first typed read of an entry generation decodes its bytes and caches
//! the value on the entry; later reads of that generation share the same
//! `Arc`. A reload replaces the entry, so the next read decodes again.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::cancel::CancelToken;
use crate::cache::error::{CacheError, CacheResult};
use crate::cache::storage::Storage;
use crate::cache::store::ConfigCache;
use crate::observability::metrics;

impl<S: Storage> ConfigCache<S> {
    /// Decoded value of `name` as `T`.
    ///
    /// Fails with [`CacheError::TypeMismatch`] if the current generation was
    /// already decoded as a different type.
    pub fn get_typed<T>(&self, name: &str) -> CacheResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        self.get_typed_cancellable(name, &CancelToken::never())
    }

    pub fn get_typed_cancellable<T>(&self, name: &str, cancel: &CancelToken) -> CacheResult<Arc<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let resolved = self.resolve(name, cancel)?;
        let name = name.trim();
        let entry = resolved.entry;
        if !resolved.reloaded {
            if let Some(cached) = entry.cached::<T>(name) {
                return cached;
            }
        }

        let _guard = self.entries.write();
        if cancel.is_cancelled() {
            return Err(CacheError::Cancelled);
        }
        // A concurrent caller may have decoded this generation already.
        if let Some(cached) = entry.cached::<T>(name) {
            return cached;
        }

        let value = entry.decode::<T>(name)?;
        self.decodes.fetch_add(1, Ordering::Relaxed);
        metrics::record_decode();
        tracing::debug!(config = %name, decoded_as = std::any::type_name::<T>(), "Config decoded");
        Ok(value)
    }

    /// Serialize `value` as JSON and write it as the document for `name`.
    pub fn update_typed<T>(&self, name: &str, value: &T) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        self.update_typed_cancellable(name, value, &CancelToken::never())
    }

    pub fn update_typed_cancellable<T>(
        &self,
        name: &str,
        value: &T,
        cancel: &CancelToken,
    ) -> CacheResult<()>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value).map_err(|source| CacheError::Encode {
            name: name.trim().to_string(),
            source,
        })?;
        self.update_cancellable(name, data, cancel)
    }
}
