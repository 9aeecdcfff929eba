//! File-backed configuration cache.
//!
//! # Data Flow
//! ```text
//! get(name)
//!     → store.rs (freshness window, stat, double-checked reload)
//!     → entry.rs (raw bytes of one generation)
//!     → typed.rs (decode once per generation, shared Arc<T>)
//!
//! update(name, bytes)
//!     → storage.rs (atomic whole-document write)
//!     → picked up by the next get past the sync window
//! ```
//!
//! # Design Decisions
//! - One reader/writer lock for the whole map; reloads and decodes of all
//!   names serialize on it, fast-path reads run concurrently
//! - The sync window rate-limits stat calls; unchanged files are never re-read
//! - Errors from the freshness check are surfaced, never replaced by stale data
//! - `update` does not refresh the in-memory entry; readers converge once the
//!   window lapses

pub mod cancel;
pub mod entry;
pub mod error;
pub mod storage;
pub mod store;
mod typed;

#[cfg(test)]
pub(crate) mod testing;

pub use cancel::{CancelSource, CancelToken};
pub use entry::Entry;
pub use error::{CacheError, CacheResult};
pub use storage::{FileStorage, Storage};
pub use store::{ConfigCache, Stats, DEFAULT_SYNC_TIMEOUT};
