//! Cache error definitions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`ConfigCache`](super::ConfigCache) operations.
///
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backing `<name>.json` file does not exist.
    #[error("config file not found: {path}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file exists but could not be stat'ed, read or written.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Raw bytes are not valid JSON for the requested type.
    #[error("failed to decode config '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The entry was already decoded as a different type in this generation.
    #[error("config '{name}' already decoded as {cached}, requested as {requested}")]
    TypeMismatch {
        name: String,
        cached: &'static str,
        requested: &'static str,
    },

    /// A typed value could not be serialized before writing.
    #[error("failed to encode config '{name}': {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The config name cannot be mapped to a file in the cache directory.
    #[error("invalid config name: {0:?}")]
    InvalidName(String),

    /// Cancellation was observed before the operation committed.
    #[error("operation cancelled")]
    Cancelled,
}

impl CacheError {
    /// Classify an I/O failure on `path`, splitting out missing files.
    pub(crate) fn from_io(path: PathBuf, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            CacheError::NotFound { path, source }
        } else {
            CacheError::Io { path, source }
        }
    }

    /// The underlying I/O error, if this is a storage failure.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            CacheError::NotFound { source, .. } | CacheError::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True for [`CacheError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }
}

/// Result alias for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;
