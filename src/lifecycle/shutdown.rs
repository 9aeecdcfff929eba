//! Shutdown coordination for the server.

use crate::cache::{CancelSource, CancelToken};

/// Coordinator for graceful shutdown.
///
/// Every long-running task and every cache call made on behalf of a request
/// holds a token from the same source.
pub struct Shutdown {
    source: CancelSource,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            source: CancelSource::new(),
        }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> CancelToken {
        self.source.token()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        tracing::info!("Shutdown triggered");
        self.source.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.source.is_cancelled()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_reaches_subscribers() {
        let shutdown = Shutdown::new();
        let a = shutdown.subscribe();
        let b = shutdown.subscribe();

        shutdown.trigger();
        assert!(shutdown.is_triggered());
        assert!(a.is_cancelled());
        assert!(b.is_cancelled());
    }
}
