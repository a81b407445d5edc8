//! Sticky per-aggregator shutdown flags.
//!
//! Backs the poll-based `/shutdown_status` endpoint. A flag is set when a
//! shutdown command is dispatched and never cleared, so every poller
//! observes the request regardless of timing. Independent of the event
//! broker: the flag records that a shutdown was requested, not whether
//! any stream received it.

use std::sync::Arc;

use dashmap::DashMap;

/// Set of aggregator UUIDs with a pending shutdown request.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlags {
    requested: Arc<DashMap<String, ()>>,
}

impl ShutdownFlags {
    /// Creates an empty flag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an aggregator as shutdown-requested.
    pub fn mark(&self, aggregator_uuid: &str) {
        self.requested.insert(aggregator_uuid.to_string(), ());
    }

    /// Returns whether a shutdown has been requested for an aggregator.
    #[must_use]
    pub fn is_requested(&self, aggregator_uuid: &str) -> bool {
        self.requested.contains_key(aggregator_uuid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_starts_clear() {
        let flags = ShutdownFlags::new();
        assert!(!flags.is_requested("agg-1"));
    }

    #[test]
    fn test_mark_is_sticky_and_idempotent() {
        let flags = ShutdownFlags::new();

        flags.mark("agg-1");
        flags.mark("agg-1");

        assert!(flags.is_requested("agg-1"));
        assert!(!flags.is_requested("agg-2"));
    }

    #[test]
    fn test_clones_share_state() {
        let flags = ShutdownFlags::new();
        let view = flags.clone();

        flags.mark("agg-1");

        assert!(view.is_requested("agg-1"));
    }
}
