//! Global atomic counters for bridge observability.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event at the end of a run.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    events_received: AtomicU64,
    events_ignored: AtomicU64,
    events_emitted: AtomicU64,
    protocol_violations: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            events_received: AtomicU64::new(0),
            events_ignored: AtomicU64::new(0),
            events_emitted: AtomicU64::new(0),
            protocol_violations: AtomicU64::new(0),
        }
    }

    pub fn inc_events_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_received", "counter incremented");
    }

    /// Inbound events with no reporter counterpart.
    pub fn inc_events_ignored(&self) {
        self.events_ignored.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_ignored", "counter incremented");
    }

    pub fn inc_events_emitted(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "events_emitted", "counter incremented");
    }

    pub fn inc_protocol_violations(&self) {
        self.protocol_violations.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "protocol_violations", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            events_received = self.events_received(),
            events_ignored = self.events_ignored(),
            events_emitted = self.events_emitted(),
            protocol_violations = self.protocol_violations(),
        );
    }

    pub fn events_received(&self) -> u64 {
        self.events_received.load(Ordering::Relaxed)
    }

    pub fn events_ignored(&self) -> u64 {
        self.events_ignored.load(Ordering::Relaxed)
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

    pub fn protocol_violations(&self) -> u64 {
        self.protocol_violations.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.events_received.store(0, Ordering::Relaxed);
        self.events_ignored.store(0, Ordering::Relaxed);
        self.events_emitted.store(0, Ordering::Relaxed);
        self.protocol_violations.store(0, Ordering::Relaxed);
    }
}
