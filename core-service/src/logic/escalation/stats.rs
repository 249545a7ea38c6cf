//! Evaluation counters
//!
//! Owned outside the engine (shared through `Arc`) so an observability
//! collaborator can read them without touching the engine.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct EvaluationCounters {
    events_seen: AtomicU64,
    sensitive_events: AtomicU64,
    anomalies: AtomicU64,
    escalations: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub events_seen: u64,
    pub sensitive_events: u64,
    pub anomalies: u64,
    pub escalations: u64,
}

impl EvaluationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_event(&self) {
        self.events_seen.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sensitive(&self) {
        self.sensitive_events.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_anomaly(&self) {
        self.anomalies.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_escalation(&self) {
        self.escalations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            events_seen: self.events_seen.load(Ordering::Relaxed),
            sensitive_events: self.sensitive_events.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            escalations: self.escalations.load(Ordering::Relaxed),
        }
    }
}
