//! Aggregate usage statistics of the owning model.
//!
//! A read-only projection supplied by the storage layer: how many usage
//! events (flights, runs) a model has logged and how much running time it has
//! accumulated. The due calculator uses these counters to project
//! event-based and model-time-based schedules; it never mutates them.

use serde::{Deserialize, Serialize};

/// Aggregate usage counters for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Total number of logged usage events.
    pub total_events: u32,
    /// Total accumulated running time across all events, in seconds.
    pub total_running_secs: f64,
}

impl UsageStats {
    /// Create a snapshot from raw counters.
    #[must_use]
    pub fn new(total_events: u32, total_running_secs: f64) -> Self {
        Self {
            total_events,
            total_running_secs,
        }
    }

    /// Total running time in minutes.
    #[must_use]
    pub fn total_minutes(&self) -> f64 {
        self.total_running_secs / 60.0
    }

    /// Average running time per usage event, in minutes.
    ///
    /// `None` until at least one event with running time has been logged —
    /// projections that need the average cannot be estimated before then.
    #[must_use]
    pub fn average_event_minutes(&self) -> Option<f64> {
        if self.total_events == 0 {
            return None;
        }
        let avg = self.total_minutes() / f64::from(self.total_events);
        (avg > 0.0).then_some(avg)
    }

    /// Whether any usage has been logged at all.
    #[must_use]
    pub fn has_usage(&self) -> bool {
        self.total_events > 0 || self.total_running_secs > 0.0
    }
}
