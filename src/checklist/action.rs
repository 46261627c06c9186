//! Checklist action snapshots and performance history.
//!
//! The storage layer owns the action records; the calculator consumes a
//! read-only [`ActionSnapshot`] of one action's schedule and history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HangarError, Result};

use super::schedule::Schedule;

/// Which checklist an action belongs to.
///
/// Only affects phrasing ("before every…" for pre-use, "after every…"
/// otherwise) — never the due math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Performed before each usage event.
    PreUse,
    /// Performed after each usage event.
    PostUse,
    /// Recurring maintenance plan item.
    Maintenance,
    /// Maintenance performed a single time.
    OneTimeMaintenance,
}

/// One past performance of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Opaque record identifier (assigned by the store).
    pub id: String,
    /// When the action was performed.
    pub performed_at: DateTime<Utc>,
    /// The model's accumulated running time at that moment, in seconds.
    pub running_secs_at_performance: f64,
    /// The model's usage-event count at that moment.
    pub events_at_performance: u32,
}

/// Read-only view of one action: its schedule and performance history.
///
/// History entries are appended in non-decreasing `performed_at` order; the
/// calculator reads only the last entry for repeating schedules and only
/// emptiness for one-time schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSnapshot {
    /// When the action recurs or is due once.
    pub schedule: Schedule,
    /// Past performances, oldest first.
    pub history: Vec<HistoryEntry>,
}

impl ActionSnapshot {
    /// Create a snapshot from a schedule and its history.
    #[must_use]
    pub fn new(schedule: Schedule, history: Vec<HistoryEntry>) -> Self {
        Self { schedule, history }
    }

    /// The most recent performance, if any.
    #[must_use]
    pub fn last_performed(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    /// Whether the action has ever been performed.
    #[must_use]
    pub fn has_been_performed(&self) -> bool {
        !self.history.is_empty()
    }

    /// Verify the history ordering invariant.
    ///
    /// Entries must be in non-decreasing `performed_at` order; an
    /// out-of-order history indicates store corruption and is rejected here
    /// at the boundary rather than inside the calculator.
    pub fn validate_history(&self) -> Result<()> {
        for pair in self.history.windows(2) {
            if pair[1].performed_at < pair[0].performed_at {
                return Err(HangarError::History(format!(
                    "entry {} performed before its predecessor {}",
                    pair[1].id, pair[0].id
                )));
            }
        }
        Ok(())
    }
}
