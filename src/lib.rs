//! Hangar: flight-log and maintenance tracking core for radio-control models.
//!
//! This crate provides the data shapes and the due-date projection behind
//! pre-use/post-use checklists and maintenance plans:
//! - **Usage snapshot**: the owning model's aggregate counters ([`UsageStats`])
//! - **Schedules**: repeating and one-time schedule definitions ([`Schedule`])
//! - **History**: past performances of an action ([`HistoryEntry`])
//! - **Due calculator**: pure projection of due status and description text
//!   ([`compute_schedule_state`])
//!
//! Screens, storage, and record CRUD are external collaborators: callers pass
//! read-only snapshots in and persist the returned [`ScheduleState`] inside
//! whatever transaction boundary they already hold. The calculator performs
//! no I/O and owns no state, so it is safe to call from any thread and is
//! idempotent for identical inputs.

pub mod checklist;
pub mod error;
pub mod usage;

pub use checklist::action::{ActionSnapshot, Category, HistoryEntry};
pub use checklist::due::{
    DueEstimate, DueStatus, OffsetUnit, ScheduleState, compute_schedule_state,
    compute_schedule_state_at,
};
pub use checklist::schedule::{Anchor, OnceUnit, RepeatUnit, Schedule};
pub use error::{HangarError, Result};
pub use usage::UsageStats;
