//! Checklist and maintenance actions.
//!
//! An action pairs a schedule definition with the history of its past
//! performances; the due calculator projects both into a [`due::ScheduleState`]
//! the caller persists alongside the action record.

pub mod action;
pub mod due;
pub mod schedule;
