//! Due projection for checklist and maintenance schedules.
//!
//! [`compute_schedule_state`] takes a read-only action snapshot, the
//! checklist category, and the owning model's usage counters, and returns the
//! action's due status plus a human-readable description of its schedule.
//! The projection is pure: no I/O, no shared state, and identical inputs (at
//! a fixed evaluation instant) produce identical output. Callers persist the
//! returned [`ScheduleState`] inside whatever transaction appended the
//! triggering history entry or updated the usage counters.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::usage::UsageStats;

use super::action::{ActionSnapshot, Category, HistoryEntry};
use super::schedule::{Anchor, OnceUnit, RepeatUnit, Schedule};

/// What a due offset counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// Calendar days.
    Days,
    /// Usage events (exact or estimated from average event duration).
    Events,
}

impl OffsetUnit {
    fn noun(self) -> &'static str {
        match self {
            Self::Days => "day",
            Self::Events => "event",
        }
    }
}

/// A concrete due projection.
///
/// Negative `offset` means overdue by that many units, zero means due
/// exactly now, positive means due in `offset` more units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueEstimate {
    /// Signed distance to the due point, in `unit`.
    pub offset: i64,
    /// What `offset` counts.
    pub unit: OffsetUnit,
    /// Whether the action requires attention now.
    pub due_now: bool,
}

impl DueEstimate {
    fn new(offset: i64, unit: OffsetUnit, due_now: bool) -> Self {
        Self {
            offset,
            unit,
            due_now,
        }
    }

    /// Immediately due, the fallback when no usage snapshot exists yet.
    fn due_now(unit: OffsetUnit) -> Self {
        Self::new(0, unit, true)
    }
}

/// Outcome of a due computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DueStatus {
    /// A concrete projection.
    Known(DueEstimate),
    /// No projection possible yet: estimating events from minutes needs at
    /// least one completed usage event to average over.
    Unestimable,
}

/// Recomputed schedule state, persisted onto the action record by the caller.
///
/// `due` is `None` when no due computation is defined for the schedule (a
/// one-time schedule whose anchor has not been recorded yet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Due projection, when one is defined.
    pub due: Option<DueStatus>,
    /// Human-readable schedule description, with an optional due-status line
    /// on one-time schedules.
    pub text: String,
}

/// Compute the current schedule state of an action.
///
/// Evaluates against the current wall clock; see
/// [`compute_schedule_state_at`] for the deterministic variant.
#[must_use]
pub fn compute_schedule_state(
    action: &ActionSnapshot,
    category: Category,
    usage: Option<&UsageStats>,
) -> ScheduleState {
    compute_schedule_state_at(action, category, usage, Utc::now())
}

/// Compute the schedule state of an action at a given evaluation instant.
///
/// Referentially transparent: used by tests and by callers replaying
/// history at a recorded point in time.
#[must_use]
pub fn compute_schedule_state_at(
    action: &ActionSnapshot,
    category: Category,
    usage: Option<&UsageStats>,
    now: DateTime<Utc>,
) -> ScheduleState {
    trace!(
        ?category,
        schedule = ?action.schedule,
        history_len = action.history.len(),
        "computing schedule state"
    );
    match action.schedule {
        Schedule::Repeating { every, unit } => ScheduleState {
            due: Some(repeating_due(
                every,
                unit,
                action.last_performed(),
                usage,
                now,
            )),
            text: repeating_phrase(every, unit, category),
        },
        Schedule::Once {
            offset,
            unit,
            anchor,
        } => once_state(
            offset,
            unit,
            anchor,
            action.has_been_performed(),
            category,
            usage,
            now,
        ),
    }
}

// ---------------------------------------------------------------------------
// Repeating schedules
// ---------------------------------------------------------------------------

/// Due projection for a repeating schedule.
///
/// Measured from the most recent performance. With no usage snapshot or no
/// history the action is treated as immediately due.
fn repeating_due(
    every: u32,
    unit: RepeatUnit,
    last: Option<&HistoryEntry>,
    usage: Option<&UsageStats>,
    now: DateTime<Utc>,
) -> DueStatus {
    let fallback_unit = match unit {
        RepeatUnit::Events | RepeatUnit::UsageMinutes => OffsetUnit::Events,
        RepeatUnit::Days | RepeatUnit::Weeks | RepeatUnit::Months => OffsetUnit::Days,
    };
    let Some(usage) = usage else {
        return DueStatus::Known(DueEstimate::due_now(fallback_unit));
    };
    let Some(last) = last else {
        return DueStatus::Known(DueEstimate::due_now(fallback_unit));
    };

    match unit {
        RepeatUnit::Events => {
            let every = i64::from(every);
            let total = i64::from(usage.total_events);
            let at_last = i64::from(last.events_at_performance);
            let since = total - at_last;
            if since >= every {
                DueStatus::Known(DueEstimate::new(every - since, OffsetUnit::Events, true))
            } else {
                let offset = at_last + every - 1 - total;
                DueStatus::Known(DueEstimate::new(offset, OffsetUnit::Events, offset == 0))
            }
        }
        RepeatUnit::UsageMinutes => {
            let Some(average) = usage.average_event_minutes() else {
                return DueStatus::Unestimable;
            };
            let since = usage.total_minutes() - last.running_secs_at_performance / 60.0;
            let every = f64::from(every);
            if since >= every {
                let overdue = events_from_minutes(since - every, average);
                DueStatus::Known(DueEstimate::new(-overdue, OffsetUnit::Events, true))
            } else {
                let remaining = events_from_minutes(every - since, average);
                DueStatus::Known(DueEstimate::new(remaining, OffsetUnit::Events, false))
            }
        }
        RepeatUnit::Days | RepeatUnit::Weeks | RepeatUnit::Months => {
            let span = unit.day_span().unwrap_or(1);
            let target = last.performed_at + Duration::days(i64::from(every) * span);
            let offset = whole_days_between(now, target);
            DueStatus::Known(DueEstimate::new(offset, OffsetUnit::Days, offset <= 0))
        }
    }
}

// ---------------------------------------------------------------------------
// One-time schedules
// ---------------------------------------------------------------------------

/// Schedule state for a one-time schedule.
///
/// Any past performance permanently satisfies the action. Otherwise the due
/// projection is measured from the anchor; an unrecorded (or mismatched)
/// anchor degrades to descriptive text with no due line.
fn once_state(
    offset: u32,
    unit: OnceUnit,
    anchor: Anchor,
    performed: bool,
    category: Category,
    usage: Option<&UsageStats>,
    now: DateTime<Utc>,
) -> ScheduleState {
    let phrase = once_phrase(offset, unit, anchor, category);

    if performed {
        let unit_kind = match unit {
            OnceUnit::Events | OnceUnit::UsageMinutes => OffsetUnit::Events,
            OnceUnit::Today | OnceUnit::Days | OnceUnit::Weeks | OnceUnit::Months => {
                OffsetUnit::Days
            }
        };
        return ScheduleState {
            due: Some(DueStatus::Known(DueEstimate::new(0, unit_kind, false))),
            text: format!("{phrase}\nHas already been performed"),
        };
    }

    match unit {
        OnceUnit::Today => with_estimate(phrase, DueEstimate::due_now(OffsetUnit::Days)),
        OnceUnit::Events => match anchor {
            Anchor::Events { count } => {
                let Some(usage) = usage else {
                    return with_estimate(phrase, DueEstimate::due_now(OffsetUnit::Events));
                };
                let remaining =
                    i64::from(count) + i64::from(offset) - 1 - i64::from(usage.total_events);
                with_estimate(
                    phrase,
                    DueEstimate::new(remaining, OffsetUnit::Events, remaining <= 0),
                )
            }
            _ => text_only(phrase),
        },
        OnceUnit::UsageMinutes => match anchor {
            Anchor::RunningMinutes { minutes } => {
                let Some(usage) = usage else {
                    return with_estimate(phrase, DueEstimate::due_now(OffsetUnit::Events));
                };
                let Some(average) = usage.average_event_minutes() else {
                    return ScheduleState {
                        due: Some(DueStatus::Unestimable),
                        text: format!("{phrase}\nDue in several events"),
                    };
                };
                let remaining_minutes = minutes + f64::from(offset) - usage.total_minutes();
                let remaining = events_from_minutes(remaining_minutes, average);
                with_estimate(
                    phrase,
                    DueEstimate::new(remaining, OffsetUnit::Events, remaining <= 0),
                )
            }
            _ => text_only(phrase),
        },
        OnceUnit::Days | OnceUnit::Weeks | OnceUnit::Months => match anchor {
            Anchor::Date { at } => {
                let span = unit.day_span().unwrap_or(1);
                let target = at + Duration::days(i64::from(offset) * span);
                let remaining = whole_days_between(now, target);
                with_estimate(
                    phrase,
                    DueEstimate::new(remaining, OffsetUnit::Days, remaining <= 0),
                )
            }
            _ => text_only(phrase),
        },
    }
}

fn with_estimate(phrase: String, estimate: DueEstimate) -> ScheduleState {
    ScheduleState {
        due: Some(DueStatus::Known(estimate)),
        text: format!("{phrase}\n{}", due_line(&estimate)),
    }
}

fn text_only(phrase: String) -> ScheduleState {
    ScheduleState {
        due: None,
        text: phrase,
    }
}

// ---------------------------------------------------------------------------
// Text composition
// ---------------------------------------------------------------------------

/// `"Perform {before|after} every {N} {unit}"`.
fn repeating_phrase(every: u32, unit: RepeatUnit, category: Category) -> String {
    let direction = match category {
        Category::PreUse => "before",
        Category::PostUse | Category::Maintenance | Category::OneTimeMaintenance => "after",
    };
    format!(
        "Perform {direction} every {}",
        count_phrase(i64::from(every), unit.noun())
    )
}

/// `"Perform once {N} {unit} after install"` and its variants.
fn once_phrase(offset: u32, unit: OnceUnit, anchor: Anchor, category: Category) -> String {
    match unit {
        OnceUnit::Today => {
            if category == Category::OneTimeMaintenance {
                "Perform once immediately".to_owned()
            } else {
                "Perform once immediately at install".to_owned()
            }
        }
        OnceUnit::UsageMinutes => {
            if matches!(anchor, Anchor::RunningMinutes { .. }) {
                format!(
                    "Perform once {} after model time at install",
                    count_phrase(i64::from(offset), unit.noun())
                )
            } else {
                "Perform once after total model time at install".to_owned()
            }
        }
        OnceUnit::Events | OnceUnit::Days | OnceUnit::Weeks | OnceUnit::Months => {
            format!(
                "Perform once {} after install",
                count_phrase(i64::from(offset), unit.noun())
            )
        }
    }
}

/// Due-status line appended to one-time schedule descriptions.
fn due_line(estimate: &DueEstimate) -> String {
    let noun = estimate.unit.noun();
    if estimate.offset == 0 {
        "Due today".to_owned()
    } else if estimate.offset < 0 {
        format!("Overdue by {}", count_phrase(-estimate.offset, noun))
    } else {
        format!("Due in {}", count_phrase(estimate.offset, noun))
    }
}

/// `"3 events"`, `"1 week"` — singular iff the displayed count is ±1.
fn count_phrase(count: i64, noun: &str) -> String {
    if count.abs() == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Estimated usage events spanned by `minutes`, rounded to nearest.
///
/// `average_minutes` is positive (guaranteed by
/// [`UsageStats::average_event_minutes`]).
fn events_from_minutes(minutes: f64, average_minutes: f64) -> i64 {
    (minutes / average_minutes).round() as i64
}

/// Signed whole days from `now` to `target`, rounded to nearest.
fn whole_days_between(now: DateTime<Utc>, target: DateTime<Utc>) -> i64 {
    let secs = (target - now).num_seconds();
    (secs as f64 / 86_400.0).round() as i64
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn entry(day: u32, running_secs: f64, events: u32) -> HistoryEntry {
        HistoryEntry {
            id: format!("h{day}"),
            performed_at: at(day, 12),
            running_secs_at_performance: running_secs,
            events_at_performance: events,
        }
    }

    fn repeating(every: u32, unit: RepeatUnit, history: Vec<HistoryEntry>) -> ActionSnapshot {
        ActionSnapshot::new(Schedule::Repeating { every, unit }, history)
    }

    fn known(state: &ScheduleState) -> DueEstimate {
        match state.due {
            Some(DueStatus::Known(estimate)) => estimate,
            other => panic!("expected known estimate, got {other:?}"),
        }
    }

    #[test]
    fn count_phrase_singular_only_at_one() {
        assert_eq!(count_phrase(1, "week"), "1 week");
        assert_eq!(count_phrase(-1, "event"), "-1 event");
        assert_eq!(count_phrase(0, "day"), "0 days");
        assert_eq!(count_phrase(2, "month"), "2 months");
    }

    #[test]
    fn repeating_without_usage_snapshot_is_due_now() {
        let action = repeating(3, RepeatUnit::Events, vec![entry(1, 600.0, 7)]);
        let state = compute_schedule_state_at(&action, Category::PreUse, None, at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, 0);
        assert_eq!(estimate.unit, OffsetUnit::Events);
        assert!(estimate.due_now);
    }

    #[test]
    fn repeating_events_boundary_offset_zero_is_due() {
        // Last at event 7, every 3: event 9 is the third use since.
        let action = repeating(3, RepeatUnit::Events, vec![entry(1, 600.0, 7)]);
        let usage = UsageStats::new(9, 5400.0);
        let state =
            compute_schedule_state_at(&action, Category::PreUse, Some(&usage), at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, 0);
        assert!(estimate.due_now);
    }

    #[test]
    fn repeating_minutes_overdue_converts_to_events() {
        // Average 10 min/event; 21 minutes past the interval rounds to 2.
        let action = repeating(30, RepeatUnit::UsageMinutes, vec![entry(1, 540.0, 2)]);
        let usage = UsageStats::new(6, 60.0 * (9.0 + 30.0 + 21.0));
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.unit, OffsetUnit::Events);
        assert_eq!(estimate.offset, -2);
        assert!(estimate.due_now);
    }

    #[test]
    fn repeating_minutes_remaining_converts_to_events() {
        // 19 minutes remaining at 10 min/event rounds to 2 events.
        let action = repeating(30, RepeatUnit::UsageMinutes, vec![entry(1, 540.0, 2)]);
        let usage = UsageStats::new(2, 60.0 * 20.0);
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, 2);
        assert!(!estimate.due_now);
    }

    #[test]
    fn repeating_months_span_thirty_days() {
        let action = repeating(1, RepeatUnit::Months, vec![entry(1, 0.0, 0)]);
        let usage = UsageStats::new(0, 0.0);
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(11, 12));
        let estimate = known(&state);
        assert_eq!(estimate.unit, OffsetUnit::Days);
        assert_eq!(estimate.offset, 20);
        assert!(!estimate.due_now);
    }

    #[test]
    fn repeating_phrase_direction_follows_category() {
        let action = repeating(3, RepeatUnit::Events, vec![]);
        let usage = UsageStats::new(0, 0.0);
        let before =
            compute_schedule_state_at(&action, Category::PreUse, Some(&usage), at(10, 12));
        assert_eq!(before.text, "Perform before every 3 events");
        let after =
            compute_schedule_state_at(&action, Category::PostUse, Some(&usage), at(10, 12));
        assert_eq!(after.text, "Perform after every 3 events");
    }

    #[test]
    fn once_minutes_slightly_past_target_rounds_to_due_today() {
        // 4 minutes past the target at 10 min/event rounds to 0 events.
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 30,
                unit: OnceUnit::UsageMinutes,
                anchor: Anchor::RunningMinutes { minutes: 10.0 },
            },
            vec![],
        );
        let usage = UsageStats::new(4, 60.0 * 44.0);
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, 0);
        assert!(estimate.due_now);
        assert!(state.text.ends_with("Due today"));
    }

    #[test]
    fn once_events_without_usage_snapshot_is_due_now() {
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 5,
                unit: OnceUnit::Events,
                anchor: Anchor::Events { count: 12 },
            },
            vec![],
        );
        let state = compute_schedule_state_at(&action, Category::Maintenance, None, at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, 0);
        assert!(estimate.due_now);
    }

    #[test]
    fn once_mismatched_anchor_degrades_to_text_only() {
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 2,
                unit: OnceUnit::Events,
                anchor: Anchor::Date { at: at(1, 0) },
            },
            vec![],
        );
        let usage = UsageStats::new(9, 5400.0);
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(10, 12));
        assert!(state.due.is_none());
        assert_eq!(state.text, "Perform once 2 events after install");
    }

    #[test]
    fn once_unanchored_minutes_falls_back_to_total_time_phrase() {
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 10,
                unit: OnceUnit::UsageMinutes,
                anchor: Anchor::Unanchored,
            },
            vec![],
        );
        let usage = UsageStats::new(9, 5400.0);
        let state =
            compute_schedule_state_at(&action, Category::Maintenance, Some(&usage), at(10, 12));
        assert!(state.due.is_none());
        assert_eq!(state.text, "Perform once after total model time at install");
    }

    #[test]
    fn once_today_phrase_varies_by_category() {
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 0,
                unit: OnceUnit::Today,
                anchor: Anchor::Unanchored,
            },
            vec![],
        );
        let one_time =
            compute_schedule_state_at(&action, Category::OneTimeMaintenance, None, at(10, 12));
        assert!(one_time.text.starts_with("Perform once immediately\n"));
        let pre_use = compute_schedule_state_at(&action, Category::PreUse, None, at(10, 12));
        assert!(
            pre_use
                .text
                .starts_with("Perform once immediately at install\n")
        );
    }

    #[test]
    fn once_date_overdue_line_counts_days() {
        let action = ActionSnapshot::new(
            Schedule::Once {
                offset: 1,
                unit: OnceUnit::Weeks,
                anchor: Anchor::Date { at: at(1, 12) },
            },
            vec![],
        );
        let state = compute_schedule_state_at(&action, Category::Maintenance, None, at(10, 12));
        let estimate = known(&state);
        assert_eq!(estimate.offset, -2);
        assert!(estimate.due_now);
        assert!(state.text.ends_with("Overdue by 2 days"));
    }

    #[test]
    fn due_line_uses_singular_for_one_unit() {
        let overdue = DueEstimate::new(-1, OffsetUnit::Events, true);
        assert_eq!(due_line(&overdue), "Overdue by 1 event");
        let ahead = DueEstimate::new(1, OffsetUnit::Days, false);
        assert_eq!(due_line(&ahead), "Due in 1 day");
    }

    #[test]
    fn due_status_serde_round_trip() {
        let status = DueStatus::Known(DueEstimate::new(-3, OffsetUnit::Days, true));
        let json = serde_json::to_string(&status).unwrap();
        let restored: DueStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, status);

        let sentinel = DueStatus::Unestimable;
        let json = serde_json::to_string(&sentinel).unwrap();
        assert_eq!(json, "{\"status\":\"unestimable\"}");
        let restored: DueStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sentinel);
    }
}
