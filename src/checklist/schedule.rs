//! Schedule definitions for checklist and maintenance actions.
//!
//! Defines the [`Schedule`] enum (repeating vs one-time), the unit enums for
//! each kind, the [`Anchor`] reference point of one-time schedules, and the
//! decoder for the legacy optional-field stored representation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HangarError, Result};

/// Measurement unit of a repeating schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatUnit {
    /// Logged usage events (flights, runs).
    Events,
    /// Accumulated model running time, in minutes.
    UsageMinutes,
    /// Elapsed calendar days.
    Days,
    /// Elapsed calendar weeks.
    Weeks,
    /// Elapsed calendar months (30 days).
    Months,
}

impl RepeatUnit {
    /// Singular noun for phrasing ("event", "minute", "day", …).
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Events => "event",
            Self::UsageMinutes => "minute",
            Self::Days => "day",
            Self::Weeks => "week",
            Self::Months => "month",
        }
    }

    /// Number of days one unit spans, for the calendar units.
    #[must_use]
    pub fn day_span(self) -> Option<i64> {
        match self {
            Self::Days => Some(1),
            Self::Weeks => Some(7),
            Self::Months => Some(30),
            Self::Events | Self::UsageMinutes => None,
        }
    }
}

/// Measurement unit of a one-time schedule.
///
/// `Today` exists only here: a repeating schedule cannot recur "today", and
/// the type split enforces that instead of a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnceUnit {
    /// Due immediately at install; offset and anchor are ignored.
    Today,
    /// Logged usage events past the anchor.
    Events,
    /// Model running minutes past the anchor.
    UsageMinutes,
    /// Calendar days past the anchor.
    Days,
    /// Calendar weeks past the anchor.
    Weeks,
    /// Calendar months (30 days) past the anchor.
    Months,
}

impl OnceUnit {
    /// Singular noun for phrasing.
    #[must_use]
    pub fn noun(self) -> &'static str {
        match self {
            Self::Today | Self::Days => "day",
            Self::Events => "event",
            Self::UsageMinutes => "minute",
            Self::Weeks => "week",
            Self::Months => "month",
        }
    }

    /// Number of days one unit spans, for the calendar units.
    #[must_use]
    pub fn day_span(self) -> Option<i64> {
        match self {
            Self::Days => Some(1),
            Self::Weeks => Some(7),
            Self::Months => Some(30),
            Self::Today | Self::Events | Self::UsageMinutes => None,
        }
    }
}

/// Reference point a one-time schedule's offset is measured from.
///
/// An action installed before the model logged any usage has no reference
/// point yet; that state is the explicit [`Anchor::Unanchored`] variant
/// rather than an absent field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Anchor {
    /// No reference point recorded yet.
    Unanchored,
    /// Install date, for the calendar units.
    Date {
        /// When the action was installed.
        at: DateTime<Utc>,
    },
    /// Usage-event count at install, for [`OnceUnit::Events`].
    Events {
        /// The model's event count at install.
        count: u32,
    },
    /// Model running time at install, for [`OnceUnit::UsageMinutes`].
    RunningMinutes {
        /// The model's running time at install, in minutes.
        minutes: f64,
    },
}

/// When an action recurs or is due once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Recurs every `every` units, measured from the most recent performance.
    Repeating {
        /// Recurrence interval.
        every: u32,
        /// What the interval counts.
        unit: RepeatUnit,
    },
    /// Due a single time, `offset` units past the anchor.
    Once {
        /// Offset from the anchor.
        offset: u32,
        /// What the offset counts.
        unit: OnceUnit,
        /// Reference point the offset is measured from.
        anchor: Anchor,
    },
}

impl Schedule {
    /// Decode the legacy stored representation.
    ///
    /// Older action records store kind and unit as strings, the interval as a
    /// bare magnitude, and the anchor as an optional string interpreted per
    /// unit (a date, an event count, or a minute value). Unknown kinds or
    /// units and malformed anchor strings are data corruption and are
    /// rejected here so the calculator never sees them.
    pub fn from_stored(
        kind: &str,
        unit: &str,
        magnitude: u32,
        baseline: Option<&str>,
    ) -> Result<Self> {
        match kind {
            "repeating" => {
                let unit = match unit {
                    "events" => RepeatUnit::Events,
                    "minutes" => RepeatUnit::UsageMinutes,
                    "days" => RepeatUnit::Days,
                    "weeks" => RepeatUnit::Weeks,
                    "months" => RepeatUnit::Months,
                    other => {
                        return Err(HangarError::Schedule(format!(
                            "unknown repeating unit: {other}"
                        )));
                    }
                };
                Ok(Self::Repeating {
                    every: magnitude,
                    unit,
                })
            }
            "non_repeating" => {
                let unit = match unit {
                    "today" => OnceUnit::Today,
                    "events" => OnceUnit::Events,
                    "minutes" => OnceUnit::UsageMinutes,
                    "days" => OnceUnit::Days,
                    "weeks" => OnceUnit::Weeks,
                    "months" => OnceUnit::Months,
                    other => {
                        return Err(HangarError::Schedule(format!(
                            "unknown one-time unit: {other}"
                        )));
                    }
                };
                let anchor = match baseline {
                    None => Anchor::Unanchored,
                    Some(raw) => parse_anchor(unit, raw)?,
                };
                Ok(Self::Once {
                    offset: magnitude,
                    unit,
                    anchor,
                })
            }
            other => Err(HangarError::Schedule(format!(
                "unknown schedule kind: {other}"
            ))),
        }
    }
}

/// Interpret a legacy baseline string according to the schedule unit.
fn parse_anchor(unit: OnceUnit, raw: &str) -> Result<Anchor> {
    let raw = raw.trim();
    match unit {
        OnceUnit::Today => Ok(Anchor::Unanchored),
        OnceUnit::Events => {
            let count = raw.parse::<u32>().map_err(|_| {
                HangarError::Schedule(format!("invalid event-count baseline: {raw:?}"))
            })?;
            Ok(Anchor::Events { count })
        }
        OnceUnit::UsageMinutes => {
            let minutes = raw.parse::<f64>().map_err(|_| {
                HangarError::Schedule(format!("invalid minute baseline: {raw:?}"))
            })?;
            if !minutes.is_finite() || minutes < 0.0 {
                return Err(HangarError::Schedule(format!(
                    "invalid minute baseline: {raw:?}"
                )));
            }
            Ok(Anchor::RunningMinutes { minutes })
        }
        OnceUnit::Days | OnceUnit::Weeks | OnceUnit::Months => {
            let at = parse_date(raw).ok_or_else(|| {
                HangarError::Schedule(format!("invalid date baseline: {raw:?}"))
            })?;
            Ok(Anchor::Date { at })
        }
    }
}

/// Parse a legacy date string: RFC 3339, or a bare `YYYY-MM-DD` taken as
/// midnight UTC.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(DateTime::from_naive_utc_and_offset(
        date.and_time(NaiveTime::MIN),
        Utc,
    ))
}
