//! Monday-boundary arithmetic and week selection.

use chrono::{Datelike, Duration, NaiveDate};
use thiserror::Error;

/// The Monday of the week containing `today`. Idempotent: a Monday maps to
/// itself.
pub fn current_monday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_monday() as i64)
}

/// The Monday of the last completed week.
pub fn last_week_monday(today: NaiveDate) -> NaiveDate {
    current_monday(today) - Duration::days(7)
}

/// The Monday strictly after `today`. A Monday maps to the Monday seven days
/// later, never to itself: "next week" opens for choices even on Monday.
pub fn next_monday(today: NaiveDate) -> NaiveDate {
    today + Duration::days(7 - today.weekday().num_days_from_monday() as i64)
}

/// Unknown `?week=` mode value.
#[derive(Debug, Error)]
#[error("unknown week mode {0:?}, expected one of last, current, next, latest")]
pub struct WeekModeError(pub String);

/// Which week an export or choice view targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekSelector {
    /// An explicit `week_start` date given by the caller.
    Explicit(NaiveDate),
    /// The last completed week.
    Last,
    /// The week containing today.
    Current,
    /// The week starting at the next Monday.
    Next,
    /// The most recent week that has stored choices.
    Latest,
}

impl WeekSelector {
    /// Parse the query parameters. An explicit date wins outright over any
    /// mode string; an absent mode means [`WeekSelector::Latest`].
    pub fn parse(mode: Option<&str>, explicit: Option<NaiveDate>) -> Result<Self, WeekModeError> {
        if let Some(date) = explicit {
            return Ok(Self::Explicit(date));
        }
        match mode {
            None | Some("latest") => Ok(Self::Latest),
            Some("last") => Ok(Self::Last),
            Some("current") => Ok(Self::Current),
            Some("next") => Ok(Self::Next),
            Some(other) => Err(WeekModeError(other.to_owned())),
        }
    }

    /// Resolve to a concrete Monday. `latest_in_data` is the most recent
    /// distinct week start present in the stored choices; with no data at
    /// all, `Latest` falls back to the last completed week.
    pub fn resolve(self, today: NaiveDate, latest_in_data: Option<NaiveDate>) -> NaiveDate {
        match self {
            Self::Explicit(date) => date,
            Self::Last => last_week_monday(today),
            Self::Current => current_monday(today),
            Self::Next => next_monday(today),
            Self::Latest => latest_in_data.unwrap_or_else(|| last_week_monday(today)),
        }
    }
}
