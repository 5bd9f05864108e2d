//! Localization of stored UTC availability into the viewer's timezone.
//!
//! Date-specific timespans convert instant-for-instant, so a
//! localize/delocalize round trip is exact. Weekday-keyed recurring
//! templates live in a fixed reference week; after a timezone shift a
//! Saturday or Sunday interval can land just outside that week. Those are
//! moved by exactly one week so they render inside the displayed week, and
//! they stay under the weekday key they were stored with.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};
use crate::models::recurring::{DayOfWeek, RecurringTimespan, RecurringWeek, WeeklyTemplate};
use crate::models::timespan::{Availabilities, LocalTimespan, Timespan};

pub fn parse_timezone(name: &str) -> Result<Tz> {
    Tz::from_str(name.trim()).map_err(|_| AvailabilityError::UnknownTimezone(name.to_string()))
}

pub fn localize(span: &Timespan, tz: &Tz) -> LocalTimespan {
    LocalTimespan {
        start: span.start.with_timezone(tz),
        end: span.end.with_timezone(tz),
        location: span.location,
    }
}

pub fn delocalize(span: &LocalTimespan) -> Timespan {
    Timespan {
        start: span.start.with_timezone(&Utc),
        end: span.end.with_timezone(&Utc),
        location: span.location,
    }
}

/// Localize stored availability for display, regrouped by the viewer's
/// local date of each start. Explicitly empty dates stay explicitly empty.
pub fn localize_availabilities(
    availabilities: &Availabilities,
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<LocalTimespan>> {
    let mut localized: BTreeMap<NaiveDate, Vec<LocalTimespan>> = BTreeMap::new();
    for (date, spans) in availabilities.iter() {
        if spans.is_empty() {
            localized.entry(date).or_default();
        }
        for span in spans {
            let local = localize(span, tz);
            localized.entry(local.start.date_naive()).or_default().push(local);
        }
    }
    for spans in localized.values_mut() {
        spans.sort_by_key(|span| span.start);
    }
    localized
}

/// Whole weeks to move `start` by so it falls in `[week_start, week_start + 7d)`.
///
/// Only a single week of drift is expected (timezone offsets are under a
/// day), so this is 1, -1 or 0.
pub fn rollover_weeks(start: DateTime<Utc>, week_start: DateTime<Utc>) -> i64 {
    if start < week_start {
        1
    } else if start >= week_start + Duration::weeks(1) {
        -1
    } else {
        0
    }
}

/// Localize a recurring template into the reference week as seen from `tz`.
pub fn localize_recurring(
    template: &WeeklyTemplate,
    tz: &Tz,
    week: &RecurringWeek,
) -> BTreeMap<DayOfWeek, Vec<LocalTimespan>> {
    let local_week_start = week.local_start(tz);
    template
        .iter()
        .map(|(day, spans)| {
            let localized = spans
                .iter()
                .map(|span| {
                    let rolled = roll_into_week(&span.with_location(None), local_week_start);
                    localize(&rolled, tz)
                })
                .collect();
            (*day, localized)
        })
        .collect()
}

/// Inverse of [`localize_recurring`]: back to UTC inside the reference week.
pub fn delocalize_recurring(
    localized: &BTreeMap<DayOfWeek, Vec<LocalTimespan>>,
    week: &RecurringWeek,
) -> WeeklyTemplate {
    let utc_week_start = week.utc_start();
    localized
        .iter()
        .map(|(day, spans)| {
            let stored = spans
                .iter()
                .map(|span| RecurringTimespan::from(roll_into_week(&delocalize(span), utc_week_start)))
                .collect();
            (*day, stored)
        })
        .collect()
}

/// Move a span by whole weeks so its start lies in the week beginning at `week_start`.
pub fn roll_into_week(span: &Timespan, week_start: DateTime<Utc>) -> Timespan {
    match rollover_weeks(span.start, week_start) {
        0 => *span,
        weeks => {
            log::debug!(
                "Rolling recurring span starting {} by {} week(s)",
                span.start,
                weeks
            );
            span.shifted(Duration::weeks(weeks))
        }
    }
}
