//! Recurring availability reconciliation.
//!
//! Picks the weekly template that applies to a date (by trimester and
//! weekday), projects it onto the date's week, and builds recurring
//! payloads from a painted reference week. Date-specific availability always
//! wins over the template: the two are never merged cell by cell.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::models::cell::{LocationId, Selection};
use crate::models::recurring::{
    DayOfWeek, RecurringAvailability, RecurringTimespan, RecurringWeek, Trimester,
    WeekdayLocations, WeeklyTemplate,
};
use crate::models::timespan::{Availabilities, LocalTimespan, Timespan};
use crate::services::collapse::{collapse, expand};
use crate::services::timezone::{delocalize, localize_recurring, roll_into_week};
use crate::utils::date::local_date;

/// The template slice that applies to one weekday of one trimester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringDay {
    pub trimester: Trimester,
    pub day: DayOfWeek,
    pub timespans: Vec<RecurringTimespan>,
    /// Weekday default location, `None` for remote
    pub location: Option<LocationId>,
}

/// Template timespans and default location for `date`.
pub fn recurring_for_date(recurring: &RecurringAvailability, date: NaiveDate) -> RecurringDay {
    let trimester = Trimester::for_date(date);
    let day = DayOfWeek::of(date);
    RecurringDay {
        trimester,
        day,
        timespans: recurring.timespans_for(trimester, day).to_vec(),
        location: recurring.location_for(trimester, day),
    }
}

/// Where a day's availability came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySource {
    Explicit,
    Recurring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDay {
    pub date: NaiveDate,
    pub source: DaySource,
    pub timespans: Vec<Timespan>,
}

/// Resolve the availability in force on `date`.
///
/// Any explicit entry for the date, including an explicitly empty one, is
/// returned as-is. Otherwise the recurring template for the date's
/// trimester and weekday is projected onto the date's week in `tz`, with the
/// weekday's default location.
pub fn resolve_day(
    date: NaiveDate,
    availabilities: &Availabilities,
    recurring: &RecurringAvailability,
    week: &RecurringWeek,
    tz: &Tz,
) -> ResolvedDay {
    if let Some(explicit) = availabilities.get(date) {
        return ResolvedDay {
            date,
            source: DaySource::Explicit,
            timespans: explicit.to_vec(),
        };
    }

    let day = recurring_for_date(recurring, date);
    let template: WeeklyTemplate = [(day.day, day.timespans)].into_iter().collect();
    let weeks = week.weeks_until(date);
    let timespans = localize_recurring(&template, tz, week)
        .into_values()
        .flatten()
        .map(|local| {
            let mut span = delocalize(&project_weeks(&local, weeks, tz));
            span.location = day.location;
            span
        })
        .collect();

    ResolvedDay {
        date,
        source: DaySource::Recurring,
        timespans,
    }
}

/// Move a localized span by whole weeks of wall-clock time, so it keeps its
/// local hours across DST changes between the two weeks.
pub fn project_weeks(span: &LocalTimespan, weeks: i64, tz: &Tz) -> LocalTimespan {
    let shift = |instant: DateTime<Tz>| {
        let target = instant.naive_local() + Duration::weeks(weeks);
        match tz.from_local_datetime(&target) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, second) => first.min(second),
            LocalResult::None => instant + Duration::weeks(weeks),
        }
    };
    LocalTimespan {
        start: shift(span.start),
        end: shift(span.end),
        location: span.location,
    }
}

/// Seed a recurring editing surface for one trimester.
///
/// Template spans are localized into the reference week as seen from `tz`
/// and tagged with their weekday's default location.
pub fn seed_recurring_selection(
    recurring: &RecurringAvailability,
    trimester: Trimester,
    tz: &Tz,
    week: &RecurringWeek,
) -> Selection {
    let Some(template) = recurring.template(trimester) else {
        return Selection::new();
    };
    let spans: Vec<Timespan> = localize_recurring(template, tz, week)
        .into_iter()
        .flat_map(|(day, locals)| {
            let location = recurring.location_for(trimester, day);
            locals.into_iter().map(move |local| {
                let mut span = delocalize(&local);
                span.location = location;
                span
            })
        })
        .collect();
    expand(&spans)
}

/// A finished recurring submission for one trimester.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurringPayload {
    pub availability: WeeklyTemplate,
    pub locations: WeekdayLocations,
}

/// Collapse a painted reference week into per-weekday template spans.
///
/// Cells are bucketed by their local weekday in `tz`; each bucket is
/// collapsed and stored back inside the UTC reference week. A weekday's
/// location is taken from its first cell. Every weekday is present in the
/// result, so an empty list clears that weekday.
pub fn build_recurring(selection: &Selection, tz: &Tz, week: &RecurringWeek) -> RecurringPayload {
    let mut buckets: BTreeMap<DayOfWeek, Vec<_>> =
        DayOfWeek::ALL.iter().map(|day| (*day, Vec::new())).collect();
    for cell in selection {
        let day = DayOfWeek::of(local_date(cell.date, tz));
        buckets.entry(day).or_default().push(*cell);
    }

    let utc_week_start = week.utc_start();
    let mut payload = RecurringPayload::default();
    for (day, cells) in buckets {
        let spans: Vec<RecurringTimespan> = collapse(&cells)
            .iter()
            .map(|span| RecurringTimespan::from(roll_into_week(span, utc_week_start)))
            .collect();
        let location = cells.first().and_then(|cell| cell.location);
        payload.availability.insert(day, spans);
        payload.locations.insert(day, location);
    }
    payload
}

/// Apply a recurring payload to the stored availability for `trimester`.
pub fn apply_recurring(
    recurring: &mut RecurringAvailability,
    trimester: Trimester,
    payload: RecurringPayload,
) {
    recurring.set_template(trimester, payload.availability);
    for (day, location) in payload.locations {
        recurring.set_location(trimester, day, location);
    }
}

/// Earliest instant in the template, if any. Handy for scrolling a grid to
/// the first available hour.
pub fn first_available(template: &WeeklyTemplate) -> Option<DateTime<Utc>> {
    template.values().flatten().map(|span| span.start).min()
}
