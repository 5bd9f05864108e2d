//! Collapse painted cells into persisted timespans, and back.
//!
//! Runs are closed on a gap or a location change, and any run that would
//! cross a UTC midnight is split there, so stored timespans never span two
//! UTC calendar days.
//!
//! Stored spans the mounted grid cannot show are carried through a submit
//! untouched instead of being dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::models::cell::{cell_duration, minute_key, LocationId, Selection, TimeCell};
use crate::models::timespan::{Availabilities, Timespan};
use crate::services::grid::TimeGrid;
use crate::utils::date::{local_date, next_utc_midnight, start_of_utc_day};

/// Collapse sorted cells into minimal contiguous timespans.
pub fn collapse(cells: &[TimeCell]) -> Vec<Timespan> {
    let mut spans = Vec::new();
    let mut iter = cells.iter();
    let Some(first) = iter.next() else {
        return spans;
    };

    let mut run_start = first.date;
    let mut run_end = first.end();
    let mut location = first.location;

    for cell in iter {
        if minute_key(cell.date) == minute_key(run_end) && cell.location == location {
            run_end = cell.end();
            continue;
        }
        push_split(&mut spans, run_start, run_end, location);
        run_start = cell.date;
        run_end = cell.end();
        location = cell.location;
    }
    push_split(&mut spans, run_start, run_end, location);

    spans
}

/// Split a span at every UTC midnight it crosses.
pub fn split_at_utc_midnight(span: &Timespan) -> Vec<Timespan> {
    let mut spans = Vec::new();
    push_split(&mut spans, span.start, span.end, span.location);
    spans
}

fn push_split(
    spans: &mut Vec<Timespan>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: Option<LocationId>,
) {
    let mut cursor = start;
    while cursor < end {
        let boundary = next_utc_midnight(cursor).min(end);
        spans.push(Timespan {
            start: cursor,
            end: boundary,
            location,
        });
        cursor = boundary;
    }
}

/// Re-expand timespans into hourly cells with boundary flags.
///
/// Adjoining spans with the same location are joined first, so the two
/// halves of a midnight split expand as one run.
pub fn expand(timespans: &[Timespan]) -> Selection {
    let mut sorted = timespans.to_vec();
    sorted.sort_by_key(|span| span.start);

    let mut joined: Vec<Timespan> = Vec::with_capacity(sorted.len());
    for span in sorted {
        match joined.last_mut() {
            Some(last) if last.end == span.start && last.location == span.location => {
                last.end = span.end;
            }
            _ => joined.push(span),
        }
    }

    Selection::from_cells(joined.iter().flat_map(hourly_cells)).retagged()
}

fn hourly_cells(span: &Timespan) -> Vec<TimeCell> {
    let mut cells = Vec::new();
    let mut cursor = span.start;
    while cursor < span.end {
        cells.push(TimeCell::new(cursor, span.location));
        cursor += cell_duration();
    }
    cells
}

fn is_whole_cells(span: &Timespan) -> bool {
    let step = cell_duration().num_seconds();
    span.duration().num_seconds() % step == 0
}

/// Seed an editing surface from persisted availability.
pub fn seed_selection(availabilities: &Availabilities) -> Selection {
    let spans: Vec<Timespan> = availabilities.timespans().copied().collect();
    expand(&spans)
}

/// Persisted availability split into what a grid can edit and what it
/// must hand back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSeed {
    pub selection: Selection,
    /// Spans on the grid's dates that fall outside its rows, or that are
    /// not a whole number of cells long, keyed by their stored date.
    pub preserved: Availabilities,
}

/// Seed a date-specific grid from persisted availability.
///
/// Only dates the grid covers are considered. Cells that land on the grid
/// become the selection; everything else on those dates is kept aside so
/// the next submit can return it.
pub fn seed_for_grid(availabilities: &Availabilities, grid: &TimeGrid) -> GridSeed {
    let mut on_grid = Vec::new();
    let mut preserved = Availabilities::new();

    for (date, spans) in availabilities.iter() {
        if !grid.covered_dates().contains(&date) {
            continue;
        }

        let mut kept = Vec::new();
        let mut off_grid = Vec::new();
        for span in spans {
            if !is_whole_cells(span) {
                kept.push(*span);
                continue;
            }
            for cell in hourly_cells(span) {
                if grid.contains(cell.date) {
                    on_grid.push(cell);
                } else {
                    off_grid.push(cell);
                }
            }
        }

        off_grid.sort_by_key(|cell| cell.date);
        kept.extend(collapse(&off_grid));
        if !kept.is_empty() {
            log::warn!(
                "Keeping {} stored span(s) on {} that the grid cannot show",
                kept.len(),
                date
            );
            kept.sort_by_key(|span| span.start);
            preserved.insert(date, kept);
        }
    }

    GridSeed {
        selection: Selection::from_cells(on_grid).retagged(),
        preserved,
    }
}

/// Build the date-specific submission payload for the edited `dates`.
///
/// Cells are grouped by the local calendar date of their start in `tz` and
/// collapsed per date. A date that had availability in `previous` but has
/// no cells now is emitted as an empty list, the signal to clear it. Dates
/// with neither are left out.
pub fn build_availabilities<Tz: TimeZone>(
    selection: &Selection,
    tz: &Tz,
    dates: &[NaiveDate],
    previous: &Availabilities,
) -> Availabilities {
    let mut by_date: BTreeMap<NaiveDate, Vec<TimeCell>> = BTreeMap::new();
    for cell in selection {
        let date = local_date(cell.date, tz);
        if dates.contains(&date) {
            by_date.entry(date).or_default().push(*cell);
        }
    }

    let mut payload: Availabilities = by_date
        .into_iter()
        .map(|(date, cells)| (date, collapse(&cells)))
        .collect();

    for date in dates {
        if previous.contains_date(*date) && !payload.contains_date(*date) {
            payload.insert(*date, Vec::new());
        }
    }

    log::debug!(
        "Built availability payload for {} of {} edited dates",
        payload.len(),
        dates.len()
    );
    payload
}

/// Like [`build_availabilities`], with `preserved` spans merged back into
/// their dates. A date that still holds preserved spans is never cleared.
pub fn build_availabilities_preserving<Tz: TimeZone>(
    selection: &Selection,
    tz: &Tz,
    dates: &[NaiveDate],
    previous: &Availabilities,
    preserved: &Availabilities,
) -> Availabilities {
    let mut payload = build_availabilities(selection, tz, dates, previous);

    for (date, kept) in preserved.iter() {
        if !dates.contains(&date) {
            continue;
        }
        let mut combined = payload.get(date).unwrap_or_default().to_vec();
        combined.extend_from_slice(kept);
        combined.sort_by_key(|span| span.start);
        payload.insert(date, join_adjoining(combined));
    }

    payload
}

/// Join sorted spans that touch and share a location, never across a UTC
/// midnight.
fn join_adjoining(spans: Vec<Timespan>) -> Vec<Timespan> {
    let mut joined: Vec<Timespan> = Vec::with_capacity(spans.len());
    for span in spans {
        match joined.last_mut() {
            Some(last)
                if last.end == span.start
                    && last.location == span.location
                    && start_of_utc_day(last.end) != last.end =>
            {
                last.end = span.end;
            }
            _ => joined.push(span),
        }
    }
    joined
}
