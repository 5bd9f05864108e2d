//! Grid model for the availability editor.
//!
//! Builds the day-column × hour-row matrix of selectable cells. Each column
//! is one local calendar day starting at `start_date`; each row is one
//! wall-clock hour between `min_hour` and `max_hour` inclusive.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{AvailabilityError, Result};
use crate::models::cell::minute_key;
use crate::utils::date::{local_date, local_hour};

/// Validated grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    min_hour: u32,
    max_hour: u32,
    num_days: u32,
}

impl GridBounds {
    /// Malformed bounds are rejected rather than clamped.
    pub fn new(num_days: u32, min_hour: u32, max_hour: u32) -> Result<Self> {
        if min_hour > max_hour || max_hour > 24 {
            return Err(AvailabilityError::InvalidGridBounds { min_hour, max_hour });
        }
        if num_days == 0 {
            return Err(AvailabilityError::InvalidDayCount(num_days));
        }
        Ok(Self {
            min_hour,
            max_hour,
            num_days,
        })
    }

    pub fn min_hour(&self) -> u32 {
        self.min_hour
    }

    pub fn max_hour(&self) -> u32 {
        self.max_hour
    }

    pub fn num_days(&self) -> u32 {
        self.num_days
    }
}

/// Build the cell matrix: one ascending list of hour instants per day.
///
/// Wall-clock hours that do not exist on a given day (DST spring-forward)
/// are left out of that day's column.
pub fn build_grid<T: TimeZone>(
    start_date: NaiveDate,
    bounds: GridBounds,
    tz: &T,
) -> Vec<Vec<DateTime<Utc>>> {
    (0..bounds.num_days)
        .map(|offset| {
            let day = start_date + Duration::days(i64::from(offset));
            (bounds.min_hour..=bounds.max_hour)
                .filter_map(|hour| local_hour(tz, day, hour))
                .collect()
        })
        .collect()
}

/// A built grid together with the dates and timezone it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    dates: Vec<NaiveDate>,
    covered: Vec<NaiveDate>,
    columns: Vec<Vec<DateTime<Utc>>>,
    bounds: GridBounds,
    tz: Tz,
}

impl TimeGrid {
    pub fn new(start_date: NaiveDate, bounds: GridBounds, tz: Tz) -> Self {
        let dates: Vec<NaiveDate> = (0..bounds.num_days)
            .map(|offset| start_date + Duration::days(i64::from(offset)))
            .collect();
        let columns = build_grid(start_date, bounds, &tz);
        let mut covered: Vec<NaiveDate> = columns
            .iter()
            .flatten()
            .map(|cell| local_date(*cell, &tz))
            .chain(dates.iter().copied())
            .collect();
        covered.sort();
        covered.dedup();
        Self {
            dates,
            covered,
            columns,
            bounds,
            tz,
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Every local date some cell starts on. With `max_hour = 24` this
    /// includes the day after the last column.
    pub fn covered_dates(&self) -> &[NaiveDate] {
        &self.covered
    }

    pub fn columns(&self) -> &[Vec<DateTime<Utc>>] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&[DateTime<Utc>]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    /// `(column, row)` of the cell at `date`.
    pub fn position_of(&self, date: DateTime<Utc>) -> Option<(usize, usize)> {
        let key = minute_key(date);
        self.columns.iter().enumerate().find_map(|(col, cells)| {
            cells
                .binary_search_by_key(&key, |cell| minute_key(*cell))
                .ok()
                .map(|row| (col, row))
        })
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.position_of(date).is_some()
    }

    /// Every cell in column-major order.
    pub fn cells(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.columns.iter().flatten().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;
    use pretty_assertions::assert_eq;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    #[test]
    fn test_bounds_reject_inverted_hours() {
        assert_eq!(
            GridBounds::new(1, 10, 9),
            Err(AvailabilityError::InvalidGridBounds {
                min_hour: 10,
                max_hour: 9
            })
        );
        assert!(GridBounds::new(1, 0, 25).is_err());
    }

    #[test]
    fn test_bounds_reject_zero_days() {
        assert_eq!(
            GridBounds::new(0, 6, 22),
            Err(AvailabilityError::InvalidDayCount(0))
        );
    }

    #[test]
    fn test_build_grid_is_inclusive_of_both_bounds() {
        let bounds = GridBounds::new(2, 6, 22).unwrap();
        let grid = build_grid(monday(), bounds, &Utc);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid[0].len(), 17);
        assert_eq!(grid[0][0].hour(), 6);
        assert_eq!(grid[0][16].hour(), 22);
        assert_eq!(grid[1][0], Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap());
    }

    #[test]
    fn test_build_grid_full_day_ends_at_next_midnight() {
        let bounds = GridBounds::new(1, 0, 24).unwrap();
        let grid = build_grid(monday(), bounds, &Utc);
        assert_eq!(grid[0].len(), 25);
        assert_eq!(grid[0][24], Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_build_grid_uses_local_hours() {
        let bounds = GridBounds::new(1, 9, 9).unwrap();
        let grid = build_grid(monday(), bounds, &New_York);
        // 09:00 EST
        assert_eq!(grid[0], vec![Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap()]);
    }

    #[test]
    fn test_build_grid_skips_spring_forward_gap() {
        let bounds = GridBounds::new(1, 0, 5).unwrap();
        let grid = build_grid(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), bounds, &New_York);
        assert_eq!(grid[0].len(), 5);
        let ascending = grid[0].windows(2).all(|pair| pair[0] < pair[1]);
        assert!(ascending);
    }

    #[test]
    fn test_covered_dates_include_next_midnight() {
        let full = TimeGrid::new(monday(), GridBounds::new(1, 0, 24).unwrap(), chrono_tz::UTC);
        let tuesday = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(full.dates(), &[monday()][..]);
        assert_eq!(full.covered_dates(), &[monday(), tuesday][..]);

        let daytime = TimeGrid::new(monday(), GridBounds::new(1, 6, 22).unwrap(), chrono_tz::UTC);
        assert_eq!(daytime.covered_dates(), &[monday()][..]);
    }

    #[test]
    fn test_position_of() {
        let grid = TimeGrid::new(monday(), GridBounds::new(3, 6, 22).unwrap(), chrono_tz::UTC);
        let target = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();
        assert_eq!(grid.position_of(target), Some((1, 3)));
        assert!(!grid.contains(Utc.with_ymd_and_hms(2024, 3, 5, 3, 0, 0).unwrap()));
        assert_eq!(grid.cells().count(), 3 * 17);
    }
}
