// Test fixtures - reusable test data
// Provides consistent grids, instants and availability across test files

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use tutor_availability::models::cell::LocationId;
use tutor_availability::models::timespan::{Availabilities, Timespan};
use tutor_availability::services::grid::{GridBounds, TimeGrid};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Monday, March 4th 2024
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    /// Tuesday, March 5th 2024
    pub fn tuesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    /// UTC instant on `date` at `hour`
    pub fn utc_at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
    }
}

/// Sample grids for testing
pub mod grids {
    use super::*;

    /// One UTC day, 06:00 to 22:00
    pub fn utc_day(date: NaiveDate) -> TimeGrid {
        TimeGrid::new(date, GridBounds::new(1, 6, 22).unwrap(), chrono_tz::UTC)
    }

    /// A full week in `tz`, midnight to midnight
    pub fn full_week(start: NaiveDate, tz: Tz) -> TimeGrid {
        TimeGrid::new(start, GridBounds::new(7, 0, 24).unwrap(), tz)
    }
}

/// Sample availability for testing
pub mod availability {
    use super::*;

    pub fn span(start: DateTime<Utc>, end: DateTime<Utc>, location: Option<LocationId>) -> Timespan {
        Timespan::new(start, end, location).unwrap()
    }

    /// Monday 09:00-12:00 UTC at location 42
    pub fn monday_morning() -> Availabilities {
        let monday = dates::monday();
        let mut availabilities = Availabilities::new();
        availabilities.insert(
            monday,
            vec![span(dates::utc_at(monday, 9), dates::utc_at(monday, 12), Some(42))],
        );
        availabilities
    }
}
