// Recurring availability module
// Weekly availability templates scoped to trimesters

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::models::cell::LocationId;
use crate::models::timespan::Timespan;
use crate::utils::date::{local_hour, week_start_sunday};

/// Day-of-week key used by recurring templates. Weeks start on Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }

    pub fn days_from_sunday(self) -> u32 {
        Weekday::from(self).num_days_from_sunday()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Sunday => Weekday::Sun,
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed calendar thirds of the year that scope recurring templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trimester {
    /// January 1 – May 31
    Spring,
    /// June 1 – August 31
    Summer,
    /// September 1 – December 31
    Fall,
}

impl Trimester {
    pub fn for_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=5 => Trimester::Spring,
            6..=8 => Trimester::Summer,
            _ => Trimester::Fall,
        }
    }

    /// First and last day (inclusive) of this trimester in `year`.
    pub fn date_range(self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        let (first, last) = match self {
            Trimester::Spring => ((1, 1), (5, 31)),
            Trimester::Summer => ((6, 1), (8, 31)),
            Trimester::Fall => ((9, 1), (12, 31)),
        };
        Some((
            NaiveDate::from_ymd_opt(year, first.0, first.1)?,
            NaiveDate::from_ymd_opt(year, last.0, last.1)?,
        ))
    }
}

/// A template interval stored inside the reference week. Its location comes
/// from the weekday defaults, not from the interval itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTimespan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl RecurringTimespan {
    pub fn with_location(&self, location: Option<LocationId>) -> Timespan {
        Timespan {
            start: self.start,
            end: self.end,
            location,
        }
    }
}

impl From<Timespan> for RecurringTimespan {
    fn from(span: Timespan) -> Self {
        Self {
            start: span.start,
            end: span.end,
        }
    }
}

pub type WeeklyTemplate = BTreeMap<DayOfWeek, Vec<RecurringTimespan>>;
pub type WeekdayLocations = BTreeMap<DayOfWeek, Option<LocationId>>;

/// Weekly availability per trimester, plus per-weekday default locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringAvailability {
    #[serde(default)]
    pub availability: BTreeMap<Trimester, WeeklyTemplate>,
    #[serde(default)]
    pub locations: BTreeMap<Trimester, WeekdayLocations>,
}

impl RecurringAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn template(&self, trimester: Trimester) -> Option<&WeeklyTemplate> {
        self.availability.get(&trimester)
    }

    pub fn timespans_for(&self, trimester: Trimester, day: DayOfWeek) -> &[RecurringTimespan] {
        self.availability
            .get(&trimester)
            .and_then(|template| template.get(&day))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Default location for the weekday, `None` (remote) when unset.
    pub fn location_for(&self, trimester: Trimester, day: DayOfWeek) -> Option<LocationId> {
        self.locations
            .get(&trimester)
            .and_then(|locations| locations.get(&day))
            .copied()
            .flatten()
    }

    pub fn set_template(&mut self, trimester: Trimester, template: WeeklyTemplate) {
        self.availability.insert(trimester, template);
    }

    pub fn set_location(&mut self, trimester: Trimester, day: DayOfWeek, location: Option<LocationId>) {
        self.locations
            .entry(trimester)
            .or_default()
            .insert(day, location);
    }
}

/// The reference week recurring templates are anchored to.
///
/// The anchor is always the Sunday starting that week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NaiveDate", into = "NaiveDate")]
pub struct RecurringWeek {
    anchor: NaiveDate,
}

impl RecurringWeek {
    /// Anchor on the week containing `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            anchor: week_start_sunday(date),
        }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn day(&self, day: DayOfWeek) -> NaiveDate {
        self.anchor + Duration::days(i64::from(day.days_from_sunday()))
    }

    /// Midnight UTC at the start of the reference week.
    pub fn utc_start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.anchor.and_time(chrono::NaiveTime::MIN))
    }

    /// Local midnight at the start of the reference week in `tz`.
    pub fn local_start<Tz: TimeZone>(&self, tz: &Tz) -> DateTime<Utc> {
        // Midnight can fall in a DST gap in a handful of zones; the first
        // existing hour that day is the start of the week there.
        (0..24)
            .find_map(|hour| local_hour(tz, self.anchor, hour))
            .unwrap_or_else(|| self.utc_start())
    }

    /// Whole weeks between the reference week and the week containing `date`.
    pub fn weeks_until(&self, date: NaiveDate) -> i64 {
        (week_start_sunday(date) - self.anchor).num_days().div_euclid(7)
    }
}

impl Default for RecurringWeek {
    fn default() -> Self {
        // Sunday, December 31st 2017
        Self {
            anchor: NaiveDate::from_ymd_opt(2017, 12, 31).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl From<NaiveDate> for RecurringWeek {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

impl From<RecurringWeek> for NaiveDate {
    fn from(week: RecurringWeek) -> Self {
        week.anchor
    }
}
