// Timespan module
// Collapsed availability intervals and the date-keyed availability map

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{AvailabilityError, Result};
use crate::models::cell::LocationId;
use crate::utils::date::next_utc_midnight;

/// A contiguous `[start, end)` interval at a single location.
///
/// Timespans produced by the collapser never cross a UTC calendar-day
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimespan")]
pub struct Timespan {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub location: Option<LocationId>,
}

impl Timespan {
    /// Create a timespan, rejecting empty or inverted intervals.
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Option<LocationId>,
    ) -> Result<Self> {
        if end <= start {
            return Err(AvailabilityError::InvalidTimespan { start, end });
        }
        Ok(Self {
            start,
            end,
            location,
        })
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when the interval runs past the UTC midnight following its start.
    pub fn crosses_utc_midnight(&self) -> bool {
        self.end > next_utc_midnight(self.start)
    }

    /// The same interval moved by `offset`.
    pub fn shifted(&self, offset: Duration) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            location: self.location,
        }
    }
}

/// Wire form of a timespan before the interval is validated.
#[derive(Deserialize)]
struct RawTimespan {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    #[serde(default)]
    location: Option<LocationId>,
}

impl TryFrom<RawTimespan> for Timespan {
    type Error = AvailabilityError;

    fn try_from(raw: RawTimespan) -> Result<Self> {
        Timespan::new(raw.start, raw.end, raw.location)
    }
}

/// A timespan expressed in the viewer's timezone, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimespan {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub location: Option<LocationId>,
}

/// Date-specific availability keyed by the local calendar date of each
/// timespan's start.
///
/// An empty list for a date means "explicitly unavailable that day", which
/// is different from the date being absent (no information).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Availabilities(BTreeMap<NaiveDate, Vec<Timespan>>);

impl Availabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&[Timespan]> {
        self.0.get(&date).map(Vec::as_slice)
    }

    pub fn insert(&mut self, date: NaiveDate, timespans: Vec<Timespan>) -> Option<Vec<Timespan>> {
        self.0.insert(date, timespans)
    }

    pub fn remove(&mut self, date: NaiveDate) -> Option<Vec<Timespan>> {
        self.0.remove(&date)
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.0.contains_key(&date)
    }

    /// True when the date is present with an empty list.
    pub fn is_explicitly_empty(&self, date: NaiveDate) -> bool {
        self.0.get(&date).is_some_and(Vec::is_empty)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &[Timespan])> + '_ {
        self.0.iter().map(|(date, spans)| (*date, spans.as_slice()))
    }

    /// All timespans across every date, in key order.
    pub fn timespans(&self) -> impl Iterator<Item = &Timespan> + '_ {
        self.0.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(NaiveDate, Vec<Timespan>)> for Availabilities {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Vec<Timespan>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_new_rejects_inverted_interval() {
        let result = Timespan::new(at(4, 10), at(4, 9), None);
        assert!(matches!(
            result,
            Err(AvailabilityError::InvalidTimespan { .. })
        ));
        assert!(Timespan::new(at(4, 9), at(4, 9), None).is_err());
    }

    #[test]
    fn test_crosses_utc_midnight() {
        let inside = Timespan::new(at(4, 23), at(5, 0), None).unwrap();
        let across = Timespan::new(at(4, 23), at(5, 1), None).unwrap();
        assert!(!inside.crosses_utc_midnight());
        assert!(across.crosses_utc_midnight());
    }

    #[test]
    fn test_availabilities_wire_shape() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let cleared = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let mut availabilities = Availabilities::new();
        availabilities.insert(date, vec![Timespan::new(at(4, 9), at(4, 12), Some(42)).unwrap()]);
        availabilities.insert(cleared, Vec::new());

        let json = serde_json::to_value(&availabilities).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "2024-03-04": [{
                    "start": "2024-03-04T09:00:00Z",
                    "end": "2024-03-04T12:00:00Z",
                    "location": 42
                }],
                "2024-03-05": []
            })
        );

        let parsed: Availabilities = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, availabilities);
        assert!(parsed.is_explicitly_empty(cleared));
        assert!(!parsed.is_explicitly_empty(date));
    }

    #[test]
    fn test_timespan_accepts_offset_timestamps_and_missing_location() {
        let parsed: Timespan = serde_json::from_str(
            r#"{"start":"2024-03-04T04:00:00-05:00","end":"2024-03-04T05:00:00-05:00"}"#,
        )
        .unwrap();
        assert_eq!(parsed.start, at(4, 9));
        assert_eq!(parsed.location, None);
    }

    #[test]
    fn test_deserialize_rejects_inverted_interval() {
        let inverted = serde_json::from_str::<Timespan>(
            r#"{"start":"2024-03-04T10:00:00Z","end":"2024-03-04T09:00:00Z","location":1}"#,
        );
        let err = inverted.unwrap_err().to_string();
        assert!(err.contains("must be after start"), "{}", err);

        let empty_day = serde_json::from_str::<Availabilities>(
            r#"{"2024-03-04":[{"start":"2024-03-04T09:00:00Z","end":"2024-03-04T09:00:00Z"}]}"#,
        );
        assert!(empty_day.is_err());
    }
}
