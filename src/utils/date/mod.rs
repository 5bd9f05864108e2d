// Date utility functions
// Day boundaries, local-hour resolution and week anchors shared by the grid,
// collapser and recurring reconciler.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Midnight UTC at the start of the instant's UTC calendar day.
pub fn start_of_utc_day(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN))
}

/// The first UTC midnight strictly after `instant`.
pub fn next_utc_midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    start_of_utc_day(instant) + Duration::days(1)
}

/// True when both instants fall on the same UTC calendar day.
pub fn is_same_utc_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

/// Resolve `hour` o'clock on `date` in `tz` to a UTC instant.
///
/// `hour == 24` means midnight at the start of the following day. Returns
/// `None` when the wall-clock hour does not exist (spring-forward gap).
/// Ambiguous hours (fall-back overlap) resolve to the earliest instant.
pub fn local_hour<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    let (date, hour) = if hour >= 24 {
        (date.succ_opt()?, hour - 24)
    } else {
        (date, hour)
    };
    let naive = date.and_hms_opt(hour, 0, 0)?;
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => {
            let earliest = if first <= second { first } else { second };
            Some(earliest.with_timezone(&Utc))
        }
        LocalResult::None => None,
    }
}

/// The local calendar date of a UTC instant in `tz`.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// The Sunday that starts the week containing `date`.
pub fn week_start_sunday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}
