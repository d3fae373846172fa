//! Time and timestamp helpers.
//!
//! All instants are stored in UTC. Wall-clock times (fixed on/off times, the
//! almanac fallback) are interpreted in the installation's local time zone.

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::ValidationError;

/// UTC timestamp used for trigger instants, reading times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Parse an IANA time zone name such as `"America/Toronto"`.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownTimeZone`] when the name is not in the
/// time zone database.
pub fn parse_time_zone(name: &str) -> Result<Tz, ValidationError> {
    name.parse::<Tz>()
        .map_err(|_| ValidationError::UnknownTimeZone(name.to_string()))
}

/// The calendar date of `instant` as seen in `tz`.
#[must_use]
pub fn local_date(instant: Timestamp, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// The day after `date`.
#[must_use]
pub fn next_day(date: NaiveDate) -> NaiveDate {
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Resolve a local wall-clock time on `date` in `tz` to a UTC instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant; times
/// that do not exist (DST spring-forward gap) are pushed one hour later.
#[must_use]
pub fn at_local(tz: Tz, date: NaiveDate, time: NaiveTime) -> Timestamp {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map_or_else(
            || Utc.from_utc_datetime(&naive),
            |local| local.with_timezone(&Utc),
        )
}

/// Next occurrence of the local wall-clock `time` strictly after `now`.
///
/// Today's occurrence is used when it lies strictly in the future,
/// otherwise the same time tomorrow.
#[must_use]
pub fn next_local(now: Timestamp, tz: Tz, time: NaiveTime) -> Timestamp {
    let today = local_date(now, tz);
    let candidate = at_local(tz, today, time);
    if candidate > now {
        candidate
    } else {
        at_local(tz, next_day(today), time)
    }
}
