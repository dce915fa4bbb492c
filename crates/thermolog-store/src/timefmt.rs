//! Calendar computations over the configured format strings.
//!
//! Nothing in here is hard-coded to a particular date layout: every
//! function takes the format strings from the runtime configuration and
//! parses them as `time` format descriptions at the call site. The
//! store uses these helpers to turn calendar-aware requests (a month, an
//! ISO week, an arbitrary range) into the text bounds its queries bind.
//!
//! Weekday convention: Monday-first, end to end. Week labels parse as
//! ISO week dates with weekday 1 = Monday, and [`WEEKDAY_LABELS`] lists
//! the names in the same order.

use time::format_description::{self, OwnedFormatItem};
use time::{Date, Duration, Month, OffsetDateTime};

use crate::error::{Error, Result};

/// Canonical weekday names, Monday first, matching the ISO week
/// parsing convention.
pub const WEEKDAY_LABELS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Parse a configured format string into format items.
fn items(fmt: &str) -> Result<OwnedFormatItem> {
    Ok(format_description::parse_owned::<2>(fmt)?)
}

/// First and last calendar day of a month, formatted under `dateformat`.
///
/// Uses the real day count of the month (28-31, leap-aware).
pub fn month_bounds(year: i32, month: u8, dateformat: &str) -> Result<(String, String)> {
    let month = Month::try_from(month)
        .map_err(|_| Error::InvalidDateFormat(format!("month {month} out of range")))?;
    let days = time::util::days_in_month(month, year);

    let start = Date::from_calendar_date(year, month, 1)
        .map_err(|_| Error::InvalidDateFormat(format!("{year}-{month:?}-01")))?;
    let end = Date::from_calendar_date(year, month, days)
        .map_err(|_| Error::InvalidDateFormat(format!("{year}-{month:?}-{days}")))?;

    let fmt = items(dateformat)?;
    Ok((start.format(&fmt)?, end.format(&fmt)?))
}

/// The 7 consecutive calendar dates of an ISO week, Monday first,
/// formatted under `dateformat`.
///
/// The label carries year and week number only; weekday 1 is appended
/// before parsing under `iso_week_format`. Fails with
/// [`Error::InvalidWeekLabel`] when the label does not parse.
pub fn iso_week_dates(label: &str, iso_week_format: &str, dateformat: &str) -> Result<[String; 7]> {
    let week_fmt = items(iso_week_format)?;
    let monday = Date::parse(&format!("{label}-1"), &week_fmt)
        .map_err(|_| Error::InvalidWeekLabel(label.to_string()))?;

    let date_fmt = items(dateformat)?;
    let mut dates: [String; 7] = Default::default();
    for (i, slot) in dates.iter_mut().enumerate() {
        *slot = (monday + Duration::days(i as i64)).format(&date_fmt)?;
    }
    Ok(dates)
}

/// Parse a stored or caller-supplied date string under `dateformat`.
pub fn parse_date(s: &str, dateformat: &str) -> Result<Date> {
    let fmt = items(dateformat)?;
    Date::parse(s, &fmt).map_err(|_| Error::InvalidDateFormat(s.to_string()))
}

/// A specific calendar day formatted under `dateformat`.
pub fn format_day(year: i32, month: u8, day: u8, dateformat: &str) -> Result<String> {
    let month = Month::try_from(month)
        .map_err(|_| Error::InvalidDateFormat(format!("month {month} out of range")))?;
    let date = Date::from_calendar_date(year, month, day)
        .map_err(|_| Error::InvalidDateFormat(format!("{year}-{month:?}-{day}")))?;
    Ok(date.format(&items(dateformat)?)?)
}

/// Reparse a stored date string and reformat it under `target`.
///
/// When the input is absent (no data in the store) the current UTC date
/// stands in, formatted under `target`. This is the empty-store policy
/// for the min/max range queries.
pub fn reformat_or_now(value: Option<&str>, dateformat: &str, target: &str) -> Result<String> {
    let target_fmt = items(target)?;
    match value {
        Some(s) => Ok(parse_date(s, dateformat)?.format(&target_fmt)?),
        None => Ok(OffsetDateTime::now_utc().date().format(&target_fmt)?),
    }
}

/// The current UTC timestamp as (date, time) strings under the
/// configured formats. Captured by the poller before every reading.
pub fn now_strings(dateformat: &str, timeformat: &str) -> Result<(String, String)> {
    let now = OffsetDateTime::now_utc();
    let date = now.date().format(&items(dateformat)?)?;
    let time = now.time().format(&items(timeformat)?)?;
    Ok((date, time))
}
