//! Retry deadline computation
//!
//! Turns `Retry-After` header values into absolute deadlines and synthesizes
//! the deadline for monthly bandwidth quota responses.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDateTime, Utc};

/// Computes the first day of the next calendar month at 12:00 UTC
///
/// Monthly bandwidth quotas reset on the calendar boundary; noon UTC leaves
/// a margin past midnight in every provider's local time zone.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use sumi_navigator::classify::next_month_noon_utc;
///
/// let now = Utc.with_ymd_and_hms(2024, 12, 15, 8, 30, 0).unwrap();
/// let expected = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(next_month_noon_utc(now), expected);
/// ```
pub fn next_month_noon_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|first| first.and_hms_opt(12, 0, 0))
        .map(|noon| noon.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Parses a `Retry-After` header value into an absolute deadline
///
/// Accepts delta-seconds (`"120"`) relative to `now`, or an HTTP-date in
/// any of its three forms:
///
/// - IMF-fixdate: `Sun, 06 Nov 1994 08:49:37 GMT`
/// - RFC 850: `Sunday, 06-Nov-94 08:49:37 GMT`
/// - asctime: `Sun Nov  6 08:49:37 1994`
///
/// Returns None for anything else.
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(seconds) = value.parse::<u64>() {
        let seconds = i64::try_from(seconds).ok()?;
        return now.checked_add_signed(Duration::try_seconds(seconds)?);
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(value) {
        return Some(date.with_timezone(&Utc));
    }

    parse_obsolete_http_date(value)
}

/// RFC 850 and asctime dates, both implicitly GMT
fn parse_obsolete_http_date(value: &str) -> Option<DateTime<Utc>> {
    // asctime pads single-digit days with a second space
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");

    ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %d %H:%M:%S %Y"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&collapsed, format).ok())
        .map(|naive| naive.and_utc())
}
