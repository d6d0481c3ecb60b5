//! Resolution of symbolic date tokens into concrete local-day ranges.
//!
//! Buckets anchor to the caller's "now" so every resolution in a request sees
//! the same instant; tests pass a fixed clock.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO date regex")
});

/// Resolve a date token to an inclusive `[start, end]` range of local days.
///
/// Recognized tokens: `today`, `tomorrow`, `this_week` (through Saturday),
/// `this_month`, `this_year` (rolling, today through the last day), and a
/// strict `YYYY-MM-DD` calendar date. Anything else falls back to today.
pub fn resolve<Tz: TimeZone>(token: &str, now: &DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let today = now.date_naive();
    let (start_day, end_day) = match token.trim() {
        "today" => (today, today),
        "tomorrow" => {
            let day = today + Duration::days(1);
            (day, day)
        }
        "this_week" => {
            // Weeks run Sunday through Saturday; on a Saturday the bucket is
            // just today.
            let days_left = 6 - i64::from(today.weekday().num_days_from_sunday());
            (today, today + Duration::days(days_left))
        }
        "this_month" => (today, last_day_of_month(today)),
        "this_year" => (
            today,
            NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today),
        ),
        other if ISO_DATE_RE.is_match(other) => {
            match NaiveDate::parse_from_str(other, "%Y-%m-%d") {
                Ok(day) => (day, day),
                Err(_) => {
                    tracing::debug!(token = other, "unparseable calendar date, defaulting to today");
                    (today, today)
                }
            }
        }
        other => {
            tracing::debug!(token = other, "unrecognized date token, defaulting to today");
            (today, today)
        }
    };

    let tz = now.timezone();
    (
        localize(start_day.and_time(NaiveTime::MIN), &tz),
        localize(end_day.and_time(end_of_day()), &tz),
    )
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(day)
}

fn localize<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        // DST fold: take the earlier instant.
        LocalResult::Ambiguous(earliest, _) => earliest,
        // DST gap: the wall-clock time does not exist locally.
        LocalResult::None => tz.from_utc_datetime(&naive),
    }
}
