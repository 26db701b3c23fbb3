//! Weekday trading calendar.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Calendar days per year used to turn a lookback in years into days.
pub const DAYS_PER_YEAR: i64 = 365;

/// Format used for dates handed to the risk layer.
pub const ISO_DATE: &str = "%Y-%m-%d";

/// Whether the date is a weekday.
pub fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Weekdays in `[end - lookback_days, end]`, chronological.
pub fn trading_days(end: NaiveDate, lookback_days: i64) -> Vec<NaiveDate> {
    let start = end - Duration::days(lookback_days.max(0));
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_trading_day(*d))
        .collect()
}

/// Format dates as ISO strings.
pub fn to_iso(dates: &[NaiveDate]) -> Vec<String> {
    dates.iter().map(|d| d.format(ISO_DATE).to_string()).collect()
}
