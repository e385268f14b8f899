use chrono::{Datelike, Duration, NaiveDate};

const DEFAULT_RANGE_DAYS: i64 = 30;

/// Resolve a trailing-days range token ("7d", "30d", "90d", ...) into the
/// inclusive start date of the window ending at `today`.
///
/// Unrecognized or zero-day tokens fall back to the 30-day default. Negative
/// day counts resolve to a boundary in the future, which simply yields an
/// empty window.
pub fn resolve_range(token: &str, today: NaiveDate) -> NaiveDate {
    let days = token
        .trim()
        .trim_end_matches('d')
        .parse::<i64>()
        .ok()
        .filter(|d| *d != 0)
        .unwrap_or(DEFAULT_RANGE_DAYS);

    today - Duration::days(days)
}

/// Week bucket label, `YYYY-Www` with a zero-padded week number.
///
/// The week number is `ceil((days_since_jan1 + weekday_of_jan1 + 1) / 7)`
/// with Sunday-based weekdays. This is an approximation that does not match
/// ISO 8601; it is kept for compatibility with existing consumers of the
/// trend feed.
pub fn week_key(date: NaiveDate) -> String {
    format!("{}-W{:02}", date.year(), week_number(date))
}

fn week_number(date: NaiveDate) -> i64 {
    let days_since_jan1 = i64::from(date.ordinal0());
    let jan1_weekday = date
        .with_ordinal(1)
        .map(|jan1| i64::from(jan1.weekday().num_days_from_sunday()))
        .unwrap_or(0);

    // Integer ceil division; the numerator is always >= 1.
    (days_since_jan1 + jan1_weekday + 1 + 6) / 7
}

/// Month bucket label, `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    format!("{}-{:02}", date.year(), date.month())
}

/// Day bucket label, `YYYY-MM-DD`.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Year bucket label, `YYYY`.
pub fn year_key(date: NaiveDate) -> String {
    date.year().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_resolve_range_parses_day_tokens() {
        let today = date(2024, 3, 31);
        assert_eq!(resolve_range("7d", today), date(2024, 3, 24));
        assert_eq!(resolve_range("30d", today), date(2024, 3, 1));
        assert_eq!(resolve_range("365d", today), date(2023, 4, 1));
    }

    #[test]
    fn test_resolve_range_falls_back_to_default() {
        let today = date(2024, 3, 31);
        assert_eq!(resolve_range("gibberish", today), date(2024, 3, 1));
        assert_eq!(resolve_range("", today), date(2024, 3, 1));
        assert_eq!(resolve_range("0d", today), date(2024, 3, 1));
    }

    #[test]
    fn test_resolve_range_negative_days_is_a_valid_boundary() {
        // A future boundary is fine; the window is simply empty.
        let today = date(2024, 3, 31);
        assert_eq!(resolve_range("-5d", today), date(2024, 4, 5));
    }

    #[test]
    fn test_week_key_known_dates() {
        // Jan 1 2024 is a Monday (weekday offset 1).
        assert_eq!(week_key(date(2024, 1, 1)), "2024-W01");
        assert_eq!(week_key(date(2024, 1, 7)), "2024-W02");
        assert_eq!(week_key(date(2024, 3, 15)), "2024-W11");
        // Jan 1 2023 is a Sunday (weekday offset 0); the year ends on W53.
        assert_eq!(week_key(date(2023, 1, 1)), "2023-W01");
        assert_eq!(week_key(date(2023, 12, 31)), "2023-W53");
    }

    #[test]
    fn test_week_key_consecutive_days_share_a_week() {
        assert_eq!(week_key(date(2024, 1, 2)), week_key(date(2024, 1, 3)));
    }

    #[test]
    fn test_bucket_labels() {
        let d = date(2024, 3, 5);
        assert_eq!(day_key(d), "2024-03-05");
        assert_eq!(month_key(d), "2024-03");
        assert_eq!(year_key(d), "2024");
    }
}
