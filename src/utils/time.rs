use chrono::{NaiveDate, Utc};

/// Current timestamp in seconds (Unix epoch).
pub fn current_timestamp_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Today as a calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
