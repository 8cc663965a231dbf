//! Database utility functions.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

use super::{DbError, DbResult};

/// Current time truncated to the millisecond precision the store keeps.
pub fn current_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(TimeDelta::milliseconds(1))
        .unwrap_or(now)
}

/// Convert a timestamp to stored epoch milliseconds.
pub fn to_millis(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert stored epoch milliseconds back to a timestamp.
pub fn from_millis(millis: i64) -> DbResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| DbError::InvalidData {
        message: format!("timestamp out of range: {}", millis),
        help: "Timestamps are stored as epoch milliseconds".to_string(),
    })
}

/// Convert a stored 0/1 flag to a bool.
pub fn flag_from_int(value: i64) -> DbResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DbError::InvalidData {
            message: format!("completed flag out of range: {}", other),
            help: "Expected 0 or 1".to_string(),
        }),
    }
}

pub fn flag_to_int(value: bool) -> i64 {
    i64::from(value)
}
