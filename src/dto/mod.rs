use std::time::SystemTime;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Embed cards and buttons.
pub mod embed;
/// Health check payload.
pub mod health;
/// Interaction requests and replies.
pub mod interaction;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    format_datetime(OffsetDateTime::from(time))
}

/// RFC 3339 rendering of a unix timestamp in milliseconds.
pub(crate) fn format_unix_millis(millis: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .map(format_datetime)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

fn format_datetime(datetime: OffsetDateTime) -> String {
    datetime
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
