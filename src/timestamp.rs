//! QSO timestamp extraction from `qso_date` and `time_on`

use crate::record::{Record, RecordError};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

/// ADIF date field (`YYYYMMDD`)
pub const DATE_FIELD: &str = "qso_date";

/// ADIF start time field (`HHMM` or `HHMMSS`)
pub const TIME_FIELD: &str = "time_on";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error(transparent)]
    Missing(#[from] RecordError),

    #[error("malformed {field} value {value:?}: {reason}")]
    Malformed {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

fn malformed(field: &'static str, value: &str, reason: &'static str) -> TimestampError {
    TimestampError::Malformed {
        field,
        value: value.to_string(),
        reason,
    }
}

fn digits(field: &'static str, value: &str, range: std::ops::Range<usize>) -> Result<u32, TimestampError> {
    value[range]
        .parse()
        .map_err(|_| malformed(field, value, "non-numeric component"))
}

/// Parse date and time text into a UTC timestamp
///
/// `date` must be exactly 8 ASCII digits and `time` exactly 4 or 6. The
/// components must also form a real calendar date and clock time.
pub fn parse_timestamp(date: &str, time: &str) -> Result<DateTime<Utc>, TimestampError> {
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(DATE_FIELD, date, "expected 8 digits"));
    }
    if !matches!(time.len(), 4 | 6) || !time.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(TIME_FIELD, time, "expected 4 or 6 digits"));
    }

    let year = digits(DATE_FIELD, date, 0..4)? as i32;
    let month = digits(DATE_FIELD, date, 4..6)?;
    let day = digits(DATE_FIELD, date, 6..8)?;
    let hour = digits(TIME_FIELD, time, 0..2)?;
    let minute = digits(TIME_FIELD, time, 2..4)?;
    let second = if time.len() == 6 {
        digits(TIME_FIELD, time, 4..6)?
    } else {
        0
    };

    let date_part = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| malformed(DATE_FIELD, date, "no such calendar date"))?;
    let naive = date_part
        .and_hms_opt(hour, minute, second)
        .ok_or_else(|| malformed(TIME_FIELD, time, "no such time of day"))?;
    Ok(naive.and_utc())
}

/// Timestamp of a record
pub fn extract_timestamp(record: &Record) -> Result<DateTime<Utc>, TimestampError> {
    let date = record.require(DATE_FIELD)?;
    let time = record.require(TIME_FIELD)?;
    parse_timestamp(date, time)
}

/// Parse an RFC 3339 bound such as `2022-10-11T12:33:45Z` into UTC
pub fn parse_bound(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc))
}
