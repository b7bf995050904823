//! Text encodings for the columns that hold dates, times, timestamps and enums.

use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

pub fn encode_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .with_context(|| format!("Invalid stored timestamp: {}", value))
}

pub fn decode_optional_timestamp(value: Option<String>) -> Result<Option<DateTime<Utc>>> {
    value.as_deref().map(decode_timestamp).transpose()
}

pub fn encode_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn decode_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid stored date: {}", value))
}

pub fn encode_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

/// Older rows may have been written without seconds
pub fn decode_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| anyhow!("Invalid stored time: {}", value))
}

pub fn decode_enum<T>(value: &str) -> Result<T>
where
    T: FromStr<Err = anyhow::Error>,
{
    T::from_str(value)
}
