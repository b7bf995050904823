//! Input validation helpers shared by the services.
//!
//! Every failure here is a [`DomainError::Validation`].

use chrono::{NaiveDate, NaiveTime, Timelike};

use crate::domain::error::{DomainError, DomainResult};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_TEXT_LENGTH: usize = 500;
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Parse a calendar date in strict `YYYY-MM-DD` form
pub fn parse_date(field: &str, value: &str) -> DomainResult<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return Err(DomainError::validation(format!(
            "{} must be in YYYY-MM-DD format",
            field
        )));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        DomainError::validation(format!("{} is not a valid date: {}", field, value))
    })
}

pub fn parse_optional_date(field: &str, value: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(field, value).map(Some),
    }
}

/// Parse a wall-clock time given as `HH:MM` or `HH:MM:SS`
pub fn parse_time(field: &str, value: &str) -> DomainResult<NaiveTime> {
    let value = value.trim();
    let format = match value.len() {
        5 => "%H:%M",
        8 => "%H:%M:%S",
        _ => {
            return Err(DomainError::validation(format!(
                "{} must be in HH:MM or HH:MM:SS format",
                field
            )))
        }
    };

    NaiveTime::parse_from_str(value, format).map_err(|_| {
        DomainError::validation(format!("{} is not a valid time: {}", field, value))
    })
}

/// Render a time the way clients sent it: seconds only when non-zero
pub fn format_time(time: &NaiveTime) -> String {
    if time.second() == 0 {
        time.format("%H:%M").to_string()
    } else {
        time.format("%H:%M:%S").to_string()
    }
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Trimmed, non-empty and within `max` characters
pub fn require_text(field: &str, value: &str, max: usize) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{} cannot exceed {} characters",
            field, max
        )));
    }
    Ok(value.to_string())
}

/// Blank input collapses to `None`
pub fn optional_text(field: &str, value: Option<&str>, max: usize) -> DomainResult<Option<String>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => require_text(field, value, max).map(Some),
    }
}

pub fn normalize_email(value: &str) -> DomainResult<String> {
    let email = require_text("Email", value, MAX_EMAIL_LENGTH)?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace) => {
            Ok(email)
        }
        _ => Err(DomainError::validation(format!("Invalid email address: {}", value.trim()))),
    }
}

pub fn validate_duration(duration_minutes: Option<i32>) -> DomainResult<Option<i32>> {
    match duration_minutes {
        Some(minutes) if minutes < 0 => Err(DomainError::validation(
            "Duration cannot be negative",
        )),
        other => Ok(other),
    }
}

pub fn validate_temperature(temperature: Option<f64>) -> DomainResult<Option<f64>> {
    match temperature {
        Some(value) if !value.is_finite() => Err(DomainError::validation(
            "Temperature must be a finite number",
        )),
        other => Ok(other),
    }
}
