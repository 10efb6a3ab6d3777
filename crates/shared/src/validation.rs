//! Common validation utilities.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use validator::ValidationError;

lazy_static::lazy_static! {
    /// Login names must be Gmail addresses.
    pub static ref GMAIL_USERNAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-zA-Z0-9._%+-]+@gmail\.com$").unwrap();

    /// Administrator identifiers: `ADM` followed by at least three digits.
    pub static ref ADMIN_ID_REGEX: regex::Regex = regex::Regex::new(r"^ADM\d{3,}$").unwrap();

    /// Wall-clock time in `HH:MM:SS` form.
    pub static ref TIME_OF_DAY_REGEX: regex::Regex =
        regex::Regex::new(r"^([01]\d|2[0-3]):[0-5]\d:[0-5]\d$").unwrap();
}

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

pub fn validate_gmail_username(username: &str) -> Result<(), ValidationError> {
    if GMAIL_USERNAME_REGEX.is_match(username) {
        Ok(())
    } else {
        let mut err = ValidationError::new("gmail_username");
        err.message = Some("Username must be a valid Gmail address".into());
        Err(err)
    }
}

pub fn validate_admin_id(id: &str) -> Result<(), ValidationError> {
    if ADMIN_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        let mut err = ValidationError::new("admin_id_format");
        err.message = Some("Admin id must look like ADM001".into());
        Err(err)
    }
}

pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if TIME_OF_DAY_REGEX.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("time_of_day_format");
        err.message = Some("Time must be in HH:MM:SS format".into());
        Err(err)
    }
}

/// Parses a client supplied instant.
///
/// Accepts RFC 3339 (`2024-05-01T08:00:00Z`), a naive date-time
/// (`2024-05-01T08:00:00`, `2024-05-01 08:00:00`) or a bare date (`2024-05-01`).
/// Naive values are read as UTC.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)))
}

/// Validator adapter for optional instant strings carried in request bodies.
pub fn validate_instant(value: &str) -> Result<(), ValidationError> {
    if parse_instant(value).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("instant_format");
        err.message = Some("Expected an ISO-8601 date or date-time".into());
        Err(err)
    }
}

/// First instant of the UTC day containing `at`.
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&at.date_naive().and_time(NaiveTime::MIN))
}

/// Last millisecond of the UTC day containing `at` (23:59:59.999).
pub fn end_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&at.date_naive().and_time(last))
}
