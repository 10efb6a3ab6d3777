//! Lenient deserialization for client supplied instants.
//!
//! Accepts the forms understood by [`shared::validation::parse_instant`].

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};

pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => shared::validation::parse_instant(value)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid date-time: {}", value))),
    }
}
