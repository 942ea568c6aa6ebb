//! Date codec shared by every record carrying a timestamp.
//!
//! The service emits `yyyy-MM-ddTHH:mm:ss` strings without an offset, always
//! meaning UTC. Its parser on the write side insists on an explicit numeric
//! offset, so the bill-create body is written with a literal `+00:00` suffix
//! (never `Z`). Both shapes decode to the same instant.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Pattern of every timestamp the service returns.
pub const SERVER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Offset suffix appended on the bill-create path.
pub const UTC_OFFSET: &str = "+00:00";

/// Parse a service timestamp.
///
/// Accepts the bare server pattern and the same pattern followed by `+00:00`.
/// Anything else (a `Z` suffix, other offsets, fractional seconds) fails.
pub fn parse(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let naive = value.strip_suffix(UTC_OFFSET).unwrap_or(value);
    NaiveDateTime::parse_from_str(naive, SERVER_FORMAT).map(|dt| dt.and_utc())
}

pub fn format(date: &DateTime<Utc>) -> String {
    date.format(SERVER_FORMAT).to_string()
}

pub fn format_with_offset(date: &DateTime<Utc>) -> String {
    format!("{}{UTC_OFFSET}", date.format(SERVER_FORMAT))
}

/// `#[serde(with = "date::server")]`: the default read/write format.
pub mod server {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse(&raw).map_err(|e| de::Error::custom(format!("invalid date {raw:?}: {e}")))
    }
}

/// `#[serde(with = "date::offset")]`: writes `+00:00`, only used for bill creation.
pub mod offset {
    use chrono::{DateTime, Utc};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_with_offset(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        super::server::deserialize(deserializer)
    }
}
