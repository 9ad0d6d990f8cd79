//! Canonical timestamp text form.
//!
//! Every persisted date uses `YYYY-MM-DDTHH:MM:SS.mmmZ` (UTC, millisecond
//! precision). Parsing also accepts any RFC 3339 offset and offset-less
//! local timestamps, which are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Formats a timestamp in canonical form.
pub fn format(value: &DateTime<Utc>) -> String {
    value.format(CANONICAL_FORMAT).to_string()
}

/// Parses a timestamp string; returns `None` when it is not a valid instant.
pub fn parse(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(trimmed, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Current time truncated to the precision that survives a round trip.
pub fn now_utc() -> DateTime<Utc> {
    truncate_to_millis(Utc::now())
}

/// Drops sub-millisecond precision.
pub fn truncate_to_millis(value: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value)
}

/// `#[serde(with = "iso8601::utc")]` for `DateTime<Utc>` fields.
pub mod utc {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{text}`")))
    }
}

/// `#[serde(default, with = "iso8601::utc_option")]` for optional dates.
pub mod utc_option {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => super::parse(&text)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{text}`"))),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format, parse, truncate_to_millis};
    use chrono::{TimeZone, Utc};

    #[test]
    fn format_uses_millisecond_utc_form() {
        let value = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(format(&value), "2024-03-05T07:08:09.000Z");
    }

    #[test]
    fn parse_accepts_offsets_and_naive_form() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(parse("2024-03-05T09:08:09+02:00"), Some(expected));
        assert_eq!(parse("2024-03-05T07:08:09"), Some(expected));
        assert_eq!(parse("2024-03-05T07:08:09.000Z"), Some(expected));
    }

    #[test]
    fn parse_rejects_partial_and_invalid_values() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("2024-03-05"), None);
        assert_eq!(parse("2024-13-45T99:00:00Z"), None);
    }

    #[test]
    fn truncate_drops_sub_millisecond_precision() {
        let value = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let truncated = truncate_to_millis(value);
        assert_eq!(truncated.timestamp_subsec_nanos(), 123_000_000);
    }
}
