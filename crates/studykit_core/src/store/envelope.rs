//! Persisted envelope around every stored payload.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Encoding format tag written into every envelope.
///
/// Informational only: readers detect a mismatch and log it, but no
/// migration step exists yet.
pub const SCHEMA_VERSION: &str = "1";

/// Wire shape: `{ "payload": ..., "writtenAt": <ms>, "schemaVersion": "..." }`.
///
/// All three fields are required when parsing; a missing field makes the
/// stored entry malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub payload: Value,
    pub written_at: i64,
    pub schema_version: String,
}

impl Envelope {
    /// Wraps `payload` with the current time and schema version.
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            written_at: Utc::now().timestamp_millis(),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    pub fn is_current_schema(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::{Envelope, SCHEMA_VERSION};
    use serde_json::json;

    #[test]
    fn envelope_serializes_with_camel_case_fields() {
        let envelope = Envelope {
            payload: json!([1, 2]),
            written_at: 1_700_000_000_000,
            schema_version: SCHEMA_VERSION.to_string(),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({ "payload": [1, 2], "writtenAt": 1_700_000_000_000_i64, "schemaVersion": "1" })
        );
    }

    #[test]
    fn envelope_without_version_is_rejected() {
        let parsed = serde_json::from_str::<Envelope>(r#"{"payload":[],"writtenAt":1}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn envelope_without_payload_is_rejected() {
        let parsed =
            serde_json::from_str::<Envelope>(r#"{"writtenAt":1,"schemaVersion":"1"}"#);
        assert!(parsed.is_err());
    }
}
