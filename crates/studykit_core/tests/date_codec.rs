use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use studykit_core::codec::temporal::{decode, encode};
use studykit_core::{DateAwareCodec, KeyedStore, MemoryBackend, TemporalValue};

fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
}

fn sample_tree() -> TemporalValue {
    TemporalValue::object([
        ("title", TemporalValue::from("Semester plan")),
        ("createdAt", TemporalValue::from(at(1_700_000_000_123))),
        ("pinned", TemporalValue::from(true)),
        ("archivedAt", TemporalValue::Null),
        (
            "events",
            TemporalValue::Array(vec![
                TemporalValue::object([
                    ("startTime", TemporalValue::from(at(1_700_000_100_000))),
                    ("endTime", TemporalValue::from(at(1_700_003_700_999))),
                    ("room", TemporalValue::from("B-12")),
                ]),
                TemporalValue::object([
                    ("deadline", TemporalValue::from(at(1_710_000_000_001))),
                    ("weight", TemporalValue::from(30_i64)),
                ]),
            ]),
        ),
    ])
}

#[test]
fn decode_of_encode_restores_nested_dates() {
    let original = sample_tree();

    let restored = decode(encode(&original));

    assert_eq!(restored, original);
}

#[test]
fn encoded_dates_are_canonical_strings() {
    let encoded = encode(&sample_tree());

    assert_eq!(encoded["createdAt"], json!("2023-11-14T22:13:20.123Z"));
    assert_eq!(encoded["events"][1]["deadline"], json!("2024-03-09T16:00:00.001Z"));
    assert_eq!(encoded["archivedAt"], json!(null));
    assert_eq!(encoded["events"].as_array().map(Vec::len), Some(2));
}

#[test]
fn round_trip_through_store_preserves_dates_to_the_millisecond() {
    let store = KeyedStore::new(MemoryBackend::new());
    let original = sample_tree();

    store.write("planner", &original, &DateAwareCodec).unwrap();
    let restored = store.read("planner", TemporalValue::Null, &DateAwareCodec);

    assert_eq!(restored, original);
    assert_eq!(
        restored
            .get("createdAt")
            .and_then(TemporalValue::as_date)
            .map(DateTime::timestamp_millis),
        Some(1_700_000_000_123)
    );
}

#[test]
fn decode_restores_offset_and_naive_timestamps_as_utc() {
    let decoded = decode(json!({
        "startDate": "2024-05-01T10:00:00+02:00",
        "endDate": "2024-05-01T08:30:00",
    }));

    assert_eq!(
        decoded.get("startDate").and_then(TemporalValue::as_date),
        Some(&Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap())
    );
    assert_eq!(
        decoded.get("endDate").and_then(TemporalValue::as_date),
        Some(&Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap())
    );
}

#[test]
fn non_allow_listed_keys_stay_strings_after_round_trip() {
    let original = TemporalValue::object([(
        "archivedAt",
        TemporalValue::from("2024-01-01T00:00:00.000Z"),
    )]);

    assert_eq!(decode(encode(&original)), original);
}
