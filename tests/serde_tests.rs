//! Serde round-trip tests, gated behind the `serde` feature.

use dualmap::DualOrderedMap;
use rstest::rstest;

#[rstest]
fn serialization_emits_key_order() {
    let map = DualOrderedMap::try_from_iter([(3, "c"), (1, "a"), (2, "b")]).unwrap();
    let rendered = serde_json::to_string(&map).unwrap();
    assert_eq!(rendered, r#"{"1":"a","2":"b","3":"c"}"#);
}

#[rstest]
fn round_trip_preserves_both_orderings() {
    let original =
        DualOrderedMap::try_from_iter([(1, "z".to_string()), (2, "a".to_string())]).unwrap();
    let rendered = serde_json::to_string(&original).unwrap();
    let decoded: DualOrderedMap<i32, String> = serde_json::from_str(&rendered).unwrap();

    assert_eq!(decoded, original);
    let ranked: Vec<&i32> = decoded.keys_by_value().collect();
    assert_eq!(ranked, vec![&2, &1]);
}

#[rstest]
fn duplicate_values_fail_deserialization() {
    let result: Result<DualOrderedMap<i32, String>, _> =
        serde_json::from_str(r#"{"1":"same","2":"same"}"#);
    let message = result.unwrap_err().to_string();
    assert!(message.contains("value is already associated"));
}

#[rstest]
fn empty_map_round_trips() {
    let empty: DualOrderedMap<i32, i32> = DualOrderedMap::new();
    let rendered = serde_json::to_string(&empty).unwrap();
    assert_eq!(rendered, "{}");

    let decoded: DualOrderedMap<i32, i32> = serde_json::from_str(&rendered).unwrap();
    assert!(decoded.is_empty());
}
