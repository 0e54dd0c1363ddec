//! Sanitizer behavior tests.

use super::*;
use proptest::prelude::*;
use serde_json::json;

fn nested_arrays(depth: usize) -> JsonValue {
    let mut value = json!("leaf");
    for _ in 0..depth {
        value = JsonValue::Array(vec![value]);
    }
    value
}

fn nested_objects(depth: usize) -> JsonValue {
    let mut value = json!(1);
    for _ in 0..depth {
        let mut map = Map::new();
        map.insert("next".to_string(), value);
        value = JsonValue::Object(map);
    }
    value
}

fn contains_pollution_key(value: &JsonValue) -> bool {
    match value {
        JsonValue::Object(map) => map
            .iter()
            .any(|(k, v)| is_pollution_key(k) || contains_pollution_key(v)),
        JsonValue::Array(items) => items.iter().any(contains_pollution_key),
        _ => false,
    }
}

/// Independent oracle: drop pollution keys without any depth accounting.
fn strip_reference(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(map) => JsonValue::Object(
            map.iter()
                .filter(|(k, _)| !is_pollution_key(k))
                .map(|(k, v)| (k.clone(), strip_reference(v)))
                .collect(),
        ),
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(strip_reference).collect()),
        other => other.clone(),
    }
}

// ==================== Pollution Keys ====================

#[test]
fn test_strips_proto_from_nested_object() {
    let raw = r#"{"user":{"__proto__":{"isAdmin":true}}}"#;
    let value = parse_and_sanitize(raw, SanitizeOptions::default()).unwrap();
    assert_eq!(value, json!({"user": {}}));
}

#[test]
fn test_strips_all_pollution_keys_at_every_level() {
    let input = json!({
        "constructor": {"prototype": {"polluted": true}},
        "safe": {
            "prototype": 1,
            "nested": [{"__proto__": {"x": 1}, "keep": "yes"}]
        },
        "__proto__": null
    });

    let value = sanitize_value(&input, SanitizeOptions::default()).unwrap();

    assert_eq!(
        value,
        json!({
            "safe": {
                "nested": [{"keep": "yes"}]
            }
        })
    );
    assert!(!contains_pollution_key(&value));
}

#[test]
fn test_pollution_names_are_absent_on_lookup() {
    let value = parse_and_sanitize(
        r#"{"__proto__":{"isAdmin":true},"constructor":{"name":"Object"}}"#,
        SanitizeOptions::default(),
    )
    .unwrap();

    assert_eq!(value, json!({}));
    for key in POLLUTION_KEYS {
        assert!(value.get(key).is_none(), "{} should not resolve", key);
    }
    assert!(value.get("isAdmin").is_none());
    assert!(value.pointer("/__proto__/isAdmin").is_none());
}

#[test]
fn test_pollution_names_are_kept_as_string_values() {
    let input = json!({"kind": "__proto__", "tags": ["constructor", "prototype"]});
    let value = sanitize_value(&input, SanitizeOptions::default()).unwrap();
    assert_eq!(value, input);
}

#[test]
fn test_lookalike_keys_survive() {
    let input = json!({"__PROTO__": 1, "_proto_": 2, "constructors": 3, " prototype": 4});
    let value = sanitize_value(&input, SanitizeOptions::default()).unwrap();
    assert_eq!(value, input);
}

// ==================== Structure ====================

#[test]
fn test_scalars_pass_through() {
    for scalar in [json!(null), json!(false), json!(-7), json!(2.5), json!("x")] {
        assert_eq!(
            sanitize_value(&scalar, SanitizeOptions::default()).unwrap(),
            scalar
        );
    }
}

#[test]
fn test_array_order_and_length_preserved() {
    let input = json!([3, {"a": 1, "__proto__": 2}, [null, "z"], 1]);
    let value = sanitize_value(&input, SanitizeOptions::default()).unwrap();
    assert_eq!(value, json!([3, {"a": 1}, [null, "z"], 1]));
    assert_eq!(value.as_array().unwrap().len(), 4);
}

#[test]
fn test_key_order_preserved_on_reserialize() {
    let raw = r#"{"z":1,"__proto__":{},"a":2,"m":3}"#;
    let value = parse_and_sanitize(raw, SanitizeOptions::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&value).unwrap(),
        r#"{"z":1,"a":2,"m":3}"#
    );
}

#[test]
fn test_parse_error_reports_parser_message() {
    let err = parse_and_sanitize("{\"a\": ", SanitizeOptions::default()).unwrap_err();
    assert_eq!(err.code(), crate::error::ErrorCode::JsonParseError);
    match err {
        LoaderError::JsonParse { message } => assert!(message.contains("EOF")),
        other => panic!("expected JsonParse, got {:?}", other),
    }
}

// ==================== Circuit Breaker ====================

#[test]
fn test_depth_at_limit_is_accepted() {
    let options = SanitizeOptions::default().with_max_depth(10);
    assert!(sanitize_value(&nested_arrays(10), options).is_ok());
    assert!(sanitize_value(&nested_objects(10), options).is_ok());
}

#[test]
fn test_depth_past_limit_trips_breaker() {
    let options = SanitizeOptions::default().with_max_depth(10);

    let err = sanitize_value(&nested_arrays(11), options).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::DepthSanitationExceeded { limit: 10 }
    ));

    let err = sanitize_value(&nested_objects(11), options).unwrap_err();
    assert_eq!(
        err.code(),
        crate::error::ErrorCode::DepthSanitationExceeded
    );
}

#[test]
fn test_breaker_counts_empty_containers() {
    let options = SanitizeOptions::default().with_max_depth(1);
    assert!(sanitize_value(&json!({"a": 1}), options).is_ok());
    assert!(sanitize_value(&json!({"a": {}}), options).is_err());
    assert!(sanitize_value(&json!([[]]), options).is_err());
}

#[test]
fn test_zero_depth_allows_only_scalars() {
    let options = SanitizeOptions::default().with_max_depth(0);
    assert!(sanitize_value(&json!("scalar"), options).is_ok());
    assert!(sanitize_value(&json!([]), options).is_err());
}

#[test]
fn test_breaker_agrees_with_depth_calculator() {
    for depth in 0..8 {
        let value = nested_objects(depth);
        assert_eq!(json_depth(&value), depth);
        let options = SanitizeOptions::default().with_max_depth(depth);
        assert!(sanitize_value(&value, options).is_ok());
        if depth > 0 {
            let tighter = SanitizeOptions::default().with_max_depth(depth - 1);
            assert!(sanitize_value(&value, tighter).is_err());
        }
    }
}

#[test]
fn test_parser_is_not_capped_at_128_levels() {
    let raw = format!("{}1{}", "[".repeat(300), "]".repeat(300));
    let value = parse_and_sanitize(&raw, SanitizeOptions::default()).unwrap();
    assert_eq!(json_depth(&value), 300);
}

#[test]
fn test_default_breaker_trips_on_parse() {
    let at_limit = format!(
        "{}1{}",
        "[".repeat(SANITIZE_CIRCUIT_BREAKER_DEPTH),
        "]".repeat(SANITIZE_CIRCUIT_BREAKER_DEPTH)
    );
    assert!(parse_and_sanitize(&at_limit, SanitizeOptions::default()).is_ok());

    let past = format!("[{}]", at_limit);
    let err = parse_and_sanitize(&past, SanitizeOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        LoaderError::DepthSanitationExceeded {
            limit: SANITIZE_CIRCUIT_BREAKER_DEPTH
        }
    ));
}

#[test]
fn test_hostile_nesting_is_refused_without_parsing() {
    let raw = "[".repeat(1_000_000);
    let err = parse_and_sanitize(&raw, SanitizeOptions::default()).unwrap_err();
    assert_eq!(
        err.code(),
        crate::error::ErrorCode::DepthSanitationExceeded
    );
}

#[test]
fn test_custom_breaker_applies_to_raw_input() {
    let options = SanitizeOptions::default().with_max_depth(2);
    assert!(parse_and_sanitize(r#"{"a":[1]}"#, options).is_ok());
    let err = parse_and_sanitize(r#"{"a":[[1]]}"#, options).unwrap_err();
    assert!(matches!(err, LoaderError::DepthSanitationExceeded { limit: 2 }));
}

// ==================== Properties ====================

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => "[a-z_]{1,8}",
        1 => prop::sample::select(POLLUTION_KEYS).prop_map(String::from),
    ]
}

fn arb_json() -> impl Strategy<Value = JsonValue> {
    let leaf = prop_oneof![
        Just(JsonValue::Null),
        any::<bool>().prop_map(JsonValue::Bool),
        any::<i64>().prop_map(JsonValue::from),
        "[a-z]{0,8}".prop_map(JsonValue::String),
    ];
    leaf.prop_recursive(6, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(JsonValue::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| JsonValue::Object(entries.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_no_pollution_key_survives(value in arb_json()) {
        let sanitized = sanitize_value(&value, SanitizeOptions::default()).unwrap();
        prop_assert!(!contains_pollution_key(&sanitized));
    }

    #[test]
    fn prop_matches_structural_reference(value in arb_json()) {
        let sanitized = sanitize_value(&value, SanitizeOptions::default()).unwrap();
        prop_assert_eq!(sanitized, strip_reference(&value));
    }

    #[test]
    fn prop_idempotent(value in arb_json()) {
        let once = sanitize_value(&value, SanitizeOptions::default()).unwrap();
        let twice = sanitize_value(&once, SanitizeOptions::default()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_never_deepens(value in arb_json()) {
        let sanitized = sanitize_value(&value, SanitizeOptions::default()).unwrap();
        prop_assert!(json_depth(&sanitized) <= json_depth(&value));
    }
}
