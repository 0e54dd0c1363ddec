#![no_main]

use libfuzzer_sys::fuzz_target;
use safe_json_loader::{is_pollution_key, json_depth, parse_and_sanitize, SanitizeOptions};
use serde_json::Value;

fn assert_clean(value: &Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                assert!(!is_pollution_key(key), "pollution key survived: {}", key);
                assert_clean(child);
            }
        }
        Value::Array(items) => items.iter().for_each(assert_clean),
        _ => {}
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let options = SanitizeOptions::default().with_max_depth(64);
    if let Ok(clean) = parse_and_sanitize(input, options) {
        assert_clean(&clean);
        assert!(json_depth(&clean) <= 64);
    }
});
