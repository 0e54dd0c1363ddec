//! Keys that can rewrite shared behaviour when merged into a live object.

pub const POLLUTION_KEYS: &[&str] = &["__proto__", "constructor", "prototype"];

pub fn is_pollution_key(key: &str) -> bool {
    POLLUTION_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        assert!(is_pollution_key("__proto__"));
        assert!(is_pollution_key("constructor"));
        assert!(is_pollution_key("prototype"));

        assert!(!is_pollution_key("__PROTO__"));
        assert!(!is_pollution_key(" prototype"));
        assert!(!is_pollution_key("constructors"));
        assert!(!is_pollution_key(""));
    }
}
