/// the key-value store capability shared by the cache and document back ends.
///
/// keys ending in `*` ask for every entry under the prefix, e.g. `printer/terminal/*`.
/// An empty result means the key was not found.
///
use serde::{Deserialize, Serialize};

/// marks a key as a prefix scan
pub const WILDCARD: char = '*';

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> KeyValuePair {
        KeyValuePair {
            key: key.into(),
            value: value.into(),
        }
    }
}

pub trait KeyValueStore {
    /// the value (or values, for a wildcard key) stored under `key`
    fn get_value(&self, key: &str) -> Vec<String>;

    /// like `get_value`, but each value is paired with its full key
    fn get_key_value(&self, key: &str) -> Vec<KeyValuePair>;

    /// store `value` under `key`; false if the store refused or is unreachable
    fn set_value(&self, key: &str, value: &str) -> bool;
}

/// the prefix of a wildcard key, or None for a plain key
pub fn wildcard_prefix(key: &str) -> Option<&str> {
    key.strip_suffix(WILDCARD)
}

/// true if `candidate` is selected by `pattern`: every key with the prefix for a wildcard
/// pattern, otherwise only the exact key
pub fn key_matches(pattern: &str, candidate: &str) -> bool {
    match wildcard_prefix(pattern) {
        Some(prefix) => candidate.starts_with(prefix),
        None => candidate == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix() {
        assert_eq!(wildcard_prefix("printer/terminal/*"), Some("printer/terminal/"));
        assert_eq!(wildcard_prefix("*"), Some(""));
        assert_eq!(wildcard_prefix("printer"), None);
    }

    #[test]
    fn matches() {
        assert!(key_matches("printer/*", "printer/terminal"));
        assert!(key_matches("*", "anything"));
        assert!(!key_matches("printer/*", "scanner/terminal"));
        assert!(key_matches("printer", "printer"));
        assert!(!key_matches("printer", "printer/terminal"));
    }
}
