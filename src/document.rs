/// read-only key-value store over a json document.  Keys are paths into nested
/// objects, segments separated by `/`, e.g. `message_bus/subscribe_topic`; only string
/// leaves are values.
///
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;

use crate::kv::{KeyValuePair, KeyValueStore};
use crate::logging::LogProvider;

pub const SEPARATOR: char = '/';

pub struct DocumentStore {
    logger: Arc<dyn LogProvider>,
    doc: Option<Value>,
}

impl DocumentStore {
    /// parse `text`; on failure the error is logged and every lookup misses
    pub fn new(logger: Arc<dyn LogProvider>, text: &str) -> DocumentStore {
        let doc = match DocumentStore::parse(text) {
            Ok(doc) => Some(doc),
            Err(e) => {
                logger.error(&format!("failed to parse input json text: {}, {:#}", text, e));
                None
            }
        };

        DocumentStore { logger, doc }
    }

    pub fn parse(text: &str) -> Result<Value> {
        let doc = serde_json::from_str(text).context("invalid json document")?;
        Ok(doc)
    }

    pub fn is_initialized(&self) -> bool {
        self.doc.is_some()
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let doc = self.doc.as_ref()?;
        if key.is_empty() {
            return None;
        }

        let mut segments: Vec<&str> = key.split(SEPARATOR).filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            segments.push(key);
        }

        let mut value = doc.get(segments[0])?;
        let mut parsed = segments[0].to_string();

        for segment in &segments[1..] {
            if !value.is_object() {
                break;
            }

            parsed.push(SEPARATOR);
            parsed.push_str(segment);
            match value.get(segment) {
                Some(v) => value = v,
                None => {
                    self.logger.warn(&format!("no match for nested key: {}", parsed));
                    return None;
                }
            }
        }

        // the whole key must have been consumed, so "a//b" or "a/b/" never hit
        match value {
            Value::String(s) if parsed == key => {
                self.logger.debug(&format!("found {}='{}'", parsed, s));
                Some(s.clone())
            }
            _ => None,
        }
    }
}

impl KeyValueStore for DocumentStore {
    fn get_value(&self, key: &str) -> Vec<String> {
        self.lookup(key).into_iter().collect()
    }

    /// not supported by documents
    fn get_key_value(&self, _key: &str) -> Vec<KeyValuePair> {
        vec![]
    }

    /// documents are read-only
    fn set_value(&self, _key: &str, _value: &str) -> bool {
        false
    }
}
