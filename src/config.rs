/// configuration for the logger and the cache worker, read from json.
///
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// the default log line layout
pub const DEFAULT_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l} {T} {t} - {m}{n}";

/// the default request channel capacity of a cache worker
pub const DEFAULT_CAPACITY: usize = 250;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// a level tag: all, trace, debug, info, warn, error, fatal or off
    pub level: String,
    /// a log4rs pattern encoder layout
    pub pattern: String,
    /// also append to this file when set
    pub file: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: "info".to_string(),
            pattern: DEFAULT_PATTERN.to_string(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// parse a config from json text; missing fields take their defaults
pub fn from_json<T>(text: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let config = serde_json::from_str(text).context("invalid config json")?;
    Ok(config)
}

/// read and parse a json config file
pub fn from_file<T>(path: impl AsRef<Path>) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;
    from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config: LoggerConfig = from_json("{}").expect("empty object should parse");
        assert_eq!(config, LoggerConfig::default());

        let config: CacheConfig = from_json("{}").expect("empty object should parse");
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
    }

    #[test]
    fn logger_config() {
        let text = r#"{"level":"debug","file":"/tmp/util-lib.log"}"#;
        let config: LoggerConfig = from_json(text).expect("should parse");
        assert_eq!(config.level, "debug");
        assert_eq!(config.pattern, DEFAULT_PATTERN);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/util-lib.log")));
    }

    #[test]
    fn bad_json() {
        let result: Result<CacheConfig> = from_json("{capacity:");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file() {
        let result: Result<CacheConfig> = from_file("/no/such/dir/cache.json");
        let msg = format!("{:?}", result.expect_err("should fail"));
        assert!(msg.contains("could not read config file"));
    }
}
