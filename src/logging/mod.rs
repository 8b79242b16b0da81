/// leveled logging capability.  Levels follow the log4j family; each level's code is a
/// bit mask that contains every less verbose level, so `threshold & level == level`
/// decides whether a message passes.
///
/// text is utf-8 throughout; utf-16 input is transcoded once with `from_wide`.
///
pub mod log4rs_provider;

pub use log4rs_provider::Log4rsProvider;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, OnceLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum LogLevel {
    Off = 0x00,
    Fatal = 0x01,
    Error = 0x03,
    Warn = 0x07,
    Info = 0x0F,
    Debug = 0x1F,
    Trace = 0x3F,
    All = 0x7F,
}

// tag -> level, built once on first use
fn level_tags() -> &'static HashMap<&'static str, LogLevel> {
    static TAGS: OnceLock<HashMap<&'static str, LogLevel>> = OnceLock::new();
    TAGS.get_or_init(|| {
        [
            ("all", LogLevel::All),
            ("trace", LogLevel::Trace),
            ("debug", LogLevel::Debug),
            ("info", LogLevel::Info),
            ("warn", LogLevel::Warn),
            ("error", LogLevel::Error),
            ("fatal", LogLevel::Fatal),
            ("off", LogLevel::Off),
        ]
        .into_iter()
        .collect()
    })
}

impl LogLevel {
    pub const ALL_LEVELS: [LogLevel; 8] = [
        LogLevel::All,
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
        LogLevel::Off,
    ];

    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn from_code(code: i32) -> Option<LogLevel> {
        LogLevel::ALL_LEVELS
            .into_iter()
            .find(|level| level.code() == code)
    }

    /// exact, case sensitive match on the lowercase tag; anything else is `All`
    pub fn from_tag(tag: &str) -> LogLevel {
        level_tags().get(tag).copied().unwrap_or(LogLevel::All)
    }

    pub fn tag(self) -> &'static str {
        match self {
            LogLevel::All => "all",
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
            LogLevel::Off => "off",
        }
    }

    /// true if a message at `level` passes this threshold
    pub fn enables(self, level: LogLevel) -> bool {
        level != LogLevel::Off && self.code() & level.code() == level.code()
    }

    /// the `log` crate filter for this threshold
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Fatal | LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace | LogLevel::All => log::LevelFilter::Trace,
        }
    }

    /// the `log` crate level a message at this level is written with
    pub fn to_level(self) -> Option<log::Level> {
        self.to_level_filter().to_level()
    }
}

/// transcode utf-16 text for the logger; invalid code units become U+FFFD
pub fn from_wide(text: &[u16]) -> String {
    String::from_utf16_lossy(text)
}

pub trait LogProvider: Send + Sync {
    /// change the threshold; false if the sink could not apply it
    fn set_level(&self, level: LogLevel) -> bool;

    /// write one message; false if the sink is not ready or dropped the message
    fn emit(&self, level: LogLevel, message: &str) -> bool;

    fn set_level_tag(&self, tag: &str) -> bool {
        self.set_level(LogLevel::from_tag(tag))
    }

    /// an unknown numeric code is rejected
    fn set_level_code(&self, code: i32) -> bool {
        match LogLevel::from_code(code) {
            Some(level) => self.set_level(level),
            None => false,
        }
    }

    fn log(&self, message: &str) -> bool {
        self.emit(LogLevel::All, message)
    }

    fn trace(&self, message: &str) -> bool {
        self.emit(LogLevel::Trace, message)
    }

    fn debug(&self, message: &str) -> bool {
        self.emit(LogLevel::Debug, message)
    }

    fn info(&self, message: &str) -> bool {
        self.emit(LogLevel::Info, message)
    }

    fn warn(&self, message: &str) -> bool {
        self.emit(LogLevel::Warn, message)
    }

    fn error(&self, message: &str) -> bool {
        self.emit(LogLevel::Error, message)
    }

    fn fatal(&self, message: &str) -> bool {
        self.emit(LogLevel::Fatal, message)
    }
}

/// keeps every message that passes the threshold; for embedding apps that collect
/// their own log lines, and for tests
#[derive(Debug)]
pub struct MemoryLogger {
    level: Mutex<LogLevel>,
    records: Mutex<Vec<(LogLevel, String)>>,
}

impl Default for MemoryLogger {
    fn default() -> Self {
        MemoryLogger::new(LogLevel::All)
    }
}

impl MemoryLogger {
    pub fn new(level: LogLevel) -> MemoryLogger {
        MemoryLogger {
            level: Mutex::new(level),
            records: Mutex::new(vec![]),
        }
    }

    pub fn level(&self) -> LogLevel {
        *self.level.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// a copy of the recorded (level, message) pairs, oldest first
    pub fn records(&self) -> Vec<(LogLevel, String)> {
        self.records.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// the recorded messages at exactly `level`
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(lvl, _)| *lvl == level)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl LogProvider for MemoryLogger {
    fn set_level(&self, level: LogLevel) -> bool {
        *self.level.lock().unwrap_or_else(|e| e.into_inner()) = level;
        true
    }

    fn emit(&self, level: LogLevel, message: &str) -> bool {
        if !self.level().enables(level) {
            return false;
        }

        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        assert_eq!(LogLevel::from_tag("trace"), LogLevel::Trace);
        assert_eq!(LogLevel::from_tag("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_tag("info"), LogLevel::Info);
        assert_eq!(LogLevel::from_tag("warn"), LogLevel::Warn);
        assert_eq!(LogLevel::from_tag("error"), LogLevel::Error);
        assert_eq!(LogLevel::from_tag("fatal"), LogLevel::Fatal);
        assert_eq!(LogLevel::from_tag("off"), LogLevel::Off);

        // case sensitive, everything else is all
        assert_eq!(LogLevel::from_tag("all"), LogLevel::All);
        assert_eq!(LogLevel::from_tag("INFO"), LogLevel::All);
        assert_eq!(LogLevel::from_tag(""), LogLevel::All);

        for level in LogLevel::ALL_LEVELS {
            assert_eq!(LogLevel::from_tag(level.tag()), level);
        }
    }

    #[test]
    fn codes() {
        assert_eq!(LogLevel::All.code(), 0x7F);
        assert_eq!(LogLevel::Info.code(), 0x0F);
        assert_eq!(LogLevel::Off.code(), 0);
        assert_eq!(LogLevel::from_code(0x1F), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_code(0x10), None);
    }

    #[test]
    fn ordering() {
        let levels = LogLevel::ALL_LEVELS;
        assert!(levels.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn enables() {
        assert!(LogLevel::Info.enables(LogLevel::Warn));
        assert!(LogLevel::Info.enables(LogLevel::Info));
        assert!(!LogLevel::Info.enables(LogLevel::Debug));
        assert!(LogLevel::All.enables(LogLevel::All));
        assert!(!LogLevel::Off.enables(LogLevel::Fatal));
        assert!(!LogLevel::All.enables(LogLevel::Off));
    }

    #[test]
    fn level_filters() {
        assert_eq!(LogLevel::Fatal.to_level_filter(), log::LevelFilter::Error);
        assert_eq!(LogLevel::All.to_level(), Some(log::Level::Trace));
        assert_eq!(LogLevel::Off.to_level(), None);
    }

    #[test]
    fn wide_text() {
        let wide: Vec<u16> = "wide text ✓".encode_utf16().collect();
        assert_eq!(from_wide(&wide), "wide text ✓");
        assert_eq!(from_wide(&[0xD800]), "\u{FFFD}");
    }

    #[test]
    fn memory_logger() {
        let logger = MemoryLogger::new(LogLevel::Info);
        assert!(logger.info("started"));
        assert!(!logger.debug("hidden"));
        assert!(logger.fatal("boom"));

        assert!(logger.set_level_tag("debug"));
        assert_eq!(logger.level(), LogLevel::Debug);
        assert!(logger.debug("visible"));
        assert!(!logger.trace("still hidden"));

        assert!(!logger.set_level_code(0x42));
        assert!(logger.set_level_code(0x00));
        assert!(!logger.error("muted"));

        let wide: Vec<u16> = "from utf16".encode_utf16().collect();
        logger.set_level(LogLevel::All);
        assert!(logger.warn(&from_wide(&wide)));

        assert_eq!(logger.records().len(), 4);
        assert_eq!(logger.messages(LogLevel::Debug), vec!["visible".to_string()]);
        assert_eq!(logger.messages(LogLevel::Warn), vec!["from utf16".to_string()]);
    }
}
