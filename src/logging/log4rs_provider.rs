/// a `LogProvider` backed by log4rs.  Messages go through the `log` facade, so the
/// provider and the crate's own `log` macros share one sink.
///
use anyhow::{Context, Result};
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Handle;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{LogLevel, LogProvider};
use crate::config::LoggerConfig;

/// the `log` target of messages written through a provider
pub const LOG_TARGET: &str = "util_lib";

#[derive(Debug, Clone)]
enum ConfigSource {
    Settings(LoggerConfig),
    File(PathBuf),
}

#[derive(Default)]
struct ProviderState {
    handle: Option<Handle>,
    started: bool,
    level: Option<LogLevel>,
}

pub struct Log4rsProvider {
    source: ConfigSource,
    state: Mutex<ProviderState>,
}

impl std::fmt::Debug for Log4rsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log4rsProvider")
            .field("source", &self.source)
            .field("started", &self.is_started())
            .finish()
    }
}

impl Log4rsProvider {
    /// a provider built from logger settings; nothing is installed until `start`
    pub fn new(settings: LoggerConfig) -> Log4rsProvider {
        let level = LogLevel::from_tag(&settings.level);
        Log4rsProvider {
            source: ConfigSource::Settings(settings),
            state: Mutex::new(ProviderState {
                level: Some(level),
                ..ProviderState::default()
            }),
        }
    }

    /// a provider configured by a log4rs yaml (or json) file
    pub fn from_file(path: impl AsRef<Path>) -> Log4rsProvider {
        Log4rsProvider {
            source: ConfigSource::File(path.as_ref().to_path_buf()),
            state: Mutex::new(ProviderState::default()),
        }
    }

    /// install the configuration as the process logger.  Calling it again while started
    /// is a no-op; after `shutdown` the configuration is re-applied.
    pub fn start(&self) -> bool {
        let mut state = self.lock();
        if state.started {
            return true;
        }

        match self.install(&mut state) {
            Ok(()) => {
                state.started = true;
                true
            }
            Err(e) => {
                eprintln!("logger configure problem: {:?}", e);
                false
            }
        }
    }

    pub fn is_started(&self) -> bool {
        self.lock().started
    }

    /// silence the logger; a later `start` brings it back
    pub fn shutdown(&self) {
        let mut state = self.lock();
        if state.started {
            log::logger().flush();
            log::set_max_level(log::LevelFilter::Off);
            state.started = false;
        }
    }

    fn install(&self, state: &mut ProviderState) -> Result<()> {
        let config = self.build(state.level)?;

        match &state.handle {
            Some(handle) => handle.set_config(config),
            None => {
                let handle = log4rs::init_config(config).context("a logger is already set")?;
                state.handle = Some(handle);
            }
        }

        if let Some(level) = state.level {
            log::set_max_level(level.to_level_filter());
        }

        Ok(())
    }

    fn build(&self, level: Option<LogLevel>) -> Result<Config> {
        match &self.source {
            ConfigSource::Settings(settings) => build_config(settings, level.unwrap_or(LogLevel::All)),
            ConfigSource::File(path) => {
                let mut config = log4rs::config::load_config_file(path, Default::default())
                    .with_context(|| format!("could not load log config: {}", path.display()))?;
                if let Some(level) = level {
                    config.root_mut().set_level(level.to_level_filter());
                }
                Ok(config)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogProvider for Log4rsProvider {
    fn set_level(&self, level: LogLevel) -> bool {
        let mut state = self.lock();
        if !state.started {
            eprintln!("call start() first!");
            return false;
        }

        if let Some(handle) = &state.handle {
            match self.build(Some(level)) {
                Ok(config) => handle.set_config(config),
                Err(e) => {
                    eprintln!("set level problem: {:?}", e);
                    return false;
                }
            }
        }

        log::set_max_level(level.to_level_filter());
        state.level = Some(level);
        true
    }

    fn emit(&self, level: LogLevel, message: &str) -> bool {
        if !self.is_started() {
            eprintln!("call start() first!");
            return false;
        }

        // log4rs has no level below debug for the catch-all and trace channels
        let lvl = match level {
            LogLevel::Off => return false,
            LogLevel::All | LogLevel::Trace => log::Level::Debug,
            LogLevel::Fatal => log::Level::Error,
            other => match other.to_level() {
                Some(lvl) => lvl,
                None => return false,
            },
        };

        log::log!(target: LOG_TARGET, lvl, "{}", message);
        true
    }
}

/// a console appender, plus a file appender when a file is configured, under a root at
/// `level`
pub fn build_config(settings: &LoggerConfig, level: LogLevel) -> Result<Config> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(&settings.pattern)))
        .build();

    let mut builder =
        Config::builder().appender(Appender::builder().build("stdout", Box::new(stdout)));
    let mut root = Root::builder().appender("stdout");

    if let Some(path) = &settings.file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(&settings.pattern)))
            .build(path)
            .with_context(|| format!("could not open log file: {}", path.display()))?;
        builder = builder.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = builder
        .build(root.build(level.to_level_filter()))
        .context("invalid log configuration")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_from_settings() {
        let config = build_config(&LoggerConfig::default(), LogLevel::Info).expect("should build");
        assert_eq!(config.root().level(), log::LevelFilter::Info);
        assert_eq!(config.appenders().len(), 1);
    }

    #[test]
    fn config_with_file() {
        let path = std::env::temp_dir().join(format!("util-lib-{}.log", std::process::id()));
        let settings = LoggerConfig {
            file: Some(path.clone()),
            ..LoggerConfig::default()
        };

        let config = build_config(&settings, LogLevel::Fatal).expect("should build");
        assert_eq!(config.appenders().len(), 2);
        assert_eq!(config.root().level(), log::LevelFilter::Error);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn not_started() {
        let provider = Log4rsProvider::new(LoggerConfig::default());
        assert!(!provider.is_started());
        assert!(!provider.info("too early"));
        assert!(!provider.set_level_tag("debug"));
    }

    #[test]
    fn missing_config_file() {
        let provider = Log4rsProvider::from_file("/no/such/dir/log4rs.yaml");
        assert!(!provider.start());
        assert!(!provider.is_started());
    }
}
