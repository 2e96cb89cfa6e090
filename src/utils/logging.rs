//! Logging infrastructure for MalDetect.
//!
//! Logs go to stderr (colored) or are appended to a file (plain), so
//! stdout stays free for results and `--format json` output.

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use log::{Level, LevelFilter};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Logger settings.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Maximum level emitted
    pub level: LevelFilter,
    /// Append to this file instead of stderr
    pub file_path: Option<PathBuf>,
    /// Prefix lines with local time
    pub timestamps: bool,
    /// Prefix lines with the emitting module
    pub module_path: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            timestamps: true,
            module_path: false,
        }
    }
}

impl LogConfig {
    /// Build from the `logging` section; `verbose_console` raises the level to debug.
    pub fn from_config(config: &Config) -> Self {
        let mut level = parse_level(&config.logging.log_level);
        if config.logging.verbose_console {
            level = level.max(LevelFilter::Debug);
        }

        Self {
            level,
            file_path: config.logging.log_path.clone(),
            module_path: level >= LevelFilter::Debug,
            ..Self::default()
        }
    }

    /// Debug level with module paths, for `--verbose`.
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Debug,
            module_path: true,
            ..Self::default()
        }
    }

    /// Errors only, without timestamps.
    pub fn quiet() -> Self {
        Self {
            level: LevelFilter::Error,
            timestamps: false,
            ..Self::default()
        }
    }

    /// Keep the file target of `self` but take everything else from `other`.
    pub fn overridden_by(self, other: LogConfig) -> Self {
        Self {
            file_path: self.file_path,
            ..other
        }
    }
}

/// Parse a textual level, defaulting to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

fn level_tag(level: Level, colored: bool) -> &'static str {
    match (level, colored) {
        (Level::Error, true) => "\x1b[31mERROR\x1b[0m",
        (Level::Warn, true) => "\x1b[33mWARN \x1b[0m",
        (Level::Info, true) => "\x1b[32mINFO \x1b[0m",
        (Level::Debug, true) => "\x1b[34mDEBUG\x1b[0m",
        (Level::Trace, true) => "\x1b[35mTRACE\x1b[0m",
        (Level::Error, false) => "ERROR",
        (Level::Warn, false) => "WARN ",
        (Level::Info, false) => "INFO ",
        (Level::Debug, false) => "DEBUG",
        (Level::Trace, false) => "TRACE",
    }
}

/// Install the global logger.
pub fn init_logging(config: LogConfig) -> Result<()> {
    let colored = config.file_path.is_none();
    let LogConfig {
        level,
        timestamps,
        module_path,
        ..
    } = config;

    let mut builder = Builder::new();
    builder.filter_level(level).format(move |buf, record| {
        if timestamps {
            write!(buf, "{} ", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        }
        write!(buf, "[{}] ", level_tag(record.level(), colored))?;
        if module_path {
            if let Some(module) = record.module_path() {
                write!(buf, "{}: ", module)?;
            }
        }
        writeln!(buf, "{}", record.args())
    });

    if let Some(path) = &config.file_path {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Error::file_write(dir, e))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| Error::file_write(path, e))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| Error::Internal(format!("Logger already initialized: {}", e)))?;

    log::debug!("Logging initialized at {}", level);
    Ok(())
}
