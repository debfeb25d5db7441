//! Logging setup for Riff.
//!
//! Everything is written to stderr, and optionally appended to a file.
//! stdout is reserved for tool output: `riff serve` answers on it.
//!
//! Read from the environment:
//!
//! - `RIFF_LOG_LEVEL`: `error`, `warn`, `info`, `debug` or `trace`
//! - `RIFF_LOG_FORMAT`: `pretty` (default), `compact` or `json`
//! - `RIFF_LOG_FILE`: also append to this file, without colors
//! - `RIFF_LOG_SPANS`: `1`/`true` to log span open and close
//!
//! `RUST_LOG` overrides the level with a full filter directive.

#![warn(missing_docs)]

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

pub use tracing::{debug, error, info, trace, warn};

/// How much to log, quietest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Failures only.
    Error,
    /// Failures and recoverable problems.
    Warn,
    /// Operation outcomes.
    #[default]
    Info,
    /// Individual steps.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Parse a level name; `warning` is accepted for `warn`.
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    fn filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::ERROR,
            Self::Warn => LevelFilter::WARN,
            Self::Info => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "info" => Self::Info,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => return Err(LogError::UnknownLevel(s.to_string())),
        })
    }
}

/// Line layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, for people.
    #[default]
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Where and how to log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Level used when `RUST_LOG` is unset.
    pub level: LogLevel,
    /// Line layout for every sink.
    pub format: LogFormat,
    /// Extra sink, appended to.
    pub file: Option<PathBuf>,
    /// Log span open and close.
    pub spans: bool,
}

impl LogConfig {
    /// Read `RIFF_LOG_*` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read `RIFF_LOG_*` through `lookup`. Unknown values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |v: String| v == "1" || v.eq_ignore_ascii_case("true");

        Self {
            level: lookup("RIFF_LOG_LEVEL")
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or_default(),
            format: lookup("RIFF_LOG_FORMAT")
                .map(|v| LogFormat::from_name(&v))
                .unwrap_or_default(),
            file: lookup("RIFF_LOG_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            spans: lookup("RIFF_LOG_SPANS").map(flag).unwrap_or(false),
        }
    }

    /// Replace the level, e.g. from `-v`/`-q`.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    fn sink<W>(&self, writer: W, ansi: bool) -> Box<dyn Layer<Registry> + Send + Sync>
    where
        W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let events = if self.spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_span_events(events);

        match self.format {
            LogFormat::Pretty => layer.boxed(),
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    }
}

/// Install the global subscriber. Fails if one is already set.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(config.level.filter().into()));

    let mut sinks = vec![config.sink(std::io::stderr, true)];
    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError::File {
                path: path.clone(),
                source,
            })?;
        sinks.push(config.sink(Mutex::new(file), false));
    }

    tracing_subscriber::registry()
        .with(sinks)
        .with(filter)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))
}

/// Logging setup errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// A subscriber was already installed, or installing failed.
    #[error("failed to initialize logging: {0}")]
    Init(String),

    /// The log file could not be opened.
    #[error("failed to open log file {}: {source}", path.display())]
    File {
        /// File that was requested.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Not a level name.
    #[error("unknown log level {0:?}")]
    UnknownLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    #[test_case("info", Some(LogLevel::Info))]
    #[test_case("DEBUG", Some(LogLevel::Debug))]
    #[test_case("Warning", Some(LogLevel::Warn))]
    #[test_case(" trace ", Some(LogLevel::Trace))]
    #[test_case("loud", None)]
    fn test_level_names(name: &str, expected: Option<LogLevel>) {
        assert_eq!(LogLevel::parse(name), expected);
    }

    #[test]
    fn test_levels_order_by_verbosity() {
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Debug < LogLevel::Trace);
        assert_eq!(LogLevel::Warn.filter(), LevelFilter::WARN);
    }

    #[test]
    fn test_empty_environment() {
        assert_eq!(LogConfig::from_lookup(|_| None), LogConfig::default());
    }

    #[test]
    fn test_reads_riff_variables() {
        let vars: HashMap<&str, &str> = [
            ("RIFF_LOG_LEVEL", "debug"),
            ("RIFF_LOG_FORMAT", "JSON"),
            ("RIFF_LOG_FILE", "/tmp/riff.log"),
            ("RIFF_LOG_SPANS", "true"),
        ]
        .into_iter()
        .collect();

        let config = LogConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(
            config,
            LogConfig {
                level: LogLevel::Debug,
                format: LogFormat::Json,
                file: Some(PathBuf::from("/tmp/riff.log")),
                spans: true,
            }
        );
    }

    #[test]
    fn test_unknown_values_keep_defaults() {
        let config = LogConfig::from_lookup(|k| match k {
            "RIFF_LOG_LEVEL" => Some("chatty".into()),
            "RIFF_LOG_FORMAT" => Some("xml".into()),
            "RIFF_LOG_FILE" => Some("  ".into()),
            _ => None,
        });
        assert_eq!(config, LogConfig::default());
    }
}
