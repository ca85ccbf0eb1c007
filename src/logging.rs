//! Structured logging initialization and configuration
//!
//! Every unit logs through `tracing` with structured fields (`txn_id`, `worker_id`,
//! `route_id`, `next_fn`, ...). This module installs the subscriber behind those macros:
//! - a console sink on **stderr** (stdout may be carrying the transport), JSON or pretty
//! - an optional file sink with its own level threshold, written off-thread through a
//!   non-blocking appender
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `NF_LOG_LEVEL` | `info` | Console threshold: trace/debug/info/warn/error/fatal (`fatal` = `error`). `RUST_LOG` overrides it. |
//! | `NF_LOG_FORMAT` | `json` | `json` or `pretty` |
//! | `NF_LOG_FILE` | unset | Append logs (JSON) to this file as well |
//! | `NF_LOG_FILE_LEVEL` | `trace` | File threshold |
//! | `NF_LOG_INCLUDE_LOCATION` | `false` | Add file:line to each record |

use anyhow::{Context, Result};
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json, // Default to JSON
        }
    }
}

/// Parse a level name. `fatal` has no `tracing` equivalent and maps to `error`.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" | "fatal" => Some(Level::ERROR),
        _ => None,
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Console level: trace/debug/info/warn/error/fatal
    pub log_level: String,
    /// Console format: json/pretty
    pub format: LogFormat,
    /// Optional log file
    pub file: Option<PathBuf>,
    /// File level, independent of the console level
    pub file_level: String,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            file: None,
            file_level: "trace".to_string(),
            include_location: false,
        }
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup (used by `from_env`).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            log_level: lookup("NF_LOG_LEVEL").unwrap_or(defaults.log_level),
            format: lookup("NF_LOG_FORMAT")
                .map(|s| LogFormat::parse(&s))
                .unwrap_or(defaults.format),
            file: lookup("NF_LOG_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            file_level: lookup("NF_LOG_FILE_LEVEL").unwrap_or(defaults.file_level),
            include_location: lookup("NF_LOG_INCLUDE_LOCATION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.include_location),
        }
    }

    /// Console level, falling back to `info` for an unknown name.
    #[must_use]
    pub fn console_level(&self) -> Level {
        parse_level(&self.log_level).unwrap_or(Level::INFO)
    }

    /// File level, falling back to `trace` for an unknown name.
    #[must_use]
    pub fn file_level(&self) -> Level {
        parse_level(&self.file_level).unwrap_or(Level::TRACE)
    }
}

/// Keeps the file sink's background writer alive. Dropping it flushes pending records.
#[must_use = "dropping the guard stops the file sink"]
#[derive(Debug, Default)]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// Install the global subscriber.
///
/// Fails if the log file cannot be opened or a global subscriber is already set.
///
/// # Example
///
/// ```no_run
/// use nf_dispatch::logging::{init_logging_with_config, LogConfig};
///
/// let _guard = init_logging_with_config(&LogConfig::from_env())
///     .expect("Failed to initialize logging");
/// ```
pub fn init_logging_with_config(config: &LogConfig) -> Result<LoggingGuard> {
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(2);
    layers.push(console_layer(config));

    let mut guard = LoggingGuard::default();
    if let Some(path) = &config.file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let (writer, worker_guard) = tracing_appender::non_blocking(file);
        layers.push(
            tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(true)
                .with_thread_names(true)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_writer(writer)
                .with_filter(LevelFilter::from_level(config.file_level()))
                .boxed(),
        );
        guard._file = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(guard)
}

fn console_layer(config: &LogConfig) -> BoxedLayer {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.console_level().as_str()));

    match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_names(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse("PRETTY"), LogFormat::Pretty);
        assert_eq!(LogFormat::parse("invalid"), LogFormat::Json); // Default
    }

    #[test]
    fn test_parse_level_maps_fatal_to_error() {
        assert_eq!(parse_level("fatal"), Some(Level::ERROR));
        assert_eq!(parse_level("ERROR"), Some(Level::ERROR));
        assert_eq!(parse_level(" debug "), Some(Level::DEBUG));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::from_lookup(lookup(&[]));
        assert_eq!(config.console_level(), Level::INFO);
        assert_eq!(config.file_level(), Level::TRACE);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.file.is_none());
        assert!(!config.include_location);
    }

    #[test]
    fn test_log_config_from_lookup() {
        let config = LogConfig::from_lookup(lookup(&[
            ("NF_LOG_LEVEL", "warn"),
            ("NF_LOG_FORMAT", "pretty"),
            ("NF_LOG_FILE", "/tmp/nf.log"),
            ("NF_LOG_FILE_LEVEL", "debug"),
            ("NF_LOG_INCLUDE_LOCATION", "true"),
        ]));
        assert_eq!(config.console_level(), Level::WARN);
        assert_eq!(config.file_level(), Level::DEBUG);
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/nf.log")));
        assert!(config.include_location);
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let config = LogConfig::from_lookup(lookup(&[
            ("NF_LOG_LEVEL", "chatty"),
            ("NF_LOG_FILE_LEVEL", "everything"),
        ]));
        assert_eq!(config.console_level(), Level::INFO);
        assert_eq!(config.file_level(), Level::TRACE);
    }

    #[test]
    fn test_blank_log_file_is_ignored() {
        let config = LogConfig::from_lookup(lookup(&[("NF_LOG_FILE", "  ")]));
        assert!(config.file.is_none());
    }
}
