//! # Logging Utilities
//!
//! Logging infrastructure for hostlink built on `tracing`.
//!
//! The adapter usually runs embedded inside a host environment that owns
//! stdout and stderr, so two modes are supported:
//!
//! - **Console mode** for standalone tools (the `hostlink` harness binary):
//!   pretty or JSON output to stdout, optionally teed to a file.
//! - **Embedded mode** for in-process use: file-only output, never
//!   touching the host's streams.
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: level filter (e.g. `debug`, `hostlink_core=trace`)
//! - `HOSTLINK_LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
//! - `HOSTLINK_LOG_FILE`: optional path to tee console logs into
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hostlink_utils::init_logging;
//!
//! init_logging().expect("Failed to initialize logging");
//! tracing::info!("adapter starting");
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default for development)
    Pretty,
    /// JSON format (default for production)
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize console logging with settings from the environment.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the tee file
/// cannot be created.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("HOSTLINK_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or(LogFormat::Pretty);

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    init_console(format, default_level)
}

/// Initialize console logging with an explicit level and format.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the tee file
/// cannot be created.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_console(format, level.into())
}

/// Initialize file-only logging for embedded use.
///
/// Writes to `~/.hostlink/YYYY-MM-DD-hostlink.log` (falling back to
/// `/tmp`) and never touches stdout/stderr, which the host owns. Returns
/// the log file path.
///
/// ## Errors
///
/// Returns an error if logging is already initialized or the log
/// directory cannot be created.
pub fn init_embedded_logging(level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let today = Utc::now().format("%Y-%m-%d");
    let log_file = if let Ok(home) = env::var("HOME") {
        let dir = PathBuf::from(home).join(".hostlink");
        std::fs::create_dir_all(&dir).map_err(LoggingError::FileError)?;
        dir.join(format!("{today}-hostlink.log"))
    } else {
        PathBuf::from("/tmp").join(format!("{today}-hostlink.log"))
    };

    let filter = match level {
        Some(level) => EnvFilter::new(Level::from(level).to_string()),
        None => env_filter(Level::INFO),
    };

    let appender = tracing_appender::rolling::never(
        log_file.parent().unwrap_or(&PathBuf::from(".")),
        log_file.file_name().unwrap_or_default(),
    );
    let layer = fmt_layer(LogFormat::Pretty, appender, false, filter);
    Registry::default().with(layer).init();

    Ok(log_file)
}

fn init_console(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    // Boxed layers only implement Layer<Registry>, so they are composed
    // through a Vec (itself a Layer) instead of chained `with` calls.
    let mut layers = vec![fmt_layer(format, io::stdout, true, env_filter(default_level))];

    // HOSTLINK_LOG_FILE tees the console output into a daily-rolled file.
    if let Some(file_path) = env::var("HOSTLINK_LOG_FILE").ok().map(PathBuf::from) {
        let appender = tracing_appender::rolling::daily(
            file_path.parent().unwrap_or(&PathBuf::from(".")),
            file_path.file_name().unwrap_or_default(),
        );
        layers.push(fmt_layer(format, appender, false, env_filter(default_level)));
    }

    Registry::default().with(layers).init();

    Ok(())
}

/// RUST_LOG can override the default level with more specific filters.
fn env_filter(default_level: Level) -> EnvFilter
{
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
}

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_ansi(ansi)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::rfc_3339())
            .with_current_span(true)
            .with_span_list(true)
            .with_ansi(ansi)
            .with_writer(writer)
            .with_filter(filter)
            .boxed(),
    }
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(LogFormat::from_str("invalid").is_err());
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warn").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("debug").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(LogLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_console_and_file_layers_compose()
    {
        // Builds the same layer stack init_console does, without
        // installing a global subscriber.
        let layers = vec![
            fmt_layer(LogFormat::Pretty, io::stdout, true, env_filter(Level::INFO)),
            fmt_layer(LogFormat::Json, io::stdout, false, env_filter(Level::DEBUG)),
        ];
        let _subscriber = Registry::default().with(layers);
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }
}
