//! Logging infrastructure for nextgsim
//!
//! This module provides configurable logging using the `tracing` crate,
//! NAS message logging, and hex dump formatting for debugging.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use crate::error::Error;

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    #[default]
    Info,
    /// Warn level
    #[serde(alias = "warning")]
    Warn,
    /// Error level - least verbose
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("unknown log level: {s}")),
        }
    }
}

/// Initialize the tracing subscriber with the specified log level, usually
/// the `log_level` of the loaded configuration.
///
/// The log level can be overridden by the `RUST_LOG` environment variable.
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: LogLevel) -> Result<(), Error> {
    init_logging_with_filter(&level.to_string())
}

/// Initialize logging with a custom filter string.
///
/// ```no_run
/// use nextgsim_common::logging::init_logging_with_filter;
///
/// // Default to info, but trace the procedure layer
/// init_logging_with_filter("info,nextgsim_ue::nas=trace").unwrap();
/// ```
pub fn init_logging_with_filter(filter: &str) -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_span_events(FmtSpan::NONE)
        .try_init()
        .map_err(|e| Error::Config(format!("cannot install log subscriber: {e}")))
}

/// Log a downlink NAS message at debug level with a hex dump at trace level.
pub fn log_nas_message(msg_type: &str, data: &[u8]) {
    tracing::debug!(msg_type = msg_type, len = data.len(), "RX NAS message");
    tracing::trace!(hex = %HexDump(data), "NAS payload");
}

/// Wrapper for hex dump formatting
pub struct HexDump<'a>(pub &'a [u8]);

impl fmt::Display for HexDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}
