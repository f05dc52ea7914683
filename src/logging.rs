//! Tracing subscriber setup for the binary.
//!
//! Logs go to stderr so stdout carries only command output (`list`, `show`).
//! The filter comes from `RUST_LOG` when set, then `DEARY_LOG_LEVEL`, then the
//! default level (`debug` with `--verbose`).

use crate::constants::{
    DEFAULT_LOG_LEVEL, ENV_VAR_DEARY_LOG_FORMAT, ENV_VAR_DEARY_LOG_LEVEL, LOG_FORMAT_JSON,
    LOG_FORMAT_TEXT,
};
use crate::errors::{AppError, AppResult};
use std::env;
use std::io;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Output format of log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parses `text` or `json` (case-insensitive).
    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            LOG_FORMAT_TEXT => Ok(LogFormat::Text),
            LOG_FORMAT_JSON => Ok(LogFormat::Json),
            other => Err(AppError::Config(format!(
                "Unknown log format '{}'; expected '{}' or '{}'",
                other, LOG_FORMAT_TEXT, LOG_FORMAT_JSON
            ))),
        }
    }

    /// The format from the command line, then `DEARY_LOG_FORMAT`, then text.
    pub fn resolve(cli_choice: Option<&str>) -> AppResult<Self> {
        match cli_choice {
            Some(raw) => Self::parse(raw),
            None => match env::var(ENV_VAR_DEARY_LOG_FORMAT) {
                Ok(raw) => Self::parse(&raw),
                Err(_) => Ok(LogFormat::Text),
            },
        }
    }
}

/// Builds the level filter.
fn build_filter(verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = if verbose {
        "debug".to_string()
    } else {
        env::var(ENV_VAR_DEARY_LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
    };
    EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `AppError::Config` if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat, verbose: bool) -> AppResult<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(io::stderr)
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(false);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };
    result.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))
}
