//! Structured logging setup using tracing.
//!
//! The embedding shell calls [`init`] once at startup and holds the
//! returned guard for the process lifetime. Console output is
//! human-readable; the optional file output is JSON with rotation, so a
//! device log can be pulled and inspected after the fact.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration options.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files are stored.
    pub log_directory: PathBuf,
    /// Log file name prefix (e.g. "vidvault" -> "vidvault.2024-01-15.log").
    pub log_file_prefix: String,
    /// Maximum log level for console output.
    pub console_level: Level,
    /// Maximum log level for file output.
    pub file_level: Level,
    /// How often to rotate log files.
    pub rotation: LogRotation,
    /// Whether to write the JSON file log at all.
    pub file_output: bool,
    /// Include file/line and target in console output (development runs).
    pub verbose_console: bool,
}

/// Log rotation frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    /// Create a new log file every hour.
    Hourly,
    /// Create a new log file every day.
    Daily,
    /// Never rotate (single log file).
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LoggingConfig {
    /// Verbose configuration for development runs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "vidvault".to_string(),
            console_level: Level::DEBUG,
            file_level: Level::TRACE,
            rotation: LogRotation::Hourly,
            file_output: true,
            verbose_console: true,
        }
    }

    /// Quiet configuration for production builds.
    #[must_use]
    pub fn production() -> Self {
        Self {
            log_directory: default_log_directory(),
            log_file_prefix: "vidvault".to_string(),
            console_level: Level::INFO,
            file_level: Level::DEBUG,
            rotation: LogRotation::Daily,
            file_output: true,
            verbose_console: false,
        }
    }

    /// Pick a configuration based on build type.
    #[must_use]
    pub fn auto() -> Self {
        if cfg!(debug_assertions) {
            Self::development()
        } else {
            Self::production()
        }
    }

    /// Set the log directory.
    #[must_use]
    pub fn with_log_directory(mut self, path: PathBuf) -> Self {
        self.log_directory = path;
        self
    }

    /// Disable the file log entirely (console only).
    #[must_use]
    pub const fn console_only(mut self) -> Self {
        self.file_output = false;
        self
    }
}

/// Guard that keeps file logging active. Drop this to flush and close log
/// files.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize the logging system with the given configuration.
///
/// Returns a guard that must be kept alive for the duration of the
/// application; dropping it flushes pending log entries to disk.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
///
/// # Panics
///
/// Panics if logging has already been initialized in this process.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn").add_directive(
            format!("vidvault_core={}", level_directive(config.console_level))
                .parse()
                .expect("valid directive"),
        )
    });

    let console_layer = fmt::layer()
        .with_target(config.verbose_console)
        .with_file(config.verbose_console)
        .with_line_number(config.verbose_console)
        .with_filter(console_filter);

    let (file_layer, file_guard) = if config.file_output {
        if !config.log_directory.exists() {
            std::fs::create_dir_all(&config.log_directory).map_err(|e| {
                LoggingError::DirectoryCreationFailed {
                    path: config.log_directory.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        let appender = RollingFileAppender::new(
            config.rotation.into(),
            &config.log_directory,
            &config.log_file_prefix,
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        let file_filter = EnvFilter::new("warn").add_directive(
            format!("vidvault_core={}", level_directive(config.file_level))
                .parse()
                .expect("valid directive"),
        );
        let layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .json()
            .with_filter(file_filter);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Initialize logging with automatic configuration detection.
///
/// # Errors
///
/// Returns an error if initialization fails.
///
/// # Panics
///
/// Panics if logging has already been initialized in this process.
pub fn init_auto() -> Result<LoggingGuard, LoggingError> {
    init(&LoggingConfig::auto())
}

/// Get the default log directory.
#[must_use]
pub fn default_log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vidvault")
        .join("logs")
}

/// Convert a tracing Level to a filter directive string.
const fn level_directive(level: Level) -> &'static str {
    match level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warn",
        Level::ERROR => "error",
    }
}

/// Errors that can occur during logging initialization.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to create the log directory.
    #[error("Failed to create log directory {path}: {reason}")]
    DirectoryCreationFailed {
        /// The path that could not be created.
        path: PathBuf,
        /// The reason for the failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_production() {
        let config = LoggingConfig::default();
        assert_eq!(config.console_level, Level::INFO);
        assert_eq!(config.rotation, LogRotation::Daily);
        assert!(!config.verbose_console);
    }

    #[test]
    fn test_development_config_is_verbose() {
        let config = LoggingConfig::development();
        assert_eq!(config.console_level, Level::DEBUG);
        assert_eq!(config.file_level, Level::TRACE);
        assert!(config.verbose_console);
    }

    #[test]
    fn test_console_only_disables_file_output() {
        let config = LoggingConfig::production().console_only();
        assert!(!config.file_output);
    }

    #[test]
    fn test_log_rotation_conversion() {
        assert!(Rotation::from(LogRotation::Hourly) == Rotation::HOURLY);
        assert!(Rotation::from(LogRotation::Daily) == Rotation::DAILY);
        assert!(Rotation::from(LogRotation::Never) == Rotation::NEVER);
    }

    #[test]
    fn test_default_log_directory_is_app_scoped() {
        let dir = default_log_directory();
        assert!(dir.to_string_lossy().contains("vidvault"));
        assert!(dir.ends_with("logs"));
    }
}
