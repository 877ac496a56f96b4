//! Rolling file logs for the newsfeed core.
//!
//! # Responsibility
//! - Start the process-wide `flexi_logger` backend from [`LogSettings`].
//! - Report panics through the log before the default hook runs.
//!
//! # Invariants
//! - At most one backend per process; repeating the same settings is a no-op.
//! - Log lines are `event=... module=... status=...` metadata. Tweet and
//!   comment bodies are never logged; panic payloads are flattened and cut.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Once;

const LOG_FILE_BASENAME: &str = "newsfeed";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 7;
const PANIC_PAYLOAD_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: Once = Once::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    InvalidLevel(String),
    InvalidDirectory { dir: PathBuf, reason: String },
    Backend(String),
    /// A logger with different settings is already running.
    AlreadyActive { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory { dir, reason } => {
                write!(f, "unusable log directory `{}`: {reason}", dir.display())
            }
            Self::Backend(message) => write!(f, "logger backend failed: {message}"),
            Self::AlreadyActive { active } => write!(
                f,
                "logging already active with level {} in `{}`",
                level_name(active.level),
                active.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {}

/// Where and how verbosely the core logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Absolute directory holding `newsfeed*.log` files.
    pub dir: PathBuf,
    /// Also print warnings and errors to stderr.
    pub echo_warnings: bool,
}

impl LogSettings {
    pub fn new(level: &str, dir: impl Into<PathBuf>) -> Result<Self, LoggingError> {
        let dir = dir.into();
        if dir.as_os_str().is_empty() || !dir.is_absolute() {
            return Err(LoggingError::InvalidDirectory {
                dir,
                reason: "must be a non-empty absolute path".to_string(),
            });
        }
        Ok(Self {
            level: parse_level(level)?,
            dir,
            echo_warnings: false,
        })
    }

    /// Settings from config; `None` when no log directory is configured.
    pub fn from_config(config: &CoreConfig) -> Option<Result<Self, LoggingError>> {
        config
            .log_dir
            .as_ref()
            .map(|dir| Self::new(&config.log_level, dir.clone()))
    }

    pub fn echo_warnings(mut self, enabled: bool) -> Self {
        self.echo_warnings = enabled;
        self
    }
}

/// Starts file logging for the process.
///
/// # Errors
/// - `InvalidDirectory` when the directory cannot be created.
/// - `Backend` when `flexi_logger` refuses to start.
/// - `AlreadyActive` when a logger with other settings is running.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let active = ACTIVE.get_or_try_init(|| start_backend(settings))?;
    if active.settings != *settings {
        return Err(LoggingError::AlreadyActive {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Parses a level name; `warning` is accepted for `warn`.
pub(crate) fn parse_level(value: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("warning") {
        return Ok(LevelFilter::Warn);
    }
    match trimmed.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::InvalidLevel(trimmed.to_string())),
        Ok(level) => Ok(level),
    }
}

pub(crate) fn level_name(level: LevelFilter) -> &'static str {
    match level {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

fn start_backend(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|err| LoggingError::InvalidDirectory {
        dir: settings.dir.clone(),
        reason: err.to_string(),
    })?;

    let duplicate = if settings.echo_warnings {
        Duplicate::Warn
    } else {
        Duplicate::None
    };
    let handle = Logger::try_with_str(level_name(settings.level))
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .duplicate_to_stderr(duplicate)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    PANIC_HOOK.call_once(install_panic_hook);
    info!(
        "event=logging_init module=logging status=ok level={} log_dir={} version={}",
        level_name(settings.level),
        settings.dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(panic_info);
    }));
}

/// Flattens newlines and cuts to `limit` chars so one event stays one line.
fn one_line(value: &str, limit: usize) -> String {
    let mut flat: String = value
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .take(limit)
        .collect();
    if value.chars().count() > limit {
        flat.push_str("...");
    }
    flat
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level("DEBUG").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level(" warning ").unwrap(), LevelFilter::Warn);
        assert!(matches!(parse_level("off"), Err(LoggingError::InvalidLevel(_))));
        assert!(matches!(parse_level("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn settings_require_absolute_directory() {
        assert!(matches!(
            LogSettings::new("info", "logs/dev"),
            Err(LoggingError::InvalidDirectory { .. })
        ));
        assert!(matches!(
            LogSettings::new("info", ""),
            Err(LoggingError::InvalidDirectory { .. })
        ));
    }

    #[test]
    fn settings_follow_config() {
        let mut config = CoreConfig::default();
        assert!(LogSettings::from_config(&config).is_none());

        config.log_dir = Some(std::env::temp_dir());
        config.log_level = "warn".to_string();
        let settings = LogSettings::from_config(&config).unwrap().unwrap();
        assert_eq!(settings.level, LevelFilter::Warn);
        assert!(!settings.echo_warnings);
    }

    #[test]
    fn one_line_flattens_and_cuts() {
        assert_eq!(one_line("a\nb\rc", 10), "a b c");
        assert_eq!(one_line("abcdef", 3), "abc...");
    }

    #[test]
    fn init_is_idempotent_and_rejects_other_settings() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let settings = LogSettings::new("info", first.path()).unwrap();

        init_logging(&settings).unwrap();
        init_logging(&settings).unwrap();

        let louder = LogSettings::new("debug", first.path()).unwrap();
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::AlreadyActive { .. })
        ));
        let elsewhere = LogSettings::new("info", second.path()).unwrap();
        assert!(matches!(
            init_logging(&elsewhere),
            Err(LoggingError::AlreadyActive { .. })
        ));

        assert_eq!(logging_status(), Some(settings));
    }
}
