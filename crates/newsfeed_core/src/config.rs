//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Collect database and logging settings from the environment.
//! - Fall back to defaults on missing or malformed values and say which
//!   values were replaced.
//!
//! # Invariants
//! - Loading configuration never fails and never panics.
//! - Loading never logs by itself. Fallbacks are returned so the host can
//!   report them once its logger is running.

use crate::db::DbOptions;
use crate::logging::{level_name, parse_level};
use log::warn;
use std::collections::HashMap;
use std::env;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "NEWSFEED_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NEWSFEED_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NEWSFEED_LOG_DIR";
pub const ENV_BUSY_TIMEOUT_MS: &str = "NEWSFEED_BUSY_TIMEOUT_MS";
pub const ENV_FEED_PAGE_SIZE: &str = "NEWSFEED_FEED_PAGE_SIZE";

const DEFAULT_DB_PATH: &str = "newsfeed.sqlite3";
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_FEED_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// Rolling log directory. Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub busy_timeout_ms: u64,
    pub feed_page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
        }
    }
}

/// A malformed setting that was replaced by its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFallback {
    pub key: &'static str,
    pub raw: String,
    pub reason: String,
}

impl Display for ConfigFallback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid {} value `{}`: {}; using default",
            self.key, self.raw, self.reason
        )
    }
}

impl CoreConfig {
    /// Reads `NEWSFEED_*` variables and logs any fallbacks right away.
    ///
    /// Hosts that start logging from this config should call [`Self::load_env`]
    /// and [`report_fallbacks`] after `init_logging` instead.
    pub fn from_env() -> Self {
        let (config, fallbacks) = Self::load_env();
        report_fallbacks(&fallbacks);
        config
    }

    /// Builds a config from explicit key/value pairs, logging fallbacks.
    pub fn from_map(values: &HashMap<String, String>) -> Self {
        let (config, fallbacks) = Self::load_map(values);
        report_fallbacks(&fallbacks);
        config
    }

    /// Reads `NEWSFEED_*` variables without logging.
    pub fn load_env() -> (Self, Vec<ConfigFallback>) {
        Self::load(|key| env::var(key).ok())
    }

    pub fn load_map(values: &HashMap<String, String>) -> (Self, Vec<ConfigFallback>) {
        Self::load(|key| values.get(key).cloned())
    }

    fn load(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<ConfigFallback>) {
        let defaults = Self::default();
        let mut fallbacks = Vec::new();

        let log_level = match lookup(ENV_LOG_LEVEL) {
            Some(raw) => match parse_level(&raw) {
                Ok(level) => level_name(level).to_string(),
                Err(err) => {
                    fallbacks.push(ConfigFallback {
                        key: ENV_LOG_LEVEL,
                        reason: err.to_string(),
                        raw,
                    });
                    defaults.log_level
                }
            },
            None => defaults.log_level,
        };
        let busy_timeout_ms = parse_or(
            &lookup,
            ENV_BUSY_TIMEOUT_MS,
            defaults.busy_timeout_ms,
            &mut fallbacks,
        );
        let feed_page_size = parse_or(
            &lookup,
            ENV_FEED_PAGE_SIZE,
            defaults.feed_page_size,
            &mut fallbacks,
        );

        let config = Self {
            db_path: lookup(ENV_DB_PATH)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            log_level,
            log_dir: lookup(ENV_LOG_DIR)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
            busy_timeout_ms,
            feed_page_size,
        };
        (config, fallbacks)
    }

    pub fn db_options(&self) -> DbOptions {
        DbOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
            ..DbOptions::default()
        }
    }
}

/// Emits one `config_fallback` warning per replaced setting.
pub fn report_fallbacks(fallbacks: &[ConfigFallback]) {
    for fallback in fallbacks {
        warn!(
            "event=config_fallback module=config status=warn key={} value={:?} reason={:?}",
            fallback.key, fallback.raw, fallback.reason
        );
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
    fallbacks: &mut Vec<ConfigFallback>,
) -> T
where
    T: FromStr,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(err) => {
            fallbacks.push(ConfigFallback {
                key,
                reason: err.to_string(),
                raw,
            });
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> CoreConfig {
        let values = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CoreConfig::from_map(&values)
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(config(&[]), CoreConfig::default());
    }

    #[test]
    fn values_are_read_and_normalized() {
        let cfg = config(&[
            (ENV_DB_PATH, "/tmp/feed.db"),
            (ENV_LOG_LEVEL, "WARNING"),
            (ENV_LOG_DIR, "/tmp/logs"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_FEED_PAGE_SIZE, "50"),
        ]);
        assert_eq!(cfg.db_path, PathBuf::from("/tmp/feed.db"));
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/logs")));
        assert_eq!(cfg.db_options().busy_timeout, Duration::from_millis(250));
        assert_eq!(cfg.feed_page_size, 50);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let cfg = config(&[
            (ENV_LOG_LEVEL, "chatty"),
            (ENV_BUSY_TIMEOUT_MS, "soon"),
            (ENV_FEED_PAGE_SIZE, "-3"),
        ]);
        let defaults = CoreConfig::default();
        assert_eq!(cfg.log_level, defaults.log_level);
        assert_eq!(cfg.busy_timeout_ms, defaults.busy_timeout_ms);
        assert_eq!(cfg.feed_page_size, defaults.feed_page_size);
    }

    #[test]
    fn loading_reports_each_replaced_value() {
        let values: HashMap<String, String> = [
            (ENV_LOG_LEVEL, "chatty"),
            (ENV_BUSY_TIMEOUT_MS, "soon"),
            (ENV_FEED_PAGE_SIZE, "50"),
            (ENV_DB_PATH, "/tmp/feed.db"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let (cfg, fallbacks) = CoreConfig::load_map(&values);

        assert_eq!(cfg.feed_page_size, 50);
        let keys: Vec<&str> = fallbacks.iter().map(|fallback| fallback.key).collect();
        assert_eq!(keys, vec![ENV_LOG_LEVEL, ENV_BUSY_TIMEOUT_MS]);
        assert_eq!(fallbacks[1].raw, "soon");
        assert!(fallbacks[1].to_string().contains(ENV_BUSY_TIMEOUT_MS));
    }

    #[test]
    fn well_formed_values_report_nothing() {
        let (_, fallbacks) = CoreConfig::load_map(&HashMap::new());
        assert!(fallbacks.is_empty());
    }
}
