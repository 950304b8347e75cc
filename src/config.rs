//! Runtime settings shared by the binaries

use log::LevelFilter;

use crate::DEFAULT_BUCKETS;

/// Environment variable holding the initial bucket count
pub const BUCKETS_ENV: &str = "ROSTER_BUCKETS";
/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Settings for a roster session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bucket count the roster's table starts with
    pub initial_buckets: usize,
    /// Log level for this crate
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self { initial_buckets: DEFAULT_BUCKETS, log_level: LevelFilter::Info }
    }
}

impl Config {
    /// Builds a config from an optional bucket count and a level name.
    ///
    /// Level names are case-insensitive; unknown names fall back to `info`.
    #[must_use]
    pub fn new(initial_buckets: Option<usize>, log_level: &str) -> Self {
        Self {
            initial_buckets: initial_buckets.unwrap_or(DEFAULT_BUCKETS),
            log_level: parse_level(log_level),
        }
    }
}

/// Parses a level name, defaulting to [`LevelFilter::Info`]
#[must_use]
pub fn parse_level(value: &str) -> LevelFilter {
    value.trim().parse().unwrap_or(LevelFilter::Info)
}
