use serde::{Deserialize, Serialize};

use crate::Level;

/// Environment variables that enable pretty mode at first initialization.
pub const PRETTY_ENV_VARS: [&str; 2] = ["PRETTY_LOGGER", "PRETTY_LOG"];

/// Configuration for a [`Registry`](crate::Registry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Human-readable output instead of JSON
    #[serde(default)]
    pub pretty: bool,
    /// Minimum level that gets emitted
    #[serde(default)]
    pub level: Level,
    /// Stamp every record with the current time
    #[serde(default = "default_timestamp")]
    pub timestamp: bool,
    /// Output destination; `None` picks stderr for pretty mode and stdout otherwise
    #[serde(default)]
    pub target: Option<Target>,
}

impl LogConfig {
    /// Create a new LogConfig with defaults
    pub fn new() -> Self {
        Self {
            pretty: false,
            level: Level::default(),
            timestamp: default_timestamp(),
            target: None,
        }
    }

    /// Enable pretty output
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Set minimum level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Enable or disable the automatic timestamp
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set output destination
    pub fn with_target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn default_timestamp() -> bool {
    true
}

/// Where records are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Stdout,
    Stderr,
    /// Forward records to the `tracing` dispatcher
    Tracing,
    /// Append to a file (no rotation)
    #[cfg(feature = "file")]
    File { path: std::path::PathBuf },
}

/// Whether an environment toggle value switches pretty mode on.
pub(crate) fn is_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Looks up one environment variable.
pub(crate) type EnvLookup = fn(&str) -> Option<String>;

pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Reads [`PRETTY_ENV_VARS`]; either one set to `true` enables pretty mode.
pub(crate) fn pretty_from_env(lookup: EnvLookup) -> bool {
    PRETTY_ENV_VARS
        .iter()
        .any(|name| is_enabled(lookup(name).as_deref()))
}
