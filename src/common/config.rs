//! Runtime configuration loaded from the process environment.

use std::env;
use std::str::FromStr;

use log::LevelFilter;

/// Stream the JSON logger writes to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl FromStr for LogStream {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(()),
        }
    }
}

/// Snapshot of configuration values consumed by the core.
#[derive(Clone, Debug)]
pub struct AppCfg {
    pub log_level: LevelFilter,
    pub log_stream: LogStream,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            log_stream: LogStream::Stderr,
        }
    }
}

impl AppCfg {
    /// Create a configuration snapshot from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a snapshot from an arbitrary key lookup. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            log_level: lookup("TRAINGUARD_LOG_LEVEL")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.log_level),
            log_stream: lookup("TRAINGUARD_LOG_STREAM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.log_stream),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let cfg = AppCfg::from_lookup(|_| None);
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert_eq!(cfg.log_stream, LogStream::Stderr);
    }

    #[test]
    fn parses_level_and_stream() {
        let cfg = AppCfg::from_lookup(|key| match key {
            "TRAINGUARD_LOG_LEVEL" => Some("debug".to_string()),
            "TRAINGUARD_LOG_STREAM" => Some("STDOUT".to_string()),
            _ => None,
        });
        assert_eq!(cfg.log_level, LevelFilter::Debug);
        assert_eq!(cfg.log_stream, LogStream::Stdout);
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = AppCfg::from_lookup(|key| match key {
            "TRAINGUARD_LOG_LEVEL" => Some("loud".to_string()),
            "TRAINGUARD_LOG_STREAM" => Some("syslog".to_string()),
            _ => None,
        });
        assert_eq!(cfg.log_level, LevelFilter::Info);
        assert_eq!(cfg.log_stream, LogStream::Stderr);
    }
}
