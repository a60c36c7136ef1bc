//! TOML configuration for the rackwatch CLI.

use std::path::Path;
use std::time::Duration;

use rackwatch_audit::WaiterConfig;
use serde::Deserialize;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Audit and convergence tuning.
    pub audit: AuditSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[audit]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuditSection {
    /// Seconds between convergence polls of one file.
    pub poll_interval_secs: u64,
    /// Give up waiting on a file after this many seconds. Unset waits
    /// indefinitely.
    pub max_wait_secs: Option<u64>,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
            max_wait_secs: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"warn"`).
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CliConfig {
    /// Load config from a TOML file, or defaults if no path given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                let config: CliConfig = toml::from_str(&content)?;
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Convergence-waiter settings derived from the `[audit]` section.
    pub fn waiter_config(&self) -> WaiterConfig {
        WaiterConfig {
            poll_interval: Duration::from_secs(self.audit.poll_interval_secs),
            max_wait: self.audit.max_wait_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.audit.poll_interval_secs, 10);
        assert_eq!(config.audit.max_wait_secs, None);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: CliConfig = toml::from_str(
            r#"
            [audit]
            poll_interval_secs = 2
            max_wait_secs = 600

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.audit.poll_interval_secs, 2);
        assert_eq!(config.audit.max_wait_secs, Some(600));
        assert_eq!(config.waiter_config().poll_interval, Duration::from_secs(2));
        assert_eq!(config.log.level, "debug");
    }
}
