//! Configuration for the enforcement engine

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default sweep interval: every 6 hours
const DEFAULT_INTERVAL_SECONDS: u64 = 21_600;

/// Enforcement engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnforcementConfig {
    /// Service name
    pub service_name: String,

    /// Seconds between scheduled sweeps
    pub interval_seconds: u64,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            service_name: "enforcement-engine".to_string(),
            interval_seconds: DEFAULT_INTERVAL_SECONDS,
        }
    }
}

impl EnforcementConfig {
    /// Load from a toml file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: EnforcementConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults, then apply environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = EnforcementConfig::default();

        if let Ok(interval) = std::env::var("ENFORCEMENT_INTERVAL_SECS") {
            config.interval_seconds = interval
                .parse()
                .map_err(|e| Error::Config(format!("invalid ENFORCEMENT_INTERVAL_SECS: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_seconds == 0 {
            return Err(Error::Config(
                "interval_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_interval_is_six_hours() {
        let config = EnforcementConfig::default();
        assert_eq!(config.interval_seconds, 21_600);
    }

    #[test]
    fn zero_interval_rejected() {
        let config = EnforcementConfig {
            interval_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_toml() {
        let parsed: EnforcementConfig = toml::from_str(
            r#"
            service_name = "enforcement-engine"
            interval_seconds = 3600
            "#,
        )
        .unwrap();
        assert_eq!(parsed.interval_seconds, 3600);
    }
}
