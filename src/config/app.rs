//! Main application configuration
//!
//! This module defines the primary configuration structures for the standings
//! service, including environment variable and TOML file loading and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSettings,
    #[serde(default)]
    pub recalculation: RecalculationSettings,
    #[serde(default)]
    pub rating: RatingConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Standings recalculation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecalculationSettings {
    /// Upper bound for one load, compute and write cycle in milliseconds
    pub timeout_ms: u64,
    /// Skip a queued run when a newer trigger for the same series is waiting
    pub discard_superseded: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "club-standings".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for RecalculationSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            discard_superseded: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Recalculation settings
        if let Ok(timeout) = env::var("RECALCULATION_TIMEOUT_MS") {
            self.recalculation.timeout_ms = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid RECALCULATION_TIMEOUT_MS value: {}", timeout))?;
        }
        if let Ok(discard) = env::var("DISCARD_SUPERSEDED_RECALCULATIONS") {
            self.recalculation.discard_superseded = discard.parse().map_err(|_| {
                anyhow!("Invalid DISCARD_SUPERSEDED_RECALCULATIONS value: {}", discard)
            })?;
        }

        // Rating settings
        if let Ok(initial) = env::var("ELO_INITIAL_RATING") {
            self.rating.elo.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_INITIAL_RATING value: {}", initial))?;
        }
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            self.rating.elo.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k))?;
        }
        if let Ok(mode) = env::var("ELO_TRUNCATION") {
            self.rating.elo.truncation = mode.parse()?;
        }

        Ok(())
    }

    /// Get recalculation timeout as Duration
    pub fn recalculation_timeout(&self) -> Duration {
        Duration::from_millis(self.recalculation.timeout_ms)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    if config.recalculation.timeout_ms == 0 {
        return Err(anyhow!("Recalculation timeout must be greater than 0"));
    }

    config.rating.elo.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rating::RatingTruncation;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.recalculation_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.recalculation.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_partial_toml() {
        let raw = r#"
            [service]
            log_level = "debug"

            [rating.elo]
            initial_rating = 1200.0
            k_factor = 24.0
            truncation = "every_match"
        "#;

        let config: AppConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.service.log_level, "debug");
        assert_eq!(config.service.name, "club-standings");
        assert_eq!(config.rating.elo.initial_rating, 1200.0);
        assert_eq!(config.rating.elo.k_factor, 24.0);
        assert_eq!(config.rating.elo.truncation, RatingTruncation::EveryMatch);
        assert_eq!(config.recalculation.timeout_ms, 10_000);
        assert!(validate_config(&config).is_ok());
    }
}
