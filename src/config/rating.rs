//! Rating system configuration

use crate::error::{Result, StandingsError};
use serde::{Deserialize, Serialize};

/// Starting Elo rating for a player's first appearance in a series
pub const DEFAULT_INITIAL_RATING: f64 = 1000.0;

/// Maximum points exchanged per match
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// When the float Elo rating is cut down to the stored integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingTruncation {
    /// Keep full precision while folding, truncate only the persisted value
    #[default]
    OnPersist,
    /// Truncate after every match so the next match starts from the integer
    /// value; reproduces leaderboards written by the legacy service
    EveryMatch,
}

impl std::str::FromStr for RatingTruncation {
    type Err = StandingsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "on_persist" => Ok(Self::OnPersist),
            "every_match" => Ok(Self::EveryMatch),
            other => Err(StandingsError::ConfigurationError {
                message: format!("Unknown rating truncation mode: {}", other),
            }),
        }
    }
}

/// Elo engine parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloSettings {
    pub initial_rating: f64,
    pub k_factor: f64,
    #[serde(default)]
    pub truncation: RatingTruncation,
}

impl Default for EloSettings {
    fn default() -> Self {
        Self {
            initial_rating: DEFAULT_INITIAL_RATING,
            k_factor: DEFAULT_K_FACTOR,
            truncation: RatingTruncation::OnPersist,
        }
    }
}

impl EloSettings {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(StandingsError::ConfigurationError {
                message: "K-factor must be positive".to_string(),
            }
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(StandingsError::ConfigurationError {
                message: "Initial rating must be a finite number".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Rating configuration shared by the engines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingConfig {
    #[serde(default)]
    pub elo: EloSettings,
}
