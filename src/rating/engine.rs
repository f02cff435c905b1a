//! Standings engine trait and engine selection
//!
//! This module defines the interface shared by the Elo and ladder engines and
//! picks the right one for a series format.

use crate::config::rating::EloSettings;
use crate::rating::elo::EloRatingEngine;
use crate::rating::ladder::LadderRankingEngine;
use crate::types::{MatchRecord, SeriesConfig, SeriesFormat, Standing};
use serde::{Deserialize, Serialize};

/// Result of folding a match history into standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsComputation {
    /// One standing per player, ordered by rank
    pub standings: Vec<Standing>,
    /// Number of matches read from the history
    pub matches_processed: usize,
    /// Tied matches that did not move ratings or positions
    pub ties_skipped: usize,
}

/// Trait for computing standings from a chronological match history
///
/// Engines are pure: the same history always yields the same standings and
/// nothing is kept between calls.
pub trait StandingsEngine: Send + Sync {
    /// Fold the matches, in the given order, into ranked standings
    fn compute(&self, matches: &[MatchRecord]) -> StandingsComputation;

    /// Series format this engine serves
    fn format(&self) -> SeriesFormat;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;
}

/// Build the engine for a series configuration
pub fn engine_for(config: &SeriesConfig, elo: EloSettings) -> Box<dyn StandingsEngine> {
    match config.format {
        SeriesFormat::OpenPlay => Box::new(EloRatingEngine::new(elo)),
        SeriesFormat::Ladder => Box::new(LadderRankingEngine::new(config.ladder_rule)),
    }
}
