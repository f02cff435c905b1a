//! Club Standings - leaderboard recalculation for club series
//!
//! This crate rebuilds series leaderboards from the full match history after
//! every match mutation, using Elo ratings for open play and position swaps
//! for challenge ladders.

pub mod config;
pub mod error;
pub mod rating;
pub mod service;
pub mod storage;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, StandingsError};
pub use types::*;

// Re-export key components
pub use rating::{EloRatingEngine, LadderRankingEngine, StandingsEngine};
pub use service::{MatchService, RecalculationOrchestrator, RecalculationReport};
pub use storage::{MatchHistoryProvider, SeriesConfigProvider, StandingsStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
