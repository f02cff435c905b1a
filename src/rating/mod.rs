//! Standings engines
//!
//! This module folds a series' chronological match history into standings,
//! either as Elo ratings (open play) or as challenge ladder positions.

pub mod elo;
pub mod engine;
pub mod ladder;
pub mod ordering;

// Re-export commonly used types
pub use elo::{EloRatingEngine, RatingState};
pub use engine::{engine_for, StandingsComputation, StandingsEngine};
pub use ladder::{LadderPositions, LadderRankingEngine};
pub use ordering::{is_chronological, order_chronologically};
