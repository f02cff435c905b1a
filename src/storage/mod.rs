//! Storage interfaces and in-memory implementations
//!
//! Match history, series settings and the leaderboard are owned by external
//! collaborators; this module defines what the standings service needs from
//! them.

pub mod memory;
pub mod provider;

// Re-export commonly used types
pub use memory::{InMemoryMatchRepository, InMemorySeriesRepository, InMemoryStandingsStore};
pub use provider::{MatchHistoryProvider, MatchRepository, SeriesConfigProvider, StandingsStore};
