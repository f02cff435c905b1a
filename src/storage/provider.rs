//! Collaborator interfaces used by the standings service
//!
//! Match history and series settings are read-only inputs; the standings store
//! is the only thing a recompute writes to.

use crate::error::Result;
use crate::types::{
    LeaderboardEntry, MatchId, MatchRecord, MatchUpdate, NewMatch, Series, SeriesConfig,
    SeriesId,
};
use async_trait::async_trait;

/// Source of a series' match history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchHistoryProvider: Send + Sync {
    /// All matches of a series, ordered by `played_at` then creation order
    async fn list_matches_chronological(&self, series_id: &SeriesId) -> Result<Vec<MatchRecord>>;
}

/// Source of series settings
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesConfigProvider: Send + Sync {
    /// Full series record
    async fn get_series(&self, series_id: &SeriesId) -> Result<Series>;

    /// Format and ladder rule of a series
    async fn get_series_config(&self, series_id: &SeriesId) -> Result<SeriesConfig> {
        Ok(self.get_series(series_id).await?.config)
    }
}

/// Persistence for leaderboard entries
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StandingsStore: Send + Sync {
    /// Remove every entry of a series
    async fn delete_all_standings(&self, series_id: &SeriesId) -> Result<()>;

    /// Insert or overwrite the entry keyed by `(series_id, player_id)`
    async fn upsert_standings_entry(&self, entry: LeaderboardEntry) -> Result<()>;

    /// Entries of a series ordered by rank ascending
    async fn list_standings(&self, series_id: &SeriesId) -> Result<Vec<LeaderboardEntry>>;

    /// Replace the whole leaderboard of a series
    ///
    /// The provided implementation deletes, then upserts entry by entry and
    /// stops at the first failure. Stores with transactions should override it
    /// with a single atomic write.
    async fn replace_standings(
        &self,
        series_id: &SeriesId,
        entries: Vec<LeaderboardEntry>,
    ) -> Result<()> {
        self.delete_all_standings(series_id).await?;
        for entry in entries {
            self.upsert_standings_entry(entry).await?;
        }
        Ok(())
    }
}

/// Match persistence used by the match service
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Store a new match and assign its id and creation sequence
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord>;

    /// Look up a match by id
    async fn find_match(&self, match_id: MatchId) -> Result<Option<MatchRecord>>;

    /// Apply a partial update and return the updated match
    async fn update_match(&self, match_id: MatchId, update: MatchUpdate) -> Result<MatchRecord>;

    /// Delete a match; returns false when it did not exist
    async fn delete_match(&self, match_id: MatchId) -> Result<bool>;
}
