//! In-memory implementations of the storage interfaces
//!
//! Used by the command line replay tool, the tests and the benchmarks.

use crate::error::{Result, StandingsError};
use crate::rating::ordering::order_chronologically;
use crate::storage::provider::{
    MatchHistoryProvider, MatchRepository, SeriesConfigProvider, StandingsStore,
};
use crate::types::{
    LeaderboardEntry, MatchId, MatchRecord, MatchUpdate, NewMatch, PlayerId, Series, SeriesId,
};
use crate::utils::generate_match_id;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

fn lock_error(what: &str) -> StandingsError {
    StandingsError::InternalError {
        message: format!("Failed to acquire {} lock", what),
    }
}

/// In-memory match storage
#[derive(Debug, Default)]
pub struct InMemoryMatchRepository {
    matches: RwLock<Vec<MatchRecord>>,
    next_sequence: AtomicU64,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored matches across all series
    pub fn match_count(&self) -> Result<usize> {
        let matches = self.matches.read().map_err(|_| lock_error("matches read"))?;
        Ok(matches.len())
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn create_match(&self, new_match: NewMatch) -> Result<MatchRecord> {
        let record = MatchRecord {
            id: generate_match_id(),
            series_id: new_match.series_id,
            player_a_id: new_match.player_a_id,
            player_b_id: new_match.player_b_id,
            score_a: new_match.score_a,
            score_b: new_match.score_b,
            played_at: new_match.played_at,
            sequence: self.next_sequence.fetch_add(1, Ordering::SeqCst),
        };

        let mut matches = self
            .matches
            .write()
            .map_err(|_| lock_error("matches write"))?;
        matches.push(record.clone());

        Ok(record)
    }

    async fn find_match(&self, match_id: MatchId) -> Result<Option<MatchRecord>> {
        let matches = self.matches.read().map_err(|_| lock_error("matches read"))?;
        Ok(matches.iter().find(|m| m.id == match_id).cloned())
    }

    async fn update_match(&self, match_id: MatchId, update: MatchUpdate) -> Result<MatchRecord> {
        let mut matches = self
            .matches
            .write()
            .map_err(|_| lock_error("matches write"))?;

        let record = matches
            .iter_mut()
            .find(|m| m.id == match_id)
            .ok_or_else(|| StandingsError::MatchNotFound {
                match_id: match_id.to_string(),
            })?;

        if let Some(score_a) = update.score_a {
            record.score_a = score_a;
        }
        if let Some(score_b) = update.score_b {
            record.score_b = score_b;
        }
        if let Some(played_at) = update.played_at {
            record.played_at = played_at;
        }

        Ok(record.clone())
    }

    async fn delete_match(&self, match_id: MatchId) -> Result<bool> {
        let mut matches = self
            .matches
            .write()
            .map_err(|_| lock_error("matches write"))?;

        let before = matches.len();
        matches.retain(|m| m.id != match_id);
        Ok(matches.len() != before)
    }
}

#[async_trait]
impl MatchHistoryProvider for InMemoryMatchRepository {
    async fn list_matches_chronological(&self, series_id: &SeriesId) -> Result<Vec<MatchRecord>> {
        let matches = self.matches.read().map_err(|_| lock_error("matches read"))?;

        let mut history: Vec<MatchRecord> = matches
            .iter()
            .filter(|m| &m.series_id == series_id)
            .cloned()
            .collect();
        order_chronologically(&mut history);

        Ok(history)
    }
}

/// In-memory series storage
#[derive(Debug, Default)]
pub struct InMemorySeriesRepository {
    series: RwLock<HashMap<SeriesId, Series>>,
}

impl InMemorySeriesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a series
    pub fn insert(&self, series: Series) -> Result<()> {
        let mut all = self.series.write().map_err(|_| lock_error("series write"))?;
        all.insert(series.id.clone(), series);
        Ok(())
    }
}

#[async_trait]
impl SeriesConfigProvider for InMemorySeriesRepository {
    async fn get_series(&self, series_id: &SeriesId) -> Result<Series> {
        let all = self.series.read().map_err(|_| lock_error("series read"))?;

        all.get(series_id).cloned().ok_or_else(|| {
            StandingsError::SeriesNotFound {
                series_id: series_id.clone(),
            }
            .into()
        })
    }
}

/// In-memory leaderboard storage
///
/// `replace_standings` swaps the whole series under one write lock, so readers
/// never observe a half-written leaderboard.
#[derive(Debug, Default)]
pub struct InMemoryStandingsStore {
    entries: RwLock<BTreeMap<SeriesId, BTreeMap<PlayerId, LeaderboardEntry>>>,
}

impl InMemoryStandingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries across all series
    pub fn entry_count(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| lock_error("standings read"))?;
        Ok(entries.values().map(BTreeMap::len).sum())
    }
}

#[async_trait]
impl StandingsStore for InMemoryStandingsStore {
    async fn delete_all_standings(&self, series_id: &SeriesId) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| lock_error("standings write"))?;
        entries.remove(series_id);
        Ok(())
    }

    async fn upsert_standings_entry(&self, entry: LeaderboardEntry) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| lock_error("standings write"))?;
        entries
            .entry(entry.series_id.clone())
            .or_default()
            .insert(entry.player_id.clone(), entry);
        Ok(())
    }

    async fn list_standings(&self, series_id: &SeriesId) -> Result<Vec<LeaderboardEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| lock_error("standings read"))?;

        let mut listed: Vec<LeaderboardEntry> = entries
            .get(series_id)
            .map(|series| series.values().cloned().collect())
            .unwrap_or_default();
        listed.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.player_id.cmp(&b.player_id)));

        Ok(listed)
    }

    async fn replace_standings(
        &self,
        series_id: &SeriesId,
        replacement: Vec<LeaderboardEntry>,
    ) -> Result<()> {
        let fresh: BTreeMap<PlayerId, LeaderboardEntry> = replacement
            .into_iter()
            .map(|entry| (entry.player_id.clone(), entry))
            .collect();

        let mut entries = self
            .entries
            .write()
            .map_err(|_| lock_error("standings write"))?;
        if fresh.is_empty() {
            entries.remove(series_id);
        } else {
            entries.insert(series_id.clone(), fresh);
        }
        Ok(())
    }
}
