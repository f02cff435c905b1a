//! Test fixtures and collaborator doubles for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use club_standings::config::{EloSettings, RecalculationSettings};
use club_standings::error::{Result, StandingsError};
use club_standings::service::{MatchService, RecalculationOrchestrator};
use club_standings::storage::{
    InMemoryMatchRepository, InMemorySeriesRepository, InMemoryStandingsStore,
    MatchHistoryProvider, SeriesConfigProvider, StandingsStore,
};
use club_standings::types::{
    LeaderboardEntry, MatchRecord, NewMatch, Series, SeriesConfig, SeriesId,
};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// First day of every fixture series
pub fn series_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap()
}

/// Series running through September 2025, best of five
pub fn test_series(id: &str, config: SeriesConfig) -> Series {
    Series {
        id: id.to_string(),
        title: format!("Series {}", id),
        config,
        starts_at: series_start(),
        ends_at: Utc.with_ymd_and_hms(2025, 9, 30, 0, 0, 0).unwrap(),
        sets_to_play: 5,
    }
}

/// Match report `minute` minutes into the series
pub fn report(series_id: &str, a: &str, b: &str, score_a: u32, score_b: u32, minute: i64) -> NewMatch {
    NewMatch {
        series_id: series_id.to_string(),
        player_a_id: a.to_string(),
        player_b_id: b.to_string(),
        score_a,
        score_b,
        played_at: series_start() + Duration::hours(18) + Duration::minutes(minute),
    }
}

/// Stored match with an explicit creation sequence
pub fn record(series_id: &str, sequence: u64, a: &str, b: &str, score_a: u32, score_b: u32) -> MatchRecord {
    MatchRecord {
        id: Uuid::new_v4(),
        series_id: series_id.to_string(),
        player_a_id: a.to_string(),
        player_b_id: b.to_string(),
        score_a,
        score_b,
        played_at: series_start() + Duration::minutes(sequence as i64),
        sequence,
    }
}

/// Leaderboard as `(player, rank, rating)` triples
pub fn board(entries: &[LeaderboardEntry]) -> Vec<(String, u32, i32)> {
    entries
        .iter()
        .map(|e| (e.player_id.clone(), e.rank, e.rating))
        .collect()
}

/// Match history provider that sleeps on every read and records overlap
#[derive(Debug)]
pub struct SlowHistoryProvider {
    inner: Arc<InMemoryMatchRepository>,
    delay_ms: AtomicU64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: AtomicUsize,
}

impl SlowHistoryProvider {
    pub fn new(inner: Arc<InMemoryMatchRepository>, delay_ms: u64) -> Self {
        Self {
            inner,
            delay_ms: AtomicU64::new(delay_ms),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::SeqCst);
    }

    /// Highest number of overlapping reads observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MatchHistoryProvider for SlowHistoryProvider {
    async fn list_matches_chronological(&self, series_id: &SeriesId) -> Result<Vec<MatchRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
        let result = self.inner.list_matches_chronological(series_id).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Series provider whose reads always fail
#[derive(Debug, Default)]
pub struct UnavailableSeriesProvider;

#[async_trait]
impl SeriesConfigProvider for UnavailableSeriesProvider {
    async fn get_series(&self, series_id: &SeriesId) -> Result<Series> {
        Err(StandingsError::StorageFailure {
            message: format!("series {} unreachable", series_id),
        }
        .into())
    }
}

/// Standings store using the delete-then-upsert write path, with injectable
/// upsert failures
#[derive(Debug, Default)]
pub struct FlakyStandingsStore {
    inner: InMemoryStandingsStore,
    fail_upserts_after: Mutex<Option<usize>>,
    upserts_since_delete: AtomicUsize,
    failing: AtomicBool,
}

impl FlakyStandingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every upsert once `count` entries were written after a delete
    pub fn fail_upserts_after(&self, count: usize) {
        if let Ok(mut limit) = self.fail_upserts_after.lock() {
            *limit = Some(count);
        }
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn heal(&self) {
        self.failing.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl StandingsStore for FlakyStandingsStore {
    async fn delete_all_standings(&self, series_id: &SeriesId) -> Result<()> {
        self.upserts_since_delete.store(0, Ordering::SeqCst);
        self.inner.delete_all_standings(series_id).await
    }

    async fn upsert_standings_entry(&self, entry: LeaderboardEntry) -> Result<()> {
        let limit = self.fail_upserts_after.lock().ok().and_then(|limit| *limit);
        let written = self.upserts_since_delete.load(Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) && limit.is_some_and(|limit| written >= limit) {
            return Err(StandingsError::StorageFailure {
                message: format!("upsert of {} rejected", entry.player_id),
            }
            .into());
        }

        self.upserts_since_delete.fetch_add(1, Ordering::SeqCst);
        self.inner.upsert_standings_entry(entry).await
    }

    async fn list_standings(&self, series_id: &SeriesId) -> Result<Vec<LeaderboardEntry>> {
        self.inner.list_standings(series_id).await
    }
}

/// Complete in-memory stack
pub struct TestSystem {
    pub matches: Arc<InMemoryMatchRepository>,
    pub series: Arc<InMemorySeriesRepository>,
    pub standings: Arc<InMemoryStandingsStore>,
    pub orchestrator: Arc<RecalculationOrchestrator>,
    pub service: MatchService,
}

impl TestSystem {
    pub fn new() -> Self {
        Self::with_settings(EloSettings::default(), RecalculationSettings::default())
    }

    pub fn with_settings(elo: EloSettings, settings: RecalculationSettings) -> Self {
        let matches = Arc::new(InMemoryMatchRepository::new());
        let series = Arc::new(InMemorySeriesRepository::new());
        let standings = Arc::new(InMemoryStandingsStore::new());
        let orchestrator = Arc::new(RecalculationOrchestrator::with_settings(
            matches.clone(),
            series.clone(),
            standings.clone(),
            elo,
            settings,
        ));
        let service = MatchService::new(matches.clone(), series.clone(), orchestrator.clone());

        Self {
            matches,
            series,
            standings,
            orchestrator,
            service,
        }
    }

    pub fn add_series(&self, id: &str, config: SeriesConfig) {
        self.series.insert(test_series(id, config)).unwrap();
    }

    pub async fn leaderboard(&self, series_id: &str) -> Vec<LeaderboardEntry> {
        self.standings
            .list_standings(&series_id.to_string())
            .await
            .unwrap()
    }
}
