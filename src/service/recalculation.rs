//! Standings recalculation orchestrator
//!
//! Every match mutation ends in `recalculate_standings`, which rebuilds the
//! series leaderboard from the complete match history: load the series format,
//! load the chronological matches, run the matching engine and replace the
//! stored entries. Nothing is patched incrementally.
//!
//! Runs are serialized per series. A run that acquires the series lock while
//! another trigger is still queued behind it is discarded; the queued run
//! reads a history at least as fresh.

use crate::config::{AppConfig, EloSettings, RecalculationSettings};
use crate::error::{Result, StandingsError};
use crate::rating::engine::{engine_for, StandingsComputation};
use crate::rating::ordering::{is_chronological, order_chronologically};
use crate::storage::{MatchHistoryProvider, SeriesConfigProvider, StandingsStore};
use crate::types::{LeaderboardEntry, SeriesFormat, SeriesId};
use crate::utils::current_timestamp;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a recalculation request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecalculationOutcome {
    /// Leaderboard rebuilt and written
    Completed,
    /// Skipped in favour of a newer queued request for the same series
    Superseded,
}

/// Summary of one recalculation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecalculationReport {
    pub series_id: SeriesId,
    /// `None` when the run was superseded before loading the series
    pub format: Option<SeriesFormat>,
    pub matches_processed: usize,
    pub ties_skipped: usize,
    pub entries_written: usize,
    pub outcome: RecalculationOutcome,
}

impl RecalculationReport {
    fn superseded(series_id: &SeriesId) -> Self {
        Self {
            series_id: series_id.clone(),
            format: None,
            matches_processed: 0,
            ties_skipped: 0,
            entries_written: 0,
            outcome: RecalculationOutcome::Superseded,
        }
    }
}

/// Per-series lock plus the number of requests currently waiting for it
#[derive(Debug, Default)]
struct SeriesSlot {
    lock: tokio::sync::Mutex<()>,
    waiting: AtomicUsize,
}

/// Counts a request as waiting until it is dropped, including on cancellation
struct WaitingTicket<'a> {
    slot: &'a SeriesSlot,
}

impl<'a> WaitingTicket<'a> {
    fn new(slot: &'a SeriesSlot) -> Self {
        slot.waiting.fetch_add(1, Ordering::SeqCst);
        Self { slot }
    }
}

impl Drop for WaitingTicket<'_> {
    fn drop(&mut self) {
        self.slot.waiting.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Drives full standings recomputation for a series
pub struct RecalculationOrchestrator {
    matches: Arc<dyn MatchHistoryProvider>,
    series: Arc<dyn SeriesConfigProvider>,
    store: Arc<dyn StandingsStore>,
    elo: EloSettings,
    settings: RecalculationSettings,
    slots: Mutex<HashMap<SeriesId, Arc<SeriesSlot>>>,
}

impl RecalculationOrchestrator {
    /// Create an orchestrator with default settings
    pub fn new(
        matches: Arc<dyn MatchHistoryProvider>,
        series: Arc<dyn SeriesConfigProvider>,
        store: Arc<dyn StandingsStore>,
    ) -> Self {
        Self::with_settings(
            matches,
            series,
            store,
            EloSettings::default(),
            RecalculationSettings::default(),
        )
    }

    /// Create an orchestrator from the application config
    pub fn from_config(
        matches: Arc<dyn MatchHistoryProvider>,
        series: Arc<dyn SeriesConfigProvider>,
        store: Arc<dyn StandingsStore>,
        config: &AppConfig,
    ) -> Self {
        Self::with_settings(
            matches,
            series,
            store,
            config.rating.elo,
            config.recalculation.clone(),
        )
    }

    /// Create with explicit engine and recalculation settings
    pub fn with_settings(
        matches: Arc<dyn MatchHistoryProvider>,
        series: Arc<dyn SeriesConfigProvider>,
        store: Arc<dyn StandingsStore>,
        elo: EloSettings,
        settings: RecalculationSettings,
    ) -> Self {
        Self {
            matches,
            series,
            store,
            elo,
            settings,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, series_id: &SeriesId) -> Result<Arc<SeriesSlot>> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| StandingsError::InternalError {
                message: "Failed to acquire series slots lock".to_string(),
            })?;

        Ok(slots.entry(series_id.clone()).or_default().clone())
    }

    /// Rebuild the leaderboard of a series from its full match history
    ///
    /// Errors leave the previous (or a partially cleared) leaderboard in place
    /// until the next successful run.
    pub async fn recalculate_standings(&self, series_id: &SeriesId) -> Result<RecalculationReport> {
        let slot = self.slot(series_id)?;
        let timeout = Duration::from_millis(self.settings.timeout_ms);

        match tokio::time::timeout(timeout, self.run_serialized(series_id, &slot)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Recalculation for series {} timed out after {}ms",
                    series_id, self.settings.timeout_ms
                );
                Err(StandingsError::RecalculationTimedOut {
                    series_id: series_id.clone(),
                    timeout_ms: self.settings.timeout_ms,
                }
                .into())
            }
        }
    }

    async fn run_serialized(
        &self,
        series_id: &SeriesId,
        slot: &SeriesSlot,
    ) -> Result<RecalculationReport> {
        let ticket = WaitingTicket::new(slot);
        let _guard = slot.lock.lock().await;
        drop(ticket);

        if self.settings.discard_superseded && slot.waiting.load(Ordering::SeqCst) > 0 {
            debug!(
                "Skipping recalculation for series {}: a newer request is queued",
                series_id
            );
            return Ok(RecalculationReport::superseded(series_id));
        }

        self.recompute(series_id).await
    }

    async fn recompute(&self, series_id: &SeriesId) -> Result<RecalculationReport> {
        let started = Instant::now();

        let config = self
            .series
            .get_series_config(series_id)
            .await
            .with_context(|| format!("Failed to fetch series {}", series_id))?;

        let mut matches = self
            .matches
            .list_matches_chronological(series_id)
            .await
            .with_context(|| format!("Failed to fetch matches for series {}", series_id))?;
        if !is_chronological(&matches) {
            debug!("Match history of series {} arrived out of order", series_id);
            order_chronologically(&mut matches);
        }

        let computation = if matches.is_empty() {
            StandingsComputation {
                standings: Vec::new(),
                matches_processed: 0,
                ties_skipped: 0,
            }
        } else {
            let engine = engine_for(&config, self.elo);
            debug!(
                "Recomputing series {} with engine {}",
                series_id,
                engine.config()
            );
            engine.compute(&matches)
        };

        let now = current_timestamp();
        let entries: Vec<LeaderboardEntry> = computation
            .standings
            .into_iter()
            .map(|standing| LeaderboardEntry::from_standing(series_id, standing, now))
            .collect();
        let entries_written = entries.len();

        self.store
            .replace_standings(series_id, entries)
            .await
            .with_context(|| format!("Failed to write standings for series {}", series_id))?;

        info!(
            "Recalculated {} standings for series {}: {} matches, {} ties, {} entries in {:.2}ms",
            config.format,
            series_id,
            computation.matches_processed,
            computation.ties_skipped,
            entries_written,
            started.elapsed().as_secs_f64() * 1000.0
        );

        Ok(RecalculationReport {
            series_id: series_id.clone(),
            format: Some(config.format),
            matches_processed: computation.matches_processed,
            ties_skipped: computation.ties_skipped,
            entries_written,
            outcome: RecalculationOutcome::Completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::provider::{
        MockMatchHistoryProvider, MockSeriesConfigProvider, MockStandingsStore,
    };
    use crate::types::{LadderRule, MatchRecord, SeriesConfig};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use uuid::Uuid;

    fn game(sequence: u64, a: &str, b: &str, score_a: u32, score_b: u32) -> MatchRecord {
        MatchRecord {
            id: Uuid::new_v4(),
            series_id: "s1".to_string(),
            player_a_id: a.to_string(),
            player_b_id: b.to_string(),
            score_a,
            score_b,
            played_at: Utc.with_ymd_and_hms(2025, 9, 1, 18, 0, 0).unwrap()
                + ChronoDuration::minutes(sequence as i64),
            sequence,
        }
    }

    fn series_returning(config: SeriesConfig) -> MockSeriesConfigProvider {
        let mut series = MockSeriesConfigProvider::new();
        series
            .expect_get_series_config()
            .returning(move |_| Ok(config));
        series
    }

    fn history_returning(matches: Vec<MatchRecord>) -> MockMatchHistoryProvider {
        let mut history = MockMatchHistoryProvider::new();
        history
            .expect_list_matches_chronological()
            .returning(move |_| Ok(matches.clone()));
        history
    }

    fn orchestrator(
        history: MockMatchHistoryProvider,
        series: MockSeriesConfigProvider,
        store: MockStandingsStore,
    ) -> RecalculationOrchestrator {
        RecalculationOrchestrator::new(Arc::new(history), Arc::new(series), Arc::new(store))
    }

    #[tokio::test]
    async fn test_series_failure_aborts_before_any_write() {
        let mut series = MockSeriesConfigProvider::new();
        series
            .expect_get_series_config()
            .returning(|_| Err(anyhow::anyhow!("series collection unavailable")));
        let history = MockMatchHistoryProvider::new();
        let store = MockStandingsStore::new();

        let result = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to fetch series s1"));
    }

    #[tokio::test]
    async fn test_history_failure_aborts_before_any_write() {
        let series = series_returning(SeriesConfig::open_play());
        let mut history = MockMatchHistoryProvider::new();
        history
            .expect_list_matches_chronological()
            .returning(|_| Err(anyhow::anyhow!("cursor closed")));
        let store = MockStandingsStore::new();

        let result = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await;

        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to fetch matches"));
    }

    #[tokio::test]
    async fn test_write_failure_is_reported() {
        let series = series_returning(SeriesConfig::open_play());
        let history = history_returning(vec![game(0, "A", "B", 3, 1)]);
        let mut store = MockStandingsStore::new();
        store
            .expect_replace_standings()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("write conflict")));

        let result = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await;

        assert!(format!("{:#}", result.unwrap_err()).contains("write conflict"));
    }

    #[tokio::test]
    async fn test_empty_history_clears_leaderboard() {
        let series = series_returning(SeriesConfig::open_play());
        let history = history_returning(Vec::new());
        let mut store = MockStandingsStore::new();
        store
            .expect_replace_standings()
            .withf(|series_id, entries| series_id == "s1" && entries.is_empty())
            .times(1)
            .returning(|_, _| Ok(()));

        let report = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await
            .unwrap();

        assert_eq!(report.outcome, RecalculationOutcome::Completed);
        assert_eq!(report.entries_written, 0);
        assert_eq!(report.format, Some(SeriesFormat::OpenPlay));
    }

    #[tokio::test]
    async fn test_dispatches_to_elo_for_open_play() {
        let series = series_returning(SeriesConfig::open_play());
        let history = history_returning(vec![game(0, "A", "B", 3, 1)]);
        let mut store = MockStandingsStore::new();
        store
            .expect_replace_standings()
            .withf(|_, entries| {
                entries.len() == 2
                    && entries[0].player_id == "A"
                    && entries[0].rating == 1016
                    && entries[1].rating == 984
                    && entries.iter().all(|e| e.series_id == "s1")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let report = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await
            .unwrap();
        assert_eq!(report.matches_processed, 1);
        assert_eq!(report.entries_written, 2);
    }

    #[tokio::test]
    async fn test_dispatches_to_ladder_and_reorders_input() {
        let series = series_returning(SeriesConfig::ladder(LadderRule::Classic));
        // Provider hands back the upset first; the orchestrator sorts it last
        let history = history_returning(vec![
            game(2, "P3", "P1", 3, 2),
            game(0, "P1", "P2", 3, 0),
            game(1, "P2", "P3", 3, 1),
        ]);
        let mut store = MockStandingsStore::new();
        store
            .expect_replace_standings()
            .withf(|_, entries| {
                let order: Vec<(&str, u32, i32)> = entries
                    .iter()
                    .map(|e| (e.player_id.as_str(), e.rank, e.rating))
                    .collect();
                order == vec![("P3", 1, 1), ("P1", 2, 2), ("P2", 3, 3)]
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let report = orchestrator(history, series, store)
            .recalculate_standings(&"s1".to_string())
            .await
            .unwrap();
        assert_eq!(report.format, Some(SeriesFormat::Ladder));
    }
}
