//! Match reporting, correction and removal
//!
//! Every successful mutation triggers a full standings recalculation for the
//! affected series. A failed recalculation is logged and never fails the
//! mutation; the leaderboard catches up on the next successful run.

use crate::error::{Result, StandingsError};
use crate::service::recalculation::{RecalculationOrchestrator, RecalculationReport};
use crate::service::validation::{
    validate_match_time_window, validate_new_match, validate_set_score,
};
use crate::storage::{MatchRepository, SeriesConfigProvider};
use crate::types::{MatchId, MatchRecord, MatchUpdate, NewMatch, SeriesId};
use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info};

/// Entry point for match mutations
pub struct MatchService {
    matches: Arc<dyn MatchRepository>,
    series: Arc<dyn SeriesConfigProvider>,
    orchestrator: Arc<RecalculationOrchestrator>,
}

impl MatchService {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        series: Arc<dyn SeriesConfigProvider>,
        orchestrator: Arc<RecalculationOrchestrator>,
    ) -> Self {
        Self {
            matches,
            series,
            orchestrator,
        }
    }

    /// Validate and store a new match, then refresh the series standings
    pub async fn report_match(&self, new_match: NewMatch) -> Result<MatchRecord> {
        let series = self
            .series
            .get_series(&new_match.series_id)
            .await
            .with_context(|| format!("Failed to load series {}", new_match.series_id))?;

        validate_new_match(&new_match, &series)?;

        let record = self.matches.create_match(new_match).await?;
        info!(
            "Reported match {} in series {}: {} {}-{} {}",
            record.id,
            record.series_id,
            record.player_a_id,
            record.score_a,
            record.score_b,
            record.player_b_id
        );

        self.refresh_standings(&record.series_id).await;
        Ok(record)
    }

    /// Apply a correction to an existing match
    ///
    /// Scores are only checked when both are supplied. A single-score update is
    /// stored as given, so it can leave a tie behind; both engines tolerate that.
    pub async fn update_match(&self, match_id: MatchId, update: MatchUpdate) -> Result<MatchRecord> {
        let existing = self.require_match(match_id).await?;

        if update.is_empty() {
            return Ok(existing);
        }

        if let (Some(score_a), Some(score_b)) = (update.score_a, update.score_b) {
            let series = self.series.get_series(&existing.series_id).await?;
            validate_set_score(score_a, score_b, series.effective_sets_to_play())?;
        }

        if let Some(played_at) = update.played_at {
            let series = self.series.get_series(&existing.series_id).await?;
            validate_match_time_window(played_at, series.starts_at, series.ends_at)?;
        }

        let record = self.matches.update_match(match_id, update).await?;
        info!("Updated match {} in series {}", record.id, record.series_id);

        self.refresh_standings(&record.series_id).await;
        Ok(record)
    }

    /// Remove a match and refresh the series standings
    pub async fn delete_match(&self, match_id: MatchId) -> Result<()> {
        let existing = self.require_match(match_id).await?;

        if !self.matches.delete_match(match_id).await? {
            return Err(StandingsError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into());
        }
        info!("Deleted match {} from series {}", match_id, existing.series_id);

        self.refresh_standings(&existing.series_id).await;
        Ok(())
    }

    /// Recalculate a series on demand, surfacing any failure
    pub async fn recalculate(&self, series_id: &SeriesId) -> Result<RecalculationReport> {
        self.orchestrator.recalculate_standings(series_id).await
    }

    async fn require_match(&self, match_id: MatchId) -> Result<MatchRecord> {
        self.matches.find_match(match_id).await?.ok_or_else(|| {
            StandingsError::MatchNotFound {
                match_id: match_id.to_string(),
            }
            .into()
        })
    }

    async fn refresh_standings(&self, series_id: &SeriesId) {
        if let Err(e) = self.orchestrator.recalculate_standings(series_id).await {
            error!(
                "Failed to recalculate standings for series {}: {:#}",
                series_id, e
            );
        }
    }
}
