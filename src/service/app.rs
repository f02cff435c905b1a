//! Application state and component wiring
//!
//! Builds the in-memory collaborators, the recalculation orchestrator and the
//! match service from an `AppConfig`.

use crate::config::{validate_config, AppConfig};
use crate::error::{Result, StandingsError};
use crate::service::history::SeriesHistory;
use crate::service::matches::MatchService;
use crate::service::recalculation::{RecalculationOrchestrator, RecalculationReport};
use crate::storage::{
    InMemoryMatchRepository, InMemorySeriesRepository, InMemoryStandingsStore, StandingsStore,
};
use crate::types::{LeaderboardEntry, SeriesId};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Main application state containing all service components
pub struct AppState {
    config: AppConfig,
    series: Arc<InMemorySeriesRepository>,
    standings: Arc<InMemoryStandingsStore>,
    orchestrator: Arc<RecalculationOrchestrator>,
    match_service: MatchService,
}

impl AppState {
    /// Initialize the application with in-memory storage
    pub fn new(config: AppConfig) -> Result<Self> {
        validate_config(&config).map_err(|e| StandingsError::ConfigurationError {
            message: e.to_string(),
        })?;

        info!(
            "Initializing {} (timeout {}ms, discard superseded: {}, elo k={} initial={})",
            config.service.name,
            config.recalculation.timeout_ms,
            config.recalculation.discard_superseded,
            config.rating.elo.k_factor,
            config.rating.elo.initial_rating
        );

        let matches = Arc::new(InMemoryMatchRepository::new());
        let series = Arc::new(InMemorySeriesRepository::new());
        let standings = Arc::new(InMemoryStandingsStore::new());

        let orchestrator = Arc::new(RecalculationOrchestrator::from_config(
            matches.clone(),
            series.clone(),
            standings.clone(),
            &config,
        ));
        let match_service = MatchService::new(matches, series.clone(), orchestrator.clone());

        Ok(Self {
            config,
            series,
            standings,
            orchestrator,
            match_service,
        })
    }

    /// Get service configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the match service for mutations
    pub fn match_service(&self) -> &MatchService {
        &self.match_service
    }

    /// Get the orchestrator for direct recalculation
    pub fn orchestrator(&self) -> Arc<RecalculationOrchestrator> {
        self.orchestrator.clone()
    }

    /// Register a series and report all of its matches in file order
    pub async fn replay(&self, history: &SeriesHistory) -> Result<RecalculationReport> {
        self.series.insert(history.series.clone())?;

        for (index, new_match) in history.new_matches().enumerate() {
            self.match_service
                .report_match(new_match)
                .await
                .with_context(|| format!("Match #{} of series {}", index + 1, history.series.id))?;
        }

        // Surface recalculation errors that report_match only logs
        self.orchestrator
            .recalculate_standings(&history.series.id)
            .await
    }

    /// Current leaderboard of a series ordered by rank
    pub async fn leaderboard(&self, series_id: &SeriesId) -> Result<Vec<LeaderboardEntry>> {
        self.standings.list_standings(series_id).await
    }
}
