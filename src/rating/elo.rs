//! Elo rating engine for open play series
//!
//! Ratings are folded strictly left to right over the chronological history:
//! each match is rated against the ratings produced by the matches before it.
//! The per-match math comes from the skillratings crate.

use crate::config::rating::{EloSettings, RatingTruncation};
use crate::rating::engine::{StandingsComputation, StandingsEngine};
use crate::types::{MatchRecord, PlayerId, PlayerStats, SeriesFormat, Standing};
use crate::utils::truncate_rating;
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;
use std::collections::BTreeMap;
use tracing::debug;

/// Running ratings and counters for one recompute
#[derive(Debug, Clone, Default)]
pub struct RatingState {
    ratings: BTreeMap<PlayerId, f64>,
    stats: BTreeMap<PlayerId, PlayerStats>,
}

impl RatingState {
    /// Current rating of a player, if seen
    pub fn rating(&self, player_id: &str) -> Option<f64> {
        self.ratings.get(player_id).copied()
    }

    /// Counters of a player, if seen
    pub fn stats(&self, player_id: &str) -> Option<&PlayerStats> {
        self.stats.get(player_id)
    }

    pub fn player_count(&self) -> usize {
        self.ratings.len()
    }

    /// Ratings in player id order
    pub fn ratings(&self) -> impl Iterator<Item = (&PlayerId, f64)> {
        self.ratings.iter().map(|(id, rating)| (id, *rating))
    }

    fn seed(&mut self, player_id: &PlayerId, initial_rating: f64) {
        if !self.ratings.contains_key(player_id) {
            self.ratings.insert(player_id.clone(), initial_rating);
            self.stats.insert(player_id.clone(), PlayerStats::default());
        }
    }

    fn stats_mut(&mut self, player_id: &str) -> &mut PlayerStats {
        self.stats.entry(player_id.to_string()).or_default()
    }
}

/// Elo rating engine
#[derive(Debug, Clone)]
pub struct EloRatingEngine {
    settings: EloSettings,
}

impl Default for EloRatingEngine {
    fn default() -> Self {
        Self::new(EloSettings::default())
    }
}

impl EloRatingEngine {
    /// Create a new Elo engine; settings are validated by the config layer
    pub fn new(settings: EloSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EloSettings {
        &self.settings
    }

    /// Expected scores `(E_A, E_B)` for two ratings, `E_B = 1 - E_A`
    pub fn expected_scores(rating_a: f64, rating_b: f64) -> (f64, f64) {
        expected_score(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
        )
    }

    /// New ratings `(R_A', R_B')` after a decided match
    pub fn rate_match(&self, rating_a: f64, rating_b: f64, a_won: bool) -> (f64, f64) {
        let outcome = if a_won { Outcomes::WIN } else { Outcomes::LOSS };
        let config = EloConfig {
            k: self.settings.k_factor,
        };

        let (new_a, new_b) = elo(
            &EloRating { rating: rating_a },
            &EloRating { rating: rating_b },
            &outcome,
            &config,
        );

        match self.settings.truncation {
            RatingTruncation::OnPersist => (new_a.rating, new_b.rating),
            RatingTruncation::EveryMatch => (new_a.rating.trunc(), new_b.rating.trunc()),
        }
    }

    /// Fold a chronological history into the running state
    ///
    /// Returns the state and the number of tied matches. A tie still counts as
    /// a played match with its games, but moves neither ratings nor win/loss.
    pub fn fold(&self, matches: &[MatchRecord]) -> (RatingState, usize) {
        let mut state = RatingState::default();
        let mut ties = 0;

        for m in matches {
            state.seed(&m.player_a_id, self.settings.initial_rating);
            state.seed(&m.player_b_id, self.settings.initial_rating);

            state
                .stats_mut(&m.player_a_id)
                .record_games(m.score_a, m.score_b);
            state
                .stats_mut(&m.player_b_id)
                .record_games(m.score_b, m.score_a);

            let Some((winner, loser)) = m.winner_and_loser() else {
                ties += 1;
                continue;
            };

            let initial = self.settings.initial_rating;
            let rating_a = state.rating(&m.player_a_id).unwrap_or(initial);
            let rating_b = state.rating(&m.player_b_id).unwrap_or(initial);
            let (new_a, new_b) = self.rate_match(rating_a, rating_b, m.score_a > m.score_b);
            state.ratings.insert(m.player_a_id.clone(), new_a);
            state.ratings.insert(m.player_b_id.clone(), new_b);

            state.stats_mut(winner).matches_won += 1;
            state.stats_mut(loser).matches_lost += 1;
        }

        (state, ties)
    }

    /// Rank the folded state: rating descending, then player id ascending
    pub fn rank(state: RatingState) -> Vec<Standing> {
        let RatingState { ratings, mut stats } = state;

        let mut ordered: Vec<(PlayerId, f64)> = ratings.into_iter().collect();
        ordered.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        ordered
            .into_iter()
            .enumerate()
            .map(|(index, (player_id, rating))| {
                let stats = stats.remove(&player_id).unwrap_or_default();
                Standing {
                    player_id,
                    rank: index as u32 + 1,
                    rating: truncate_rating(rating),
                    stats,
                }
            })
            .collect()
    }
}

impl StandingsEngine for EloRatingEngine {
    fn compute(&self, matches: &[MatchRecord]) -> StandingsComputation {
        let (state, ties_skipped) = self.fold(matches);
        debug!(
            "Elo fold over {} matches: {} players, {} ties",
            matches.len(),
            state.player_count(),
            ties_skipped
        );

        StandingsComputation {
            standings: Self::rank(state),
            matches_processed: matches.len(),
            ties_skipped,
        }
    }

    fn format(&self) -> SeriesFormat {
        SeriesFormat::OpenPlay
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "elo",
            "initial_rating": self.settings.initial_rating,
            "k_factor": self.settings.k_factor,
            "truncation": self.settings.truncation,
        })
    }
}
