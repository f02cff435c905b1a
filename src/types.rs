//! Common types used throughout the standings service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for series
pub type SeriesId = String;

/// Unique identifier for matches
pub type MatchId = Uuid;

/// Competition format of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesFormat {
    /// Free pairings, standings by Elo rating
    #[default]
    OpenPlay,
    /// Challenge ladder, standings by position
    Ladder,
}

impl std::fmt::Display for SeriesFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesFormat::OpenPlay => write!(f, "OpenPlay"),
            SeriesFormat::Ladder => write!(f, "Ladder"),
        }
    }
}

/// Ladder sub-rule applied when the better-placed player wins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderRule {
    /// Nobody moves
    #[default]
    Classic,
    /// The loser drops one place
    Aggressive,
}

impl std::fmt::Display for LadderRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LadderRule::Classic => write!(f, "Classic"),
            LadderRule::Aggressive => write!(f, "Aggressive"),
        }
    }
}

/// Format settings that decide how standings are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub format: SeriesFormat,
    /// Only meaningful when `format` is `Ladder`
    #[serde(default)]
    pub ladder_rule: LadderRule,
}

impl SeriesConfig {
    pub fn open_play() -> Self {
        Self {
            format: SeriesFormat::OpenPlay,
            ladder_rule: LadderRule::Classic,
        }
    }

    pub fn ladder(rule: LadderRule) -> Self {
        Self {
            format: SeriesFormat::Ladder,
            ladder_rule: rule,
        }
    }
}

/// Sets played when a series does not specify it
pub const DEFAULT_SETS_TO_PLAY: u32 = 5;

/// Read-only view of a series as needed for match validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub title: String,
    pub config: SeriesConfig,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Best-of-N sets; 0 means the default of 5
    #[serde(default)]
    pub sets_to_play: u32,
}

impl Series {
    pub fn effective_sets_to_play(&self) -> u32 {
        if self.sets_to_play == 0 {
            DEFAULT_SETS_TO_PLAY
        } else {
            self.sets_to_play
        }
    }
}

/// A reported match between two players
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub series_id: SeriesId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub score_a: u32,
    pub score_b: u32,
    pub played_at: DateTime<Utc>,
    /// Creation order within the repository; breaks ties on `played_at`
    pub sequence: u64,
}

impl MatchRecord {
    pub fn is_tie(&self) -> bool {
        self.score_a == self.score_b
    }

    /// `(winner, loser)` or `None` for a tie
    pub fn winner_and_loser(&self) -> Option<(&PlayerId, &PlayerId)> {
        match self.score_a.cmp(&self.score_b) {
            std::cmp::Ordering::Greater => Some((&self.player_a_id, &self.player_b_id)),
            std::cmp::Ordering::Less => Some((&self.player_b_id, &self.player_a_id)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Input for reporting a new match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMatch {
    pub series_id: SeriesId,
    pub player_a_id: PlayerId,
    pub player_b_id: PlayerId,
    pub score_a: u32,
    pub score_b: u32,
    pub played_at: DateTime<Utc>,
}

/// Partial update of an existing match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub played_at: Option<DateTime<Utc>>,
}

impl MatchUpdate {
    pub fn is_empty(&self) -> bool {
        self.score_a.is_none() && self.score_b.is_none() && self.played_at.is_none()
    }
}

/// Per-player counters accumulated over a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
}

impl PlayerStats {
    /// Count a played match and its games from this player's side
    pub fn record_games(&mut self, own_score: u32, opponent_score: u32) {
        self.matches_played += 1;
        self.games_won += own_score;
        self.games_lost += opponent_score;
    }
}

/// Engine output for one player, before it is stamped with series and time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub rank: u32,
    pub rating: i32,
    pub stats: PlayerStats,
}

/// Persisted leaderboard row, one per player per series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub series_id: SeriesId,
    pub player_id: PlayerId,
    pub rank: u32,
    /// Elo rating for open play. For ladder series this holds the ladder
    /// position (same value as `rank`), not a rating.
    pub rating: i32,
    pub matches_played: u32,
    pub matches_won: u32,
    pub matches_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub updated_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    pub fn from_standing(
        series_id: &SeriesId,
        standing: Standing,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            series_id: series_id.clone(),
            player_id: standing.player_id,
            rank: standing.rank,
            rating: standing.rating,
            matches_played: standing.stats.matches_played,
            matches_won: standing.stats.matches_won,
            matches_lost: standing.stats.matches_lost,
            games_won: standing.stats.games_won,
            games_lost: standing.stats.games_lost,
            updated_at,
        }
    }

    /// Matches won as a percentage of matches played
    pub fn win_rate(&self) -> f32 {
        if self.matches_played == 0 {
            return 0.0;
        }
        self.matches_won as f32 / self.matches_played as f32 * 100.0
    }

    /// Games won as a percentage of games played
    pub fn game_win_rate(&self) -> f32 {
        let total = self.games_won + self.games_lost;
        if total == 0 {
            return 0.0;
        }
        self.games_won as f32 / total as f32 * 100.0
    }
}
