//! Match history files
//!
//! A history file describes one series and the matches reported in it, in
//! TOML. Timestamps are RFC 3339 strings.
//!
//! ```toml
//! [series]
//! id = "autumn-ladder"
//! title = "Autumn ladder"
//! starts_at = "2025-09-01T00:00:00Z"
//! ends_at = "2025-09-30T00:00:00Z"
//! sets_to_play = 5
//!
//! [series.config]
//! format = "ladder"
//! ladder_rule = "aggressive"
//!
//! [[matches]]
//! player_a = "alice"
//! player_b = "bob"
//! score_a = 3
//! score_b = 1
//! played_at = "2025-09-03T19:00:00Z"
//! ```

use crate::error::{Result, StandingsError};
use crate::types::{NewMatch, PlayerId, Series};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One match line of a history file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryMatch {
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    pub score_a: u32,
    pub score_b: u32,
    pub played_at: DateTime<Utc>,
}

/// A series and its matches in report order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesHistory {
    pub series: Series,
    #[serde(default)]
    pub matches: Vec<HistoryMatch>,
}

impl SeriesHistory {
    pub fn parse(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| {
            StandingsError::ConfigurationError {
                message: format!("Invalid history file: {}", e),
            }
            .into()
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| StandingsError::ConfigurationError {
            message: format!("Failed to read history file {}: {}", path.display(), e),
        })?;
        Self::parse(&raw)
    }

    /// Matches as reports against this series
    pub fn new_matches(&self) -> impl Iterator<Item = NewMatch> + '_ {
        self.matches.iter().map(|m| NewMatch {
            series_id: self.series.id.clone(),
            player_a_id: m.player_a.clone(),
            player_b_id: m.player_b.clone(),
            score_a: m.score_a,
            score_b: m.score_b,
            played_at: m.played_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LadderRule, SeriesFormat};

    const SAMPLE: &str = r#"
        [series]
        id = "autumn-ladder"
        title = "Autumn ladder"
        starts_at = "2025-09-01T00:00:00Z"
        ends_at = "2025-09-30T00:00:00Z"

        [series.config]
        format = "ladder"
        ladder_rule = "aggressive"

        [[matches]]
        player_a = "alice"
        player_b = "bob"
        score_a = 3
        score_b = 1
        played_at = "2025-09-03T19:00:00Z"
    "#;

    #[test]
    fn test_parse_history() {
        let history = SeriesHistory::parse(SAMPLE).unwrap();
        assert_eq!(history.series.config.format, SeriesFormat::Ladder);
        assert_eq!(history.series.config.ladder_rule, LadderRule::Aggressive);
        assert_eq!(history.series.effective_sets_to_play(), 5);

        let reports: Vec<NewMatch> = history.new_matches().collect();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].series_id, "autumn-ladder");
        assert_eq!(reports[0].player_b_id, "bob");
    }

    #[test]
    fn test_parse_rejects_unknown_format() {
        let broken = SAMPLE.replace("format = \"ladder\"", "format = \"swiss\"");
        let err = SeriesHistory::parse(&broken).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StandingsError>(),
            Some(StandingsError::ConfigurationError { .. })
        ));
    }
}
