//! Validation rules for reported matches

use crate::error::{Result, StandingsError};
use crate::types::{NewMatch, Series};
use chrono::{DateTime, NaiveDate, Utc};

/// Check a best-of-N set score
///
/// The winner must take exactly `(sets_to_play + 1) / 2` sets and the score
/// cannot be level.
pub fn validate_set_score(sets_a: u32, sets_b: u32, sets_to_play: u32) -> Result<()> {
    if sets_to_play == 0 {
        return Err(StandingsError::invalid_match("sets to play must be positive").into());
    }

    if sets_a == sets_b {
        return Err(StandingsError::invalid_match("scores cannot be tied").into());
    }

    let required = (sets_to_play + 1) / 2;

    if sets_a.max(sets_b) < required {
        return Err(StandingsError::invalid_match(format!(
            "best of {} requires the winner to take {} sets",
            sets_to_play, required
        ))
        .into());
    }

    if sets_a > required || sets_b > required {
        return Err(StandingsError::invalid_match(format!(
            "score {}-{} exceeds best of {}",
            sets_a, sets_b, sets_to_play
        ))
        .into());
    }

    Ok(())
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|t| t.and_utc())
}

/// Check that a match falls inside the series window, whole days inclusive
pub fn validate_match_time_window(
    played_at: DateTime<Utc>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<()> {
    let window_start = start_of_day(starts_at.date_naive());
    let window_end = ends_at.date_naive().succ_opt().and_then(start_of_day);

    let too_early = window_start.is_some_and(|start| played_at < start);
    let too_late = window_end.is_some_and(|end| played_at >= end);

    if too_early || too_late {
        return Err(StandingsError::invalid_match(format!(
            "match date {} must be between series start date {} and end date {} (inclusive)",
            played_at.format("%Y-%m-%d"),
            starts_at.format("%Y-%m-%d"),
            ends_at.format("%Y-%m-%d")
        ))
        .into());
    }

    Ok(())
}

/// Full validation of a newly reported match against its series
pub fn validate_new_match(new_match: &NewMatch, series: &Series) -> Result<()> {
    if new_match.series_id.is_empty()
        || new_match.player_a_id.is_empty()
        || new_match.player_b_id.is_empty()
    {
        return Err(StandingsError::invalid_match("series and both players are required").into());
    }

    if new_match.player_a_id == new_match.player_b_id {
        return Err(StandingsError::invalid_match("a player cannot play against themselves").into());
    }

    validate_set_score(
        new_match.score_a,
        new_match.score_b,
        series.effective_sets_to_play(),
    )?;
    validate_match_time_window(new_match.played_at, series.starts_at, series.ends_at)
}
