//! Challenge ladder engine
//!
//! Positions are kept as an ordered list of slots, so position `p` is held by
//! `slots[p - 1]`. Every move is a rotation or a swap inside that list, which
//! keeps positions a permutation of `1..=N` at all times.

use crate::rating::engine::{StandingsComputation, StandingsEngine};
use crate::types::{LadderRule, MatchRecord, PlayerId, PlayerStats, SeriesFormat, Standing};
use std::collections::BTreeMap;
use tracing::debug;

/// Ladder positions of every player seen so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LadderPositions {
    slots: Vec<PlayerId>,
    positions: BTreeMap<PlayerId, u32>,
}

impl LadderPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Position of a player (1 = top), if seen
    pub fn position_of(&self, player_id: &str) -> Option<u32> {
        self.positions.get(player_id).copied()
    }

    /// Player currently holding a position
    pub fn holder_of(&self, position: u32) -> Option<&PlayerId> {
        let index = (position as usize).checked_sub(1)?;
        self.slots.get(index)
    }

    /// Place an unseen player at the bottom; returns the player's position
    pub fn ensure(&mut self, player_id: &PlayerId) -> u32 {
        if let Some(position) = self.position_of(player_id) {
            return position;
        }
        self.slots.push(player_id.clone());
        let position = self.slots.len() as u32;
        self.positions.insert(player_id.clone(), position);
        position
    }

    /// Move the player at `from` up to `to`, pushing `[to, from)` down by one
    pub fn climb(&mut self, from: u32, to: u32) {
        if to >= from || to == 0 || from as usize > self.slots.len() {
            return;
        }
        let (start, end) = (to as usize - 1, from as usize);
        self.slots[start..end].rotate_right(1);
        self.reindex(start, end);
    }

    /// Swap the holder of `position` with the holder of `position + 1`.
    /// Returns false when nobody sits directly below.
    pub fn drop_one(&mut self, position: u32) -> bool {
        let index = position as usize;
        if index == 0 || index >= self.slots.len() {
            return false;
        }
        self.slots.swap(index - 1, index);
        self.reindex(index - 1, index + 1);
        true
    }

    /// Players in position order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &PlayerId)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, player_id)| (index as u32 + 1, player_id))
    }

    /// Whether positions form exactly `1..=N` with no duplicates or gaps
    pub fn check_invariant(&self) -> bool {
        if self.positions.len() != self.slots.len() {
            return false;
        }
        let mut seen = vec![false; self.slots.len()];
        for (player_id, &position) in &self.positions {
            let Some(index) = (position as usize).checked_sub(1) else {
                return false;
            };
            if index >= seen.len() || seen[index] || &self.slots[index] != player_id {
                return false;
            }
            seen[index] = true;
        }
        seen.into_iter().all(|taken| taken)
    }

    fn reindex(&mut self, start: usize, end: usize) {
        for index in start..end {
            self.positions
                .insert(self.slots[index].clone(), index as u32 + 1);
        }
    }
}

/// Ladder ranking engine
#[derive(Debug, Clone, Default)]
pub struct LadderRankingEngine {
    rule: LadderRule,
}

impl LadderRankingEngine {
    pub fn new(rule: LadderRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> LadderRule {
        self.rule
    }

    /// Fold a chronological history into positions and counters
    ///
    /// Tied matches are skipped entirely: they neither place players nor
    /// count towards their statistics.
    pub fn fold(
        &self,
        matches: &[MatchRecord],
    ) -> (LadderPositions, BTreeMap<PlayerId, PlayerStats>, usize) {
        let mut ladder = LadderPositions::new();
        let mut stats: BTreeMap<PlayerId, PlayerStats> = BTreeMap::new();
        let mut ties = 0;

        for m in matches {
            let Some((winner, loser)) = m.winner_and_loser() else {
                ties += 1;
                continue;
            };

            let winner_pos = ladder.ensure(winner);
            let loser_pos = ladder.ensure(loser);

            stats
                .entry(m.player_a_id.clone())
                .or_default()
                .record_games(m.score_a, m.score_b);
            stats
                .entry(m.player_b_id.clone())
                .or_default()
                .record_games(m.score_b, m.score_a);
            stats.entry(winner.clone()).or_default().matches_won += 1;
            stats.entry(loser.clone()).or_default().matches_lost += 1;

            if winner_pos > loser_pos {
                ladder.climb(winner_pos, loser_pos);
            } else if self.rule == LadderRule::Aggressive {
                ladder.drop_one(loser_pos);
            }
        }

        (ladder, stats, ties)
    }
}

impl StandingsEngine for LadderRankingEngine {
    fn compute(&self, matches: &[MatchRecord]) -> StandingsComputation {
        let (ladder, mut stats, ties_skipped) = self.fold(matches);
        debug!(
            "Ladder fold ({}) over {} matches: {} players, {} ties skipped",
            self.rule,
            matches.len(),
            ladder.len(),
            ties_skipped
        );

        let standings = ladder
            .iter()
            .map(|(position, player_id)| Standing {
                player_id: player_id.clone(),
                rank: position,
                rating: position as i32,
                stats: stats.remove(player_id).unwrap_or_default(),
            })
            .collect();

        StandingsComputation {
            standings,
            matches_processed: matches.len(),
            ties_skipped,
        }
    }

    fn format(&self) -> SeriesFormat {
        SeriesFormat::Ladder
    }

    fn config(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "ladder",
            "ladder_rule": self.rule,
        })
    }
}
