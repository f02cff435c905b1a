//! Chronological ordering of match histories
//!
//! Both engines fold matches left to right, so the order is part of the result.
//! Matches are ordered by `played_at`, then by repository creation sequence.

use crate::types::MatchRecord;
use std::cmp::Ordering;

/// Total order used for every standings computation
pub fn chronological(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.played_at
        .cmp(&b.played_at)
        .then_with(|| a.sequence.cmp(&b.sequence))
}

/// Sort matches in place into chronological order
pub fn order_chronologically(matches: &mut [MatchRecord]) {
    matches.sort_by(chronological);
}

/// Whether the slice is already in chronological order
pub fn is_chronological(matches: &[MatchRecord]) -> bool {
    matches
        .windows(2)
        .all(|pair| chronological(&pair[0], &pair[1]) != Ordering::Greater)
}
