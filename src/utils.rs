//! Utility functions for the standings service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Truncate a rating toward zero, as stored on the leaderboard
pub fn truncate_rating(rating: f64) -> i32 {
    rating.trunc() as i32
}
