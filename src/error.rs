//! Error types for the standings service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific standings scenarios
#[derive(Debug, thiserror::Error)]
pub enum StandingsError {
    #[error("Series not found: {series_id}")]
    SeriesNotFound { series_id: String },

    #[error("Match not found: {match_id}")]
    MatchNotFound { match_id: String },

    #[error("Invalid match: {reason}")]
    InvalidMatch { reason: String },

    #[error("Storage operation failed: {message}")]
    StorageFailure { message: String },

    #[error("Recalculation for series {series_id} timed out after {timeout_ms}ms")]
    RecalculationTimedOut { series_id: String, timeout_ms: u64 },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl StandingsError {
    /// Shorthand for a validation failure on an incoming match
    pub fn invalid_match(reason: impl Into<String>) -> Self {
        Self::InvalidMatch {
            reason: reason.into(),
        }
    }
}
