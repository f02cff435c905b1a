//! Configuration management for the standings service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, RecalculationSettings, ServiceSettings};
pub use rating::{EloSettings, RatingConfig, RatingTruncation};
