//! Service layer for the standings service
//!
//! Match mutations, validation, the recalculation orchestrator and the
//! application wiring that ties them to storage.

pub mod app;
pub mod history;
pub mod matches;
pub mod recalculation;
pub mod validation;

pub use app::AppState;
pub use history::{HistoryMatch, SeriesHistory};
pub use matches::MatchService;
pub use recalculation::{RecalculationOrchestrator, RecalculationOutcome, RecalculationReport};
