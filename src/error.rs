//! Error types for the self-play coordinator
//!
//! Fallible operations return `anyhow::Result`, with `SchedulerError`
//! describing the failures specific to scheduling and rating updates.

use crate::types::TeamId;

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for scheduling and rating scenarios
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Invalid scheduler configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Team not registered: {team_id}")]
    TeamNotRegistered { team_id: TeamId },

    #[error("Snapshot {index} not found for team {team_id}")]
    SnapshotNotFound { team_id: TeamId, index: usize },

    #[error("Scheduler lock poisoned during {operation}")]
    LockPoisoned { operation: String },

    #[error("Simulation failed: {reason}")]
    SimulationFailed { reason: String },
}
