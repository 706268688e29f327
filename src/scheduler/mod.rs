//! Learning-team rotation
//!
//! Teams share one learning slot. `TeamScheduler` decides which team holds it
//! at a given trainer step, hands it to the next queued team every
//! `swap_interval` steps, and mediates ELO updates to opponent teams.
//! `SharedScheduler` serializes access for callers on several threads.

pub mod queue;
pub mod registry;
pub mod shared;
pub mod team_scheduler;

// Re-export commonly used types
pub use queue::RotationQueue;
pub use registry::TeamRegistry;
pub use shared::SharedScheduler;
pub use team_scheduler::{SchedulerStats, TeamScheduler};
