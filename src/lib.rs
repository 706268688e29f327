//! Ghost Coordinator - learning-team rotation for self-play training
//!
//! Several trainers share one learning slot: one team trains while the others
//! play frozen snapshots of past policies. This crate decides which team
//! learns at each trainer step, rotates the slot on a fixed step interval, and
//! computes ELO rating changes between the learning team and its opponents.

pub mod config;
pub mod error;
pub mod metrics;
pub mod rating;
pub mod scheduler;
pub mod simulation;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{Result, SchedulerError};
pub use types::*;

// Re-export key components
pub use rating::{InMemoryTrainer, TrainerHandle};
pub use scheduler::{SharedScheduler, TeamScheduler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
