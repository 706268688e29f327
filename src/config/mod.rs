//! Configuration management for the ghost-coordinator
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values.

pub mod app;
pub mod rating;
pub mod scheduler;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, SimulationSettings};
pub use rating::RatingConfig;
pub use scheduler::SchedulerConfig;
