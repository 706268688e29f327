//! ELO rating arithmetic and the trainer rating capability
//!
//! The scheduler only needs two things from a trainer: the rating of the
//! opponent snapshot it currently deploys, and a way to adjust it. The ELO
//! update itself is a pure function of two ratings and a match result.

pub mod elo;
pub mod handle;
pub mod storage;

// Re-export commonly used types
pub use elo::{expected_score, rating_change, EloCalculator};
pub use handle::TrainerHandle;
pub use storage::InMemoryTrainer;
