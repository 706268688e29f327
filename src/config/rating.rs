//! Rating system configuration

use serde::{Deserialize, Serialize};

/// ELO rating configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    /// Rating given to a freshly registered policy
    pub initial_rating: f64,
    /// Scale applied by trainers when they store a rating change
    pub k_factor: f64,
    /// Number of frozen snapshot ratings a trainer keeps
    pub snapshot_window: usize,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            initial_rating: 1200.0,
            k_factor: 16.0,
            snapshot_window: 10,
        }
    }
}
