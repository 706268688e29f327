//! Pairwise ELO update rule
//!
//! Expected scores come from the skillratings crate, which evaluates
//! `1 / (1 + 10^((b - a) / 400))`. That is the same quantity as
//! `r1 / (r1 + r2)` with `r = 10^(rating / 400)` but stays finite for large
//! ratings.

use crate::config::RatingConfig;
use skillratings::elo::{expected_score as elo_expected_score, EloRating};

/// Expected score of a player rated `rating` against one rated `opponent_rating`
pub fn expected_score(rating: f64, opponent_rating: f64) -> f64 {
    let (expected, _) = elo_expected_score(
        &EloRating { rating },
        &EloRating {
            rating: opponent_rating,
        },
    );
    expected
}

/// Rating change for the first player given the match `result`
///
/// `result` is the first player's score: 1.0 win, 0.0 loss, 0.5 draw. Any
/// value is accepted and used as the target score; nothing is clamped.
pub fn rating_change(rating: f64, opponent_rating: f64, result: f64) -> f64 {
    result - expected_score(rating, opponent_rating)
}

/// ELO calculator carrying the trainer-side rating configuration
#[derive(Debug, Clone, Default)]
pub struct EloCalculator {
    config: RatingConfig,
}

impl EloCalculator {
    /// Create a calculator for the given rating configuration
    pub fn new(config: RatingConfig) -> Self {
        Self { config }
    }

    /// Rating configuration in use
    pub fn config(&self) -> &RatingConfig {
        &self.config
    }

    /// Rating a fresh policy starts from
    pub fn initial_rating(&self) -> f64 {
        self.config.initial_rating
    }

    /// Expected score of `rating` against `opponent_rating`
    pub fn expected_score(&self, rating: f64, opponent_rating: f64) -> f64 {
        expected_score(rating, opponent_rating)
    }

    /// Unscaled change, as returned by the scheduler
    pub fn rating_change(&self, rating: f64, opponent_rating: f64, result: f64) -> f64 {
        rating_change(rating, opponent_rating, result)
    }

    /// Points a stored rating moves for an unscaled change
    pub fn scaled_change(&self, delta: f64) -> f64 {
        self.config.k_factor * delta
    }
}
