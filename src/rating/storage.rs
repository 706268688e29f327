//! In-memory trainer ratings
//!
//! A self-play trainer keeps one rating for the policy it is training and a
//! bounded window of ratings for frozen snapshots of that policy. When its
//! team is not learning, one of those snapshots is deployed as the opponent
//! and it is that snapshot's rating the scheduler reads and adjusts.

use crate::config::RatingConfig;
use crate::error::{Result, SchedulerError};
use crate::rating::elo::EloCalculator;
use crate::rating::handle::TrainerHandle;
use crate::types::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Point-in-time copy of a trainer's ratings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerRatings {
    pub current_rating: f64,
    /// Snapshot ratings, oldest first
    pub snapshot_ratings: Vec<f64>,
    /// Index into `snapshot_ratings` of the deployed opponent, if any
    pub deployed_snapshot: Option<usize>,
    pub snapshots_saved: u64,
}

#[derive(Debug)]
struct RatingState {
    current_rating: f64,
    snapshots: VecDeque<f64>,
    deployed: Option<usize>,
    snapshots_saved: u64,
}

/// Trainer handle backed by in-process rating storage
#[derive(Debug)]
pub struct InMemoryTrainer {
    team_id: TeamId,
    calculator: EloCalculator,
    window: usize,
    state: RwLock<RatingState>,
}

impl InMemoryTrainer {
    /// Create a trainer whose policy starts at the configured initial rating
    pub fn new(team_id: TeamId, config: &RatingConfig) -> Self {
        let calculator = EloCalculator::new(config.clone());
        Self {
            team_id,
            window: config.snapshot_window.max(1),
            state: RwLock::new(RatingState {
                current_rating: calculator.initial_rating(),
                snapshots: VecDeque::with_capacity(config.snapshot_window),
                deployed: None,
                snapshots_saved: 0,
            }),
            calculator,
        }
    }

    /// Team this trainer drives
    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    /// Rating of the policy being trained
    pub fn current_rating(&self) -> f64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .current_rating
    }

    /// Apply a rating change returned by the scheduler to the training policy
    pub fn apply_rating_change(&self, delta: f64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.current_rating += self.calculator.scaled_change(delta);
    }

    /// Freeze the current policy rating as a new snapshot
    ///
    /// The oldest snapshot is dropped once the window is full. Returns the
    /// index of the new snapshot.
    pub fn save_snapshot(&self) -> usize {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.snapshots.len() == self.window {
            state.snapshots.pop_front();
            // Keep the deployed index pointing at the same snapshot
            state.deployed = match state.deployed {
                Some(0) | None => None,
                Some(index) => Some(index - 1),
            };
        }

        let rating = state.current_rating;
        state.snapshots.push_back(rating);
        state.snapshots_saved += 1;

        debug!(
            "Team {} saved snapshot #{} at rating {:.1}",
            self.team_id, state.snapshots_saved, rating
        );

        state.snapshots.len() - 1
    }

    /// Deploy the snapshot at `index` as this team's opponent
    pub fn deploy_snapshot(&self, index: usize) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if index >= state.snapshots.len() {
            return Err(SchedulerError::SnapshotNotFound {
                team_id: self.team_id,
                index,
            }
            .into());
        }

        state.deployed = Some(index);
        Ok(())
    }

    /// Number of snapshots currently held
    pub fn snapshot_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshots
            .len()
    }

    /// Copy of all ratings held by this trainer
    pub fn ratings(&self) -> TrainerRatings {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        TrainerRatings {
            current_rating: state.current_rating,
            snapshot_ratings: state.snapshots.iter().copied().collect(),
            deployed_snapshot: state.deployed,
            snapshots_saved: state.snapshots_saved,
        }
    }
}

impl TrainerHandle for InMemoryTrainer {
    /// Rating of the deployed snapshot, or the live policy when none is deployed
    fn opponent_rating(&self) -> f64 {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .deployed
            .and_then(|index| state.snapshots.get(index).copied())
            .unwrap_or(state.current_rating)
    }

    /// The opponent loses what the learning team gains
    fn change_opponent_rating(&self, delta: f64) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let change = self.calculator.scaled_change(delta);

        match state.deployed {
            Some(index) => {
                if let Some(rating) = state.snapshots.get_mut(index) {
                    *rating -= change;
                }
            }
            None => state.current_rating -= change,
        }
    }
}
