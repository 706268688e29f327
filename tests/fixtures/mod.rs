//! Test fixtures and trainer doubles for integration testing

use ghost_coordinator::rating::TrainerHandle;
use ghost_coordinator::types::TeamId;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Trainer double that reports a fixed opponent rating and records changes
#[derive(Debug)]
pub struct RecordingTrainer {
    pub team_id: TeamId,
    opponent_rating: f64,
    rating_queries: AtomicUsize,
    changes: Mutex<Vec<f64>>,
}

impl RecordingTrainer {
    pub fn new(team_id: TeamId, opponent_rating: f64) -> Arc<Self> {
        Arc::new(Self {
            team_id,
            opponent_rating,
            rating_queries: AtomicUsize::new(0),
            changes: Mutex::new(Vec::new()),
        })
    }

    /// Number of times the scheduler asked for the opponent rating
    pub fn rating_queries(&self) -> usize {
        self.rating_queries.load(Ordering::SeqCst)
    }

    /// Rating changes applied by the scheduler, in order
    pub fn changes(&self) -> Vec<f64> {
        self.changes
            .lock()
            .map(|changes| changes.clone())
            .unwrap_or_default()
    }
}

impl TrainerHandle for RecordingTrainer {
    fn opponent_rating(&self) -> f64 {
        self.rating_queries.fetch_add(1, Ordering::SeqCst);
        self.opponent_rating
    }

    fn change_opponent_rating(&self, delta: f64) {
        if let Ok(mut changes) = self.changes.lock() {
            changes.push(delta);
        }
    }
}

/// Create one recording trainer per id, all reporting `opponent_rating`
pub fn recording_trainers(team_ids: &[TeamId], opponent_rating: f64) -> Vec<Arc<RecordingTrainer>> {
    team_ids
        .iter()
        .map(|team_id| RecordingTrainer::new(*team_id, opponent_rating))
        .collect()
}

pub fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() < 1e-9
}
