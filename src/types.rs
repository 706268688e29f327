//! Common types used throughout the coordinator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-assigned identifier for a team
pub type TeamId = u32;

/// Trainer step counter
pub type Step = u64;

/// Outcome of a match from the learning team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

impl MatchOutcome {
    /// Expected-score target for this outcome
    pub fn score(self) -> f64 {
        match self {
            MatchOutcome::Win => 1.0,
            MatchOutcome::Loss => 0.0,
            MatchOutcome::Draw => 0.5,
        }
    }
}

impl From<MatchOutcome> for f64 {
    fn from(outcome: MatchOutcome) -> Self {
        outcome.score()
    }
}

impl std::fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchOutcome::Win => write!(f, "Win"),
            MatchOutcome::Loss => write!(f, "Loss"),
            MatchOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Recorded when the learning slot passes from one team to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationEvent {
    pub previous_team: TeamId,
    pub next_team: TeamId,
    /// Step reported by the caller that triggered the rotation
    pub step: Step,
    pub timestamp: DateTime<Utc>,
}

/// Serializable view of scheduler state, for an external persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    pub swap_interval: Step,
    pub queue_capacity: usize,
    pub learning_team: Option<TeamId>,
    /// Queue contents, head first
    pub rotation_queue: Vec<TeamId>,
    pub last_swap: BTreeMap<TeamId, Step>,
    /// Registered team ids in registration order
    pub registered_teams: Vec<TeamId>,
}

/// Final standing of one team at the end of a simulated league
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStanding {
    pub team_id: TeamId,
    pub hidden_strength: f64,
    pub rating: f64,
    /// Trainer steps taken while holding the learning slot
    pub learning_steps: Step,
    pub matches_played: u64,
    pub snapshots_saved: u64,
}
