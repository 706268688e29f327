//! Team id to trainer handle associations
//!
//! The registry holds `Weak` references: trainers are owned by the caller and
//! a handle whose trainer has been dropped is simply skipped.

use crate::rating::TrainerHandle;
use crate::types::TeamId;
use std::sync::{Arc, Weak};
use tracing::warn;

#[derive(Clone)]
struct TeamEntry {
    team_id: TeamId,
    trainer: Weak<dyn TrainerHandle>,
}

/// Registration-ordered association of team ids to trainer handles
#[derive(Clone, Default)]
pub struct TeamRegistry {
    entries: Vec<TeamEntry>,
}

impl TeamRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `team_id` is registered
    pub fn contains(&self, team_id: TeamId) -> bool {
        self.entries.iter().any(|entry| entry.team_id == team_id)
    }

    /// Associate `team_id` with `trainer`; returns false if the id is already known
    pub fn insert(&mut self, team_id: TeamId, trainer: &Arc<dyn TrainerHandle>) -> bool {
        if self.contains(team_id) {
            return false;
        }

        self.entries.push(TeamEntry {
            team_id,
            trainer: Arc::downgrade(trainer),
        });
        true
    }

    /// Number of registered teams
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no team is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered team ids in registration order
    pub fn team_ids(&self) -> Vec<TeamId> {
        self.entries.iter().map(|entry| entry.team_id).collect()
    }

    /// Live trainer handles of every team other than `learning_team`, in registration order
    pub fn opponents(&self, learning_team: TeamId) -> Vec<(TeamId, Arc<dyn TrainerHandle>)> {
        self.entries
            .iter()
            .filter(|entry| entry.team_id != learning_team)
            .filter_map(|entry| match entry.trainer.upgrade() {
                Some(trainer) => Some((entry.team_id, trainer)),
                None => {
                    warn!(
                        "Trainer for team {} has been dropped, skipping it as an opponent",
                        entry.team_id
                    );
                    None
                }
            })
            .collect()
    }

    /// Forget every team
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for TeamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeamRegistry")
            .field("team_ids", &self.team_ids())
            .finish()
    }
}
