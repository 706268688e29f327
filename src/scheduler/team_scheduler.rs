//! Learning-team scheduler
//!
//! Every registered team takes turns in the learning slot. The first team to
//! register learns immediately; later teams queue up in registration order.
//! Trainers step independently, so each team's last swap is recorded in that
//! team's own step counter and the swap check only ever compares the learning
//! team's counter against its own last swap.
//!
//! Rating updates assume exactly two teams. With more, every non-learning
//! team is queried and adjusted, but only the last one in registration order
//! determines the opponent rating.

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::metrics::MetricsCollector;
use crate::rating::{elo, TrainerHandle};
use crate::scheduler::queue::RotationQueue;
use crate::scheduler::registry::TeamRegistry;
use crate::types::{RotationEvent, SchedulerSnapshot, Step, TeamId};
use crate::utils::current_timestamp;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Rotation events retained for inspection
const MAX_ROTATION_HISTORY: usize = 1024;

/// Statistics about scheduler operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchedulerStats {
    /// Distinct teams registered
    pub teams_registered: u64,
    /// Registrations ignored because the id was already known
    pub duplicate_registrations: u64,
    /// Learning-slot handovers
    pub rotations: u64,
    /// Swaps that were due while no other team was queued
    pub skipped_rotations: u64,
    /// Teams dropped from a full rotation queue
    pub queue_evictions: u64,
    /// Rating changes computed and fanned out to opponents
    pub rating_updates: u64,
    /// Rating requests answered with a zero change for lack of opponents
    pub skipped_rating_updates: u64,
}

/// Decides which team is learning and mediates opponent rating updates
pub struct TeamScheduler {
    config: SchedulerConfig,
    last_swap: HashMap<TeamId, Step>,
    queue: RotationQueue,
    learning_team: Option<TeamId>,
    registry: TeamRegistry,
    history: VecDeque<RotationEvent>,
    stats: SchedulerStats,
    metrics: Option<Arc<MetricsCollector>>,
}

impl TeamScheduler {
    /// Create a scheduler; fails if the swap interval or queue capacity is zero
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            queue: RotationQueue::new(config.queue_capacity),
            config,
            last_swap: HashMap::new(),
            learning_team: None,
            registry: TeamRegistry::new(),
            history: VecDeque::new(),
            stats: SchedulerStats::default(),
            metrics: None,
        })
    }

    /// Create a scheduler that records into `metrics`
    pub fn with_metrics(config: SchedulerConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        let mut scheduler = Self::new(config)?;
        scheduler.metrics = Some(metrics);
        Ok(scheduler)
    }

    /// Register `team_id` with the trainer that drives it
    ///
    /// The first team registered becomes the learning team; every later one
    /// joins the tail of the rotation queue. Registering a known id again
    /// changes nothing and returns `false`. Only a weak reference to the
    /// trainer is kept.
    pub fn register_team(&mut self, team_id: TeamId, trainer: Arc<dyn TrainerHandle>) -> bool {
        if !self.registry.insert(team_id, &trainer) {
            debug!("Team {} is already registered, ignoring", team_id);
            self.stats.duplicate_registrations += 1;
            return false;
        }

        self.last_swap.insert(team_id, 0);
        self.stats.teams_registered += 1;

        if self.learning_team.is_none() {
            self.learning_team = Some(team_id);
            info!("Team {} registered as the first learning team", team_id);
        } else {
            if let Some(evicted) = self.queue.push_back(team_id) {
                self.record_eviction(evicted);
            }
            info!(
                "Team {} registered, queued at position {}",
                team_id,
                self.queue.len()
            );
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_registration(self.learning_team, self.registry.len(), self.queue.len());
        }

        true
    }

    /// Learning team at `step`, rotating first if the swap interval has elapsed
    ///
    /// `step` is the calling trainer's own step counter. When
    /// `step >= swap_interval + last_swap[learning]`, the learning team's last
    /// swap becomes `step`, it moves to the tail of the queue and the head of
    /// the queue takes over. At most one rotation happens per call however far
    /// `step` has advanced. With no other team queued the swap is skipped.
    /// Returns `None` until a team has registered.
    pub fn learning_team_at(&mut self, step: Step) -> Option<TeamId> {
        let learning = self.learning_team?;
        let last_swap = self.last_swap.get(&learning).copied().unwrap_or(0);

        if step < self.config.swap_interval.saturating_add(last_swap) {
            return Some(learning);
        }

        if self.queue.is_empty() {
            debug!(
                "Swap due for team {} at step {} but no other team is queued",
                learning, step
            );
            self.record_skipped_rotation();
            return Some(learning);
        }

        self.last_swap.insert(learning, step);
        if let Some(evicted) = self.queue.push_back(learning) {
            self.record_eviction(evicted);
        }
        let Some(next) = self.queue.pop_front() else {
            return Some(learning);
        };

        // A full queue can evict every waiting team, handing the slot straight back
        if next == learning {
            warn!(
                "Team {} was the only team left in the rotation queue at step {}, it keeps learning",
                learning, step
            );
            self.record_skipped_rotation();
            return Some(learning);
        }

        self.learning_team = Some(next);

        info!(
            "Learning team rotated from {} to {} at step {}",
            learning, next, step
        );

        if self.history.len() == MAX_ROTATION_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(RotationEvent {
            previous_team: learning,
            next_team: next,
            step,
            timestamp: current_timestamp(),
        });
        self.stats.rotations += 1;

        if let Some(metrics) = &self.metrics {
            metrics.record_rotation(next, self.queue.len());
        }

        Some(next)
    }

    /// Learning team as seen by `team_id`'s trainer at its own `step`
    ///
    /// Only the learning team's own counter may trigger a swap; for any other
    /// team this is a plain lookup.
    pub fn poll_learning_team(&mut self, team_id: TeamId, step: Step) -> Result<Option<TeamId>> {
        if !self.registry.contains(team_id) {
            return Err(SchedulerError::TeamNotRegistered { team_id }.into());
        }

        if self.learning_team == Some(team_id) {
            Ok(self.learning_team_at(step))
        } else {
            Ok(self.learning_team)
        }
    }

    /// Rating change for the learning team after a match
    ///
    /// `rating` is the learning team's current rating and `result` its score
    /// (1.0 win, 0.0 loss, 0.5 draw). The opponent rating is read from every
    /// non-learning trainer, the last one read wins, and the resulting
    /// `result - expected_score` is applied to each of them through
    /// `change_opponent_rating`. The caller applies the returned change to the
    /// learning team itself. With no live opponent the change is 0.0 and no
    /// trainer is touched.
    pub fn compute_rating_change(&mut self, rating: f64, result: f64) -> f64 {
        let timer = self.metrics.as_ref().map(|metrics| metrics.start_timer());

        let opponents = match self.learning_team {
            Some(learning) => self.registry.opponents(learning),
            None => Vec::new(),
        };

        let mut opponent_rating = None;
        for (_, trainer) in &opponents {
            opponent_rating = Some(trainer.opponent_rating());
        }

        let Some(opponent_rating) = opponent_rating else {
            if self.registry.is_empty() {
                warn!("Rating change requested before any team registered, returning 0");
            } else {
                warn!("Rating change requested with no live opponent team, returning 0");
            }
            self.stats.skipped_rating_updates += 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_rating_update_skipped();
            }
            return 0.0;
        };

        if !(0.0..=1.0).contains(&result) {
            debug!("Match result {} is outside [0, 1]", result);
        }
        if opponents.len() > 1 {
            debug!(
                "{} opponent teams registered, rating against the last one only",
                opponents.len()
            );
        }

        let delta = elo::rating_change(rating, opponent_rating, result);
        for (team_id, trainer) in &opponents {
            debug!("Applying rating change {:.4} to opponent team {}", delta, team_id);
            trainer.change_opponent_rating(delta);
        }

        self.stats.rating_updates += 1;
        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_rating_update(delta, timer.stop());
        }

        delta
    }

    /// Current learning team without any swap check
    pub fn learning_team(&self) -> Option<TeamId> {
        self.learning_team
    }

    /// Step at which `team_id` last left the learning slot (0 if never)
    pub fn last_swap_step(&self, team_id: TeamId) -> Option<Step> {
        self.last_swap.get(&team_id).copied()
    }

    /// Queued teams, head first
    pub fn queued_teams(&self) -> Vec<TeamId> {
        self.queue.to_vec()
    }

    /// Registered team ids in registration order
    pub fn registered_teams(&self) -> Vec<TeamId> {
        self.registry.team_ids()
    }

    /// Whether `team_id` has been registered
    pub fn is_registered(&self, team_id: TeamId) -> bool {
        self.registry.contains(team_id)
    }

    /// Number of registered teams
    pub fn team_count(&self) -> usize {
        self.registry.len()
    }

    /// Steps a team keeps the learning slot
    pub fn swap_interval(&self) -> Step {
        self.config.swap_interval
    }

    /// Most recent rotations, oldest first
    pub fn rotation_history(&self) -> Vec<RotationEvent> {
        self.history.iter().cloned().collect()
    }

    /// Copy of the operation counters
    pub fn stats(&self) -> SchedulerStats {
        self.stats.clone()
    }

    /// Serializable copy of the rotation state
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            swap_interval: self.config.swap_interval,
            queue_capacity: self.queue.capacity(),
            learning_team: self.learning_team,
            rotation_queue: self.queue.to_vec(),
            last_swap: self.last_swap.iter().map(|(id, step)| (*id, *step)).collect(),
            registered_teams: self.registry.team_ids(),
        }
    }

    /// Forget every team and all rotation state; configuration is kept
    pub fn reset(&mut self) {
        info!("Resetting scheduler with {} registered teams", self.registry.len());

        self.last_swap.clear();
        self.queue.clear();
        self.learning_team = None;
        self.registry.clear();
        self.history.clear();
        self.stats = SchedulerStats::default();

        if let Some(metrics) = &self.metrics {
            metrics.record_reset();
        }
    }

    fn record_skipped_rotation(&mut self) {
        self.stats.skipped_rotations += 1;
        if let Some(metrics) = &self.metrics {
            metrics.record_rotation_skipped(self.queue.len());
        }
    }

    fn record_eviction(&mut self, evicted: TeamId) {
        warn!(
            "Rotation queue is full (capacity {}), team {} dropped from rotation",
            self.queue.capacity(),
            evicted
        );
        self.stats.queue_evictions += 1;
        if let Some(metrics) = &self.metrics {
            metrics.record_queue_eviction();
        }
    }
}
