//! Thread-safe scheduler handle
//!
//! Rotation reads the last swap, pushes and pops the queue as one compound
//! transition, so every call runs under a single mutex.

use crate::config::SchedulerConfig;
use crate::error::{Result, SchedulerError};
use crate::metrics::MetricsCollector;
use crate::rating::TrainerHandle;
use crate::scheduler::team_scheduler::{SchedulerStats, TeamScheduler};
use crate::types::{RotationEvent, SchedulerSnapshot, Step, TeamId};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to one `TeamScheduler` shared between trainers
#[derive(Clone)]
pub struct SharedScheduler {
    inner: Arc<Mutex<TeamScheduler>>,
}

impl SharedScheduler {
    /// Create a shared scheduler
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        Ok(Self::from_scheduler(TeamScheduler::new(config)?))
    }

    /// Create a shared scheduler that records into `metrics`
    pub fn with_metrics(config: SchedulerConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        Ok(Self::from_scheduler(TeamScheduler::with_metrics(
            config, metrics,
        )?))
    }

    /// Wrap an existing scheduler
    pub fn from_scheduler(scheduler: TeamScheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(scheduler)),
        }
    }

    /// See [`TeamScheduler::register_team`]
    pub fn register_team(&self, team_id: TeamId, trainer: Arc<dyn TrainerHandle>) -> Result<bool> {
        Ok(self.lock("register_team")?.register_team(team_id, trainer))
    }

    /// See [`TeamScheduler::learning_team_at`]
    pub fn learning_team_at(&self, step: Step) -> Result<Option<TeamId>> {
        Ok(self.lock("learning_team_at")?.learning_team_at(step))
    }

    /// See [`TeamScheduler::poll_learning_team`]
    pub fn poll_learning_team(&self, team_id: TeamId, step: Step) -> Result<Option<TeamId>> {
        self.lock("poll_learning_team")?
            .poll_learning_team(team_id, step)
    }

    /// See [`TeamScheduler::compute_rating_change`]
    pub fn compute_rating_change(&self, rating: f64, result: f64) -> Result<f64> {
        Ok(self
            .lock("compute_rating_change")?
            .compute_rating_change(rating, result))
    }

    /// Current learning team without any swap check
    pub fn learning_team(&self) -> Result<Option<TeamId>> {
        Ok(self.lock("learning_team")?.learning_team())
    }

    /// Serializable copy of the rotation state
    pub fn snapshot(&self) -> Result<SchedulerSnapshot> {
        Ok(self.lock("snapshot")?.snapshot())
    }

    /// Copy of the scheduler's operation counters
    pub fn stats(&self) -> Result<SchedulerStats> {
        Ok(self.lock("stats")?.stats())
    }

    /// Most recent rotations, oldest first
    pub fn rotation_history(&self) -> Result<Vec<RotationEvent>> {
        Ok(self.lock("rotation_history")?.rotation_history())
    }

    /// Forget every team and all rotation state
    pub fn reset(&self) -> Result<()> {
        self.lock("reset")?.reset();
        Ok(())
    }

    fn lock(&self, operation: &str) -> Result<MutexGuard<'_, TeamScheduler>> {
        self.inner.lock().map_err(|_| {
            SchedulerError::LockPoisoned {
                operation: operation.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RatingConfig;
    use crate::rating::InMemoryTrainer;

    fn trainers(count: u32) -> Vec<Arc<InMemoryTrainer>> {
        (1..=count)
            .map(|team_id| Arc::new(InMemoryTrainer::new(team_id, &RatingConfig::default())))
            .collect()
    }

    #[test]
    fn test_shared_rotation() {
        let scheduler = SharedScheduler::new(SchedulerConfig::new(100)).unwrap();
        let trainers = trainers(2);
        for trainer in &trainers {
            scheduler
                .register_team(trainer.team_id(), trainer.clone())
                .unwrap();
        }

        assert_eq!(scheduler.learning_team_at(50).unwrap(), Some(1));
        assert_eq!(scheduler.learning_team_at(100).unwrap(), Some(2));
        assert_eq!(scheduler.rotation_history().unwrap().len(), 1);
        assert_eq!(scheduler.stats().unwrap().rotations, 1);
    }

    #[test]
    fn test_clones_share_state() {
        let scheduler = SharedScheduler::new(SchedulerConfig::new(10)).unwrap();
        let other = scheduler.clone();
        let trainers = trainers(2);

        scheduler
            .register_team(1, trainers[0].clone())
            .unwrap();
        other.register_team(2, trainers[1].clone()).unwrap();

        assert_eq!(other.snapshot().unwrap().registered_teams, vec![1, 2]);

        other.reset().unwrap();
        assert_eq!(scheduler.learning_team().unwrap(), None);
    }

    #[test]
    fn test_rating_change_updates_opponent_trainer() {
        let scheduler = SharedScheduler::new(SchedulerConfig::new(100)).unwrap();
        let trainers = trainers(2);
        for trainer in &trainers {
            scheduler
                .register_team(trainer.team_id(), trainer.clone())
                .unwrap();
        }

        let delta = scheduler
            .compute_rating_change(trainers[0].current_rating(), 1.0)
            .unwrap();
        trainers[0].apply_rating_change(delta);

        assert!((delta - 0.5).abs() < 1e-9);
        assert_eq!(trainers[0].current_rating(), 1208.0);
        assert_eq!(trainers[1].current_rating(), 1192.0);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let scheduler = SharedScheduler::new(SchedulerConfig::new(10)).unwrap();
        let poisoner = scheduler.clone();

        let _ = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("poison the scheduler lock");
        })
        .join();

        let err = scheduler.learning_team_at(0).unwrap_err();
        assert!(err
            .to_string()
            .contains("Scheduler lock poisoned during learning_team_at"));
    }
}
