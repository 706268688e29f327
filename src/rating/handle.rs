//! Capability a trainer exposes to the scheduler

/// Rating access the scheduler needs from an external trainer
///
/// Implementations own their rating storage and its synchronization; the
/// scheduler only calls these two methods.
#[cfg_attr(test, mockall::automock)]
pub trait TrainerHandle: Send + Sync {
    /// Rating of the policy snapshot this trainer currently deploys as an opponent
    fn opponent_rating(&self) -> f64;

    /// Apply the learning team's rating change to the deployed opponent snapshot
    fn change_opponent_rating(&self, delta: f64);
}
