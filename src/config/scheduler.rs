//! Learning-team rotation configuration

use crate::error::{Result, SchedulerError};
use crate::types::Step;
use serde::{Deserialize, Serialize};

/// Default maximum length of the rotation queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Settings for the team scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Trainer steps between learning-team rotations
    pub swap_interval: Step,
    /// Maximum number of teams waiting in the rotation queue
    pub queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            swap_interval: 10_000,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Create a configuration with the default queue capacity
    pub fn new(swap_interval: Step) -> Self {
        Self {
            swap_interval,
            ..Self::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.swap_interval == 0 {
            return Err(SchedulerError::InvalidConfiguration {
                message: "Swap interval must be greater than 0".to_string(),
            }
            .into());
        }

        if self.queue_capacity == 0 {
            return Err(SchedulerError::InvalidConfiguration {
                message: "Rotation queue capacity must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
