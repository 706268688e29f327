//! Main application configuration
//!
//! This module defines the top-level configuration for the coordinator and
//! its demo league driver, including environment and file loading and
//! validation.

use crate::config::{RatingConfig, SchedulerConfig};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub scheduler: SchedulerConfig,
    pub rating: RatingConfig,
    pub simulation: SimulationSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Settings for the simulated self-play league
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of teams in the league
    pub teams: u32,
    /// Steps each team's trainer runs before stopping
    pub steps_per_team: u64,
    /// Trainer steps between match results
    pub match_interval: u64,
    /// Trainer steps between saved policy snapshots
    pub snapshot_interval: u64,
    /// RNG seed for match outcomes and team strengths
    pub seed: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ghost-coordinator".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            teams: 2,
            steps_per_team: 50_000,
            match_interval: 100,
            snapshot_interval: 2_000,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Scheduler settings
        if let Ok(interval) = env::var("SWAP_INTERVAL") {
            config.scheduler.swap_interval = interval
                .parse()
                .map_err(|_| anyhow!("Invalid SWAP_INTERVAL value: {}", interval))?;
        }
        if let Ok(capacity) = env::var("ROTATION_QUEUE_CAPACITY") {
            config.scheduler.queue_capacity = capacity
                .parse()
                .map_err(|_| anyhow!("Invalid ROTATION_QUEUE_CAPACITY value: {}", capacity))?;
        }

        // Rating settings
        if let Ok(rating) = env::var("INITIAL_RATING") {
            config.rating.initial_rating = rating
                .parse()
                .map_err(|_| anyhow!("Invalid INITIAL_RATING value: {}", rating))?;
        }

        // Simulation settings
        if let Ok(teams) = env::var("SIM_TEAMS") {
            config.simulation.teams = teams
                .parse()
                .map_err(|_| anyhow!("Invalid SIM_TEAMS value: {}", teams))?;
        }
        if let Ok(steps) = env::var("SIM_STEPS") {
            config.simulation.steps_per_team = steps
                .parse()
                .map_err(|_| anyhow!("Invalid SIM_STEPS value: {}", steps))?;
        }
        if let Ok(interval) = env::var("SIM_MATCH_INTERVAL") {
            config.simulation.match_interval = interval
                .parse()
                .map_err(|_| anyhow!("Invalid SIM_MATCH_INTERVAL value: {}", interval))?;
        }
        if let Ok(seed) = env::var("SIM_SEED") {
            config.simulation.seed = seed
                .parse()
                .map_err(|_| anyhow!("Invalid SIM_SEED value: {}", seed))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing keys take default values
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    config.scheduler.validate()?;

    // Validate rating settings
    if !config.rating.initial_rating.is_finite() {
        return Err(anyhow!("Initial rating must be a finite number"));
    }
    if !config.rating.k_factor.is_finite() || config.rating.k_factor <= 0.0 {
        return Err(anyhow!("K-factor must be positive"));
    }
    if config.rating.snapshot_window == 0 {
        return Err(anyhow!("Snapshot window must be greater than 0"));
    }

    // Validate simulation settings
    if config.simulation.teams == 0 {
        return Err(anyhow!("Simulation needs at least one team"));
    }
    if config.simulation.match_interval == 0 {
        return Err(anyhow!("Match interval must be greater than 0"));
    }
    if config.simulation.snapshot_interval == 0 {
        return Err(anyhow!("Snapshot interval must be greater than 0"));
    }

    Ok(())
}
