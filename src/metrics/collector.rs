//! Metrics collection using Prometheus
//!
//! This module provides metrics for learning-team rotation and ELO rating
//! updates using Prometheus metrics.

use crate::types::TeamId;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the coordinator
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Rotation-related metrics
    rotation_metrics: RotationMetrics,

    /// Rating-related metrics
    rating_metrics: RatingMetrics,
}

/// Rotation-related metrics
#[derive(Clone)]
pub struct RotationMetrics {
    /// Total learning-team rotations
    pub rotations_total: IntCounter,

    /// Rotations skipped because no other team was queued
    pub rotations_skipped_total: IntCounter,

    /// Teams dropped from a full rotation queue
    pub queue_evictions_total: IntCounter,

    /// Id of the current learning team (-1 when none)
    pub learning_team: IntGauge,

    /// Number of registered teams
    pub registered_teams: IntGauge,

    /// Teams waiting in the rotation queue
    pub queue_length: IntGauge,
}

/// Rating-related metrics
#[derive(Clone)]
pub struct RatingMetrics {
    /// Rating updates by status (applied, skipped)
    pub rating_updates_total: IntCounterVec,

    /// Distribution of rating changes returned to the learning team
    pub rating_delta: Histogram,

    /// Rating calculation time
    pub rating_calculation_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let rotation_metrics = RotationMetrics::new(&registry)?;
        let rating_metrics = RatingMetrics::new(&registry)?;

        Ok(Self {
            registry,
            rotation_metrics,
            rating_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get rotation metrics
    pub fn rotation(&self) -> &RotationMetrics {
        &self.rotation_metrics
    }

    /// Get rating metrics
    pub fn rating(&self) -> &RatingMetrics {
        &self.rating_metrics
    }

    /// Record a team registration
    pub fn record_registration(
        &self,
        learning_team: Option<TeamId>,
        registered: usize,
        queue_length: usize,
    ) {
        self.rotation_metrics
            .registered_teams
            .set(registered as i64);
        self.rotation_metrics.queue_length.set(queue_length as i64);
        self.set_learning_team(learning_team);
    }

    /// Record the learning slot moving to `next_team`
    pub fn record_rotation(&self, next_team: TeamId, queue_length: usize) {
        self.rotation_metrics.rotations_total.inc();
        self.rotation_metrics.queue_length.set(queue_length as i64);
        self.set_learning_team(Some(next_team));
    }

    /// Record a rotation that was due but had no queued team to hand over to
    pub fn record_rotation_skipped(&self, queue_length: usize) {
        self.rotation_metrics.rotations_skipped_total.inc();
        self.rotation_metrics.queue_length.set(queue_length as i64);
    }

    /// Record a team dropped from the rotation queue
    pub fn record_queue_eviction(&self) {
        self.rotation_metrics.queue_evictions_total.inc();
    }

    /// Record an applied rating update
    pub fn record_rating_update(&self, delta: f64, duration: Duration) {
        self.rating_metrics
            .rating_updates_total
            .with_label_values(&["applied"])
            .inc();
        self.rating_metrics.rating_delta.observe(delta);
        self.rating_metrics
            .rating_calculation_duration
            .observe(duration.as_secs_f64());
    }

    /// Record a rating update skipped for lack of opponents
    pub fn record_rating_update_skipped(&self) {
        self.rating_metrics
            .rating_updates_total
            .with_label_values(&["skipped"])
            .inc();
    }

    /// Reset gauges after the scheduler state is cleared
    pub fn record_reset(&self) {
        self.rotation_metrics.registered_teams.set(0);
        self.rotation_metrics.queue_length.set(0);
        self.set_learning_team(None);
    }

    /// Render all registered metrics in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }

    fn set_learning_team(&self, team: Option<TeamId>) {
        let value = team.map(i64::from).unwrap_or(-1);
        self.rotation_metrics.learning_team.set(value);
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl RotationMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rotations_total = IntCounter::new(
            "ghost_coordinator_rotations_total",
            "Total learning-team rotations",
        )?;
        registry.register(Box::new(rotations_total.clone()))?;

        let rotations_skipped_total = IntCounter::new(
            "ghost_coordinator_rotations_skipped_total",
            "Rotations skipped with an empty rotation queue",
        )?;
        registry.register(Box::new(rotations_skipped_total.clone()))?;

        let queue_evictions_total = IntCounter::new(
            "ghost_coordinator_queue_evictions_total",
            "Teams dropped from a full rotation queue",
        )?;
        registry.register(Box::new(queue_evictions_total.clone()))?;

        let learning_team = IntGauge::new(
            "ghost_coordinator_learning_team",
            "Current learning team id (-1 when none)",
        )?;
        learning_team.set(-1);
        registry.register(Box::new(learning_team.clone()))?;

        let registered_teams = IntGauge::new(
            "ghost_coordinator_registered_teams",
            "Number of registered teams",
        )?;
        registry.register(Box::new(registered_teams.clone()))?;

        let queue_length = IntGauge::new(
            "ghost_coordinator_queue_length",
            "Teams waiting in the rotation queue",
        )?;
        registry.register(Box::new(queue_length.clone()))?;

        Ok(Self {
            rotations_total,
            rotations_skipped_total,
            queue_evictions_total,
            learning_team,
            registered_teams,
            queue_length,
        })
    }
}

impl RatingMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let rating_updates_total = IntCounterVec::new(
            Opts::new(
                "ghost_coordinator_rating_updates_total",
                "Rating updates by status",
            ),
            &["status"],
        )?;
        registry.register(Box::new(rating_updates_total.clone()))?;

        let rating_delta = Histogram::with_opts(
            HistogramOpts::new(
                "ghost_coordinator_rating_delta",
                "Rating change returned to the learning team",
            )
            .buckets(vec![-1.0, -0.75, -0.5, -0.25, 0.0, 0.25, 0.5, 0.75, 1.0]),
        )?;
        registry.register(Box::new(rating_delta.clone()))?;

        let rating_calculation_duration = Histogram::with_opts(
            HistogramOpts::new(
                "ghost_coordinator_rating_calculation_duration_seconds",
                "Rating calculation duration",
            )
            .buckets(vec![0.000_001, 0.000_01, 0.000_1, 0.001, 0.01]),
        )?;
        registry.register(Box::new(rating_calculation_duration.clone()))?;

        Ok(Self {
            rating_updates_total,
            rating_delta,
            rating_calculation_duration,
        })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
