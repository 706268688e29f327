//! Metrics for learning-team rotation and rating updates
//!
//! The scheduler records into a `MetricsCollector` when one is attached;
//! callers own exposition of the registry.

pub mod collector;

pub use collector::{MetricsCollector, MetricsTimer, RatingMetrics, RotationMetrics};
