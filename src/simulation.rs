//! Simulated self-play league
//!
//! Drives the scheduler the way concurrent trainers would: each team's trainer
//! runs as its own task with its own step counter and stepping speed, asks the
//! shared scheduler who is learning, and while learning saves policy snapshots
//! and reports match results. Outcomes are sampled from hidden team strengths,
//! so a healthy run ends with ratings ordered like the strengths.

use crate::config::AppConfig;
use crate::error::{Result, SchedulerError};
use crate::metrics::MetricsCollector;
use crate::rating::{elo, InMemoryTrainer};
use crate::scheduler::{SchedulerStats, SharedScheduler};
use crate::types::{MatchOutcome, SchedulerSnapshot, Step, TeamId, TeamStanding};
use crate::utils::rating_difference;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hidden strengths are drawn from this range of ELO points
const STRENGTH_RANGE: std::ops::Range<f64> = 1000.0..1800.0;

/// Loop iterations between cooperative yields so trainer tasks interleave
const YIELD_EVERY: u64 = 64;

/// Outcome of a simulated league run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub swap_interval: Step,
    pub rotations: u64,
    pub rating_updates: u64,
    pub skipped_rating_updates: u64,
    /// Gap between the highest and lowest final rating
    pub rating_spread: f64,
    /// One entry per team, strongest hidden strength first
    pub standings: Vec<TeamStanding>,
    pub final_state: SchedulerSnapshot,
}

struct LeagueTeam {
    team_id: TeamId,
    strength: f64,
    trainer: Arc<InMemoryTrainer>,
}

#[derive(Debug, Default)]
struct TrainerSummary {
    learning_steps: Step,
    matches_played: u64,
}

/// Self-play league over a shared scheduler
pub struct LeagueSimulation {
    config: AppConfig,
    metrics: Arc<MetricsCollector>,
}

impl LeagueSimulation {
    /// Create a simulation; the configuration is validated first
    pub fn new(config: AppConfig) -> Result<Self> {
        Self::with_metrics(config, Arc::new(MetricsCollector::new()?))
    }

    /// Create a simulation that records scheduler metrics into `metrics`
    pub fn with_metrics(config: AppConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        crate::config::validate_config(&config)?;
        Ok(Self { config, metrics })
    }

    /// Metrics collector the scheduler records into
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Run every trainer to completion and report final standings
    pub async fn run(&self) -> Result<SimulationReport> {
        let settings = &self.config.simulation;
        let scheduler =
            SharedScheduler::with_metrics(self.config.scheduler.clone(), self.metrics.clone())?;

        let mut rng = StdRng::seed_from_u64(settings.seed);
        let teams: Arc<Vec<LeagueTeam>> = Arc::new(
            (1..=settings.teams)
                .map(|team_id| LeagueTeam {
                    team_id,
                    strength: rng.gen_range(STRENGTH_RANGE),
                    trainer: Arc::new(InMemoryTrainer::new(team_id, &self.config.rating)),
                })
                .collect(),
        );

        for team in teams.iter() {
            scheduler.register_team(team.team_id, team.trainer.clone())?;
            debug!(
                "Team {} joined the league with hidden strength {:.0}",
                team.team_id, team.strength
            );
        }

        if teams.len() > 2 {
            warn!(
                "{} teams registered; rating updates only use the last opponent team",
                teams.len()
            );
        }

        info!(
            "Starting league: {} teams, {} steps each, swap every {} steps",
            teams.len(),
            settings.steps_per_team,
            self.config.scheduler.swap_interval
        );

        let mut handles = Vec::with_capacity(teams.len());
        for index in 0..teams.len() {
            let teams = teams.clone();
            let scheduler = scheduler.clone();
            let config = self.config.clone();
            handles.push(tokio::spawn(async move {
                run_trainer(index, teams, scheduler, config).await
            }));
        }

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let summary = handle.await.map_err(|e| SchedulerError::SimulationFailed {
                reason: format!("trainer task failed: {}", e),
            })??;
            summaries.push(summary);
        }

        let stats: SchedulerStats = scheduler.stats()?;
        let final_state = scheduler.snapshot()?;

        let mut standings: Vec<TeamStanding> = teams
            .iter()
            .zip(&summaries)
            .map(|(team, summary)| TeamStanding {
                team_id: team.team_id,
                hidden_strength: team.strength,
                rating: team.trainer.current_rating(),
                learning_steps: summary.learning_steps,
                matches_played: summary.matches_played,
                snapshots_saved: team.trainer.ratings().snapshots_saved,
            })
            .collect();
        standings.sort_by(|a, b| {
            b.hidden_strength
                .partial_cmp(&a.hidden_strength)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (lowest, highest) = standings
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), standing| {
                (low.min(standing.rating), high.max(standing.rating))
            });
        let rating_spread = if standings.is_empty() {
            0.0
        } else {
            rating_difference(highest, lowest)
        };

        info!(
            "League finished: {} rotations, {} rating updates, rating spread {:.1}",
            stats.rotations, stats.rating_updates, rating_spread
        );

        Ok(SimulationReport {
            swap_interval: self.config.scheduler.swap_interval,
            rotations: stats.rotations,
            rating_updates: stats.rating_updates,
            skipped_rating_updates: stats.skipped_rating_updates,
            rating_spread,
            standings,
            final_state,
        })
    }
}

/// One trainer's loop; `index` selects its team in `teams`
///
/// The trainer keeps stepping its environment throughout, but the counter it
/// reports to the scheduler only advances while its team holds the learning
/// slot.
async fn run_trainer(
    index: usize,
    teams: Arc<Vec<LeagueTeam>>,
    scheduler: SharedScheduler,
    config: AppConfig,
) -> Result<TrainerSummary> {
    let settings = &config.simulation;
    let team = &teams[index];
    let mut rng = StdRng::seed_from_u64(settings.seed.wrapping_add(u64::from(team.team_id)));

    // Trainers step at different speeds so their counters drift apart
    let stride = 1 + (index as Step % 3);
    let mut summary = TrainerSummary::default();
    let mut next_snapshot = settings.snapshot_interval;
    let mut next_match = settings.match_interval;
    let mut env_steps: Step = 0;
    let mut iterations: u64 = 0;

    while env_steps + stride <= settings.steps_per_team {
        env_steps += stride;
        iterations += 1;

        let learning = scheduler.poll_learning_team(team.team_id, summary.learning_steps)?;
        if learning == Some(team.team_id) {
            summary.learning_steps += stride;

            if summary.learning_steps >= next_snapshot {
                team.trainer.save_snapshot();
                next_snapshot = summary.learning_steps + settings.snapshot_interval;
            }

            if summary.learning_steps >= next_match {
                play_match(team, &teams, &scheduler, &mut rng)?;
                summary.matches_played += 1;
                next_match = summary.learning_steps + settings.match_interval;
            }
        }

        if iterations % YIELD_EVERY == 0 {
            tokio::task::yield_now().await;
        }
    }

    debug!(
        "Trainer for team {} stopped after {} environment steps, {} learning steps and {} matches",
        team.team_id, env_steps, summary.learning_steps, summary.matches_played
    );

    Ok(summary)
}

/// Play one match for the learning `team` and apply the rating change
fn play_match(
    team: &LeagueTeam,
    teams: &[LeagueTeam],
    scheduler: &SharedScheduler,
    rng: &mut StdRng,
) -> Result<()> {
    // The scheduler rates against the last non-learning team, so play that one
    let Some(opponent) = teams.iter().rev().find(|other| other.team_id != team.team_id) else {
        // Alone in the league: nothing to play, and the scheduler returns 0
        scheduler.compute_rating_change(team.trainer.current_rating(), MatchOutcome::Draw.score())?;
        return Ok(());
    };

    let snapshots = opponent.trainer.snapshot_count();
    if snapshots > 0 {
        opponent.trainer.deploy_snapshot(rng.gen_range(0..snapshots))?;
    }

    let win_probability = elo::expected_score(team.strength, opponent.strength);
    let outcome = if rng.gen_bool(win_probability.clamp(0.0, 1.0)) {
        MatchOutcome::Win
    } else {
        MatchOutcome::Loss
    };

    let delta = scheduler.compute_rating_change(team.trainer.current_rating(), outcome.into())?;
    team.trainer.apply_rating_change(delta);

    debug!(
        "Team {} {} against team {}, rating change {:+.3}",
        team.team_id, outcome, opponent.team_id, delta
    );

    Ok(())
}
