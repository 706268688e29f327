//! Integration tests for the ghost-coordinator
//!
//! These tests drive the public scheduler API end to end:
//! - Registration order and idempotence
//! - Rotation thresholds over independent step counters
//! - Rating fan-out to opponent trainers
//! - Snapshot serialization for external persistence

mod fixtures;

use fixtures::{approx_eq, recording_trainers, RecordingTrainer};
use ghost_coordinator::config::{RatingConfig, SchedulerConfig};
use ghost_coordinator::rating::InMemoryTrainer;
use ghost_coordinator::scheduler::TeamScheduler;
use ghost_coordinator::types::{MatchOutcome, SchedulerSnapshot};
use proptest::prelude::*;
use std::sync::Arc;

fn register_all(scheduler: &mut TeamScheduler, trainers: &[Arc<RecordingTrainer>]) {
    for trainer in trainers {
        scheduler.register_team(trainer.team_id, trainer.clone());
    }
}

#[test]
fn test_three_team_rotation_and_rating_scenario() {
    let mut scheduler = TeamScheduler::new(SchedulerConfig::new(100)).unwrap();
    let trainers = recording_trainers(&[1, 2, 3], 1500.0);
    register_all(&mut scheduler, &trainers);

    // Step 1: team 1 learns first, no rotation before the interval
    assert_eq!(scheduler.learning_team(), Some(1));
    assert_eq!(scheduler.learning_team_at(50), Some(1));
    assert_eq!(scheduler.queued_teams(), vec![2, 3]);

    // Step 2: interval reached, team 2 takes over and team 1 goes to the back
    assert_eq!(scheduler.learning_team_at(100), Some(2));
    assert_eq!(scheduler.queued_teams(), vec![3, 1]);

    // Step 3: rating update queries and adjusts both non-learning teams
    let delta = scheduler.compute_rating_change(1500.0, MatchOutcome::Win.score());
    assert!(approx_eq(delta, 0.5));

    assert_eq!(trainers[0].rating_queries(), 1);
    assert_eq!(trainers[1].rating_queries(), 0);
    assert_eq!(trainers[2].rating_queries(), 1);

    assert_eq!(trainers[0].changes(), vec![delta]);
    assert!(trainers[1].changes().is_empty());
    assert_eq!(trainers[2].changes(), vec![delta]);
}

#[test]
fn test_draw_between_equal_ratings_changes_nothing() {
    let mut scheduler = TeamScheduler::new(SchedulerConfig::new(10)).unwrap();
    let trainers = recording_trainers(&[1, 2], 1350.0);
    register_all(&mut scheduler, &trainers);

    let delta = scheduler.compute_rating_change(1350.0, MatchOutcome::Draw.score());
    assert!(approx_eq(delta, 0.0));
    assert_eq!(trainers[1].changes().len(), 1);
}

#[test]
fn test_underdog_win_against_stronger_opponent() {
    let mut scheduler = TeamScheduler::new(SchedulerConfig::new(10)).unwrap();
    let learner = RecordingTrainer::new(1, 1200.0);
    let favourite = RecordingTrainer::new(2, 1600.0);
    scheduler.register_team(1, learner.clone());
    scheduler.register_team(2, favourite.clone());

    let delta = scheduler.compute_rating_change(1200.0, 1.0);
    assert!(delta > 0.5);
    assert!(approx_eq(delta, 10.0 / 11.0));
}

#[test]
fn test_two_in_memory_trainers_trade_rating() {
    let mut scheduler = TeamScheduler::new(SchedulerConfig::new(100)).unwrap();
    let rating_config = RatingConfig::default();
    let blue = Arc::new(InMemoryTrainer::new(1, &rating_config));
    let orange = Arc::new(InMemoryTrainer::new(2, &rating_config));
    scheduler.register_team(1, blue.clone());
    scheduler.register_team(2, orange.clone());

    // Orange freezes a snapshot and deploys it as blue's opponent
    orange.save_snapshot();
    orange.deploy_snapshot(0).unwrap();

    let delta = scheduler.compute_rating_change(blue.current_rating(), MatchOutcome::Loss.into());
    blue.apply_rating_change(delta);

    assert!(approx_eq(delta, -0.5));
    assert!(approx_eq(blue.current_rating(), 1192.0));
    assert!(approx_eq(orange.ratings().snapshot_ratings[0], 1208.0));
    // Orange's live policy is untouched
    assert!(approx_eq(orange.current_rating(), 1200.0));
}

#[test]
fn test_snapshot_round_trips_through_json() {
    let mut scheduler = TeamScheduler::new(SchedulerConfig::new(20)).unwrap();
    let trainers = recording_trainers(&[4, 8, 15], 1200.0);
    register_all(&mut scheduler, &trainers);
    scheduler.learning_team_at(25);

    let snapshot = scheduler.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: SchedulerSnapshot = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, snapshot);
    assert_eq!(restored.learning_team, Some(8));
    assert_eq!(restored.rotation_queue, vec![15, 4]);
    assert_eq!(restored.last_swap.get(&4), Some(&25));
}

proptest! {
    #[test]
    fn prop_registration_order_is_queue_order(ids in proptest::collection::hash_set(0u32..1000, 2..10)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let mut scheduler = TeamScheduler::new(SchedulerConfig::new(100)).unwrap();
        let trainers = recording_trainers(&ids, 1200.0);
        register_all(&mut scheduler, &trainers);

        prop_assert_eq!(scheduler.learning_team(), Some(ids[0]));
        prop_assert_eq!(scheduler.queued_teams(), ids[1..].to_vec());

        // Registering everything again changes nothing
        let before = scheduler.snapshot();
        register_all(&mut scheduler, &trainers);
        prop_assert_eq!(scheduler.snapshot(), before);
    }

    #[test]
    fn prop_rotation_happens_exactly_at_threshold(
        swap_interval in 1u64..1_000,
        steps in proptest::collection::vec(0u64..3_000, 1..40),
        teams in 2u32..6,
    ) {
        let ids: Vec<u32> = (1..=teams).collect();
        let mut scheduler = TeamScheduler::new(SchedulerConfig::new(swap_interval)).unwrap();
        let trainers = recording_trainers(&ids, 1200.0);
        register_all(&mut scheduler, &trainers);

        for step in steps {
            let learning = scheduler.learning_team().unwrap();
            let last_swap = scheduler.last_swap_step(learning).unwrap();
            let queue_before = scheduler.queued_teams();

            let result = scheduler.learning_team_at(step).unwrap();

            if step < swap_interval + last_swap {
                prop_assert_eq!(result, learning);
                prop_assert_eq!(scheduler.queued_teams(), queue_before);
            } else {
                // Head of the queue takes over, previous learner goes to the tail
                prop_assert_eq!(result, queue_before[0]);
                let mut expected_queue = queue_before[1..].to_vec();
                expected_queue.push(learning);
                prop_assert_eq!(scheduler.queued_teams(), expected_queue);
                prop_assert_eq!(scheduler.last_swap_step(learning), Some(step));
            }
        }
    }
}
