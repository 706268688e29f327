//! Concurrency tests for the shared scheduler
//!
//! Trainers on separate threads poll with their own step counters. Whatever
//! the interleaving, every team must stay in exactly one place: the learning
//! slot or the rotation queue.

mod fixtures;

use fixtures::recording_trainers;
use ghost_coordinator::config::SchedulerConfig;
use ghost_coordinator::scheduler::SharedScheduler;
use ghost_coordinator::types::TeamId;
use std::collections::BTreeSet;
use std::thread;

fn assert_teams_accounted_for(scheduler: &SharedScheduler, ids: &[TeamId]) {
    let snapshot = scheduler.snapshot().unwrap();
    let mut seen: Vec<TeamId> = snapshot.rotation_queue.clone();
    seen.extend(snapshot.learning_team);

    let unique: BTreeSet<TeamId> = seen.iter().copied().collect();
    assert_eq!(seen.len(), ids.len(), "a team was lost or duplicated");
    assert_eq!(unique, ids.iter().copied().collect::<BTreeSet<_>>());
}

#[test]
fn test_threads_polling_independent_counters() {
    let ids: Vec<TeamId> = (1..=4).collect();
    let scheduler = SharedScheduler::new(SchedulerConfig::new(50)).unwrap();
    let trainers = recording_trainers(&ids, 1200.0);
    for trainer in &trainers {
        scheduler
            .register_team(trainer.team_id, trainer.clone())
            .unwrap();
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&team_id| {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                let mut learning_steps = 0;
                let mut turns = 0u64;
                for _ in 0..5_000 {
                    let learning = scheduler
                        .poll_learning_team(team_id, learning_steps)
                        .unwrap();
                    if learning == Some(team_id) {
                        learning_steps += 1;
                        turns += 1;
                    }
                }
                turns
            })
        })
        .collect();

    let turns: Vec<u64> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_teams_accounted_for(&scheduler, &ids);

    let stats = scheduler.stats().unwrap();
    assert!(stats.rotations > 0);
    assert_eq!(stats.queue_evictions, 0);
    // The first learner always gets at least one full interval
    assert!(turns[0] >= 50);
}

#[test]
fn test_threads_sharing_rating_updates() {
    let ids: Vec<TeamId> = vec![1, 2];
    let scheduler = SharedScheduler::new(SchedulerConfig::new(1_000)).unwrap();
    let trainers = recording_trainers(&ids, 1200.0);
    for trainer in &trainers {
        scheduler
            .register_team(trainer.team_id, trainer.clone())
            .unwrap();
    }

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = scheduler.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    scheduler.compute_rating_change(1200.0, 1.0).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Team 1 never stopped learning, so team 2 absorbed every update
    assert_eq!(trainers[1].changes().len(), 1_000);
    assert!(trainers[0].changes().is_empty());
    assert_eq!(scheduler.stats().unwrap().rating_updates, 1_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_tasks_rotate_through_every_team() {
    let ids: Vec<TeamId> = (1..=3).collect();
    let scheduler = SharedScheduler::new(SchedulerConfig::new(20)).unwrap();
    let trainers = recording_trainers(&ids, 1200.0);
    for trainer in &trainers {
        scheduler
            .register_team(trainer.team_id, trainer.clone())
            .unwrap();
    }

    let handles: Vec<_> = ids
        .iter()
        .map(|&team_id| {
            let scheduler = scheduler.clone();
            tokio::spawn(async move {
                let mut learning_steps = 0;
                while learning_steps < 100 {
                    let learning = scheduler
                        .poll_learning_team(team_id, learning_steps)
                        .unwrap();
                    if learning == Some(team_id) {
                        learning_steps += 1;
                    }
                    tokio::task::yield_now().await;
                }
                // Hand the slot on so the remaining trainers can finish
                scheduler
                    .poll_learning_team(team_id, learning_steps)
                    .unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    assert_teams_accounted_for(&scheduler, &ids);

    let history = scheduler.rotation_history().unwrap();
    let learners: BTreeSet<TeamId> = history.iter().map(|event| event.next_team).collect();
    assert_eq!(learners, ids.iter().copied().collect::<BTreeSet<_>>());
}
