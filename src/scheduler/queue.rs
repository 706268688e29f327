//! Bounded FIFO of teams waiting for the learning slot

use crate::types::TeamId;
use std::collections::VecDeque;

/// Rotation queue that drops its oldest entry when pushed past capacity
#[derive(Debug, Clone)]
pub struct RotationQueue {
    entries: VecDeque<TeamId>,
    capacity: usize,
}

impl RotationQueue {
    /// Empty queue holding at most `capacity` teams
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `team_id` at the tail, returning the head entry evicted to make room
    pub fn push_back(&mut self, team_id: TeamId) -> Option<TeamId> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(team_id);
        evicted
    }

    /// Remove and return the head of the queue
    pub fn pop_front(&mut self) -> Option<TeamId> {
        self.entries.pop_front()
    }

    /// Number of queued teams
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no team is waiting
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of queued teams
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Queue contents, head first
    pub fn to_vec(&self) -> Vec<TeamId> {
        self.entries.iter().copied().collect()
    }

    /// Drop every queued team
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
