//! Timed entity behaviors
//!
//! Every task belongs to exactly one entity. Destroying an entity cancels all
//! of its tasks in one call, and tasks are re-checked against entity liveness
//! before they run, so a stale task can never act on a dead entity.

use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// What a task does when it comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskAction {
    /// Remove the owner without explosion or score (descent finished, beam expired)
    Expire,
    /// Start one sideways drift of the owner, then wait again
    Drift,
    /// Owner fires one enemy beam, then waits again
    Fire,
}

/// A scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Insertion order, breaks ties between equal due times
    pub seq: u64,
    pub owner: EntityId,
    pub due: f64,
    pub action: TaskAction,
}

/// Pending tasks for all entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `action` for `owner` at absolute time `due`
    pub fn schedule(&mut self, owner: EntityId, due: f64, action: TaskAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(Task {
            seq,
            owner,
            due,
            action,
        });
    }

    /// Drop every task owned by `owner`; returns how many were cancelled
    pub fn cancel_owner(&mut self, owner: EntityId) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.owner != owner);
        before - self.tasks.len()
    }

    /// Remove and return the tasks due at or before `now`, earliest first
    pub fn take_due(&mut self, now: f64) -> Vec<Task> {
        let (mut due, pending): (Vec<Task>, Vec<Task>) =
            self.tasks.drain(..).partition(|t| t.due <= now);
        self.tasks = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due
    }

    /// Tasks owned by `owner`
    #[cfg(test)]
    pub fn tasks_for(&self, owner: EntityId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.owner == owner)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}
