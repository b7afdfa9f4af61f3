//! Enemy wave generation
//!
//! Enemies appear at randomized whole-second intervals. Each one gets three
//! concurrent behaviors for the rest of its life: a one-shot descent, a
//! repeating sideways drift and a repeating beam timer.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, Role};
use super::projectiles::fire_enemy_beam;
use super::schedule::{Task, TaskAction};
use super::state::GameState;

/// Spawn timer state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnemySpawner {
    /// Time of the last spawn, or of arming at the start of the run
    pub last_spawn_time: Option<f64>,
}

impl EnemySpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the timer; it re-arms on the next `Playing` frame
    pub fn reset(&mut self) {
        self.last_spawn_time = None;
    }
}

/// Uniform whole seconds in `[min, max)`
fn whole_secs(rng: &mut impl Rng, (min, max): (u32, u32)) -> f64 {
    rng.random_range(min..max) as f64
}

/// Run the spawn timer for one `Playing` frame; returns the new enemy if any.
///
/// The elapsed time is compared against a fresh interval every frame, so an
/// enemy usually follows shortly after the lower bound has passed.
pub fn tick_spawner(state: &mut GameState) -> Option<EntityId> {
    let now = state.now;

    let Some(last) = state.spawner.last_spawn_time else {
        state.spawner.last_spawn_time = Some(now);
        log::trace!("spawner armed at {:.2}s", now);
        return None;
    };

    let interval = whole_secs(&mut state.rng, state.settings.spawn_interval_secs);
    if now - last <= interval {
        return None;
    }

    let id = spawn_enemy(state);
    state.spawner.last_spawn_time = Some(now);
    Some(id)
}

/// Spawn one enemy at the top edge with a random descent duration
pub fn spawn_enemy(state: &mut GameState) -> EntityId {
    let descent = whole_secs(&mut state.rng, state.settings.descent_secs);
    spawn_enemy_with_descent(state, descent)
}

/// Spawn one enemy at the top edge, within the middle band of the viewport,
/// and start its descent, drift and firing behaviors
pub fn spawn_enemy_with_descent(state: &mut GameState, descent_secs: f64) -> EntityId {
    let now = state.now;
    let width = state.settings.viewport_width;
    let height = state.settings.viewport_height;
    let half = state.settings.enemy_half();

    let band = width * state.settings.spawn_band;
    let left = (width - band) * 0.5;
    let x = if band > 0.0 {
        state.rng.random_range(left..left + band)
    } else {
        width * 0.5
    };

    let id = state.spawn(Role::Enemy, Vec2::new(x, height), half);
    state.stats.enemies_spawned += 1;

    // Descent ends with the whole hull below the bottom edge
    let drop = Vec2::new(0.0, -(height + half.y));
    if let Some(enemy) = state.entity_mut(id) {
        enemy.move_by(drop, now, descent_secs);
    }
    state.scheduler.schedule(id, now + descent_secs, TaskAction::Expire);
    schedule_drift(state, id, now);
    schedule_fire(state, id, now);

    log::debug!("enemy {} descends over {}s", id, descent_secs);
    id
}

fn schedule_drift(state: &mut GameState, id: EntityId, from: f64) {
    let (min, max) = state.settings.drift_wait_secs;
    let wait = state.rng.random_range(min..max);
    state.scheduler.schedule(id, from + wait, TaskAction::Drift);
}

fn schedule_fire(state: &mut GameState, id: EntityId, from: f64) {
    let (min, max) = state.settings.fire_wait_secs;
    let wait = state.rng.random_range(min..max);
    state.scheduler.schedule(id, from + wait, TaskAction::Fire);
}

/// Execute one due task against its owner.
///
/// Tasks whose owner is already dead are dropped here; cancellation on death
/// normally removes them first.
pub fn run_task(state: &mut GameState, task: Task) {
    if !state.is_alive(task.owner) {
        log::trace!("dropping {:?} for dead {}", task.action, task.owner);
        return;
    }

    match task.action {
        TaskAction::Expire => {
            state.despawn(task.owner);
        }
        TaskAction::Drift => {
            let max = state.settings.drift_max_offset;
            let dx = state.rng.random_range(-max..=max);
            let secs = state.settings.drift_move_secs;
            let now = state.now;
            if let Some(enemy) = state.entity_mut(task.owner) {
                enemy.move_by(Vec2::new(dx, 0.0), now, secs);
            }
            // Next wait starts once this slide completes
            schedule_drift(state, task.owner, task.due + secs);
        }
        TaskAction::Fire => {
            fire_enemy_beam(state, task.owner);
            schedule_fire(state, task.owner, task.due);
        }
    }
}
