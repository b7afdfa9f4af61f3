//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only from the frame clock passed to `tick`/`advance`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies; those are reached via `GameEvent`s

pub mod collision;
pub mod entity;
pub mod projectiles;
pub mod schedule;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{ContactOutcome, ContactTracker, detect_contacts, on_contact, resolve_contacts};
pub use entity::{Category, Entity, EntityId, Motion, Role};
pub use projectiles::{clear_enemy_beams, fire_enemy_beam, fire_player_beam};
pub use schedule::{Scheduler, Task, TaskAction};
pub use spawner::{EnemySpawner, spawn_enemy, spawn_enemy_with_descent, tick_spawner};
pub use state::{
    GameEvent, GamePhase, GameState, PendingTransition, ProgressTracker, RunStats, RunSummary,
};
pub use tick::{
    FrameInput, TapOutcome, advance, apply_steering, enter_game_over, enter_game_win, restart,
    tap, tick,
};
