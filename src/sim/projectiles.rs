//! Player and enemy beams
//!
//! Beams travel in a straight line for the full viewport height and expire on
//! their own. Only player beams count against a budget.

use glam::Vec2;

use super::entity::{EntityId, Role};
use super::schedule::TaskAction;
use super::state::{GameEvent, GameState};
use crate::audio::Cue;

/// Fire a player beam from the player's position.
///
/// Returns `None` when the player is gone or the beam budget is spent; that is
/// not an error, the tap is simply dropped.
pub fn fire_player_beam(state: &mut GameState) -> Option<EntityId> {
    let origin = state.player_entity()?.pos;
    if state.player_beams >= state.settings.player_beam_cap {
        log::trace!("beam budget spent ({})", state.player_beams);
        return None;
    }

    let travel = state.settings.player_beam_travel_secs;
    let id = launch_beam(
        state,
        Role::PlayerBeam,
        origin,
        Vec2::new(0.0, state.settings.viewport_height),
        travel,
    );
    state.player_beams += 1;
    state.stats.player_beams_fired += 1;
    state.push_event(GameEvent::PlayOnce(Cue::PlayerBeam));
    Some(id)
}

/// Fire an enemy beam from `shooter`'s current position
pub fn fire_enemy_beam(state: &mut GameState, shooter: EntityId) -> Option<EntityId> {
    let origin = state.entity(shooter).filter(|e| e.alive)?.pos;

    let travel = state.settings.enemy_beam_travel_secs;
    let id = launch_beam(
        state,
        Role::EnemyBeam,
        origin,
        Vec2::new(0.0, -state.settings.viewport_height),
        travel,
    );
    state.stats.enemy_beams_fired += 1;
    state.push_event(GameEvent::PlayOnce(Cue::EnemyBeam));
    Some(id)
}

fn launch_beam(state: &mut GameState, role: Role, origin: Vec2, travel: Vec2, secs: f64) -> EntityId {
    let now = state.now;
    let half = state.settings.beam_half();
    let id = state.spawn(role, origin, half);
    if let Some(beam) = state.entity_mut(id) {
        beam.move_by(travel, now, secs);
    }
    state.scheduler.schedule(id, now + secs, TaskAction::Expire);
    id
}

/// Remove every live enemy beam without explosion
pub fn clear_enemy_beams(state: &mut GameState) -> usize {
    state
        .alive_ids(Role::EnemyBeam)
        .into_iter()
        .filter(|&id| state.despawn(id))
        .count()
}
