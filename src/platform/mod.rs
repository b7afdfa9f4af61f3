//! Platform abstraction layer
//!
//! The simulation talks to the outside world only through drained
//! [`GameEvent`]s. This module holds the collaborator seams a host implements
//! and the glue that routes events to them:
//! - Scene/render sink
//! - Input gateway (tilt and touch to frame intents)
//! - Frame clock

pub mod clock;
pub mod input;

pub use clock::FrameClock;
pub use input::InputGateway;

use glam::Vec2;

use crate::audio::AudioSink;
use crate::sim::{EntityId, GameEvent, GameState, Role};

/// Scene/render collaborator. The core never reads anything back from it.
pub trait SceneSink {
    fn add_entity(&mut self, id: EntityId, role: Role, pos: Vec2, half_extents: Vec2);
    fn remove_entity(&mut self, id: EntityId);
    fn set_position(&mut self, id: EntityId, pos: Vec2);
    /// Cosmetic explosion; its lifetime is the sink's business
    fn show_explosion(&mut self, pos: Vec2);
    /// HUD-level notifications (score, phase, win flash, restart control)
    fn hud(&mut self, _event: &GameEvent) {}
}

/// Route drained events to the collaborators
pub fn dispatch(
    events: Vec<GameEvent>,
    scene: &mut impl SceneSink,
    audio: &mut impl AudioSink,
    input: &mut InputGateway,
) {
    for event in events {
        match event {
            GameEvent::EntityAdded {
                id,
                role,
                pos,
                half_extents,
            } => scene.add_entity(id, role, pos, half_extents),
            GameEvent::EntityRemoved { id } => scene.remove_entity(id),
            GameEvent::Explosion { pos } => scene.show_explosion(pos),
            GameEvent::PlayOnce(cue) => audio.play_once(cue),
            GameEvent::PlayLoop(cue) => audio.play_loop(cue),
            GameEvent::StopLoop(cue) => audio.stop_loop(cue),
            GameEvent::InputSuspended => input.set_suspended(true),
            GameEvent::InputResumed => input.set_suspended(false),
            other => scene.hud(&other),
        }
    }
}

/// Push current positions of live entities to the scene
pub fn sync_positions(state: &GameState, scene: &mut impl SceneSink) {
    for entity in state.entities.iter().filter(|e| e.alive) {
        scene.set_position(entity.id, entity.pos);
    }
}
