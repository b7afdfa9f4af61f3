//! Contact detection and resolution
//!
//! Detection stands in for the physics engine: it reports a contact once,
//! when two boxes of opposing categories begin to overlap. Resolution
//! classifies the pair by category and role and applies destruction and
//! scoring.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::{Category, EntityId, Role};
use super::state::{GamePhase, GameState};
use super::tick::enter_game_over;
use crate::boxes_overlap;

/// What a resolved contact did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactOutcome {
    /// Player rammed an enemy ship; both destroyed
    PlayerRammed,
    /// Player hit by an enemy beam
    PlayerShot,
    /// Player beam destroyed an enemy ship
    EnemyShot,
    /// Pairing with no rule, stale entity, or not playing
    Ignored,
}

/// Overlapping pairs seen on the previous physics step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactTracker {
    touching: BTreeSet<(EntityId, EntityId)>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}

fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Find pairs that started overlapping since the last call.
///
/// Only live entities whose categories report contacts are considered. Pairs
/// that stay in contact are reported once.
pub fn detect_contacts(state: &mut GameState) -> Vec<(EntityId, EntityId)> {
    let live: Vec<_> = state.entities.iter().filter(|e| e.alive).collect();

    let mut touching = BTreeSet::new();
    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            if !a.category().contacts(b.category()) {
                continue;
            }
            if boxes_overlap(a.pos, a.half_extents, b.pos, b.half_extents) {
                touching.insert(ordered(a.id, b.id));
            }
        }
    }

    let began: Vec<_> = touching
        .difference(&state.contacts.touching)
        .copied()
        .collect();
    state.contacts.touching = touching;
    began
}

/// Resolve one contact event.
///
/// Safe to call with entities that have already died this frame; those
/// contacts are ignored, so destruction effects never fire twice.
pub fn on_contact(state: &mut GameState, a: EntityId, b: EntityId) -> ContactOutcome {
    if state.phase != GamePhase::Playing {
        return ContactOutcome::Ignored;
    }
    let (Some(ea), Some(eb)) = (state.entity(a), state.entity(b)) else {
        return ContactOutcome::Ignored;
    };
    if !ea.alive || !eb.alive {
        return ContactOutcome::Ignored;
    }

    if !ea.category().contacts(eb.category()) {
        return ContactOutcome::Ignored;
    }
    // Player category on the left
    let (ours, theirs) = if ea.category() == Category::PLAYER {
        ((ea.id, ea.role), (eb.id, eb.role))
    } else {
        ((eb.id, eb.role), (ea.id, ea.role))
    };

    let outcome = match (ours.1, theirs.1) {
        (Role::Player, Role::Enemy) => {
            state.destroy(theirs.0);
            state.destroy(ours.0);
            enter_game_over(state);
            ContactOutcome::PlayerRammed
        }
        (Role::Player, Role::EnemyBeam) => {
            state.despawn(theirs.0);
            state.destroy(ours.0);
            enter_game_over(state);
            ContactOutcome::PlayerShot
        }
        (Role::PlayerBeam, Role::Enemy) => {
            state.despawn(ours.0);
            state.destroy(theirs.0);
            ContactOutcome::EnemyShot
        }
        (Role::PlayerBeam, Role::EnemyBeam) => ContactOutcome::Ignored,
        // Categories already ruled these out
        (Role::Enemy | Role::EnemyBeam, _) | (_, Role::Player | Role::PlayerBeam) => {
            ContactOutcome::Ignored
        }
    };

    if outcome != ContactOutcome::Ignored {
        log::debug!("contact {} / {}: {:?}", a, b, outcome);
    }
    outcome
}

/// One physics step: detect new contacts and resolve them in order
pub fn resolve_contacts(state: &mut GameState) -> Vec<ContactOutcome> {
    detect_contacts(state)
        .into_iter()
        .map(|(a, b)| on_contact(state, a, b))
        .collect()
}
