//! Game state and core simulation types
//!
//! [`GameState`] is the composition root: it exclusively owns every live
//! entity along with the score, beam budget, progress tracker, spawner and
//! task scheduler. Everything else refers to entities by id.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::ContactTracker;
use super::entity::{Entity, EntityId, Role};
use super::schedule::Scheduler;
use super::spawner::EnemySpawner;
use crate::audio::Cue;
use crate::settings::Settings;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Distance objective reached, win cue playing
    GameWin,
    /// Player destroyed, lose cue playing
    GameOver,
    /// Restart control shown after a win
    WaitToRestartFromWin,
    /// Waiting for any tap after a loss
    WaitToRestartFromLose,
}

impl GamePhase {
    /// Whether steering input moves the player in this phase
    pub fn allows_steering(self) -> bool {
        matches!(
            self,
            GamePhase::Playing | GamePhase::GameWin | GamePhase::WaitToRestartFromWin
        )
    }

    pub fn is_waiting_to_restart(self) -> bool {
        matches!(
            self,
            GamePhase::WaitToRestartFromWin | GamePhase::WaitToRestartFromLose
        )
    }
}

/// Notifications for the host's collaborators, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntityAdded {
        id: EntityId,
        role: Role,
        pos: Vec2,
        half_extents: Vec2,
    },
    EntityRemoved {
        id: EntityId,
    },
    /// Cosmetic explosion at a destroyed ship's last position
    Explosion {
        pos: Vec2,
    },
    PlayOnce(Cue),
    PlayLoop(Cue),
    StopLoop(Cue),
    PhaseChanged {
        from: GamePhase,
        to: GamePhase,
    },
    ScoreChanged(u64),
    /// In-game scoreboard removed (after a loss)
    ScoreboardHidden,
    /// Win banner flashes `cycles` times then holds
    WinFlash {
        cycles: u32,
    },
    /// Restart control shown and score moved to the screen centre
    RestartShown,
    /// Restart control and end-of-run HUD removed, scoreboard back in place
    RestartHidden,
    /// Tilt/touch sensing should pause
    InputSuspended,
    /// Tilt/touch sensing should resume
    InputResumed,
}

/// Elapsed-time distance metric driving the win condition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressTracker {
    /// Time of the first `Playing` frame of the run
    pub start_time: Option<f64>,
    distance: f64,
}

impl ProgressTracker {
    /// Update from a `Playing` frame; arms the start time on the first call
    pub fn tick(&mut self, now: f64, rate: f64) -> f64 {
        let start = *self.start_time.get_or_insert(now);
        // Non-decreasing even if the clock were to jitter backwards
        self.distance = self.distance.max((now - start) * rate);
        self.distance
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn clear(&mut self) {
        self.start_time = None;
        self.distance = 0.0;
    }
}

/// Per-run counters reported to the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub enemies_spawned: u32,
    pub enemies_destroyed: u32,
    pub player_beams_fired: u32,
    pub enemy_beams_fired: u32,
}

/// Serializable snapshot of a run for hosts and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run: u32,
    pub phase: GamePhase,
    pub score: u64,
    pub distance: f64,
    pub elapsed: f64,
    pub stats: RunStats,
}

/// Phase change scheduled for later
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTransition {
    pub to: GamePhase,
    pub due: f64,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Run RNG; every random draw goes through it
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Latest frame time seen
    pub now: f64,
    pub score: u64,
    /// Player beams currently alive
    pub player_beams: u32,
    pub progress: ProgressTracker,
    pub spawner: EnemySpawner,
    pub scheduler: Scheduler,
    pub contacts: ContactTracker,
    pub pending: Option<PendingTransition>,
    pub stats: RunStats,
    /// Runs started, including the current one
    pub run: u32,
    /// Live entities, sorted by id
    pub entities: Vec<Entity>,
    /// The player's id while it is in the scene
    pub player: Option<EntityId>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game state; the run starts in `Playing`
    pub fn new(settings: Settings) -> Self {
        let rng = Pcg32::seed_from_u64(settings.seed);
        let mut state = Self {
            spawner: EnemySpawner::new(),
            settings,
            rng,
            phase: GamePhase::Playing,
            now: 0.0,
            score: 0,
            player_beams: 0,
            progress: ProgressTracker::default(),
            scheduler: Scheduler::new(),
            contacts: ContactTracker::new(),
            pending: None,
            stats: RunStats::default(),
            run: 1,
            entities: Vec::new(),
            player: None,
            events: Vec::new(),
            next_id: 1,
        };

        state.spawn_player();
        state.push_event(GameEvent::PlayLoop(Cue::Background));
        log::info!("Run {} started (seed {})", state.run, state.settings.seed);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an entity to the scene
    pub fn spawn(&mut self, role: Role, pos: Vec2, half_extents: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.entities
            .push(Entity::new(id, role, pos, half_extents, self.now));
        self.push_event(GameEvent::EntityAdded {
            id,
            role,
            pos,
            half_extents,
        });
        log::debug!("spawn {:?} {} at ({:.1}, {:.1})", role, id, pos.x, pos.y);
        id
    }

    /// Spawn the player at the dock position
    pub fn spawn_player(&mut self) -> EntityId {
        let dock = self.settings.dock_position();
        let half = self.settings.player_half();
        let id = self.spawn(Role::Player, dock, half);
        self.player = Some(id);
        id
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    /// Look up an entity, dead or alive, until it is swept
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(|i| &mut self.entities[i])
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entity(id).is_some_and(|e| e.alive)
    }

    /// The player entity while alive
    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.entity(id)).filter(|e| e.alive)
    }

    /// Ids of live entities with the given role, in id order
    pub fn alive_ids(&self, role: Role) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.alive && e.role == role)
            .map(|e| e.id)
            .collect()
    }

    pub fn alive_count(&self, role: Role) -> usize {
        self.entities
            .iter()
            .filter(|e| e.alive && e.role == role)
            .count()
    }

    /// Remove an entity without explosion or score.
    ///
    /// Returns false if it was already dead. Cancels all of its tasks and, for
    /// player beams, returns the slot to the beam budget.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(entity) = self.entity_mut(id) else {
            return false;
        };
        if !entity.alive {
            return false;
        }
        entity.alive = false;
        entity.motions.clear();
        let role = entity.role;

        self.scheduler.cancel_owner(id);
        if role == Role::PlayerBeam {
            self.player_beams = self.player_beams.saturating_sub(1);
        }
        if self.player == Some(id) {
            self.player = None;
        }
        self.push_event(GameEvent::EntityRemoved { id });
        log::debug!("despawn {:?} {}", role, id);
        true
    }

    /// Destroy a ship with explosion; enemies also score.
    ///
    /// Returns false (and does nothing) if the entity was already dead.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some((role, pos)) = self.entity(id).map(|e| (e.role, e.pos)) else {
            return false;
        };
        if !self.despawn(id) {
            return false;
        }

        if role.is_ship() {
            self.push_event(GameEvent::PlayOnce(Cue::Explosion));
            self.push_event(GameEvent::Explosion { pos });
        }
        if role == Role::Enemy {
            self.score += self.settings.score_per_kill;
            self.stats.enemies_destroyed += 1;
            self.push_event(GameEvent::ScoreChanged(self.score));
        }
        true
    }

    /// Drop dead entities from the arena
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.alive);
    }

    /// Change phase, announcing the change
    pub fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        self.push_event(GameEvent::PhaseChanged { from, to });
        log::info!("Phase {:?} -> {:?} at t={:.2}", from, to, self.now);
    }

    pub fn distance(&self) -> f64 {
        self.progress.distance()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Pending events, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            run: self.run,
            phase: self.phase,
            score: self.score,
            distance: self.distance(),
            elapsed: self
                .progress
                .start_time
                .map_or(0.0, |start| (self.now - start).max(0.0)),
            stats: self.stats,
        }
    }
}
