//! Entities: the player craft, enemy craft and the two beam kinds
//!
//! Entities live in the arena owned by [`GameState`](super::GameState) and are
//! referred to everywhere else by [`EntityId`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable entity identifier, allocated monotonically per state
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Player,
    Enemy,
    PlayerBeam,
    EnemyBeam,
}

impl Role {
    /// Collision category; beams share their firer's category
    pub fn category(self) -> Category {
        match self {
            Role::Player | Role::PlayerBeam => Category::PLAYER,
            Role::Enemy | Role::EnemyBeam => Category::ENEMY,
        }
    }

    pub fn is_beam(self) -> bool {
        matches!(self, Role::PlayerBeam | Role::EnemyBeam)
    }

    /// Ships get an explosion when destroyed; beams just vanish
    pub fn is_ship(self) -> bool {
        matches!(self, Role::Player | Role::Enemy)
    }
}

/// Collision category bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(pub u32);

impl Category {
    pub const NONE: Category = Category(0);
    pub const PLAYER: Category = Category(1 << 0);
    pub const ENEMY: Category = Category(1 << 1);

    /// Categories this category reports contacts with
    pub fn contact_mask(self) -> Category {
        match self {
            Category::PLAYER => Category::ENEMY,
            Category::ENEMY => Category::PLAYER,
            _ => Category::NONE,
        }
    }

    #[inline]
    pub fn intersects(self, other: Category) -> bool {
        self.0 & other.0 != 0
    }

    /// True if contacts between `self` and `other` are reported
    pub fn contacts(self, other: Category) -> bool {
        self.contact_mask().intersects(other) || other.contact_mask().intersects(self)
    }
}

/// Straight-line displacement spread linearly over a time window.
///
/// Several motions on one entity run concurrently and add up, so an enemy can
/// descend and drift sideways at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub delta: Vec2,
    pub start: f64,
    pub duration: f64,
    /// Fraction of `delta` already applied
    applied: f32,
}

impl Motion {
    pub fn new(delta: Vec2, start: f64, duration: f64) -> Self {
        Self {
            delta,
            start,
            duration,
            applied: 0.0,
        }
    }

    /// Progress fraction in [0, 1] at `now`
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32
    }

    /// Displacement owed since the last step; marks it applied
    pub fn step(&mut self, now: f64) -> Vec2 {
        let progress = self.progress(now);
        let owed = self.delta * (progress - self.applied);
        self.applied = progress;
        owed
    }

    pub fn is_finished(&self) -> bool {
        self.applied >= 1.0
    }
}

/// A movable, collidable object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub role: Role,
    pub pos: Vec2,
    pub half_extents: Vec2,
    /// Cleared on destruction; dead entities are skipped by collision and swept
    pub alive: bool,
    /// Time the entity entered the scene
    pub spawned_at: f64,
    /// Active motions (summed each frame)
    pub motions: Vec<Motion>,
}

impl Entity {
    pub fn new(id: EntityId, role: Role, pos: Vec2, half_extents: Vec2, now: f64) -> Self {
        Self {
            id,
            role,
            pos,
            half_extents,
            alive: true,
            spawned_at: now,
            motions: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        self.role.category()
    }

    /// Attach a motion starting at `now`
    pub fn move_by(&mut self, delta: Vec2, now: f64, duration: f64) {
        self.motions.push(Motion::new(delta, now, duration));
    }

    /// Advance all motions to `now`, dropping finished ones
    pub fn apply_motions(&mut self, now: f64) {
        let mut offset = Vec2::ZERO;
        for motion in &mut self.motions {
            offset += motion.step(now);
        }
        self.pos += offset;
        self.motions.retain(|m| !m.is_finished());
    }

    /// Constrain the centre so the box stays inside `[0, viewport]`
    pub fn clamp_to(&mut self, viewport: Vec2) {
        let min = self.half_extents;
        let max = (viewport - self.half_extents).max(min);
        self.pos = self.pos.clamp(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beams_inherit_category() {
        assert_eq!(Role::PlayerBeam.category(), Role::Player.category());
        assert_eq!(Role::EnemyBeam.category(), Role::Enemy.category());
        assert!(Category::PLAYER.contacts(Category::ENEMY));
        assert!(!Category::PLAYER.contacts(Category::PLAYER));
        assert!(!Category::ENEMY.contacts(Category::ENEMY));
    }

    #[test]
    fn test_motion_is_linear_and_exact() {
        let mut e = Entity::new(EntityId(1), Role::Enemy, Vec2::new(100.0, 600.0), Vec2::splat(20.0), 0.0);
        e.move_by(Vec2::new(0.0, -400.0), 0.0, 4.0);
        e.apply_motions(1.0);
        assert!((e.pos.y - 500.0).abs() < 1e-3);
        e.apply_motions(10.0);
        assert!((e.pos.y - 200.0).abs() < 1e-3);
        assert!(e.motions.is_empty());
    }

    #[test]
    fn test_concurrent_motions_add_up() {
        let mut e = Entity::new(EntityId(1), Role::Enemy, Vec2::ZERO, Vec2::splat(20.0), 0.0);
        e.move_by(Vec2::new(0.0, -100.0), 0.0, 1.0);
        e.move_by(Vec2::new(40.0, 0.0), 0.0, 0.5);
        e.apply_motions(0.5);
        assert!((e.pos.x - 40.0).abs() < 1e-3);
        assert!((e.pos.y + 50.0).abs() < 1e-3);
        assert_eq!(e.motions.len(), 1);
    }

    #[test]
    fn test_clamp_to_viewport() {
        let mut e = Entity::new(EntityId(1), Role::Player, Vec2::new(-30.0, 900.0), Vec2::new(24.0, 24.0), 0.0);
        e.clamp_to(Vec2::new(375.0, 667.0));
        assert_eq!(e.pos, Vec2::new(24.0, 643.0));
    }
}
