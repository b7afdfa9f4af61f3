//! Star Runner - a vertical arcade shooter simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, spawning, beams, collisions, run states)
//! - `platform`: Collaborator seams (scene/render sink, input gateway, frame clock)
//! - `audio`: Sound cues and the audio collaborator
//! - `settings`: Data-driven game tuning

pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;

pub use audio::{AudioSink, Cue};
pub use settings::{Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Frame cadence delivered by the clock collaborator
    pub const FRAME_RATE: f64 = 60.0;
    /// Maximum frames replayed per host update to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Viewport dimensions (scene units, origin bottom-left, y up)
    pub const VIEWPORT_WIDTH: f32 = 375.0;
    pub const VIEWPORT_HEIGHT: f32 = 667.0;

    /// Entity half extents
    pub const PLAYER_HALF_EXTENTS: (f32, f32) = (24.0, 24.0);
    pub const ENEMY_HALF_EXTENTS: (f32, f32) = (20.0, 20.0);
    pub const BEAM_HALF_EXTENTS: (f32, f32) = (2.0, 8.0);
    /// Gap between the bottom edge and the player's hull at the dock position
    pub const PLAYER_DOCK_OFFSET: f32 = 16.0;

    /// Steering: binary step per frame outside the dead zone
    pub const STEER_STEP: f32 = 5.0;
    pub const STEER_DEAD_ZONE: f32 = 0.2;

    /// Player beams alive at once
    pub const PLAYER_BEAM_CAP: u32 = 3;
    pub const PLAYER_BEAM_TRAVEL_SECS: f64 = 0.5;
    pub const ENEMY_BEAM_TRAVEL_SECS: f64 = 0.75;

    /// Score per enemy destroyed
    pub const SCORE_PER_KILL: u64 = 10;

    /// Progress: distance units per second of play, and the win threshold
    pub const DISTANCE_RATE: f64 = 2.0;
    pub const WIN_DISTANCE: f64 = 100.0;

    /// Delays between the terminal phase and the restart prompt
    pub const LOSE_SETTLE_SECS: f64 = 1.5;
    pub const WIN_SETTLE_SECS: f64 = 2.5;

    /// Enemy spawn interval, whole seconds in [min, max)
    pub const SPAWN_INTERVAL_SECS: (u32, u32) = (3, 6);
    /// Enemy descent duration, whole seconds in [min, max)
    pub const DESCENT_SECS: (u32, u32) = (3, 6);
    /// Fraction of the viewport width enemies spawn in, centred
    pub const SPAWN_BAND: f32 = 0.5;

    /// Drift behavior: wait in [min, max), then slide by up to +/- offset
    pub const DRIFT_WAIT_SECS: (f64, f64) = (0.5, 2.5);
    pub const DRIFT_MAX_OFFSET: f32 = 50.0;
    pub const DRIFT_MOVE_SECS: f64 = 0.5;

    /// Enemy firing behavior: wait in [min, max) between shots
    pub const FIRE_WAIT_SECS: (f64, f64) = (1.0, 4.0);

    /// Lifetime of the cosmetic explosion effect (0.2 fade-in + 0.5 hold + 1.5 fade-out)
    pub const EXPLOSION_EFFECT_SECS: f64 = 2.2;
    /// Win cue: on/off flashes before holding steady
    pub const WIN_FLASH_CYCLES: u32 = 3;

    /// Restart control (centre offset below viewport centre, half extents)
    pub const RESTART_CONTROL_DROP: f32 = 60.0;
    pub const RESTART_CONTROL_HALF_EXTENTS: (f32, f32) = (80.0, 24.0);
}

/// Step a single steering axis: zero inside the dead zone, otherwise a
/// fixed step in the sign direction of the input.
#[inline]
pub fn step_axis(input: f32, dead_zone: f32, step: f32) -> f32 {
    if input.abs() > dead_zone {
        step * input.signum()
    } else {
        0.0
    }
}

/// Axis-aligned overlap test between two centred boxes
#[inline]
pub fn boxes_overlap(a_pos: Vec2, a_half: Vec2, b_pos: Vec2, b_half: Vec2) -> bool {
    let d = (a_pos - b_pos).abs();
    d.x < a_half.x + b_half.x && d.y < a_half.y + b_half.y
}

/// Point-in-box test for a centred box
#[inline]
pub fn box_contains(center: Vec2, half: Vec2, point: Vec2) -> bool {
    let d = (point - center).abs();
    d.x <= half.x && d.y <= half.y
}
