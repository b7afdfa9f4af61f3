//! Game settings and tuning
//!
//! Every field defaults to the value in [`crate::consts`], so a settings file
//! only needs to name what it overrides.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors from loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },
}

/// Run configuration and gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for the run
    pub seed: u64,
    /// Frames per second delivered by the clock
    pub frame_rate: f64,

    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Player ===
    pub player_half_extents: (f32, f32),
    pub player_dock_offset: f32,
    pub steer_step: f32,
    pub steer_dead_zone: f32,

    // === Beams ===
    pub player_beam_cap: u32,
    pub player_beam_travel_secs: f64,
    pub enemy_beam_travel_secs: f64,
    pub beam_half_extents: (f32, f32),

    // === Enemies ===
    pub enemy_half_extents: (f32, f32),
    pub spawn_interval_secs: (u32, u32),
    pub descent_secs: (u32, u32),
    pub spawn_band: f32,
    pub drift_wait_secs: (f64, f64),
    pub drift_max_offset: f32,
    pub drift_move_secs: f64,
    pub fire_wait_secs: (f64, f64),

    // === Scoring and progress ===
    pub score_per_kill: u64,
    pub distance_rate: f64,
    pub win_distance: f64,
    pub lose_settle_secs: f64,
    pub win_settle_secs: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0,
            frame_rate: FRAME_RATE,

            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,

            player_half_extents: PLAYER_HALF_EXTENTS,
            player_dock_offset: PLAYER_DOCK_OFFSET,
            steer_step: STEER_STEP,
            steer_dead_zone: STEER_DEAD_ZONE,

            player_beam_cap: PLAYER_BEAM_CAP,
            player_beam_travel_secs: PLAYER_BEAM_TRAVEL_SECS,
            enemy_beam_travel_secs: ENEMY_BEAM_TRAVEL_SECS,
            beam_half_extents: BEAM_HALF_EXTENTS,

            enemy_half_extents: ENEMY_HALF_EXTENTS,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            descent_secs: DESCENT_SECS,
            spawn_band: SPAWN_BAND,
            drift_wait_secs: DRIFT_WAIT_SECS,
            drift_max_offset: DRIFT_MAX_OFFSET,
            drift_move_secs: DRIFT_MOVE_SECS,
            fire_wait_secs: FIRE_WAIT_SECS,

            score_per_kill: SCORE_PER_KILL,
            distance_rate: DISTANCE_RATE,
            win_distance: WIN_DISTANCE,
            lose_settle_secs: LOSE_SETTLE_SECS,
            win_settle_secs: WIN_SETTLE_SECS,
        }
    }
}

impl Settings {
    /// Default tuning with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }

    pub fn player_half(&self) -> Vec2 {
        Vec2::from(self.player_half_extents)
    }

    pub fn enemy_half(&self) -> Vec2 {
        Vec2::from(self.enemy_half_extents)
    }

    pub fn beam_half(&self) -> Vec2 {
        Vec2::from(self.beam_half_extents)
    }

    /// Where the player spawns at the start of every run
    pub fn dock_position(&self) -> Vec2 {
        Vec2::new(
            self.viewport_width * 0.5,
            self.player_dock_offset + self.player_half_extents.1,
        )
    }

    /// Centre and half extents of the restart control shown after a win
    pub fn restart_control(&self) -> (Vec2, Vec2) {
        let center = Vec2::new(
            self.viewport_width * 0.5,
            self.viewport_height * 0.5 - RESTART_CONTROL_DROP,
        );
        (center, Vec2::from(RESTART_CONTROL_HALF_EXTENTS))
    }

    /// Reject tuning the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        fn invalid(field: &'static str, reason: &'static str) -> SettingsError {
            SettingsError::Validation { field, reason }
        }

        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(invalid("frame_rate", "must be positive"));
        }
        let viewport = self.viewport();
        if !(viewport.is_finite() && viewport.x > 0.0 && viewport.y > 0.0) {
            return Err(invalid("viewport", "must be positive"));
        }
        let (pw, ph) = self.player_half_extents;
        if !(pw >= 0.0 && ph >= 0.0) || pw * 2.0 > viewport.x || ph * 2.0 > viewport.y {
            return Err(invalid("player_half_extents", "player does not fit the viewport"));
        }
        if self.spawn_interval_secs.0 >= self.spawn_interval_secs.1 {
            return Err(invalid("spawn_interval_secs", "empty range"));
        }
        if self.descent_secs.0 == 0 || self.descent_secs.0 >= self.descent_secs.1 {
            return Err(invalid("descent_secs", "empty or zero range"));
        }
        let (dw0, dw1) = self.drift_wait_secs;
        if !(dw0.is_finite() && dw1.is_finite() && dw0 < dw1) {
            return Err(invalid("drift_wait_secs", "empty or unbounded range"));
        }
        let (fw0, fw1) = self.fire_wait_secs;
        if !(fw0.is_finite() && fw1.is_finite() && fw0 > 0.0 && fw0 < fw1) {
            return Err(invalid("fire_wait_secs", "empty, zero or unbounded range"));
        }
        if !(self.drift_max_offset.is_finite() && self.drift_max_offset >= 0.0) {
            return Err(invalid("drift_max_offset", "must be finite and non-negative"));
        }
        let travel = [
            self.player_beam_travel_secs,
            self.enemy_beam_travel_secs,
            self.drift_move_secs,
        ];
        if !travel.iter().all(|secs| secs.is_finite() && *secs > 0.0) {
            return Err(invalid("travel_secs", "durations must be positive"));
        }
        if !(0.0..=1.0).contains(&self.spawn_band) {
            return Err(invalid("spawn_band", "must be within 0..=1"));
        }
        if !(self.distance_rate.is_finite() && self.distance_rate > 0.0) {
            return Err(invalid("distance_rate", "must be positive"));
        }
        Ok(())
    }

    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from `path` if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };

        match Self::load_from(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }
}
