//! Sound cues and the audio collaborator
//!
//! The simulation never mixes audio itself; it names a cue and the host's
//! [`AudioSink`] plays it. Calls are fire-and-forget.

use serde::{Deserialize, Serialize};

/// Sound cue identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// Background music, looped while a run is in progress
    Background,
    /// Player fired a beam
    PlayerBeam,
    /// An enemy fired a beam
    EnemyBeam,
    /// Player or enemy ship destroyed
    Explosion,
    /// Run lost
    Lose,
    /// Run won
    Win,
}

impl Cue {
    /// Asset name the host resolves the cue to
    pub fn asset_name(&self) -> &'static str {
        match self {
            Cue::Background => "bgm",
            Cue::PlayerBeam => "beam_player",
            Cue::EnemyBeam => "beam_enemy",
            Cue::Explosion => "explosion",
            Cue::Lose => "lose",
            Cue::Win => "win",
        }
    }
}

/// Audio collaborator
pub trait AudioSink {
    fn play_once(&mut self, cue: Cue);
    fn play_loop(&mut self, cue: Cue);
    fn stop_loop(&mut self, cue: Cue);
}

/// Audio sink that only logs; used by the headless host
#[derive(Debug, Default)]
pub struct LogAudio {
    muted: bool,
    /// Loops currently playing
    looping: Vec<Cue>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_looping(&self, cue: Cue) -> bool {
        self.looping.contains(&cue)
    }
}

impl AudioSink for LogAudio {
    fn play_once(&mut self, cue: Cue) {
        if self.muted {
            return;
        }
        log::trace!("play {}", cue.asset_name());
    }

    fn play_loop(&mut self, cue: Cue) {
        if !self.looping.contains(&cue) {
            self.looping.push(cue);
        }
        if !self.muted {
            log::debug!("loop {} from start", cue.asset_name());
        }
    }

    fn stop_loop(&mut self, cue: Cue) {
        self.looping.retain(|c| *c != cue);
        if !self.muted {
            log::debug!("stop {}", cue.asset_name());
        }
    }
}
