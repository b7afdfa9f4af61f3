//! Input gateway
//!
//! Turns raw tilt samples and touches into the per-frame [`FrameInput`] the
//! simulation consumes. Touches arrive in screen coordinates (y down) and are
//! flipped into scene coordinates (y up).

use glam::Vec2;

use crate::sim::FrameInput;

/// Buffers raw input between frames
#[derive(Debug, Clone)]
pub struct InputGateway {
    viewport_height: f32,
    /// Latest tilt sample since the last frame
    tilt: Option<Vec2>,
    /// Taps since the last frame (scene coordinates)
    taps: Vec<Vec2>,
    /// Tilt sensing paused (after a loss)
    suspended: bool,
}

impl InputGateway {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            tilt: None,
            taps: Vec::new(),
            suspended: false,
        }
    }

    /// Record a raw accelerometer sample (in g). Non-finite samples are dropped.
    pub fn on_tilt(&mut self, x: f32, y: f32) {
        if self.suspended {
            return;
        }
        if !(x.is_finite() && y.is_finite()) {
            log::trace!("dropping non-finite tilt sample");
            return;
        }
        self.tilt = Some(Vec2::new(x, y).clamp(Vec2::NEG_ONE, Vec2::ONE));
    }

    /// Record the start of a touch at screen coordinates
    pub fn on_touch_began(&mut self, screen_x: f32, screen_y: f32) {
        self.taps
            .push(Vec2::new(screen_x, self.viewport_height - screen_y));
    }

    pub fn set_suspended(&mut self, suspended: bool) {
        if suspended != self.suspended {
            log::debug!("tilt sensing {}", if suspended { "paused" } else { "resumed" });
        }
        self.suspended = suspended;
        if suspended {
            self.tilt = None;
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Take this frame's intents. Each tilt sample and tap is consumed once.
    pub fn sample(&mut self) -> FrameInput {
        FrameInput {
            steer: self.tilt.take(),
            taps: std::mem::take(&mut self.taps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taps_are_edge_triggered() {
        let mut input = InputGateway::new(667.0);
        input.on_touch_began(100.0, 600.0);
        let frame = input.sample();
        assert_eq!(frame.taps, vec![Vec2::new(100.0, 67.0)]);
        assert!(input.sample().taps.is_empty());
    }

    #[test]
    fn test_missing_tilt_means_no_steer() {
        let mut input = InputGateway::new(667.0);
        input.on_tilt(2.0, -0.5);
        assert_eq!(input.sample().steer, Some(Vec2::new(1.0, -0.5)));
        assert_eq!(input.sample().steer, None);
        input.on_tilt(f32::NAN, 0.0);
        assert_eq!(input.sample().steer, None);
    }

    #[test]
    fn test_suspended_drops_tilt_but_keeps_taps() {
        let mut input = InputGateway::new(667.0);
        input.on_tilt(0.5, 0.5);
        input.set_suspended(true);
        input.on_tilt(0.5, 0.5);
        input.on_touch_began(10.0, 10.0);
        let frame = input.sample();
        assert_eq!(frame.steer, None);
        assert_eq!(frame.taps.len(), 1);
    }
}
