//! Fixed-cadence frame clock
//!
//! Converts variable host time deltas into monotonically increasing frame
//! timestamps at a fixed rate, replaying at most `max_substeps` frames per
//! update so a long stall cannot snowball.

/// Frame timestamp generator
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f64,
    now: f64,
    accumulator: f64,
    max_substeps: u32,
}

impl FrameClock {
    pub fn new(frame_rate: f64, max_substeps: u32) -> Self {
        Self {
            step: 1.0 / frame_rate,
            now: 0.0,
            accumulator: 0.0,
            max_substeps,
        }
    }

    /// Seconds per frame
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Timestamp of the latest frame
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Produce exactly one frame
    pub fn next_frame(&mut self) -> f64 {
        self.now += self.step;
        self.now
    }

    /// Accumulate `real_dt` seconds of host time and return the frame
    /// timestamps now due. Time beyond `max_substeps` frames is dropped.
    pub fn update(&mut self, real_dt: f64) -> Vec<f64> {
        self.accumulator += real_dt.max(0.0);

        let mut frames = Vec::new();
        while self.accumulator >= self.step && (frames.len() as u32) < self.max_substeps {
            self.accumulator -= self.step;
            frames.push(self.next_frame());
        }
        if self.accumulator >= self.step {
            log::debug!("frame clock dropping {:.3}s backlog", self.accumulator);
            self.accumulator %= self.step;
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_emits_whole_frames() {
        let mut clock = FrameClock::new(60.0, 8);
        assert!(clock.update(0.01).is_empty());
        let frames = clock.update(0.01);
        assert_eq!(frames.len(), 1);
        assert!((frames[0] - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_caps_substeps() {
        let mut clock = FrameClock::new(60.0, 8);
        let frames = clock.update(1.0);
        assert_eq!(frames.len(), 8);
        assert!(frames.windows(2).all(|w| w[1] > w[0]));
        assert!(clock.update(0.0).is_empty());
    }
}
