//! Per-channel scalar gain.

use crate::transform::FrameTransform;

/// Independent linear gain on each channel.
///
/// # Example
/// ```ignore
/// let mut gain = Gain::new(0.5, 2.0); // left -6 dB, right +6 dB
/// gain.mute_right();
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gain {
    left: f32,
    right: f32,
}

impl Gain {
    pub const fn new(left: f32, right: f32) -> Self {
        Gain { left, right }
    }

    /// Both channels at unity.
    pub const fn unity() -> Self {
        Gain::new(1.0, 1.0)
    }

    pub fn set_left(&mut self, level: f32) {
        self.left = level;
    }

    pub fn set_right(&mut self, level: f32) {
        self.right = level;
    }

    pub fn mute_left(&mut self) {
        self.left = 0.0;
    }

    pub fn mute_right(&mut self) {
        self.right = 0.0;
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }
}

impl Default for Gain {
    fn default() -> Self {
        Gain::unity()
    }
}

impl FrameTransform for Gain {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for s in left.iter_mut() {
            *s *= self.left;
        }
        for s in right.iter_mut() {
            *s *= self.right;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_each_channel_independently() {
        let mut gain = Gain::new(0.5, 2.0);
        let mut left = [100.0f32; 4];
        let mut right = [100.0f32; 4];
        gain.process(&mut left, &mut right);
        assert_eq!(left, [50.0; 4]);
        assert_eq!(right, [200.0; 4]);
    }

    #[test]
    fn unity_is_identity() {
        let mut gain = Gain::default();
        let mut left = [-3.0f32, 7.5];
        let mut right = [32767.0f32, -32768.0];
        gain.process(&mut left, &mut right);
        assert_eq!(left, [-3.0, 7.5]);
        assert_eq!(right, [32767.0, -32768.0]);
    }

    #[test]
    fn mute_zeroes_channel() {
        let mut gain = Gain::unity();
        gain.mute_left();
        let mut left = [1234.0f32; 3];
        let mut right = [1234.0f32; 3];
        gain.process(&mut left, &mut right);
        assert!(left.iter().all(|&s| s == 0.0));
        assert_eq!(right, [1234.0; 3]);
    }

    #[test]
    fn setters_update_levels() {
        let mut gain = Gain::unity();
        gain.set_left(0.25);
        gain.set_right(-1.0);
        assert_eq!(gain.left(), 0.25);
        assert_eq!(gain.right(), -1.0);
        gain.mute_right();
        assert_eq!(gain.right(), 0.0);
    }
}
