//! Cross-channel transformations.

use core::f32::consts::TAU;

use crate::constants::FULL_SCALE;
use crate::transform::FrameTransform;

/// Reciprocal of full scale, for treating one channel as a modulator.
const FULL_SCALE_RECIP: f32 = 1.0 / FULL_SCALE;

/// Mid/side style matrix: `left = L + R`, `right = L - R`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SumDifference;

impl FrameTransform for SumDifference {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let a = *l;
            let b = *r;
            *l = a + b;
            *r = a - b;
        }
    }
}

/// Amplitude modulation of the left channel by the right.
///
/// `right = L * R / 32768` (the product, scaled back to sample range) and
/// `left = L * (1 + R / 32768)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmplitudeModulation;

impl FrameTransform for AmplitudeModulation {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *r = *l * *r * FULL_SCALE_RECIP;
            *l += *r;
        }
    }
}

/// Reverb on the right channel.
///
/// Each right sample picks up `near` times the sample two frames later and
/// `far` times the sample four frames later, both from the same buffer. The
/// last four samples of a buffer have no such neighbours and pass through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reverb {
    near: f32,
    far: f32,
}

impl Reverb {
    pub const fn new(near: f32, far: f32) -> Self {
        Reverb { near, far }
    }
}

impl Default for Reverb {
    fn default() -> Self {
        Reverb::new(0.9, 0.45)
    }
}

impl FrameTransform for Reverb {
    fn process(&mut self, _left: &mut [f32], right: &mut [f32]) {
        // Walks forward, so right[i + 2] and right[i + 4] are still unmodified.
        for i in 0..right.len().saturating_sub(4) {
            right[i] += self.near * right[i + 2] + self.far * right[i + 4];
        }
    }
}

/// Adds a sine tone to the left channel.
///
/// The phase advances by `step` radians per frame and carries over from one
/// buffer to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddTone {
    amplitude: f32,
    step: f32,
    phase: f32,
}

impl AddTone {
    pub const fn new(amplitude: f32, step: f32) -> Self {
        AddTone { amplitude, step, phase: 0.0 }
    }

    /// Current phase in radians, in `0..TAU`.
    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

impl Default for AddTone {
    /// 1024 (1/32 of full scale) at 0.5 rad/frame.
    fn default() -> Self {
        AddTone::new(1024.0, 0.5)
    }
}

impl FrameTransform for AddTone {
    fn process(&mut self, left: &mut [f32], _right: &mut [f32]) {
        for s in left.iter_mut() {
            *s += self.amplitude * libm::sinf(self.phase);
            self.phase += self.step;
            if self.phase >= TAU {
                self.phase -= TAU;
            } else if self.phase < 0.0 {
                self.phase += TAU;
            }
        }
    }
}
