//! Causal FIR convolution.
//!
//! Each output is the inner product of the `TAPS` most recent inputs with a
//! fixed coefficient table:
//!
//! ```text
//! y[n] = b[0]·x[n] + b[1]·x[n-1] + ... + b[K]·x[n-K]      K = TAPS - 1
//! ```
//!
//! The coefficient table is borrowed for the filter's lifetime and never
//! written. Typically it is a `static` exported from a filter design tool.

use crate::config::ChannelOrder;
use crate::frame::interleave::{pack, unpack};
use crate::frame::saturate::round_to_sample;
use crate::transform::FrameTransform;

/// Single-channel FIR filter with `TAPS` coefficients.
///
/// The history holds the `TAPS` most recent inputs, newest first, and starts
/// out as silence.
pub struct FirFilter<'c, const TAPS: usize> {
    coefficients: &'c [f32; TAPS],
    history: [f32; TAPS],
}

impl<'c, const TAPS: usize> FirFilter<'c, TAPS> {
    /// # Panics
    ///
    /// Panics if `TAPS` is zero.
    pub fn new(coefficients: &'c [f32; TAPS]) -> Self {
        assert!(TAPS > 0, "FIR filter needs at least one coefficient");
        FirFilter {
            coefficients,
            history: [0.0; TAPS],
        }
    }

    /// Filter order (`TAPS - 1`).
    pub const fn order(&self) -> usize {
        TAPS - 1
    }

    pub fn coefficients(&self) -> &'c [f32; TAPS] {
        self.coefficients
    }

    /// Input history, newest first.
    pub fn history(&self) -> &[f32; TAPS] {
        &self.history
    }

    /// Forget all past input.
    pub fn reset(&mut self) {
        self.history = [0.0; TAPS];
    }

    /// Push one input sample and return the filtered output.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        self.history.copy_within(0..TAPS - 1, 1);
        self.history[0] = x;
        self.convolve()
    }

    /// Filter `samples` in place, oldest first.
    pub fn process_block(&mut self, samples: &mut [f32]) {
        for s in samples.iter_mut() {
            *s = self.process_sample(*s);
        }
    }

    fn convolve(&self) -> f32 {
        self.history
            .iter()
            .zip(self.coefficients.iter())
            .map(|(&x, &b)| x * b)
            .sum()
    }
}

/// A pair of FIR filters, one per channel, with independent histories.
///
/// # Example
/// ```ignore
/// static LOWPASS: [f32; 31] = [/* exported taps */];
/// let mut fir = StereoFir::new(&LOWPASS);
/// let processor = FrameProcessor::new(&POOL, fir, ChannelOrder::RightFirst);
/// ```
pub struct StereoFir<'c, const TAPS: usize> {
    pub left: FirFilter<'c, TAPS>,
    pub right: FirFilter<'c, TAPS>,
}

impl<'c, const TAPS: usize> StereoFir<'c, TAPS> {
    /// Both channels share one coefficient table.
    pub fn new(coefficients: &'c [f32; TAPS]) -> Self {
        Self::with_coefficients(coefficients, coefficients)
    }

    /// Separate coefficient tables per channel.
    pub fn with_coefficients(left: &'c [f32; TAPS], right: &'c [f32; TAPS]) -> Self {
        StereoFir {
            left: FirFilter::new(left),
            right: FirFilter::new(right),
        }
    }

    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Filter a single packed transfer word.
    ///
    /// For engines that interrupt once per sample rather than once per
    /// buffer. The output is rounded and saturated like buffer output.
    pub fn process_word(&mut self, order: ChannelOrder, word: u32) -> u32 {
        let (l, r) = unpack(order, word);
        let yl = self.left.process_sample(l as f32);
        let yr = self.right.process_sample(r as f32);
        pack(order, round_to_sample(yl), round_to_sample(yr))
    }
}

impl<const TAPS: usize> FrameTransform for StereoFir<'_, TAPS> {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.left.process_block(left);
        self.right.process_block(right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAPS: [f32; 5] = [0.1, -0.25, 0.5, 0.75, -0.05];

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn impulse_response_is_coefficient_table() {
        let mut fir = FirFilter::new(&TAPS);
        let mut out = [0.0f32; 8];
        out[0] = 1.0;
        fir.process_block(&mut out);
        for k in 0..5 {
            assert!(close(out[k], TAPS[k]), "tap {k}: {} vs {}", out[k], TAPS[k]);
        }
        for k in 5..8 {
            assert!(close(out[k], 0.0), "tail {k} = {}", out[k]);
        }
    }

    #[test]
    fn oldest_slot_pairs_with_last_coefficient() {
        for slot in 0..5 {
            let mut fir = FirFilter::new(&TAPS);
            fir.history[slot] = 1.0;
            assert!(close(fir.convolve(), TAPS[slot]), "slot {slot}");
        }
    }

    #[test]
    fn history_is_newest_first_and_bounded() {
        let mut fir = FirFilter::new(&TAPS);
        for x in 1..=7 {
            fir.process_sample(x as f32);
        }
        assert_eq!(fir.history(), &[7.0, 6.0, 5.0, 4.0, 3.0]);
        assert_eq!(fir.order(), 4);
        fir.reset();
        assert_eq!(fir.history(), &[0.0; 5]);
    }

    #[test]
    fn dc_gain_is_coefficient_sum() {
        let mut fir = FirFilter::new(&TAPS);
        let mut y = 0.0;
        for _ in 0..10 {
            y = fir.process_sample(1000.0);
        }
        let sum: f32 = TAPS.iter().sum();
        assert!((y - 1000.0 * sum).abs() < 1e-3);
    }

    #[test]
    fn single_tap_is_a_gain() {
        static HALF: [f32; 1] = [0.5];
        let mut fir = FirFilter::new(&HALF);
        assert_eq!(fir.process_sample(64.0), 32.0);
        assert_eq!(fir.process_sample(-8.0), -4.0);
    }

    #[test]
    fn channels_keep_separate_history() {
        static DELAY: [f32; 2] = [0.0, 1.0];
        let mut fir = StereoFir::new(&DELAY);
        let mut left = [1.0f32, 2.0, 3.0];
        let mut right = [10.0f32, 20.0, 30.0];
        fir.process(&mut left, &mut right);
        assert_eq!(left, [0.0, 1.0, 2.0]);
        assert_eq!(right, [0.0, 10.0, 20.0]);

        // History carries across buffers.
        let mut left = [4.0f32];
        let mut right = [40.0f32];
        fir.process(&mut left, &mut right);
        assert_eq!(left, [3.0]);
        assert_eq!(right, [30.0]);
    }

    #[test]
    fn independent_tables_per_channel() {
        static L: [f32; 1] = [1.0];
        static R: [f32; 1] = [-1.0];
        let mut fir = StereoFir::with_coefficients(&L, &R);
        let mut left = [5.0f32];
        let mut right = [5.0f32];
        fir.process(&mut left, &mut right);
        assert_eq!(left, [5.0]);
        assert_eq!(right, [-5.0]);
    }

    #[test]
    fn process_word_saturates() {
        static BOOST: [f32; 1] = [4.0];
        let mut fir = StereoFir::new(&BOOST);
        let word = pack(ChannelOrder::RightFirst, 20000, -3);
        let out = fir.process_word(ChannelOrder::RightFirst, word);
        assert_eq!(unpack(ChannelOrder::RightFirst, out), (i16::MAX, -12));
    }
}
