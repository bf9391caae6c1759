//! Stereo interleave/de-interleave between transfer words and per-channel
//! working buffers.
//!
//! ## Transfer word format
//!
//! Each `u32` carries one stereo frame as two `i16` half-words. Which channel
//! sits in the low half-word is given by [`ChannelOrder`]:
//!
//! | Order | bits 0–15 | bits 16–31 |
//! |-------|-----------|------------|
//! | `LeftFirst` | left | right |
//! | `RightFirst` | right | left |
//!
//! On a little-endian core the low half-word is the one at the lower memory
//! address, so `RightFirst` matches a sample stream laid out `R L R L ...`.

use crate::config::ChannelOrder;

use super::saturate::round_to_sample;

/// Pack one stereo frame into a transfer word.
#[inline]
pub fn pack(order: ChannelOrder, left: i16, right: i16) -> u32 {
    let (low, high) = match order {
        ChannelOrder::LeftFirst => (left, right),
        ChannelOrder::RightFirst => (right, left),
    };
    (low as u16 as u32) | ((high as u16 as u32) << 16)
}

/// Unpack a transfer word into `(left, right)`.
#[inline]
pub fn unpack(order: ChannelOrder, word: u32) -> (i16, i16) {
    let low = word as i16;
    let high = (word >> 16) as i16;
    match order {
        ChannelOrder::LeftFirst => (low, high),
        ChannelOrder::RightFirst => (high, low),
    }
}

/// Split transfer words into separate floating-point channel buffers.
///
/// # Panics
///
/// Debug-asserts that all slices have the same length.
pub fn deinterleave(src: &[u32], order: ChannelOrder, left: &mut [f32], right: &mut [f32]) {
    debug_assert_eq!(src.len(), left.len());
    debug_assert_eq!(src.len(), right.len());

    for ((&word, l), r) in src.iter().zip(left.iter_mut()).zip(right.iter_mut()) {
        let (ls, rs) = unpack(order, word);
        *l = ls as f32;
        *r = rs as f32;
    }
}

/// Narrow floating-point channel buffers back into transfer words.
///
/// Every sample is rounded to nearest and saturated to `i16` before packing.
///
/// # Panics
///
/// Debug-asserts that all slices have the same length.
pub fn interleave(dest: &mut [u32], order: ChannelOrder, left: &[f32], right: &[f32]) {
    debug_assert_eq!(dest.len(), left.len());
    debug_assert_eq!(dest.len(), right.len());

    for ((word, &l), &r) in dest.iter_mut().zip(left.iter()).zip(right.iter()) {
        *word = pack(order, round_to_sample(l), round_to_sample(r));
    }
}

/// Fill transfer words with silence (zero for both channels).
pub fn silence(dest: &mut [u32]) {
    dest.fill(0);
}
