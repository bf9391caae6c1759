use crate::config::ChannelOrder;

use super::interleave::{pack, silence, unpack};

/// One transfer buffer: `FRAMES` stereo frames in hardware transfer form,
/// one `u32` word per frame, 4-byte aligned for the DMA controller.
#[repr(C, align(4))]
#[derive(Clone)]
pub struct SampleBuffer<const FRAMES: usize> {
    pub words: [u32; FRAMES],
}

impl<const FRAMES: usize> SampleBuffer<FRAMES> {
    /// A buffer of silence.
    pub const fn zeroed() -> Self {
        SampleBuffer { words: [0u32; FRAMES] }
    }

    /// Number of stereo frames.
    pub const fn frames(&self) -> usize {
        FRAMES
    }

    /// Read frame `i` as `(left, right)`.
    pub fn frame(&self, i: usize, order: ChannelOrder) -> (i16, i16) {
        unpack(order, self.words[i])
    }

    /// Write frame `i`.
    pub fn set_frame(&mut self, i: usize, order: ChannelOrder, left: i16, right: i16) {
        self.words[i] = pack(order, left, right);
    }

    /// Fill every frame with the same `(left, right)` pair.
    pub fn fill_frames(&mut self, order: ChannelOrder, left: i16, right: i16) {
        self.words.fill(pack(order, left, right));
    }

    pub fn clear(&mut self) {
        silence(&mut self.words);
    }
}

impl<const FRAMES: usize> Default for SampleBuffer<FRAMES> {
    fn default() -> Self {
        Self::zeroed()
    }
}
