//! Pipeline configuration.
//!
//! Everything here is `Copy` and constructible in `const` context so a
//! configuration can live in a `static` next to the buffer pool.

use crate::constants::DEFAULT_BUFFER_FRAMES;

/// Codec sample rates supported by the transfer hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleRate {
    Hz8000,
    Hz12000,
    Hz16000,
    Hz24000,
    Hz32000,
    #[default]
    Hz48000,
    Hz96000,
}

impl SampleRate {
    /// Sample frequency in Hz.
    pub const fn hz(self) -> f32 {
        match self {
            SampleRate::Hz8000 => 8_000.0,
            SampleRate::Hz12000 => 12_000.0,
            SampleRate::Hz16000 => 16_000.0,
            SampleRate::Hz24000 => 24_000.0,
            SampleRate::Hz32000 => 32_000.0,
            SampleRate::Hz48000 => 48_000.0,
            SampleRate::Hz96000 => 96_000.0,
        }
    }

    /// Time in microseconds for the hardware to complete one buffer of
    /// `frames` stereo frames. This is the processing deadline per buffer.
    pub fn frame_period_us(self, frames: usize) -> u32 {
        ((frames as f32 * 1_000_000.0) / self.hz()) as u32
    }
}

/// Placement of the two channels inside one 32-bit transfer word.
///
/// This is the wire format between the frame processor and the transfer
/// hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelOrder {
    /// Left in bits 0–15, right in bits 16–31.
    #[default]
    LeftFirst,
    /// Right in bits 0–15, left in bits 16–31 (McASP/McBSP layout on the
    /// OMAP-L138, where the right sample precedes the left in memory).
    RightFirst,
}

/// Runtime parameters for an [`AudioPipeline`](crate::pipeline::AudioPipeline).
///
/// # Example
/// ```ignore
/// const CONFIG: PipelineConfig = PipelineConfig::new()
///     .with_sample_rate(SampleRate::Hz16000)
///     .with_channel_order(ChannelOrder::RightFirst);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sample_rate: SampleRate,
    pub channel_order: ChannelOrder,
    /// Transfer restarts allowed in a row before the fault is escalated.
    pub max_consecutive_restarts: u8,
}

impl PipelineConfig {
    /// 48 kHz, left-first, three restarts.
    pub const fn new() -> Self {
        PipelineConfig {
            sample_rate: SampleRate::Hz48000,
            channel_order: ChannelOrder::LeftFirst,
            max_consecutive_restarts: 3,
        }
    }

    pub const fn with_sample_rate(mut self, rate: SampleRate) -> Self {
        self.sample_rate = rate;
        self
    }

    pub const fn with_channel_order(mut self, order: ChannelOrder) -> Self {
        self.channel_order = order;
        self
    }

    pub const fn with_max_consecutive_restarts(mut self, restarts: u8) -> Self {
        self.max_consecutive_restarts = restarts;
        self
    }

    /// Processing deadline in microseconds for buffers of `FRAMES` frames.
    pub fn deadline_us<const FRAMES: usize>(&self) -> u32 {
        self.sample_rate.frame_period_us(FRAMES)
    }

    /// Deadline for the default buffer length.
    pub fn default_deadline_us(&self) -> u32 {
        self.sample_rate.frame_period_us(DEFAULT_BUFFER_FRAMES)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}
