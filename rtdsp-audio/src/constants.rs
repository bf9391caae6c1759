/// Number of buffers in the transfer pool.
///
/// One buffer is filled by the receive side, one is drained by the transmit
/// side, and one is available to the frame processor. Do not change this.
pub const NUM_BUFFERS: usize = 3;

/// Default number of stereo frames per buffer (one `u32` transfer word each).
pub const DEFAULT_BUFFER_FRAMES: usize = 1024;

/// Number of interleaved channels carried by each transfer word.
pub const CHANNELS: usize = 2;

/// Magnitude of the most negative `i16` sample; the processing range is
/// `-FULL_SCALE..FULL_SCALE`.
pub const FULL_SCALE: f32 = 32768.0;
