//! Software transfer engine.
//!
//! [`LoopbackEngine`] plays the role of the DMA controller: each
//! [`tick`](LoopbackEngine::tick) fills the current fill buffer from a
//! [`SampleSource`], drains the current drain buffer into a [`SampleSink`],
//! and then raises the completion event. One tick is one buffer period.
//!
//! ```text
//! SampleSource ──► fill buffer          drain buffer ──► SampleSink
//!                        └── completion ──► BufferPool
//! ```

use crate::config::ChannelOrder;
use crate::frame::interleave::{pack, unpack};
use crate::frame::{BufferPool, RotationCollision};

use super::{FaultKind, TransferEngine, TransferLayout, TransferStatus};

/// Producer of input frames (the "receive" side of the serial port).
pub trait SampleSource {
    fn next_frame(&mut self) -> (i16, i16);
}

/// Consumer of output frames (the "transmit" side of the serial port).
pub trait SampleSink {
    fn push_frame(&mut self, left: i16, right: i16);
}

/// Emits the same stereo frame forever.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource {
    pub left: i16,
    pub right: i16,
}

impl SampleSource for ConstantSource {
    fn next_frame(&mut self) -> (i16, i16) {
        (self.left, self.right)
    }
}

/// Stores the first `N` frames it receives and counts the rest.
pub struct FrameRecorder<const N: usize> {
    frames: [(i16, i16); N],
    len: usize,
    dropped: usize,
}

impl<const N: usize> FrameRecorder<N> {
    pub const fn new() -> Self {
        FrameRecorder {
            frames: [(0, 0); N],
            len: 0,
            dropped: 0,
        }
    }

    /// Recorded frames, oldest first.
    pub fn frames(&self) -> &[(i16, i16)] {
        &self.frames[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Frames received after the recorder was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.len = 0;
        self.dropped = 0;
    }
}

impl<const N: usize> Default for FrameRecorder<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SampleSink for FrameRecorder<N> {
    fn push_frame(&mut self, left: i16, right: i16) {
        if self.len < N {
            self.frames[self.len] = (left, right);
            self.len += 1;
        } else {
            self.dropped += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopbackError {
    /// A start was refused (set up with [`LoopbackEngine::refuse_starts`]).
    StartRefused,
    /// The layout does not describe interleaved stereo.
    UnsupportedChannels(usize),
}

/// Software stand-in for a DMA transfer engine.
pub struct LoopbackEngine<S, K> {
    source: S,
    sink: K,
    order: ChannelOrder,
    status: TransferStatus,
    starts: u32,
    refused_starts: u32,
    acknowledged: u32,
}

impl<S: SampleSource, K: SampleSink> LoopbackEngine<S, K> {
    pub fn new(source: S, sink: K, order: ChannelOrder) -> Self {
        LoopbackEngine {
            source,
            sink,
            order,
            status: TransferStatus::Stopped,
            starts: 0,
            refused_starts: 0,
            acknowledged: 0,
        }
    }

    /// Run one buffer period against `pool`.
    ///
    /// Does nothing unless the engine is running. If the processor still
    /// holds the fill or drain buffer, nothing is transferred, no completion
    /// is raised and the collision is returned.
    pub fn tick<const FRAMES: usize>(
        &mut self,
        pool: &BufferPool<FRAMES>,
    ) -> Result<(), RotationCollision> {
        if self.status != TransferStatus::Running {
            return Ok(());
        }

        let order = self.order;
        let source = &mut self.source;
        let sink = &mut self.sink;
        pool.with_transfer_buffers(|fill, drain| {
            for (dst, &src) in fill.words.iter_mut().zip(drain.words.iter()) {
                let (l, r) = source.next_frame();
                *dst = pack(order, l, r);
                let (l, r) = unpack(order, src);
                sink.push_frame(l, r);
            }
        })?;

        self.service_completion(pool);
        Ok(())
    }

    /// Simulate a hardware fault; transfers halt until the next start.
    pub fn inject_fault(&mut self, kind: FaultKind) {
        self.status = TransferStatus::Fault(kind);
    }

    /// Make the next `count` calls to `start` fail.
    pub fn refuse_starts(&mut self, count: u32) {
        self.refused_starts = count;
    }

    /// Successful starts so far.
    pub fn starts(&self) -> u32 {
        self.starts
    }

    /// Completion events acknowledged so far.
    pub fn acknowledged(&self) -> u32 {
        self.acknowledged
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }
}

impl<S: SampleSource, K: SampleSink> TransferEngine for LoopbackEngine<S, K> {
    type Error = LoopbackError;

    fn start(&mut self, layout: &TransferLayout) -> Result<(), Self::Error> {
        if layout.channels != 2 {
            return Err(LoopbackError::UnsupportedChannels(layout.channels));
        }
        if self.refused_starts > 0 {
            self.refused_starts -= 1;
            return Err(LoopbackError::StartRefused);
        }
        self.status = TransferStatus::Running;
        self.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.status = TransferStatus::Stopped;
        Ok(())
    }

    fn status(&self) -> TransferStatus {
        self.status
    }

    fn acknowledge(&mut self) {
        self.acknowledged += 1;
    }
}
