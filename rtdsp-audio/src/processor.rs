//! Polling-side consumer of ready buffers.
//!
//! [`FrameProcessor::process_if_ready`] is the whole job: claim the ready
//! buffer, split it into float channels, run the transform, narrow the
//! result back into the same buffer and release it. It never blocks and
//! never touches a buffer the transfer engine owns.
//!
//! ```ignore
//! let mut processor = FrameProcessor::new(&POOL, Gain::new(0.5, 2.0), ChannelOrder::RightFirst);
//! loop {
//!     processor.process_if_ready();
//!     cortex_m::asm::wfi();
//! }
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::ChannelOrder;
use crate::diag::{ActivityIndicator, NoIndicator};
use crate::frame::interleave::{deinterleave, interleave};
use crate::frame::BufferPool;
use crate::transform::FrameTransform;

/// Cooperative stop request, checked between buffers.
///
/// Can be set from any context, including an interrupt.
pub struct StopSignal {
    requested: AtomicBool,
}

impl StopSignal {
    pub const fn new() -> Self {
        StopSignal {
            requested: AtomicBool::new(false),
        }
    }

    pub fn request_stop(&self) {
        self.requested.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Withdraw a stop request so the loop can be run again.
    pub fn reset(&self) {
        self.requested.store(false, Ordering::Release);
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing was ready.
    Idle,
    /// Buffer `index` was transformed and released.
    Processed { index: usize },
    /// A stop was requested; no buffer was claimed.
    Stopped,
}

/// Transforms one ready buffer per call, in place.
///
/// Owns the per-channel float working buffers (`FRAMES` samples each) so no
/// allocation happens per buffer.
pub struct FrameProcessor<'p, T, I, const FRAMES: usize> {
    pool: &'p BufferPool<FRAMES>,
    transform: T,
    indicator: I,
    order: ChannelOrder,
    left: [f32; FRAMES],
    right: [f32; FRAMES],
}

impl<'p, T: FrameTransform, const FRAMES: usize> FrameProcessor<'p, T, NoIndicator, FRAMES> {
    pub fn new(pool: &'p BufferPool<FRAMES>, transform: T, order: ChannelOrder) -> Self {
        FrameProcessor {
            pool,
            transform,
            indicator: NoIndicator,
            order,
            left: [0.0; FRAMES],
            right: [0.0; FRAMES],
        }
    }
}

impl<'p, T: FrameTransform, I: ActivityIndicator, const FRAMES: usize>
    FrameProcessor<'p, T, I, FRAMES>
{
    /// Replace the activity indicator.
    pub fn with_indicator<J: ActivityIndicator>(self, indicator: J) -> FrameProcessor<'p, T, J, FRAMES> {
        FrameProcessor {
            pool: self.pool,
            transform: self.transform,
            indicator,
            order: self.order,
            left: self.left,
            right: self.right,
        }
    }

    /// Process the ready buffer, if there is one.
    ///
    /// Returns the index of the processed buffer, or `None` without touching
    /// anything when no buffer is ready.
    pub fn process_if_ready(&mut self) -> Option<usize> {
        let pool = self.pool;
        let mut buf = pool.claim_ready()?;
        let index = buf.index();

        self.indicator.begin();
        deinterleave(&buf.words, self.order, &mut self.left, &mut self.right);
        self.transform.process(&mut self.left, &mut self.right);
        interleave(&mut buf.words, self.order, &self.left, &self.right);
        self.indicator.end();

        buf.release();
        Some(index)
    }

    /// One iteration of the polling loop: honour a stop request, otherwise
    /// process whatever is ready.
    pub fn poll(&mut self, stop: &StopSignal) -> PollOutcome {
        if stop.is_requested() {
            return PollOutcome::Stopped;
        }
        match self.process_if_ready() {
            Some(index) => PollOutcome::Processed { index },
            None => PollOutcome::Idle,
        }
    }

    pub fn pool(&self) -> &'p BufferPool<FRAMES> {
        self.pool
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    /// Reconfigure the transform between buffers.
    pub fn transform_mut(&mut self) -> &mut T {
        &mut self.transform
    }

    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}
