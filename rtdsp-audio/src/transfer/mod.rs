//! Transfer engine abstraction.
//!
//! A transfer engine moves samples between the codec serial port and the
//! buffer pool without per-sample software work: it fills one buffer from
//! the receive stream while draining another to the transmit stream, and
//! raises a completion event every time a fill finishes.
//!
//! ## Interrupt wiring
//!
//! ```ignore
//! static POOL: BufferPool<1024> = BufferPool::new();
//!
//! // In the transfer-complete ISR:
//! engine.service_completion(&POOL);
//! ```
//!
//! [`TransferEngine::service_completion`] acknowledges the event at the
//! engine and then runs the registered [`CompletionHandler`], which only
//! publishes state. All recovery decisions happen in the polling loop.
//!
//! ## Implementations
//!
//! - Hardware engines (EDMA, SAI DMA, ...) live in board support crates and
//!   program the addresses from [`TransferLayout`].
//! - [`LoopbackEngine`] moves samples in software, for host tests and
//!   simulation.

pub mod loopback;

pub use loopback::{ConstantSource, FrameRecorder, LoopbackEngine, LoopbackError, SampleSink, SampleSource};

use crate::constants::NUM_BUFFERS;

/// Receiver of transfer-complete events. Runs in interrupt context.
///
/// Implementations must be O(1), must not block, and must not allocate.
pub trait CompletionHandler {
    fn on_transfer_complete(&self);
}

/// Geometry and buffer addresses handed to an engine at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLayout {
    /// Base address of each pool buffer.
    pub buffers: [*mut u32; NUM_BUFFERS],
    /// Transfer words (stereo frames) per buffer.
    pub frames: usize,
    /// Channels interleaved per transfer word.
    pub channels: usize,
    /// Buffer the receive side should fill first.
    pub first_fill: usize,
    /// Buffer the transmit side should drain first.
    pub first_drain: usize,
}

/// Hardware fault conditions an engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Serial receiver overran (the core was halted or starved the port).
    ReceiverOverrun,
    /// Serial transmitter ran dry.
    TransmitUnderrun,
    /// Bit or frame clock from the codec disappeared.
    ClockLoss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Stopped,
    Running,
    /// Transfers have halted and the engine must be reinitialized.
    Fault(FaultKind),
}

/// Start/stop/status interface to the transfer hardware.
pub trait TransferEngine {
    /// Error type for start/stop operations.
    type Error;

    /// Program the engine for `layout` and begin cycling through the pool.
    fn start(&mut self, layout: &TransferLayout) -> Result<(), Self::Error>;

    /// Halt transfers.
    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Current engine state. Must not block.
    fn status(&self) -> TransferStatus;

    /// Clear the pending completion event at its source.
    fn acknowledge(&mut self);

    /// Interrupt entry point: acknowledge, then publish the completion.
    fn service_completion<H: CompletionHandler + ?Sized>(&mut self, handler: &H) {
        self.acknowledge();
        handler.on_transfer_complete();
    }
}
