use thiserror::Error;

use crate::frame::RotationCollision;

/// Errors surfaced to the polling loop.
///
/// `E` is the transfer engine's own error type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError<E> {
    /// The engine rejected a start or stop request.
    #[error("transfer engine error: {0:?}")]
    Transfer(E),

    /// The restart budget is spent; the pipeline stays halted until
    /// [`reset_fault`](crate::pipeline::AudioPipeline::reset_fault).
    #[error("transfer engine halted after {restarts} consecutive restarts")]
    TransferHalted { restarts: u8 },

    /// A software transfer would have touched a buffer that was already
    /// borrowed. Raised by
    /// [`run_transfer_period`](crate::pipeline::AudioPipeline::run_transfer_period).
    #[error("transfer reached buffer {index} while it was being processed")]
    RotationCollision { index: usize },
}

impl<E> From<RotationCollision> for PipelineError<E> {
    fn from(c: RotationCollision) -> Self {
        PipelineError::RotationCollision { index: c.index }
    }
}
