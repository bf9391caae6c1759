//! Transfer buffers and the interrupt-safe handoff between the transfer
//! engine and the frame processor.
//!
//! ## Rotation
//!
//! ```text
//!            completion ──► ready_index + 1 (mod 3)
//!
//!   ready_index r :  buffer[r]       ready / processing
//!                    buffer[r + 1]   being filled by the receive side
//!                    buffer[r + 2]   being drained by the transmit side
//! ```
//!
//! Ownership of a buffer moves between roles only through the rotation.
//! The processor takes a buffer with [`BufferPool::claim_ready`] and gives
//! it back by dropping the returned [`ReadyBuffer`].

pub mod buffer;
pub mod interleave;
pub mod pool;
pub mod saturate;

pub use buffer::SampleBuffer;
pub use pool::{BufferPool, BufferRole, Diagnostics, ReadyBuffer, RotationCollision};
