//! Frame transformations.
//!
//! Each type implements [`FrameTransform`](crate::transform::FrameTransform)
//! and can be handed to a [`FrameProcessor`](crate::processor::FrameProcessor).

mod fir;
mod gain;
mod mix;

pub use fir::{FirFilter, StereoFir};
pub use gain::Gain;
pub use mix::{AddTone, AmplitudeModulation, Reverb, SumDifference};
