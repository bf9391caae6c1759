/// Per-buffer transformation applied by the frame processor.
///
/// `left` and `right` hold one buffer's worth of de-interleaved samples in
/// `i16` scale (full scale is ±32768). The transform rewrites them in place;
/// the processor rounds and saturates the results when narrowing back to the
/// transfer format, so implementations may produce out-of-range values.
pub trait FrameTransform {
    /// Process one buffer. Both slices have the same length.
    fn process(&mut self, left: &mut [f32], right: &mut [f32]);
}

/// Leaves both channels untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl FrameTransform for Passthrough {
    fn process(&mut self, _left: &mut [f32], _right: &mut [f32]) {}
}

impl<T: FrameTransform + ?Sized> FrameTransform for &mut T {
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        (**self).process(left, right);
    }
}
