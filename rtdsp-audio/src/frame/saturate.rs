//! Narrowing of floating-point results to the `i16` transfer width.
//!
//! Transform output is rounded to nearest and then saturated, so an
//! overflowing result pins at full scale instead of wrapping into the
//! opposite polarity.

/// Clamp a rounded sample to the `i16` half-word carried in a transfer word.
///
/// Called once per channel per frame on the processing path, so on Cortex-M
/// cores with the DSP extension it is a single `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        // SAFETY: `ssat` only reads `val` and writes `out`.
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
                options(pure, nomem, nostack),
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// Round `x` to the nearest integer (halves away from zero) and saturate to
/// `i16`. NaN becomes 0.
#[inline]
pub fn round_to_sample(x: f32) -> i16 {
    if x.is_nan() {
        return 0;
    }
    // f32 -> i32 `as` already clamps at the i32 bounds
    saturate16(libm::roundf(x) as i32)
}
