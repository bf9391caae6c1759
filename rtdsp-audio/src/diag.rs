//! Hooks for external monitors.
//!
//! The pipeline never formats or transmits diagnostics. It exposes
//! [`Diagnostics`](crate::frame::Diagnostics) snapshots and drives an
//! [`ActivityIndicator`] around each processed buffer so the processing
//! time can be measured on a scope against the buffer deadline.

/// Marks the start and end of buffer processing.
pub trait ActivityIndicator {
    fn begin(&mut self);
    fn end(&mut self);
}

/// Indicator that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndicator;

impl ActivityIndicator for NoIndicator {
    #[inline(always)]
    fn begin(&mut self) {}

    #[inline(always)]
    fn end(&mut self) {}
}

#[cfg(feature = "gpio")]
pub use gpio::{OverrunLed, PinIndicator};

#[cfg(feature = "gpio")]
mod gpio {
    use embedded_hal::digital::OutputPin;

    use super::ActivityIndicator;
    use crate::frame::Diagnostics;

    /// Drives a digital output low while a buffer is processed and high
    /// otherwise. The low pulse width is the processing time.
    ///
    /// Pin errors cannot be propagated from the processing path; they are
    /// counted instead.
    pub struct PinIndicator<P> {
        pin: P,
        errors: u32,
    }

    impl<P: OutputPin> PinIndicator<P> {
        pub fn new(pin: P) -> Self {
            PinIndicator { pin, errors: 0 }
        }

        /// Failed pin writes so far.
        pub fn errors(&self) -> u32 {
            self.errors
        }

        pub fn into_inner(self) -> P {
            self.pin
        }
    }

    impl<P: OutputPin> ActivityIndicator for PinIndicator<P> {
        fn begin(&mut self) {
            if self.pin.set_low().is_err() {
                self.errors = self.errors.wrapping_add(1);
            }
        }

        fn end(&mut self) {
            if self.pin.set_high().is_err() {
                self.errors = self.errors.wrapping_add(1);
            }
        }
    }

    /// Lights an LED while the overrun latch is set.
    pub struct OverrunLed<P> {
        pin: P,
    }

    impl<P: OutputPin> OverrunLed<P> {
        pub fn new(pin: P) -> Self {
            OverrunLed { pin }
        }

        /// Mirror the overrun latch from `diag` onto the LED.
        pub fn update(&mut self, diag: &Diagnostics) -> Result<(), P::Error> {
            if diag.overrun {
                self.pin.set_high()
            } else {
                self.pin.set_low()
            }
        }

        pub fn into_inner(self) -> P {
            self.pin
        }
    }

}
