//! Digital-line backend interface.

use super::adapter::PinMap;
use crate::common::HardwareError;

/// A set of single-bit digital lines addressed by number.
///
/// Implemented by the pin-level simulator and, with the `sysfs` feature, by
/// the Linux sysfs backend.
pub trait GpioBus {
    /// Prepares the lines of `pins` (outputs driven low, inputs released).
    ///
    /// # Errors
    ///
    /// A [`HardwareError`] if a line cannot be claimed.
    fn configure(&mut self, pins: &PinMap) -> Result<(), HardwareError> {
        let _ = pins;
        Ok(())
    }

    /// Drives an output line high (`true`) or low.
    ///
    /// # Errors
    ///
    /// A [`HardwareError`] if the line is unknown or cannot be written.
    fn set_output(&mut self, pin: u32, high: bool) -> Result<(), HardwareError>;

    /// Reads an input line.
    ///
    /// # Errors
    ///
    /// A [`HardwareError`] if the line is unknown or cannot be read.
    fn read_input(&mut self, pin: u32) -> Result<bool, HardwareError>;
}

impl<B: GpioBus + ?Sized> GpioBus for Box<B> {
    fn configure(&mut self, pins: &PinMap) -> Result<(), HardwareError> {
        (**self).configure(pins)
    }

    fn set_output(&mut self, pin: u32, high: bool) -> Result<(), HardwareError> {
        (**self).set_output(pin, high)
    }

    fn read_input(&mut self, pin: u32) -> Result<bool, HardwareError> {
        (**self).read_input(pin)
    }
}
