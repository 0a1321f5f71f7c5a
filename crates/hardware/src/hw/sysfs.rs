//! Linux sysfs GPIO backend.
//!
//! Drives real lines through `/sys/class/gpio` using the `sysfs_gpio` crate.
//! Lines are exported and given a direction when the adapter configures the
//! bus, and unexported when the bus is dropped.

use std::collections::BTreeMap;

use sysfs_gpio::{Direction, Pin};

use super::adapter::PinMap;
use super::gpio::GpioBus;
use crate::common::HardwareError;

fn pin_io(pin: u32, e: &sysfs_gpio::Error) -> HardwareError {
    HardwareError::PinIo {
        pin,
        message: e.to_string(),
    }
}

/// GPIO lines exposed by the kernel's sysfs interface.
#[derive(Debug, Default)]
pub struct SysfsBus {
    outputs: BTreeMap<u32, Pin>,
    inputs: BTreeMap<u32, Pin>,
}

impl SysfsBus {
    /// An empty bus; lines are claimed by [`GpioBus::configure`].
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(pin: u32, direction: Direction) -> Result<Pin, HardwareError> {
        let line = Pin::new(u64::from(pin));
        line.export().map_err(|e| match &e {
            sysfs_gpio::Error::Io(io) if io.kind() == std::io::ErrorKind::ResourceBusy => {
                HardwareError::Busy(format!("gpio{pin}"))
            }
            _ => pin_io(pin, &e),
        })?;
        line.set_direction(direction).map_err(|e| pin_io(pin, &e))?;
        Ok(line)
    }
}

impl GpioBus for SysfsBus {
    fn configure(&mut self, pins: &PinMap) -> Result<(), HardwareError> {
        for pin in pins.outputs() {
            let line = Self::claim(pin, Direction::Low)?;
            let _ = self.outputs.insert(pin, line);
        }
        for pin in pins.result() {
            let line = Self::claim(*pin, Direction::In)?;
            let _ = self.inputs.insert(*pin, line);
        }
        tracing::debug!(
            outputs = self.outputs.len(),
            inputs = self.inputs.len(),
            "sysfs lines exported"
        );
        Ok(())
    }

    fn set_output(&mut self, pin: u32, high: bool) -> Result<(), HardwareError> {
        let line = self
            .outputs
            .get(&pin)
            .ok_or(HardwareError::PinUnavailable(pin))?;
        line.set_value(u8::from(high)).map_err(|e| pin_io(pin, &e))
    }

    fn read_input(&mut self, pin: u32) -> Result<bool, HardwareError> {
        let line = self
            .inputs
            .get(&pin)
            .ok_or(HardwareError::PinUnavailable(pin))?;
        line.get_value().map(|v| v != 0).map_err(|e| pin_io(pin, &e))
    }
}

impl Drop for SysfsBus {
    fn drop(&mut self) {
        for (pin, line) in self.outputs.iter().chain(&self.inputs) {
            if let Err(e) = line.unexport() {
                tracing::warn!(pin, error = %e, "failed to unexport line");
            }
        }
    }
}
