//! Pin-level ALU simulator.
//!
//! [`SimulatedAlu`] stands in for a physical unit on the other side of a
//! [`GpioBus`]. Its output lines follow the golden model of the driven
//! inputs, but only once a propagation delay has passed since the last input
//! change; a read before that returns the previous stable output. Stuck-at
//! faults can be injected on individual result bits.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::adapter::PinMap;
use super::gpio::GpioBus;
use crate::alu::Alu;
use crate::common::HardwareError;

/// A manufacturing-style defect on one result bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// The bit always reads 0.
    StuckLow(u8),
    /// The bit always reads 1.
    StuckHigh(u8),
}

impl Fault {
    const fn apply(self, value: u8) -> u8 {
        match self {
            Self::StuckLow(bit) => value & !(1 << (bit & 7)),
            Self::StuckHigh(bit) => value | (1 << (bit & 7)),
        }
    }
}

/// Simulated ALU reachable through digital lines.
#[derive(Clone, Debug)]
pub struct SimulatedAlu {
    pins: PinMap,
    propagation: Duration,
    inputs: BTreeMap<u32, bool>,
    last_change: Instant,
    stable: u8,
    faults: Vec<Fault>,
}

impl SimulatedAlu {
    /// A fault-free unit wired as `pins` with the given propagation delay.
    pub fn new(pins: PinMap, propagation: Duration) -> Self {
        let inputs = pins.outputs().map(|pin| (pin, false)).collect();
        let mut sim = Self {
            pins,
            propagation,
            inputs,
            last_change: Instant::now(),
            stable: 0,
            faults: Vec::new(),
        };
        sim.stable = sim.compute();
        sim
    }

    /// Adds a stuck-at fault.
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Propagation delay of the unit.
    pub const fn propagation(&self) -> Duration {
        self.propagation
    }

    fn bus_value(&self, pins: &[u32]) -> u8 {
        pins.iter()
            .enumerate()
            .filter(|(_, pin)| self.inputs.get(*pin).copied().unwrap_or(false))
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    /// Output for the currently driven inputs, ignoring timing.
    fn compute(&self) -> u8 {
        let a = self.bus_value(self.pins.a());
        let b = self.bus_value(self.pins.b());
        let opcode = self.bus_value(self.pins.opcode());
        // Unassigned opcodes leave the output bus low.
        let value = Alu::evaluate(opcode, a, b).map_or(0, |out| out.result);
        self.faults.iter().fold(value, |v, fault| fault.apply(v))
    }

    /// Output as seen on the result lines right now.
    fn visible(&self) -> u8 {
        if self.last_change.elapsed() >= self.propagation {
            self.compute()
        } else {
            self.stable
        }
    }
}

impl GpioBus for SimulatedAlu {
    fn set_output(&mut self, pin: u32, high: bool) -> Result<(), HardwareError> {
        let current = *self
            .inputs
            .get(&pin)
            .ok_or(HardwareError::PinUnavailable(pin))?;
        if current != high {
            self.stable = self.visible();
            let _ = self.inputs.insert(pin, high);
            self.last_change = Instant::now();
        }
        Ok(())
    }

    fn read_input(&mut self, pin: u32) -> Result<bool, HardwareError> {
        let bit = self
            .pins
            .result()
            .iter()
            .position(|p| *p == pin)
            .ok_or(HardwareError::PinUnavailable(pin))?;
        Ok((self.visible() >> bit) & 1 == 1)
    }
}
