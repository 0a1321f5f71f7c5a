//! Stimulus/response adapter.
//!
//! One cycle drives operand A, operand B and the opcode onto output lines,
//! waits out the settling delay and samples the result lines. All buses are
//! LSB first: element 0 of each pin list carries bit 0.
//!
//! The cycle is a type-state chain:
//!
//! ```text
//! HardwareAdapter::drive() -> Stimulus::settle() -> Settled::sample() -> u8
//!        Driving                   Settling             Sampling      Idle
//! ```
//!
//! [`Settled`] can only be obtained from [`Stimulus::settle`], which does not
//! return before the settling deadline, so sampling early is not expressible.
//! Every stage holds the adapter's `&mut` borrow, so a second cycle cannot
//! start on the same device while one is in flight.

use std::collections::BTreeSet;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use super::gpio::GpioBus;
use crate::common::constants::{DATA_WIDTH, DEFAULT_SETTLE_US, OPCODE_WIDTH};
use crate::common::{AluError, Result};
use crate::verify::{Observation, UnitUnderTest};

const DATA_LINES: usize = DATA_WIDTH as usize;
const OPCODE_LINES: usize = OPCODE_WIDTH as usize;

/// Line numbers of the four buses, LSB first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMap {
    a: [u32; DATA_LINES],
    b: [u32; DATA_LINES],
    opcode: [u32; OPCODE_LINES],
    result: [u32; DATA_LINES],
}

impl Default for PinMap {
    /// A on lines 0–7, B on 8–15, opcode on 16–20, result on 21–28.
    fn default() -> Self {
        Self {
            a: [0, 1, 2, 3, 4, 5, 6, 7],
            b: [8, 9, 10, 11, 12, 13, 14, 15],
            opcode: [16, 17, 18, 19, 20],
            result: [21, 22, 23, 24, 25, 26, 27, 28],
        }
    }
}

impl PinMap {
    /// Builds a map from pin lists.
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] if a list has the wrong length or a line appears twice.
    pub fn new(a: &[u32], b: &[u32], opcode: &[u32], result: &[u32]) -> Result<Self> {
        fn fixed<const N: usize>(bus: &str, pins: &[u32]) -> Result<[u32; N]> {
            pins.try_into().map_err(|_| {
                AluError::Config(format!("{bus} needs {N} lines, got {}", pins.len()))
            })
        }

        let map = Self {
            a: fixed("a_pins", a)?,
            b: fixed("b_pins", b)?,
            opcode: fixed("opcode_pins", opcode)?,
            result: fixed("result_pins", result)?,
        };

        let mut seen = BTreeSet::new();
        if let Some(dup) = map.all_lines().find(|pin| !seen.insert(*pin)) {
            return Err(AluError::Config(format!("line {dup} is assigned twice")));
        }
        Ok(map)
    }

    /// Operand A lines.
    pub const fn a(&self) -> &[u32; DATA_LINES] {
        &self.a
    }

    /// Operand B lines.
    pub const fn b(&self) -> &[u32; DATA_LINES] {
        &self.b
    }

    /// Opcode lines.
    pub const fn opcode(&self) -> &[u32; OPCODE_LINES] {
        &self.opcode
    }

    /// Result lines.
    pub const fn result(&self) -> &[u32; DATA_LINES] {
        &self.result
    }

    /// Every output line: A, then B, then opcode.
    pub fn outputs(&self) -> impl Iterator<Item = u32> + '_ {
        self.a.iter().chain(&self.b).chain(&self.opcode).copied()
    }

    fn all_lines(&self) -> impl Iterator<Item = u32> + '_ {
        self.outputs().chain(self.result.iter().copied())
    }
}

/// Where the adapter is in its cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CyclePhase {
    /// No cycle in flight.
    #[default]
    Idle,
    /// Inputs are being driven.
    Driving,
    /// Waiting out the settling delay.
    Settling,
    /// Result lines are being read.
    Sampling,
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Driving => "driving",
            Self::Settling => "settling",
            Self::Sampling => "sampling",
        };
        f.write_str(name)
    }
}

/// Drives a physical or simulated ALU through a [`GpioBus`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use alu8_core::hw::{HardwareAdapter, PinMap, SimulatedAlu};
///
/// let bus = SimulatedAlu::new(PinMap::default(), Duration::from_micros(50));
/// let mut adapter = HardwareAdapter::new(bus, PinMap::default(), Duration::from_micros(200)).unwrap();
///
/// let result = adapter.drive(0b00000, 1, 1).unwrap().settle().sample().unwrap();
/// assert_eq!(result, 2);
/// ```
#[derive(Debug)]
pub struct HardwareAdapter<B: GpioBus> {
    bus: B,
    pins: PinMap,
    settle: Duration,
    phase: CyclePhase,
    cycles: u64,
}

impl<B: GpioBus> HardwareAdapter<B> {
    /// Claims `bus` and configures the lines of `pins`.
    ///
    /// # Errors
    ///
    /// [`AluError::Hardware`] if the backend refuses the lines.
    pub fn new(mut bus: B, pins: PinMap, settle: Duration) -> Result<Self> {
        bus.configure(&pins)?;
        tracing::debug!(settle_us = settle.as_micros(), "hardware adapter ready");
        Ok(Self {
            bus,
            pins,
            settle,
            phase: CyclePhase::Idle,
            cycles: 0,
        })
    }

    /// Adapter with the default pin map and the default 500 µs settling delay.
    ///
    /// # Errors
    ///
    /// See [`Self::new`].
    pub fn with_defaults(bus: B) -> Result<Self> {
        Self::new(bus, PinMap::default(), Duration::from_micros(DEFAULT_SETTLE_US))
    }

    /// Current phase.
    pub const fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Completed cycles.
    pub const fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Settling delay.
    pub const fn settle_time(&self) -> Duration {
        self.settle
    }

    /// Pin assignment.
    pub const fn pins(&self) -> &PinMap {
        &self.pins
    }

    /// The underlying bus.
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Releases the bus.
    pub fn into_bus(self) -> B {
        self.bus
    }

    fn drive_bus(&mut self, pins: &[u32], value: u8) -> Result<()> {
        for (bit, pin) in pins.iter().enumerate() {
            self.bus.set_output(*pin, (value >> bit) & 1 == 1)?;
        }
        Ok(())
    }

    /// Drives one stimulus and starts the settling clock.
    ///
    /// # Errors
    ///
    /// [`AluError::InvalidOpcode`] if `opcode` does not fit in 5 bits,
    /// [`AluError::Hardware`] if a line cannot be driven.
    pub fn drive(&mut self, opcode: u8, a: u8, b: u8) -> Result<Stimulus<'_, B>> {
        if u32::from(opcode) >> OPCODE_WIDTH != 0 {
            return Err(AluError::InvalidOpcode(opcode));
        }
        self.phase = CyclePhase::Driving;
        let pins = self.pins;
        let driven = self
            .drive_bus(&pins.a, a)
            .and_then(|()| self.drive_bus(&pins.b, b))
            .and_then(|()| self.drive_bus(&pins.opcode, opcode));
        if let Err(e) = driven {
            self.phase = CyclePhase::Idle;
            return Err(e);
        }
        tracing::trace!(opcode, a, b, "stimulus driven");
        let deadline = Instant::now() + self.settle;
        Ok(Stimulus {
            adapter: self,
            deadline,
        })
    }

    /// One complete cycle: drive, settle, sample.
    ///
    /// # Errors
    ///
    /// See [`Self::drive`] and [`Settled::sample`].
    pub fn cycle(&mut self, opcode: u8, a: u8, b: u8) -> Result<u8> {
        self.drive(opcode, a, b)?.settle().sample()
    }
}

/// Inputs are driven; the outputs may still be propagating.
#[derive(Debug)]
#[must_use = "a stimulus must be settled and sampled"]
pub struct Stimulus<'a, B: GpioBus> {
    adapter: &'a mut HardwareAdapter<B>,
    deadline: Instant,
}

impl<'a, B: GpioBus> Stimulus<'a, B> {
    /// Time left until the outputs are guaranteed stable.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Blocks until the settling delay has elapsed.
    pub fn settle(self) -> Settled<'a, B> {
        self.adapter.phase = CyclePhase::Settling;
        let wait = self.remaining();
        if !wait.is_zero() {
            thread::sleep(wait);
        }
        Settled {
            adapter: self.adapter,
        }
    }
}

/// The settling delay has elapsed; the result lines may be read.
#[derive(Debug)]
#[must_use = "a settled stimulus should be sampled"]
pub struct Settled<'a, B: GpioBus> {
    adapter: &'a mut HardwareAdapter<B>,
}

impl<B: GpioBus> Settled<'_, B> {
    /// Reads the result lines and returns the adapter to idle.
    ///
    /// # Errors
    ///
    /// [`AluError::Hardware`] if a line cannot be read.
    pub fn sample(self) -> Result<u8> {
        let adapter = self.adapter;
        adapter.phase = CyclePhase::Sampling;
        let pins = adapter.pins;
        let mut value = 0u8;
        for (bit, pin) in pins.result.iter().enumerate() {
            match adapter.bus.read_input(*pin) {
                Ok(high) => value |= u8::from(high) << bit,
                Err(e) => {
                    adapter.phase = CyclePhase::Idle;
                    return Err(e.into());
                }
            }
        }
        adapter.phase = CyclePhase::Idle;
        adapter.cycles += 1;
        tracing::trace!(result = value, "result sampled");
        Ok(value)
    }
}

impl<B: GpioBus> UnitUnderTest for HardwareAdapter<B> {
    fn name(&self) -> &str {
        "hardware"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        self.cycle(opcode, a, b).map(Observation::result_only)
    }
}
