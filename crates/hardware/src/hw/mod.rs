//! Hardware verification.
//!
//! This module reaches a unit under test through digital lines. It provides:
//! 1. **Backend interface:** [`GpioBus`], numbered single-bit lines.
//! 2. **Adapter:** [`HardwareAdapter`], the drive/settle/sample cycle.
//! 3. **Simulator:** [`SimulatedAlu`], a pin-level stand-in with propagation
//!    delay and stuck-at faults.
//! 4. **Client patterns:** [`probe`], smoke, single-shot and stress runs.
//! 5. **Linux backend:** `sysfs::SysfsBus` (feature `sysfs`).

/// Stimulus/response cycle over a backend.
pub mod adapter;

/// Digital-line backend trait.
pub mod gpio;

/// Smoke, manual and stress usage patterns.
pub mod probe;

/// Pin-level simulated unit.
pub mod sim;

/// Linux sysfs GPIO backend.
#[cfg(feature = "sysfs")]
pub mod sysfs;

pub use adapter::{CyclePhase, HardwareAdapter, PinMap, Settled, Stimulus};
pub use gpio::GpioBus;
pub use sim::{Fault, SimulatedAlu};
