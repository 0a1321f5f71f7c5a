//! 8-bit ALU verification library.
//!
//! This crate checks implementations of an 8-bit ALU against a golden model:
//! 1. **ISA:** The 19-entry operation registry over a 5-bit opcode space.
//! 2. **Golden model:** Bit-exact result and flag semantics of every operation.
//! 3. **Vectors:** A lazy exhaustive sweep (19 × 256 × 256 cases) and the JSON
//!    record exchange format.
//! 4. **Verification:** The evaluation engine, sequential and parallel runs,
//!    per-opcode statistics and the summary report.
//! 5. **Hardware:** A GPIO stimulus/response adapter, a pin-level simulator
//!    and the smoke, probe and stress client patterns.

/// Golden model (arithmetic, logic, shifts).
pub mod alu;
/// Common types and constants (flags, errors, datapath widths).
pub mod common;
/// Run configuration (sweep, hardware pins, reporting).
pub mod config;
/// Hardware stimulus/response adapter, backends and probes.
pub mod hw;
/// Operation registry and opcode encodings.
pub mod isa;
/// Sequential and parallel verification runs.
pub mod runner;
/// Per-opcode statistics and the summary report.
pub mod stats;
/// Evaluation engine and the unit-under-test interface.
pub mod verify;
/// Vector generation and persisted records.
pub mod vectors;

/// The golden model; call `Alu::evaluate(opcode, a, b)`.
pub use crate::alu::{Alu, AluOutput};
/// Library error and result types.
pub use crate::common::{AluError, Result};
/// Root configuration type; use `Config::default()` or `Config::from_file`.
pub use crate::config::Config;
/// Run statistics returned by every runner.
pub use crate::stats::RunStats;
/// Lazy test domain; `Sweep::exhaustive()` covers every case.
pub use crate::vectors::Sweep;
