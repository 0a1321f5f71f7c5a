//! Configuration system for verification runs.
//!
//! This module defines the configuration structures used to parameterize a
//! run. It provides:
//! 1. **Defaults:** Baseline constants for the sweep, the pin assignment and
//!    reporting.
//! 2. **Structures:** The `sweep`, `hardware` and `report` sections.
//! 3. **Validation:** Conversion of the raw sections into checked values
//!    ([`Sweep`], [`PinMap`]).
//!
//! Configuration is supplied as JSON; every field is optional and
//! `Config::default()` is the same as parsing `{}`.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::common::{AluError, Result};
use crate::hw::PinMap;
use crate::isa::OperationKind;
use crate::vectors::Sweep;

/// Default configuration constants.
mod defaults {
    use crate::common::constants::{DEFAULT_PROGRESS_PERMILLE, DEFAULT_SETTLE_US};

    /// Operand sampling step (1 = every value).
    pub const STRIDE: u8 = 1;

    /// Worker threads for software sweeps.
    pub const THREADS: usize = 1;

    /// Lines driving operand A, LSB first.
    pub const A_PINS: [u32; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

    /// Lines driving operand B, LSB first.
    pub const B_PINS: [u32; 8] = [8, 9, 10, 11, 12, 13, 14, 15];

    /// Lines driving the opcode, LSB first.
    pub const OPCODE_PINS: [u32; 5] = [16, 17, 18, 19, 20];

    /// Lines sampling the result, LSB first.
    pub const RESULT_PINS: [u32; 8] = [21, 22, 23, 24, 25, 26, 27, 28];

    /// Settling delay in microseconds.
    pub const SETTLE_US: u64 = DEFAULT_SETTLE_US;

    /// Progress cadence in thousandths of the total.
    pub const PROGRESS_PERMILLE: u64 = DEFAULT_PROGRESS_PERMILLE;

    /// Failing cases retained for the report.
    pub const FAILURE_SAMPLES: usize = 16;
}

/// Failing cases retained for the report unless configured otherwise.
pub const DEFAULT_FAILURE_SAMPLES: usize = defaults::FAILURE_SAMPLES;

/// Root configuration.
///
/// # Examples
///
/// ```
/// use alu8_core::config::Config;
///
/// let json = r#"{
///     "sweep": { "operations": ["ADD", "sub"], "stride": 4 },
///     "hardware": { "settle_us": 750 },
///     "report": { "failure_samples": 3 }
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.sweep.stride, 4);
/// assert_eq!(config.hardware.settle_us, 750);
/// assert_eq!(config.hardware.opcode_pins, vec![16, 17, 18, 19, 20]);
/// assert_eq!(config.sweep.build().unwrap().len(), 2 * 64 * 64);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Test-domain selection for software sweeps
    pub sweep: SweepConfig,
    /// Pin assignment and timing of the hardware adapter
    pub hardware: HardwareConfig,
    /// Progress and report settings
    pub report: ReportConfig,
}

impl Config {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] if the JSON is malformed or fails validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AluError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// [`AluError::Io`] if the file cannot be read, [`AluError::Config`] otherwise.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| AluError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Checks every section.
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let _ = self.sweep.build()?;
        let _ = self.hardware.pin_map()?;
        if self.sweep.threads == 0 {
            return Err(AluError::Config("sweep.threads must be at least 1".into()));
        }
        if self.hardware.settle_us == 0 {
            return Err(AluError::Config("hardware.settle_us must be at least 1".into()));
        }
        if self.report.progress_permille == 0 || self.report.progress_permille > 1000 {
            return Err(AluError::Config(
                "report.progress_permille must be within 1..=1000".into(),
            ));
        }
        Ok(())
    }
}

/// Test-domain selection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    /// Operation mnemonics to run; empty means all 19
    pub operations: Vec<String>,

    /// Operand sampling step; 1 runs every value
    pub stride: u8,

    /// Worker threads
    pub threads: usize,
}

impl SweepConfig {
    /// Resolves the section into a [`Sweep`].
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] for an unknown mnemonic or a zero stride.
    pub fn build(&self) -> Result<Sweep> {
        if self.stride == 0 {
            return Err(AluError::Config("sweep.stride must be at least 1".into()));
        }
        let mut sweep = Sweep::exhaustive().with_stride(self.stride);
        if !self.operations.is_empty() {
            let ops = self
                .operations
                .iter()
                .map(|name| {
                    OperationKind::from_name(name)
                        .ok_or_else(|| AluError::Config(format!("unknown operation {name:?}")))
                })
                .collect::<Result<Vec<_>>>()?;
            sweep = sweep.with_operations(&ops);
        }
        Ok(sweep)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            operations: Vec::new(),
            stride: defaults::STRIDE,
            threads: defaults::THREADS,
        }
    }
}

/// Pin assignment and timing of the hardware adapter.
///
/// Every list is LSB first: element 0 carries bit 0.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HardwareConfig {
    /// Operand A output lines (8)
    pub a_pins: Vec<u32>,

    /// Operand B output lines (8)
    pub b_pins: Vec<u32>,

    /// Opcode output lines (5)
    pub opcode_pins: Vec<u32>,

    /// Result input lines (8)
    pub result_pins: Vec<u32>,

    /// Delay between driving the inputs and sampling the result, in microseconds;
    /// at least 1
    pub settle_us: u64,
}

impl HardwareConfig {
    /// Settling delay as a [`Duration`].
    pub const fn settle_time(&self) -> Duration {
        Duration::from_micros(self.settle_us)
    }

    /// Validates the pin lists and builds a [`PinMap`].
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] for a wrong line count or a line used twice.
    pub fn pin_map(&self) -> Result<PinMap> {
        PinMap::new(&self.a_pins, &self.b_pins, &self.opcode_pins, &self.result_pins)
    }
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            a_pins: defaults::A_PINS.to_vec(),
            b_pins: defaults::B_PINS.to_vec(),
            opcode_pins: defaults::OPCODE_PINS.to_vec(),
            result_pins: defaults::RESULT_PINS.to_vec(),
            settle_us: defaults::SETTLE_US,
        }
    }
}

/// Progress and report settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// Emit progress every this many thousandths of the run (1 = every 0.1%)
    pub progress_permille: u64,

    /// Failing cases kept for the final report
    pub failure_samples: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            progress_permille: defaults::PROGRESS_PERMILLE,
            failure_samples: defaults::FAILURE_SAMPLES,
        }
    }
}
