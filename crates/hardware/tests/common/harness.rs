//! Test harness: logging setup and faulty implementations.
//!
//! Each faulty unit wraps the golden model and breaks exactly one thing, so
//! a run against it should fail on one opcode and in one way only.

use alu8_core::common::{AluError, HardwareError, Result};
use alu8_core::isa::OperationKind;
use alu8_core::isa::opcodes::{OP_ADD, OP_CMP};
use alu8_core::verify::{Observation, UnitUnderTest};
use alu8_core::Alu;

/// Installs a test subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("warn")
        .try_init();
}

fn golden(opcode: u8, a: u8, b: u8) -> Result<Observation> {
    Alu::evaluate(opcode, a, b).map(Observation::from)
}

/// ADD computed at 9 bits and clamped instead of wrapped.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaturatingAdd;

impl UnitUnderTest for SaturatingAdd {
    fn name(&self) -> &str {
        "saturating-add"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        let mut out = golden(opcode, a, b)?;
        if opcode == OP_ADD {
            out.result = (u16::from(a) + u16::from(b)).min(0xFF) as u8;
        }
        Ok(out)
    }
}

/// CMP whose zero/negative flags come from the returned 0 instead of the difference.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResultFlagsCmp;

impl UnitUnderTest for ResultFlagsCmp {
    fn name(&self) -> &str {
        "result-flags-cmp"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        let mut out = golden(opcode, a, b)?;
        if opcode == OP_CMP {
            if let Some(flags) = out.flags.as_mut() {
                flags.zero = true;
                flags.negative = false;
            }
        }
        Ok(out)
    }
}

/// Panics on one operation.
#[derive(Clone, Copy, Debug)]
pub struct PanicsOn(pub OperationKind);

impl UnitUnderTest for PanicsOn {
    fn name(&self) -> &str {
        "panics"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        assert!(opcode != self.0.opcode(), "{} is not implemented", self.0);
        golden(opcode, a, b)
    }
}

/// Returns an error on one operation.
#[derive(Clone, Copy, Debug)]
pub struct FailsOn(pub OperationKind);

impl UnitUnderTest for FailsOn {
    fn name(&self) -> &str {
        "fails"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        if opcode == self.0.opcode() {
            return Err(AluError::InvalidOpcode(opcode));
        }
        golden(opcode, a, b)
    }
}

/// A device that disappears after `remaining` cycles.
#[derive(Clone, Copy, Debug)]
pub struct Unplugged {
    /// Cycles left before every call fails.
    pub remaining: u32,
}

impl UnitUnderTest for Unplugged {
    fn name(&self) -> &str {
        "unplugged"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        if self.remaining == 0 {
            return Err(HardwareError::PinIo {
                pin: 21,
                message: "device removed".into(),
            }
            .into());
        }
        self.remaining -= 1;
        golden(opcode, a, b)
    }
}
