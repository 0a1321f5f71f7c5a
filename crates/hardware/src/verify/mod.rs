//! Evaluation engine.
//!
//! This module scores a unit under test against golden-model expectations. It provides:
//! 1. **Comparison:** [`evaluate`] decides pass/fail for one vector given the
//!    observed result and flags, reporting the first mismatching field.
//! 2. **Units under test:** The [`UnitUnderTest`] trait, implemented by the
//!    golden model itself and by the hardware adapter.
//! 3. **Containment:** [`check`] runs one case against a unit and absorbs
//!    every per-case error (unknown opcode, unit error, unit panic) into a
//!    failed [`EvaluationOutcome`]. Only hardware failures, which mean the
//!    device itself is unusable, propagate.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::alu::{Alu, AluOutput};
use crate::common::constants::OPCODE_SPACE;
use crate::common::{AluError, Flag, FlagMask, FlagSet, Result};
use crate::vectors::TestVector;

/// What an implementation under test produced for one case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    /// 8-bit result.
    pub result: u8,
    /// Status flags, if the unit exposes them.
    pub flags: Option<FlagSet>,
}

impl Observation {
    /// A result without flags (what a pin-level unit exposes).
    pub const fn result_only(result: u8) -> Self {
        Self { result, flags: None }
    }
}

impl From<AluOutput> for Observation {
    fn from(out: AluOutput) -> Self {
        Self {
            result: out.result,
            flags: Some(out.flags),
        }
    }
}

/// Classification of a failed case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MismatchKind {
    /// The case passed.
    None,
    /// The 8-bit result differs.
    ResultMismatch {
        /// Golden-model result.
        expected: u8,
        /// Observed result.
        actual: u8,
    },
    /// The result matched but a flag differs.
    FlagMismatch {
        /// First differing flag.
        flag: Flag,
        /// Golden-model value.
        expected: bool,
    },
    /// The case's opcode is not in the registry.
    UnknownOpcode(u8),
    /// The unit under test failed to produce an output.
    EvaluationError(String),
}

impl MismatchKind {
    /// Short category name used in reports.
    pub const fn category(&self) -> &'static str {
        match self {
            Self::None => "PASS",
            Self::ResultMismatch { .. } => "RESULT",
            Self::FlagMismatch { .. } => "FLAG",
            Self::UnknownOpcode(_) => "UNKNOWN_OPCODE",
            Self::EvaluationError(_) => "ERROR",
        }
    }
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("pass"),
            Self::ResultMismatch { expected, actual } => {
                write!(f, "result mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")
            }
            Self::FlagMismatch { flag, expected } => {
                write!(f, "flag mismatch: {flag} expected {expected}, got {}", !expected)
            }
            Self::UnknownOpcode(code) if usize::from(*code) >= OPCODE_SPACE => {
                f.write_str("unknown opcode (not a 5-bit code)")
            }
            Self::UnknownOpcode(code) => write!(f, "unknown opcode {code:05b}"),
            Self::EvaluationError(message) => write!(f, "evaluation error: {message}"),
        }
    }
}

/// Pass/fail verdict of one case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationOutcome {
    /// `true` iff every compared field matched.
    pub passed: bool,
    /// Reason for failure; [`MismatchKind::None`] when passed.
    pub mismatch: MismatchKind,
}

impl EvaluationOutcome {
    /// A passing outcome.
    pub const PASS: Self = Self {
        passed: true,
        mismatch: MismatchKind::None,
    };

    /// A failing outcome of the given kind.
    pub const fn fail(mismatch: MismatchKind) -> Self {
        Self {
            passed: false,
            mismatch,
        }
    }
}

/// Compares an observed output against a vector's expectations.
///
/// The result is checked first, then each flag selected by the vector's mask
/// in carry, overflow, zero, negative order; the first difference decides.
pub fn evaluate(vector: &TestVector, actual_result: u8, actual_flags: FlagSet) -> EvaluationOutcome {
    evaluate_masked(vector, actual_result, actual_flags, vector.flag_mask)
}

fn evaluate_masked(
    vector: &TestVector,
    actual_result: u8,
    actual_flags: FlagSet,
    mask: FlagMask,
) -> EvaluationOutcome {
    if actual_result != vector.expected_result {
        return EvaluationOutcome::fail(MismatchKind::ResultMismatch {
            expected: vector.expected_result,
            actual: actual_result,
        });
    }
    match vector.expected_flags.first_difference(&actual_flags, mask) {
        Some(flag) => EvaluationOutcome::fail(MismatchKind::FlagMismatch {
            flag,
            expected: vector.expected_flags.get(flag),
        }),
        None => EvaluationOutcome::PASS,
    }
}

/// An implementation of the ALU that can be scored.
///
/// Calls are sequential on one instance (`&mut self`); a unit that is cheap
/// to duplicate can be cloned once per worker for parallel runs.
pub trait UnitUnderTest {
    /// Name used in logs and reports.
    fn name(&self) -> &str;

    /// Applies `opcode` to `a` and `b`.
    ///
    /// # Errors
    ///
    /// Any [`AluError`]. [`AluError::Hardware`] aborts the run; every other
    /// error is counted against the case.
    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation>;
}

impl UnitUnderTest for Alu {
    fn name(&self) -> &str {
        "golden"
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        Self::evaluate(opcode, a, b).map(Observation::from)
    }
}

impl<U: UnitUnderTest + ?Sized> UnitUnderTest for &mut U {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        (**self).execute(opcode, a, b)
    }
}

impl<U: UnitUnderTest + ?Sized> UnitUnderTest for Box<U> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&mut self, opcode: u8, a: u8, b: u8) -> Result<Observation> {
        (**self).execute(opcode, a, b)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unit under test panicked".to_string())
}

/// Runs one case against `unit` and scores it.
///
/// If the unit reports no flags, only the result is compared.
///
/// # Errors
///
/// [`AluError::Hardware`] if the unit's device failed. Every other problem
/// becomes a failed outcome.
pub fn check<U: UnitUnderTest + ?Sized>(
    unit: &mut U,
    vector: &TestVector,
) -> Result<EvaluationOutcome> {
    if vector.operation.is_none() {
        return Ok(EvaluationOutcome::fail(MismatchKind::UnknownOpcode(vector.opcode)));
    }

    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        unit.execute(vector.opcode, vector.a, vector.b)
    }));

    let observed = match attempt {
        Ok(Ok(observed)) => observed,
        Ok(Err(AluError::Hardware(e))) => return Err(AluError::Hardware(e)),
        Ok(Err(e)) => {
            return Ok(EvaluationOutcome::fail(MismatchKind::EvaluationError(
                e.to_string(),
            )));
        }
        Err(payload) => {
            return Ok(EvaluationOutcome::fail(MismatchKind::EvaluationError(
                panic_message(payload.as_ref()),
            )));
        }
    };

    Ok(match observed.flags {
        Some(flags) => evaluate(vector, observed.result, flags),
        None => evaluate_masked(vector, observed.result, FlagSet::default(), FlagMask::NONE),
    })
}
