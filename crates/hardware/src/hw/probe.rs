//! Client usage patterns over a unit under test.
//!
//! Three ways of exercising a device, all built on [`UnitUnderTest`] and
//! therefore on the same drive/settle/sample cycle when the unit is a
//! [`super::HardwareAdapter`]:
//! 1. **Smoke test:** [`smoke_test`], five fixed cases with known answers.
//! 2. **Manual probe:** [`probe_once`], one cycle with caller-chosen inputs.
//! 3. **Stress:** [`stress`], random ADD operands until stopped.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::common::Result;
use crate::common::constants::STRESS_REPORT_INTERVAL;
use crate::isa::OperationKind;
use crate::isa::opcodes::OP_ADD;
use crate::verify::{self, EvaluationOutcome, UnitUnderTest};
use crate::vectors::TestVector;

/// The smoke-test cases: name, operation, A, B.
pub const SMOKE_CASES: [(&str, OperationKind, u8, u8); 5] = [
    ("ADD_ZERO", OperationKind::Add, 0x00, 0x00),
    ("ADD_ONE", OperationKind::Add, 0x01, 0x01),
    ("ADD_MAX", OperationKind::Add, 0xFF, 0x00),
    ("AND_MASK", OperationKind::And, 0xFF, 0x0F),
    ("XOR_INV", OperationKind::Xor, 0xAA, 0x55),
];

/// Outcome of one smoke-test case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmokeCase {
    /// Case name.
    pub name: &'static str,
    /// The vector that was run (result-only).
    pub vector: TestVector,
    /// Verdict.
    pub outcome: EvaluationOutcome,
}

/// Outcome of a smoke test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SmokeReport {
    /// Per-case results, in [`SMOKE_CASES`] order.
    pub cases: Vec<SmokeCase>,
}

impl SmokeReport {
    /// Cases that passed.
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.outcome.passed).count()
    }

    /// `true` iff every case passed.
    pub fn all_passed(&self) -> bool {
        self.passed() == self.cases.len()
    }
}

/// Runs the five smoke cases, comparing results only.
///
/// # Errors
///
/// [`crate::common::AluError::Hardware`] if the device fails.
pub fn smoke_test<U: UnitUnderTest + ?Sized>(unit: &mut U) -> Result<SmokeReport> {
    let mut report = SmokeReport::default();
    for (name, op, a, b) in SMOKE_CASES {
        let vector = TestVector::from_golden(op, a, b).result_only();
        let outcome = verify::check(unit, &vector)?;
        tracing::info!(case = name, passed = outcome.passed, "smoke case");
        report.cases.push(SmokeCase {
            name,
            vector,
            outcome,
        });
    }
    Ok(report)
}

/// One manual reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeReading {
    /// Opcode driven.
    pub opcode: u8,
    /// Operand A driven.
    pub a: u8,
    /// Operand B driven.
    pub b: u8,
    /// Result read back.
    pub actual: u8,
    /// Golden-model result, if the opcode is registered.
    pub expected: Option<u8>,
}

impl ProbeReading {
    /// `Some(true)` if the reading matches the golden model, `None` for an unregistered opcode.
    pub fn matches(&self) -> Option<bool> {
        self.expected.map(|e| e == self.actual)
    }
}

/// Runs a single cycle with the given inputs.
///
/// # Errors
///
/// Any error of the unit (an unregistered opcode is still driven).
pub fn probe_once<U: UnitUnderTest + ?Sized>(
    unit: &mut U,
    opcode: u8,
    a: u8,
    b: u8,
) -> Result<ProbeReading> {
    let observed = unit.execute(opcode, a, b)?;
    let expected = OperationKind::from_opcode(opcode)
        .map(|op| TestVector::from_golden(op, a, b).expected_result);
    Ok(ProbeReading {
        opcode,
        a,
        b,
        actual: observed.result,
        expected,
    })
}

/// One failing stress cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StressFailure {
    /// Operand A.
    pub a: u8,
    /// Operand B.
    pub b: u8,
    /// Result read back.
    pub actual: u8,
    /// `(A + B) mod 256`.
    pub expected: u8,
}

/// Running tally of a stress run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StressReport {
    /// Cycles completed.
    pub cycles: u64,
    /// Cycles whose result was wrong.
    pub errors: u64,
    /// The first failures, up to the run's sample limit.
    pub failures: Vec<StressFailure>,
    /// The run ended on the stop flag rather than the cycle limit.
    pub interrupted: bool,
}

/// Bounds of a stress run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StressLimits {
    /// Stop after this many cycles; `None` runs until the stop flag is set.
    pub max_cycles: Option<u64>,
    /// Failures kept in the report.
    pub failure_samples: usize,
}

impl Default for StressLimits {
    fn default() -> Self {
        Self {
            max_cycles: None,
            failure_samples: crate::config::DEFAULT_FAILURE_SAMPLES,
        }
    }
}

/// Drives random ADD operands and checks `(A + B) mod 256`.
///
/// `progress` is called every 1000 cycles. The run ends after
/// `limits.max_cycles` or, checked after each cycle, when `stop` is set.
///
/// # Errors
///
/// [`crate::common::AluError::Hardware`] if the device fails; the partial
/// tally is lost in that case.
pub fn stress<U, R, F>(
    unit: &mut U,
    rng: &mut R,
    limits: StressLimits,
    stop: &AtomicBool,
    mut progress: F,
) -> Result<StressReport>
where
    U: UnitUnderTest + ?Sized,
    R: Rng,
    F: FnMut(&StressReport),
{
    let mut report = StressReport::default();
    while limits.max_cycles.is_none_or(|max| report.cycles < max) {
        if stop.load(Ordering::Relaxed) {
            report.interrupted = true;
            break;
        }
        let a: u8 = rng.random();
        let b: u8 = rng.random();
        let expected = a.wrapping_add(b);
        let actual = unit.execute(OP_ADD, a, b)?.result;
        report.cycles += 1;

        if actual != expected {
            report.errors += 1;
            tracing::warn!(a, b, actual, expected, "stress cycle failed");
            if report.failures.len() < limits.failure_samples {
                report.failures.push(StressFailure {
                    a,
                    b,
                    actual,
                    expected,
                });
            }
        }
        if report.cycles % STRESS_REPORT_INTERVAL == 0 {
            tracing::info!(cycles = report.cycles, errors = report.errors, "stress progress");
            progress(&report);
        }
    }
    Ok(report)
}
