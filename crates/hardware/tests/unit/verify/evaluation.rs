//! # Evaluation
//!
//! The result is compared before any flag; flags are compared in carry,
//! overflow, zero, negative order and only where the vector's mask selects
//! them. Per-case failures of the unit become failed outcomes.

use alu8_core::Alu;
use alu8_core::common::{AluError, Flag, FlagSet};
use alu8_core::isa::OperationKind;
use alu8_core::verify::{self, EvaluationOutcome, MismatchKind, Observation};
use alu8_core::vectors::TestVector;
use rstest::rstest;

use crate::common::harness::{FailsOn, PanicsOn, Unplugged, init_tracing};

fn add_7f_01() -> TestVector {
    // expected 0x80 with V and N set
    TestVector::from_golden(OperationKind::Add, 0x7F, 0x01)
}

#[test]
fn test_exact_match_passes() {
    let vector = add_7f_01();
    let outcome = verify::evaluate(&vector, 0x80, vector.expected_flags);
    assert_eq!(outcome, EvaluationOutcome::PASS);
    assert_eq!(outcome.mismatch.category(), "PASS");
}

#[test]
fn test_result_is_reported_before_flags() {
    let vector = add_7f_01();
    let outcome = verify::evaluate(&vector, 0x7F, FlagSet::default());
    assert!(!outcome.passed);
    assert_eq!(
        outcome.mismatch,
        MismatchKind::ResultMismatch {
            expected: 0x80,
            actual: 0x7F
        }
    );
}

#[rstest]
#[case::carry(Flag::Carry)]
#[case::overflow(Flag::Overflow)]
#[case::zero(Flag::Zero)]
#[case::negative(Flag::Negative)]
fn test_single_flag_difference(#[case] flag: Flag) {
    let vector = add_7f_01();
    let mut flags = vector.expected_flags;
    flags.set(flag, !flags.get(flag));
    let outcome = verify::evaluate(&vector, 0x80, flags);
    assert_eq!(
        outcome.mismatch,
        MismatchKind::FlagMismatch {
            flag,
            expected: vector.expected_flags.get(flag)
        }
    );
    assert_eq!(outcome.mismatch.category(), "FLAG");
}

#[test]
fn test_first_flag_in_order_wins() {
    let vector = add_7f_01();
    let inverted = FlagSet {
        carry: !vector.expected_flags.carry,
        overflow: !vector.expected_flags.overflow,
        zero: !vector.expected_flags.zero,
        negative: !vector.expected_flags.negative,
    };
    let outcome = verify::evaluate(&vector, 0x80, inverted);
    assert!(matches!(
        outcome.mismatch,
        MismatchKind::FlagMismatch {
            flag: Flag::Carry,
            ..
        }
    ));
}

#[test]
fn test_result_only_vector_ignores_flags() {
    let vector = add_7f_01().result_only();
    let outcome = verify::evaluate(&vector, 0x80, FlagSet::default());
    assert!(outcome.passed);
}

#[test]
fn test_check_golden_against_itself() {
    let mut golden = Alu;
    for op in OperationKind::ALL {
        let vector = TestVector::from_golden(op, 0xA5, 0x3C);
        assert!(verify::check(&mut golden, &vector).unwrap().passed, "{op}");
    }
}

#[test]
fn test_unknown_opcode_fails_without_calling_unit() {
    let mut vector = TestVector::from_golden(OperationKind::Add, 1, 1);
    vector.opcode = 0b11010;
    vector.operation = None;
    // an unplugged unit would error if it were called
    let mut unit = Unplugged { remaining: 0 };
    let outcome = verify::check(&mut unit, &vector).unwrap();
    assert_eq!(outcome.mismatch, MismatchKind::UnknownOpcode(0b11010));
    assert_eq!(outcome.mismatch.category(), "UNKNOWN_OPCODE");
    assert_eq!(outcome.mismatch.to_string(), "unknown opcode 11010");
}

#[test]
fn test_unit_error_becomes_failure() {
    let mut unit = FailsOn(OperationKind::Lsl);
    let vector = TestVector::from_golden(OperationKind::Lsl, 0x81, 0);
    let outcome = verify::check(&mut unit, &vector).unwrap();
    assert!(!outcome.passed);
    assert!(matches!(outcome.mismatch, MismatchKind::EvaluationError(_)));

    let other = TestVector::from_golden(OperationKind::Lsr, 0x81, 0);
    assert!(verify::check(&mut unit, &other).unwrap().passed);
}

#[test]
fn test_unit_panic_becomes_failure() {
    init_tracing();
    let mut unit = PanicsOn(OperationKind::Asr);
    let vector = TestVector::from_golden(OperationKind::Asr, 0x80, 0);
    let outcome = verify::check(&mut unit, &vector).unwrap();
    match outcome.mismatch {
        MismatchKind::EvaluationError(message) => assert!(message.contains("ASR")),
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

#[test]
fn test_hardware_error_propagates() {
    let mut unit = Unplugged { remaining: 0 };
    let vector = TestVector::from_golden(OperationKind::Add, 1, 1);
    assert!(matches!(
        verify::check(&mut unit, &vector),
        Err(AluError::Hardware(_))
    ));
}

#[test]
fn test_result_only_observation() {
    struct ResultOnly;
    impl verify::UnitUnderTest for ResultOnly {
        fn name(&self) -> &str {
            "result-only"
        }
        fn execute(&mut self, opcode: u8, a: u8, b: u8) -> alu8_core::Result<Observation> {
            Ok(Observation::result_only(Alu::evaluate(opcode, a, b)?.result))
        }
    }

    let vector = TestVector::from_golden(OperationKind::Cmp, 3, 5);
    assert!(verify::check(&mut ResultOnly, &vector).unwrap().passed);
}

#[test]
fn test_mismatch_messages() {
    let result = MismatchKind::ResultMismatch {
        expected: 0x02,
        actual: 0xFF,
    };
    assert_eq!(result.to_string(), "result mismatch: expected 0x02, got 0xFF");
    assert_eq!(result.category(), "RESULT");
    assert_eq!(
        MismatchKind::EvaluationError("boom".into()).category(),
        "ERROR"
    );
}
