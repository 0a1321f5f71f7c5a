//! # Verification Runs
//!
//! Whole-sweep runs against the golden model and against units with a
//! single known defect, sequential and parallel.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use alu8_core::Alu;
use alu8_core::common::constants::UNRESOLVED_OPCODE;
use alu8_core::common::{AluError, Flag};
use alu8_core::isa::OperationKind;
use alu8_core::runner::{self, Progress, RunOptions};
use alu8_core::vectors::record;
use alu8_core::vectors::{NamedVector, Sweep, TestVector};
use alu8_core::verify::MismatchKind;

use crate::common::harness::{
    FailsOn, PanicsOn, ResultFlagsCmp, SaturatingAdd, Unplugged, init_tracing,
};

fn quiet() -> RunOptions<'static> {
    RunOptions {
        progress_permille: 1000,
        ..RunOptions::default()
    }
}

#[test]
fn test_golden_model_passes_exhaustive_sweep() {
    init_tracing();
    let sweep = Sweep::exhaustive();
    let stats = runner::run_parallel(&Alu, &sweep, 4, &quiet(), |_| {}).unwrap();
    assert_eq!(stats.total(), 1_245_184);
    assert_eq!(stats.failed(), 0);
    assert_eq!(stats.opcodes().count(), 19);
    assert!(stats.opcodes().all(|s| s.passed == 65_536));
    assert!(!stats.interrupted);
    assert_eq!(stats.exit_code(), 0);
}

#[test]
fn test_saturating_add_fails_only_on_add() {
    init_tracing();
    let sweep = Sweep::exhaustive().with_operations(&[
        OperationKind::Add,
        OperationKind::Sub,
        OperationKind::IncA,
    ]);
    let stats = runner::run_sweep(&mut SaturatingAdd, &sweep, &quiet(), |_| {}).unwrap();

    // every pair whose sum exceeds 0xFF: 0 + 1 + ... + 255
    assert_eq!(stats.opcode(0).unwrap().failed, 32_640);
    assert_eq!(stats.opcode(1).unwrap().failed, 0);
    assert_eq!(stats.opcode(2).unwrap().failed, 0);
    assert!(stats.failures().iter().all(|f| matches!(
        f.mismatch,
        MismatchKind::ResultMismatch { actual: 0xFF, .. }
    )));
    assert_eq!(stats.exit_code(), 1);
}

#[test]
fn test_result_derived_cmp_flags_are_caught() {
    init_tracing();
    let sweep = Sweep::exhaustive().with_operations(&[OperationKind::Cmp, OperationKind::Sub]);
    let stats = runner::run_sweep(&mut ResultFlagsCmp, &sweep, &quiet(), |_| {}).unwrap();

    // only A == B leaves zero set and negative clear
    assert_eq!(stats.opcode(16).unwrap().failed, 65_536 - 256);
    assert_eq!(stats.opcode(1).unwrap().failed, 0);
    assert!(stats.failures().iter().all(|f| matches!(
        f.mismatch,
        MismatchKind::FlagMismatch {
            flag: Flag::Zero,
            ..
        }
    )));
}

#[test]
fn test_panicking_and_failing_units_are_contained() {
    init_tracing();
    let sweep = Sweep::exhaustive()
        .with_operations(&[OperationKind::Add, OperationKind::Asr, OperationKind::Lsl])
        .with_stride(64);

    let panics = runner::run_sweep(&mut PanicsOn(OperationKind::Asr), &sweep, &quiet(), |_| {})
        .unwrap();
    assert_eq!(panics.total(), sweep.len());
    assert_eq!(panics.opcode(6).unwrap().failed, 16);
    assert_eq!(panics.failed(), 16);

    let fails = runner::run_sweep(&mut FailsOn(OperationKind::Lsl), &sweep, &quiet(), |_| {})
        .unwrap();
    assert_eq!(fails.opcode(4).unwrap().failed, 16);
    assert!(fails.failures().iter().all(|f| matches!(
        f.mismatch,
        MismatchKind::EvaluationError(_)
    )));
}

#[test]
fn test_hardware_loss_aborts_the_run() {
    init_tracing();
    let sweep = Sweep::exhaustive().with_stride(32);
    let result = runner::run_sweep(&mut Unplugged { remaining: 10 }, &sweep, &quiet(), |_| {});
    assert!(matches!(result, Err(AluError::Hardware(_))));
}

#[test]
fn test_stop_flag_before_start() {
    let stop = AtomicBool::new(true);
    let sweep = Sweep::exhaustive().with_stride(16);
    let options = quiet().with_stop(&stop);
    let stats = runner::run_sweep(&mut Alu, &sweep, &options, |_| {}).unwrap();
    assert_eq!(stats.total(), 0);
    assert!(stats.interrupted);
    assert_eq!(stats.declared_total, sweep.len());
    assert_eq!(stats.exit_code(), 0);
}

#[test]
fn test_stop_flag_mid_run_keeps_partial_tally() {
    let stop = AtomicBool::new(false);
    let sweep = Sweep::exhaustive().with_stride(16);
    let options = RunOptions {
        progress_permille: 100,
        ..RunOptions::default()
    }
    .with_stop(&stop);
    let interval = sweep.len() / 10;

    let stats = runner::run_sweep(&mut Alu, &sweep, &options, |_| {
        stop.store(true, Ordering::Relaxed);
    })
    .unwrap();
    assert!(stats.interrupted);
    assert_eq!(stats.total(), interval);
    assert!(stats.render().contains("declared cases run"));
}

#[test]
fn test_progress_cadence() {
    let sweep = Sweep::exhaustive().with_operations(&[OperationKind::Xor]);
    let seen = Mutex::new(Vec::new());
    let options = RunOptions {
        progress_permille: 250,
        ..RunOptions::default()
    };
    let _ = runner::run_sweep(&mut Alu, &sweep, &options, |p: &Progress| {
        seen.lock().unwrap().push(p.done);
    })
    .unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![16_384, 32_768, 49_152, 65_536]);
}

#[test]
fn test_parallel_matches_sequential() {
    init_tracing();
    let sweep = Sweep::exhaustive().with_stride(8);
    let sequential = runner::run_sweep(&mut SaturatingAdd, &sweep, &quiet(), |_| {}).unwrap();
    let parallel = runner::run_parallel(&SaturatingAdd, &sweep, 3, &quiet(), |_| {}).unwrap();

    assert_eq!(parallel.total(), sequential.total());
    assert_eq!(parallel.declared_total, sweep.len());
    let rows = |s: &alu8_core::RunStats| {
        s.opcodes()
            .map(|o| (o.opcode, o.passed, o.failed))
            .collect::<Vec<_>>()
    };
    assert_eq!(rows(&parallel), rows(&sequential));
    assert!(parallel.failures().len() <= 16);
}

#[test]
fn test_parallel_reports_hardware_loss() {
    init_tracing();
    let sweep = Sweep::exhaustive().with_stride(64);
    let result = runner::run_parallel(&Unplugged { remaining: 3 }, &sweep, 2, &quiet(), |_| {});
    assert!(matches!(result, Err(AluError::Hardware(_))));
}

#[test]
fn test_unparseable_opcodes_fail_without_dropping_the_file() {
    let json = r#"[
        { "opcode": "00000", "A": 1, "B": 1, "expected_result": 2,
          "expected_flags": { "carry": false, "overflow": false, "zero": false, "negative": false } },
        { "opcode": "100000", "A": 1, "B": 1, "expected_result": 2 },
        { "opcode": "ADD", "A": 1, "B": 1, "expected_result": 2 }
    ]"#;
    let vectors = record::parse_str("mixed", json).unwrap();
    let stats = runner::run_vectors(&mut Alu, &vectors, &quiet(), |_| {}).unwrap();

    assert_eq!(stats.passed(), 1);
    assert_eq!(stats.failed(), 2);
    let unknown = stats.opcode(UNRESOLVED_OPCODE).unwrap();
    assert_eq!(unknown.name, "UNKNOWN");
    assert_eq!(unknown.failed, 2);
    assert_eq!(stats.failures().len(), 2);
    assert!(
        stats
            .failures()
            .iter()
            .all(|f| f.mismatch == MismatchKind::UnknownOpcode(UNRESOLVED_OPCODE))
    );
    assert!(stats.render().contains("?????"));
}

#[test]
fn test_loaded_vectors_run_by_name() {
    let mut unknown = TestVector::from_golden(OperationKind::Add, 0, 0);
    unknown.opcode = 0b11100;
    unknown.operation = None;
    let vectors = vec![
        NamedVector {
            test_name: "ADD_01_01".into(),
            opcode_text: None,
            vector: TestVector::from_golden(OperationKind::Add, 1, 1),
        },
        NamedVector {
            test_name: "UNKNOWN_00_00".into(),
            opcode_text: None,
            vector: unknown,
        },
    ];
    let stats = runner::run_vectors(&mut Alu, &vectors, &quiet(), |_| {}).unwrap();
    assert_eq!(stats.passed(), 1);
    assert_eq!(stats.failed(), 1);
    assert_eq!(stats.opcode(0b11100).unwrap().name, "UNKNOWN");
    assert_eq!(
        stats.failures()[0].mismatch,
        MismatchKind::UnknownOpcode(0b11100)
    );
}
