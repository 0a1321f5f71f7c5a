//! # Stimulus/Response Adapter
//!
//! Bit ordering on the lines, the settling requirement and error handling
//! of the drive/settle/sample cycle.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use alu8_core::common::{AluError, HardwareError};
use alu8_core::hw::{CyclePhase, HardwareAdapter, PinMap, SimulatedAlu};
use alu8_core::isa::OperationKind;
use alu8_core::isa::opcodes::{OP_ADD, OP_CMP, OP_XOR};
use alu8_core::verify::{self, UnitUnderTest};
use alu8_core::vectors::{Sweep, TestVector};

use crate::common::mocks::gpio::{MockGpio, reading};

fn simulated(propagation: Duration, settle: Duration) -> HardwareAdapter<SimulatedAlu> {
    let bus = SimulatedAlu::new(PinMap::default(), propagation);
    HardwareAdapter::new(bus, PinMap::default(), settle).unwrap()
}

#[test]
fn test_add_one_plus_one() {
    let mut adapter = simulated(Duration::from_micros(50), Duration::from_micros(200));
    assert_eq!(adapter.phase(), CyclePhase::Idle);
    assert_eq!(adapter.cycle(OP_ADD, 1, 1).unwrap(), 2);
    assert_eq!(adapter.phase(), CyclePhase::Idle);
    assert_eq!(adapter.cycles(), 1);
}

#[test]
fn test_settle_waits_out_the_delay() {
    let settle = Duration::from_millis(5);
    let mut adapter = simulated(Duration::ZERO, settle);
    let started = Instant::now();
    let value = adapter.drive(OP_XOR, 0xAA, 0x55).unwrap().settle().sample().unwrap();
    assert!(started.elapsed() >= settle);
    assert_eq!(value, 0xFF);
}

#[test]
fn test_short_settle_reads_stale_output() {
    let mut adapter = simulated(Duration::from_millis(500), Duration::ZERO);
    // the simulator powers up showing ADD 0 + 0
    assert_eq!(adapter.cycle(OP_ADD, 1, 1).unwrap(), 0);
}

#[test]
fn test_cmp_reads_zero_on_the_result_lines() {
    let mut adapter = simulated(Duration::ZERO, Duration::ZERO);
    assert_eq!(adapter.cycle(OP_CMP, 9, 3).unwrap(), 0);
}

#[test]
fn test_lines_are_driven_lsb_first() {
    let driven = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&driven);
    let mut gpio = MockGpio::new();
    gpio.expect_configure().times(1).returning(|_| Ok(()));
    gpio.expect_set_output().times(21).returning(move |pin, high| {
        log.lock().unwrap().push((pin, high));
        Ok(())
    });
    gpio.expect_read_input().times(8).returning(|_| Ok(false));

    let mut adapter = HardwareAdapter::new(gpio, PinMap::default(), Duration::ZERO).unwrap();
    let _ = adapter.cycle(0b00011, 0x01, 0x80).unwrap();

    let driven = driven.lock().unwrap();
    let high: Vec<u32> = driven.iter().filter(|(_, h)| *h).map(|(p, _)| *p).collect();
    // A bit 0 on line 0, B bit 7 on line 15, opcode bits 0 and 1 on lines 16 and 17
    assert_eq!(high, vec![0, 15, 16, 17]);
}

#[test]
fn test_result_lines_are_assembled_lsb_first() {
    let mut adapter =
        HardwareAdapter::new(reading(0b1010_0001), PinMap::default(), Duration::ZERO).unwrap();
    assert_eq!(adapter.cycle(OP_ADD, 0, 0).unwrap(), 0b1010_0001);
}

#[test]
fn test_oversized_opcode_is_rejected_before_driving() {
    let mut gpio = MockGpio::new();
    gpio.expect_configure().returning(|_| Ok(()));
    gpio.expect_set_output().never();
    gpio.expect_read_input().never();
    let mut adapter = HardwareAdapter::new(gpio, PinMap::default(), Duration::ZERO).unwrap();
    assert!(matches!(
        adapter.cycle(32, 0, 0),
        Err(AluError::InvalidOpcode(32))
    ));
    assert_eq!(adapter.phase(), CyclePhase::Idle);
}

#[test]
fn test_configure_failure_is_reported() {
    let mut gpio = MockGpio::new();
    gpio.expect_configure()
        .returning(|_| Err(HardwareError::Busy("gpio16".into())));
    assert!(matches!(
        HardwareAdapter::new(gpio, PinMap::default(), Duration::ZERO),
        Err(AluError::Hardware(HardwareError::Busy(_)))
    ));
}

#[test]
fn test_read_failure_aborts_the_run() {
    let mut gpio = MockGpio::new();
    gpio.expect_configure().returning(|_| Ok(()));
    gpio.expect_set_output().returning(|_, _| Ok(()));
    gpio.expect_read_input().returning(|pin| {
        Err(HardwareError::PinIo {
            pin,
            message: "read failed".into(),
        })
    });
    let mut adapter = HardwareAdapter::new(gpio, PinMap::default(), Duration::ZERO).unwrap();

    let vector = TestVector::from_golden(OperationKind::Add, 1, 1);
    assert!(matches!(
        verify::check(&mut adapter, &vector),
        Err(AluError::Hardware(HardwareError::PinIo { pin: 21, .. }))
    ));
    assert_eq!(adapter.phase(), CyclePhase::Idle);
    assert_eq!(adapter.cycles(), 0);
}

#[test]
fn test_simulated_unit_passes_a_sampled_sweep() {
    let mut adapter = simulated(Duration::ZERO, Duration::ZERO);
    assert_eq!(adapter.name(), "hardware");
    let sweep = Sweep::exhaustive().with_stride(64);
    for vector in &sweep {
        let outcome = verify::check(&mut adapter, &vector).unwrap();
        assert!(outcome.passed, "{}: {}", vector.label(), outcome.mismatch);
    }
    assert_eq!(adapter.cycles(), sweep.len());
}

#[test]
fn test_pin_map_validation() {
    let a: Vec<u32> = (0..8).collect();
    let b: Vec<u32> = (8..16).collect();
    let opcode: Vec<u32> = (16..21).collect();
    let result: Vec<u32> = (21..29).collect();
    assert_eq!(PinMap::new(&a, &b, &opcode, &result).unwrap(), PinMap::default());

    assert!(matches!(
        PinMap::new(&a[..7], &b, &opcode, &result),
        Err(AluError::Config(_))
    ));
    let mut clash = result.clone();
    clash[0] = 3;
    assert!(matches!(
        PinMap::new(&a, &b, &opcode, &clash),
        Err(AluError::Config(message)) if message.contains("line 3")
    ));
}

#[test]
fn test_custom_wiring() {
    let pins = PinMap::new(
        &[40, 41, 42, 43, 44, 45, 46, 47],
        &[30, 31, 32, 33, 34, 35, 36, 37],
        &[0, 1, 2, 3, 4],
        &[50, 51, 52, 53, 54, 55, 56, 57],
    )
    .unwrap();
    let bus = SimulatedAlu::new(pins, Duration::ZERO);
    let mut adapter = HardwareAdapter::new(bus, pins, Duration::ZERO).unwrap();
    assert_eq!(adapter.cycle(OP_ADD, 0x7F, 0x01).unwrap(), 0x80);
}
