//! # Shifts and Bit Reversal

use alu8_core::alu::{AluOutput, shifts};

#[test]
fn test_lsl_carries_bit_seven() {
    assert_eq!(shifts::lsl(0x81), AluOutput::new(0x02, true, false));
    assert_eq!(shifts::lsl(0x40), AluOutput::new(0x80, false, false));
}

#[test]
fn test_lsr_carries_bit_zero() {
    assert_eq!(shifts::lsr(0x81), AluOutput::new(0x40, true, false));
    assert_eq!(shifts::lsr(0x01), AluOutput::new(0x00, true, false));
}

#[test]
fn test_asr_replicates_sign() {
    assert_eq!(shifts::asr(0x80).result, 0xC0);
    assert_eq!(shifts::asr(0xFF), AluOutput::new(0xFF, true, false));
    assert_eq!(shifts::asr(0x7E).result, 0x3F);
}

#[test]
fn test_rev_a() {
    assert_eq!(shifts::rev_a(0b0000_0001).result, 0b1000_0000);
    assert_eq!(shifts::rev_a(0b1101_0010).result, 0b0100_1011);
    assert!(!shifts::rev_a(0xFF).flags.carry);
}
