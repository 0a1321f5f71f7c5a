//! ALU shift and permutation operations.
//!
//! Implements single-bit shifts of operand A (LSL, LSR, ASR) and the 8-bit
//! bit reversal (REV_A). Shifts move the bit shifted out into carry; none of
//! them report overflow.

use super::AluOutput;
use crate::common::constants::SIGN_BIT;

/// Shift left by one; bit 7 goes to carry, bit 0 is filled with zero.
pub fn lsl(a: u8) -> AluOutput {
    AluOutput::new(a << 1, a & SIGN_BIT != 0, false)
}

/// Logical shift right by one; bit 0 goes to carry, bit 7 is filled with zero.
pub fn lsr(a: u8) -> AluOutput {
    AluOutput::new(a >> 1, a & 0x01 != 0, false)
}

/// Arithmetic shift right by one; bit 0 goes to carry, bit 7 is replicated.
pub fn asr(a: u8) -> AluOutput {
    AluOutput::new((a >> 1) | (a & SIGN_BIT), a & 0x01 != 0, false)
}

/// Bit reversal: bit `i` of A becomes bit `7 - i` of the result.
pub fn rev_a(a: u8) -> AluOutput {
    AluOutput::new(a.reverse_bits(), false, false)
}
