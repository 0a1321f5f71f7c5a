//! ALU arithmetic operations.
//!
//! Implements ADD, SUB, INC_A, DEC_A and CMP. Every operation is computed at
//! 16-bit width so that carry and borrow are visible before the result is
//! truncated to 8 bits.
//!
//! Signed overflow has two textbook formulations, a sign-comparison form and
//! an XOR form. Both are provided; the golden model uses the sign-comparison
//! form, and the test suite proves the two agree over the whole input space.

use super::AluOutput;
use crate::common::FlagSet;
use crate::common::constants::{DATA_MASK, SIGN_BIT, SIGNED_MAX, SIGNED_MIN};

/// `(A + B) mod 256`; carry is the unsigned carry out of bit 7.
pub fn add(a: u8, b: u8) -> AluOutput {
    let total = u16::from(a) + u16::from(b);
    let result = (total & DATA_MASK) as u8;
    AluOutput::new(result, total > DATA_MASK, add_overflow_sign(a, b, result))
}

/// `(A - B) mod 256`; carry is set when no borrow occurred (`A >= B`).
pub fn sub(a: u8, b: u8) -> AluOutput {
    let diff = i16::from(a) - i16::from(b);
    let result = diff as u8;
    AluOutput::new(result, diff >= 0, sub_overflow_sign(a, b, result))
}

/// `(A + 1) mod 256`; overflows only from `0x7F`.
pub fn inc_a(a: u8) -> AluOutput {
    let total = u16::from(a) + 1;
    let result = (total & DATA_MASK) as u8;
    AluOutput::new(result, total > DATA_MASK, a == SIGNED_MAX)
}

/// `(A - 1) mod 256`; overflows only from `0x80`.
pub fn dec_a(a: u8) -> AluOutput {
    let diff = i16::from(a) - 1;
    let result = diff as u8;
    AluOutput::new(result, diff >= 0, a == SIGNED_MIN)
}

/// Compare: flags of `A - B`, result always zero.
///
/// Zero and negative describe the 8-bit difference, not the returned zero,
/// so this cannot go through [`AluOutput::new`].
pub fn cmp(a: u8, b: u8) -> AluOutput {
    let diff = i16::from(a) - i16::from(b);
    let diff_masked = (diff as u16 & DATA_MASK) as u8;
    // Sign of the widened difference; two's complement keeps bit 7 intact.
    let diff_negative = diff as u16 & u16::from(SIGN_BIT) != 0;
    let a_negative = a & SIGN_BIT != 0;
    let carry = diff >= 0;
    let overflow = a_negative != (b & SIGN_BIT != 0) && a_negative != diff_negative;
    AluOutput {
        result: 0,
        flags: FlagSet::from_value(diff_masked, carry, overflow),
    }
}

/// Addition overflow, sign-comparison form: the operands share a sign and the
/// result's sign differs from it.
#[inline]
pub const fn add_overflow_sign(a: u8, b: u8, result: u8) -> bool {
    (a & SIGN_BIT) == (b & SIGN_BIT) && (a & SIGN_BIT) != (result & SIGN_BIT)
}

/// Addition overflow, XOR form: the result's sign differs from both operands.
#[inline]
pub const fn add_overflow_xor(a: u8, b: u8, result: u8) -> bool {
    (a ^ result) & (b ^ result) & SIGN_BIT != 0
}

/// Subtraction overflow, sign-comparison form: the operands differ in sign and
/// the result's sign differs from A's.
#[inline]
pub const fn sub_overflow_sign(a: u8, b: u8, result: u8) -> bool {
    (a & SIGN_BIT) != (b & SIGN_BIT) && (a & SIGN_BIT) != (result & SIGN_BIT)
}

/// Subtraction overflow, XOR form.
#[inline]
pub const fn sub_overflow_xor(a: u8, b: u8, result: u8) -> bool {
    (a ^ b) & (a ^ result) & SIGN_BIT != 0
}
