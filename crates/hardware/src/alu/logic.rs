//! ALU bitwise operations.
//!
//! Implements NAND, NOR, XOR, AND, OR, XNOR, the two pass-throughs and the
//! two complements. None of these produce carry or overflow; zero and
//! negative are taken from the 8-bit result.

use super::AluOutput;

/// `!(A & B)`.
pub fn nand(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(!(a & b))
}

/// `!(A | B)`.
pub fn nor(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(!(a | b))
}

/// `A ^ B`.
pub fn xor(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(a ^ b)
}

/// `A & B`.
pub fn and(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(a & b)
}

/// `A | B`.
pub fn or(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(a | b)
}

/// `!(A ^ B)`.
pub fn xnor(a: u8, b: u8) -> AluOutput {
    AluOutput::logical(!(a ^ b))
}

/// A unchanged.
pub fn pass_a(a: u8) -> AluOutput {
    AluOutput::logical(a)
}

/// B unchanged.
pub fn pass_b(b: u8) -> AluOutput {
    AluOutput::logical(b)
}

/// Bitwise complement of A.
pub fn not_a(a: u8) -> AluOutput {
    AluOutput::logical(!a)
}

/// Bitwise complement of B.
pub fn not_b(b: u8) -> AluOutput {
    AluOutput::logical(!b)
}
