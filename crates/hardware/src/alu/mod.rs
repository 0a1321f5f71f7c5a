//! Golden model of the 8-bit ALU.
//!
//! This module is the reference computation every unit under test is scored
//! against. It is pure: no I/O, no shared state, and safe to call from any
//! number of threads at once.
//!
//! Operations are organized into submodules by category:
//! - [`arithmetic`]: ADD, SUB, INC_A, DEC_A, CMP
//! - [`logic`]:      NAND, NOR, XOR, AND, OR, XNOR, PASS_A, PASS_B, NOT_A, NOT_B
//! - [`shifts`]:     LSL, LSR, ASR, REV_A

/// Arithmetic operations and the two overflow formulations.
pub mod arithmetic;

/// Bitwise logical operations.
pub mod logic;

/// Shift and bit-reversal operations.
pub mod shifts;

use crate::common::{AluError, FlagSet, Result};
use crate::isa::{OperationKind, parse_opcode};

/// Result and status flags of one ALU evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AluOutput {
    /// 8-bit result.
    pub result: u8,
    /// Status flags.
    pub flags: FlagSet,
}

impl AluOutput {
    /// Output whose zero/negative flags are derived from the 8-bit `result`.
    #[inline]
    pub const fn new(result: u8, carry: bool, overflow: bool) -> Self {
        Self {
            result,
            flags: FlagSet::from_value(result, carry, overflow),
        }
    }

    /// Output of a bitwise operation: carry and overflow are clear.
    #[inline]
    pub const fn logical(result: u8) -> Self {
        Self::new(result, false, false)
    }
}

/// The golden model.
///
/// # Examples
///
/// ```
/// use alu8_core::alu::Alu;
/// use alu8_core::isa::OperationKind;
///
/// // Signed overflow at the positive boundary
/// let out = Alu::execute(OperationKind::Add, 0x7F, 0x01);
/// assert_eq!(out.result, 0x80);
/// assert!(out.flags.overflow && out.flags.negative && !out.flags.carry);
///
/// // CMP returns zero; its flags describe A - B
/// let out = Alu::evaluate(0b10000, 5, 5).unwrap();
/// assert_eq!(out.result, 0);
/// assert!(out.flags.zero && out.flags.carry);
///
/// // Unassigned opcodes are rejected
/// assert!(Alu::evaluate(0b11111, 0, 0).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct Alu;

impl Alu {
    /// Evaluates `op` on operands `a` and `b`.
    ///
    /// Unary operations ignore the operand they do not read.
    ///
    /// # Arguments
    ///
    /// * `op` - The operation to perform
    /// * `a`  - Operand A, the only input of the unary A operations
    /// * `b`  - Operand B, the only input of `PASS_B` and `NOT_B`
    ///
    /// # Returns
    ///
    /// The 8-bit result with its flags. Zero and negative describe the
    /// result, except for `CMP`, whose result is zero and whose flags all
    /// describe `A - B`.
    pub fn execute(op: OperationKind, a: u8, b: u8) -> AluOutput {
        match op {
            OperationKind::Add => arithmetic::add(a, b),
            OperationKind::Sub => arithmetic::sub(a, b),
            OperationKind::IncA => arithmetic::inc_a(a),
            OperationKind::DecA => arithmetic::dec_a(a),
            OperationKind::Lsl => shifts::lsl(a),
            OperationKind::Lsr => shifts::lsr(a),
            OperationKind::Asr => shifts::asr(a),
            OperationKind::RevA => shifts::rev_a(a),
            OperationKind::Nand => logic::nand(a, b),
            OperationKind::Nor => logic::nor(a, b),
            OperationKind::Xor => logic::xor(a, b),
            OperationKind::PassA => logic::pass_a(a),
            OperationKind::PassB => logic::pass_b(b),
            OperationKind::And => logic::and(a, b),
            OperationKind::Or => logic::or(a, b),
            OperationKind::Xnor => logic::xnor(a, b),
            OperationKind::Cmp => arithmetic::cmp(a, b),
            OperationKind::NotA => logic::not_a(a),
            OperationKind::NotB => logic::not_b(b),
        }
    }

    /// Evaluates the operation selected by a numeric opcode.
    ///
    /// # Arguments
    ///
    /// * `opcode` - 5-bit function-select code
    /// * `a`      - Operand A
    /// * `b`      - Operand B
    ///
    /// # Returns
    ///
    /// The same output as [`Self::execute`] for the registered operation.
    ///
    /// # Errors
    ///
    /// [`AluError::InvalidOpcode`] for any code outside the registry.
    pub fn evaluate(opcode: u8, a: u8, b: u8) -> Result<AluOutput> {
        let op = OperationKind::from_opcode(opcode).ok_or(AluError::InvalidOpcode(opcode))?;
        Ok(Self::execute(op, a, b))
    }

    /// Evaluates the operation selected by an opcode bit string (`"00000"`)
    /// or decimal string (`"0"`).
    ///
    /// # Errors
    ///
    /// [`AluError::InvalidOpcodeString`] if the text does not parse,
    /// [`AluError::InvalidOpcode`] if it names no registered operation.
    pub fn evaluate_bits(opcode: &str, a: u8, b: u8) -> Result<AluOutput> {
        Self::evaluate(parse_opcode(opcode)?, a, b)
    }

    /// Validates a caller-supplied operand; the model is only defined on `0..=255`.
    ///
    /// # Errors
    ///
    /// [`AluError::InvalidOperand`] if `value` is out of range.
    pub fn operand(value: i64) -> Result<u8> {
        u8::try_from(value).map_err(|_| AluError::InvalidOperand(value))
    }
}
