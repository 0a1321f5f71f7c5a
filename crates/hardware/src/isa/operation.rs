//! Operation registry.
//!
//! The registry is a closed catalog: [`OperationKind`] enumerates the 19
//! operations and [`REGISTRY`] holds one [`Operation`] descriptor for each, in
//! opcode order. Dispatch on an opcode goes through
//! [`OperationKind::from_opcode`], whose exhaustive match is the single place
//! that maps the 5-bit code space onto operations; the 13 unassigned codes map
//! to `None`.

use std::fmt;

use super::opcodes::{
    OP_ADD, OP_AND, OP_ASR, OP_CMP, OP_DEC_A, OP_INC_A, OP_LSL, OP_LSR, OP_NAND, OP_NOR, OP_NOT_A,
    OP_NOT_B, OP_OR, OP_PASS_A, OP_PASS_B, OP_REV_A, OP_SUB, OP_XNOR, OP_XOR,
};
use crate::common::constants::{NUM_OPERATIONS, OPCODE_WIDTH};
use crate::common::{AluError, Result};

/// Identifier of an ALU operation.
///
/// Discriminants equal the operation's opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum OperationKind {
    /// `(A + B) mod 256`.
    Add = OP_ADD,
    /// `(A - B) mod 256`.
    Sub = OP_SUB,
    /// `(A + 1) mod 256`.
    IncA = OP_INC_A,
    /// `(A - 1) mod 256`.
    DecA = OP_DEC_A,
    /// `(A << 1) mod 256`.
    Lsl = OP_LSL,
    /// `A >> 1`, zero fill.
    Lsr = OP_LSR,
    /// `A >> 1`, sign fill.
    Asr = OP_ASR,
    /// Bit-reversal of A.
    RevA = OP_REV_A,
    /// `!(A & B)`.
    Nand = OP_NAND,
    /// `!(A | B)`.
    Nor = OP_NOR,
    /// `A ^ B`.
    Xor = OP_XOR,
    /// `A`.
    PassA = OP_PASS_A,
    /// `B`.
    PassB = OP_PASS_B,
    /// `A & B`.
    And = OP_AND,
    /// `A | B`.
    Or = OP_OR,
    /// `!(A ^ B)`.
    Xnor = OP_XNOR,
    /// Flags of `A - B`, result always zero.
    Cmp = OP_CMP,
    /// `!A`.
    NotA = OP_NOT_A,
    /// `!B`.
    NotB = OP_NOT_B,
}

impl OperationKind {
    /// Every operation, in opcode order.
    pub const ALL: [Self; NUM_OPERATIONS] = [
        Self::Add,
        Self::Sub,
        Self::IncA,
        Self::DecA,
        Self::Lsl,
        Self::Lsr,
        Self::Asr,
        Self::RevA,
        Self::Nand,
        Self::Nor,
        Self::Xor,
        Self::PassA,
        Self::PassB,
        Self::And,
        Self::Or,
        Self::Xnor,
        Self::Cmp,
        Self::NotA,
        Self::NotB,
    ];

    /// Maps an opcode onto its operation; `None` for unassigned codes.
    pub const fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            OP_ADD => Some(Self::Add),
            OP_SUB => Some(Self::Sub),
            OP_INC_A => Some(Self::IncA),
            OP_DEC_A => Some(Self::DecA),
            OP_LSL => Some(Self::Lsl),
            OP_LSR => Some(Self::Lsr),
            OP_ASR => Some(Self::Asr),
            OP_REV_A => Some(Self::RevA),
            OP_NAND => Some(Self::Nand),
            OP_NOR => Some(Self::Nor),
            OP_XOR => Some(Self::Xor),
            OP_PASS_A => Some(Self::PassA),
            OP_PASS_B => Some(Self::PassB),
            OP_AND => Some(Self::And),
            OP_OR => Some(Self::Or),
            OP_XNOR => Some(Self::Xnor),
            OP_CMP => Some(Self::Cmp),
            OP_NOT_A => Some(Self::NotA),
            OP_NOT_B => Some(Self::NotB),
            _ => None,
        }
    }

    /// Looks up an operation by mnemonic (`"ADD"`, `"inc_a"`, ...), ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    /// The operation's 5-bit opcode.
    #[inline]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// The operation's mnemonic.
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// The operation's registry entry.
    #[inline]
    pub fn descriptor(self) -> &'static Operation {
        &REGISTRY[self as usize]
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which operand inputs an operation reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operands {
    /// Only A.
    A,
    /// Only B.
    B,
    /// Both A and B.
    AB,
}

/// Registry entry describing one operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Operation {
    /// Operation identifier.
    pub kind: OperationKind,
    /// 5-bit function-select code.
    pub opcode: u8,
    /// Mnemonic.
    pub name: &'static str,
    /// Operand inputs the operation reads.
    pub operands: Operands,
    /// Carry output carries information (otherwise it is always clear).
    pub uses_carry: bool,
    /// Overflow output carries information (otherwise it is always clear).
    pub uses_overflow: bool,
}

impl Operation {
    const fn new(
        kind: OperationKind,
        name: &'static str,
        operands: Operands,
        uses_carry: bool,
        uses_overflow: bool,
    ) -> Self {
        Self {
            kind,
            opcode: kind as u8,
            name,
            operands,
            uses_carry,
            uses_overflow,
        }
    }

    /// Returns the registry entry for `opcode`.
    ///
    /// # Errors
    ///
    /// [`AluError::InvalidOpcode`] if `opcode` is not one of the 19 assigned codes.
    pub fn lookup(opcode: u8) -> Result<&'static Self> {
        OperationKind::from_opcode(opcode)
            .map(OperationKind::descriptor)
            .ok_or(AluError::InvalidOpcode(opcode))
    }

    /// The opcode as a 5-character binary string, e.g. `"10000"` for CMP.
    pub fn opcode_bits(&self) -> String {
        opcode_bits(self.opcode)
    }
}

/// The registry, indexed by opcode.
pub static REGISTRY: [Operation; NUM_OPERATIONS] = [
    Operation::new(OperationKind::Add, "ADD", Operands::AB, true, true),
    Operation::new(OperationKind::Sub, "SUB", Operands::AB, true, true),
    Operation::new(OperationKind::IncA, "INC_A", Operands::A, true, true),
    Operation::new(OperationKind::DecA, "DEC_A", Operands::A, true, true),
    Operation::new(OperationKind::Lsl, "LSL", Operands::A, true, false),
    Operation::new(OperationKind::Lsr, "LSR", Operands::A, true, false),
    Operation::new(OperationKind::Asr, "ASR", Operands::A, true, false),
    Operation::new(OperationKind::RevA, "REV_A", Operands::A, false, false),
    Operation::new(OperationKind::Nand, "NAND", Operands::AB, false, false),
    Operation::new(OperationKind::Nor, "NOR", Operands::AB, false, false),
    Operation::new(OperationKind::Xor, "XOR", Operands::AB, false, false),
    Operation::new(OperationKind::PassA, "PASS_A", Operands::A, false, false),
    Operation::new(OperationKind::PassB, "PASS_B", Operands::B, false, false),
    Operation::new(OperationKind::And, "AND", Operands::AB, false, false),
    Operation::new(OperationKind::Or, "OR", Operands::AB, false, false),
    Operation::new(OperationKind::Xnor, "XNOR", Operands::AB, false, false),
    Operation::new(OperationKind::Cmp, "CMP", Operands::AB, true, true),
    Operation::new(OperationKind::NotA, "NOT_A", Operands::A, false, false),
    Operation::new(OperationKind::NotB, "NOT_B", Operands::B, false, false),
];

/// Formats any opcode (registered or not) as a 5-character binary string.
pub fn opcode_bits(opcode: u8) -> String {
    format!("{:0width$b}", opcode, width = OPCODE_WIDTH as usize)
}

/// Parses an opcode given as a 5-character binary string (`"01101"`) or as
/// a decimal integer (`"13"`).
///
/// The value is not checked against the registry; unassigned codes parse
/// successfully so that they can be reported as unknown downstream.
///
/// # Errors
///
/// [`AluError::InvalidOpcodeString`] if the text is neither form or the value
/// does not fit in 5 bits.
pub fn parse_opcode(text: &str) -> Result<u8> {
    let text = text.trim();
    let invalid = || AluError::InvalidOpcodeString(text.to_string());

    let value = if text.len() == OPCODE_WIDTH as usize && text.bytes().all(|c| c == b'0' || c == b'1')
    {
        u8::from_str_radix(text, 2).map_err(|_| invalid())?
    } else {
        text.parse::<u8>().map_err(|_| invalid())?
    };

    if u32::from(value) >> OPCODE_WIDTH != 0 {
        return Err(invalid());
    }
    Ok(value)
}
