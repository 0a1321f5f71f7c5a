//! ALU Function-Select Opcodes.
//!
//! Defines the 5-bit function-select encodings wired to the ALU's FUNC bus.
//! Codes `0b10011..=0b11111` are unassigned.

/// Addition.
pub const OP_ADD: u8 = 0b00000;

/// Subtraction (A - B).
pub const OP_SUB: u8 = 0b00001;

/// Increment A.
pub const OP_INC_A: u8 = 0b00010;

/// Decrement A.
pub const OP_DEC_A: u8 = 0b00011;

/// Logical shift left of A by one.
pub const OP_LSL: u8 = 0b00100;

/// Logical shift right of A by one.
pub const OP_LSR: u8 = 0b00101;

/// Arithmetic shift right of A by one.
pub const OP_ASR: u8 = 0b00110;

/// Bit reversal of A.
pub const OP_REV_A: u8 = 0b00111;

/// Bitwise NAND.
pub const OP_NAND: u8 = 0b01000;

/// Bitwise NOR.
pub const OP_NOR: u8 = 0b01001;

/// Bitwise XOR.
pub const OP_XOR: u8 = 0b01010;

/// Pass A through.
pub const OP_PASS_A: u8 = 0b01011;

/// Pass B through.
pub const OP_PASS_B: u8 = 0b01100;

/// Bitwise AND.
pub const OP_AND: u8 = 0b01101;

/// Bitwise OR.
pub const OP_OR: u8 = 0b01110;

/// Bitwise XNOR.
pub const OP_XNOR: u8 = 0b01111;

/// Compare (A - B, flags only).
pub const OP_CMP: u8 = 0b10000;

/// Complement of A.
pub const OP_NOT_A: u8 = 0b10001;

/// Complement of B.
pub const OP_NOT_B: u8 = 0b10010;

/// Mask of the 5-bit function-select bus.
pub const OPCODE_MASK: u8 = 0b11111;
