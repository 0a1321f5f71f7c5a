//! Operation Set Definitions.
//!
//! Contains the function-select encodings of the ALU and the registry that
//! maps them onto operations.
//!
//! # Modules
//!
//! * `opcodes`: The 5-bit function-select constants.
//! * `operation`: The closed operation enum and its registry entries.

/// Function-select opcode constants.
pub mod opcodes;

/// Operation identifiers, registry entries, and opcode parsing.
pub mod operation;

pub use operation::{Operands, Operation, OperationKind, REGISTRY, opcode_bits, parse_opcode};
