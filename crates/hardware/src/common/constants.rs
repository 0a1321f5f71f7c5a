//! Global Datapath Constants.
//!
//! This module defines constants shared across the toolkit. It includes:
//! 1. **Datapath Constants:** Operand width, masks and the sign bit.
//! 2. **Opcode Constants:** Width of the function-select bus.
//! 3. **Sweep Constants:** Sizes of the exhaustive test space.
//! 4. **Reporting Constants:** Progress cadence for long runs.

/// Width of each operand and of the result, in bits.
pub const DATA_WIDTH: u32 = 8;

/// Mask selecting the low `DATA_WIDTH` bits of a widened intermediate.
pub const DATA_MASK: u16 = 0xFF;

/// Sign bit of an 8-bit two's-complement value.
pub const SIGN_BIT: u8 = 0x80;

/// Largest positive 8-bit signed value (`INC_A` overflows from here).
pub const SIGNED_MAX: u8 = 0x7F;

/// Smallest negative 8-bit signed value (`DEC_A` overflows from here).
pub const SIGNED_MIN: u8 = 0x80;

/// Width of the function-select (opcode) bus, in bits.
pub const OPCODE_WIDTH: u32 = 5;

/// Number of distinct opcode encodings (registered or not).
pub const OPCODE_SPACE: usize = 1 << OPCODE_WIDTH;

/// Opcode given to a loaded record whose opcode field is not a 5-bit code.
pub const UNRESOLVED_OPCODE: u8 = u8::MAX;

/// Number of distinct values of one operand.
pub const OPERAND_SPACE: usize = 256;

/// Number of registered operations.
pub const NUM_OPERATIONS: usize = 19;

/// Cases per operation in an exhaustive sweep (every A paired with every B).
pub const CASES_PER_OPERATION: u64 = (OPERAND_SPACE * OPERAND_SPACE) as u64;

/// Total cases in the exhaustive sweep: 19 × 256 × 256.
pub const EXHAUSTIVE_CASES: u64 = NUM_OPERATIONS as u64 * CASES_PER_OPERATION;

/// Progress is reported once per this many thousandths of the declared total.
pub const DEFAULT_PROGRESS_PERMILLE: u64 = 1;

/// Default settling delay between driving the inputs and sampling the output.
pub const DEFAULT_SETTLE_US: u64 = 500;

/// Cycles between progress lines in the randomized stress probe.
pub const STRESS_REPORT_INTERVAL: u64 = 1000;
