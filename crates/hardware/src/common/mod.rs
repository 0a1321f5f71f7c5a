//! Common utilities and types used throughout the verification toolkit.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Constants:** Datapath width, masks, and the size of the exhaustive test space.
//! 2. **Flags:** The four status flags and the mask selecting which ones a check compares.
//! 3. **Error Handling:** Harness and hardware error types.

/// Datapath, opcode, and sweep constants.
pub mod constants;

/// Error types.
pub mod error;

/// Status flag types.
pub mod flags;

pub use constants::{DATA_MASK, EXHAUSTIVE_CASES, SIGN_BIT};
pub use error::{AluError, HardwareError, Result};
pub use flags::{Flag, FlagMask, FlagSet};
