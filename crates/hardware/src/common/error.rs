//! Error definitions.
//!
//! This module defines the error types of the toolkit. It provides:
//! 1. **Harness errors:** [`AluError`], returned by operations whose failure
//!    means the run itself cannot proceed (bad opcode passed to the golden
//!    model, unreadable vector file, unreachable hardware).
//! 2. **Hardware errors:** [`HardwareError`], raised by a digital-line backend.
//!
//! Per-case divergences (result or flag mismatches, a unit under test that
//! fails on one input) are not errors: the evaluation engine turns them into
//! counted failures, see [`crate::verify`].

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the golden model, the loaders and the run harness.
#[derive(Debug, Error)]
pub enum AluError {
    /// Opcode is outside the 19-entry registry (5-bit code, or wider value).
    #[error("invalid opcode {0:#07b} ({0})")]
    InvalidOpcode(u8),

    /// Opcode text is not a 5-character binary string or a decimal integer.
    #[error("invalid opcode string {0:?}")]
    InvalidOpcodeString(String),

    /// Operand value outside `0..=255`.
    #[error("operand {0} is outside 0..=255")]
    InvalidOperand(i64),

    /// A persisted vector record lacks a required field or holds a bad value.
    #[error("{source_name}: malformed vector record #{index}: {reason}")]
    MalformedVectorRecord {
        /// File (or other source) the record came from.
        source_name: String,
        /// Zero-based position of the record in its collection.
        index: usize,
        /// What is wrong with the record.
        reason: String,
    },

    /// A file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid JSON, or not of the expected shape.
    #[error("{}: {source}", path.display())]
    Json {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The hardware backend failed.
    #[error(transparent)]
    Hardware(#[from] HardwareError),
}

/// Errors raised by a digital-line backend.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// A line number is not present on this backend.
    #[error("line {0} is not available")]
    PinUnavailable(u32),

    /// A line could not be driven or read.
    #[error("line {pin}: {message}")]
    PinIo {
        /// Line number.
        pin: u32,
        /// Backend-specific description.
        message: String,
    },

    /// The device is already owned by another adapter.
    #[error("device {0} is busy")]
    Busy(String),
}

/// Convenience alias for results carrying an [`AluError`].
pub type Result<T> = std::result::Result<T, AluError>;
