//! Test Vectors.
//!
//! This module produces and exchanges test cases. It provides:
//! 1. **Generation:** [`Sweep`], a lazy, restartable enumeration of
//!    (operation, A, B) with golden-model expectations computed on demand.
//! 2. **Records:** [`record`], the JSON exchange form and its loaders.

/// Lazy sweep over the (operation, A, B) domain.
pub mod generator;

/// Persisted record format, loaders and writer.
pub mod record;

pub use generator::{OperandRange, Sweep, TestVector, VectorIter};
pub use record::{NamedVector, VectorRecord};
