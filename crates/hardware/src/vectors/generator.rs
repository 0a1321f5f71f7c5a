//! Lazy test-vector generation.
//!
//! A [`Sweep`] describes a test domain (a set of operations and an operand
//! range for each of A and B) without materializing it. Vectors are produced
//! one at a time by [`VectorIter`], a cursor over the domain's index space;
//! each vector is computed on demand from the golden model by the pure
//! counting function [`Sweep::vector_at`]. Memory use is independent of the
//! sweep size.
//!
//! Order is operation-major (opcode order), then A, then B.

use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;

use crate::alu::Alu;
use crate::common::{AluError, FlagMask, FlagSet, Result};
use crate::isa::OperationKind;

/// One test case: inputs plus the golden model's expected outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TestVector {
    /// Opcode driven onto the function-select bus.
    pub opcode: u8,
    /// Registered operation for `opcode`, if any.
    pub operation: Option<OperationKind>,
    /// Operand A.
    pub a: u8,
    /// Operand B.
    pub b: u8,
    /// Expected 8-bit result.
    pub expected_result: u8,
    /// Expected status flags.
    pub expected_flags: FlagSet,
    /// Flags the evaluation compares.
    pub flag_mask: FlagMask,
}

impl TestVector {
    /// Builds the vector for `(op, a, b)` from the golden model.
    pub fn from_golden(op: OperationKind, a: u8, b: u8) -> Self {
        let out = Alu::execute(op, a, b);
        Self {
            opcode: op.opcode(),
            operation: Some(op),
            a,
            b,
            expected_result: out.result,
            expected_flags: out.flags,
            flag_mask: FlagMask::ALL,
        }
    }

    /// The same vector with flag comparison disabled.
    #[must_use]
    pub const fn result_only(mut self) -> Self {
        self.flag_mask = FlagMask::NONE;
        self
    }

    /// Mnemonic of the operation, or `"UNKNOWN"` for an unregistered opcode.
    pub fn name(&self) -> &'static str {
        self.operation.map_or("UNKNOWN", OperationKind::name)
    }

    /// Deterministic identifier `{NAME}_{A:02X}_{B:02X}`, e.g. `ADD_7F_01`.
    pub fn label(&self) -> Label<'_> {
        Label(self)
    }
}

/// Display adapter returned by [`TestVector::label`].
#[derive(Clone, Copy, Debug)]
pub struct Label<'a>(&'a TestVector);

impl fmt::Display for Label<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:02X}_{:02X}", self.0.name(), self.0.a, self.0.b)
    }
}

/// An arithmetic progression of operand values `start, start + step, ... <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OperandRange {
    start: u8,
    end: u8,
    step: u8,
}

impl OperandRange {
    /// Every value `0..=255`.
    pub const FULL: Self = Self {
        start: 0,
        end: u8::MAX,
        step: 1,
    };

    /// Creates a range; `end` is inclusive.
    ///
    /// # Errors
    ///
    /// [`AluError::Config`] if `step` is zero or `start > end`.
    pub fn new(start: u8, end: u8, step: u8) -> Result<Self> {
        if step == 0 {
            return Err(AluError::Config("operand step must be at least 1".into()));
        }
        if start > end {
            return Err(AluError::Config(format!(
                "operand range start {start} exceeds end {end}"
            )));
        }
        Ok(Self { start, end, step })
    }

    /// The full range sampled every `step` values (`0` is treated as `1`).
    pub fn sampled(step: u8) -> Self {
        Self {
            step: step.max(1),
            ..Self::FULL
        }
    }

    /// A single value.
    pub const fn single(value: u8) -> Self {
        Self {
            start: value,
            end: value,
            step: 1,
        }
    }

    /// Number of values in the range.
    pub const fn len(&self) -> u64 {
        ((self.end - self.start) / self.step) as u64 + 1
    }

    /// Always `false`: a range holds at least its start value.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The `index`-th value. `index` must be below [`Self::len`].
    #[inline]
    const fn nth(&self, index: u64) -> u8 {
        (self.start as u64 + index * self.step as u64) as u8
    }
}

impl Default for OperandRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// A restartable test domain over (operation, A, B).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sweep {
    operations: Vec<OperationKind>,
    a: OperandRange,
    b: OperandRange,
}

impl Default for Sweep {
    fn default() -> Self {
        Self::exhaustive()
    }
}

impl Sweep {
    /// All 19 operations over all 256 × 256 operand pairs (1,245,184 vectors).
    pub fn exhaustive() -> Self {
        Self {
            operations: OperationKind::ALL.to_vec(),
            a: OperandRange::FULL,
            b: OperandRange::FULL,
        }
    }

    /// Restricts the sweep to `ops`. Duplicates are dropped and the
    /// operations are visited in opcode order regardless of input order.
    #[must_use]
    pub fn with_operations(mut self, ops: &[OperationKind]) -> Self {
        let mut ops = ops.to_vec();
        ops.sort_unstable();
        ops.dedup();
        self.operations = ops;
        self
    }

    /// Samples both operands every `step` values.
    #[must_use]
    pub fn with_stride(mut self, step: u8) -> Self {
        self.a = OperandRange::sampled(step);
        self.b = OperandRange::sampled(step);
        self
    }

    /// Replaces the operand-A range.
    #[must_use]
    pub fn with_a_range(mut self, range: OperandRange) -> Self {
        self.a = range;
        self
    }

    /// Replaces the operand-B range.
    #[must_use]
    pub fn with_b_range(mut self, range: OperandRange) -> Self {
        self.b = range;
        self
    }

    /// Operations visited by the sweep, in order.
    pub fn operations(&self) -> &[OperationKind] {
        &self.operations
    }

    /// Returns `true` if this sweep is the full exhaustive domain.
    pub fn is_exhaustive(&self) -> bool {
        self.len() == crate::common::EXHAUSTIVE_CASES
    }

    /// Vectors produced per operation.
    pub const fn cases_per_operation(&self) -> u64 {
        self.a.len() * self.b.len()
    }

    /// Total number of vectors.
    pub fn len(&self) -> u64 {
        self.operations.len() as u64 * self.cases_per_operation()
    }

    /// Returns `true` if the sweep produces no vectors.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The `index`-th vector of the sequence, or `None` past the end.
    ///
    /// This is the counting function behind [`VectorIter`]; it depends on
    /// nothing but `index`, so any partition of `0..len()` can be consumed
    /// independently.
    pub fn vector_at(&self, index: u64) -> Option<TestVector> {
        let per_op = self.cases_per_operation();
        let op = *self.operations.get(usize::try_from(index / per_op).ok()?)?;
        let rem = index % per_op;
        let b_len = self.b.len();
        Some(TestVector::from_golden(
            op,
            self.a.nth(rem / b_len),
            self.b.nth(rem % b_len),
        ))
    }

    /// A fresh cursor over the whole sequence.
    pub fn iter(&self) -> VectorIter<'_> {
        self.iter_range(0..self.len())
    }

    /// A cursor over a slice of the index space (clamped to the sweep).
    pub fn iter_range(&self, range: Range<u64>) -> VectorIter<'_> {
        let end = range.end.min(self.len());
        VectorIter {
            sweep: self,
            next: range.start.min(end),
            end,
        }
    }

    /// One single-operation sweep per operation, sharing the operand ranges.
    pub fn partition_by_operation(&self) -> Vec<Self> {
        self.operations
            .iter()
            .map(|op| Self {
                operations: vec![*op],
                a: self.a,
                b: self.b,
            })
            .collect()
    }

    /// Splits the index space into at most `parts` contiguous, near-equal ranges.
    pub fn partition(&self, parts: usize) -> Vec<Range<u64>> {
        let total = self.len();
        let parts = (parts.max(1) as u64).min(total.max(1));
        let chunk = total.div_ceil(parts);
        (0..parts)
            .map(|i| (i * chunk).min(total)..((i + 1) * chunk).min(total))
            .filter(|r| !r.is_empty())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Sweep {
    type Item = TestVector;
    type IntoIter = VectorIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Cursor over a [`Sweep`]; yields one [`TestVector`] per call to `next`.
#[derive(Clone, Debug)]
pub struct VectorIter<'a> {
    sweep: &'a Sweep,
    next: u64,
    end: u64,
}

impl VectorIter<'_> {
    /// Index of the next vector to be produced.
    pub const fn position(&self) -> u64 {
        self.next
    }
}

impl Iterator for VectorIter<'_> {
    type Item = TestVector;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let vector = self.sweep.vector_at(self.next);
        self.next += 1;
        vector
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n as u64).min(self.end);
        self.next()
    }
}

impl ExactSizeIterator for VectorIter<'_> {}

impl FusedIterator for VectorIter<'_> {}
