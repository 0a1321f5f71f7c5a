//! Run statistics collection and reporting.
//!
//! This module folds per-case outcomes into per-opcode tallies. It provides:
//! 1. **Accumulation:** [`RunStats`], one [`OpcodeStatistics`] per opcode
//!    encountered, incremented exactly once per recorded case.
//! 2. **Merging:** Per-worker partial tallies combine with [`RunStats::merge`].
//! 3. **Triage:** A bounded sample of failing cases.
//! 4. **Progress:** [`ProgressCadence`], which spaces progress updates at a
//!    fixed fraction of the declared total.
//! 5. **Reporting:** The per-opcode table, the final summary and the
//!    process exit status.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

use crate::common::constants::OPCODE_SPACE;
use crate::isa::opcode_bits;
use crate::verify::{EvaluationOutcome, MismatchKind};
use crate::vectors::TestVector;

const RULE_WIDTH: usize = 80;

/// Pass/fail tally of one opcode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpcodeStatistics {
    /// Opcode the tally belongs to.
    pub opcode: u8,
    /// Operation mnemonic, or `"UNKNOWN"`.
    pub name: &'static str,
    /// Cases that passed.
    pub passed: u64,
    /// Cases that failed.
    pub failed: u64,
}

impl OpcodeStatistics {
    /// Total cases recorded.
    pub const fn total(&self) -> u64 {
        self.passed + self.failed
    }
}

/// A retained failing case.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureSample {
    /// Case label, e.g. `ADD_FF_01`.
    pub label: String,
    /// Why it failed.
    pub mismatch: MismatchKind,
}

/// Statistics of one run (or one worker's share of a run).
#[derive(Clone, Debug)]
pub struct RunStats {
    start_time: Instant,
    elapsed: Option<Duration>,
    per_opcode: BTreeMap<u8, OpcodeStatistics>,
    failure_limit: usize,
    failures: Vec<FailureSample>,
    /// Cases the run was declared to cover.
    pub declared_total: u64,
    /// The run stopped before covering every declared case.
    pub interrupted: bool,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new(0)
    }
}

impl RunStats {
    /// Empty statistics for a run of `declared_total` cases.
    pub fn new(declared_total: u64) -> Self {
        Self {
            start_time: Instant::now(),
            elapsed: None,
            per_opcode: BTreeMap::new(),
            failure_limit: crate::config::DEFAULT_FAILURE_SAMPLES,
            failures: Vec::new(),
            declared_total,
            interrupted: false,
        }
    }

    /// Sets how many failing cases are retained for the report.
    #[must_use]
    pub fn with_failure_limit(mut self, limit: usize) -> Self {
        self.failure_limit = limit;
        self.failures.truncate(limit);
        self
    }

    /// Records one case.
    pub fn record(&mut self, vector: &TestVector, outcome: &EvaluationOutcome) {
        let entry = self
            .per_opcode
            .entry(vector.opcode)
            .or_insert_with(|| OpcodeStatistics {
                opcode: vector.opcode,
                name: vector.name(),
                passed: 0,
                failed: 0,
            });

        if outcome.passed {
            entry.passed += 1;
            return;
        }
        entry.failed += 1;

        if self.failures.len() < self.failure_limit {
            let label = vector.label().to_string();
            tracing::warn!(case = %label, mismatch = %outcome.mismatch, "case failed");
            self.failures.push(FailureSample {
                label,
                mismatch: outcome.mismatch.clone(),
            });
        }
    }

    /// Folds another partial tally into this one.
    pub fn merge(&mut self, other: Self) {
        for (opcode, theirs) in other.per_opcode {
            self.per_opcode
                .entry(opcode)
                .and_modify(|ours| {
                    ours.passed += theirs.passed;
                    ours.failed += theirs.failed;
                })
                .or_insert(theirs);
        }
        let room = self.failure_limit.saturating_sub(self.failures.len());
        self.failures.extend(other.failures.into_iter().take(room));
        self.start_time = self.start_time.min(other.start_time);
        self.interrupted |= other.interrupted;
    }

    /// Freezes the elapsed time; later calls keep the first value.
    pub fn finish(&mut self) {
        if self.elapsed.is_none() {
            self.elapsed = Some(self.start_time.elapsed());
        }
    }

    /// Wall-clock time of the run (running time if not yet finished).
    pub fn elapsed(&self) -> Duration {
        self.elapsed.unwrap_or_else(|| self.start_time.elapsed())
    }

    /// Tally of one opcode, if any case with that opcode was recorded.
    pub fn opcode(&self, opcode: u8) -> Option<&OpcodeStatistics> {
        self.per_opcode.get(&opcode)
    }

    /// Every tally, in opcode order.
    pub fn opcodes(&self) -> impl Iterator<Item = &OpcodeStatistics> {
        self.per_opcode.values()
    }

    /// Retained failing cases, oldest first.
    pub fn failures(&self) -> &[FailureSample] {
        &self.failures
    }

    /// Cases passed across all opcodes.
    pub fn passed(&self) -> u64 {
        self.per_opcode.values().map(|s| s.passed).sum()
    }

    /// Cases failed across all opcodes.
    pub fn failed(&self) -> u64 {
        self.per_opcode.values().map(|s| s.failed).sum()
    }

    /// Cases recorded.
    pub fn total(&self) -> u64 {
        self.passed() + self.failed()
    }

    /// Percentage of recorded cases that passed (0 for an empty run).
    pub fn pass_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.passed() as f64 / total as f64 * 100.0
        }
    }

    /// `true` iff nothing failed.
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Process exit status: 0 iff nothing failed.
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }

    /// Writes the per-opcode table.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn write_table(&self, out: &mut impl fmt::Write) -> fmt::Result {
        writeln!(
            out,
            "{:<10} | {:<10} | {:<10} | {:<10} | {:<10} | Status",
            "Opcode", "Operation", "Tests", "Passed", "Failed"
        )?;
        writeln!(
            out,
            "{}+{}+{}+{}+{}+{}",
            "-".repeat(11),
            "-".repeat(12),
            "-".repeat(12),
            "-".repeat(12),
            "-".repeat(12),
            "-".repeat(10)
        )?;
        for s in self.per_opcode.values() {
            let status = if s.failed == 0 { "PASS" } else { "FAIL" };
            writeln!(
                out,
                "{:<10} | {:<10} | {:<10} | {:<10} | {:<10} | {status}",
                opcode_column(s.opcode),
                s.name,
                grouped(s.total()),
                grouped(s.passed),
                grouped(s.failed),
            )?;
        }
        Ok(())
    }

    /// Writes the final summary block, including retained failures.
    ///
    /// # Errors
    ///
    /// Propagates errors from `out`.
    pub fn write_summary(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(out, "{rule}")?;
        writeln!(out, "{:^RULE_WIDTH$}", "FINAL SUMMARY")?;
        writeln!(out, "{rule}")?;
        writeln!(out, "Total Tests Run: {}", grouped(self.total()))?;
        writeln!(
            out,
            "Passed:          {} ({:.1}%)",
            grouped(self.passed()),
            self.pass_rate()
        )?;
        writeln!(out, "Failed:          {}", grouped(self.failed()))?;
        writeln!(out, "Elapsed:         {:.2} s", self.elapsed().as_secs_f64())?;
        if self.interrupted {
            writeln!(
                out,
                "Interrupted:     {} of {} declared cases run",
                grouped(self.total()),
                grouped(self.declared_total)
            )?;
        }
        if !self.failures.is_empty() {
            writeln!(out, "First failures:")?;
            for sample in &self.failures {
                writeln!(out, "  {:<16} {}", sample.label, sample.mismatch)?;
            }
        }
        writeln!(out, "{rule}")
    }

    /// The table followed by the summary.
    pub fn render(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_table(&mut text);
        text.push('\n');
        let _ = self.write_summary(&mut text);
        text
    }

    /// Prints [`Self::render`] to stdout.
    pub fn print(&self) {
        print!("{}", self.render());
    }
}

fn opcode_column(opcode: u8) -> String {
    if usize::from(opcode) < OPCODE_SPACE {
        opcode_bits(opcode)
    } else {
        "?????".to_string()
    }
}

/// Formats an integer with `,` thousands separators.
pub fn grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Decides when a long run should emit a progress update.
///
/// Updates are due every `max(1, total * permille / 1000)` cases and on the
/// last case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressCadence {
    total: u64,
    interval: u64,
}

impl ProgressCadence {
    /// Cadence for a run of `total` cases, reporting every `permille` thousandths.
    pub fn new(total: u64, permille: u64) -> Self {
        Self {
            total,
            interval: (total.saturating_mul(permille) / 1000).max(1),
        }
    }

    /// Cases between updates.
    pub const fn interval(&self) -> u64 {
        self.interval
    }

    /// `true` if an update is due after `done` cases.
    pub const fn is_due(&self, done: u64) -> bool {
        done % self.interval == 0 || done == self.total
    }

    /// Percentage complete after `done` cases.
    pub fn percent(&self, done: u64) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            done as f64 / self.total as f64 * 100.0
        }
    }
}
