//! Verification runs.
//!
//! This module streams test vectors through a unit under test and folds the
//! outcomes into [`RunStats`]. It provides:
//! 1. **Sequential runs:** [`run_cases`] over any vector source, with
//!    [`run_sweep`] and [`run_vectors`] for generated and loaded vectors.
//! 2. **Parallel runs:** [`run_parallel`], which shards a sweep by operation
//!    across scoped threads, each with its own clone of the unit and its own
//!    partial statistics, merged at the end.
//! 3. **Interruption:** A shared stop flag checked before every case; a
//!    stopped run returns what it has tallied with `interrupted` set.

use std::panic;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

use crate::common::Result;
use crate::config::ReportConfig;
use crate::stats::{ProgressCadence, RunStats};
use crate::verify::{self, UnitUnderTest};
use crate::vectors::{NamedVector, Sweep, TestVector};

/// Progress snapshot handed to the progress callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    /// Cases completed.
    pub done: u64,
    /// Cases declared for the run.
    pub total: u64,
    /// Cases failed so far.
    pub failed: u64,
}

impl Progress {
    /// Percentage complete.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

/// Settings shared by every kind of run.
#[derive(Clone, Copy, Debug)]
pub struct RunOptions<'a> {
    /// Checked before each case; when set the run stops.
    pub stop: Option<&'a AtomicBool>,
    /// Progress cadence in thousandths of the total.
    pub progress_permille: u64,
    /// Failing cases kept in the statistics.
    pub failure_samples: usize,
}

impl Default for RunOptions<'_> {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for RunOptions<'_> {
    fn from(report: &ReportConfig) -> Self {
        Self {
            stop: None,
            progress_permille: report.progress_permille,
            failure_samples: report.failure_samples,
        }
    }
}

impl<'a> RunOptions<'a> {
    /// The same options with a stop flag attached.
    #[must_use]
    pub const fn with_stop(mut self, stop: &'a AtomicBool) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stopped(&self) -> bool {
        self.stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

fn run_into<U, I, F>(
    unit: &mut U,
    cases: I,
    stats: &mut RunStats,
    options: &RunOptions<'_>,
    mut after_case: F,
) -> Result<()>
where
    U: UnitUnderTest + ?Sized,
    I: IntoIterator<Item = TestVector>,
    F: FnMut(bool),
{
    for vector in cases {
        if options.stopped() {
            stats.interrupted = true;
            tracing::info!(recorded = stats.total(), "run interrupted");
            break;
        }
        let outcome = verify::check(unit, &vector).inspect_err(|e| {
            tracing::error!(error = %e, case = %vector.label(), "unit under test is unusable");
        })?;
        after_case(outcome.passed);
        stats.record(&vector, &outcome);
    }
    Ok(())
}

/// Runs `cases` against `unit` one at a time.
///
/// `declared_total` sizes the progress cadence and the interruption report.
///
/// # Arguments
///
/// * `unit`           - The implementation being verified
/// * `cases`          - Vectors to evaluate, consumed lazily
/// * `declared_total` - Number of cases expected, used for progress and reporting
/// * `options`        - Stop flag, progress cadence and failure sample limit
/// * `progress`       - Called at each progress checkpoint
///
/// # Returns
///
/// Per-opcode statistics of every case evaluated. A run stopped through
/// `options` returns what it gathered, with `interrupted` set.
///
/// # Errors
///
/// [`AluError::Hardware`] if the unit's device fails; every per-case problem
/// is counted as a failure instead.
///
/// [`AluError::Hardware`]: crate::common::AluError::Hardware
pub fn run_cases<U, I, F>(
    unit: &mut U,
    cases: I,
    declared_total: u64,
    options: &RunOptions<'_>,
    progress: F,
) -> Result<RunStats>
where
    U: UnitUnderTest + ?Sized,
    I: IntoIterator<Item = TestVector>,
    F: Fn(&Progress),
{
    let cadence = ProgressCadence::new(declared_total, options.progress_permille);
    let mut stats = RunStats::new(declared_total).with_failure_limit(options.failure_samples);
    tracing::debug!(unit = unit.name(), total = declared_total, "run started");

    let mut done = 0u64;
    let mut failed = 0u64;
    run_into(unit, cases, &mut stats, options, |passed| {
        done += 1;
        failed += u64::from(!passed);
        if cadence.is_due(done) {
            progress(&Progress {
                done,
                total: declared_total,
                failed,
            });
        }
    })?;

    stats.finish();
    tracing::info!(
        passed = stats.passed(),
        failed = stats.failed(),
        interrupted = stats.interrupted,
        "run finished"
    );
    Ok(stats)
}

/// Runs a generated sweep.
///
/// # Errors
///
/// See [`run_cases`].
pub fn run_sweep<U, F>(
    unit: &mut U,
    sweep: &Sweep,
    options: &RunOptions<'_>,
    progress: F,
) -> Result<RunStats>
where
    U: UnitUnderTest + ?Sized,
    F: Fn(&Progress),
{
    run_cases(unit, sweep, sweep.len(), options, progress)
}

/// Runs vectors loaded from a record file.
///
/// # Errors
///
/// See [`run_cases`].
pub fn run_vectors<U, F>(
    unit: &mut U,
    vectors: &[NamedVector],
    options: &RunOptions<'_>,
    progress: F,
) -> Result<RunStats>
where
    U: UnitUnderTest + ?Sized,
    F: Fn(&Progress),
{
    run_cases(
        unit,
        vectors.iter().map(|named| named.vector),
        vectors.len() as u64,
        options,
        progress,
    )
}

/// Runs a sweep on `threads` workers, each with its own clone of `unit`.
///
/// Operations are dealt round-robin to the workers; per-worker statistics
/// are merged, so the result equals a sequential run's apart from the order
/// of retained failure samples.
///
/// # Arguments
///
/// * `unit`     - Prototype unit; each worker runs on its own clone
/// * `sweep`    - The cases to run
/// * `threads`  - Requested workers, capped at the number of operations
/// * `options`  - Shared by every worker, including the stop flag
/// * `progress` - Called with the combined count across workers
///
/// # Returns
///
/// The merged statistics of all workers.
///
/// # Errors
///
/// The first worker error, see [`run_cases`].
pub fn run_parallel<U, F>(
    unit: &U,
    sweep: &Sweep,
    threads: usize,
    options: &RunOptions<'_>,
    progress: F,
) -> Result<RunStats>
where
    U: UnitUnderTest + Clone + Send,
    F: Fn(&Progress) + Sync,
{
    let shards = sweep.partition_by_operation();
    let workers = threads.clamp(1, shards.len().max(1));
    if workers == 1 {
        let mut unit = unit.clone();
        return run_sweep(&mut unit, sweep, options, progress);
    }

    let total = sweep.len();
    let cadence = ProgressCadence::new(total, options.progress_permille);
    let done = AtomicU64::new(0);
    let failed = AtomicU64::new(0);
    tracing::debug!(workers, total, "parallel run started");

    let results: Vec<Result<RunStats>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let mut unit = unit.clone();
                let shards: Vec<&Sweep> = shards.iter().skip(worker).step_by(workers).collect();
                let (done, failed, progress) = (&done, &failed, &progress);
                scope.spawn(move || {
                    let mut stats = RunStats::new(0).with_failure_limit(options.failure_samples);
                    for shard in shards {
                        run_into(&mut unit, shard, &mut stats, options, |passed| {
                            let now = done.fetch_add(1, Ordering::Relaxed) + 1;
                            let bad = if passed {
                                failed.load(Ordering::Relaxed)
                            } else {
                                failed.fetch_add(1, Ordering::Relaxed) + 1
                            };
                            if cadence.is_due(now) {
                                progress(&Progress {
                                    done: now,
                                    total,
                                    failed: bad,
                                });
                            }
                        })?;
                        if stats.interrupted {
                            break;
                        }
                    }
                    Ok(stats)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
            .collect()
    });

    let mut merged = RunStats::new(total).with_failure_limit(options.failure_samples);
    for result in results {
        merged.merge(result?);
    }
    merged.finish();
    tracing::info!(
        passed = merged.passed(),
        failed = merged.failed(),
        interrupted = merged.interrupted,
        "parallel run finished"
    );
    Ok(merged)
}
