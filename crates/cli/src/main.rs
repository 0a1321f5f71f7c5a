//! 8-bit ALU verification CLI.
//!
//! This binary is a thin front end over `alu8-core`. It provides:
//! 1. **Exhaustive run:** Every (operation, A, B) case against the golden model.
//! 2. **Vector files:** Load JSON record files and score them.
//! 3. **Export:** Write a sweep out as JSON records.
//! 4. **Hardware:** Smoke test, single probe and random stress through the
//!    GPIO adapter (simulated unit, or sysfs lines with the `sysfs` feature).
//!
//! The exit status is 0 iff every evaluated case passed.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use alu8_core::config::Config;
use alu8_core::hw::probe::{self, StressLimits};
use alu8_core::hw::{GpioBus, HardwareAdapter, SimulatedAlu};
use alu8_core::isa::{OperationKind, parse_opcode};
use alu8_core::runner::{self, Progress, RunOptions};
use alu8_core::stats::{RunStats, grouped};
use alu8_core::vectors::record;
use alu8_core::Alu;

#[derive(Parser, Debug)]
#[command(
    name = "alu8",
    author,
    version,
    about = "8-bit ALU golden-model verification",
    long_about = "Verify an 8-bit ALU against its golden model, exhaustively in software or through GPIO lines.\n\nExamples:\n  alu8 exhaustive --threads 8\n  alu8 exhaustive --ops ADD,SUB --stride 16\n  alu8 vectors tests/vectors/*.json\n  alu8 hw smoke\n  alu8 hw stress --count 100000"
)]
struct Cli {
    /// JSON configuration file; command-line flags override its fields.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (repeat for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the exhaustive sweep against the golden model.
    Exhaustive {
        /// Comma-separated mnemonics to run (default: all 19).
        #[arg(long, value_delimiter = ',')]
        ops: Vec<String>,

        /// Sample operands every N values.
        #[arg(long)]
        stride: Option<u8>,

        /// Worker threads.
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Load JSON vector files and score each against the golden model.
    Vectors {
        /// Vector files (a list of records, or an object with `tests` or `vectors`).
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write a sweep to a JSON record file.
    Export {
        /// Output file.
        output: PathBuf,

        /// Comma-separated mnemonics to export (default: all 19).
        #[arg(long, value_delimiter = ',')]
        ops: Vec<String>,

        /// Sample operands every N values.
        #[arg(long)]
        stride: Option<u8>,
    },

    /// Exercise a unit through the GPIO adapter.
    Hw {
        /// Line backend.
        #[arg(long, value_enum, default_value_t = Backend::Sim)]
        backend: Backend,

        /// Propagation delay of the simulated unit, in microseconds.
        #[arg(long, default_value_t = 100)]
        sim_delay_us: u64,

        /// Settling delay override, in microseconds.
        #[arg(long)]
        settle_us: Option<u64>,

        #[command(subcommand)]
        action: HwAction,
    },
}

#[derive(Subcommand, Debug)]
enum HwAction {
    /// Five fixed cases with known answers.
    Smoke,

    /// One cycle with the given inputs.
    Probe {
        /// Opcode: 5-digit binary (`01101`) or decimal (`13`).
        #[arg(long)]
        opcode: String,

        /// Operand A (0-255).
        #[arg(short)]
        a: u8,

        /// Operand B (0-255).
        #[arg(short)]
        b: u8,
    },

    /// Random ADD cycles until Ctrl-C or the count is reached.
    Stress {
        /// Stop after this many cycles.
        #[arg(long)]
        count: Option<u64>,

        /// Seed for reproducible operands.
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Backend {
    /// Pin-level simulated unit.
    Sim,
    /// Linux sysfs GPIO lines.
    Sysfs,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            2
        }
    };
    process::exit(code);
}

/// Logs to stderr; `RUST_LOG` overrides the level chosen by `-v`/`-q`.
fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || {
            eprintln!("\nstopping after the current case...");
            stop.store(true, Ordering::Relaxed);
        })
        .context("failed to set ctrlc handler")?;
    }

    match cli.command {
        Commands::Exhaustive {
            ops,
            stride,
            threads,
        } => {
            apply_sweep_overrides(&mut config, ops, stride);
            if let Some(threads) = threads {
                config.sweep.threads = threads;
            }
            config.validate()?;
            cmd_exhaustive(&config, &stop)
        }
        Commands::Vectors { files } => cmd_vectors(&config, &files, &stop),
        Commands::Export {
            output,
            ops,
            stride,
        } => {
            apply_sweep_overrides(&mut config, ops, stride);
            config.validate()?;
            cmd_export(&config, &output)
        }
        Commands::Hw {
            backend,
            sim_delay_us,
            settle_us,
            action,
        } => {
            if let Some(settle_us) = settle_us {
                config.hardware.settle_us = settle_us;
            }
            config.validate()?;
            cmd_hw(&config, backend, Duration::from_micros(sim_delay_us), action, &stop)
        }
    }
}

fn apply_sweep_overrides(config: &mut Config, ops: Vec<String>, stride: Option<u8>) {
    if !ops.is_empty() {
        config.sweep.operations = ops;
    }
    if let Some(stride) = stride {
        config.sweep.stride = stride;
    }
}

fn print_progress(p: &Progress) {
    eprint!(
        "\rProgress: {:5.1}% | {}/{}",
        p.percent(),
        grouped(p.done),
        grouped(p.total)
    );
    if p.done == p.total {
        eprintln!();
    }
    let _ = std::io::stderr().flush();
}

fn banner(title: &str) {
    let rule = "=".repeat(80);
    println!("\n{rule}");
    println!("{title:^80}");
    println!("{rule}\n");
}

fn finish(stats: &RunStats) -> i32 {
    if stats.interrupted {
        eprintln!();
    }
    stats.print();
    stats.exit_code()
}

fn cmd_exhaustive(config: &Config, stop: &AtomicBool) -> anyhow::Result<i32> {
    let sweep = config.sweep.build()?;
    banner("ALU TEST EXECUTION (Golden Model)");
    println!(
        "Executing {} tests over {} operation(s) on {} thread(s)...",
        grouped(sweep.len()),
        sweep.operations().len(),
        config.sweep.threads
    );

    let options = RunOptions::from(&config.report).with_stop(stop);
    let threads = config.sweep.threads;
    let stats = runner::run_parallel(&Alu, &sweep, threads, &options, print_progress)?;
    Ok(finish(&stats))
}

fn cmd_vectors(config: &Config, files: &[PathBuf], stop: &AtomicBool) -> anyhow::Result<i32> {
    banner("ALU TEST EXECUTION (Vector Files)");
    let options = RunOptions::from(&config.report).with_stop(stop);
    let mut overall = RunStats::new(0).with_failure_limit(config.report.failure_samples);
    let mut load_failures = 0usize;

    for (path, loaded) in record::load_batch(files) {
        println!("Testing File: {}", path.display());
        let vectors = match loaded {
            Ok(vectors) => vectors,
            Err(e) => {
                println!("Failed to load {}: {e}\n", path.display());
                load_failures += 1;
                continue;
            }
        };
        println!("Executing {} tests...", grouped(vectors.len() as u64));
        let mut unit = Alu;
        let stats = runner::run_vectors(&mut unit, &vectors, &options, print_progress)?;
        let mut table = String::new();
        stats.write_table(&mut table)?;
        println!("{table}");
        overall.declared_total += stats.declared_total;
        overall.merge(stats);
        if overall.interrupted {
            break;
        }
    }

    overall.finish();
    let mut summary = String::new();
    overall.write_summary(&mut summary)?;
    print!("{summary}");
    if load_failures > 0 {
        println!("{load_failures} file(s) could not be loaded");
        return Ok(1);
    }
    Ok(overall.exit_code())
}

fn cmd_export(config: &Config, output: &Path) -> anyhow::Result<i32> {
    let sweep = config.sweep.build()?;
    let written = record::write_records(output, &sweep)
        .with_context(|| format!("failed to export to {}", output.display()))?;
    println!("Wrote {} vectors to {}", grouped(written), output.display());
    Ok(0)
}

fn open_bus(
    backend: Backend,
    config: &Config,
    sim_delay: Duration,
) -> anyhow::Result<Box<dyn GpioBus>> {
    match backend {
        Backend::Sim => Ok(Box::new(SimulatedAlu::new(
            config.hardware.pin_map()?,
            sim_delay,
        ))),
        #[cfg(feature = "sysfs")]
        Backend::Sysfs => Ok(Box::new(alu8_core::hw::sysfs::SysfsBus::new())),
        #[cfg(not(feature = "sysfs"))]
        Backend::Sysfs => anyhow::bail!("this build has no sysfs support; rebuild with `--features sysfs`"),
    }
}

fn cmd_hw(
    config: &Config,
    backend: Backend,
    sim_delay: Duration,
    action: HwAction,
    stop: &AtomicBool,
) -> anyhow::Result<i32> {
    let bus = open_bus(backend, config, sim_delay)?;
    let pins = config.hardware.pin_map()?;
    let mut adapter = HardwareAdapter::new(bus, pins, config.hardware.settle_time())
        .context("failed to initialise the hardware adapter")?;

    match action {
        HwAction::Smoke => {
            let report = probe::smoke_test(&mut adapter)?;
            for case in &report.cases {
                let status = if case.outcome.passed {
                    "PASS".to_string()
                } else {
                    format!("FAIL ({})", case.outcome.mismatch)
                };
                println!("Test {}: {status}", case.name);
            }
            println!("Smoke Test: {}/{} Passed", report.passed(), report.cases.len());
            Ok(i32::from(!report.all_passed()))
        }
        HwAction::Probe { opcode, a, b } => {
            let opcode = parse_opcode(&opcode)?;
            let reading = probe::probe_once(&mut adapter, opcode, a, b)?;
            let name = OperationKind::from_opcode(opcode).map_or("UNKNOWN", OperationKind::name);
            println!("{name} A={a} B={b}");
            println!("Output: {} (0x{:02X})", reading.actual, reading.actual);
            match reading.expected {
                Some(expected) if expected == reading.actual => Ok(0),
                Some(expected) => {
                    println!("Expected: {expected} (0x{expected:02X})");
                    Ok(1)
                }
                None => Ok(0),
            }
        }
        HwAction::Stress { count, seed } => {
            let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            let limits = StressLimits {
                max_cycles: count,
                failure_samples: config.report.failure_samples,
            };
            println!("Running random stress test... Ctrl+C to stop");
            let report = probe::stress(&mut adapter, &mut rng, limits, stop, |r| {
                println!("{} tests, {} errors", grouped(r.cycles), grouped(r.errors));
            })?;
            for f in &report.failures {
                println!("FAIL: {} + {} = {} (Exp {})", f.a, f.b, f.actual, f.expected);
            }
            if report.interrupted {
                println!("Stopped.");
            }
            println!("{} tests, {} errors", grouped(report.cycles), grouped(report.errors));
            Ok(i32::from(report.errors > 0))
        }
    }
}
