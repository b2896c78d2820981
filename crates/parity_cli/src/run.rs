//! `parity run`: drive the reference models through the harness.

use std::io::{self, Write};

use parity_dut::{BramFault, ButterflyFault, ButterflyUnit, DualPortBram};
use parity_harness::{write_json, write_summary, write_text, Harness, RunSummary};

use crate::{GlobalArgs, ReportFormat, RunArgs, SuiteChoice};

/// A defect to inject, resolved from its CLI name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fault {
    Butterfly(ButterflyFault),
    Bram(BramFault),
}

impl Fault {
    fn parse(name: &str) -> Result<Self, String> {
        ButterflyFault::from_name(name)
            .map(Fault::Butterfly)
            .or_else(|| BramFault::from_name(name).map(Fault::Bram))
            .ok_or_else(|| format!("unknown fault '{name}' (see `parity faults`)"))
    }
}

/// Prints every injectable fault name.
pub fn list_faults() {
    println!("butterfly:");
    for fault in ButterflyFault::ALL {
        println!("  {}", fault.name());
    }
    println!("memory:");
    for fault in [
        BramFault::CrossPortWrite,
        BramFault::LateRead,
        BramFault::SlowOddWrites,
    ] {
        println!("  {fault}");
    }
    println!("  stuck-bit:N");
}

/// Runs the `parity run` command, reporting to stdout.
///
/// Returns 0 if every case passed and 1 otherwise.
pub fn run(args: &RunArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(args, global, &mut out)
}

fn execute(
    args: &RunArgs,
    global: &GlobalArgs,
    out: &mut impl Write,
) -> Result<i32, Box<dyn std::error::Error>> {
    let mut config = crate::config::load(global)?;
    if let Some(seed) = args.seed {
        config.stimulus.seed = seed;
    }
    if let Some(n) = args.random_cases {
        config.stimulus.random_cases = n;
    }
    let fault = args.fault.as_deref().map(Fault::parse).transpose()?;
    let harness = Harness::new(config)?;
    let config = harness.config();

    let selected = |name: &str| args.filter.as_deref().map_or(true, |f| name.contains(f));
    let mut summary = RunSummary::new(config.stimulus.seed);

    if args.suite != SuiteChoice::Memory {
        let vectors: Vec<_> = harness
            .butterfly_vectors()
            .into_iter()
            .filter(|v| selected(&v.name))
            .collect();
        let build = || {
            let dut = ButterflyUnit::new(config.timing.latency)
                .with_frac_bits(config.fixed_point.frac_bits());
            match fault {
                Some(Fault::Butterfly(f)) => dut.with_fault(f),
                _ => dut,
            }
        };
        let results = if args.parallel {
            harness.run_butterfly_parallel(build, &vectors)?
        } else {
            harness.run_butterfly(&mut build(), &vectors)?
        };
        summary.cases.extend(results);
    }

    if args.suite != SuiteChoice::Butterfly {
        let scenarios: Vec<_> = harness
            .memory_scenarios()
            .into_iter()
            .filter(|s| selected(&s.name))
            .collect();
        let mut dut = DualPortBram::new(config.memory.depth, config.memory.data_width);
        if let Some(Fault::Bram(f)) = fault {
            dut = dut.with_fault(f);
        }
        summary.cases.extend(harness.run_memory(&mut dut, &scenarios)?);
    }

    tracing::info!(
        passed = summary.passed(),
        failed = summary.failed(),
        seed = summary.seed,
        "run complete"
    );

    match args.format {
        ReportFormat::Json => write_json(out, &summary)?,
        ReportFormat::Text if global.quiet => write_summary(out, &summary)?,
        ReportFormat::Text => write_text(out, &summary)?,
    }
    Ok(summary.exit_code())
}
