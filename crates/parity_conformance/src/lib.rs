//! Conformance test helpers for the parity harness.
//!
//! Provides shared functions that build a harness from TOML text, run the
//! butterfly and memory suites against the reference models (optionally
//! with an injected fault) and return the run summary for assertion in
//! integration tests.

#![warn(missing_docs)]

use parity_config::{load_config_from_str, HarnessConfig};
use parity_dut::{BramFault, ButterflyFault, ButterflyUnit, DualPortBram};
use parity_harness::{CaseResult, Harness, HarnessError, RunSummary};

/// Builds a harness from `parity.toml` text.
pub fn harness_from_toml(src: &str) -> Result<Harness, HarnessError> {
    Harness::new(load_config_from_str(src)?)
}

/// Builds a harness from defaults adjusted by `edit`.
///
/// # Panics
///
/// Panics if the edited configuration is invalid.
pub fn harness_with(edit: impl FnOnce(&mut HarnessConfig)) -> Harness {
    let mut config = HarnessConfig::default();
    edit(&mut config);
    Harness::new(config).expect("test configuration must be valid")
}

/// A reference butterfly unit matching the harness configuration.
pub fn butterfly_dut(harness: &Harness, fault: Option<ButterflyFault>) -> ButterflyUnit {
    let config = harness.config();
    let dut = ButterflyUnit::new(config.timing.latency).with_frac_bits(config.fixed_point.frac_bits());
    match fault {
        Some(f) => dut.with_fault(f),
        None => dut,
    }
}

/// A reference BRAM matching the harness configuration.
pub fn bram_dut(harness: &Harness, fault: Option<BramFault>) -> DualPortBram {
    let memory = &harness.config().memory;
    let dut = DualPortBram::new(memory.depth, memory.data_width);
    match fault {
        Some(f) => dut.with_fault(f),
        None => dut,
    }
}

/// Runs every butterfly vector on a fresh reference unit.
///
/// # Panics
///
/// Panics on setup errors, which the reference unit never produces.
pub fn run_butterfly_suite(harness: &Harness, fault: Option<ButterflyFault>) -> RunSummary {
    let mut dut = butterfly_dut(harness, fault);
    let vectors = harness.butterfly_vectors();
    RunSummary {
        seed: harness.config().stimulus.seed,
        cases: harness
            .run_butterfly(&mut dut, &vectors)
            .expect("reference butterfly exposes every field"),
    }
}

/// Runs every memory scenario on a fresh reference BRAM.
///
/// # Panics
///
/// Panics on setup errors, which the reference BRAM never produces.
pub fn run_memory_suite(harness: &Harness, fault: Option<BramFault>) -> RunSummary {
    let mut dut = bram_dut(harness, fault);
    let scenarios = harness.memory_scenarios();
    RunSummary {
        seed: harness.config().stimulus.seed,
        cases: harness
            .run_memory(&mut dut, &scenarios)
            .expect("reference BRAM exposes every field"),
    }
}

/// Looks up a case by name.
///
/// # Panics
///
/// Panics if no case has that name.
pub fn case<'a>(summary: &'a RunSummary, name: &str) -> &'a CaseResult {
    summary
        .cases
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no case named '{name}'"))
}

/// Names of the failing cases.
pub fn failures(summary: &RunSummary) -> Vec<&str> {
    summary
        .cases
        .iter()
        .filter(|c| !c.outcome.is_pass())
        .map(|c| c.name.as_str())
        .collect()
}
