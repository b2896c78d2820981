//! Clock/reset sequencing, stimulus generation, comparison and reporting.
//!
//! [`Harness`] turns a validated [`HarnessConfig`](parity_config::HarnessConfig)
//! into butterfly vectors and memory scenarios, drives them through any
//! [`DutAdapter`](parity_dut::DutAdapter), checks every sampled output
//! against the golden models in `parity_model`, and collects a
//! [`RunSummary`]. Mismatches and timeouts are per-case verdicts; only setup
//! failures surface as [`HarnessError`].

#![warn(missing_docs)]

pub mod compare;
pub mod driver;
pub mod error;
pub mod report;
pub mod scenario;
pub mod sequencer;
pub mod stimulus;

pub use compare::{compare, compare_exact, ComparisonResult, FieldComparison};
pub use driver::{CaseOutcome, CaseResult, Harness, RunSummary, Suite};
pub use error::HarnessError;
pub use report::{write_json, write_summary, write_text};
pub use scenario::MemoryScenario;
pub use sequencer::{require_fields, SampleOutcome, SeqState, Sequencer};
pub use stimulus::{ExpectOverride, TestVector};
