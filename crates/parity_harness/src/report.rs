//! Rendering of a [`RunSummary`] as text or JSON.

use std::io::{self, Write};

use crate::driver::{CaseOutcome, CaseResult, RunSummary};

/// Writes one `[PASS] name` / `[FAIL] name` line per case, detail under
/// each failure, and a summary line.
pub fn write_text(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    for case in &summary.cases {
        write_case(out, case)?;
    }
    write_summary(out, summary)
}

/// Writes only the `Result:` line.
pub fn write_summary(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    writeln!(
        out,
        "Result: {} passed, {} failed out of {} case(s) (seed {:#x})",
        summary.passed(),
        summary.failed(),
        summary.cases.len(),
        summary.seed
    )
}

fn write_case(out: &mut impl Write, case: &CaseResult) -> io::Result<()> {
    if case.outcome.is_pass() {
        return writeln!(out, "[PASS] {}", case.name);
    }
    writeln!(out, "[FAIL] {}", case.name)?;
    writeln!(out, "    {} stimulus: {}", case.suite, case.stimulus)?;
    match (case.outcome, &case.comparison) {
        (CaseOutcome::Timeout { cycles }, _) => {
            writeln!(out, "    timed out after {cycles} cycles waiting for valid output")
        }
        (_, Some(cmp)) => {
            for f in cmp.mismatches() {
                writeln!(
                    out,
                    "    {}: expected {}, actual {} (delta {}, tolerance {})",
                    f.field, f.expected, f.actual, f.delta, cmp.tolerance
                )?;
            }
            Ok(())
        }
        (_, None) => Ok(()),
    }
}

/// Writes the full summary as pretty-printed JSON.
pub fn write_json(out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, summary)?;
    writeln!(out)
}
