//! Setup-level failures that abort a run.
//!
//! Mismatches and timeouts are per-case verdicts and never appear here; see
//! [`CaseOutcome`](crate::CaseOutcome).

use parity_config::ConfigError;
use parity_dut::DutError;
use parity_model::ModelError;

use crate::sequencer::SeqState;

/// Errors that stop a harness run before or while driving vectors.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The DUT adapter violated its contract.
    #[error(transparent)]
    Dut(#[from] DutError),

    /// Generated stimulus violated a golden-model contract.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The DUT does not expose a field the harness must drive or observe.
    #[error("DUT '{dut}' does not expose {direction} field '{field}'")]
    MissingField {
        /// Name of the DUT.
        dut: String,
        /// The missing field.
        field: String,
        /// `"input"` or `"output"`.
        direction: &'static str,
    },

    /// A sequencer operation was called out of order.
    #[error("sequencer cannot {action} while in state {state}")]
    Sequencing {
        /// State the sequencer was in.
        state: SeqState,
        /// The rejected operation.
        action: &'static str,
    },
}
