//! Adapter contract violations.
//!
//! All variants are fatal to a run: without a working adapter no oracle
//! comparison is possible.

/// Errors reported by a [`DutAdapter`](crate::DutAdapter).
#[derive(Debug, thiserror::Error)]
pub enum DutError {
    /// The DUT does not declare a field with this name.
    #[error("DUT '{dut}' has no field named '{field}'")]
    UnknownField {
        /// Name of the DUT.
        dut: String,
        /// The requested field name.
        field: String,
    },

    /// An attempt was made to drive an output field.
    #[error("field '{field}' of DUT '{dut}' is an output and cannot be set")]
    NotAnInput {
        /// Name of the DUT.
        dut: String,
        /// The offending field name.
        field: String,
    },

    /// The simulation backend itself failed.
    #[error("backend error: {reason}")]
    Backend {
        /// Description of the failure.
        reason: String,
    },
}
