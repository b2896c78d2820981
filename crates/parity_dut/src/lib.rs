//! The DUT adapter contract and reference cycle models.
//!
//! A design under test is an opaque clocked black box: the harness may set
//! declared input fields, advance one clock edge, and read declared output
//! fields. [`DutAdapter`] is that narrow capability set; any simulation
//! backend or emulator can implement it without touching the harness.
//!
//! The [`reference`] module provides cycle models of the butterfly unit and
//! the dual-port BRAM written in register-transfer style. They stand in for
//! a real backend in tests and in the `parity` binary, and can inject known
//! defects to prove the oracle catches them.
//!
//! # Modules
//!
//! - `adapter`: the [`DutAdapter`] trait
//! - `error`: adapter contract violations
//! - `field`: field declarations and width normalisation
//! - `reference`: behavioural models with fault injection

#![warn(missing_docs)]

pub mod adapter;
pub mod error;
pub mod field;
pub mod reference;

pub use adapter::DutAdapter;
pub use error::DutError;
pub use field::{Direction, FieldBank, FieldDecl};
pub use reference::{
    BramFault, ButterflyFault, ButterflyUnit, DualPortBram, BRAM_DUT_NAME, BUTTERFLY_DUT_NAME,
};
