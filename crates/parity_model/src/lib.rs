//! Golden models used as the correctness oracle of the harness.
//!
//! Everything in this crate is pure: no clocks, no DUT access, no I/O.
//!
//! # Modules
//!
//! - `fixed`: Q-format scaling, complex fixed-point values, twiddle factors
//! - `butterfly`: bit-accurate radix-2 butterfly (sum/halve, difference/rotate)
//! - `memory`: dual-port memory read/write ordering and the expected read table

#![warn(missing_docs)]

pub mod butterfly;
pub mod error;
pub mod fixed;
pub mod memory;

pub use butterfly::{butterfly, ButterflyOutput};
pub use error::ModelError;
pub use fixed::{ComplexFx, QFormat, Twiddle};
pub use memory::{
    DontCareReason, Expected, ExpectedReadTable, MemoryEvent, MemoryModel, Port, PortAccess,
};
