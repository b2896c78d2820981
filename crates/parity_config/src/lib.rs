//! Parsing and validation of `parity.toml` harness configuration files.
//!
//! This crate reads the harness configuration and produces a strongly-typed
//! [`HarnessConfig`] covering fixed-point parameters, clock/reset timing,
//! stimulus generation, memory geometry and the DUT field-name maps.
//! Every value is validated up front so that a bad configuration fails the
//! run before any vector is driven.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{
    load_config, load_config_from_str, validate_config, CONFIG_FILE_NAME, MAX_TOLERANCE,
};
pub use types::*;
