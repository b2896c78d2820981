//! Errors raised when a model is fed input that violates its contract.

use crate::memory::Port;

/// Contract violations detected by the golden models.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// A memory event addressed a word outside `[0, depth)`.
    #[error("port {port} address {addr} is outside a memory of depth {depth}")]
    AddressOutOfRange {
        /// The offending port.
        port: Port,
        /// The requested address.
        addr: u32,
        /// The configured memory depth.
        depth: u32,
    },

    /// Two events were given for the same port in the same cycle.
    #[error("port {port} has more than one event in cycle {cycle}")]
    DuplicateEvent {
        /// The offending port.
        port: Port,
        /// The cycle index.
        cycle: u64,
    },
}
