//! Synchronous dual-port block RAM with registered, read-first outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::adapter::DutAdapter;
use crate::error::DutError;
use crate::field::{FieldBank, FieldDecl};

/// Name reported by [`DualPortBram`].
pub const BRAM_DUT_NAME: &str = "dual_port_bram";

/// Known defects the memory model can exhibit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BramFault {
    /// When both ports write in the same cycle, port A's data lands at
    /// port B's address too.
    CrossPortWrite,
    /// The output register samples the previous cycle's address.
    LateRead,
    /// One output bit reads as 1 on both ports.
    StuckBit(u32),
    /// Port A writes to odd addresses commit one edge late.
    SlowOddWrites,
}

impl BramFault {
    /// Parses `cross-port-write`, `late-read`, `slow-odd-writes` or
    /// `stuck-bit[:N]`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cross-port-write" => Some(BramFault::CrossPortWrite),
            "late-read" => Some(BramFault::LateRead),
            "slow-odd-writes" => Some(BramFault::SlowOddWrites),
            "stuck-bit" => Some(BramFault::StuckBit(0)),
            _ => name
                .strip_prefix("stuck-bit:")
                .and_then(|bit| bit.parse().ok())
                .map(BramFault::StuckBit),
        }
    }
}

impl fmt::Display for BramFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BramFault::CrossPortWrite => write!(f, "cross-port-write"),
            BramFault::LateRead => write!(f, "late-read"),
            BramFault::StuckBit(bit) => write!(f, "stuck-bit:{bit}"),
            BramFault::SlowOddWrites => write!(f, "slow-odd-writes"),
        }
    }
}

/// Per-port field names, in `[we, addr, din, dout]` order.
const PORT_FIELDS: [[&str; 4]; 2] = [
    ["we_a", "addr_a", "din_a", "dout_a"],
    ["we_b", "addr_b", "din_b", "dout_b"],
];

/// Cycle model of a true dual-port RAM.
#[derive(Clone, Debug)]
pub struct DualPortBram {
    bank: FieldBank,
    words: Vec<u64>,
    prev_addr: [usize; 2],
    /// Write held back by [`BramFault::SlowOddWrites`].
    deferred: Option<(usize, u64)>,
    fault: Option<BramFault>,
}

impl DualPortBram {
    /// Creates a zero-filled memory of `depth` words, `data_width` bits each.
    pub fn new(depth: u32, data_width: u32) -> Self {
        let depth = depth.max(1);
        let addr_width = (u32::BITS - (depth - 1).leading_zeros()).max(1);
        let data_width = data_width.clamp(1, 64);

        let mut decls = Vec::new();
        for [we, addr, din, dout] in PORT_FIELDS {
            decls.push(FieldDecl::input(we, 1, false));
            decls.push(FieldDecl::input(addr, addr_width, false));
            decls.push(FieldDecl::input(din, data_width, false));
            decls.push(FieldDecl::output(dout, data_width, false));
        }

        Self {
            bank: FieldBank::new(BRAM_DUT_NAME, decls),
            words: vec![0; depth as usize],
            prev_addr: [0; 2],
            deferred: None,
            fault: None,
        }
    }

    /// Injects a defect.
    pub fn with_fault(mut self, fault: BramFault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Number of words.
    pub fn depth(&self) -> usize {
        self.words.len()
    }

    fn port_inputs(&self, port: usize) -> (bool, usize, u64) {
        let [we, addr, din, _] = PORT_FIELDS[port];
        (
            self.bank.raw(we) == 1,
            self.bank.raw(addr) as usize,
            self.bank.raw(din),
        )
    }
}

impl DutAdapter for DualPortBram {
    fn name(&self) -> &str {
        self.bank.dut()
    }

    fn fields(&self) -> &[FieldDecl] {
        self.bank.decls()
    }

    fn set(&mut self, field: &str, value: i64) -> Result<(), DutError> {
        self.bank.set_input(field, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        let ports = [self.port_inputs(0), self.port_inputs(1)];

        // Outputs register the pre-edge contents.
        for (port, (_, addr, _)) in ports.iter().enumerate() {
            let read_addr = match self.fault {
                Some(BramFault::LateRead) => self.prev_addr[port],
                _ => *addr,
            };
            let mut word = self.words.get(read_addr).copied().unwrap_or(0);
            if let Some(BramFault::StuckBit(bit)) = self.fault {
                word |= 1u64.checked_shl(bit).unwrap_or(0);
            }
            self.bank.drive(PORT_FIELDS[port][3], word);
            self.prev_addr[port] = *addr;
        }

        if let Some((addr, data)) = self.deferred.take() {
            if let Some(word) = self.words.get_mut(addr) {
                *word = data;
            }
        }

        let [(we_a, addr_a, din_a), (we_b, addr_b, din_b)] = ports;
        if we_a && addr_a % 2 == 1 && self.fault == Some(BramFault::SlowOddWrites) {
            self.deferred = Some((addr_a, din_a));
        } else if we_a {
            if let Some(word) = self.words.get_mut(addr_a) {
                *word = din_a;
            }
        }
        if we_b {
            let data = if we_a && self.fault == Some(BramFault::CrossPortWrite) {
                din_a
            } else {
                din_b
            };
            if let Some(word) = self.words.get_mut(addr_b) {
                *word = data;
            }
        }

        tracing::trace!(dut = BRAM_DUT_NAME, we_a, addr_a, we_b, addr_b, "clock edge");
        Ok(())
    }

    fn get(&self, field: &str) -> Result<i64, DutError> {
        self.bank.get(field)
    }
}
