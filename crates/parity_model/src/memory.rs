//! Read/write ordering model of a synchronous dual-port memory.
//!
//! Each clock edge a port presents an address, a write-enable and write data.
//! The port's registered output after edge `n` holds the word at its address
//! as committed *before* edge `n`; writes presented at edge `n` commit at
//! that edge and become visible to reads strobed at edge `n + 1`.
//!
//! Words whose value the contract leaves open are tracked explicitly and
//! surface as [`Expected::DontCare`] instead of a guessed value.

use std::collections::BTreeMap;
use std::fmt;

use parity_config::CollisionPolicy;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// A memory port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Port {
    /// Port A.
    A,
    /// Port B.
    B,
}

impl Port {
    /// Both ports, in index order.
    pub const ALL: [Port; 2] = [Port::A, Port::B];

    /// Zero-based index of the port.
    pub fn index(self) -> usize {
        match self {
            Port::A => 0,
            Port::B => 1,
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::A => write!(f, "A"),
            Port::B => write!(f, "B"),
        }
    }
}

/// What one port drives during one clock cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortAccess {
    /// Word address, within `[0, depth)`.
    pub addr: u32,
    /// Whether `data` is committed at this edge.
    pub write_enable: bool,
    /// Write data; ignored when `write_enable` is low.
    pub data: u64,
}

impl PortAccess {
    /// A read-only access.
    pub fn read(addr: u32) -> Self {
        Self {
            addr,
            write_enable: false,
            data: 0,
        }
    }

    /// A write access.
    pub fn write(addr: u32, data: u64) -> Self {
        Self {
            addr,
            write_enable: true,
            data,
        }
    }
}

/// One port's stimulus at one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEvent {
    /// Clock edge index, starting at 0.
    pub cycle: u64,
    /// The driving port.
    pub port: Port,
    /// Address presented.
    pub addr: u32,
    /// Write enable.
    pub write_enable: bool,
    /// Write data.
    pub data: u64,
}

impl MemoryEvent {
    /// The access part of the event.
    pub fn access(&self) -> PortAccess {
        PortAccess {
            addr: self.addr,
            write_enable: self.write_enable,
            data: self.data,
        }
    }
}

/// Why a read has no defined value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DontCareReason {
    /// The word was never written.
    Uninitialized,
    /// The word was last written by both ports in the same cycle.
    Collision,
    /// The word is being written in the same cycle it is read.
    ReadDuringWrite,
}

impl fmt::Display for DontCareReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DontCareReason::Uninitialized => write!(f, "uninitialized word"),
            DontCareReason::Collision => write!(f, "dual-port write collision"),
            DontCareReason::ReadDuringWrite => write!(f, "read during write"),
        }
    }
}

/// The expected registered output of a port after one edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expected {
    /// The output must equal this word exactly.
    Exact(u64),
    /// Any output is acceptable.
    DontCare(DontCareReason),
}

impl Expected {
    /// Returns the exact value, if one is required.
    pub fn exact(self) -> Option<u64> {
        match self {
            Expected::Exact(v) => Some(v),
            Expected::DontCare(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Unwritten,
    Known(u64),
    Collided,
}

/// Committed contents of the memory plus the ordering rules.
#[derive(Clone, Debug)]
pub struct MemoryModel {
    cells: Vec<Cell>,
    data_mask: u64,
    collision: CollisionPolicy,
}

impl MemoryModel {
    /// Creates an empty (unwritten) memory.
    pub fn new(depth: u32, data_width: u32, collision: CollisionPolicy) -> Self {
        let data_mask = if data_width >= 64 {
            u64::MAX
        } else {
            (1u64 << data_width) - 1
        };
        Self {
            cells: vec![Cell::Unwritten; depth as usize],
            data_mask,
            collision,
        }
    }

    /// Number of words.
    pub fn depth(&self) -> u32 {
        self.cells.len() as u32
    }

    /// Mask applied to written data.
    pub fn data_mask(&self) -> u64 {
        self.data_mask
    }

    fn check(&self, port: Port, access: &PortAccess) -> Result<(), ModelError> {
        if access.addr >= self.depth() {
            return Err(ModelError::AddressOutOfRange {
                port,
                addr: access.addr,
                depth: self.depth(),
            });
        }
        Ok(())
    }

    /// Expected value of a read of `addr` against the committed contents.
    pub fn peek(&self, addr: u32) -> Expected {
        match self.cells.get(addr as usize) {
            Some(Cell::Known(v)) => Expected::Exact(*v),
            Some(Cell::Collided) => Expected::DontCare(DontCareReason::Collision),
            Some(Cell::Unwritten) | None => Expected::DontCare(DontCareReason::Uninitialized),
        }
    }

    /// Applies one clock edge. `None` means the port is idle this cycle.
    ///
    /// Returns each port's expected registered output after the edge, or
    /// `None` for an idle port.
    pub fn clock(
        &mut self,
        a: Option<PortAccess>,
        b: Option<PortAccess>,
    ) -> Result<[Option<Expected>; 2], ModelError> {
        let accesses = [a, b];
        for (port, access) in Port::ALL.iter().zip(&accesses) {
            if let Some(access) = access {
                self.check(*port, access)?;
            }
        }

        let written = |addr: u32| {
            accesses
                .iter()
                .flatten()
                .any(|acc| acc.write_enable && acc.addr == addr)
        };
        let reads = accesses.map(|access| {
            access.map(|acc| {
                if written(acc.addr) {
                    Expected::DontCare(DontCareReason::ReadDuringWrite)
                } else {
                    self.peek(acc.addr)
                }
            })
        });

        match (a.filter(|x| x.write_enable), b.filter(|x| x.write_enable)) {
            (Some(wa), Some(wb)) if wa.addr == wb.addr => {
                let cell = match self.collision {
                    CollisionPolicy::DontCare => Cell::Collided,
                    CollisionPolicy::PortAWins => Cell::Known(wa.data & self.data_mask),
                    CollisionPolicy::PortBWins => Cell::Known(wb.data & self.data_mask),
                };
                self.cells[wa.addr as usize] = cell;
            }
            (wa, wb) => {
                for w in [wa, wb].into_iter().flatten() {
                    self.cells[w.addr as usize] = Cell::Known(w.data & self.data_mask);
                }
            }
        }
        Ok(reads)
    }

    /// Builds the expected read table for a complete event trace.
    ///
    /// Events may arrive in any order; they are replayed by cycle. Cycles
    /// with no event for a port leave that port idle. The model starts from
    /// its current contents.
    pub fn expected_reads(
        &mut self,
        events: &[MemoryEvent],
    ) -> Result<ExpectedReadTable, ModelError> {
        let mut by_cycle: BTreeMap<u64, [Option<PortAccess>; 2]> = BTreeMap::new();
        for event in events {
            let slot = &mut by_cycle.entry(event.cycle).or_default()[event.port.index()];
            if slot.is_some() {
                return Err(ModelError::DuplicateEvent {
                    port: event.port,
                    cycle: event.cycle,
                });
            }
            *slot = Some(event.access());
        }

        let mut table = ExpectedReadTable::default();
        for (cycle, [a, b]) in by_cycle {
            let outputs = self.clock(a, b)?;
            for (port, expected) in Port::ALL.into_iter().zip(outputs) {
                if let Some(expected) = expected {
                    table.entries.insert((port, cycle), expected);
                }
            }
        }
        Ok(table)
    }
}

/// Expected registered output per `(port, cycle)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExpectedReadTable {
    entries: BTreeMap<(Port, u64), Expected>,
}

impl ExpectedReadTable {
    /// The expectation for a port after a given edge.
    pub fn get(&self, port: Port, cycle: u64) -> Option<Expected> {
        self.entries.get(&(port, cycle)).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries ordered by port, then cycle.
    pub fn iter(&self) -> impl Iterator<Item = (Port, u64, Expected)> + '_ {
        self.entries
            .iter()
            .map(|(&(port, cycle), &expected)| (port, cycle, expected))
    }

    /// Number of entries that require an exact value.
    pub fn exact_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, Expected::Exact(_)))
            .count()
    }
}
