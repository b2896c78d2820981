//! Dual-port memory scenarios.
//!
//! A scenario is a complete, intentionally sequential event trace that runs
//! as one composite case: its phases depend on each other (fill, then
//! verify), so it is never split into independent vectors.

use parity_config::MemoryConfig;
use parity_model::{MemoryEvent, Port};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// A named memory event trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemoryScenario {
    /// Case name used in the report.
    pub name: String,
    /// Events, at most one per port per cycle.
    pub events: Vec<MemoryEvent>,
}

impl MemoryScenario {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            events: Vec::new(),
        }
    }

    fn write(&mut self, cycle: u64, port: Port, addr: u32, data: u64) {
        self.events.push(MemoryEvent {
            cycle,
            port,
            addr,
            write_enable: true,
            data,
        });
    }

    fn read(&mut self, cycle: u64, port: Port, addr: u32) {
        self.events.push(MemoryEvent {
            cycle,
            port,
            addr,
            write_enable: false,
            data: 0,
        });
    }

    /// Number of clock edges the trace spans.
    pub fn cycles(&self) -> u64 {
        self.events.iter().map(|e| e.cycle + 1).max().unwrap_or(0)
    }
}

fn data_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Writes `base_pattern + i` to every address through port A, then reads
/// every address back through port B.
pub fn fill_then_verify(memory: &MemoryConfig) -> MemoryScenario {
    let mut s = MemoryScenario::new("fill_then_verify");
    let depth = u64::from(memory.depth);
    let mask = data_mask(memory.data_width);
    for i in 0..memory.depth {
        let data = memory.base_pattern.wrapping_add(u64::from(i)) & mask;
        s.write(u64::from(i), Port::A, i, data);
    }
    for i in 0..memory.depth {
        s.read(depth + u64::from(i), Port::B, i);
    }
    s
}

/// Writes each address on one port and reads it back on the other port
/// one cycle later, then repeats with the ports swapped.
///
/// Writes and reads are interleaved so every address is checked at the
/// earliest cycle the write may be visible.
pub fn write_read_sweep(memory: &MemoryConfig) -> MemoryScenario {
    let mut s = MemoryScenario::new("write_read_sweep");
    let depth = u64::from(memory.depth);
    let mask = data_mask(memory.data_width);
    let passes = [(Port::A, Port::B), (Port::B, Port::A)];
    for (pass, (writer, reader)) in passes.into_iter().enumerate() {
        let start = pass as u64 * (depth + 1);
        for i in 0..memory.depth {
            let cycle = start + u64::from(i);
            let data = !memory
                .base_pattern
                .wrapping_add(u64::from(i) + pass as u64 * depth)
                & mask;
            s.write(cycle, writer, i, data);
            s.read(cycle + 1, reader, i);
        }
    }
    s
}

/// Both ports write distinct addresses in the same cycle, then each reads
/// back its own address and the other port's.
pub fn dual_port_write(memory: &MemoryConfig) -> Option<MemoryScenario> {
    if memory.depth < 2 {
        return None;
    }
    let addr_a = 10 % memory.depth;
    let mut addr_b = 20 % memory.depth;
    if addr_b == addr_a {
        addr_b = (addr_a + 1) % memory.depth;
    }
    let mask = data_mask(memory.data_width);

    let mut s = MemoryScenario::new("dual_port_write");
    s.write(0, Port::A, addr_a, 0x1111_2222 & mask);
    s.write(0, Port::B, addr_b, 0x3333_4444 & mask);
    s.read(1, Port::A, addr_a);
    s.read(1, Port::B, addr_b);
    s.read(2, Port::A, addr_b);
    s.read(2, Port::B, addr_a);
    Some(s)
}

/// Read-after-write latency on the writing port and across ports.
pub fn read_after_write(memory: &MemoryConfig) -> MemoryScenario {
    let addr = memory.depth / 2;
    let other = (addr + 1) % memory.depth;
    let mask = data_mask(memory.data_width);

    let mut s = MemoryScenario::new("read_after_write");
    s.write(0, Port::A, addr, 0x0F0F_0F0F & mask);
    s.read(0, Port::B, addr);
    s.read(1, Port::A, addr);
    s.read(1, Port::B, addr);
    s.write(2, Port::B, addr, 0x5A5A_5A5A & mask);
    s.read(2, Port::A, addr);
    s.read(3, Port::A, addr);
    if other != addr {
        s.write(3, Port::B, other, 0x1234_5678 & mask);
        s.read(4, Port::A, other);
    }
    s
}

/// Both ports write the same address in the same cycle, then a single-port
/// write resolves it.
pub fn same_address_collision(memory: &MemoryConfig) -> MemoryScenario {
    let addr = 5 % memory.depth;
    let mask = data_mask(memory.data_width);

    let mut s = MemoryScenario::new("same_address_collision");
    s.write(0, Port::A, addr, 0xAAAA_AAAA & mask);
    s.write(0, Port::B, addr, 0x5555_5555 & mask);
    s.read(1, Port::A, addr);
    s.read(1, Port::B, addr);
    s.write(2, Port::A, addr, 0x0BAD_F00D & mask);
    s.read(3, Port::B, addr);
    s
}

/// Seeded random traffic on both ports over a small address window, so
/// reads frequently hit words written earlier in the trace.
pub fn random_traffic(memory: &MemoryConfig, seed: u64) -> MemoryScenario {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x6D65_6D6F_7279);
    let window = memory.depth.min(16);
    let mask = data_mask(memory.data_width);

    let mut s = MemoryScenario::new("random_traffic");
    for cycle in 0..memory.random_cycles as u64 {
        for port in Port::ALL {
            let addr = rng.gen_range(0..window);
            if rng.gen_bool(0.5) {
                s.write(cycle, port, addr, rng.gen::<u64>() & mask);
            } else {
                s.read(cycle, port, addr);
            }
        }
    }
    s
}

/// Every scenario the memory suite runs, in order.
pub fn memory_scenarios(memory: &MemoryConfig, seed: u64) -> Vec<MemoryScenario> {
    let mut scenarios = vec![fill_then_verify(memory), write_read_sweep(memory)];
    scenarios.extend(dual_port_write(memory));
    scenarios.push(read_after_write(memory));
    scenarios.push(same_address_collision(memory));
    if memory.random_cycles > 0 {
        scenarios.push(random_traffic(memory, seed));
    }
    scenarios
}
