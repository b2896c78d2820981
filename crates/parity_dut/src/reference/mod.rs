//! Register-transfer style reference models.
//!
//! These models are written against raw bit patterns with explicit masks and
//! sign extension, independently of the golden model, so that running the
//! harness against them is a genuine differential check. Each model can
//! inject a single known defect.

mod bram;
mod butterfly;

pub use bram::{BramFault, DualPortBram, BRAM_DUT_NAME};
pub use butterfly::{ButterflyFault, ButterflyUnit, BUTTERFLY_DUT_NAME};

/// Arithmetic shift right of a 16-bit pattern.
fn asr16(x: u16, n: u32) -> u16 {
    if x & 0x8000 != 0 {
        (x >> n) | !(u16::MAX >> n)
    } else {
        x >> n
    }
}

/// Arithmetic shift right of a 32-bit pattern.
fn asr32(x: u32, n: u32) -> u32 {
    if x & 0x8000_0000 != 0 {
        (x >> n) | !(u32::MAX >> n)
    } else {
        x >> n
    }
}

/// Sign-extends a 16-bit pattern to 32 bits.
fn sext32(x: u16) -> u32 {
    if x & 0x8000 != 0 {
        u32::from(x) | 0xFFFF_0000
    } else {
        u32::from(x)
    }
}
