//! Pipelined radix-2 butterfly unit.
//!
//! Port list mirrors the RTL: active-low `rst_n`, clock enable `en`,
//! `valid_in`, six signed 16-bit operand inputs, four signed 16-bit outputs
//! and `valid_out`. The clock is implicit in [`DutAdapter::step`].

use serde::{Deserialize, Serialize};

use super::{asr16, asr32, sext32};
use crate::adapter::DutAdapter;
use crate::error::DutError;
use crate::field::{FieldBank, FieldDecl};

/// Name reported by [`ButterflyUnit`].
pub const BUTTERFLY_DUT_NAME: &str = "butterfly_unit";

const OPERANDS: [&str; 6] = ["a_re", "a_im", "b_re", "b_im", "w_re", "w_im"];
const RESULTS: [&str; 4] = ["out_a_re", "out_a_im", "out_b_re", "out_b_im"];

/// Known defects the butterfly model can exhibit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButterflyFault {
    /// `A + B` clamps at the 16-bit limits instead of wrapping.
    SaturatingSum,
    /// The product is rounded half-up before the scale shift.
    RoundedProduct,
    /// The imaginary twiddle component is negated.
    ConjugateTwiddle,
    /// `valid_out` never asserts.
    NeverValid,
    /// The pipeline has one more register stage than documented.
    ExtraLatency,
}

impl ButterflyFault {
    /// Every fault, for CLI listings.
    pub const ALL: [ButterflyFault; 5] = [
        ButterflyFault::SaturatingSum,
        ButterflyFault::RoundedProduct,
        ButterflyFault::ConjugateTwiddle,
        ButterflyFault::NeverValid,
        ButterflyFault::ExtraLatency,
    ];

    /// Kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            ButterflyFault::SaturatingSum => "saturating-sum",
            ButterflyFault::RoundedProduct => "rounded-product",
            ButterflyFault::ConjugateTwiddle => "conjugate-twiddle",
            ButterflyFault::NeverValid => "never-valid",
            ButterflyFault::ExtraLatency => "extra-latency",
        }
    }

    /// Parses a kebab-case name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Stage {
    valid: bool,
    data: [u16; 4],
}

/// Cycle model of the butterfly unit.
#[derive(Clone, Debug)]
pub struct ButterflyUnit {
    bank: FieldBank,
    stages: Vec<Stage>,
    frac_bits: u32,
    fault: Option<ButterflyFault>,
}

impl ButterflyUnit {
    /// Creates a unit with `latency` register stages (at least one) and
    /// Q1.15 scaling.
    pub fn new(latency: u32) -> Self {
        let mut decls = vec![
            FieldDecl::input("rst_n", 1, false),
            FieldDecl::input("en", 1, false),
            FieldDecl::input("valid_in", 1, false),
        ];
        decls.extend(OPERANDS.iter().map(|n| FieldDecl::input(*n, 16, true)));
        decls.extend(RESULTS.iter().map(|n| FieldDecl::output(*n, 16, true)));
        decls.push(FieldDecl::output("valid_out", 1, false));

        Self {
            bank: FieldBank::new(BUTTERFLY_DUT_NAME, decls),
            stages: vec![Stage::default(); latency.max(1) as usize],
            frac_bits: 15,
            fault: None,
        }
    }

    /// Overrides the scale shift (number of fractional bits, 1 to 15).
    pub fn with_frac_bits(mut self, frac_bits: u32) -> Self {
        self.frac_bits = frac_bits.clamp(1, 15);
        self
    }

    /// Injects a defect.
    pub fn with_fault(mut self, fault: ButterflyFault) -> Self {
        if fault == ButterflyFault::ExtraLatency {
            self.stages.push(Stage::default());
        }
        self.fault = Some(fault);
        self
    }

    /// Actual number of register stages.
    pub fn pipeline_depth(&self) -> usize {
        self.stages.len()
    }

    fn has_fault(&self, fault: ButterflyFault) -> bool {
        self.fault == Some(fault)
    }

    fn add16(&self, x: u16, y: u16) -> u16 {
        if self.has_fault(ButterflyFault::SaturatingSum) {
            let s = i32::from(x as i16) + i32::from(y as i16);
            s.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as u16
        } else {
            x.wrapping_add(y)
        }
    }

    /// Combinational datapath feeding the first register stage.
    fn datapath(&self) -> [u16; 4] {
        let [a_re, a_im, b_re, b_im, w_re, mut w_im] =
            OPERANDS.map(|name| self.bank.raw(name) as u16);
        if self.has_fault(ButterflyFault::ConjugateTwiddle) {
            w_im = w_im.wrapping_neg();
        }

        let sum_re = self.add16(a_re, b_re);
        let sum_im = self.add16(a_im, b_im);

        let d_re = sext32(a_re.wrapping_sub(b_re));
        let d_im = sext32(a_im.wrapping_sub(b_im));
        let (w_re, w_im) = (sext32(w_re), sext32(w_im));
        let p_re = d_re.wrapping_mul(w_re).wrapping_sub(d_im.wrapping_mul(w_im));
        let p_im = d_re.wrapping_mul(w_im).wrapping_add(d_im.wrapping_mul(w_re));

        let bias = if self.has_fault(ButterflyFault::RoundedProduct) {
            1u32 << (self.frac_bits - 1)
        } else {
            0
        };

        [
            asr16(sum_re, 1),
            asr16(sum_im, 1),
            asr32(p_re.wrapping_add(bias), self.frac_bits) as u16,
            asr32(p_im.wrapping_add(bias), self.frac_bits) as u16,
        ]
    }

    fn drive_outputs(&mut self, stage: Stage) {
        for (name, bits) in RESULTS.iter().zip(stage.data) {
            self.bank.drive(name, u64::from(bits));
        }
        let valid = stage.valid && !self.has_fault(ButterflyFault::NeverValid);
        self.bank.drive("valid_out", u64::from(valid));
    }
}

impl DutAdapter for ButterflyUnit {
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
        if self.bank.raw("rst_n") == 0 {
            self.stages.fill(Stage::default());
            self.drive_outputs(Stage::default());
            tracing::trace!(dut = BUTTERFLY_DUT_NAME, "reset");
            return Ok(());
        }
        if self.bank.raw("en") == 0 {
            return Ok(());
        }

        let incoming = Stage {
            valid: self.bank.raw("valid_in") == 1,
            data: self.datapath(),
        };
        self.stages.rotate_right(1);
        self.stages[0] = incoming;
        let last = self.stages[self.stages.len() - 1];
        self.drive_outputs(last);
        tracing::trace!(
            dut = BUTTERFLY_DUT_NAME,
            valid_out = last.valid,
            "clock edge"
        );
        Ok(())
    }

    fn get(&self, field: &str) -> Result<i64, DutError> {
        self.bank.get(field)
    }
}
