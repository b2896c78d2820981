//! Bit-accurate model of the radix-2 butterfly unit.
//!
//! ```text
//! sum   = A + B            (16-bit wrap)
//! OutA  = sum >>> 1
//! diff  = A - B            (16-bit wrap)
//! prod  = diff * W         (32-bit accumulators)
//! OutB  = prod >>> frac_bits, truncated to 16 bits
//! ```

use serde::{Deserialize, Serialize};

use crate::fixed::{ComplexFx, QFormat, Twiddle};

/// The two outputs of a butterfly evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButterflyOutput {
    /// Halved sum `(A + B) >> 1`.
    pub out_a: ComplexFx,
    /// Rotated difference `((A - B) * W) >> frac_bits`.
    pub out_b: ComplexFx,
}

impl ButterflyOutput {
    /// Outputs flattened as `[out_a.re, out_a.im, out_b.re, out_b.im]`.
    pub fn to_fields(self) -> [i64; 4] {
        [
            i64::from(self.out_a.re),
            i64::from(self.out_a.im),
            i64::from(self.out_b.re),
            i64::from(self.out_b.im),
        ]
    }
}

/// Evaluates the butterfly for one operand set.
pub fn butterfly(a: ComplexFx, b: ComplexFx, w: Twiddle, format: QFormat) -> ButterflyOutput {
    let out_a = a.wrapping_add(b).shr(1);
    let out_b = a.wrapping_sub(b).widening_mul(w.value()).narrow(format);
    ButterflyOutput { out_a, out_b }
}
