//! Butterfly test vectors: the built-in directed set, vectors declared in
//! the configuration, and seeded random vectors.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use parity_config::{DirectedVectorSpec, StimulusConfig};
use parity_model::{butterfly, ButterflyOutput, ComplexFx, QFormat, Twiddle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Explicit expected outputs that replace the golden model's.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExpectOverride {
    /// Replacement for the sum output.
    pub out_a: Option<ComplexFx>,
    /// Replacement for the rotated difference output.
    pub out_b: Option<ComplexFx>,
}

/// One butterfly test case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestVector {
    /// Case name used in the report.
    pub name: String,
    /// Operand A.
    pub a: ComplexFx,
    /// Operand B.
    pub b: ComplexFx,
    /// Twiddle factor.
    pub w: Twiddle,
    /// Optional expected-value override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<ExpectOverride>,
}

impl TestVector {
    /// Builds a vector with no override.
    pub fn new(name: impl Into<String>, a: ComplexFx, b: ComplexFx, w: Twiddle) -> Self {
        Self {
            name: name.into(),
            a,
            b,
            w,
            expect: None,
        }
    }

    /// Golden-model outputs, with any override applied.
    pub fn expected(&self, format: QFormat) -> ButterflyOutput {
        let mut out = butterfly(self.a, self.b, self.w, format);
        if let Some(over) = self.expect {
            out.out_a = over.out_a.unwrap_or(out.out_a);
            out.out_b = over.out_b.unwrap_or(out.out_b);
        }
        out
    }

    /// Input values in `[a_re, a_im, b_re, b_im, w_re, w_im]` order.
    pub fn operands(&self) -> [i64; 6] {
        let w = self.w.value();
        [self.a.re, self.a.im, self.b.re, self.b.im, w.re, w.im].map(i64::from)
    }
}

fn c(re: i16, im: i16) -> ComplexFx {
    ComplexFx::new(re, im)
}

/// The built-in directed edge cases.
pub fn directed_vectors(format: QFormat) -> Vec<TestVector> {
    let unity = Twiddle::from_angle(0.0, format);
    vec![
        TestVector::new("identity", c(1200, -300), c(200, 100), unity),
        TestVector::new(
            "rotate_90",
            c(1000, 0),
            c(500, 0),
            Twiddle::from_angle(FRAC_PI_2, format),
        ),
        TestVector::new(
            "rotate_45",
            c(5000, 0),
            c(1000, 0),
            Twiddle::from_angle(FRAC_PI_4, format),
        ),
        TestVector::new(
            "rotate_minus_135",
            c(-700, 2500),
            c(300, -1500),
            Twiddle::from_angle(-3.0 * FRAC_PI_4, format),
        ),
        TestVector::new("cancellation", c(500, 0), c(500, 0), unity),
        TestVector::new("negative_operands", c(-1001, -3), c(-2, -2), unity),
        TestVector::new("overflow_sum", c(30000, 0), c(30000, 0), unity),
        TestVector::new("overflow_difference", c(30000, -30000), c(-30000, 30000), unity),
        TestVector::new(
            "boundary_max",
            c(i16::MAX, i16::MAX),
            c(i16::MAX, i16::MAX),
            unity,
        ),
        TestVector::new(
            "boundary_min_twiddle",
            c(i16::MIN, i16::MIN),
            c(0, 0),
            Twiddle::from_raw(i16::MIN, i16::MIN),
        ),
    ]
}

/// Converts configuration-declared vectors.
///
/// Values were range-checked when the configuration was validated.
pub fn configured_vectors(specs: &[DirectedVectorSpec], format: QFormat) -> Vec<TestVector> {
    let pair = |[re, im]: [i64; 2]| ComplexFx::from_wrapped(re, im);
    specs
        .iter()
        .map(|spec| {
            let w = match (spec.w, spec.w_raw) {
                (_, Some([re, im])) => Twiddle::from_raw(re as i16, im as i16),
                (Some([cos, sin]), None) => Twiddle::from_cos_sin(cos, sin, format),
                (None, None) => Twiddle::from_angle(0.0, format),
            };
            let expect = (spec.expect_a.is_some() || spec.expect_b.is_some()).then(|| {
                ExpectOverride {
                    out_a: spec.expect_a.map(pair),
                    out_b: spec.expect_b.map(pair),
                }
            });
            TestVector {
                name: spec.name.clone(),
                a: pair(spec.a),
                b: pair(spec.b),
                w,
                expect,
            }
        })
        .collect()
}

/// Seeded random vectors: operands uniform over the configured range,
/// twiddle components uniform over `[-1, 1]`.
///
/// The same seed always yields the same vectors.
pub fn random_vectors(stimulus: &StimulusConfig, format: QFormat) -> Vec<TestVector> {
    let mut rng = StdRng::seed_from_u64(stimulus.seed);
    let (lo, hi) = (stimulus.operand_min, stimulus.operand_max);
    let width = stimulus.random_cases.to_string().len().max(3);
    (0..stimulus.random_cases)
        .map(|i| {
            let mut operand = || rng.gen_range(lo..=hi);
            let a = ComplexFx::from_wrapped(operand(), operand());
            let b = ComplexFx::from_wrapped(operand(), operand());
            let w = Twiddle::from_cos_sin(
                rng.gen_range(-1.0..=1.0),
                rng.gen_range(-1.0..=1.0),
                format,
            );
            TestVector::new(format!("random_{i:0width$}"), a, b, w)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stimulus(seed: u64, cases: usize) -> StimulusConfig {
        StimulusConfig {
            seed,
            random_cases: cases,
            ..StimulusConfig::default()
        }
    }

    #[test]
    fn directed_set_names_are_unique() {
        let vectors = directed_vectors(QFormat::Q15);
        let mut names: Vec<_> = vectors.iter().map(|v| v.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), vectors.len());
    }

    #[test]
    fn directed_identity_uses_unity_twiddle() {
        let vectors = directed_vectors(QFormat::Q15);
        let identity = vectors.iter().find(|v| v.name == "identity").unwrap();
        assert_eq!(identity.w, Twiddle::from_raw(32767, 0));
    }

    #[test]
    fn overflow_vector_wraps_in_golden_model() {
        let vectors = directed_vectors(QFormat::Q15);
        let v = vectors.iter().find(|v| v.name == "overflow_sum").unwrap();
        assert_eq!(v.expected(QFormat::Q15).out_a, c(-2768, 0));
    }

    #[test]
    fn operands_in_port_order() {
        let v = TestVector::new("x", c(1, 2), c(3, 4), Twiddle::from_raw(5, 6));
        assert_eq!(v.operands(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn override_replaces_one_output() {
        let mut v = TestVector::new("x", c(1000, 0), c(500, 0), Twiddle::from_raw(0, 32767));
        v.expect = Some(ExpectOverride {
            out_a: Some(c(1000, 500)),
            out_b: None,
        });
        let out = v.expected(QFormat::Q15);
        assert_eq!(out.out_a, c(1000, 500));
        assert_eq!(out.out_b, c(0, 499));
    }

    #[test]
    fn configured_vector_with_real_twiddle() {
        let spec = DirectedVectorSpec {
            name: "cfg".into(),
            a: [100, -100],
            b: [50, 50],
            w: Some([0.0, 1.0]),
            w_raw: None,
            expect_a: None,
            expect_b: Some([0, 500]),
        };
        let v = &configured_vectors(&[spec], QFormat::Q15)[0];
        assert_eq!(v.w, Twiddle::from_raw(0, 32767));
        assert_eq!(v.a, c(100, -100));
        assert_eq!(
            v.expect,
            Some(ExpectOverride {
                out_a: None,
                out_b: Some(c(0, 500))
            })
        );
    }

    #[test]
    fn configured_vector_with_raw_twiddle() {
        let spec = DirectedVectorSpec {
            name: "raw".into(),
            a: [1, 2],
            b: [3, 4],
            w: None,
            w_raw: Some([-32768, 16384]),
            expect_a: None,
            expect_b: None,
        };
        let v = &configured_vectors(&[spec], QFormat::Q15)[0];
        assert_eq!(v.w, Twiddle::from_raw(-32768, 16384));
        assert_eq!(v.expect, None);
    }

    #[test]
    fn random_vectors_are_reproducible() {
        let first = random_vectors(&stimulus(42, 50), QFormat::Q15);
        let again = random_vectors(&stimulus(42, 50), QFormat::Q15);
        assert_eq!(first, again);
        assert_eq!(first.len(), 50);
    }

    #[test]
    fn different_seeds_differ() {
        let a = random_vectors(&stimulus(1, 20), QFormat::Q15);
        let b = random_vectors(&stimulus(2, 20), QFormat::Q15);
        assert_ne!(a, b);
    }

    #[test]
    fn random_operands_respect_range() {
        let cfg = StimulusConfig {
            operand_min: -100,
            operand_max: 100,
            ..stimulus(7, 200)
        };
        for v in random_vectors(&cfg, QFormat::Q15) {
            for x in &v.operands()[..4] {
                assert!((-100..=100).contains(x), "{} out of range: {x}", v.name);
            }
        }
    }

    #[test]
    fn random_names_are_zero_padded() {
        let vectors = random_vectors(&stimulus(3, 100), QFormat::Q15);
        assert_eq!(vectors[0].name, "random_000");
        assert_eq!(vectors[99].name, "random_099");
    }

    #[test]
    fn vector_serializes_to_json() {
        let v = TestVector::new("x", c(1, 2), c(3, 4), Twiddle::from_raw(5, 6));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["name"], "x");
        assert_eq!(json["a"]["re"], 1);
        assert!(json.get("expect").is_none());
    }
}
