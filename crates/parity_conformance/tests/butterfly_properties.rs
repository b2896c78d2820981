//! Butterfly properties checked end to end: stimulus through the sequencer
//! into the reference unit, compared against the fixed-point model.

use parity_config::SampleMode;
use parity_conformance::{butterfly_dut, case, failures, harness_with, run_butterfly_suite};
use parity_harness::{CaseOutcome, TestVector};
use parity_model::{butterfly, ComplexFx, QFormat, Twiddle};

// ============================================================================
// Directed cases
// ============================================================================

#[test]
fn default_suite_passes() {
    let harness = harness_with(|_| {});
    let summary = run_butterfly_suite(&harness, None);
    assert!(failures(&summary).is_empty(), "failing: {:?}", failures(&summary));
    assert_eq!(summary.exit_code(), 0);
}

#[test]
fn quarter_turn_rotates_difference() {
    let harness = harness_with(|_| {});
    let summary = run_butterfly_suite(&harness, None);
    let rotate = case(&summary, "rotate_90");
    assert_eq!(rotate.outcome, CaseOutcome::Pass);

    let cmp = rotate.comparison.as_ref().expect("sampled case has a comparison");
    let actual: Vec<i64> = cmp.fields.iter().map(|f| f.actual).collect();
    assert_eq!(&actual[..2], &[750, 0], "OutA is the halved sum");
    assert!(actual[2].abs() <= 2, "OutB.re near 0, got {}", actual[2]);
    assert!((actual[3] - 500).abs() <= 2, "OutB.im near 500, got {}", actual[3]);
}

#[test]
fn cancellation_zeroes_difference() {
    let harness = harness_with(|_| {});
    let summary = run_butterfly_suite(&harness, None);
    let cancel = case(&summary, "cancellation");
    let cmp = cancel.comparison.as_ref().expect("sampled case has a comparison");
    let actual: Vec<i64> = cmp.fields.iter().map(|f| f.actual).collect();
    assert_eq!(actual, vec![500, 0, 0, 0]);
}

#[test]
fn overflow_wraps_instead_of_saturating() {
    let harness = harness_with(|_| {});
    let summary = run_butterfly_suite(&harness, None);
    let cmp = case(&summary, "overflow_sum")
        .comparison
        .as_ref()
        .expect("sampled case has a comparison");
    // 30000 + 30000 wraps to -5536, halved to -2768
    assert_eq!(cmp.fields[0].expected, -2768);
    assert_eq!(cmp.fields[0].actual, -2768);
}

#[test]
fn identity_twiddle_passes_difference_through() {
    let harness = harness_with(|c| {
        c.stimulus.include_directed = false;
        c.stimulus.random_cases = 0;
    });
    let unity = Twiddle::from_angle(0.0, QFormat::Q15);
    let operands = [
        (1200, -300, 200, 100),
        (-1001, -3, -2, -2),
        (15000, -15000, -15000, 15000),
        (0, 0, 0, 0),
    ];
    let vectors: Vec<TestVector> = operands
        .iter()
        .enumerate()
        .map(|(i, &(ar, ai, br, bi))| {
            TestVector::new(
                format!("identity_{i}"),
                ComplexFx::new(ar, ai),
                ComplexFx::new(br, bi),
                unity,
            )
        })
        .collect();

    let mut dut = butterfly_dut(&harness, None);
    let results = harness.run_butterfly(&mut dut, &vectors).unwrap();
    for (v, r) in vectors.iter().zip(&results) {
        assert_eq!(r.outcome, CaseOutcome::Pass, "{}", r.name);
        let actual: Vec<i64> = r
            .comparison
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.actual)
            .collect();
        let sum = v.a.wrapping_add(v.b).shr(1);
        let diff = v.a.wrapping_sub(v.b);
        assert_eq!(actual[0], i64::from(sum.re), "{}", r.name);
        assert_eq!(actual[1], i64::from(sum.im), "{}", r.name);
        assert!((actual[2] - i64::from(diff.re)).abs() <= 2, "{}", r.name);
        assert!((actual[3] - i64::from(diff.im)).abs() <= 2, "{}", r.name);
    }
}

#[test]
fn model_has_no_hidden_state() {
    let w = Twiddle::from_cos_sin(0.3, -0.8, QFormat::Q15);
    let a = ComplexFx::new(-12345, 6789);
    let b = ComplexFx::new(321, -32000);
    let first = butterfly(a, b, w, QFormat::Q15);
    for _ in 0..10 {
        assert_eq!(butterfly(a, b, w, QFormat::Q15), first);
    }
}

#[test]
fn rerunning_a_vector_gives_the_same_verdict() {
    let harness = harness_with(|_| {});
    let vectors = harness.butterfly_vectors();
    let mut dut = butterfly_dut(&harness, None);
    let first = harness.run_butterfly_vector(&mut dut, &vectors[3]).unwrap();
    let second = harness.run_butterfly_vector(&mut dut, &vectors[3]).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Seeded random vectors
// ============================================================================

#[test]
fn hundred_random_vectors_match() {
    let harness = harness_with(|c| {
        c.stimulus.include_directed = false;
        c.stimulus.random_cases = 100;
        c.stimulus.seed = 0xC0FFEE;
    });
    let summary = run_butterfly_suite(&harness, None);
    assert_eq!(summary.cases.len(), 100);
    assert!(failures(&summary).is_empty(), "failing: {:?}", failures(&summary));
}

#[test]
fn same_seed_reproduces_the_run() {
    let build = |seed| {
        harness_with(|c| {
            c.stimulus.random_cases = 25;
            c.stimulus.seed = seed;
        })
    };
    let first = run_butterfly_suite(&build(42), None);
    let again = run_butterfly_suite(&build(42), None);
    assert_eq!(first, again);

    let other = run_butterfly_suite(&build(43), None);
    assert_ne!(
        first.cases.last().map(|c| &c.stimulus),
        other.cases.last().map(|c| &c.stimulus),
        "different seeds should draw different operands"
    );
}

// ============================================================================
// Sampling modes and parallel runs
// ============================================================================

#[test]
fn fixed_sampling_passes_on_correct_latency() {
    let harness = harness_with(|c| {
        c.timing.sample = SampleMode::Fixed;
        c.stimulus.random_cases = 20;
    });
    let summary = run_butterfly_suite(&harness, None);
    assert!(summary.is_success(), "failing: {:?}", failures(&summary));
}

#[test]
fn parallel_run_matches_sequential() {
    let harness = harness_with(|c| c.stimulus.random_cases = 64);
    let vectors = harness.butterfly_vectors();

    let mut dut = butterfly_dut(&harness, None);
    let sequential = harness.run_butterfly(&mut dut, &vectors).unwrap();
    let parallel = harness
        .run_butterfly_parallel(|| butterfly_dut(&harness, None), &vectors)
        .unwrap();
    assert_eq!(sequential, parallel);
}
