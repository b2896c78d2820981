//! The comparator: one deterministic verdict per case.

use serde::Serialize;

/// One compared value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldComparison {
    /// What was compared, e.g. `out_b_re` or `dout_b@cycle 12`.
    pub field: String,
    /// Value from the golden model.
    pub expected: i64,
    /// Value observed on the DUT.
    pub actual: i64,
    /// Distance between `actual` and `expected`.
    pub delta: u64,
}

impl FieldComparison {
    /// Compares one value.
    pub fn new(field: impl Into<String>, expected: i64, actual: i64) -> Self {
        Self {
            field: field.into(),
            expected,
            actual,
            delta: actual.abs_diff(expected),
        }
    }

    /// Compares two 16-bit words. The delta is the shorter way around the
    /// 16-bit circle, so `0x7FFF` and `-0x8000` are one LSB apart.
    pub fn word16(field: impl Into<String>, expected: i64, actual: i64) -> Self {
        let delta = (actual as i16).wrapping_sub(expected as i16).unsigned_abs();
        Self {
            field: field.into(),
            expected,
            actual,
            delta: u64::from(delta),
        }
    }

    /// Whether the delta is within `tolerance`.
    pub fn within(&self, tolerance: u64) -> bool {
        self.delta <= tolerance
    }
}

/// Verdict of one case.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ComparisonResult {
    /// Case name.
    pub name: String,
    /// Whether every field is within tolerance.
    pub passed: bool,
    /// Tolerance applied, in LSB units. Zero for exact comparisons.
    pub tolerance: u64,
    /// Number of values compared.
    pub checked: usize,
    /// Compared fields. Exact comparisons of long traces keep only the
    /// failing ones.
    pub fields: Vec<FieldComparison>,
}

impl ComparisonResult {
    /// Fields whose delta exceeds the tolerance.
    pub fn mismatches(&self) -> impl Iterator<Item = &FieldComparison> + '_ {
        self.fields.iter().filter(|f| !f.within(self.tolerance))
    }
}

/// Compares 16-bit `actual` words against `expected` field by field with an
/// absolute tolerance. Deltas wrap like the datapath does. All three slices
/// must have the same length.
pub fn compare(
    name: &str,
    fields: &[&str],
    actual: &[i64],
    expected: &[i64],
    tolerance: u64,
) -> ComparisonResult {
    debug_assert_eq!(fields.len(), actual.len());
    debug_assert_eq!(fields.len(), expected.len());
    let fields: Vec<_> = fields
        .iter()
        .zip(actual.iter().zip(expected))
        .map(|(field, (&a, &e))| FieldComparison::word16(*field, e, a))
        .collect();
    ComparisonResult {
        name: name.to_string(),
        passed: fields.iter().all(|f| f.within(tolerance)),
        tolerance,
        checked: fields.len(),
        fields,
    }
}

/// Exact comparison of a sequence of observations, keeping only the
/// mismatching ones.
pub fn compare_exact(
    name: &str,
    observations: impl IntoIterator<Item = FieldComparison>,
) -> ComparisonResult {
    let mut checked = 0;
    let fields: Vec<_> = observations
        .into_iter()
        .inspect(|_| checked += 1)
        .filter(|f| f.delta != 0)
        .collect();
    ComparisonResult {
        name: name.to_string(),
        passed: fields.is_empty(),
        tolerance: 0,
        checked,
        fields,
    }
}
