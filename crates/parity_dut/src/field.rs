//! Field declarations and width-normalised field storage.
//!
//! Values cross the adapter boundary as `i64`. A write keeps only the low
//! `width` bits, the way an N-bit port captures a wider integer; a read of a
//! signed field sign-extends from bit `width - 1`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DutError;

/// Direction of a DUT field, seen from the DUT.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Driven by the harness.
    Input,
    /// Driven by the DUT.
    Output,
}

/// A declared DUT field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Field name as exposed by the backend.
    pub name: String,
    /// Direction.
    pub direction: Direction,
    /// Bit width, up to 64. A zero-width field always reads 0.
    pub width: u32,
    /// Whether reads sign-extend.
    pub signed: bool,
}

impl FieldDecl {
    /// Declares an input.
    pub fn input(name: impl Into<String>, width: u32, signed: bool) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Input,
            width,
            signed,
        }
    }

    /// Declares an output.
    pub fn output(name: impl Into<String>, width: u32, signed: bool) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Output,
            width,
            signed,
        }
    }

    /// Mask covering the field's bits.
    pub fn mask(&self) -> u64 {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Truncates a value to the field's width.
    pub fn truncate(&self, value: i64) -> u64 {
        (value as u64) & self.mask()
    }

    /// Interprets raw bits according to the field's signedness.
    pub fn extend(&self, bits: u64) -> i64 {
        let bits = bits & self.mask();
        if self.signed && (1..64).contains(&self.width) && (bits >> (self.width - 1)) & 1 == 1 {
            (bits | !self.mask()) as i64
        } else {
            bits as i64
        }
    }
}

/// Named field storage shared by the reference models.
///
/// Holds raw bit patterns; normalisation happens at the boundary.
#[derive(Clone, Debug)]
pub struct FieldBank {
    dut: String,
    decls: Vec<FieldDecl>,
    bits: Vec<u64>,
    index: HashMap<String, usize>,
}

impl FieldBank {
    /// Creates a bank with every field at zero.
    pub fn new(dut: impl Into<String>, decls: Vec<FieldDecl>) -> Self {
        let index = decls
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();
        Self {
            dut: dut.into(),
            bits: vec![0; decls.len()],
            decls,
            index,
        }
    }

    /// Name of the owning DUT.
    pub fn dut(&self) -> &str {
        &self.dut
    }

    /// All declarations, in declaration order.
    pub fn decls(&self) -> &[FieldDecl] {
        &self.decls
    }

    fn lookup(&self, field: &str) -> Result<usize, DutError> {
        self.index
            .get(field)
            .copied()
            .ok_or_else(|| DutError::UnknownField {
                dut: self.dut.clone(),
                field: field.to_string(),
            })
    }

    /// Drives an input field from the harness side.
    pub fn set_input(&mut self, field: &str, value: i64) -> Result<(), DutError> {
        let i = self.lookup(field)?;
        let decl = &self.decls[i];
        if decl.direction != Direction::Input {
            return Err(DutError::NotAnInput {
                dut: self.dut.clone(),
                field: field.to_string(),
            });
        }
        self.bits[i] = decl.truncate(value);
        Ok(())
    }

    /// Reads any field, sign-extended per its declaration.
    pub fn get(&self, field: &str) -> Result<i64, DutError> {
        let i = self.lookup(field)?;
        Ok(self.decls[i].extend(self.bits[i]))
    }

    /// Raw bits of a field, for the model's own use.
    ///
    /// # Panics
    ///
    /// Panics if the field is not declared; models only pass their own names.
    pub fn raw(&self, field: &str) -> u64 {
        self.bits[self.index[field]]
    }

    /// Drives a field from the model side, truncating to its width.
    ///
    /// # Panics
    ///
    /// Panics if the field is not declared.
    pub fn drive(&mut self, field: &str, bits: u64) {
        let i = self.index[field];
        self.bits[i] = bits & self.decls[i].mask();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> FieldBank {
        FieldBank::new(
            "toy",
            vec![
                FieldDecl::input("a", 16, true),
                FieldDecl::input("en", 1, false),
                FieldDecl::output("q", 16, true),
                FieldDecl::output("wide", 64, false),
            ],
        )
    }

    #[test]
    fn truncate_and_extend_signed() {
        let d = FieldDecl::input("x", 16, true);
        assert_eq!(d.truncate(-1), 0xFFFF);
        assert_eq!(d.extend(0xFFFF), -1);
        assert_eq!(d.extend(0x7FFF), 32767);
        assert_eq!(d.extend(d.truncate(40000)), 40000 - 65536);
    }

    #[test]
    fn truncate_and_extend_unsigned() {
        let d = FieldDecl::input("addr", 10, false);
        assert_eq!(d.truncate(1025), 1);
        assert_eq!(d.extend(0x3FF), 1023);
    }

    #[test]
    fn sixty_four_bit_field() {
        let d = FieldDecl::output("w", 64, true);
        assert_eq!(d.mask(), u64::MAX);
        assert_eq!(d.extend(u64::MAX), -1);
    }

    #[test]
    fn zero_width_field_reads_zero() {
        let d = FieldDecl::output("unused", 0, true);
        assert_eq!(d.mask(), 0);
        assert_eq!(d.truncate(-1), 0);
        assert_eq!(d.extend(u64::MAX), 0);
    }

    #[test]
    fn set_and_get_input() {
        let mut b = bank();
        b.set_input("a", -5).unwrap();
        assert_eq!(b.get("a").unwrap(), -5);
        assert_eq!(b.raw("a"), 0xFFFB);
        b.set_input("en", 3).unwrap();
        assert_eq!(b.get("en").unwrap(), 1);
    }

    #[test]
    fn set_output_is_rejected() {
        let mut b = bank();
        let err = b.set_input("q", 1).unwrap_err();
        assert!(matches!(err, DutError::NotAnInput { .. }));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let b = bank();
        let err = b.get("nope").unwrap_err();
        assert!(matches!(err, DutError::UnknownField { ref field, .. } if field == "nope"));
    }

    #[test]
    fn model_drive_truncates() {
        let mut b = bank();
        b.drive("q", 0x1_8000);
        assert_eq!(b.get("q").unwrap(), -32768);
        b.drive("wide", u64::MAX);
        assert_eq!(b.get("wide").unwrap(), -1);
    }

    #[test]
    fn decls_keep_order() {
        let names: Vec<_> = bank().decls().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, ["a", "en", "q", "wide"]);
    }
}
