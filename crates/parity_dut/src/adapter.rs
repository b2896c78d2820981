//! The adapter trait every DUT backend implements.

use crate::error::DutError;
use crate::field::{Direction, FieldDecl};

/// A clocked design under test, seen as a black box.
///
/// The harness drives a DUT in lock-step: it sets inputs, calls
/// [`step`](DutAdapter::step) exactly once per logical clock edge and reads
/// outputs. `step` is the only call with side effects on DUT state and must
/// never be batched or reordered. An adapter instance is owned by exactly
/// one harness thread at a time.
///
/// Construction and release are the backend's own `new` and `Drop`.
pub trait DutAdapter {
    /// Human-readable name used in diagnostics.
    fn name(&self) -> &str;

    /// Every field the DUT exposes.
    fn fields(&self) -> &[FieldDecl];

    /// Drives an input field. The value is held until set again.
    fn set(&mut self, field: &str, value: i64) -> Result<(), DutError>;

    /// Advances one rising clock edge and settles the outputs.
    fn step(&mut self) -> Result<(), DutError>;

    /// Reads a field.
    fn get(&self, field: &str) -> Result<i64, DutError>;

    /// Looks up a field declaration by name.
    fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields().iter().find(|f| f.name == name)
    }

    /// Whether the DUT declares `name` with the given direction.
    fn has_field(&self, name: &str, direction: Direction) -> bool {
        self.field(name).is_some_and(|f| f.direction == direction)
    }
}

impl<D: DutAdapter + ?Sized> DutAdapter for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fields(&self) -> &[FieldDecl] {
        (**self).fields()
    }

    fn set(&mut self, field: &str, value: i64) -> Result<(), DutError> {
        (**self).set(field, value)
    }

    fn step(&mut self) -> Result<(), DutError> {
        (**self).step()
    }

    fn get(&self, field: &str) -> Result<i64, DutError> {
        (**self).get(field)
    }
}
