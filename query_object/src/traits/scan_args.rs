//! Binder capability
//!
//! A destination exposes one writable slot per column it can receive. Columns
//! are resolved to slots once per result set, then each row is handed over as
//! a whole and written only if every value coerces.

use crate::errors::QueryError;
use type_mapping::SqlValue;

pub trait ScanArgs {
    /// Number of slots the destination exposes
    fn field_count() -> usize;

    /// Resolve each column name to a slot, `None` when no field receives it
    fn scan_slots(columns: &[String]) -> Vec<Option<usize>>;

    /// Coerce every `(slot, value)` pair, then assign them.
    ///
    /// When any value fails to coerce, no slot is written.
    fn scan_values(&mut self, values: &[(usize, &SqlValue)]) -> Result<(), QueryError>;
}

/// An absent destination cannot receive a row.
impl<D: ScanArgs> ScanArgs for Option<D> {
    fn field_count() -> usize {
        D::field_count()
    }

    fn scan_slots(columns: &[String]) -> Vec<Option<usize>> {
        D::scan_slots(columns)
    }

    fn scan_values(&mut self, values: &[(usize, &SqlValue)]) -> Result<(), QueryError> {
        match self {
            Some(dst) => dst.scan_values(values),
            None => Err(QueryError::NotAPointer),
        }
    }
}

impl<D: ScanArgs> ScanArgs for Box<D> {
    fn field_count() -> usize {
        D::field_count()
    }

    fn scan_slots(columns: &[String]) -> Vec<Option<usize>> {
        D::scan_slots(columns)
    }

    fn scan_values(&mut self, values: &[(usize, &SqlValue)]) -> Result<(), QueryError> {
        (**self).scan_values(values)
    }
}
