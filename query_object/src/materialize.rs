//! Row materialization
//!
//! Scans a decoded row into a destination through its `ScanArgs` slots.
//! Derived record types get a `FieldRegistry`: the column to slot map is
//! built once per type, so no name matching happens per field write.

use crate::errors::QueryError;
use crate::executor::Row;
use crate::traits::ScanArgs;
use std::collections::HashMap;
use type_mapping::SqlValue;

/// Column name to slot index of one destination type
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    index: HashMap<String, usize>,
    len: usize,
}

impl FieldRegistry {
    /// Slots are numbered in `columns` order
    pub fn new(columns: &[&str]) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(slot, column)| (column.to_lowercase(), slot))
            .collect();
        Self {
            index,
            len: columns.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot of each column, matched case-insensitively
    pub fn slots(&self, columns: &[String]) -> Vec<Option<usize>> {
        columns
            .iter()
            .map(|column| self.index.get(&column.to_lowercase()).copied())
            .collect()
    }

    /// Error for a slot past the end of the registry
    pub fn out_of_range(&self, slot: usize) -> QueryError {
        QueryError::InsufficientFields {
            required: slot + 1,
            available: self.len,
        }
    }
}

/// Scan `row` into `dst`.
///
/// Every column is resolved to a slot and every value looked up before the
/// destination sees the row, and the destination only assigns once all
/// values coerce, so a failed scan leaves `dst` untouched. Values are looked
/// up by column name, falling back to position.
pub fn scan_row<D: ScanArgs>(columns: &[String], row: &Row, dst: &mut D) -> Result<(), QueryError> {
    let available = D::field_count();
    if available < columns.len() {
        return Err(QueryError::InsufficientFields {
            required: columns.len(),
            available,
        });
    }

    let slots = D::scan_slots(columns)
        .into_iter()
        .collect::<Option<Vec<usize>>>()
        .filter(|slots| slots.len() == columns.len())
        .ok_or(QueryError::InsufficientFields {
            required: columns.len(),
            available,
        })?;

    let mut values = Vec::with_capacity(columns.len());
    for (i, (column, slot)) in columns.iter().zip(slots).enumerate() {
        let value = row
            .get(column)
            .or_else(|| row.get_index(i))
            .ok_or(QueryError::InsufficientFields {
                required: columns.len(),
                available: row.len(),
            })?;
        values.push((slot, value));
    }
    dst.scan_values(&values)?;

    trace_log!("[MATERIALIZE] scanned {} columns", columns.len());
    Ok(())
}
