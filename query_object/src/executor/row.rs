//! Decoded result rows

use crate::errors::QueryError;
use type_mapping::{FromSqlValue, SqlValue};

/// One result row: column names and their driver values, in select order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Vec<String>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.push(column.into());
        self.values.push(value.into());
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a column, matched case-insensitively
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .and_then(|i| self.values.get(i))
    }

    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Coerce the value at `index`; a missing column reads as `Null`
    pub fn try_get<T: FromSqlValue>(&self, index: usize) -> Result<T, QueryError> {
        let value = match self.values.get(index) {
            Some(value) => T::from_sql_value(value)?,
            None => T::from_sql_value(&SqlValue::Null)?,
        };
        Ok(value)
    }
}

impl<C: Into<String>, V: Into<SqlValue>> FromIterator<(C, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut row = Row::default();
        for (column, value) in iter {
            row.push(column, value);
        }
        row
    }
}
