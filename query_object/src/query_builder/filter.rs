//! Filter predicates
//!
//! A filter is a `field op value` triple; a set of filters is AND-ed together.

use crate::errors::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operators accepted in a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,  // =
    Lt,  // <
    Gt,  // >
    Lte, // <=
    Gte, // >=
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(op: &str) -> Result<Self, Self::Err> {
        match op {
            "=" => Ok(Operator::Eq),
            "<" => Ok(Operator::Lt),
            ">" => Ok(Operator::Gt),
            "<=" => Ok(Operator::Lte),
            ">=" => Ok(Operator::Gte),
            other => Err(QueryError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single `field op value` predicate.
///
/// The operator is kept as given so a cursor can carry it verbatim; it is
/// checked when the owning query is validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: String,
    pub value: Value,
}

impl Filter {
    pub fn new(field: &str, op: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_lowercase(),
            op: op.to_string(),
            value: value.into(),
        }
    }

    pub fn operator(&self) -> Result<Operator, QueryError> {
        self.op.parse()
    }
}

/// Ordered set of filters, combined with AND
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, op: &str, value: impl Into<Value>) {
        self.filters.push(Filter::new(field, op, value));
    }

    /// Inclusive range on one field: `field >= lo AND field <= hi`
    pub fn range(&mut self, field: &str, lo: impl Into<Value>, hi: impl Into<Value>) {
        self.push(field, ">=", lo);
        self.push(field, "<=", hi);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    pub fn as_slice(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }
}

impl From<Vec<Filter>> for FilterSet {
    fn from(filters: Vec<Filter>) -> Self {
        Self { filters }
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
