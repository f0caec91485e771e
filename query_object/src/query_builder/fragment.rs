//! SQL fragment generation
//!
//! Fragments are built with numbered placeholders. Each builder takes the
//! first placeholder number to use and returns the next free one, so
//! fragments can be chained into a single statement.

use super::filter::Filter;
use serde_json::Value;
use std::fmt::Debug;

/// One `field = value` pair of an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

/// Dialect-specific fragment builder. Only the placeholder syntax varies;
/// clause shapes come from the provided methods.
pub trait FragmentBuilder: Send + Sync + Debug {
    /// Placeholder for the `n`-th argument (1-based)
    fn placeholder(&self, n: usize) -> String;

    /// `WHERE a = $1 AND b = $2`, or an empty string for no columns
    fn where_columns(&self, columns: &[String], start: usize) -> (String, usize) {
        if columns.is_empty() {
            return (String::new(), start);
        }

        let mut next = start;
        let conditions: Vec<String> = columns
            .iter()
            .map(|column| {
                let condition = format!("{} = {}", column, self.placeholder(next));
                next += 1;
                condition
            })
            .collect();

        (format!("WHERE {}", conditions.join(" AND ")), next)
    }

    /// `WHERE a > $1 AND b = $2` plus the arguments in placeholder order
    fn where_filters(&self, filters: &[Filter], start: usize) -> (String, Vec<Value>, usize) {
        if filters.is_empty() {
            return (String::new(), Vec::new(), start);
        }

        let mut next = start;
        let mut args = Vec::with_capacity(filters.len());
        let conditions: Vec<String> = filters
            .iter()
            .map(|filter| {
                let condition = format!("{} {} {}", filter.field, filter.op, self.placeholder(next));
                next += 1;
                args.push(filter.value.clone());
                condition
            })
            .collect();

        (format!("WHERE {}", conditions.join(" AND ")), args, next)
    }

    /// `SET a = $1, b = $2` plus the arguments in placeholder order
    fn set_assignments(
        &self,
        assignments: &[Assignment],
        start: usize,
    ) -> (String, Vec<Value>, usize) {
        if assignments.is_empty() {
            return (String::new(), Vec::new(), start);
        }

        let mut next = start;
        let mut args = Vec::with_capacity(assignments.len());
        let pairs: Vec<String> = assignments
            .iter()
            .map(|assignment| {
                let pair = format!("{} = {}", assignment.field, self.placeholder(next));
                next += 1;
                args.push(assignment.value.clone());
                pair
            })
            .collect();

        (format!("SET {}", pairs.join(", ")), args, next)
    }

    /// `$1,$2,$3` for an INSERT value list
    fn placeholders(&self, n: usize) -> String {
        (1..=n)
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// PostgreSQL fragments: `$n` placeholders
#[derive(Debug, Clone, Copy, Default)]
pub struct PqFragments;

pub static PQ: PqFragments = PqFragments;

impl FragmentBuilder for PqFragments {
    fn placeholder(&self, n: usize) -> String {
        format!("${}", n)
    }
}
