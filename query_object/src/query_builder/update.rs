//! Data modification statements
//!
//! `Update` collects assignments and filters for one UPDATE or DELETE and
//! builds INSERT statements from the table descriptor. Building an UPDATE or a
//! filtered DELETE resets the collected state so the value can be reused.

use super::filter::FilterSet;
use super::fragment::{Assignment, FragmentBuilder, PQ};
use crate::errors::QueryError;
use crate::executor::QueryExecutor;
use crate::traits::Tabler;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use type_mapping::serialize_to_fields;

#[derive(Debug, Clone)]
pub struct Update {
    table: Arc<dyn Tabler>,
    dialect: &'static dyn FragmentBuilder,
    updated: Vec<Assignment>,
    filters: FilterSet,
}

impl Update {
    pub fn new(table: Arc<dyn Tabler>) -> Self {
        Self::with_dialect(table, &PQ)
    }

    pub fn with_dialect(table: Arc<dyn Tabler>, dialect: &'static dyn FragmentBuilder) -> Self {
        Self {
            table,
            dialect,
            updated: Vec::new(),
            filters: FilterSet::new(),
        }
    }

    /// Assign `value` to `field`. Setting the same field again replaces the value.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), QueryError> {
        let field = field.to_lowercase();
        if !self.table.has_field(&field) {
            return Err(QueryError::unknown_field(self.table.table_name(), &field));
        }
        if self.table.is_primary_key(&field) {
            return Err(QueryError::PrimaryKeyUpdate(field));
        }

        let value = value.into();
        match self.updated.iter_mut().find(|a| a.field == field) {
            Some(assignment) => assignment.value = value,
            None => self.updated.push(Assignment { field, value }),
        }
        Ok(())
    }

    pub fn set_filter(&mut self, field: &str, op: &str, value: impl Into<Value>) {
        self.filters.push(field, op, value);
    }

    pub fn with_filter(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.set_filter(field, op, value);
        self
    }

    /// Check filter fields and operators against the descriptor
    pub fn validate(&self) -> Result<(), QueryError> {
        for filter in &self.filters {
            if !self.table.has_field(&filter.field) {
                return Err(QueryError::unknown_field(
                    self.table.table_name(),
                    &filter.field,
                ));
            }
            filter.operator()?;
        }
        Ok(())
    }

    /// `UPDATE t SET ... [WHERE filters]`, then reset. Empty when nothing was set.
    pub fn query(&mut self) -> (String, Vec<Value>) {
        if self.updated.is_empty() {
            return (String::new(), Vec::new());
        }

        let (set_clause, mut args, next) = self.dialect.set_assignments(&self.updated, 1);
        let (where_clause, where_args, _) =
            self.dialect.where_filters(self.filters.as_slice(), next);
        args.extend(where_args);

        let sql = join_clauses(
            format!("UPDATE {} {}", self.table.table_name(), set_clause),
            &where_clause,
        );
        debug_log!("[UPDATE] SQL: {}", sql);
        self.reset();
        (sql, args)
    }

    /// `UPDATE t SET ... WHERE <pk> = ...`, then reset. The returned
    /// arguments cover the SET list; key values follow them.
    pub fn update_by_pk_query(&mut self) -> (String, Vec<Value>) {
        if self.updated.is_empty() {
            return (String::new(), Vec::new());
        }

        let (set_clause, args, next) = self.dialect.set_assignments(&self.updated, 1);
        let (where_clause, _) = self.dialect.where_columns(self.table.primary_keys(), next);

        let sql = join_clauses(
            format!("UPDATE {} {}", self.table.table_name(), set_clause),
            &where_clause,
        );
        debug_log!("[UPDATE] SQL: {}", sql);
        self.reset();
        (sql, args)
    }

    /// `INSERT INTO t (a,b,c) VALUES ($1,$2,$3)` over every descriptor field
    pub fn insert_query(&self) -> String {
        let fields = self.table.fields();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table.table_name(),
            fields.join(","),
            self.dialect.placeholders(fields.len())
        )
    }

    /// Values of `src` in descriptor field order
    pub fn insert_args<T: Serialize>(&self, src: &T) -> Result<Vec<Value>, QueryError> {
        let mut values = serialize_to_fields(src)?;
        let fields = self.table.fields();

        let args: Vec<Value> = fields
            .iter()
            .filter_map(|field| values.remove(field))
            .collect();
        if args.len() != fields.len() {
            return Err(QueryError::InsufficientFields {
                required: fields.len(),
                available: args.len(),
            });
        }
        Ok(args)
    }

    /// `DELETE FROM t WHERE <pk> = ...`
    pub fn delete_by_pk_query(&self) -> String {
        let (where_clause, _) = self.dialect.where_columns(self.table.primary_keys(), 1);
        join_clauses(format!("DELETE FROM {}", self.table.table_name()), &where_clause)
    }

    /// `DELETE FROM t [WHERE filters]`, then reset
    pub fn delete_query(&mut self) -> (String, Vec<Value>) {
        let (where_clause, args, _) = self.dialect.where_filters(self.filters.as_slice(), 1);
        let sql = join_clauses(format!("DELETE FROM {}", self.table.table_name()), &where_clause);
        debug_log!("[DELETE] SQL: {}", sql);
        self.reset();
        (sql, args)
    }

    fn check_key_args(&self, pk_args: &[Value]) -> Result<(), QueryError> {
        let expected = self.table.primary_keys().len();
        if pk_args.len() != expected {
            return Err(QueryError::ArgumentCount {
                expected,
                got: pk_args.len(),
            });
        }
        Ok(())
    }

    pub async fn update<E>(&mut self, executor: &E) -> Result<u64, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.validate()?;
        let (sql, args) = self.query();
        if sql.is_empty() {
            return Err(QueryError::NothingToUpdate);
        }
        executor.execute(&sql, &args).await
    }

    pub async fn update_by_pk<E>(&mut self, executor: &E, pk_args: &[Value]) -> Result<u64, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.check_key_args(pk_args)?;
        let (sql, mut args) = self.update_by_pk_query();
        if sql.is_empty() {
            return Err(QueryError::NothingToUpdate);
        }
        args.extend(pk_args.iter().cloned());
        executor.execute(&sql, &args).await
    }

    pub async fn insert<E, T>(&self, executor: &E, src: &T) -> Result<u64, QueryError>
    where
        E: QueryExecutor + ?Sized,
        T: Serialize + Sync,
    {
        let args = self.insert_args(src)?;
        executor.execute(&self.insert_query(), &args).await
    }

    pub async fn delete<E>(&mut self, executor: &E) -> Result<u64, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.validate()?;
        let (sql, args) = self.delete_query();
        executor.execute(&sql, &args).await
    }

    pub async fn delete_by_pk<E>(&self, executor: &E, pk_args: &[Value]) -> Result<u64, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.check_key_args(pk_args)?;
        executor.execute(&self.delete_by_pk_query(), pk_args).await
    }

    fn reset(&mut self) {
        self.updated.clear();
        self.filters.clear();
    }
}

fn join_clauses(head: String, tail: &str) -> String {
    if tail.is_empty() {
        head
    } else {
        format!("{} {}", head, tail)
    }
}
