//! Query state and SELECT assembly
//!
//! `Select` holds one in-progress query against a table descriptor. It can be
//! reused after `reset`, and pagination moves it from page to page through
//! cursors.

use super::cursor::Cursor;
use super::filter::FilterSet;
use super::fragment::{FragmentBuilder, PQ};
use crate::errors::QueryError;
use crate::traits::{TableMetadata, Tabler};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Select {
    explicit: bool,
    table: Arc<dyn Tabler>,
    dialect: &'static dyn FragmentBuilder,
    pub(crate) fields: Vec<String>,
    pub(crate) filters: FilterSet,
    pub(crate) order_by: Vec<String>,
    pub(crate) limit: i64,
    pub(crate) offset: i64,
}

impl Select {
    /// PostgreSQL query against `table`.
    ///
    /// With `explicit` set, an empty field list selects every descriptor
    /// column by name instead of `SELECT *`.
    pub fn new(table: Arc<dyn Tabler>, explicit: bool) -> Self {
        Self::with_dialect(table, explicit, &PQ)
    }

    pub fn with_dialect(
        table: Arc<dyn Tabler>,
        explicit: bool,
        dialect: &'static dyn FragmentBuilder,
    ) -> Self {
        Self {
            explicit,
            table,
            dialect,
            fields: Vec::new(),
            filters: FilterSet::new(),
            order_by: Vec::new(),
            limit: 0,
            offset: 0,
        }
    }

    /// Query against a derived record type
    pub fn of<T: TableMetadata>(explicit: bool) -> Result<Self, QueryError> {
        Ok(Self::new(Arc::new(T::describe()?), explicit))
    }

    pub fn table(&self) -> &dyn Tabler {
        self.table.as_ref()
    }

    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn ordering(&self) -> &[String] {
        &self.order_by
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    // ---- mutators ----

    pub fn set_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fields
            .extend(fields.into_iter().map(|f| f.as_ref().to_lowercase()));
    }

    pub fn set_filter(&mut self, field: &str, op: &str, value: impl Into<Value>) {
        self.filters.push(field, op, value);
    }

    /// `field >= lo AND field <= hi`
    pub fn set_range(&mut self, field: &str, lo: impl Into<Value>, hi: impl Into<Value>) {
        self.filters.range(field, lo, hi);
    }

    pub fn order_by<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order_by
            .extend(fields.into_iter().map(|f| f.as_ref().to_lowercase()));
    }

    pub fn set_limit(&mut self, limit: i64) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: i64) {
        self.offset = offset;
    }

    // ---- fluent wrappers ----

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_fields(fields);
        self
    }

    pub fn with_filter(mut self, field: &str, op: &str, value: impl Into<Value>) -> Self {
        self.set_filter(field, op, value);
        self
    }

    pub fn with_range(mut self, field: &str, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        self.set_range(field, lo, hi);
        self
    }

    pub fn with_order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order_by(fields);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.set_limit(limit);
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.set_offset(offset);
        self
    }

    /// Check every field, filter and order-by column against the descriptor
    pub fn validate(&self) -> Result<(), QueryError> {
        let table = self.table.as_ref();
        let known = |field: &str| -> Result<(), QueryError> {
            if table.has_field(field) {
                Ok(())
            } else {
                Err(QueryError::unknown_field(table.table_name(), field))
            }
        };

        for field in &self.fields {
            known(field)?;
        }
        for filter in &self.filters {
            known(&filter.field)?;
            filter.operator()?;
        }
        for field in &self.order_by {
            known(field)?;
        }
        Ok(())
    }

    /// Columns a result row carries, in order
    pub fn columns(&self) -> Vec<String> {
        if self.fields.is_empty() {
            self.table.fields().to_vec()
        } else {
            self.fields.clone()
        }
    }

    /// Explicit order-by followed by the primary keys not already in it
    pub(crate) fn order_columns(&self) -> Vec<String> {
        let mut columns = self.order_by.clone();
        for key in self.table.primary_keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        columns
    }

    fn select_clause(&self) -> String {
        let projection = if self.fields.is_empty() && !self.explicit {
            "*".to_string()
        } else {
            self.columns().join(",")
        };
        format!("SELECT {} FROM {}", projection, self.table.table_name())
    }

    fn order_clause(&self) -> String {
        format!("ORDER BY {}", self.order_columns().join(","))
    }

    /// Build the SELECT statement without validating it
    pub fn query(&self) -> (String, Vec<Value>) {
        let (where_clause, args, _) = self.dialect.where_filters(self.filters.as_slice(), 1);

        let mut parts = vec![self.select_clause()];
        if !where_clause.is_empty() {
            parts.push(where_clause);
        }
        parts.push(self.order_clause());
        if self.limit > 0 {
            parts.push(format!("LIMIT {}", self.limit));
        }
        if self.offset > 0 {
            parts.push(format!("OFFSET {}", self.offset));
        }

        let sql = parts.join(" ");
        debug_log!("[SELECT] SQL: {}", sql);
        debug_log!("[SELECT] Params count: {}", args.len());
        (sql, args)
    }

    /// `validate` then `query`
    pub fn checked_query(&self) -> Result<(String, Vec<Value>), QueryError> {
        self.validate()?;
        Ok(self.query())
    }

    /// Every row in key order, ignoring filters and paging
    pub fn select_all(&self) -> String {
        format!("{} {}", self.select_clause(), self.order_clause())
    }

    /// One row by primary key; arguments are the key values in rank order
    pub fn select_by_pk(&self) -> String {
        let (where_clause, _) = self.dialect.where_columns(self.table.primary_keys(), 1);
        format!("{} {}", self.select_clause(), where_clause)
    }

    pub(crate) fn count_query(&self) -> (String, Vec<Value>) {
        let (where_clause, args, _) = self.dialect.where_filters(self.filters.as_slice(), 1);
        let mut sql = format!("SELECT count(*) FROM {}", self.table.table_name());
        if !where_clause.is_empty() {
            sql.push(' ');
            sql.push_str(&where_clause);
        }
        (sql, args)
    }

    /// Position lookup of one key under the current filters and order.
    /// Filter arguments come first, followed by `pk_args`.
    pub(crate) fn row_number_query(&self, pk_args: &[Value]) -> (String, Vec<Value>) {
        let keys = self.table.primary_keys();
        let (filter_clause, mut args, next) =
            self.dialect.where_filters(self.filters.as_slice(), 1);
        let (key_clause, _) = self.dialect.where_columns(keys, next);

        let mut inner = format!(
            "SELECT {}, row_number() OVER ({}) FROM {}",
            keys.join(","),
            self.order_clause(),
            self.table.table_name()
        );
        if !filter_clause.is_empty() {
            inner.push(' ');
            inner.push_str(&filter_clause);
        }

        args.extend(pk_args.iter().cloned());
        (
            format!("SELECT row_number FROM ({}) AS ranked {}", inner, key_clause),
            args,
        )
    }

    /// Clear fields, filters, order-by, limit and offset
    pub fn reset(&mut self) {
        self.fields.clear();
        self.filters.clear();
        self.order_by.clear();
        self.limit = 0;
        self.offset = 0;
    }

    fn is_pristine(&self) -> bool {
        self.fields.is_empty()
            && self.filters.is_empty()
            && self.order_by.is_empty()
            && self.limit == 0
            && self.offset == 0
    }

    /// Snapshot of the paging state, `None` when nothing has been set
    pub fn cursor(&self) -> Option<Cursor> {
        if self.is_pristine() {
            return None;
        }
        Some(Cursor {
            fields: self.fields.clone(),
            filters: self.filters.as_slice().to_vec(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
        })
    }

    /// Load a cursor. Fields, filters and order-by are only taken when the
    /// cursor carries some; limit and offset always are.
    pub(crate) fn apply_cursor(&mut self, cursor: &Cursor) {
        if !cursor.fields.is_empty() {
            self.fields = cursor.fields.clone();
        }
        if !cursor.filters.is_empty() {
            self.filters = FilterSet::from(cursor.filters.clone());
        }
        if !cursor.order_by.is_empty() {
            self.order_by = cursor.order_by.clone();
        }
        self.limit = cursor.limit;
        self.offset = cursor.offset;
    }
}
