//! In-memory executor for tests
//!
//! Interprets the statement shapes this crate builds against a single table:
//! plain selects with WHERE / ORDER BY / LIMIT / OFFSET, `count(*)`, and the
//! `row_number` position lookup with its window ordering. Every statement is
//! recorded.

use super::{QueryExecutor, Row, RowStream};
use crate::errors::QueryError;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use type_mapping::{json_to_sql_value, SqlValue};

const CLAUSES: [&str; 4] = [" WHERE ", " ORDER BY ", " LIMIT ", " OFFSET "];

pub(crate) struct MemoryExecutor {
    table: String,
    columns: Vec<String>,
    key: usize,
    rows: Vec<Vec<SqlValue>>,
    statements: Mutex<Vec<(String, Vec<Value>)>>,
    closed: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl MemoryExecutor {
    /// Empty table; `key` must be one of `columns`
    pub(crate) fn new(table: &str, columns: &[&str], key: &str) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let key = columns.iter().position(|c| c == key).unwrap_or(0);
        Self {
            table: table.to_string(),
            columns,
            key,
            rows: Vec::new(),
            statements: Mutex::new(Vec::new()),
            closed: Arc::new(AtomicUsize::new(0)),
            fail_after: None,
        }
    }

    pub(crate) fn insert(&mut self, row: Vec<SqlValue>) {
        self.rows.push(row);
        let key = self.key;
        self.rows
            .sort_by(|a, b| compare(&a[key], &b[key]).unwrap_or(Ordering::Equal));
    }

    /// Streams fail with a driver error after yielding `rows` rows
    pub(crate) fn fail_streams_after(&mut self, rows: usize) {
        self.fail_after = Some(rows);
    }

    pub(crate) fn statements(&self) -> Vec<String> {
        self.statements
            .lock()
            .map(|log| log.iter().map(|(sql, _)| sql.clone()).collect())
            .unwrap_or_default()
    }

    pub(crate) fn last_args(&self) -> Vec<Value> {
        self.statements
            .lock()
            .ok()
            .and_then(|log| log.last().map(|(_, args)| args.clone()))
            .unwrap_or_default()
    }

    /// How many streams have been closed
    pub(crate) fn closed_streams(&self) -> usize {
        self.closed.load(AtomicOrdering::SeqCst)
    }

    fn record(&self, sql: &str, args: &[Value]) {
        if let Ok(mut log) = self.statements.lock() {
            log.push((sql.to_string(), args.to_vec()));
        }
    }

    fn column_index(&self, name: &str) -> Result<usize, QueryError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| QueryError::unknown_field(&self.table, name))
    }

    fn conditions(
        &self,
        clause: Option<&str>,
        args: &[Value],
    ) -> Result<Vec<(usize, String, SqlValue)>, QueryError> {
        let Some(clause) = clause else {
            return Ok(Vec::new());
        };

        clause
            .split(" AND ")
            .map(|condition| {
                let parts: Vec<&str> = condition.split_whitespace().collect();
                let [field, op, placeholder] = parts.as_slice() else {
                    return Err(protocol(format!("bad condition {}", condition)));
                };
                let n: usize = placeholder
                    .trim_start_matches('$')
                    .parse()
                    .map_err(|_| protocol(format!("bad placeholder {}", placeholder)))?;
                let arg = n
                    .checked_sub(1)
                    .and_then(|i| args.get(i))
                    .ok_or_else(|| protocol(format!("missing argument ${}", n)))?;
                Ok((self.column_index(field)?, op.to_string(), json_to_sql_value(arg)))
            })
            .collect()
    }

    fn filtered(&self, conditions: &[(usize, String, SqlValue)]) -> Vec<&Vec<SqlValue>> {
        self.rows
            .iter()
            .filter(|row| {
                conditions.iter().all(|(index, op, value)| {
                    let ordering = compare(&row[*index], value);
                    match op.as_str() {
                        "=" => ordering == Some(Ordering::Equal),
                        "<" => ordering == Some(Ordering::Less),
                        ">" => ordering == Some(Ordering::Greater),
                        "<=" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
                        ">=" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                        _ => false,
                    }
                })
            })
            .collect()
    }

    /// Stable sort by a comma-separated column list, ascending
    fn sorted<'r>(
        &self,
        mut rows: Vec<&'r Vec<SqlValue>>,
        order_by: Option<&str>,
    ) -> Result<Vec<&'r Vec<SqlValue>>, QueryError> {
        let Some(order_by) = order_by else {
            return Ok(rows);
        };
        let indexes = order_by
            .split(',')
            .map(|c| self.column_index(c.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        rows.sort_by(|a, b| {
            indexes
                .iter()
                .map(|i| compare(&a[*i], &b[*i]).unwrap_or(Ordering::Equal))
                .find(|o| o.is_ne())
                .unwrap_or(Ordering::Equal)
        });
        Ok(rows)
    }

    fn run(&self, sql: &str, args: &[Value]) -> Result<Vec<Row>, QueryError> {
        self.record(sql, args);

        if let Some(rest) = sql.strip_prefix("SELECT count(*) FROM ") {
            let conditions = self.conditions(clause(rest, " WHERE "), args)?;
            let count = self.filtered(&conditions).len() as i64;
            return Ok(vec![Row::from_iter([("count", SqlValue::Int(count))])]);
        }

        if let Some(rest) = sql.strip_prefix("SELECT row_number FROM (") {
            let (inner, outer) = rest
                .split_once(") AS ranked ")
                .ok_or_else(|| protocol("unterminated subquery".to_string()))?;
            let inner_conditions = self.conditions(clause(inner, " WHERE "), args)?;
            let key_conditions = self.conditions(outer.strip_prefix("WHERE "), args)?;
            let window = inner
                .split_once("OVER (ORDER BY ")
                .and_then(|(_, tail)| tail.split_once(')'))
                .map(|(columns, _)| columns);

            let ranked = self.sorted(self.filtered(&inner_conditions), window)?;
            let matching = self.filtered(&key_conditions);
            return Ok(ranked
                .iter()
                .position(|row| matching.iter().any(|m| std::ptr::eq(*m, *row)))
                .map(|i| Row::from_iter([("row_number", SqlValue::Int(i as i64 + 1))]))
                .into_iter()
                .collect());
        }

        let body = sql
            .strip_prefix("SELECT ")
            .ok_or_else(|| protocol(format!("unsupported statement {}", sql)))?;
        let (projection, rest) = body
            .split_once(" FROM ")
            .ok_or_else(|| protocol("missing FROM".to_string()))?;
        let projection: Vec<String> = if projection == "*" {
            self.columns.clone()
        } else {
            projection.split(',').map(str::to_string).collect()
        };
        let indexes = projection
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;

        let conditions = self.conditions(clause(rest, " WHERE "), args)?;
        let ordered = self.sorted(self.filtered(&conditions), clause(rest, " ORDER BY "))?;
        let offset = number(clause(rest, " OFFSET "))?.unwrap_or(0);
        let limit = number(clause(rest, " LIMIT "))?;

        Ok(ordered
            .into_iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| {
                projection
                    .iter()
                    .cloned()
                    .zip(indexes.iter().map(|i| row[*i].clone()))
                    .collect::<Row>()
            })
            .collect())
    }
}

fn protocol(message: String) -> QueryError {
    QueryError::Database(sqlx::Error::Protocol(message))
}

fn clause<'s>(text: &'s str, keyword: &str) -> Option<&'s str> {
    let start = text.find(keyword)? + keyword.len();
    let tail = &text[start..];
    let end = CLAUSES
        .iter()
        .filter_map(|k| tail.find(k))
        .min()
        .unwrap_or(tail.len());
    Some(&tail[..end])
}

fn number(text: Option<&str>) -> Result<Option<usize>, QueryError> {
    text.map(|t| {
        t.trim()
            .parse()
            .map_err(|_| protocol(format!("bad number {}", t)))
    })
    .transpose()
}

fn compare(a: &SqlValue, b: &SqlValue) -> Option<Ordering> {
    match (a, b) {
        (SqlValue::Int(x), SqlValue::Int(y)) => Some(x.cmp(y)),
        (SqlValue::Int(x), SqlValue::Float(y)) => (*x as f64).partial_cmp(y),
        (SqlValue::Float(x), SqlValue::Int(y)) => x.partial_cmp(&(*y as f64)),
        (SqlValue::Float(x), SqlValue::Float(y)) => x.partial_cmp(y),
        (SqlValue::Text(x), SqlValue::Text(y)) => Some(x.cmp(y)),
        (SqlValue::Timestamp(x), SqlValue::Timestamp(y)) => Some(x.cmp(y)),
        (SqlValue::Bool(x), SqlValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub(crate) struct MemoryRows {
    rows: VecDeque<Row>,
    fail_after: Option<usize>,
    yielded: usize,
    open: bool,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RowStream for MemoryRows {
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError> {
        if !self.open {
            return Ok(None);
        }
        if self.fail_after == Some(self.yielded) {
            return Err(protocol("connection reset".to_string()));
        }
        self.yielded += 1;
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> Result<(), QueryError> {
        if self.open {
            self.open = false;
            self.closed.fetch_add(1, AtomicOrdering::SeqCst);
        }
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for MemoryExecutor {
    async fn query<'a>(
        &'a self,
        sql: &str,
        args: &[Value],
    ) -> Result<Box<dyn RowStream + 'a>, QueryError> {
        let rows = self.run(sql, args)?;
        Ok(Box::new(MemoryRows {
            rows: rows.into(),
            fail_after: self.fail_after,
            yielded: 0,
            open: true,
            closed: Arc::clone(&self.closed),
        }))
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> Result<Row, QueryError> {
        self.run(sql, args)?
            .into_iter()
            .next()
            .ok_or(QueryError::RowNotFound)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, QueryError> {
        self.record(sql, args);
        Ok(1)
    }
}
