//! PostgreSQL executor over a `sqlx` pool

use super::{QueryExecutor, Row, RowStream};
use crate::errors::QueryError;
use async_stream::try_stream;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Column, PgPool, Postgres, Row as _, TypeInfo, ValueRef};
use type_mapping::SqlValue;
use uuid::Uuid;

/// How a JSON argument goes over the wire.
///
/// Strings are bound by their shape, not by the column they meet: RFC 3339
/// text binds as `timestamptz` and UUID text as `uuid`. Comparing such a
/// string against a TEXT column needs an explicit `::text` cast in the
/// statement; other strings bind as text.
#[derive(Debug, Clone, PartialEq)]
enum Argument {
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Null,
    Json(Value),
}

impl Argument {
    fn classify(value: &Value) -> Self {
        match value {
            Value::String(s) => {
                if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                    Argument::Timestamp(dt.with_timezone(&Utc))
                } else if let Ok(uuid) = Uuid::parse_str(s) {
                    Argument::Uuid(uuid)
                } else {
                    Argument::Text(s.clone())
                }
            }
            Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i32::try_from(i)
                    .map(Argument::Int)
                    .unwrap_or(Argument::BigInt(i)),
                (None, Some(f)) => Argument::Float(f),
                (None, None) => Argument::Text(n.to_string()),
            },
            Value::Bool(b) => Argument::Bool(*b),
            Value::Null => Argument::Null,
            other => Argument::Json(other.clone()),
        }
    }
}

/// Bind a JSON argument by kind: integers as the narrowest of
/// `int4`/`int8`, strings per `Argument`.
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match Argument::classify($param) {
            Argument::Timestamp(dt) => $query.bind(dt),
            Argument::Uuid(uuid) => $query.bind(uuid),
            Argument::Text(s) => $query.bind(s),
            Argument::Int(i) => $query.bind(i),
            Argument::BigInt(i) => $query.bind(i),
            Argument::Float(f) => $query.bind(f),
            Argument::Bool(b) => $query.bind(b),
            Argument::Null => $query.bind(Option::<String>::None),
            Argument::Json(v) => $query.bind(v),
        }
    };
}

fn bind_args<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &[Value],
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        query = bind_json_param!(query, arg);
    }
    query
}

/// Decode a driver row into `SqlValue`s by PostgreSQL type name
fn decode_row(row: &PgRow) -> Result<Row, QueryError> {
    let mut decoded = Row::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        if row.try_get_raw(i)?.is_null() {
            decoded.push(column.name(), SqlValue::Null);
            continue;
        }

        let value = match column.type_info().name() {
            "BOOL" => SqlValue::Bool(row.try_get(i)?),
            "INT2" => SqlValue::Int(row.try_get::<i16, _>(i)? as i64),
            "INT4" => SqlValue::Int(row.try_get::<i32, _>(i)? as i64),
            "INT8" => SqlValue::Int(row.try_get(i)?),
            "FLOAT4" => SqlValue::Float(row.try_get::<f32, _>(i)? as f64),
            "FLOAT8" => SqlValue::Float(row.try_get(i)?),
            "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" => SqlValue::Text(row.try_get(i)?),
            "BYTEA" => SqlValue::Bytes(row.try_get(i)?),
            "TIMESTAMPTZ" => SqlValue::Timestamp(row.try_get::<DateTime<Utc>, _>(i)?),
            "TIMESTAMP" => SqlValue::Timestamp(row.try_get::<NaiveDateTime, _>(i)?.and_utc()),
            "DATE" => SqlValue::Timestamp(
                row.try_get::<NaiveDate, _>(i)?
                    .and_time(NaiveTime::MIN)
                    .and_utc(),
            ),
            "UUID" => SqlValue::Uuid(row.try_get::<Uuid, _>(i)?),
            "JSON" | "JSONB" => SqlValue::Json(row.try_get::<Value, _>(i)?),
            other => {
                return Err(QueryError::UnsupportedColumnType {
                    column: column.name().to_string(),
                    type_name: other.to_string(),
                })
            }
        };
        decoded.push(column.name(), value);
    }

    Ok(decoded)
}

#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Rows of one statement, fetched lazily from the pool
pub struct PgRowStream<'a> {
    rows: Option<BoxStream<'a, Result<Row, QueryError>>>,
}

#[async_trait]
impl<'a> RowStream for PgRowStream<'a> {
    async fn next_row(&mut self) -> Result<Option<Row>, QueryError> {
        match self.rows.as_mut() {
            Some(rows) => rows.try_next().await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), QueryError> {
        // Dropping the stream returns its connection to the pool
        self.rows = None;
        Ok(())
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn query<'a>(
        &'a self,
        sql: &str,
        args: &[Value],
    ) -> Result<Box<dyn RowStream + 'a>, QueryError> {
        tracing::trace!("[EXECUTOR] query: {}", sql);

        let sql = sql.to_string();
        let args = args.to_vec();
        let pool = &self.pool;

        let rows: BoxStream<'a, Result<Row, QueryError>> = Box::pin(try_stream! {
            let query = bind_args(sqlx::query(&sql), &args);
            let mut fetched = query.fetch(pool);
            while let Some(row) = fetched.try_next().await? {
                yield decode_row(&row)?;
            }
        });

        Ok(Box::new(PgRowStream { rows: Some(rows) }))
    }

    async fn query_row(&self, sql: &str, args: &[Value]) -> Result<Row, QueryError> {
        tracing::trace!("[EXECUTOR] query_row: {}", sql);

        let row = bind_args(sqlx::query(sql), args)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(QueryError::RowNotFound)?;
        decode_row(&row)
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<u64, QueryError> {
        tracing::trace!("[EXECUTOR] execute: {}", sql);

        let result = bind_args(sqlx::query(sql), args)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
