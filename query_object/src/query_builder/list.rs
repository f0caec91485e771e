//! Result iteration
//!
//! `List` owns the row stream of one executed `Select` and scans rows into
//! destinations one at a time. The stream is released by `close`, on any
//! error, or when the list is dropped.

use super::cursor::Cursor;
use super::select::Select;
use crate::errors::QueryError;
use crate::executor::{QueryExecutor, RowStream};
use crate::materialize::scan_row;
use crate::traits::ScanArgs;
use serde_json::Value;

pub struct List<'a> {
    select: &'a mut Select,
    columns: Vec<String>,
    rows: Option<Box<dyn RowStream + 'a>>,
}

impl Select {
    /// Validate, execute and iterate the current query
    pub async fn get<'a, E>(&'a mut self, executor: &'a E) -> Result<List<'a>, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        let mut list = List::new(self);
        list.get(executor).await?;
        Ok(list)
    }
}

impl<'a> List<'a> {
    pub fn new(select: &'a mut Select) -> Self {
        Self {
            select,
            columns: Vec::new(),
            rows: None,
        }
    }

    pub fn select(&self) -> &Select {
        self.select
    }

    /// Cursor for the page currently open
    pub fn cursor(&self) -> Option<Cursor> {
        self.select.cursor()
    }

    /// Execute the current query, replacing any open stream
    pub async fn get<E>(&mut self, executor: &'a E) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        let (sql, args) = self.select.checked_query()?;
        self.open(executor, sql, args).await
    }

    /// Advance from `cursor` and execute the next page
    pub async fn get_next<E>(&mut self, executor: &'a E, cursor: &str) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.select.advance(cursor)?;
        self.get(executor).await
    }

    /// Retreat from `cursor` and execute the previous page
    pub async fn get_previous<E>(
        &mut self,
        executor: &'a E,
        cursor: &str,
    ) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.select.retreat(cursor)?;
        self.get(executor).await
    }

    /// Seek to the last page from `cursor` and execute it
    pub async fn get_last<E>(&mut self, executor: &'a E, cursor: &str) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.select.seek_last(executor, cursor).await?;
        self.get(executor).await
    }

    async fn open<E>(&mut self, executor: &'a E, sql: String, args: Vec<Value>) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.close().await?;
        debug_log!("[LIST] open: {}", sql);
        let rows = executor.query(&sql, &args).await?;
        self.columns = self.select.columns();
        self.rows = Some(rows);
        Ok(())
    }

    /// Scan the next row into `dst`.
    ///
    /// Returns `Err(QueryError::Done)` once the stream is exhausted. Any other
    /// error closes the stream before it is returned.
    pub async fn next<D>(&mut self, dst: &mut D) -> Result<(), QueryError>
    where
        D: ScanArgs + Send,
    {
        let rows = self.rows.as_mut().ok_or(QueryError::Done)?;
        let next = rows.next_row().await;

        match next {
            Ok(Some(row)) => {
                if let Err(e) = scan_row(&self.columns, &row, dst) {
                    self.release().await;
                    return Err(e);
                }
                Ok(())
            }
            Ok(None) => Err(QueryError::Done),
            Err(e) => {
                self.release().await;
                Err(e)
            }
        }
    }

    /// Drain the open stream into fresh destinations, then close it
    pub async fn get_all<D>(&mut self) -> Result<Vec<D>, QueryError>
    where
        D: ScanArgs + Default + Send,
    {
        let mut items = Vec::new();
        loop {
            let mut item = D::default();
            match self.next(&mut item).await {
                Ok(()) => items.push(item),
                Err(QueryError::Done) => break,
                Err(e) => return Err(e),
            }
        }
        self.close().await?;
        Ok(items)
    }

    /// Release the row stream. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), QueryError> {
        if let Some(mut rows) = self.rows.take() {
            rows.close().await?;
        }
        Ok(())
    }

    async fn release(&mut self) {
        if let Err(e) = self.close().await {
            tracing::warn!("[LIST] failed to close row stream: {}", e);
        }
    }
}
