//! Pagination over a `Select`
//!
//! Paging state is the select's limit and absolute offset. A cursor carries
//! that state between calls; stepping decodes it into the select and moves the
//! offset. Decode failures leave the select as it was.

use super::cursor::Cursor;
use super::select::Select;
use crate::errors::QueryError;
use crate::executor::QueryExecutor;
use crate::materialize::scan_row;
use crate::traits::ScanArgs;
use serde_json::Value;

impl Select {
    /// Fetch one row by primary key into `dst`; arguments follow key rank
    pub async fn get_by_pk<E, D>(
        &self,
        executor: &E,
        dst: &mut D,
        pk_args: &[Value],
    ) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        self.validate()?;
        let expected = self.table().primary_keys().len();
        if pk_args.len() != expected {
            return Err(QueryError::ArgumentCount {
                expected,
                got: pk_args.len(),
            });
        }

        let sql = self.select_by_pk();
        debug_log!("[PAGINATION] by pk: {}", sql);
        let row = executor.query_row(&sql, pk_args).await?;
        scan_row(&self.columns(), &row, dst)
    }

    /// Fetch one row by primary key and return a cursor positioned on it.
    ///
    /// The position is the row's number under the current filters and order,
    /// so stepping from the returned cursor walks the same sequence `get` does.
    pub async fn get_by_pk_with_cursor<E, D>(
        &self,
        executor: &E,
        dst: &mut D,
        pk_args: &[Value],
    ) -> Result<Cursor, QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        self.get_by_pk(executor, dst, pk_args).await?;

        let (sql, args) = self.row_number_query(pk_args);
        debug_log!("[PAGINATION] row number: {}", sql);
        let row = executor.query_row(&sql, &args).await?;
        let row_number: i64 = row.try_get(0)?;

        Ok(Cursor {
            fields: self.fields.clone(),
            filters: self.filters.as_slice().to_vec(),
            order_by: self.order_by.clone(),
            limit: 1,
            offset: row_number - 1,
        })
    }

    /// Rows matching the current filters
    pub async fn count<E>(&self, executor: &E) -> Result<i64, QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        self.validate()?;
        let (sql, args) = self.count_query();
        let row = executor.query_row(&sql, &args).await?;
        row.try_get(0)
    }

    /// Load `cursor` and move to the next page
    pub fn advance(&mut self, cursor: &str) -> Result<(), QueryError> {
        let cursor = Cursor::decode(cursor)?;
        self.apply_cursor(&cursor);
        self.offset += self.limit;
        debug_log!("[PAGINATION] advance to offset {}", self.offset);
        Ok(())
    }

    /// Load `cursor` and move to the previous page.
    ///
    /// Stepping back from the first page is `OutOfRange`; a partial step
    /// lands on offset zero.
    pub fn retreat(&mut self, cursor: &str) -> Result<(), QueryError> {
        let cursor = Cursor::decode(cursor)?;
        if cursor.offset <= 0 {
            return Err(QueryError::OutOfRange {
                offset: cursor.offset,
                limit: cursor.limit,
            });
        }

        self.apply_cursor(&cursor);
        self.offset = (self.offset - self.limit).max(0);
        debug_log!("[PAGINATION] retreat to offset {}", self.offset);
        Ok(())
    }

    /// Load `cursor` and move to the last page: offset `count - limit`.
    ///
    /// Returns `LastPage`, without touching the select, when the cursor's
    /// offset is already at or past that point. The decoded state is
    /// validated before the count is sent.
    pub async fn seek_last<E>(&mut self, executor: &E, cursor: &str) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
    {
        let cursor = Cursor::decode(cursor)?;
        let mut target = self.clone();
        target.apply_cursor(&cursor);
        target.validate()?;

        let count = target.count(executor).await?;
        let last = count - target.limit;
        if last <= target.offset {
            return Err(QueryError::LastPage);
        }

        target.offset = last;
        debug_log!("[PAGINATION] last page at offset {} of {}", last, count);
        *self = target;
        Ok(())
    }

    /// Advance and read the first row of the new page
    pub async fn get_next<E, D>(
        &mut self,
        executor: &E,
        dst: &mut D,
        cursor: &str,
    ) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        self.advance(cursor)?;
        self.first_row(executor, dst).await
    }

    /// Retreat and read the first row of the new page
    pub async fn get_previous<E, D>(
        &mut self,
        executor: &E,
        dst: &mut D,
        cursor: &str,
    ) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        self.retreat(cursor)?;
        self.first_row(executor, dst).await
    }

    /// Seek to the last page and read its first row
    pub async fn get_last<E, D>(
        &mut self,
        executor: &E,
        dst: &mut D,
        cursor: &str,
    ) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        self.seek_last(executor, cursor).await?;
        self.first_row(executor, dst).await
    }

    async fn first_row<E, D>(&self, executor: &E, dst: &mut D) -> Result<(), QueryError>
    where
        E: QueryExecutor + ?Sized,
        D: ScanArgs + Send,
    {
        let (sql, args) = self.checked_query()?;
        let row = executor.query_row(&sql, &args).await?;
        scan_row(&self.columns(), &row, dst)
    }
}
