//! An in-process stand-in for `TdsConnection`, used by this crate's own
//! unit tests and by the odbc crate's integration tests to drive the
//! statement state machine and the exported `SQL*` surface without a real
//! server. Batches are matched against canned responses registered up
//! front; anything unmatched returns zero rows and `row_count` 0.

use crate::col_metadata::ColumnMetadata;
use crate::conn::TdsSource;
use crate::err::Result;
use crate::row_store::RowStore;
use async_trait::async_trait;
use std::collections::HashMap;

/// One canned response: the columns/rows `execute_batch` hands back when
/// the submitted SQL matches `sql` exactly, plus the affected-row count.
pub struct FakeBatch {
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<Option<String>>>,
    pub row_count: i64,
}

#[derive(Default)]
pub struct FakeTdsSource {
    responses: HashMap<String, FakeBatch>,
    pub executed_batches: Vec<String>,
    database: Option<String>,
    autocommit: bool,
    in_transaction: bool,
}

impl FakeTdsSource {
    pub fn new() -> FakeTdsSource {
        FakeTdsSource {
            responses: HashMap::new(),
            executed_batches: Vec::new(),
            database: None,
            autocommit: true,
            in_transaction: false,
        }
    }

    pub fn with_response(mut self, sql: &str, batch: FakeBatch) -> FakeTdsSource {
        self.responses.insert(sql.to_string(), batch);
        self
    }
}

#[async_trait(?Send)]
impl TdsSource for FakeTdsSource {
    async fn execute_batch(&mut self, sql: &str) -> Result<(RowStore, i64)> {
        self.executed_batches.push(sql.to_string());
        let mut store = RowStore::new();
        let row_count = match self.responses.get(sql) {
            Some(batch) => {
                store.set_columns(batch.columns.clone());
                for row in &batch.rows {
                    store.push_row(row.clone());
                }
                batch.row_count
            }
            None => 0,
        };
        Ok((store, row_count))
    }

    async fn begin_transaction_if_needed(&mut self) -> Result<()> {
        if !self.autocommit && !self.in_transaction {
            self.in_transaction = true;
        }
        Ok(())
    }

    async fn end_transaction(&mut self, _commit: bool) -> Result<()> {
        self.in_transaction = false;
        Ok(())
    }

    async fn set_autocommit(&mut self, on: bool) -> Result<()> {
        self.autocommit = on;
        Ok(())
    }

    fn autocommit(&self) -> bool {
        self.autocommit
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }

    fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }
}
