//! Redb-backed request counter.
//!
//! The count lives in a single row of a single table. Every increment is its
//! own write transaction; redb serialises writers, so concurrent increments
//! never lose updates. Transactions are blocking and run on tokio's blocking
//! pool.

use crate::counter::{REQUEST_COUNT_KEY, RequestCounter};
use crate::error::{RaccError, Result};
use ::redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

const COUNTS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("request_counts");

/// Persistent counter stored in a redb file.
#[derive(Clone)]
pub struct RedbCounter {
    db: Arc<Database>,
}

impl RedbCounter {
    /// Open or create the database at `path` and make sure the table exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Database::create(path).map_err(|e| RaccError::storage(e.to_string()))?;

        let write_txn = db
            .begin_write()
            .map_err(|e| RaccError::storage(e.to_string()))?;
        {
            let _table = write_txn
                .open_table(COUNTS_TABLE)
                .map_err(|e| RaccError::storage(e.to_string()))?;
        }
        write_txn
            .commit()
            .map_err(|e| RaccError::storage(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    fn increment_blocking(db: &Database) -> Result<u64> {
        let write_txn = db
            .begin_write()
            .map_err(|e| RaccError::storage(e.to_string()))?;
        let next = {
            let mut table = write_txn
                .open_table(COUNTS_TABLE)
                .map_err(|e| RaccError::storage(e.to_string()))?;
            let current = table
                .get(REQUEST_COUNT_KEY)
                .map_err(|e| RaccError::storage(e.to_string()))?
                .map(|guard| guard.value())
                .unwrap_or(0);
            let next = current + 1;
            table
                .insert(REQUEST_COUNT_KEY, next)
                .map_err(|e| RaccError::storage(e.to_string()))?;
            next
        };
        write_txn
            .commit()
            .map_err(|e| RaccError::storage(e.to_string()))?;
        Ok(next)
    }

    fn read_blocking(db: &Database) -> Result<u64> {
        let read_txn = db
            .begin_read()
            .map_err(|e| RaccError::storage(e.to_string()))?;
        let table = read_txn
            .open_table(COUNTS_TABLE)
            .map_err(|e| RaccError::storage(e.to_string()))?;
        let count = table
            .get(REQUEST_COUNT_KEY)
            .map_err(|e| RaccError::storage(e.to_string()))?
            .map(|guard| guard.value())
            .unwrap_or(0);
        Ok(count)
    }
}

#[async_trait]
impl RequestCounter for RedbCounter {
    async fn increment(&self) -> Result<u64> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || Self::increment_blocking(&db))
            .await
            .map_err(|e| RaccError::storage(e.to_string()))?
    }

    async fn read(&self) -> Result<u64> {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || Self::read_blocking(&db))
            .await
            .map_err(|e| RaccError::storage(e.to_string()))?
    }
}
