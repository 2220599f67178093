//! Invox Storage Layer
//!
//! Implements the `InvoiceStore` trait over SQLite.
//!
//! # Architecture
//!
//! One table, `invoices`, keyed by the document file name. The upsert is a
//! single `INSERT .. ON CONFLICT` statement, so concurrent callers sharing
//! the connection observe either the old row or the new one, never a
//! partial write.
//!
//! # Examples
//!
//! ```no_run
//! use invox_store::SqliteStore;
//!
//! let store = SqliteStore::new("invoices.db").unwrap();
//! // Store is now ready for upsert/exists/all_records
//! ```

#![warn(missing_docs)]

use invox_domain::traits::InvoiceStore;
use invox_domain::InvoiceRecord;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of `InvoiceStore`
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own
/// `SqliteStore` instance; the pipeline runs a single worker.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at the given path and ensure the
    /// schema exists.
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }
}

impl InvoiceStore for SqliteStore {
    type Error = StoreError;

    fn upsert(&mut self, record: &InvoiceRecord) -> Result<(), Self::Error> {
        self.conn.execute(
            "INSERT INTO invoices (file, client, amount, product)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(file) DO UPDATE SET
                 client = excluded.client,
                 amount = excluded.amount,
                 product = excluded.product",
            params![
                &record.file,
                &record.client,
                record.amount,
                &record.product,
            ],
        )?;
        Ok(())
    }

    fn exists(&self, file: &str) -> Result<bool, Self::Error> {
        let found: Option<bool> = self
            .conn
            .query_row(
                "SELECT 1 FROM invoices WHERE file = ?1",
                params![file],
                |_| Ok(true),
            )
            .optional()?;
        Ok(found.unwrap_or(false))
    }

    fn all_records(&self) -> Result<Vec<InvoiceRecord>, Self::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT file, client, amount, product FROM invoices ORDER BY file",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(InvoiceRecord {
                file: row.get(0)?,
                client: row.get(1)?,
                amount: row.get(2)?,
                product: row.get(3)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }
}
