//! Storage trait and error types
//!
//! This module defines the trait interface for the cache store and
//! associated error types.

use crate::model::ProblemRecord;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid fetch date in cache: {0}")]
    InvalidDate(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for cache store implementations
///
/// The cache holds exactly one row per problem (keyed by name, latest
/// snapshot only) plus a singleton row with the date of the last successful
/// crawl.
pub trait Store {
    /// Inserts or updates one row per record, keyed by problem name
    ///
    /// All rows are written in a single transaction so a failed write
    /// leaves the previous snapshot intact.
    fn upsert_problems(&mut self, records: &[ProblemRecord]) -> StorageResult<()>;

    /// Records the date of the last successful crawl (singleton row)
    fn record_fetch_date(&mut self, date: NaiveDate) -> StorageResult<()>;

    /// Commits a completed crawl: every record plus the fetch date, in one
    /// transaction
    ///
    /// A failure anywhere leaves both the records and the fetch date as
    /// they were, so the on-disk snapshot is never half-updated.
    fn commit_snapshot(&mut self, records: &[ProblemRecord], date: NaiveDate)
        -> StorageResult<()>;

    /// Loads all cached problem records, ordered by name
    fn load_problems(&self) -> StorageResult<Vec<ProblemRecord>>;

    /// Loads the date of the last successful crawl, if any
    fn load_fetch_date(&self) -> StorageResult<Option<NaiveDate>>;
}
