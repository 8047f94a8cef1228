//! Cache store for solved-problem records
//!
//! The store keeps the latest snapshot only: one row per problem keyed by
//! name, plus a singleton row with the date of the last successful crawl.

mod schema;
mod sqlite;
mod traits;

pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, Store};
