//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the kattrack cache.

use rusqlite::Connection;

/// SQL schema for the cache database
pub const SCHEMA_SQL: &str = r#"
-- One row per solved problem, latest snapshot only
CREATE TABLE IF NOT EXISTS solved_problems (
    name TEXT PRIMARY KEY,
    href TEXT NOT NULL,
    fastest_global TEXT NOT NULL DEFAULT '',
    mine TEXT NOT NULL DEFAULT '',
    top_rank TEXT,
    top_href TEXT
);

-- Singleton row holding the date of the last successful crawl
CREATE TABLE IF NOT EXISTS last_fetch (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    fetch_date TEXT NOT NULL
);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
