//! SQLite cache store implementation
//!
//! This module provides a SQLite-based implementation of the Store trait.

use crate::model::{ProblemRecord, TopPlacement};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, Store};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Date format used for the last_fetch row
const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite cache store backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (useful for tests)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Store for SqliteStorage {
    fn upsert_problems(&mut self, records: &[ProblemRecord]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        upsert_all(&tx, records)?;
        tx.commit()?;
        Ok(())
    }

    fn record_fetch_date(&mut self, date: NaiveDate) -> StorageResult<()> {
        set_fetch_date(&self.conn, date)
    }

    fn commit_snapshot(
        &mut self,
        records: &[ProblemRecord],
        date: NaiveDate,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        upsert_all(&tx, records)?;
        set_fetch_date(&tx, date)?;
        tx.commit()?;
        Ok(())
    }

    fn load_problems(&self) -> StorageResult<Vec<ProblemRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, href, fastest_global, mine, top_rank, top_href
             FROM solved_problems ORDER BY name",
        )?;

        let rows = stmt.query_map([], |row| {
            let top_rank: Option<String> = row.get(4)?;
            let top_href: Option<String> = row.get(5)?;
            let top = match (top_rank, top_href) {
                (Some(rank), Some(href)) => Some(TopPlacement { rank, href }),
                _ => None,
            };

            Ok(ProblemRecord {
                name: row.get(0)?,
                href: row.get(1)?,
                fastest_global: row.get(2)?,
                mine: row.get(3)?,
                top,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn load_fetch_date(&self) -> StorageResult<Option<NaiveDate>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT fetch_date FROM last_fetch WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match text {
            Some(text) => {
                let date = NaiveDate::parse_from_str(&text, DATE_FORMAT)
                    .map_err(|_| StorageError::InvalidDate(text))?;
                Ok(Some(date))
            }
            None => Ok(None),
        }
    }
}

/// Inserts or updates one row per record, keyed by name
fn upsert_all(conn: &Connection, records: &[ProblemRecord]) -> StorageResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO solved_problems (name, href, fastest_global, mine, top_rank, top_href)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (name) DO UPDATE SET
             href = ?2,
             fastest_global = ?3,
             mine = ?4,
             top_rank = ?5,
             top_href = ?6",
    )?;

    for record in records {
        let (top_rank, top_href) = match &record.top {
            Some(top) => (Some(top.rank.as_str()), Some(top.href.as_str())),
            None => (None, None),
        };

        stmt.execute(params![
            record.name,
            record.href,
            record.fastest_global,
            record.mine,
            top_rank,
            top_href,
        ])?;
    }

    Ok(())
}

/// Writes the singleton last-fetch row
fn set_fetch_date(conn: &Connection, date: NaiveDate) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO last_fetch (id, fetch_date) VALUES (1, ?1)
         ON CONFLICT (id) DO UPDATE SET fetch_date = ?1",
        params![date.format(DATE_FORMAT).to_string()],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, mine: &str) -> ProblemRecord {
        ProblemRecord {
            name: name.to_string(),
            href: format!("/problems/{}", name.to_lowercase()),
            fastest_global: "0.01s".to_string(),
            mine: mine.to_string(),
            top: None,
        }
    }

    #[test]
    fn test_upsert_and_load_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let mut with_top = record("Beta", "0.87s");
        with_top.top = Some(TopPlacement {
            rank: "3".to_string(),
            href: "https://judge/problems/beta/statistics".to_string(),
        });

        storage
            .upsert_problems(&[record("Alpha", "1.23s"), with_top.clone()])
            .unwrap();

        let loaded = storage.load_problems().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Alpha");
        assert_eq!(loaded[1], with_top);
    }

    #[test]
    fn test_load_orders_by_name() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .upsert_problems(&[record("Zulu", ""), record("Alpha", ""), record("Mike", "")])
            .unwrap();

        let names: Vec<String> = storage
            .load_problems()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Mike", "Zulu"]);
    }

    #[test]
    fn test_upsert_overwrites_by_name() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert_problems(&[record("Alpha", "2.00s")]).unwrap();
        storage.upsert_problems(&[record("Alpha", "0.50s")]).unwrap();

        let loaded = storage.load_problems().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].mine, "0.50s");
    }

    #[test]
    fn test_upsert_clears_stale_top_placement() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();

        let mut with_top = record("Alpha", "0.10s");
        with_top.top = Some(TopPlacement {
            rank: "1".to_string(),
            href: "https://judge/stats".to_string(),
        });
        storage.upsert_problems(&[with_top]).unwrap();

        // The next crawl no longer sees the user on the leaderboard
        storage.upsert_problems(&[record("Alpha", "0.10s")]).unwrap();

        let loaded = storage.load_problems().unwrap();
        assert!(loaded[0].top.is_none());
    }

    #[test]
    fn test_fetch_date_roundtrip() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.load_fetch_date().unwrap(), None);

        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        storage.record_fetch_date(date).unwrap();
        assert_eq!(storage.load_fetch_date().unwrap(), Some(date));

        // Overwrites the singleton row
        let later = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        storage.record_fetch_date(later).unwrap();
        assert_eq!(storage.load_fetch_date().unwrap(), Some(later));
    }

    #[test]
    fn test_commit_snapshot_writes_records_and_date() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        storage
            .commit_snapshot(&[record("Alpha", "1.23s")], date)
            .unwrap();

        assert_eq!(storage.load_problems().unwrap().len(), 1);
        assert_eq!(storage.load_fetch_date().unwrap(), Some(date));
    }

    #[test]
    fn test_commit_snapshot_rolls_back_records_when_date_write_fails() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();

        // Sabotage the fetch-date table so the second half of the commit
        // fails after the records were written
        storage.conn.execute("DROP TABLE last_fetch", []).unwrap();

        assert!(storage
            .commit_snapshot(&[record("Alpha", "1.23s")], date)
            .is_err());

        // The record write from the same transaction must be gone too
        assert!(storage.load_problems().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_fetch_date_is_reported() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .conn
            .execute(
                "INSERT INTO last_fetch (id, fetch_date) VALUES (1, 'garbage')",
                [],
            )
            .unwrap();

        assert!(matches!(
            storage.load_fetch_date(),
            Err(StorageError::InvalidDate(_))
        ));
    }
}
