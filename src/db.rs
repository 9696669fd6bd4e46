use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS records (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);
";

const UPSERT: &str = "INSERT INTO records (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

/// Named JSON records, last write wins.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Read and deserialize a record. `Ok(None)` when the key was never written.
    pub fn get_record<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM records WHERE key = ?1", [key], |r| r.get(0))
            .optional()?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub fn put_record<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(UPSERT, rusqlite::params![key, json])?;
        Ok(())
    }

    /// Write several records in one transaction: either all land or none do.
    pub fn put_records(&mut self, records: &[(&str, serde_json::Value)]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for (key, value) in records {
            let json = serde_json::to_string(value)?;
            tx.execute(UPSERT, rusqlite::params![key, json])?;
        }
        tx.commit()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &str, raw: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO records (key, value) VALUES (?1, ?2)",
            rusqlite::params![key, raw],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("data").join("tripbook.db")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_open_creates_parent_dir_and_table() {
        let (dir, store) = test_store();
        assert!(dir.path().join("data").join("tripbook.db").exists());
        let count: i64 = store
            .conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='records'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_record_is_none() {
        let (_dir, store) = test_store();
        let v: Option<Vec<i64>> = store.get_record("nothing").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let (_dir, store) = test_store();
        store.put_record("vehicles", &vec![1, 2]).unwrap();
        store.put_record("vehicles", &vec![3]).unwrap();
        let v: Option<Vec<i64>> = store.get_record("vehicles").unwrap();
        assert_eq!(v, Some(vec![3]));
    }

    #[test]
    fn test_null_record_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        store.put_record::<Option<String>>("company_header", &None).unwrap();
        let v: Option<Option<String>> = store.get_record("company_header").unwrap();
        assert_eq!(v, Some(None));
    }

    #[test]
    fn test_corrupt_record_is_error() {
        let store = Store::open_in_memory().unwrap();
        store.put_raw("trip_history", "{not json").unwrap();
        let v: Result<Option<Vec<i64>>> = store.get_record("trip_history");
        assert!(v.is_err());
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tripbook.db");
        Store::open(&path).unwrap().put_record("k", "v").unwrap();
        let v: Option<String> = Store::open(&path).unwrap().get_record("k").unwrap();
        assert_eq!(v.as_deref(), Some("v"));
    }

    #[test]
    fn test_put_records_is_all_or_nothing() {
        let mut store = Store::open_in_memory().unwrap();
        store.put_record("trip_history", &vec![1]).unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_vehicles BEFORE INSERT ON records
                 WHEN NEW.key = 'vehicles'
                 BEGIN SELECT RAISE(ABORT, 'database or disk is full'); END;",
            )
            .unwrap();

        let batch = [
            ("trip_history", serde_json::json!([2, 3])),
            ("vehicles", serde_json::json!([])),
        ];
        assert!(store.put_records(&batch).is_err());
        let v: Option<Vec<i64>> = store.get_record("trip_history").unwrap();
        assert_eq!(v, Some(vec![1]));
        let v: Option<Vec<i64>> = store.get_record("vehicles").unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn test_put_records_writes_every_record() {
        let mut store = Store::open_in_memory().unwrap();
        let batch = [("a", serde_json::json!("x")), ("b", serde_json::json!(null))];
        store.put_records(&batch).unwrap();
        let a: Option<String> = store.get_record("a").unwrap();
        let b: Option<Option<String>> = store.get_record("b").unwrap();
        assert_eq!(a.as_deref(), Some("x"));
        assert_eq!(b, Some(None));
    }
}
