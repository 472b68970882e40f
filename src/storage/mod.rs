use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{Error, Result};
use crate::history::{History, HistoryEntry, MAX_HISTORY_ENTRIES};
use crate::testing::RunReport;

const DATA_DIR: &str = ".adcheck";
const HISTORY_DB_FILE: &str = "history.db";

pub fn default_history_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DATA_DIR)
        .join(HISTORY_DB_FILE)
}

pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
    let raw = report.to_json()?;
    fs::write(path, raw).map_err(|e| {
        Error::Storage(format!("Failed to write report file `{}`: {e}", path.display()))
    })
}

/// SQLite-backed record of past runs.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!(
                    "Failed to create data directory `{}`: {e}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path).map_err(|e| {
            Error::Storage(format!("Failed to open SQLite `{}`: {e}", path.display()))
        })?;

        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .map_err(|e| Error::Storage(format!("Failed to set SQLite journal mode: {e}")))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS run_history (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             started_at INTEGER NOT NULL,
             base_url TEXT NOT NULL,
             total INTEGER NOT NULL,
             passed INTEGER NOT NULL,
             failed INTEGER NOT NULL,
             aborted INTEGER NOT NULL,
             duration_ms INTEGER NOT NULL,
             report_json TEXT NOT NULL
           );",
        )
        .map_err(|e| Error::Storage(format!("Failed to initialize SQLite schema: {e}")))?;

        Ok(Self { conn })
    }

    /// Append a run and drop everything beyond the newest
    /// [`MAX_HISTORY_ENTRIES`] rows.
    pub fn record(&self, report: &RunReport) -> Result<()> {
        let report_json = report.to_json()?;
        self.conn
            .execute(
                "INSERT INTO run_history
                 (started_at, base_url, total, passed, failed, aborted, duration_ms, report_json)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    report.started_at as i64,
                    report.base_url,
                    report.total as i64,
                    report.passed as i64,
                    report.failed as i64,
                    report.aborted as i64,
                    report.duration_ms as i64,
                    report_json,
                ],
            )
            .map_err(|e| Error::Storage(format!("Failed to save run to SQLite: {e}")))?;

        self.conn
            .execute(
                "DELETE FROM run_history WHERE id NOT IN (
                 SELECT id FROM run_history ORDER BY id DESC LIMIT ?1
               );",
                params![MAX_HISTORY_ENTRIES as i64],
            )
            .map_err(|e| Error::Storage(format!("Failed to prune run history: {e}")))?;

        Ok(())
    }

    pub fn load(&self, limit: usize) -> Result<History> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT started_at, base_url, total, passed, failed, aborted, duration_ms
               FROM run_history ORDER BY id DESC LIMIT ?1;",
            )
            .map_err(|e| Error::Storage(format!("Failed to query run history: {e}")))?;

        let rows = stmt
            .query_map(params![limit.min(MAX_HISTORY_ENTRIES) as i64], |row| {
                Ok(HistoryEntry {
                    started_at: row.get::<_, i64>(0)? as u64,
                    base_url: row.get(1)?,
                    total: row.get::<_, i64>(2)? as usize,
                    passed: row.get::<_, i64>(3)? as usize,
                    failed: row.get::<_, i64>(4)? as usize,
                    aborted: row.get::<_, i64>(5)? as usize,
                    duration_ms: row.get::<_, i64>(6)? as u128,
                })
            })
            .map_err(|e| Error::Storage(format!("Failed to query run history: {e}")))?;

        let newest_first = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Storage(format!("Failed to read run history: {e}")))?;

        let mut history = History::new();
        for entry in newest_first.into_iter().rev() {
            history.push(entry);
        }
        Ok(history)
    }

    /// Stored JSON report of the most recent run, if any.
    pub fn last_report_json(&self) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT report_json FROM run_history ORDER BY id DESC LIMIT 1;",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::Storage(format!("Failed to load last report from SQLite: {e}")))
    }
}
