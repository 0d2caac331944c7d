use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{CachedReport, ReportStore};
use crate::error::CacheError;

const SNAPSHOT_ROW: i64 = 1;

/// Snapshot kept as a single upserted row in a SQLite database
pub(crate) struct TableReportStore {
    path: PathBuf,
}

impl TableReportStore {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, CacheError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| CacheError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS profit_timeline (
                id INTEGER PRIMARY KEY,
                report_data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(conn)
    }

    fn stored_row(&self) -> Result<Option<String>, CacheError> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let conn = self.connect()?;
        let data = conn
            .query_row(
                "SELECT report_data FROM profit_timeline WHERE id = ?1",
                params![SNAPSHOT_ROW],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(data)
    }
}

impl ReportStore for TableReportStore {
    fn location(&self) -> String {
        format!("{} (table profit_timeline)", self.path.display())
    }

    fn load(&self) -> Result<Option<CachedReport>, CacheError> {
        match self.stored_row()? {
            Some(data) => CachedReport::decode(&data).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, report: &CachedReport) -> Result<(), CacheError> {
        let data = report
            .encode()
            .map_err(|e| CacheError::Corrupt(e.to_string()))?;
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO profit_timeline (id, report_data, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                report_data = excluded.report_data,
                updated_at = excluded.updated_at",
            params![SNAPSHOT_ROW, data, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn exists(&self) -> bool {
        matches!(self.stored_row(), Ok(Some(_)))
    }

    fn clear(&self) -> Result<bool, CacheError> {
        if !self.path.is_file() {
            return Ok(false);
        }
        let conn = self.connect()?;
        let removed = conn.execute(
            "DELETE FROM profit_timeline WHERE id = ?1",
            params![SNAPSHOT_ROW],
        )?;
        Ok(removed > 0)
    }
}
