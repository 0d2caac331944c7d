//! Persisted report snapshot and the controller that owns it
//!
//! The snapshot is stored either as a JSON file (atomic temp + rename) or as a
//! single row in a SQLite table (upsert). The backend is picked once from config.

mod controller;
mod file;
mod table;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::Timeline;
use crate::error::CacheError;

pub(crate) use controller::{CacheController, CacheState, CacheStatus, ReportOutcome, Served};
pub(crate) use file::FileReportStore;
pub(crate) use table::TableReportStore;

/// Bumped when the snapshot layout changes; older snapshots are discarded
pub(crate) const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CachedReport {
    pub(crate) version: u32,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) buckets: Timeline,
}

impl CachedReport {
    pub(crate) fn new(generated_at: DateTime<Utc>, buckets: Timeline) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            generated_at,
            buckets,
        }
    }

    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub(crate) fn decode(text: &str) -> Result<Self, CacheError> {
        let report: CachedReport =
            serde_json::from_str(text).map_err(|e| CacheError::Corrupt(e.to_string()))?;
        if report.version != SNAPSHOT_VERSION {
            return Err(CacheError::Corrupt(format!(
                "snapshot version {} (expected {SNAPSHOT_VERSION})",
                report.version
            )));
        }
        Ok(report)
    }
}

/// Storage for the single report snapshot. Only the controller mutates it.
pub(crate) trait ReportStore {
    /// Human-readable location for status output
    fn location(&self) -> String;

    /// `Ok(None)` when nothing has been stored yet
    fn load(&self) -> Result<Option<CachedReport>, CacheError>;

    /// Replace the snapshot. Readers never observe a partial write.
    fn save(&self, report: &CachedReport) -> Result<(), CacheError>;

    fn exists(&self) -> bool;

    /// Remove the snapshot; returns whether one existed
    fn clear(&self) -> Result<bool, CacheError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CacheBackend {
    #[default]
    File,
    Table,
}

impl CacheBackend {
    pub(crate) fn default_file_name(self) -> &'static str {
        match self {
            CacheBackend::File => "profit-timeline.json",
            CacheBackend::Table => "profit-timeline.sqlite3",
        }
    }
}

pub(crate) fn open_store(backend: CacheBackend, path: &Path) -> Box<dyn ReportStore> {
    match backend {
        CacheBackend::File => Box::new(FileReportStore::new(path)),
        CacheBackend::Table => Box::new(TableReportStore::new(path)),
    }
}
