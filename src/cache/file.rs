use std::io::Write;
use std::path::{Path, PathBuf};

use super::{CachedReport, ReportStore};
use crate::error::CacheError;
use crate::utils::write_atomic;

/// Snapshot kept as a JSON file, replaced atomically
pub(crate) struct FileReportStore {
    path: PathBuf,
}

impl FileReportStore {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl ReportStore for FileReportStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Option<CachedReport>, CacheError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CacheError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        CachedReport::decode(&text).map(Some)
    }

    fn save(&self, report: &CachedReport) -> Result<(), CacheError> {
        let text = report
            .encode()
            .map_err(|e| CacheError::Corrupt(e.to_string()))?;
        write_atomic(&self.path, |out: &mut dyn Write| out.write_all(text.as_bytes())).map_err(
            |source| CacheError::Write {
                path: self.path.clone(),
                source,
            },
        )
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn clear(&self) -> Result<bool, CacheError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(CacheError::Write {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
