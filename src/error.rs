use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Invalid date \"{input}\" (expected YYYYMMDD or YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("Invalid timezone: {input}")]
    InvalidTimezone { input: String },

    #[error("Invalid page {page} with {per_page} per page (both must be positive)")]
    InvalidPage { page: usize, per_page: usize },

    #[error("Failed to load config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("{0}")]
    Report(#[from] ReportError),

    #[error("{0}")]
    Source(#[from] SourceError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Settings(#[from] SettingsError),
}

/// An input store (orders or product export) could not be read
#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("Order source {} is unreachable: {source}", path.display())]
    Unreachable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Product source {} is unreachable: {source}", path.display())]
    ProductsUnreachable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Order source {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failures of the persisted report snapshot
#[derive(Debug, Error)]
pub(crate) enum CacheError {
    #[error("Report cache is corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to read report cache {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write report cache {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Report cache table error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub(crate) enum ReportError {
    #[error("No orders available to report on")]
    NoData,

    #[error("{0}")]
    SourceUnavailable(#[from] SourceError),
}

#[derive(Debug, Error)]
pub(crate) enum CatalogError {
    #[error("Failed to read product catalog {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Product catalog {} is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write product catalog {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Product {0} not found")]
    UnknownProduct(u64),

    #[error(
        "Unknown cost field \"{0}\" (expected cogs_price, packing_cost, work_time_minutes, development_cost or development_months)"
    )]
    UnknownField(String),

    #[error("Invalid value \"{value}\" for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("SKU \"{sku}\" already exists on product {product_id}")]
    DuplicateSku { sku: String, product_id: u64 },
}

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("Failed to read overhead settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Overhead settings {} are malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Overhead settings {} must be a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Failed to write overhead settings {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Unknown overhead \"{0}\" (expected costs, marketing or rent)")]
    UnknownKind(String),

    #[error("Invalid month {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid value \"{value}\" for {kind}")]
    InvalidValue { kind: &'static str, value: String },
}

impl AppError {
    /// True when the failure is transient and the request can simply be retried
    pub(crate) fn is_retryable(&self) -> bool {
        matches!(
            self,
            AppError::Source(_)
                | AppError::Report(ReportError::SourceUnavailable(_))
                | AppError::Catalog(CatalogError::Read { .. })
        )
    }
}
