//! Order data source abstraction
//!
//! A source serves raw store orders as date-filtered pages. The loader walks
//! the pages in bounded batches and normalizes them.

mod json;
mod loader;

use crate::core::{DateFilter, RawOrder};
use crate::error::SourceError;

pub(crate) use json::JsonOrderStore;
pub(crate) use loader::OrderLoader;

#[derive(Debug, Clone)]
pub(crate) struct OrderQuery {
    pub(crate) filter: DateFilter,
    /// 1-based
    pub(crate) page: usize,
    pub(crate) per_page: usize,
}

#[derive(Debug, Default)]
pub(crate) struct OrderPage {
    pub(crate) orders: Vec<RawOrder>,
    pub(crate) total_pages: usize,
}

/// Paged access to raw orders
pub(crate) trait OrderSource: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str;

    fn fetch_page(&self, query: &OrderQuery) -> Result<OrderPage, SourceError>;
}
