//! Order export file served as a paged store

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::{OrderPage, OrderQuery, OrderSource};
use crate::core::RawOrder;
use crate::error::SourceError;

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderDocument {
    List(Vec<RawOrder>),
    Wrapped { orders: Vec<RawOrder> },
}

/// Reads `{"orders": [...]}` or a bare array of raw orders. The file is read
/// on first access and kept for the lifetime of the store.
pub(crate) struct JsonOrderStore {
    path: PathBuf,
    orders: OnceLock<Vec<RawOrder>>,
}

impl JsonOrderStore {
    pub(crate) fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            orders: OnceLock::new(),
        }
    }

    fn orders(&self) -> Result<&[RawOrder], SourceError> {
        if let Some(orders) = self.orders.get() {
            return Ok(orders);
        }
        let loaded = self.read()?;
        Ok(self.orders.get_or_init(|| loaded))
    }

    fn read(&self) -> Result<Vec<RawOrder>, SourceError> {
        let content =
            std::fs::read_to_string(&self.path).map_err(|source| SourceError::Unreachable {
                path: self.path.clone(),
                source,
            })?;
        let document: OrderDocument =
            serde_json::from_str(&content).map_err(|source| SourceError::Malformed {
                path: self.path.clone(),
                source,
            })?;
        let orders = match document {
            OrderDocument::List(orders) | OrderDocument::Wrapped { orders } => orders,
        };
        tracing::debug!("Read {} raw orders from {}", orders.len(), self.path.display());
        Ok(orders)
    }
}

impl OrderSource for JsonOrderStore {
    fn name(&self) -> &str {
        "order export"
    }

    fn fetch_page(&self, query: &OrderQuery) -> Result<OrderPage, SourceError> {
        let bounded = query.filter.since.is_some() || query.filter.until.is_some();
        let matching: Vec<&RawOrder> = self
            .orders()?
            .iter()
            .filter(|order| match order.day() {
                Some(day) => query.filter.contains(day),
                // let the normalizer count undated orders once, on unbounded scans
                None => !bounded,
            })
            .collect();

        let per_page = query.per_page.max(1);
        let total_pages = matching.len().div_ceil(per_page);
        let offset = query.page.saturating_sub(1).saturating_mul(per_page);
        let orders = matching
            .into_iter()
            .skip(offset)
            .take(per_page)
            .cloned()
            .collect();
        Ok(OrderPage {
            orders,
            total_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DateFilter;
    use chrono::NaiveDate;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn write_orders(dir: &Path, value: serde_json::Value) -> PathBuf {
        let path = dir.join("orders.json");
        std::fs::write(&path, value.to_string()).unwrap();
        path
    }

    fn raw(id: u64, date: &str) -> serde_json::Value {
        json!({"id": id, "status": "completed", "date_created": date, "total": "1"})
    }

    fn query(filter: DateFilter, page: usize, per_page: usize) -> OrderQuery {
        OrderQuery {
            filter,
            page,
            per_page,
        }
    }

    #[test]
    fn pages_through_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let orders: Vec<_> = (1..=5).map(|i| raw(i, "2025-01-01")).collect();
        let store = JsonOrderStore::new(&write_orders(dir.path(), json!(orders)));

        let first = store.fetch_page(&query(DateFilter::default(), 1, 2)).unwrap();
        assert_eq!(first.total_pages, 3);
        assert_eq!(first.orders.len(), 2);
        let last = store.fetch_page(&query(DateFilter::default(), 3, 2)).unwrap();
        assert_eq!(last.orders.len(), 1);
        let past = store.fetch_page(&query(DateFilter::default(), 4, 2)).unwrap();
        assert!(past.orders.is_empty());
    }

    #[test]
    fn wrapped_document_and_date_filter() {
        let dir = tempfile::tempdir().unwrap();
        let doc = json!({"orders": [
            raw(1, "2025-01-01T08:00:00"),
            raw(2, "2025-01-02 09:00:00"),
            raw(3, "2025-01-03"),
            {"id": 4, "status": "completed"}
        ]});
        let store = JsonOrderStore::new(&write_orders(dir.path(), doc));

        let day = store.fetch_page(&query(DateFilter::day(d(2025, 1, 2)), 1, 10)).unwrap();
        assert_eq!(day.orders.len(), 1);
        assert_eq!(day.orders[0].day(), Some(d(2025, 1, 2)));

        let all = store.fetch_page(&query(DateFilter::default(), 1, 10)).unwrap();
        assert_eq!(all.orders.len(), 4);
    }

    #[test]
    fn missing_file_is_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonOrderStore::new(&dir.path().join("orders.json"));
        let err = store.fetch_page(&query(DateFilter::default(), 1, 10)).unwrap_err();
        assert!(matches!(err, SourceError::Unreachable { .. }));
    }

    #[test]
    fn garbage_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orders.json");
        std::fs::write(&path, "<html>").unwrap();
        let store = JsonOrderStore::new(&path);
        let err = store.fetch_page(&query(DateFilter::default(), 1, 10)).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }
}
