//! Batched order loading
//!
//! Walks the source page by page, normalizes each batch in parallel, and
//! de-duplicates the result. Bad records are skipped and logged.

use rayon::prelude::*;
use std::time::Instant;

use super::{OrderQuery, OrderSource};
use crate::core::{DateFilter, LoadResult, OrderRecord, Rejection, deduplicate, normalize};
use crate::error::SourceError;

pub(crate) struct OrderLoader<'a> {
    source: &'a dyn OrderSource,
    batch_size: usize,
}

impl<'a> OrderLoader<'a> {
    pub(crate) fn new(source: &'a dyn OrderSource, batch_size: usize) -> Self {
        Self {
            source,
            batch_size: batch_size.max(1),
        }
    }

    /// Load every reportable order matching `filter`.
    ///
    /// Only one raw page of `batch_size` orders is held at a time. The
    /// normalized records are all kept until the end, since a later page can
    /// replace an earlier copy of the same order. Memory therefore grows with
    /// the number of reportable orders, not with `batch_size`.
    pub(crate) fn load(&self, filter: &DateFilter) -> Result<LoadResult, SourceError> {
        let start = Instant::now();
        let mut orders: Vec<OrderRecord> = Vec::new();
        let mut skipped = 0;
        let mut page = 1;

        loop {
            let query = OrderQuery {
                filter: filter.clone(),
                page,
                per_page: self.batch_size,
            };
            let batch = self.source.fetch_page(&query)?;
            if batch.orders.is_empty() {
                break;
            }

            let normalized: Vec<_> = batch
                .orders
                .par_iter()
                .map(|raw| (raw.id.clone(), normalize(raw)))
                .collect();
            for (id, result) in normalized {
                match result {
                    Ok(order) if filter.contains(order.date) => orders.push(order),
                    Ok(_) => {}
                    Err(rejection) => {
                        skipped += 1;
                        log_rejection(&id, &rejection);
                    }
                }
            }

            tracing::debug!(
                "{}: page {page}/{} normalized ({} orders so far)",
                self.source.name(),
                batch.total_pages,
                orders.len()
            );
            if page >= batch.total_pages {
                break;
            }
            page += 1;
        }

        let fetched = orders.len();
        let orders = deduplicate(orders);
        if orders.len() < fetched {
            tracing::debug!("Dropped {} duplicate orders", fetched - orders.len());
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            "Loaded {} orders from {} ({skipped} skipped, {elapsed_ms:.2}ms)",
            orders.len(),
            self.source.name()
        );
        Ok(LoadResult {
            valid: orders.len(),
            orders,
            skipped,
            elapsed_ms,
        })
    }
}

fn log_rejection(id: &serde_json::Value, rejection: &Rejection) {
    if rejection.is_malformed() {
        tracing::warn!("Skipping order {id}: {rejection}");
    } else {
        tracing::debug!("Skipping order {id}: {rejection}");
    }
}
