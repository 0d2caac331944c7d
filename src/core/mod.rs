//! Core module - order normalization, aggregation and shared types

mod aggregator;
mod amount;
mod dedup;
mod normalizer;
mod overhead;
mod page;
mod settings;
mod types;

pub(crate) use aggregator::{Aggregator, ProductRollup};
pub(crate) use amount::{parse_amount, parse_amount_str, parse_count};
pub(crate) use dedup::deduplicate;
pub(crate) use normalizer::{RawOrder, Rejection, meta_map, normalize};
pub(crate) use overhead::{OverheadKind, OverheadSchedule};
pub(crate) use page::{Page, paginate};
pub(crate) use settings::SettingsDocument;
#[cfg(test)]
pub(crate) use types::OrderStatus;
pub(crate) use types::{DateFilter, LoadResult, OrderRecord, ProductCost, ReportBucket, Timeline};
