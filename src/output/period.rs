use std::collections::BTreeMap;

use crate::consts::{DATE_FORMAT, MONTH_FORMAT};
use crate::core::{DateFilter, ReportBucket, Timeline};
use crate::utils::week_start;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    /// Column and JSON key naming the period
    pub(crate) fn label(self) -> &'static str {
        match self {
            Period::Day => "date",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

/// One displayed row: a day, a week (keyed by its Monday) or a month
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PeriodRow {
    pub(crate) key: String,
    pub(crate) bucket: ReportBucket,
}

fn period_key(date: chrono::NaiveDate, period: Period) -> String {
    match period {
        Period::Day => date.format(DATE_FORMAT).to_string(),
        Period::Week => week_start(date).format(DATE_FORMAT).to_string(),
        Period::Month => date.format(MONTH_FORMAT).to_string(),
    }
}

/// Re-key daily buckets by period, keeping only days inside the view filter.
/// Rows come back oldest first; keys sort chronologically as strings.
pub(crate) fn rollup(timeline: &Timeline, period: Period, filter: &DateFilter) -> Vec<PeriodRow> {
    let mut aggregated: BTreeMap<String, ReportBucket> = BTreeMap::new();
    for (date, bucket) in timeline.iter().filter(|(date, _)| filter.contains(**date)) {
        aggregated
            .entry(period_key(*date, period))
            .or_default()
            .add(bucket);
    }
    aggregated
        .into_iter()
        .map(|(key, bucket)| PeriodRow { key, bucket })
        .collect()
}

/// Sum of every row, for TOTAL lines
pub(crate) fn totals(rows: &[PeriodRow]) -> ReportBucket {
    let mut total = ReportBucket::default();
    for row in rows {
        total.add(&row.bucket);
    }
    total
}
