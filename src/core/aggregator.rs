//! Profit aggregation
//!
//! Folds normalized orders into date-keyed buckets and per-product rollups.
//! Every fold is a sum of exact decimals, so results do not depend on the
//! order in which records arrive.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use super::overhead::OverheadSchedule;
use super::types::{LineItem, OrderRecord, ReportBucket, Timeline};
use crate::consts::UNKNOWN;
use crate::costs::CostResolver;
use crate::error::ReportError;
use crate::utils::each_day;

/// Decimal places kept for per-line labor cost
const LABOR_SCALE: u32 = 4;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

pub(crate) struct Aggregator<'a, 'c> {
    costs: &'a CostResolver<'c>,
    overheads: &'a OverheadSchedule,
    hourly_rate: Decimal,
}

impl<'a, 'c> Aggregator<'a, 'c> {
    pub(crate) fn new(
        costs: &'a CostResolver<'c>,
        overheads: &'a OverheadSchedule,
        hourly_rate: Decimal,
    ) -> Self {
        Self {
            costs,
            overheads,
            hourly_rate,
        }
    }

    /// One bucket per calendar day between the earliest and latest order.
    /// Days without orders still carry their overhead share.
    pub(crate) fn aggregate(&self, orders: &[OrderRecord]) -> Result<Timeline, ReportError> {
        let (Some(first), Some(last)) = (
            orders.iter().map(|o| o.date).min(),
            orders.iter().map(|o| o.date).max(),
        ) else {
            return Err(ReportError::NoData);
        };

        let mut timeline: Timeline = each_day(first, last)
            .map(|day| (day, self.empty_bucket(day)))
            .collect();
        for order in orders {
            if let Some(bucket) = timeline.get_mut(&order.date) {
                self.fold_order(bucket, order);
            }
        }
        Ok(timeline)
    }

    /// Bucket for a single day from whichever orders fall on it
    pub(crate) fn aggregate_day(&self, day: NaiveDate, orders: &[OrderRecord]) -> ReportBucket {
        let mut bucket = self.empty_bucket(day);
        for order in orders.iter().filter(|o| o.date == day) {
            self.fold_order(&mut bucket, order);
        }
        bucket
    }

    /// Overhead-only bucket
    pub(crate) fn empty_bucket(&self, day: NaiveDate) -> ReportBucket {
        ReportBucket::with_overhead(self.overheads.daily(day))
    }

    /// Add one order to its bucket. An order whose amounts overflow is skipped whole.
    fn fold_order(&self, bucket: &mut ReportBucket, order: &OrderRecord) {
        match self
            .order_bucket(order)
            .and_then(|delta| bucket.checked_add(&delta))
        {
            Some(next) => *bucket = next,
            None => tracing::warn!(
                "Skipping order {} on {}: amounts overflow the daily totals",
                order.order_id,
                order.date
            ),
        }
    }

    fn order_bucket(&self, order: &OrderRecord) -> Option<ReportBucket> {
        let mut delta = ReportBucket {
            total: order.total,
            discount: order.discount,
            shipping: order.shipping,
            tax: order.tax,
            shipping_tax: order.shipping_tax,
            ..Default::default()
        };
        for item in order.counted_items() {
            let line = self.line_costs(item)?;
            delta = delta.checked_add(&ReportBucket {
                quantity: u64::from(item.quantity),
                cogs: line.cogs,
                packing_cost: line.packing_cost,
                labor_cost: line.labor_cost,
                ..Default::default()
            })?;
        }
        Some(delta)
    }

    fn line_costs(&self, item: &LineItem) -> Option<LineCosts> {
        let cost = self.costs.resolve(item.product_id, item.variation_id);
        let quantity = Decimal::from(item.quantity);
        let minutes = quantity.checked_mul(Decimal::from(cost.work_time_minutes))?;
        let labor_cost = minutes
            .checked_mul(self.hourly_rate)?
            .checked_div(MINUTES_PER_HOUR)?
            .round_dp(LABOR_SCALE);
        Some(LineCosts {
            cogs: quantity.checked_mul(cost.cogs_price)?,
            packing_cost: quantity.checked_mul(cost.packing_cost)?,
            labor_cost,
        })
    }

    /// Per-product rollup over counted lines; variations roll into their parent.
    /// Sorted by revenue, highest first.
    pub(crate) fn product_rollup(&self, orders: &[OrderRecord]) -> Vec<ProductRollup> {
        let mut products: HashMap<u64, ProductRollup> = HashMap::new();

        for order in orders {
            for item in order.counted_items() {
                let rollup = products
                    .entry(item.product_id)
                    .or_insert_with(|| self.new_rollup(item));
                let folded = self
                    .line_costs(item)
                    .and_then(|line| rollup.checked_with(item, &line));
                match folded {
                    Some(next) => *rollup = next,
                    None => tracing::warn!(
                        "Order {}: skipping product {} line, amounts overflow",
                        order.order_id,
                        item.product_id
                    ),
                }
            }
        }

        let mut rollups: Vec<ProductRollup> = products.into_values().collect();
        rollups.sort_by(|a, b| {
            b.revenue
                .cmp(&a.revenue)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        rollups
    }

    fn new_rollup(&self, item: &LineItem) -> ProductRollup {
        let info = self.costs.product_info(item.product_id);
        let product_cost = self.costs.resolve(item.product_id, None);
        let name = info
            .as_ref()
            .map(|i| i.name.trim())
            .filter(|n| !n.is_empty())
            .or_else(|| Some(item.name.as_str()).filter(|n| !n.is_empty()))
            .unwrap_or(UNKNOWN)
            .to_string();
        let sku = info
            .map(|i| i.sku.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string());
        ProductRollup {
            product_id: item.product_id,
            name,
            sku,
            development_cost: product_cost.development_cost,
            development_months: product_cost.development_months,
            ..Default::default()
        }
    }
}

struct LineCosts {
    cogs: Decimal,
    packing_cost: Decimal,
    labor_cost: Decimal,
}

/// Sales and costs of one product across a set of orders
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ProductRollup {
    pub(crate) product_id: u64,
    pub(crate) name: String,
    pub(crate) sku: String,
    pub(crate) quantity: u64,
    /// Sum of counted line totals
    pub(crate) revenue: Decimal,
    pub(crate) cogs: Decimal,
    pub(crate) packing_cost: Decimal,
    pub(crate) labor_cost: Decimal,
    /// Counted once per product, not per unit
    pub(crate) development_cost: Decimal,
    pub(crate) development_months: u32,
}

impl ProductRollup {
    fn checked_with(&self, item: &LineItem, line: &LineCosts) -> Option<ProductRollup> {
        Some(ProductRollup {
            quantity: self.quantity.checked_add(u64::from(item.quantity))?,
            revenue: self.revenue.checked_add(item.total)?,
            cogs: self.cogs.checked_add(line.cogs)?,
            packing_cost: self.packing_cost.checked_add(line.packing_cost)?,
            labor_cost: self.labor_cost.checked_add(line.labor_cost)?,
            ..self.clone()
        })
    }

    pub(crate) fn total_cost(&self) -> Decimal {
        self.cogs
            .saturating_add(self.packing_cost)
            .saturating_add(self.labor_cost)
            .saturating_add(self.development_cost)
    }

    pub(crate) fn profit(&self) -> Decimal {
        self.revenue.saturating_sub(self.total_cost())
    }
}
