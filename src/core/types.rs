//! Core data types shared by the normalizer, aggregator and cache
//!
//! Money is `Decimal` everywhere so that folding orders into buckets is exact
//! and independent of processing order.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OrderStatus {
    Completed,
    Processing,
}

impl OrderStatus {
    /// Parse a store status, accepting the `wc-` prefix. Other statuses are not reportable.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        let status = raw.trim();
        let status = status.strip_prefix("wc-").unwrap_or(status);
        match status.to_ascii_lowercase().as_str() {
            "completed" => Some(OrderStatus::Completed),
            "processing" => Some(OrderStatus::Processing),
            _ => None,
        }
    }

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Completed => "completed",
            OrderStatus::Processing => "processing",
        }
    }
}

/// One product line within an order, amounts in base currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct LineItem {
    pub(crate) product_id: u64,
    pub(crate) variation_id: Option<u64>,
    pub(crate) name: String,
    pub(crate) quantity: u32,
    pub(crate) subtotal: Decimal,
    pub(crate) total: Decimal,
    pub(crate) is_bundle_child: bool,
    pub(crate) bundle_parent_id: Option<u64>,
    /// Line is a bundle container (it lists member products)
    pub(crate) is_bundle_container: bool,
    /// Container whose children are present in the same order; the children carry its amounts
    pub(crate) excluded: bool,
}

impl LineItem {
    pub(crate) fn counts(&self) -> bool {
        !self.excluded
    }
}

/// Canonical completed/processing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct OrderRecord {
    pub(crate) order_id: u64,
    pub(crate) date: NaiveDate,
    pub(crate) currency: String,
    pub(crate) status: OrderStatus,
    pub(crate) total: Decimal,
    pub(crate) shipping: Decimal,
    pub(crate) tax: Decimal,
    pub(crate) shipping_tax: Decimal,
    pub(crate) discount: Decimal,
    pub(crate) line_items: Vec<LineItem>,
}

impl OrderRecord {
    pub(crate) fn revenue(&self) -> Decimal {
        self.total
            .saturating_sub(self.tax)
            .saturating_sub(self.discount)
    }

    /// Line items that contribute to quantity and cost sums
    pub(crate) fn counted_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items.iter().filter(|item| item.counts())
    }
}

/// Resolved cost attributes of a product or variation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ProductCost {
    pub(crate) cogs_price: Decimal,
    pub(crate) packing_cost: Decimal,
    pub(crate) work_time_minutes: u32,
    pub(crate) development_cost: Decimal,
    pub(crate) development_months: u32,
}

/// Daily share of the monthly overhead figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DailyOverhead {
    pub(crate) fixed_costs: Decimal,
    pub(crate) marketing_costs: Decimal,
    pub(crate) rent: Decimal,
}

/// One aggregation cell. Field names on disk follow the report layout consumers expect.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ReportBucket {
    pub(crate) total: Decimal,
    pub(crate) discount: Decimal,
    pub(crate) shipping: Decimal,
    pub(crate) tax: Decimal,
    pub(crate) shipping_tax: Decimal,
    pub(crate) quantity: u64,
    #[serde(rename = "cogs_price")]
    pub(crate) cogs: Decimal,
    pub(crate) packing_cost: Decimal,
    /// Work time converted to money at the hourly labor rate
    #[serde(rename = "work_time_minutes")]
    pub(crate) labor_cost: Decimal,
    pub(crate) development_cost: Decimal,
    pub(crate) development_months: u32,
    #[serde(rename = "costs")]
    pub(crate) fixed_costs: Decimal,
    pub(crate) marketing_costs: Decimal,
    pub(crate) rent: Decimal,
}

impl ReportBucket {
    pub(crate) fn with_overhead(overhead: DailyOverhead) -> Self {
        Self {
            fixed_costs: overhead.fixed_costs,
            marketing_costs: overhead.marketing_costs,
            rent: overhead.rent,
            ..Default::default()
        }
    }

    pub(crate) fn profit(&self) -> Decimal {
        [
            self.cogs,
            self.packing_cost,
            self.tax,
            self.shipping,
            self.shipping_tax,
            self.fixed_costs,
            self.marketing_costs,
            self.rent,
        ]
        .into_iter()
        .fold(self.total, Decimal::saturating_sub)
    }

    pub(crate) fn revenue(&self) -> Decimal {
        self.total
            .saturating_sub(self.tax)
            .saturating_sub(self.discount)
    }

    /// Field-wise sum, or `None` if any field overflows
    pub(crate) fn checked_add(&self, other: &ReportBucket) -> Option<ReportBucket> {
        Some(ReportBucket {
            total: self.total.checked_add(other.total)?,
            discount: self.discount.checked_add(other.discount)?,
            shipping: self.shipping.checked_add(other.shipping)?,
            tax: self.tax.checked_add(other.tax)?,
            shipping_tax: self.shipping_tax.checked_add(other.shipping_tax)?,
            quantity: self.quantity.checked_add(other.quantity)?,
            cogs: self.cogs.checked_add(other.cogs)?,
            packing_cost: self.packing_cost.checked_add(other.packing_cost)?,
            labor_cost: self.labor_cost.checked_add(other.labor_cost)?,
            development_cost: self.development_cost.checked_add(other.development_cost)?,
            development_months: self.development_months.checked_add(other.development_months)?,
            fixed_costs: self.fixed_costs.checked_add(other.fixed_costs)?,
            marketing_costs: self.marketing_costs.checked_add(other.marketing_costs)?,
            rent: self.rent.checked_add(other.rent)?,
        })
    }

    /// Saturating field-wise sum for view totals
    pub(crate) fn add(&mut self, other: &ReportBucket) {
        self.total = self.total.saturating_add(other.total);
        self.discount = self.discount.saturating_add(other.discount);
        self.shipping = self.shipping.saturating_add(other.shipping);
        self.tax = self.tax.saturating_add(other.tax);
        self.shipping_tax = self.shipping_tax.saturating_add(other.shipping_tax);
        self.quantity = self.quantity.saturating_add(other.quantity);
        self.cogs = self.cogs.saturating_add(other.cogs);
        self.packing_cost = self.packing_cost.saturating_add(other.packing_cost);
        self.labor_cost = self.labor_cost.saturating_add(other.labor_cost);
        self.development_cost = self.development_cost.saturating_add(other.development_cost);
        self.development_months = self.development_months.saturating_add(other.development_months);
        self.fixed_costs = self.fixed_costs.saturating_add(other.fixed_costs);
        self.marketing_costs = self.marketing_costs.saturating_add(other.marketing_costs);
        self.rent = self.rent.saturating_add(other.rent);
    }
}

/// Date-keyed bucket collection, contiguous between its first and last day
pub(crate) type Timeline = BTreeMap<NaiveDate, ReportBucket>;

/// Date filter for views
#[derive(Debug, Clone, Default)]
pub(crate) struct DateFilter {
    pub(crate) since: Option<NaiveDate>,
    pub(crate) until: Option<NaiveDate>,
}

impl DateFilter {
    pub(crate) fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Self {
        Self { since, until }
    }

    pub(crate) fn day(date: NaiveDate) -> Self {
        Self::new(Some(date), Some(date))
    }

    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        if let Some(s) = self.since
            && date < s
        {
            return false;
        }
        if let Some(u) = self.until
            && date > u
        {
            return false;
        }
        true
    }
}

/// Loading result with statistics
#[derive(Debug, Default)]
pub(crate) struct LoadResult {
    pub(crate) orders: Vec<OrderRecord>,
    /// Orders rejected by normalization (status, date, malformed)
    pub(crate) skipped: usize,
    pub(crate) valid: usize,
    /// Processing time in milliseconds
    pub(crate) elapsed_ms: f64,
}
