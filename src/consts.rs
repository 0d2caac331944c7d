/// Standard date format used throughout the codebase: "2025-01-15"
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Month key format used by monthly rollups: "2025-01"
pub(crate) const MONTH_FORMAT: &str = "%Y-%m";

/// Fallback label when a product name or SKU is unavailable
pub(crate) const UNKNOWN: &str = "unknown";

/// Labor cost per hour of product work time
pub(crate) const DEFAULT_HOURLY_LABOR_RATE: i64 = 40;

pub(crate) const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// Orders requested from the source per page
pub(crate) const DEFAULT_BATCH_SIZE: usize = 500;

pub(crate) const DEFAULT_PER_PAGE: usize = 100;

// Order meta keys carrying amounts already converted to the shop's base currency
pub(crate) const META_ORDER_TOTAL_BASE: &str = "_order_total_base_currency";
pub(crate) const META_ORDER_SHIPPING_BASE: &str = "_order_shipping_base_currency";
pub(crate) const META_ORDER_TAX_BASE: &str = "_order_tax_base_currency";
pub(crate) const META_ORDER_SHIPPING_TAX_BASE: &str = "_order_shipping_tax_base_currency";
pub(crate) const META_ORDER_DISCOUNT_BASE: &str = "_cart_discount_base_currency";
pub(crate) const META_EXCHANGE_RATE: &str = "_base_currency_exchange_rate";

pub(crate) const META_LINE_SUBTOTAL_BASE: &str = "_line_subtotal_base_currency";
pub(crate) const META_LINE_TOTAL_BASE: &str = "_line_total_base_currency";

// Product bundle back-reference and member list
pub(crate) const META_BUNDLE_PARENT: &str = "_woosb_parent_id";
pub(crate) const META_BUNDLE_MEMBERS: &str = "_woosb_ids";

// Product cost meta keys
pub(crate) const META_COGS_PRICE: &str = "_cogs_price";
pub(crate) const META_PACKING_COST: &str = "_packing_cost";
pub(crate) const META_WORK_TIME_MINUTES: &str = "_work_time_minutes";
pub(crate) const META_DEVELOPMENT_COST: &str = "_development_cost";
pub(crate) const META_DEVELOPMENT_MONTHS: &str = "_development_months";
