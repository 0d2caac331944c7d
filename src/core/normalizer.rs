//! Order normalization
//!
//! Converts raw store orders into `OrderRecord`s: status and date checks,
//! base-currency conversion, and bundle marking.
//!
//! Bundle policy: child lines (those with a bundle back-reference) always
//! count. A container line is excluded when at least one of its children is
//! present in the same order, and counted otherwise, so every bundle sale is
//! represented exactly once.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

use super::amount::{parse_amount, parse_count, parse_id};
use super::types::{LineItem, OrderRecord, OrderStatus};
use crate::consts::{
    META_BUNDLE_MEMBERS, META_BUNDLE_PARENT, META_EXCHANGE_RATE, META_LINE_SUBTOTAL_BASE,
    META_LINE_TOTAL_BASE, META_ORDER_DISCOUNT_BASE, META_ORDER_SHIPPING_BASE,
    META_ORDER_SHIPPING_TAX_BASE, META_ORDER_TAX_BASE, META_ORDER_TOTAL_BASE,
};

// ============================================================================
// Raw store format
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawOrder {
    #[serde(default, alias = "order_id")]
    pub(crate) id: Value,
    #[serde(default)]
    pub(crate) status: String,
    #[serde(default, alias = "date")]
    pub(crate) date_created: Value,
    #[serde(default)]
    pub(crate) currency: String,
    #[serde(default)]
    pub(crate) total: Value,
    #[serde(default, alias = "shipping")]
    pub(crate) shipping_total: Value,
    #[serde(default, alias = "tax")]
    pub(crate) total_tax: Value,
    #[serde(default)]
    pub(crate) shipping_tax: Value,
    #[serde(default, alias = "discount")]
    pub(crate) discount_total: Value,
    #[serde(default, deserialize_with = "meta_map")]
    pub(crate) meta_data: Map<String, Value>,
    #[serde(default)]
    pub(crate) line_items: Vec<RawLineItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawLineItem {
    #[serde(default)]
    pub(crate) product_id: Value,
    #[serde(default)]
    pub(crate) variation_id: Value,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) quantity: Value,
    #[serde(default)]
    pub(crate) subtotal: Value,
    #[serde(default)]
    pub(crate) total: Value,
    #[serde(default, deserialize_with = "meta_map")]
    pub(crate) meta_data: Map<String, Value>,
}

/// Meta arrives either as a key/value object or as a list of `{key, value}` entries.
/// An empty list is what PHP encoders emit for an empty map.
pub(crate) fn meta_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Object(map) => map,
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| {
                let key = entry.get("key")?.as_str()?.to_string();
                let value = entry.get("value").cloned().unwrap_or(Value::Null);
                Some((key, value))
            })
            .collect(),
        _ => Map::new(),
    })
}

impl RawOrder {
    /// Calendar day the order belongs to, if its creation date is readable
    pub(crate) fn day(&self) -> Option<NaiveDate> {
        parse_order_date(&self.date_created).ok()
    }
}

// ============================================================================
// Rejections
// ============================================================================

/// Why an order produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum Rejection {
    #[error("status \"{0}\" is not reportable")]
    UnsupportedStatus(String),

    #[error("missing order id")]
    MissingId,

    #[error("missing creation date")]
    MissingDate,

    #[error("unparseable creation date \"{0}\"")]
    InvalidDate(String),

    #[error("unparseable amount in {0}")]
    InvalidAmount(&'static str),
}

impl Rejection {
    /// Status rejections are expected filtering; everything else is bad data
    pub(crate) fn is_malformed(&self) -> bool {
        !matches!(self, Rejection::UnsupportedStatus(_))
    }
}

// ============================================================================
// Normalization
// ============================================================================

pub(crate) fn normalize(raw: &RawOrder) -> Result<OrderRecord, Rejection> {
    let status = OrderStatus::parse(&raw.status)
        .ok_or_else(|| Rejection::UnsupportedStatus(raw.status.clone()))?;
    let order_id = parse_id(&raw.id).ok_or(Rejection::MissingId)?;
    let date = parse_order_date(&raw.date_created)?;

    let rate = parse_amount(meta(&raw.meta_data, META_EXCHANGE_RATE))
        .filter(|r| !r.is_zero())
        .unwrap_or(Decimal::ONE);
    let amount = |field: &'static str, native: &Value, override_key: &str| {
        base_amount(native, meta(&raw.meta_data, override_key), rate)
            .map_err(|_| Rejection::InvalidAmount(field))
    };

    let total = amount("total", &raw.total, META_ORDER_TOTAL_BASE)?;
    let shipping = amount("shipping", &raw.shipping_total, META_ORDER_SHIPPING_BASE)?;
    let tax = amount("tax", &raw.total_tax, META_ORDER_TAX_BASE)?;
    let shipping_tax = amount("shipping_tax", &raw.shipping_tax, META_ORDER_SHIPPING_TAX_BASE)?;
    let discount = amount("discount", &raw.discount_total, META_ORDER_DISCOUNT_BASE)?;

    let mut line_items: Vec<LineItem> = raw
        .line_items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match normalize_line(item, rate) {
            Some(line) => Some(line),
            None => {
                tracing::warn!("Order {order_id}: skipping malformed line item #{}", index + 1);
                None
            }
        })
        .collect();
    mark_represented_bundles(&mut line_items);

    Ok(OrderRecord {
        order_id,
        date,
        currency: raw.currency.clone(),
        status,
        total,
        shipping,
        tax,
        shipping_tax,
        discount,
        line_items,
    })
}

fn meta<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Value {
    map.get(key).unwrap_or(&Value::Null)
}

/// Base-currency override if present, otherwise the native amount times the exchange rate.
/// An absent native amount is zero; a present but unparseable one is an error.
fn base_amount(native: &Value, base_override: &Value, rate: Decimal) -> Result<Decimal, ()> {
    if let Some(base) = parse_amount(base_override) {
        return Ok(base);
    }
    match parse_amount(native) {
        Some(amount) => amount.checked_mul(rate).ok_or(()),
        None if is_blank(native) => Ok(Decimal::ZERO),
        None => Err(()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn parse_order_date(value: &Value) -> Result<NaiveDate, Rejection> {
    // Serialized store datetimes are objects with a "date" field
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map.get("date").and_then(Value::as_str).unwrap_or(""),
        _ => "",
    }
    .trim();
    if raw.is_empty() {
        return Err(Rejection::MissingDate);
    }
    // The calendar day is the leading YYYY-MM-DD, already in shop-local time
    raw.get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .ok_or_else(|| Rejection::InvalidDate(raw.to_string()))
}

fn normalize_line(item: &RawLineItem, rate: Decimal) -> Option<LineItem> {
    let product_id = parse_id(&item.product_id)?;
    let quantity = parse_count(&item.quantity).filter(|q| *q > 0)?;
    let subtotal = base_amount(&item.subtotal, meta(&item.meta_data, META_LINE_SUBTOTAL_BASE), rate).ok()?;
    let total = base_amount(&item.total, meta(&item.meta_data, META_LINE_TOTAL_BASE), rate).ok()?;
    let bundle_parent_id = parse_id(meta(&item.meta_data, META_BUNDLE_PARENT));
    let is_bundle_container = !is_blank(meta(&item.meta_data, META_BUNDLE_MEMBERS));

    Some(LineItem {
        product_id,
        variation_id: parse_id(&item.variation_id),
        name: item.name.trim().to_string(),
        quantity,
        subtotal,
        total,
        is_bundle_child: bundle_parent_id.is_some(),
        bundle_parent_id,
        is_bundle_container,
        excluded: false,
    })
}

fn mark_represented_bundles(items: &mut [LineItem]) {
    let parents_with_children: HashSet<u64> =
        items.iter().filter_map(|item| item.bundle_parent_id).collect();
    for item in items.iter_mut() {
        item.excluded = item.is_bundle_container
            && !item.is_bundle_child
            && parents_with_children.contains(&item.product_id);
    }
}
