//! Lenient money parsing for store exports
//!
//! Stores emit amounts as JSON numbers, numeric strings, empty strings or null.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use std::str::FromStr;

/// Parse a money-like value. Empty strings and null are absent.
pub(crate) fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::from_str(&f.to_string()).ok())
            }
        }
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

/// Parse user or store text, accepting a decimal comma ("4,5").
///
/// A comma is only read as the decimal separator when it is the single
/// separator present. Grouped input such as "1,234.50" or "1,000,000" is
/// rejected rather than misread.
pub(crate) fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = match trimmed.matches(',').count() {
        0 => trimmed.to_string(),
        1 if !trimmed.contains('.') => trimmed.replace(',', "."),
        _ => return None,
    };
    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
}

/// Parse a non-negative whole number, rejecting fractions
pub(crate) fn parse_count(value: &Value) -> Option<u32> {
    let amount = parse_amount(value)?;
    if amount.is_sign_negative() || !amount.fract().is_zero() {
        return None;
    }
    amount.to_u32()
}

/// Parse an identifier that may arrive as a number or a numeric string. Zero means absent.
pub(crate) fn parse_id(value: &Value) -> Option<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| parse_amount_str(trimmed).and_then(|d| d.trunc().to_u64()))
        }
        _ => None,
    }?;
    (id != 0).then_some(id)
}
