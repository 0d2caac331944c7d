//! Typed cost and SKU updates
//!
//! Only the fields in `CostField` are writable; there is no setter by arbitrary name.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use std::collections::HashSet;
use std::str::FromStr;

use super::catalog::ProductCatalog;
use crate::consts::{
    META_COGS_PRICE, META_DEVELOPMENT_COST, META_DEVELOPMENT_MONTHS, META_PACKING_COST,
    META_WORK_TIME_MINUTES,
};
use crate::core::parse_amount_str;
use crate::error::CatalogError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CostField {
    CogsPrice,
    PackingCost,
    WorkTimeMinutes,
    DevelopmentCost,
    DevelopmentMonths,
}

impl CostField {
    pub(crate) const ALL: [CostField; 5] = [
        CostField::CogsPrice,
        CostField::PackingCost,
        CostField::WorkTimeMinutes,
        CostField::DevelopmentCost,
        CostField::DevelopmentMonths,
    ];

    pub(crate) fn name(self) -> &'static str {
        match self {
            CostField::CogsPrice => "cogs_price",
            CostField::PackingCost => "packing_cost",
            CostField::WorkTimeMinutes => "work_time_minutes",
            CostField::DevelopmentCost => "development_cost",
            CostField::DevelopmentMonths => "development_months",
        }
    }

    pub(crate) fn meta_key(self) -> &'static str {
        match self {
            CostField::CogsPrice => META_COGS_PRICE,
            CostField::PackingCost => META_PACKING_COST,
            CostField::WorkTimeMinutes => META_WORK_TIME_MINUTES,
            CostField::DevelopmentCost => META_DEVELOPMENT_COST,
            CostField::DevelopmentMonths => META_DEVELOPMENT_MONTHS,
        }
    }

    /// Whole-number fields (minutes, months)
    pub(crate) fn is_count(self) -> bool {
        matches!(self, CostField::WorkTimeMinutes | CostField::DevelopmentMonths)
    }

    /// Parse editor input. Empty input means "leave unchanged".
    pub(crate) fn parse_value(self, raw: &str) -> Result<Option<CostValue>, CatalogError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let invalid = || CatalogError::InvalidValue {
            field: self.name(),
            value: raw.to_string(),
        };
        let amount = parse_amount_str(raw)
            .filter(|v| !v.is_sign_negative() || v.is_zero())
            .ok_or_else(invalid)?;
        if self.is_count() {
            if !amount.fract().is_zero() {
                return Err(invalid());
            }
            let count = amount.to_u32().ok_or_else(invalid)?;
            Ok(Some(CostValue::Count(count)))
        } else {
            Ok(Some(CostValue::Money(amount.normalize())))
        }
    }
}

impl FromStr for CostField {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().trim_start_matches('_').to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "cogs_price" | "cogs" | "cogsprice" => Ok(CostField::CogsPrice),
            "packing_cost" | "packing" | "packingcost" => Ok(CostField::PackingCost),
            "work_time_minutes" | "work_time" | "worktimeminutes" | "minutes" => {
                Ok(CostField::WorkTimeMinutes)
            }
            "development_cost" | "developmentcost" => Ok(CostField::DevelopmentCost),
            "development_months" | "developmentmonths" => Ok(CostField::DevelopmentMonths),
            _ => Err(CatalogError::UnknownField(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CostValue {
    Money(Decimal),
    Count(u32),
}

impl CostValue {
    fn to_meta(self) -> Value {
        match self {
            CostValue::Money(amount) => Value::String(amount.to_string()),
            CostValue::Count(count) => Value::String(count.to_string()),
        }
    }
}

/// Set one cost field from editor input. Returns whether anything changed.
pub(crate) fn set_cost_field(
    catalog: &mut ProductCatalog,
    product_id: u64,
    field: CostField,
    raw: &str,
) -> Result<bool, CatalogError> {
    if !catalog.contains(product_id) {
        return Err(CatalogError::UnknownProduct(product_id));
    }
    let Some(value) = field.parse_value(raw)? else {
        return Ok(false);
    };
    let entry = catalog
        .entry_mut(product_id)
        .ok_or(CatalogError::UnknownProduct(product_id))?;
    let new = value.to_meta();
    if entry.meta_data.get(field.meta_key()) == Some(&new) {
        return Ok(false);
    }
    entry.meta_data.insert(field.meta_key().to_string(), new);
    tracing::info!("Product {product_id}: {} set to {raw}", field.name());
    Ok(true)
}

/// Assign `sku` to every product in `ids`. Fails if another product already holds it.
pub(crate) fn set_sku(
    catalog: &mut ProductCatalog,
    ids: &[u64],
    sku: &str,
) -> Result<usize, CatalogError> {
    let sku = sku.trim();
    if let Some(missing) = ids.iter().find(|id| !catalog.contains(**id)) {
        return Err(CatalogError::UnknownProduct(*missing));
    }
    let targets: HashSet<u64> = ids.iter().copied().collect();
    if let Some(holder) = catalog.find_sku(sku)
        && !targets.contains(&holder)
    {
        return Err(CatalogError::DuplicateSku {
            sku: sku.to_string(),
            product_id: holder,
        });
    }

    let mut changed = 0;
    for id in &targets {
        if let Some(entry) = catalog.entry_mut(*id)
            && entry.sku != sku
        {
            entry.sku = sku.to_string();
            changed += 1;
        }
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::catalog::CatalogEntry;
    use crate::costs::resolver::ProductCostSource;
    use rust_decimal_macros::dec;
    use std::path::Path;

    fn entry(id: u64, sku: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: format!("product {id}"),
            sku: sku.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> ProductCatalog {
        let mut mug = entry(10, "MUG");
        mug.variations = vec![entry(11, "MUG-RED"), entry(12, "")];
        ProductCatalog::from_entries(Path::new("products.json"), vec![mug, entry(20, "POSTER")])
    }

    #[test]
    fn field_names_and_aliases() {
        assert_eq!("cogs_price".parse::<CostField>().unwrap(), CostField::CogsPrice);
        assert_eq!("_packing_cost".parse::<CostField>().unwrap(), CostField::PackingCost);
        assert_eq!("work-time".parse::<CostField>().unwrap(), CostField::WorkTimeMinutes);
        assert_eq!("DevelopmentMonths".parse::<CostField>().unwrap(), CostField::DevelopmentMonths);
        for field in CostField::ALL {
            assert_eq!(field.name().parse::<CostField>().unwrap(), field);
        }
        assert!(matches!(
            "price".parse::<CostField>(),
            Err(CatalogError::UnknownField(_))
        ));
    }

    #[test]
    fn parse_value_accepts_decimal_comma() {
        assert_eq!(
            CostField::CogsPrice.parse_value("4,5").unwrap(),
            Some(CostValue::Money(dec!(4.5)))
        );
        assert_eq!(CostField::CogsPrice.parse_value("  ").unwrap(), None);
    }

    #[test]
    fn count_fields_reject_fractions() {
        assert_eq!(
            CostField::WorkTimeMinutes.parse_value("15").unwrap(),
            Some(CostValue::Count(15))
        );
        assert!(matches!(
            CostField::WorkTimeMinutes.parse_value("1.5"),
            Err(CatalogError::InvalidValue { field: "work_time_minutes", .. })
        ));
        assert!(CostField::DevelopmentMonths.parse_value("-2").is_err());
        assert!(CostField::PackingCost.parse_value("abc").is_err());
    }

    #[test]
    fn set_cost_field_writes_meta() {
        let mut catalog = catalog();
        assert!(set_cost_field(&mut catalog, 11, CostField::CogsPrice, "3,20").unwrap());
        assert_eq!(catalog.cost_meta(11).unwrap().cogs_price, Some(dec!(3.2)));
        // same value again is not a change
        assert!(!set_cost_field(&mut catalog, 11, CostField::CogsPrice, "3.2").unwrap());
    }

    #[test]
    fn set_cost_field_empty_input_is_noop() {
        let mut catalog = catalog();
        assert!(!set_cost_field(&mut catalog, 10, CostField::PackingCost, "").unwrap());
        assert_eq!(catalog.cost_meta(10).unwrap().packing_cost, None);
    }

    #[test]
    fn set_cost_field_unknown_product() {
        let mut catalog = catalog();
        assert!(matches!(
            set_cost_field(&mut catalog, 99, CostField::CogsPrice, "1"),
            Err(CatalogError::UnknownProduct(99))
        ));
    }

    #[test]
    fn set_sku_updates_all_targets() {
        let mut catalog = catalog();
        assert_eq!(set_sku(&mut catalog, &[11, 12], "MUG-SET").unwrap(), 2);
        assert_eq!(catalog.product_info(12).unwrap().sku, "MUG-SET");
    }

    #[test]
    fn set_sku_rejects_sku_held_elsewhere() {
        let mut catalog = catalog();
        let err = set_sku(&mut catalog, &[11], "POSTER").unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateSku { product_id: 20, .. }));
        assert_eq!(catalog.product_info(11).unwrap().sku, "MUG-RED");
    }

    #[test]
    fn set_sku_allows_sku_within_target_set() {
        let mut catalog = catalog();
        assert_eq!(set_sku(&mut catalog, &[11, 12], "MUG-RED").unwrap(), 1);
    }

    #[test]
    fn set_sku_unknown_product() {
        let mut catalog = catalog();
        assert!(matches!(
            set_sku(&mut catalog, &[11, 77], "X"),
            Err(CatalogError::UnknownProduct(77))
        ));
    }
}
