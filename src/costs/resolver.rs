use std::cell::RefCell;
use std::collections::HashMap;

use rust_decimal::Decimal;

use super::editor::CostField;
use crate::core::ProductCost;

/// Raw per-product cost fields as stored; `None` means empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CostMeta {
    pub(crate) cogs_price: Option<Decimal>,
    pub(crate) packing_cost: Option<Decimal>,
    pub(crate) work_time_minutes: Option<u32>,
    pub(crate) development_cost: Option<Decimal>,
    pub(crate) development_months: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ProductInfo {
    pub(crate) name: String,
    pub(crate) sku: String,
    /// Set for variations
    pub(crate) parent_id: Option<u64>,
}

/// Key-value lookup of product cost attributes
pub(crate) trait ProductCostSource {
    fn cost_meta(&self, id: u64) -> Option<CostMeta>;

    fn product_info(&self, id: u64) -> Option<ProductInfo>;
}

/// Resolved costs plus the fields that came from the parent product
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ResolvedCost {
    pub(crate) cost: ProductCost,
    pub(crate) inherited: Vec<CostField>,
}

/// Resolves product costs with variation-to-parent fallback.
///
/// Lookups are memoized for the lifetime of the resolver only; build one per
/// report generation so results always reflect the current product data.
pub(crate) struct CostResolver<'a> {
    source: &'a dyn ProductCostSource,
    resolved: RefCell<HashMap<(u64, Option<u64>), ProductCost>>,
}

impl<'a> CostResolver<'a> {
    pub(crate) fn new(source: &'a dyn ProductCostSource) -> Self {
        Self {
            source,
            resolved: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn resolve(&self, product_id: u64, variation_id: Option<u64>) -> ProductCost {
        let key = (product_id, variation_id);
        if let Some(cached) = self.resolved.borrow().get(&key) {
            return *cached;
        }

        let cost = self.explain(product_id, variation_id).cost;
        self.resolved.borrow_mut().insert(key, cost);
        cost
    }

    /// Resolve without memoization, reporting which fields fell back to the parent
    pub(crate) fn explain(&self, product_id: u64, variation_id: Option<u64>) -> ResolvedCost {
        let (own_id, parent_id) = match variation_id {
            Some(variation) if variation != product_id => (variation, Some(product_id)),
            _ => (product_id, self.parent_of(product_id)),
        };
        let own = self.source.cost_meta(own_id).unwrap_or_default();
        let parent = parent_id
            .and_then(|id| self.source.cost_meta(id))
            .unwrap_or_default();

        let mut inherited = Vec::new();
        let mut pick_money = |field, own: Option<Decimal>, parent: Option<Decimal>| {
            match own.filter(|v| !v.is_zero()) {
                Some(v) => v,
                None => {
                    if parent.is_some_and(|v| !v.is_zero()) {
                        inherited.push(field);
                    }
                    parent.unwrap_or_default()
                }
            }
        };
        let cogs_price = pick_money(CostField::CogsPrice, own.cogs_price, parent.cogs_price);
        let packing_cost = pick_money(CostField::PackingCost, own.packing_cost, parent.packing_cost);
        let development_cost = pick_money(
            CostField::DevelopmentCost,
            own.development_cost,
            parent.development_cost,
        );

        let mut pick_count = |field, own: Option<u32>, parent: Option<u32>| {
            match own.filter(|v| *v != 0) {
                Some(v) => v,
                None => {
                    if parent.is_some_and(|v| v != 0) {
                        inherited.push(field);
                    }
                    parent.unwrap_or_default()
                }
            }
        };
        let work_time_minutes = pick_count(
            CostField::WorkTimeMinutes,
            own.work_time_minutes,
            parent.work_time_minutes,
        );
        let development_months = pick_count(
            CostField::DevelopmentMonths,
            own.development_months,
            parent.development_months,
        );

        ResolvedCost {
            cost: ProductCost {
                cogs_price,
                packing_cost,
                work_time_minutes,
                development_cost,
                development_months,
            },
            inherited,
        }
    }

    pub(crate) fn product_info(&self, id: u64) -> Option<ProductInfo> {
        self.source.product_info(id)
    }

    fn parent_of(&self, id: u64) -> Option<u64> {
        self.source.product_info(id).and_then(|info| info.parent_id)
    }
}
