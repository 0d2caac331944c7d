mod catalog;
mod editor;
mod resolver;

pub(crate) use catalog::ProductCatalog;
pub(crate) use editor::{CostField, set_cost_field, set_sku};
#[cfg(test)]
pub(crate) use resolver::CostMeta;
pub(crate) use resolver::{CostResolver, ProductCostSource, ProductInfo, ResolvedCost};
