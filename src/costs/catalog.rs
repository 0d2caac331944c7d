//! Product export backed cost store
//!
//! Products carry their cost fields in `meta_data`; variations are nested under
//! their parent. Unknown fields are preserved when the export is written back.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::editor::CostField;
use super::resolver::{CostMeta, ProductCostSource, ProductInfo};
use crate::core::meta_map;
use crate::core::{parse_amount, parse_count};
use crate::error::CatalogError;
use crate::utils::write_atomic;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CatalogEntry {
    #[serde(default)]
    pub(crate) id: u64,
    #[serde(default)]
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) sku: String,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub(crate) kind: String,
    #[serde(default, deserialize_with = "meta_map")]
    pub(crate) meta_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) variations: Vec<CatalogEntry>,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

impl CatalogEntry {
    fn cost_meta(&self) -> CostMeta {
        let money = |field: CostField| self.meta_data.get(field.meta_key()).and_then(parse_amount);
        let count = |field: CostField| self.meta_data.get(field.meta_key()).and_then(parse_count);
        CostMeta {
            cogs_price: money(CostField::CogsPrice),
            packing_cost: money(CostField::PackingCost),
            work_time_minutes: count(CostField::WorkTimeMinutes),
            development_cost: money(CostField::DevelopmentCost),
            development_months: count(CostField::DevelopmentMonths),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<CatalogEntry>),
    Wrapped { products: Vec<CatalogEntry> },
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    product: usize,
    variation: Option<usize>,
}

#[derive(Debug, Default)]
pub(crate) struct ProductCatalog {
    path: PathBuf,
    products: Vec<CatalogEntry>,
    index: HashMap<u64, Slot>,
}

impl ProductCatalog {
    /// Load a product export. A missing file is an empty catalog.
    pub(crate) fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No product export at {}, costs resolve to zero", path.display());
                return Ok(Self::from_entries(path, Vec::new()));
            }
            Err(source) => {
                return Err(CatalogError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let document: CatalogDocument =
            serde_json::from_str(&content).map_err(|source| CatalogError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;
        let products = match document {
            CatalogDocument::List(products) | CatalogDocument::Wrapped { products } => products,
        };
        let catalog = Self::from_entries(path, products);
        tracing::debug!("Loaded {} catalog entries from {}", catalog.index.len(), path.display());
        Ok(catalog)
    }

    pub(crate) fn from_entries(path: &Path, products: Vec<CatalogEntry>) -> Self {
        let mut index = HashMap::new();
        for (p, product) in products.iter().enumerate() {
            index.insert(
                product.id,
                Slot {
                    product: p,
                    variation: None,
                },
            );
            for (v, variation) in product.variations.iter().enumerate() {
                index.insert(
                    variation.id,
                    Slot {
                        product: p,
                        variation: Some(v),
                    },
                );
            }
        }
        Self {
            path: path.to_path_buf(),
            products,
            index,
        }
    }

    /// Write the export back atomically
    pub(crate) fn save(&self) -> Result<(), CatalogError> {
        write_atomic(&self.path, |out: &mut dyn Write| {
            serde_json::to_writer_pretty(&mut *out, &self.products)?;
            out.write_all(b"\n")
        })
        .map_err(|source| CatalogError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub(crate) fn contains(&self, id: u64) -> bool {
        self.index.contains_key(&id)
    }

    pub(crate) fn entry(&self, id: u64) -> Option<&CatalogEntry> {
        let slot = self.index.get(&id)?;
        let product = self.products.get(slot.product)?;
        match slot.variation {
            Some(v) => product.variations.get(v),
            None => Some(product),
        }
    }

    pub(crate) fn entry_mut(&mut self, id: u64) -> Option<&mut CatalogEntry> {
        let slot = *self.index.get(&id)?;
        let product = self.products.get_mut(slot.product)?;
        match slot.variation {
            Some(v) => product.variations.get_mut(v),
            None => Some(product),
        }
    }

    /// Product or variation currently holding `sku`
    pub(crate) fn find_sku(&self, sku: &str) -> Option<u64> {
        let sku = sku.trim();
        if sku.is_empty() {
            return None;
        }
        self.products
            .iter()
            .flat_map(|product| std::iter::once(product).chain(product.variations.iter()))
            .find(|entry| entry.sku.trim() == sku)
            .map(|entry| entry.id)
    }
}

impl ProductCostSource for ProductCatalog {
    fn cost_meta(&self, id: u64) -> Option<CostMeta> {
        self.entry(id).map(CatalogEntry::cost_meta)
    }

    fn product_info(&self, id: u64) -> Option<ProductInfo> {
        let slot = self.index.get(&id)?;
        let entry = self.entry(id)?;
        let parent_id = slot
            .variation
            .and_then(|_| self.products.get(slot.product))
            .map(|product| product.id);
        Some(ProductInfo {
            name: entry.name.clone(),
            sku: entry.sku.clone(),
            parent_id,
        })
    }
}
