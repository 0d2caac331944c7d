//! Order de-duplication
//!
//! Paging a live store can serve the same order twice when records shift
//! between pages. The copy seen last is the freshest and wins.

use std::collections::HashMap;

use crate::core::types::OrderRecord;

/// Keep one record per order id, sorted by (date, id)
pub(crate) fn deduplicate(orders: Vec<OrderRecord>) -> Vec<OrderRecord> {
    let mut by_id: HashMap<u64, OrderRecord> = HashMap::with_capacity(orders.len());
    for order in orders {
        by_id.insert(order.order_id, order);
    }

    let mut unique: Vec<OrderRecord> = by_id.into_values().collect();
    unique.sort_by(|a, b| a.date.cmp(&b.date).then(a.order_id.cmp(&b.order_id)));
    unique
}
