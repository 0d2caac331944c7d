use serde_json::{Value, json};

use crate::cache::{CacheStatus, ReportOutcome};
use crate::core::{OrderRecord, Page, ProductRollup, ReportBucket};
use crate::costs::{ProductInfo, ResolvedCost};
use crate::output::format::money_json_value;
use crate::output::period::{Period, PeriodRow, totals};

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn page_meta<T>(page: &Page<T>, total_key: &str) -> Value {
    json!({
        total_key: page.total_items,
        "total_pages": page.total_pages,
        "current_page": page.current_page,
        "per_page": page.per_page,
    })
}

fn bucket_json(bucket: &ReportBucket) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    let mut money = |key: &str, amount| {
        map.insert(key.to_string(), money_json_value(amount));
    };
    money("total", bucket.total);
    money("discount", bucket.discount);
    money("shipping", bucket.shipping);
    money("tax", bucket.tax);
    money("shipping_tax", bucket.shipping_tax);
    money("cogs_price", bucket.cogs);
    money("packing_cost", bucket.packing_cost);
    money("work_time_minutes", bucket.labor_cost);
    money("development_cost", bucket.development_cost);
    money("costs", bucket.fixed_costs);
    money("marketing_costs", bucket.marketing_costs);
    money("rent", bucket.rent);
    money("revenue", bucket.revenue());
    money("profit", bucket.profit());
    map.insert("quantity".to_string(), json!(bucket.quantity));
    map.insert(
        "development_months".to_string(),
        json!(bucket.development_months),
    );
    map
}

/// Timeline rows already filtered, ordered and paged
pub(crate) fn output_timeline_json(
    page: &Page<PeriodRow>,
    period: Period,
    outcome: &ReportOutcome,
) -> String {
    let rows: Vec<Value> = page
        .items
        .iter()
        .map(|row| {
            let mut obj = bucket_json(&row.bucket);
            obj.insert(period.label().to_string(), json!(row.key));
            Value::Object(obj)
        })
        .collect();

    let output = json!({
        "period": period.label(),
        "generated_at": outcome.generated_at.to_rfc3339(),
        "served": outcome.served.as_str(),
        "rows": rows,
        "totals": Value::Object(bucket_json(&totals(&page.items))),
        "meta": page_meta(page, "total_items"),
    });
    pretty(&output)
}

pub(crate) fn output_product_json(page: &Page<ProductRollup>) -> String {
    let products: Vec<Value> = page
        .items
        .iter()
        .map(|p| {
            json!({
                "product_id": p.product_id,
                "name": p.name,
                "sku": p.sku,
                "quantity": p.quantity,
                "revenue": money_json_value(p.revenue),
                "cogs_price": money_json_value(p.cogs),
                "packing_cost": money_json_value(p.packing_cost),
                "labor_cost": money_json_value(p.labor_cost),
                "development_cost": money_json_value(p.development_cost),
                "development_months": p.development_months,
                "total_cost": money_json_value(p.total_cost()),
                "profit": money_json_value(p.profit()),
            })
        })
        .collect();
    pretty(&json!({
        "products": products,
        "meta": page_meta(page, "total_items"),
    }))
}

pub(crate) fn output_order_json(page: &Page<OrderRecord>) -> String {
    let orders: Vec<Value> = page
        .items
        .iter()
        .map(|o| {
            let items: Vec<Value> = o
                .line_items
                .iter()
                .map(|item| {
                    json!({
                        "product_id": item.product_id,
                        "variation_id": item.variation_id,
                        "name": item.name,
                        "quantity": item.quantity,
                        "subtotal": money_json_value(item.subtotal),
                        "total": money_json_value(item.total),
                        "is_bundle_child": item.is_bundle_child,
                        "bundle_parent_id": item.bundle_parent_id,
                        "excluded": item.excluded,
                    })
                })
                .collect();
            json!({
                "order_id": o.order_id,
                "date": o.date.to_string(),
                "status": o.status.as_str(),
                "currency": o.currency,
                "total": money_json_value(o.total),
                "shipping": money_json_value(o.shipping),
                "tax": money_json_value(o.tax),
                "shipping_tax": money_json_value(o.shipping_tax),
                "discount": money_json_value(o.discount),
                "revenue": money_json_value(o.revenue()),
                "line_items": items,
            })
        })
        .collect();
    pretty(&json!({
        "orders": orders,
        "meta": page_meta(page, "total_orders"),
    }))
}

pub(crate) fn output_cost_json(
    product_id: u64,
    info: Option<&ProductInfo>,
    resolved: &ResolvedCost,
) -> String {
    let cost = &resolved.cost;
    let inherited: Vec<&str> = resolved.inherited.iter().map(|f| f.name()).collect();
    pretty(&json!({
        "product_id": product_id,
        "name": info.map(|i| i.name.as_str()),
        "sku": info.map(|i| i.sku.as_str()),
        "parent_id": info.and_then(|i| i.parent_id),
        "cogs_price": money_json_value(cost.cogs_price),
        "packing_cost": money_json_value(cost.packing_cost),
        "work_time_minutes": cost.work_time_minutes,
        "development_cost": money_json_value(cost.development_cost),
        "development_months": cost.development_months,
        "inherited": inherited,
    }))
}

/// The settings document as stored, unknown keys included
pub(crate) fn output_settings_json(document: &Value) -> String {
    pretty(document)
}

pub(crate) fn output_cache_status_json(status: &CacheStatus) -> String {
    pretty(&json!({
        "state": status.state.as_str(),
        "location": status.location,
        "generated_at": status.generated_at.map(|g| g.to_rfc3339()),
        "age_seconds": status.age.map(|a| a.num_seconds()),
        "buckets": status.buckets,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Served;
    use crate::core::{OrderStatus, paginate};
    use crate::costs::CostField;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn outcome() -> ReportOutcome {
        ReportOutcome {
            buckets: Default::default(),
            generated_at: "2025-01-02T03:04:05Z".parse().unwrap(),
            served: Served::Regenerated,
        }
    }

    #[test]
    fn timeline_json_has_rows_totals_and_meta() {
        let rows = vec![
            PeriodRow {
                key: "2025-01-01".to_string(),
                bucket: ReportBucket {
                    total: dec!(100),
                    tax: dec!(10),
                    cogs: dec!(20),
                    quantity: 2,
                    ..Default::default()
                },
            },
            PeriodRow {
                key: "2025-01-02".to_string(),
                bucket: ReportBucket {
                    total: dec!(50),
                    rent: dec!(5),
                    ..Default::default()
                },
            },
        ];
        let page = paginate(rows, 1, 100).unwrap();
        let text = output_timeline_json(&page, Period::Day, &outcome());
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["period"], "day");
        assert_eq!(value["served"], "regenerated");
        assert_eq!(value["rows"][0]["date"], "2025-01-01");
        assert_eq!(value["rows"][0]["profit"].as_f64(), Some(70.0));
        assert_eq!(value["rows"][0]["revenue"].as_f64(), Some(90.0));
        assert_eq!(value["rows"][0]["quantity"], 2);
        assert_eq!(value["totals"]["total"].as_f64(), Some(150.0));
        assert_eq!(value["totals"]["profit"].as_f64(), Some(115.0));
        assert_eq!(value["meta"]["total_items"], 2);
        assert_eq!(value["meta"]["per_page"], 100);
    }

    #[test]
    fn weekly_rows_are_keyed_by_week() {
        let rows = vec![PeriodRow {
            key: "2025-01-06".to_string(),
            bucket: ReportBucket::default(),
        }];
        let page = paginate(rows, 1, 10).unwrap();
        let value: Value =
            serde_json::from_str(&output_timeline_json(&page, Period::Week, &outcome())).unwrap();
        assert_eq!(value["rows"][0]["week"], "2025-01-06");
        assert!(value["rows"][0].get("date").is_none());
    }

    #[test]
    fn order_json_meta_uses_total_orders() {
        let order = OrderRecord {
            order_id: 7,
            date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            currency: "EUR".to_string(),
            status: OrderStatus::Processing,
            total: dec!(12.5),
            shipping: dec!(2),
            tax: dec!(1.5),
            shipping_tax: dec!(0),
            discount: dec!(1),
            line_items: Vec::new(),
        };
        let page = paginate(vec![order], 1, 100).unwrap();
        let value: Value = serde_json::from_str(&output_order_json(&page)).unwrap();
        assert_eq!(value["orders"][0]["order_id"], 7);
        assert_eq!(value["orders"][0]["status"], "processing");
        assert_eq!(value["orders"][0]["revenue"].as_f64(), Some(10.0));
        assert_eq!(value["meta"]["total_orders"], 1);
        assert_eq!(value["meta"]["total_pages"], 1);
        assert_eq!(value["meta"]["current_page"], 1);
    }

    #[test]
    fn product_json_includes_profit() {
        let rollup = ProductRollup {
            product_id: 10,
            name: "Mug".to_string(),
            sku: "MUG".to_string(),
            quantity: 3,
            revenue: dec!(30),
            cogs: dec!(9),
            development_cost: dec!(5),
            ..Default::default()
        };
        let page = paginate(vec![rollup], 1, 100).unwrap();
        let value: Value = serde_json::from_str(&output_product_json(&page)).unwrap();
        assert_eq!(value["products"][0]["sku"], "MUG");
        assert_eq!(value["products"][0]["total_cost"].as_f64(), Some(14.0));
        assert_eq!(value["products"][0]["profit"].as_f64(), Some(16.0));
    }

    #[test]
    fn cost_json_lists_inherited_fields() {
        let resolved = ResolvedCost {
            cost: crate::core::ProductCost {
                cogs_price: dec!(5),
                work_time_minutes: 6,
                ..Default::default()
            },
            inherited: vec![CostField::WorkTimeMinutes],
        };
        let info = ProductInfo {
            name: "Mug - Red".to_string(),
            sku: "MUG-RED".to_string(),
            parent_id: Some(10),
        };
        let value: Value =
            serde_json::from_str(&output_cost_json(11, Some(&info), &resolved)).unwrap();
        assert_eq!(value["cogs_price"].as_f64(), Some(5.0));
        assert_eq!(value["work_time_minutes"], 6);
        assert_eq!(value["parent_id"], 10);
        assert_eq!(value["inherited"][0], "work_time_minutes");
    }
}
