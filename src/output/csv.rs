use std::fmt::Write;

use crate::core::{OrderRecord, ProductRollup, ReportBucket};
use crate::output::period::{Period, PeriodRow};

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn bucket_fields(out: &mut String, b: &ReportBucket) {
    let _ = write!(
        out,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        b.quantity,
        b.total,
        b.discount,
        b.shipping,
        b.tax,
        b.shipping_tax,
        b.revenue(),
        b.cogs,
        b.packing_cost,
        b.labor_cost,
        b.development_cost,
        b.development_months,
        b.fixed_costs,
        b.marketing_costs,
        b.rent,
        b.profit(),
    );
}

/// Amounts are written with full precision so totals re-add exactly
pub(crate) fn output_timeline_csv(rows: &[PeriodRow], period: Period) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{},quantity,total,discount,shipping,tax,shipping_tax,revenue,cogs_price,packing_cost,work_time_minutes,development_cost,development_months,costs,marketing_costs,rent,profit",
        period.label()
    );
    for row in rows {
        let _ = write!(out, "{},", csv_escape(&row.key));
        bucket_fields(&mut out, &row.bucket);
        out.push('\n');
    }
    out
}

pub(crate) fn output_product_csv(products: &[ProductRollup]) -> String {
    let mut out = String::from(
        "product_id,name,sku,quantity,revenue,cogs_price,packing_cost,labor_cost,development_cost,development_months,total_cost,profit\n",
    );
    for p in products {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{}",
            p.product_id,
            csv_escape(&p.name),
            csv_escape(&p.sku),
            p.quantity,
            p.revenue,
            p.cogs,
            p.packing_cost,
            p.labor_cost,
            p.development_cost,
            p.development_months,
            p.total_cost(),
            p.profit(),
        );
    }
    out
}

pub(crate) fn output_order_csv(orders: &[OrderRecord]) -> String {
    let mut out = String::from(
        "order_id,date,status,currency,items,total,shipping,tax,shipping_tax,discount,revenue\n",
    );
    for o in orders {
        let items: u64 = o.counted_items().map(|i| u64::from(i.quantity)).sum();
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            o.order_id,
            o.date,
            o.status.as_str(),
            csv_escape(&o.currency),
            items,
            o.total,
            o.shipping,
            o.tax,
            o.shipping_tax,
            o.discount,
            o.revenue(),
        );
    }
    out
}
