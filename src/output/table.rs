use chrono::{DateTime, TimeDelta, Utc};
use comfy_table::{Cell, Color};
use rust_decimal::Decimal;

use crate::cache::{CacheState, CacheStatus, Served};
use crate::consts::UNKNOWN;
use crate::core::{OrderRecord, OverheadSchedule, Page, ProductRollup, ReportBucket};
use crate::costs::{CostField, ProductInfo, ResolvedCost};
use crate::output::format::{
    create_styled_table, format_money, format_number, header_cell, profit_color, right_cell,
    styled_cell,
};
use crate::output::period::{Period, PeriodRow, totals};

#[derive(Debug, Clone, Copy)]
pub(crate) struct TableOptions {
    pub(crate) use_color: bool,
}

/// Where the report came from, shown under the table
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReportSummary {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) served: Served,
    pub(crate) current_page: usize,
    pub(crate) total_pages: usize,
}

pub(super) fn served_label(served: Served) -> &'static str {
    match served {
        Served::Fresh => "cached",
        Served::Regenerated => "regenerated",
        Served::StaleFallback => "cached, order source unavailable",
    }
}

fn format_age(age: TimeDelta) -> String {
    let minutes = age.num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m")
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

fn period_title(period: Period) -> &'static str {
    match period {
        Period::Day => "Daily Profit",
        Period::Week => "Weekly Profit",
        Period::Month => "Monthly Profit",
    }
}

fn period_header(period: Period) -> &'static str {
    match period {
        Period::Day => "Date",
        Period::Week => "Week",
        Period::Month => "Month",
    }
}

fn overhead(bucket: &ReportBucket) -> Decimal {
    bucket.fixed_costs + bucket.marketing_costs + bucket.rent
}

fn bucket_cells(bucket: &ReportBucket, color: Option<Color>, bold: bool, use_color: bool) -> Vec<Cell> {
    let profit = bucket.profit();
    vec![
        right_cell(&format_number(bucket.quantity), color, bold),
        right_cell(&format_money(bucket.total), color, bold),
        right_cell(&format_money(bucket.revenue()), color, bold),
        right_cell(&format_money(bucket.cogs), color, bold),
        right_cell(&format_money(bucket.packing_cost), color, bold),
        right_cell(&format_money(bucket.labor_cost), color, bold),
        right_cell(&format_money(bucket.shipping), color, bold),
        right_cell(&format_money(bucket.tax + bucket.shipping_tax), color, bold),
        right_cell(&format_money(overhead(bucket)), color, bold),
        right_cell(&format_money(profit), profit_color(profit, use_color), bold),
    ]
}

pub(crate) fn print_timeline_table(
    rows: &[PeriodRow],
    period: Period,
    summary: ReportSummary,
    options: TableOptions,
) {
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell(period_header(period), c),
        header_cell("Qty", c),
        header_cell("Total", c),
        header_cell("Revenue", c),
        header_cell("COGS", c),
        header_cell("Packing", c),
        header_cell("Labor", c),
        header_cell("Shipping", c),
        header_cell("Tax", c),
        header_cell("Overhead", c),
        header_cell("Profit", c),
    ]);

    for row in rows {
        let mut cells = vec![Cell::new(&row.key)];
        cells.extend(bucket_cells(&row.bucket, None, false, c));
        table.add_row(cells);
    }

    let cyan = if c { Some(Color::Cyan) } else { None };
    let mut total_row = vec![styled_cell("TOTAL", cyan, true)];
    total_row.extend(bucket_cells(&totals(rows), cyan, true, c));
    table.add_row(total_row);

    println!("\n  {}\n", period_title(period));
    println!("{table}");
    print_summary_line(summary, rows.len(), period, c);
}

fn print_summary_line(summary: ReportSummary, shown: usize, period: Period, use_color: bool) {
    let generated = summary.generated_at.format("%Y-%m-%d %H:%M UTC");
    let mut text = format!(
        "{shown} {}s | generated {generated} ({})",
        period.label(),
        served_label(summary.served)
    );
    if summary.total_pages > 1 {
        text.push_str(&format!(
            " | page {}/{}",
            summary.current_page, summary.total_pages
        ));
    }
    if use_color && summary.served == Served::StaleFallback {
        println!("\n  \x1b[33m{text}\x1b[0m\n");
    } else {
        println!("\n  {text}\n");
    }
}

pub(crate) fn print_product_table(page: &Page<ProductRollup>, options: TableOptions) {
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Product", c),
        header_cell("SKU", c),
        header_cell("Qty", c),
        header_cell("Revenue", c),
        header_cell("COGS", c),
        header_cell("Packing", c),
        header_cell("Labor", c),
        header_cell("Development", c),
        header_cell("Total Cost", c),
        header_cell("Profit", c),
    ]);

    let mut total = ProductRollup::default();
    for product in &page.items {
        let profit = product.profit();
        let name = if product.name.is_empty() {
            format!("#{} ({UNKNOWN})", product.product_id)
        } else {
            product.name.clone()
        };
        table.add_row(vec![
            Cell::new(name),
            Cell::new(if product.sku.is_empty() { "-" } else { product.sku.as_str() }),
            right_cell(&format_number(product.quantity), None, false),
            right_cell(&format_money(product.revenue), None, false),
            right_cell(&format_money(product.cogs), None, false),
            right_cell(&format_money(product.packing_cost), None, false),
            right_cell(&format_money(product.labor_cost), None, false),
            right_cell(&format_money(product.development_cost), None, false),
            right_cell(&format_money(product.total_cost()), None, false),
            right_cell(&format_money(profit), profit_color(profit, c), false),
        ]);
        total.quantity += product.quantity;
        total.revenue += product.revenue;
        total.cogs += product.cogs;
        total.packing_cost += product.packing_cost;
        total.labor_cost += product.labor_cost;
        total.development_cost += product.development_cost;
    }

    let cyan = if c { Some(Color::Cyan) } else { None };
    let profit = total.profit();
    table.add_row(vec![
        styled_cell("TOTAL", cyan, true),
        Cell::new(""),
        right_cell(&format_number(total.quantity), cyan, true),
        right_cell(&format_money(total.revenue), cyan, true),
        right_cell(&format_money(total.cogs), cyan, true),
        right_cell(&format_money(total.packing_cost), cyan, true),
        right_cell(&format_money(total.labor_cost), cyan, true),
        right_cell(&format_money(total.development_cost), cyan, true),
        right_cell(&format_money(total.total_cost()), cyan, true),
        right_cell(&format_money(profit), profit_color(profit, c), true),
    ]);

    println!("\n  Products\n");
    println!("{table}");
    println!(
        "\n  {} products | page {}/{}\n",
        format_number(page.total_items as u64),
        page.current_page,
        page.total_pages.max(1)
    );
}

pub(crate) fn print_order_table(page: &Page<OrderRecord>, options: TableOptions) {
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Order", c),
        header_cell("Date", c),
        header_cell("Status", c),
        header_cell("Items", c),
        header_cell("Total", c),
        header_cell("Shipping", c),
        header_cell("Tax", c),
        header_cell("Discount", c),
        header_cell("Revenue", c),
    ]);

    for order in &page.items {
        let items: u64 = order.counted_items().map(|i| u64::from(i.quantity)).sum();
        table.add_row(vec![
            Cell::new(order.order_id),
            Cell::new(order.date),
            Cell::new(order.status.as_str()),
            right_cell(&format_number(items), None, false),
            right_cell(&format_money(order.total), None, false),
            right_cell(&format_money(order.shipping), None, false),
            right_cell(&format_money(order.tax + order.shipping_tax), None, false),
            right_cell(&format_money(order.discount), None, false),
            right_cell(&format_money(order.revenue()), None, false),
        ]);
    }

    println!("\n  Orders\n");
    println!("{table}");
    println!(
        "\n  {} orders | page {}/{}\n",
        format_number(page.total_items as u64),
        page.current_page,
        page.total_pages.max(1)
    );
}

pub(crate) fn print_cost_table(
    product_id: u64,
    info: Option<&ProductInfo>,
    resolved: &ResolvedCost,
    options: TableOptions,
) {
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Field", c),
        header_cell("Value", c),
        header_cell("Source", c),
    ]);

    let cost = &resolved.cost;
    for field in CostField::ALL {
        let value = match field {
            CostField::CogsPrice => format_money(cost.cogs_price),
            CostField::PackingCost => format_money(cost.packing_cost),
            CostField::WorkTimeMinutes => cost.work_time_minutes.to_string(),
            CostField::DevelopmentCost => format_money(cost.development_cost),
            CostField::DevelopmentMonths => cost.development_months.to_string(),
        };
        let source = if resolved.inherited.contains(&field) {
            "parent"
        } else {
            "own"
        };
        table.add_row(vec![
            Cell::new(field.name()),
            right_cell(&value, None, false),
            Cell::new(source),
        ]);
    }

    let (name, sku) = info.map_or((UNKNOWN, ""), |i| (i.name.as_str(), i.sku.as_str()));
    println!("\n  Product {product_id}: {name}");
    if !sku.is_empty() {
        println!("  SKU: {sku}");
    }
    if let Some(parent) = info.and_then(|i| i.parent_id) {
        println!("  Variation of product {parent}");
    }
    println!("\n{table}\n");
}

pub(crate) fn print_settings_table(schedule: &OverheadSchedule, options: TableOptions) {
    let months = schedule.months();
    if months.is_empty() {
        println!("No overhead configured.");
        return;
    }
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Month", c),
        header_cell("Costs", c),
        header_cell("Marketing", c),
        header_cell("Rent", c),
        header_cell("Total", c),
    ]);
    for (year, month, monthly) in months {
        let total = monthly
            .fixed_costs
            .saturating_add(monthly.marketing_costs)
            .saturating_add(monthly.rent);
        table.add_row(vec![
            Cell::new(format!("{year}-{month:02}")),
            right_cell(&format_money(monthly.fixed_costs), None, false),
            right_cell(&format_money(monthly.marketing_costs), None, false),
            right_cell(&format_money(monthly.rent), None, false),
            right_cell(&format_money(total), None, c),
        ]);
    }
    println!("\n{table}\n");
}

pub(crate) fn print_cache_status(status: &CacheStatus, options: TableOptions) {
    let c = options.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![header_cell("Cache", c), header_cell("Value", c)]);

    let state_color = if c {
        match status.state {
            CacheState::Fresh => Some(Color::Green),
            CacheState::Stale => Some(Color::Yellow),
            CacheState::Empty | CacheState::Refreshing => None,
        }
    } else {
        None
    };
    table.add_row(vec![
        Cell::new("State"),
        styled_cell(status.state.as_str(), state_color, true),
    ]);
    table.add_row(vec![Cell::new("Location"), Cell::new(&status.location)]);
    table.add_row(vec![
        Cell::new("Generated"),
        Cell::new(
            status
                .generated_at
                .map_or_else(|| "-".to_string(), |g| g.to_rfc3339()),
        ),
    ]);
    table.add_row(vec![
        Cell::new("Age"),
        Cell::new(status.age.map_or_else(|| "-".to_string(), format_age)),
    ]);
    table.add_row(vec![
        Cell::new("Buckets"),
        Cell::new(format_number(status.buckets as u64)),
    ]);
    println!("{table}");
}
