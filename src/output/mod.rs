mod csv;
mod format;
mod json;
mod period;
mod table;

pub(crate) use csv::{output_order_csv, output_product_csv, output_timeline_csv};
pub(crate) use json::{
    output_cache_status_json, output_cost_json, output_order_json, output_product_json,
    output_settings_json, output_timeline_json,
};
pub(crate) use period::{Period, PeriodRow, rollup};
pub(crate) use table::{
    ReportSummary, TableOptions, print_cache_status, print_cost_table, print_order_table,
    print_product_table, print_settings_table, print_timeline_table,
};
