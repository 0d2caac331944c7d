use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::cache::{CacheBackend, CacheController, ReportOutcome, ReportStore, open_store};
use crate::cli::{
    CacheCommands, Cli, Commands, CostCommands, SettingsCommands, SkuCommands, SortOrder,
    TimelineArgs,
};
use crate::config::{Config, default_cache_path, default_data_file};
use crate::consts::{
    DATE_FORMAT, DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL_HOURS, DEFAULT_HOURLY_LABOR_RATE,
    DEFAULT_PER_PAGE,
};
use crate::core::{
    Aggregator, DateFilter, OverheadKind, OverheadSchedule, Page, ReportBucket, SettingsDocument,
    paginate,
};
use crate::costs::{CostField, CostResolver, ProductCatalog, set_cost_field, set_sku};
use crate::error::{AppError, CatalogError, ReportError, SourceError};
use crate::output::{
    Period, PeriodRow, ReportSummary, TableOptions, output_cache_status_json, output_cost_json,
    output_order_csv, output_order_json, output_product_csv, output_product_json,
    output_settings_json, output_timeline_csv, output_timeline_json, print_cache_status,
    print_cost_table, print_order_table, print_product_table, print_settings_table,
    print_timeline_table, rollup,
};
use crate::source::{JsonOrderStore, OrderLoader};
use crate::utils::Timezone;

pub(crate) struct CommandContext<'a> {
    pub(crate) cli: &'a Cli,
    pub(crate) config: &'a Config,
    pub(crate) filter: DateFilter,
    pub(crate) timezone: Timezone,
}

impl CommandContext<'_> {
    fn orders_path(&self) -> PathBuf {
        self.cli
            .orders
            .clone()
            .unwrap_or_else(|| default_data_file("orders.json"))
    }

    fn products_path(&self) -> PathBuf {
        self.cli
            .products
            .clone()
            .unwrap_or_else(|| default_data_file("products.json"))
    }

    fn settings_path(&self) -> PathBuf {
        self.cli
            .settings
            .clone()
            .unwrap_or_else(|| default_data_file("settings.json"))
    }

    fn backend(&self) -> CacheBackend {
        self.cli.backend.unwrap_or_default()
    }

    fn cache_path(&self) -> PathBuf {
        self.cli
            .cache
            .clone()
            .unwrap_or_else(|| default_cache_path(self.backend()))
    }

    fn per_page(&self) -> usize {
        self.cli.per_page.unwrap_or(DEFAULT_PER_PAGE)
    }

    fn batch_size(&self) -> usize {
        self.config.batch_size.unwrap_or(DEFAULT_BATCH_SIZE)
    }

    fn hourly_rate(&self) -> Decimal {
        self.config
            .hourly_labor_rate
            .unwrap_or_else(|| Decimal::from(DEFAULT_HOURLY_LABOR_RATE))
    }

    fn ttl(&self) -> TimeDelta {
        let hours = self.config.cache_ttl_hours.unwrap_or(DEFAULT_CACHE_TTL_HOURS);
        i64::try_from(hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .unwrap_or(TimeDelta::MAX)
    }

    fn table_options(&self) -> TableOptions {
        TableOptions {
            use_color: self.cli.use_color(),
        }
    }

    fn store(&self) -> Box<dyn ReportStore> {
        open_store(self.backend(), &self.cache_path())
    }
}

/// Everything a report run reads
struct Inputs {
    orders: JsonOrderStore,
    catalog: ProductCatalog,
    /// Set when the product export exists but could not be read
    unreadable_catalog: Option<SourceError>,
    overheads: OverheadSchedule,
}

impl Inputs {
    fn load(ctx: &CommandContext<'_>) -> Result<Self, AppError> {
        let (catalog, unreadable_catalog) = match ProductCatalog::load(&ctx.products_path()) {
            Ok(catalog) => (catalog, None),
            Err(CatalogError::Read { path, source }) => {
                tracing::warn!("Product export {} is unreadable: {source}", path.display());
                (
                    ProductCatalog::default(),
                    Some(SourceError::ProductsUnreachable { path, source }),
                )
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            orders: JsonOrderStore::new(&ctx.orders_path()),
            catalog,
            unreadable_catalog,
            overheads: OverheadSchedule::load(&ctx.settings_path())?,
        })
    }

    fn controller<'a>(
        &'a self,
        store: &'a dyn ReportStore,
        ctx: &CommandContext<'_>,
    ) -> CacheController<'a> {
        CacheController::new(store, &self.orders, &self.catalog, &self.overheads)
            .with_ttl(ctx.ttl())
            .with_hourly_rate(ctx.hourly_rate())
            .with_batch_size(ctx.batch_size())
            .with_timezone(ctx.timezone)
    }

    /// Build or serve the report. Without a readable product export only the
    /// stored snapshot can be served.
    fn report(
        &mut self,
        ctx: &CommandContext<'_>,
        regenerate: bool,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome, AppError> {
        let unreadable = self.unreadable_catalog.take();
        let store = ctx.store();
        let controller = self.controller(store.as_ref(), ctx);
        let outcome = match unreadable {
            Some(error) => controller.serve_cached(error)?,
            None => controller.generate_report(regenerate, now)?,
        };
        Ok(outcome)
    }
}

fn print_output(text: &str) {
    if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }
}

fn handle_timeline(
    period: Period,
    args: &TimelineArgs,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let mut inputs = Inputs::load(ctx)?;
    let outcome = inputs.report(ctx, args.regenerate, Utc::now())?;

    let mut rows = rollup(&outcome.buckets, period, &ctx.filter);
    if rows.is_empty() {
        println!("No data in the selected date range.");
        return Ok(());
    }
    if ctx.cli.order == SortOrder::Desc {
        rows.reverse();
    }
    let page = paginate(rows, ctx.cli.page, ctx.per_page())?;

    if ctx.cli.json {
        print_output(&output_timeline_json(&page, period, &outcome));
    } else if ctx.cli.csv {
        print_output(&output_timeline_csv(&page.items, period));
    } else {
        print_timeline_table(
            &page.items,
            period,
            ReportSummary {
                generated_at: outcome.generated_at,
                served: outcome.served,
                current_page: page.current_page,
                total_pages: page.total_pages,
            },
            ctx.table_options(),
        );
    }
    Ok(())
}

fn handle_today(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let mut inputs = Inputs::load(ctx)?;
    let now = Utc::now();
    let outcome = inputs.report(ctx, false, now)?;

    let today = ctx.timezone.today(now);
    // Outside the cached range with no orders yet: only today's overhead applies
    let bucket = outcome
        .buckets
        .get(&today)
        .cloned()
        .unwrap_or_else(|| ReportBucket::with_overhead(inputs.overheads.daily(today)));
    let row = PeriodRow {
        key: today.format(DATE_FORMAT).to_string(),
        bucket,
    };
    let page = paginate(vec![row], 1, 1)?;

    if ctx.cli.json {
        print_output(&output_timeline_json(&page, Period::Day, &outcome));
    } else if ctx.cli.csv {
        print_output(&output_timeline_csv(&page.items, Period::Day));
    } else {
        print_timeline_table(
            &page.items,
            Period::Day,
            ReportSummary {
                generated_at: outcome.generated_at,
                served: outcome.served,
                current_page: 1,
                total_pages: 1,
            },
            ctx.table_options(),
        );
    }
    Ok(())
}

fn handle_products(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let mut inputs = Inputs::load(ctx)?;
    if let Some(error) = inputs.unreadable_catalog.take() {
        return Err(ReportError::SourceUnavailable(error).into());
    }
    let result = OrderLoader::new(&inputs.orders, ctx.batch_size()).load(&ctx.filter)?;
    if result.orders.is_empty() {
        return Err(ReportError::NoData.into());
    }

    let resolver = CostResolver::new(&inputs.catalog);
    let aggregator = Aggregator::new(&resolver, &inputs.overheads, ctx.hourly_rate());
    let mut products = aggregator.product_rollup(&result.orders);
    if ctx.cli.order == SortOrder::Desc {
        products.reverse();
    }
    let page = paginate(products, ctx.cli.page, ctx.per_page())?;

    if ctx.cli.json {
        print_output(&output_product_json(&page));
    } else if ctx.cli.csv {
        print_output(&output_product_csv(&page.items));
    } else {
        print_product_table(&page, ctx.table_options());
    }
    Ok(())
}

fn handle_orders(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let orders = JsonOrderStore::new(&ctx.orders_path());
    let result = OrderLoader::new(&orders, ctx.batch_size()).load(&ctx.filter)?;
    let mut records = result.orders;
    if ctx.cli.order == SortOrder::Desc {
        records.reverse();
    }
    let page: Page<_> = paginate(records, ctx.cli.page, ctx.per_page())?;

    if ctx.cli.json {
        print_output(&output_order_json(&page));
    } else if ctx.cli.csv {
        print_output(&output_order_csv(&page.items));
    } else if page.total_items == 0 {
        println!("No reportable orders found.");
    } else {
        print_order_table(&page, ctx.table_options());
    }
    Ok(())
}

fn handle_cost(command: &CostCommands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let mut catalog = ProductCatalog::load(&ctx.products_path())?;
    match command {
        CostCommands::Show { id } => {
            if !catalog.contains(*id) {
                return Err(CatalogError::UnknownProduct(*id).into());
            }
            let resolver = CostResolver::new(&catalog);
            let resolved = resolver.explain(*id, None);
            let info = resolver.product_info(*id);
            if ctx.cli.json {
                print_output(&output_cost_json(*id, info.as_ref(), &resolved));
            } else {
                print_cost_table(*id, info.as_ref(), &resolved, ctx.table_options());
            }
        }
        CostCommands::Set { id, field, value } => {
            let field: CostField = field.parse()?;
            if set_cost_field(&mut catalog, *id, field, value)? {
                catalog.save()?;
                println!("Product {id}: {} updated.", field.name());
                println!("Cached days keep their old costs until the next regeneration.");
            } else {
                println!("Product {id}: {} unchanged.", field.name());
            }
        }
    }
    Ok(())
}

fn handle_sku(command: &SkuCommands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let SkuCommands::Set { sku, ids } = command;
    let mut catalog = ProductCatalog::load(&ctx.products_path())?;
    let changed = set_sku(&mut catalog, ids, sku)?;
    if changed > 0 {
        catalog.save()?;
    }
    println!("SKU \"{}\" set on {changed} product(s).", sku.trim());
    Ok(())
}

fn handle_settings(
    command: &SettingsCommands,
    ctx: &CommandContext<'_>,
) -> Result<(), AppError> {
    let mut document = SettingsDocument::load(&ctx.settings_path())?;
    match command {
        SettingsCommands::Show => {
            if ctx.cli.json {
                print_output(&output_settings_json(&document.as_value()));
            } else {
                print_settings_table(&document.schedule(), ctx.table_options());
            }
        }
        SettingsCommands::Set {
            kind,
            year,
            month,
            amount,
        } => {
            let kind: OverheadKind = kind.parse()?;
            if document.set(kind, *year, *month, amount)? {
                document.save()?;
                println!("{} for {year}-{month:02} updated.", kind.name());
                println!("Cached days keep their old overhead until the next regeneration.");
            } else {
                println!("{} for {year}-{month:02} unchanged.", kind.name());
            }
        }
    }
    Ok(())
}

fn handle_cache(command: &CacheCommands, ctx: &CommandContext<'_>) -> Result<(), AppError> {
    // Status and clear only touch the store; inputs stay unread
    let orders = JsonOrderStore::new(&ctx.orders_path());
    let catalog = ProductCatalog::default();
    let overheads = OverheadSchedule::default();
    let store = ctx.store();
    let controller = CacheController::new(store.as_ref(), &orders, &catalog, &overheads)
        .with_ttl(ctx.ttl());

    match command {
        CacheCommands::Status => {
            let status = controller.status(Utc::now());
            if ctx.cli.json {
                print_output(&output_cache_status_json(&status));
            } else {
                print_cache_status(&status, ctx.table_options());
            }
        }
        CacheCommands::Clear => {
            if controller.clear()? {
                println!("Report cache cleared.");
            } else {
                println!("Report cache was already empty.");
            }
        }
    }
    Ok(())
}

pub(crate) fn run(ctx: &CommandContext<'_>) -> Result<(), AppError> {
    let default_args = TimelineArgs::default();
    match &ctx.cli.command {
        None => handle_timeline(Period::Day, &default_args, ctx),
        Some(Commands::Daily(args)) => handle_timeline(Period::Day, args, ctx),
        Some(Commands::Weekly(args)) => handle_timeline(Period::Week, args, ctx),
        Some(Commands::Monthly(args)) => handle_timeline(Period::Month, args, ctx),
        Some(Commands::Today) => handle_today(ctx),
        Some(Commands::Products) => handle_products(ctx),
        Some(Commands::Orders) => handle_orders(ctx),
        Some(Commands::Cost { command }) => handle_cost(command, ctx),
        Some(Commands::Sku { command }) => handle_sku(command, ctx),
        Some(Commands::Settings { command }) => handle_settings(command, ctx),
        Some(Commands::Cache { command }) => handle_cache(command, ctx),
    }
}
