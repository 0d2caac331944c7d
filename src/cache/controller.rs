//! Report cache state machine
//!
//! A snapshot younger than the TTL is FRESH: it is served with today's bucket
//! recomputed from live orders and spliced in, without advancing
//! `generated_at`. An EMPTY or STALE snapshot, or a forced request, triggers a
//! full regeneration (REFRESHING) that replaces the snapshot.
//!
//! When the order source is unreachable, any existing snapshot is served as is.
//! A corrupt snapshot counts as EMPTY. A failed write is logged and the report
//! is still returned; the snapshot simply stays where it was.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;

use super::{CachedReport, ReportStore};
use crate::core::{Aggregator, DateFilter, OrderRecord, OverheadSchedule, Timeline};
use crate::costs::{CostResolver, ProductCostSource};
use crate::error::{CacheError, ReportError, SourceError};
use crate::source::{OrderLoader, OrderSource};
use crate::utils::{Timezone, each_day};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheState {
    Empty,
    Fresh,
    Stale,
    Refreshing,
}

impl CacheState {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CacheState::Empty => "EMPTY",
            CacheState::Fresh => "FRESH",
            CacheState::Stale => "STALE",
            CacheState::Refreshing => "REFRESHING",
        }
    }
}

/// How a report was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Served {
    /// Cached snapshot with today recomputed
    Fresh,
    /// Full aggregation over all orders
    Regenerated,
    /// Snapshot served without live data because the source was unreachable
    StaleFallback,
}

impl Served {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Served::Fresh => "fresh",
            Served::Regenerated => "regenerated",
            Served::StaleFallback => "stale_fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ReportOutcome {
    pub(crate) buckets: Timeline,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) served: Served,
}

#[derive(Debug, Clone)]
pub(crate) struct CacheStatus {
    pub(crate) state: CacheState,
    pub(crate) location: String,
    pub(crate) generated_at: Option<DateTime<Utc>>,
    pub(crate) age: Option<TimeDelta>,
    pub(crate) buckets: usize,
}

pub(crate) struct CacheController<'a> {
    store: &'a dyn ReportStore,
    orders: &'a dyn OrderSource,
    products: &'a dyn ProductCostSource,
    overheads: &'a OverheadSchedule,
    ttl: TimeDelta,
    hourly_rate: Decimal,
    batch_size: usize,
    timezone: Timezone,
}

impl<'a> CacheController<'a> {
    pub(crate) fn new(
        store: &'a dyn ReportStore,
        orders: &'a dyn OrderSource,
        products: &'a dyn ProductCostSource,
        overheads: &'a OverheadSchedule,
    ) -> Self {
        Self {
            store,
            orders,
            products,
            overheads,
            ttl: TimeDelta::hours(crate::consts::DEFAULT_CACHE_TTL_HOURS as i64),
            hourly_rate: Decimal::from(crate::consts::DEFAULT_HOURLY_LABOR_RATE),
            batch_size: crate::consts::DEFAULT_BATCH_SIZE,
            timezone: Timezone::Local,
        }
    }

    pub(crate) fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub(crate) fn with_hourly_rate(mut self, rate: Decimal) -> Self {
        self.hourly_rate = rate;
        self
    }

    pub(crate) fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub(crate) fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub(crate) fn evaluate(&self, cached: Option<&CachedReport>, now: DateTime<Utc>) -> CacheState {
        match cached {
            None => CacheState::Empty,
            Some(report) if now - report.generated_at >= self.ttl => CacheState::Stale,
            Some(_) => CacheState::Fresh,
        }
    }

    /// The one entry point for daily, weekly, monthly and today views
    pub(crate) fn generate_report(
        &self,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome, ReportError> {
        let cached = self.load_snapshot();
        let state = self.evaluate(cached.as_ref(), now);
        tracing::debug!("Report cache is {}", state.as_str());

        match (force, state, cached) {
            (false, CacheState::Fresh, Some(snapshot)) => {
                let age = now - snapshot.generated_at;
                tracing::info!(
                    "Using cached report ({:.1}h old), refreshing today",
                    age.num_minutes() as f64 / 60.0
                );
                self.refresh_today(snapshot, now)
            }
            (_, _, cached) => {
                if force {
                    tracing::info!("Regenerating report on request");
                }
                self.regenerate(cached, now)
            }
        }
    }

    pub(crate) fn status(&self, now: DateTime<Utc>) -> CacheStatus {
        let cached = self.load_snapshot();
        CacheStatus {
            state: self.evaluate(cached.as_ref(), now),
            location: self.store.location(),
            generated_at: cached.as_ref().map(|c| c.generated_at),
            age: cached.as_ref().map(|c| now - c.generated_at),
            buckets: cached.as_ref().map_or(0, |c| c.buckets.len()),
        }
    }

    pub(crate) fn clear(&self) -> Result<bool, CacheError> {
        self.store.clear()
    }

    /// Serve the stored snapshot, whatever its age, when an input failed before
    /// the report could be built
    pub(crate) fn serve_cached(&self, error: SourceError) -> Result<ReportOutcome, ReportError> {
        self.fall_back(self.load_snapshot(), error)
    }

    fn load_snapshot(&self) -> Option<CachedReport> {
        match self.store.load() {
            Ok(snapshot) => snapshot,
            Err(CacheError::Corrupt(reason)) => {
                tracing::warn!("Discarding corrupt report cache: {reason}");
                None
            }
            Err(e) => {
                tracing::warn!("{e}; treating cache as empty");
                None
            }
        }
    }

    fn regenerate(
        &self,
        cached: Option<CachedReport>,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome, ReportError> {
        tracing::debug!("Report cache is {}", CacheState::Refreshing.as_str());
        let orders = match self.load_orders(&DateFilter::default()) {
            Ok(orders) => orders,
            Err(e) => return self.fall_back(cached, e),
        };

        let resolver = CostResolver::new(self.products);
        let aggregator = Aggregator::new(&resolver, self.overheads, self.hourly_rate);
        let buckets = aggregator.aggregate(&orders)?;
        tracing::info!(
            "Aggregated {} orders into {} daily buckets",
            orders.len(),
            buckets.len()
        );

        let snapshot = CachedReport::new(now, buckets);
        self.persist(&snapshot);
        Ok(ReportOutcome {
            buckets: snapshot.buckets,
            generated_at: now,
            served: Served::Regenerated,
        })
    }

    fn refresh_today(
        &self,
        mut snapshot: CachedReport,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome, ReportError> {
        let today = self.timezone.today(now);
        let orders = match self.load_orders(&DateFilter::day(today)) {
            Ok(orders) => orders,
            Err(e) => return self.fall_back(Some(snapshot), e),
        };

        let resolver = CostResolver::new(self.products);
        let aggregator = Aggregator::new(&resolver, self.overheads, self.hourly_rate);
        let in_range = match (snapshot.buckets.keys().next(), snapshot.buckets.keys().next_back()) {
            (Some(first), Some(last)) => (*first..=*last).contains(&today),
            _ => false,
        };

        if in_range || !orders.is_empty() {
            let bucket = aggregator.aggregate_day(today, &orders);
            let changed = snapshot.buckets.get(&today) != Some(&bucket);
            snapshot.buckets.insert(today, bucket);
            let filled = fill_gaps(&mut snapshot.buckets, |day| aggregator.empty_bucket(day));
            if filled > 0 {
                tracing::debug!("Back-filled {filled} days before today");
            }
            if changed || filled > 0 {
                tracing::info!("Refreshed today's bucket ({} orders)", orders.len());
                // generated_at stays put: a partial refresh does not extend the TTL
                self.persist(&snapshot);
            }
        }

        Ok(ReportOutcome {
            buckets: snapshot.buckets,
            generated_at: snapshot.generated_at,
            served: Served::Fresh,
        })
    }

    fn fall_back(
        &self,
        cached: Option<CachedReport>,
        error: SourceError,
    ) -> Result<ReportOutcome, ReportError> {
        match cached {
            Some(snapshot) => {
                tracing::warn!("{error}; serving cached report from {}", snapshot.generated_at);
                Ok(ReportOutcome {
                    buckets: snapshot.buckets,
                    generated_at: snapshot.generated_at,
                    served: Served::StaleFallback,
                })
            }
            None => Err(ReportError::SourceUnavailable(error)),
        }
    }

    fn load_orders(&self, filter: &DateFilter) -> Result<Vec<OrderRecord>, SourceError> {
        let result = OrderLoader::new(self.orders, self.batch_size).load(filter)?;
        if result.skipped > 0 {
            tracing::info!("Skipped {} orders that could not be reported", result.skipped);
        }
        tracing::debug!(
            "Loaded {} orders in {:.2}ms",
            result.valid,
            result.elapsed_ms
        );
        Ok(result.orders)
    }

    fn persist(&self, snapshot: &CachedReport) {
        if let Err(e) = self.store.save(snapshot) {
            tracing::error!("{e}; report served without updating the cache");
        }
    }
}

/// Insert missing days between the first and last bucket; returns how many were added
fn fill_gaps<F>(buckets: &mut Timeline, empty: F) -> usize
where
    F: Fn(NaiveDate) -> crate::core::ReportBucket,
{
    let (Some(first), Some(last)) = (
        buckets.keys().next().copied(),
        buckets.keys().next_back().copied(),
    ) else {
        return 0;
    };
    let mut added = 0;
    for day in each_day(first, last) {
        if !buckets.contains_key(&day) {
            buckets.insert(day, empty(day));
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{OverheadKind, RawOrder};
    use crate::costs::{CostMeta, ProductInfo};
    use crate::source::{OrderPage, OrderQuery};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::sync::Mutex;

    /// Keeps the encoded snapshot text so byte identity can be checked
    #[derive(Default)]
    struct MemoryStore {
        text: RefCell<Option<String>>,
        fail_writes: Cell<bool>,
        writes: Cell<usize>,
    }

    impl ReportStore for MemoryStore {
        fn location(&self) -> String {
            "memory".to_string()
        }

        fn load(&self) -> Result<Option<CachedReport>, CacheError> {
            match self.text.borrow().as_deref() {
                Some(text) => CachedReport::decode(text).map(Some),
                None => Ok(None),
            }
        }

        fn save(&self, report: &CachedReport) -> Result<(), CacheError> {
            if self.fail_writes.get() {
                return Err(CacheError::Write {
                    path: "memory".into(),
                    source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
                });
            }
            self.writes.set(self.writes.get() + 1);
            *self.text.borrow_mut() = Some(report.encode().unwrap());
            Ok(())
        }

        fn exists(&self) -> bool {
            self.text.borrow().is_some()
        }

        fn clear(&self) -> Result<bool, CacheError> {
            Ok(self.text.borrow_mut().take().is_some())
        }
    }

    #[derive(Default)]
    struct LiveOrders {
        orders: Mutex<Vec<RawOrder>>,
        down: Mutex<bool>,
    }

    impl LiveOrders {
        fn push(&self, id: u64, date: &str, total: &str) {
            let raw = json!({
                "id": id, "status": "completed", "date_created": date, "total": total,
                "line_items": [{"product_id": 10, "quantity": 1, "total": total}]
            });
            self.orders
                .lock()
                .unwrap()
                .push(serde_json::from_value(raw).unwrap());
        }

        fn set_down(&self, down: bool) {
            *self.down.lock().unwrap() = down;
        }
    }

    impl OrderSource for LiveOrders {
        fn name(&self) -> &str {
            "live"
        }

        fn fetch_page(&self, query: &OrderQuery) -> Result<OrderPage, SourceError> {
            if *self.down.lock().unwrap() {
                return Err(SourceError::Unreachable {
                    path: "orders.json".into(),
                    source: std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
                });
            }
            let matching: Vec<RawOrder> = self
                .orders
                .lock()
                .unwrap()
                .iter()
                .filter(|o| o.day().is_some_and(|d| query.filter.contains(d)))
                .cloned()
                .collect();
            let total_pages = matching.len().div_ceil(query.per_page);
            let orders = matching
                .into_iter()
                .skip((query.page - 1) * query.per_page)
                .take(query.per_page)
                .collect();
            Ok(OrderPage {
                orders,
                total_pages,
            })
        }
    }

    struct Mugs;

    impl ProductCostSource for Mugs {
        fn cost_meta(&self, id: u64) -> Option<CostMeta> {
            (id == 10).then(|| CostMeta {
                cogs_price: Some(dec!(2)),
                ..Default::default()
            })
        }

        fn product_info(&self, _id: u64) -> Option<ProductInfo> {
            None
        }
    }

    fn at(ts: &str) -> DateTime<Utc> {
        ts.parse().unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn overheads() -> OverheadSchedule {
        let mut schedule = OverheadSchedule::default();
        schedule.set(OverheadKind::Rent, 2025, 3, dec!(310));
        schedule
    }

    fn controller<'a>(
        store: &'a MemoryStore,
        orders: &'a LiveOrders,
        schedule: &'a OverheadSchedule,
    ) -> CacheController<'a> {
        CacheController::new(store, orders, &Mugs, schedule)
            .with_timezone(Timezone::Named(chrono_tz::UTC))
            .with_batch_size(2)
    }

    fn seeded() -> LiveOrders {
        let orders = LiveOrders::default();
        orders.push(1, "2025-03-07T10:00:00", "10");
        orders.push(2, "2025-03-08T11:00:00", "20");
        orders.push(3, "2025-03-10T09:00:00", "30");
        orders
    }

    #[test]
    fn empty_cache_regenerates_and_persists() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let now = at("2025-03-10T12:00:00Z");
        let outcome = controller(&store, &orders, &schedule)
            .generate_report(false, now)
            .unwrap();

        assert_eq!(outcome.served, Served::Regenerated);
        assert_eq!(outcome.generated_at, now);
        assert_eq!(outcome.buckets.len(), 4);
        assert_eq!(outcome.buckets[&d(2025, 3, 9)].total, Decimal::ZERO);
        assert_eq!(outcome.buckets[&d(2025, 3, 9)].rent, dec!(10));
        assert_eq!(outcome.buckets[&d(2025, 3, 8)].cogs, dec!(2));
        assert_eq!(store.load().unwrap().unwrap().generated_at, now);
    }

    #[test]
    fn fresh_cache_keeps_history_and_refreshes_today() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let generated = at("2025-03-10T12:00:00Z");
        let controller = controller(&store, &orders, &schedule);
        let first = controller.generate_report(false, generated).unwrap();

        // a new order arrives today; history in the source also changes but must not leak in
        orders.push(4, "2025-03-10T12:30:00", "5");
        orders.push(5, "2025-03-08T12:30:00", "99");
        let second = controller
            .generate_report(false, at("2025-03-10T13:00:00Z"))
            .unwrap();

        assert_eq!(second.served, Served::Fresh);
        assert_eq!(second.generated_at, generated);
        assert_eq!(second.buckets[&d(2025, 3, 10)].total, dec!(35));
        assert_eq!(second.buckets[&d(2025, 3, 10)].quantity, 2);
        for day in [d(2025, 3, 7), d(2025, 3, 8), d(2025, 3, 9)] {
            assert_eq!(
                serde_json::to_string(&second.buckets[&day]).unwrap(),
                serde_json::to_string(&first.buckets[&day]).unwrap()
            );
        }
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.generated_at, generated);
        assert_eq!(stored.buckets[&d(2025, 3, 10)].total, dec!(35));
    }

    #[test]
    fn unchanged_today_does_not_rewrite_the_cache() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        controller
            .generate_report(false, at("2025-03-10T13:00:00Z"))
            .unwrap();
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn stale_cache_regenerates() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        orders.push(5, "2025-03-08T12:30:00", "99");

        let later = at("2025-03-11T12:00:00Z");
        assert_eq!(
            controller.evaluate(store.load().unwrap().as_ref(), later),
            CacheState::Stale
        );
        let outcome = controller.generate_report(false, later).unwrap();
        assert_eq!(outcome.served, Served::Regenerated);
        assert_eq!(outcome.generated_at, later);
        assert_eq!(outcome.buckets[&d(2025, 3, 8)].total, dec!(119));
    }

    #[test]
    fn forced_regeneration_ignores_fresh_cache() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        let now = at("2025-03-10T12:05:00Z");
        let outcome = controller.generate_report(true, now).unwrap();
        assert_eq!(outcome.served, Served::Regenerated);
        assert_eq!(store.load().unwrap().unwrap().generated_at, now);
    }

    #[test]
    fn today_outside_range_with_orders_back_fills_gap() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();

        orders.push(6, "2025-03-11T08:00:00", "7");
        let outcome = controller
            .generate_report(false, at("2025-03-11T09:00:00Z"))
            .unwrap();
        assert_eq!(outcome.served, Served::Fresh);
        assert_eq!(outcome.buckets.len(), 5);
        assert_eq!(outcome.buckets[&d(2025, 3, 11)].total, dec!(7));
    }

    #[test]
    fn today_gap_days_carry_overhead_only() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        // generated on the 11th, but the last order is from the 10th
        controller
            .generate_report(false, at("2025-03-11T01:00:00Z"))
            .unwrap();

        orders.push(7, "2025-03-12T00:10:00", "4");
        let outcome = controller
            .generate_report(false, at("2025-03-12T00:30:00Z"))
            .unwrap();
        assert_eq!(outcome.served, Served::Fresh);
        let days: Vec<_> = outcome.buckets.keys().copied().collect();
        assert_eq!(days, each_day(d(2025, 3, 7), d(2025, 3, 12)).collect::<Vec<_>>());
        let gap = &outcome.buckets[&d(2025, 3, 11)];
        assert_eq!(gap.total, Decimal::ZERO);
        assert_eq!(gap.rent, dec!(10));
    }

    #[test]
    fn quiet_today_outside_range_is_not_spliced() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        let outcome = controller
            .generate_report(false, at("2025-03-11T09:00:00Z"))
            .unwrap();
        assert_eq!(outcome.buckets.len(), 4);
        assert!(!outcome.buckets.contains_key(&d(2025, 3, 11)));
    }

    #[test]
    fn unreachable_source_serves_cached_report() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        let first = controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        orders.set_down(true);

        let fresh = controller
            .generate_report(false, at("2025-03-10T13:00:00Z"))
            .unwrap();
        assert_eq!(fresh.served, Served::StaleFallback);
        assert_eq!(fresh.buckets, first.buckets);

        // stale and forced requests fall back too
        let stale = controller
            .generate_report(true, at("2025-03-12T13:00:00Z"))
            .unwrap();
        assert_eq!(stale.served, Served::StaleFallback);
        assert_eq!(stale.generated_at, first.generated_at);
    }

    #[test]
    fn unreachable_source_without_cache_is_an_error() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        orders.set_down(true);
        let result = controller(&store, &orders, &schedule)
            .generate_report(false, at("2025-03-10T12:00:00Z"));
        assert!(matches!(result, Err(ReportError::SourceUnavailable(_))));
    }

    #[test]
    fn unreadable_products_serve_the_snapshot() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        let products_down = || SourceError::ProductsUnreachable {
            path: "products.json".into(),
            source: std::io::Error::other("Is a directory"),
        };
        assert!(matches!(
            controller.serve_cached(products_down()),
            Err(ReportError::SourceUnavailable(SourceError::ProductsUnreachable { .. }))
        ));

        let first = controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        let served = controller.serve_cached(products_down()).unwrap();
        assert_eq!(served.served, Served::StaleFallback);
        assert_eq!(served.generated_at, first.generated_at);
        assert_eq!(served.buckets, first.buckets);
    }

    #[test]
    fn no_orders_is_no_data() {
        let (store, orders, schedule) = (MemoryStore::default(), LiveOrders::default(), overheads());
        let result = controller(&store, &orders, &schedule)
            .generate_report(false, at("2025-03-10T12:00:00Z"));
        assert!(matches!(result, Err(ReportError::NoData)));
        assert!(!store.exists());
    }

    #[test]
    fn corrupt_cache_is_treated_as_empty() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        *store.text.borrow_mut() = Some("{\"version\":1,\"generated_".to_string());
        let now = at("2025-03-10T12:00:00Z");
        let controller = controller(&store, &orders, &schedule);
        assert_eq!(controller.status(now).state, CacheState::Empty);
        let outcome = controller.generate_report(false, now).unwrap();
        assert_eq!(outcome.served, Served::Regenerated);
        assert!(store.load().is_ok());
    }

    #[test]
    fn write_failure_still_returns_report() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        store.fail_writes.set(true);
        let controller = controller(&store, &orders, &schedule);
        let outcome = controller
            .generate_report(false, at("2025-03-10T12:00:00Z"))
            .unwrap();
        assert_eq!(outcome.served, Served::Regenerated);
        assert!(!store.exists());

        // state did not advance, so the next read retries the full path
        store.fail_writes.set(false);
        let retry = controller
            .generate_report(false, at("2025-03-10T12:10:00Z"))
            .unwrap();
        assert_eq!(retry.served, Served::Regenerated);
        assert!(store.exists());
    }

    #[test]
    fn status_reports_age_and_size() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        let now = at("2025-03-10T12:00:00Z");
        assert_eq!(controller.status(now).state, CacheState::Empty);
        controller.generate_report(false, now).unwrap();

        let status = controller.status(at("2025-03-10T15:00:00Z"));
        assert_eq!(status.state, CacheState::Fresh);
        assert_eq!(status.age, Some(TimeDelta::hours(3)));
        assert_eq!(status.buckets, 4);
        assert!(controller.clear().unwrap());
        assert_eq!(controller.status(now).state, CacheState::Empty);
    }

    #[test]
    fn ttl_boundary_is_stale() {
        let (store, orders, schedule) = (MemoryStore::default(), seeded(), overheads());
        let controller = controller(&store, &orders, &schedule);
        let snapshot = CachedReport::new(at("2025-03-10T00:00:00Z"), Timeline::new());
        assert_eq!(
            controller.evaluate(Some(&snapshot), at("2025-03-10T23:59:59Z")),
            CacheState::Fresh
        );
        assert_eq!(
            controller.evaluate(Some(&snapshot), at("2025-03-11T00:00:00Z")),
            CacheState::Stale
        );
    }
}
