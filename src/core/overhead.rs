//! Monthly overhead schedule (fixed costs, marketing, rent)
//!
//! Loaded once per report generation and injected into the aggregator.
//! Settings documents key each figure by year, holding twelve monthly values:
//! `{"costs": {"2024": [..]}, "marketingCosts": {..}, "rent": {..}}`.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::str::FromStr;

use super::amount::parse_amount;
use super::settings::SettingsDocument;
use super::types::DailyOverhead;
use crate::error::SettingsError;
use crate::utils::days_in_month;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OverheadKind {
    Fixed,
    Marketing,
    Rent,
}

impl OverheadKind {
    pub(crate) const ALL: [OverheadKind; 3] =
        [OverheadKind::Fixed, OverheadKind::Marketing, OverheadKind::Rent];

    pub(super) fn settings_key(self) -> &'static str {
        match self {
            OverheadKind::Fixed => "costs",
            OverheadKind::Marketing => "marketingCosts",
            OverheadKind::Rent => "rent",
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            OverheadKind::Fixed => "costs",
            OverheadKind::Marketing => "marketing",
            OverheadKind::Rent => "rent",
        }
    }
}

impl FromStr for OverheadKind {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "costs" | "fixed" | "fixed_costs" => Ok(OverheadKind::Fixed),
            "marketing" | "marketingcosts" | "marketing_costs" => Ok(OverheadKind::Marketing),
            "rent" => Ok(OverheadKind::Rent),
            _ => Err(SettingsError::UnknownKind(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MonthlyOverhead {
    pub(crate) fixed_costs: Decimal,
    pub(crate) marketing_costs: Decimal,
    pub(crate) rent: Decimal,
}

type MonthKey = (i32, u32);

#[derive(Debug, Clone, Default)]
pub(crate) struct OverheadSchedule {
    fixed: BTreeMap<MonthKey, Decimal>,
    marketing: BTreeMap<MonthKey, Decimal>,
    rent: BTreeMap<MonthKey, Decimal>,
}

impl OverheadSchedule {
    /// Load from a settings file. A missing file means no overhead.
    pub(crate) fn load(path: &Path) -> Result<Self, SettingsError> {
        SettingsDocument::load(path).map(|doc| doc.schedule())
    }

    pub(crate) fn from_settings(settings: &Value) -> Self {
        let mut schedule = Self::default();
        for kind in OverheadKind::ALL {
            let Some(years) = settings.get(kind.settings_key()).and_then(Value::as_object) else {
                continue;
            };
            for (year, months) in years {
                let Ok(year) = year.trim().parse::<i32>() else {
                    tracing::warn!("Ignoring overhead year \"{year}\" in {}", kind.settings_key());
                    continue;
                };
                for (index, value) in month_values(months) {
                    if let Some(amount) = parse_amount(value) {
                        schedule.set(kind, year, index + 1, amount);
                    }
                }
            }
        }
        schedule
    }

    pub(crate) fn set(&mut self, kind: OverheadKind, year: i32, month: u32, amount: Decimal) {
        if !(1..=12).contains(&month) {
            return;
        }
        let map = match kind {
            OverheadKind::Fixed => &mut self.fixed,
            OverheadKind::Marketing => &mut self.marketing,
            OverheadKind::Rent => &mut self.rent,
        };
        map.insert((year, month), amount);
    }

    pub(crate) fn monthly(&self, year: i32, month: u32) -> MonthlyOverhead {
        let key = (year, month);
        MonthlyOverhead {
            fixed_costs: self.fixed.get(&key).copied().unwrap_or_default(),
            marketing_costs: self.marketing.get(&key).copied().unwrap_or_default(),
            rent: self.rent.get(&key).copied().unwrap_or_default(),
        }
    }

    /// Every month with a non-zero figure, in calendar order
    pub(crate) fn months(&self) -> Vec<(i32, u32, MonthlyOverhead)> {
        let keys: BTreeSet<MonthKey> = self
            .fixed
            .keys()
            .chain(self.marketing.keys())
            .chain(self.rent.keys())
            .copied()
            .collect();
        keys.into_iter()
            .map(|(year, month)| (year, month, self.monthly(year, month)))
            .filter(|(_, _, monthly)| *monthly != MonthlyOverhead::default())
            .collect()
    }

    /// Share of the month's figures carried by a single day
    pub(crate) fn daily(&self, date: NaiveDate) -> DailyOverhead {
        let monthly = self.monthly(date.year(), date.month());
        let days = Decimal::from(days_in_month(date.year(), date.month()));
        DailyOverhead {
            fixed_costs: monthly.fixed_costs / days,
            marketing_costs: monthly.marketing_costs / days,
            rent: monthly.rent / days,
        }
    }
}

/// Month slots as (zero-based index, value). Accepts a 12-element array or an
/// object keyed by index, which is how sparse arrays come out of PHP encoders.
pub(super) fn month_values(months: &Value) -> Vec<(u32, &Value)> {
    match months {
        Value::Array(values) => values
            .iter()
            .enumerate()
            .take(12)
            .map(|(i, v)| (i as u32, v))
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(k, v)| k.trim().parse::<u32>().ok().filter(|i| *i < 12).map(|i| (i, v)))
            .collect(),
        _ => Vec::new(),
    }
}
