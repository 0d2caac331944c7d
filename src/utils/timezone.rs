use chrono::{DateTime, Local, NaiveDate, Utc};
use chrono_tz::Tz;
use std::str::FromStr;

use crate::error::AppError;

/// Timezone that decides which calendar day an instant belongs to
#[derive(Debug, Clone, Copy)]
pub(crate) enum Timezone {
    Local,
    Named(Tz),
}

impl Timezone {
    /// `None`, empty and "local" mean the machine timezone; "utc"/"z" are shorthands
    pub(crate) fn parse(value: Option<&str>) -> Result<Self, AppError> {
        let name = value.map(str::trim).unwrap_or_default();
        if name.is_empty() || name.eq_ignore_ascii_case("local") {
            return Ok(Timezone::Local);
        }
        if name.eq_ignore_ascii_case("utc") || name.eq_ignore_ascii_case("z") {
            return Ok(Timezone::Named(chrono_tz::UTC));
        }
        Tz::from_str(name)
            .map(Timezone::Named)
            .map_err(|_| AppError::InvalidTimezone {
                input: name.to_string(),
            })
    }

    pub(crate) fn day_of(self, instant: DateTime<Utc>) -> NaiveDate {
        match self {
            Timezone::Local => instant.with_timezone(&Local).date_naive(),
            Timezone::Named(tz) => instant.with_timezone(&tz).date_naive(),
        }
    }

    /// Shop calendar day at instant `now`
    pub(crate) fn today(self, now: DateTime<Utc>) -> NaiveDate {
        self.day_of(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn blank_and_local_mean_machine_timezone() {
        for raw in [None, Some(""), Some("  LOCAL ")] {
            assert!(matches!(Timezone::parse(raw).unwrap(), Timezone::Local));
        }
    }

    #[test]
    fn utc_shorthands() {
        for raw in ["utc", "UTC", "z", "Z"] {
            let tz = Timezone::parse(Some(raw)).unwrap();
            assert!(matches!(tz, Timezone::Named(chrono_tz::UTC)));
        }
    }

    #[test]
    fn named_zone_and_unknown_zone() {
        let tz = Timezone::parse(Some("Europe/Berlin")).unwrap();
        assert!(matches!(tz, Timezone::Named(chrono_tz::Europe::Berlin)));

        let err = Timezone::parse(Some("Mars/Olympus")).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn today_follows_the_shop_timezone() {
        let now = at("2025-03-31T23:30:00Z");
        let utc = Timezone::Named(chrono_tz::UTC);
        let berlin = Timezone::parse(Some("Europe/Berlin")).unwrap();
        assert_eq!(utc.today(now), d(2025, 3, 31));
        // CEST is UTC+2 after the March switch
        assert_eq!(berlin.today(now), d(2025, 4, 1));
    }

    #[test]
    fn west_of_utc_is_still_yesterday() {
        let tz = Timezone::parse(Some("America/New_York")).unwrap();
        assert_eq!(tz.day_of(at("2025-06-15T02:00:00Z")), d(2025, 6, 14));
        assert_eq!(tz.day_of(at("2025-06-15T05:00:00Z")), d(2025, 6, 15));
    }
}
