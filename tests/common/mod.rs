#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};
use tempfile::TempDir;
use trip_core::{
    config::{Config, ConfigManager},
    currency::Currency,
    domain::{ExpenseCategory, ExpenseDraft, ExpenseRecord, HourlyForecastPoint},
};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .expect("valid test timestamp")
}

/// Consecutive hourly points starting at `start`.
pub fn hourly_series(start: NaiveDateTime, hours: i64, temperature: f64, code: i32) -> Vec<HourlyForecastPoint> {
    (0..hours)
        .map(|offset| HourlyForecastPoint::new(start + Duration::hours(offset), temperature, code))
        .collect()
}

pub fn record(amount: f64, currency: Currency, category: ExpenseCategory) -> ExpenseRecord {
    ExpenseDraft::new(amount, currency, category).into_record(Utc::now())
}

/// A data directory whose saved config turns every provider off.
pub fn offline_home() -> TempDir {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config {
        offline: true,
        ..Config::default()
    };
    ConfigManager::with_base_dir(dir.path())
        .expect("config manager")
        .save(&config)
        .expect("save config");
    dir
}
