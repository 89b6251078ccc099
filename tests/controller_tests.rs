mod common;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use common::{at, hourly_series};
use tokio::sync::mpsc;
use trip_core::{
    core::{AppController, AppMessage, ExpenseBook, ForecastSlot},
    currency::{CurrencyPair, ExchangeRate, RateSource},
    domain::{HourlyForecastPoint, Itinerary, WeatherLocation},
    errors::{Result, TripError},
    providers::{fetch_forecasts, fetch_rate, ExchangeRateProvider, ForecastProvider},
    storage::MemoryStore,
};

/// Returns a full two-day series around the local date, except for the
/// locations it is told to fail.
struct ScriptedForecast {
    failing: Vec<&'static str>,
}

#[async_trait]
impl ForecastProvider for ScriptedForecast {
    async fn hourly_forecast(&self, location: &WeatherLocation) -> Result<Vec<HourlyForecastPoint>> {
        if self.failing.contains(&location.name.as_str()) {
            return Err(TripError::Network(format!("{} unreachable", location.name)));
        }
        let today = Local::now().date_naive();
        let start = today.and_hms_opt(0, 0, 0).unwrap();
        Ok(hourly_series(start, 48, 24.0, 2))
    }
}

struct DownRates;

#[async_trait]
impl ExchangeRateProvider for DownRates {
    async fn secondary_to_primary(&self, _pair: &CurrencyPair) -> Result<f64> {
        Err(TripError::Network("rate service down".into()))
    }
}

fn controller() -> AppController {
    let book = ExpenseBook::open(Arc::new(MemoryStore::new()), "okinawa_expenses");
    AppController::new(Itinerary::builtin(), book, ExchangeRate::default())
}

async fn drain(ctl: &mut AppController, mut rx: mpsc::UnboundedReceiver<AppMessage>) {
    while let Some(message) = rx.recv().await {
        ctl.apply(message);
    }
}

#[tokio::test]
async fn concurrent_fetches_fill_every_slot() {
    let mut ctl = controller();
    let requests = ctl.select_day(1).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    fetch_forecasts(Arc::new(ScriptedForecast { failing: vec![] }), requests, tx);
    drain(&mut ctl, rx).await;

    assert!(!ctl.has_pending_forecasts());
    let windows = ctl.forecast_windows();
    assert_eq!(windows.len(), 2);
    assert!(windows.iter().all(|w| !w.is_loading()));
}

#[tokio::test]
async fn results_for_a_previous_day_are_discarded() {
    let mut ctl = controller();
    let stale = ctl.select_day(1).unwrap();
    let current = ctl.select_day(2).unwrap();
    assert!(current[0].generation > stale[0].generation);

    let provider: Arc<dyn ForecastProvider> = Arc::new(ScriptedForecast { failing: vec![] });
    let (tx, rx) = mpsc::unbounded_channel();
    fetch_forecasts(Arc::clone(&provider), stale, tx.clone());
    fetch_forecasts(provider, current, tx);
    drain(&mut ctl, rx).await;

    let names: Vec<_> = ctl
        .forecast_windows()
        .into_iter()
        .map(|w| w.location_name)
        .collect();
    assert_eq!(names, ["Shuri Castle", "Gyokusendo"]);
    assert!(ctl.slot("Manzamo").is_none());
    assert!(ctl.forecast_windows().iter().all(|w| !w.is_loading()));
}

#[tokio::test]
async fn failure_is_isolated_to_its_location() {
    let mut ctl = controller();
    let requests = ctl.select_day(3).unwrap();
    let (tx, rx) = mpsc::unbounded_channel();
    let provider = ScriptedForecast {
        failing: vec!["Taoyuan"],
    };
    fetch_forecasts(Arc::new(provider), requests, tx);
    drain(&mut ctl, rx).await;

    assert_eq!(ctl.slot("Taoyuan"), Some(&ForecastSlot::Failed));
    assert!(matches!(ctl.slot("Naha"), Some(ForecastSlot::Ready(points)) if !points.is_empty()));
}

#[tokio::test]
async fn failed_rate_fetch_keeps_fallback() {
    let mut ctl = controller();
    let message = fetch_rate(&DownRates, &CurrencyPair::default()).await;
    ctl.apply(message);
    assert_eq!(ctl.rate().source(), RateSource::Fallback);
    assert_eq!(ctl.rate().secondary_to_primary(), 0.215);
}

#[test]
fn late_result_after_refresh_does_not_overwrite() {
    let mut ctl = controller();
    let old = ctl.select_day(0).unwrap();
    let fresh = ctl.refresh();
    let reference = at(2026, 3, 11, 22, 0);

    ctl.apply(AppMessage::ForecastFetched {
        generation: fresh[0].generation,
        location: "Naha".into(),
        reference,
        outcome: Ok(hourly_series(at(2026, 3, 11, 0, 0), 48, 25.0, 0)),
    });
    ctl.apply(AppMessage::ForecastFetched {
        generation: old[0].generation,
        location: "Naha".into(),
        reference,
        outcome: Err(TripError::Network("late failure".into())),
    });

    let window = &ctl.forecast_windows()[0];
    assert_eq!(window.points.len(), 3);
    assert_eq!(window.points[0].temperature_celsius, 25);
}

#[test]
fn initial_day_uses_full_calendar_date() {
    let ctl = controller();
    let first_day = NaiveDate::from_ymd_opt(2026, 3, 11).unwrap();
    assert_eq!(ctl.initial_day_index(first_day), 0);
    let last_day = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
    assert_eq!(ctl.initial_day_index(last_day), 3);
    let next_year = NaiveDate::from_ymd_opt(2027, 3, 14).unwrap();
    assert_eq!(ctl.initial_day_index(next_year), 0);
}
