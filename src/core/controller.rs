//! Session state for one planning session.
//!
//! The controller is the single owner of mutable state. Network work happens
//! elsewhere and comes back as [`AppMessage`] values, which are applied here one
//! at a time. A generation counter tags every batch of forecast requests so
//! results from an earlier day selection can be recognised and dropped.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{
    core::{
        expense_book::ExpenseBook,
        services::{ExpenseAggregator, ExpenseSummary, ForecastWindowReducer},
    },
    currency::{ExchangeRate, RateSource},
    domain::{
        DaySchedule, ExpenseDraft, ExpenseRecord, ForecastDisplayPoint, HourlyForecastPoint,
        Itinerary, LocationForecastWindow, WeatherLocation,
    },
    errors::{Result, TripError},
};

/// Forecast state for one location of the selected day.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastSlot {
    Pending,
    Ready(Vec<ForecastDisplayPoint>),
    Failed,
}

impl ForecastSlot {
    pub fn points(&self) -> &[ForecastDisplayPoint] {
        match self {
            ForecastSlot::Ready(points) => points,
            ForecastSlot::Pending | ForecastSlot::Failed => &[],
        }
    }
}

/// A fetch the caller should perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub generation: u64,
    pub location: WeatherLocation,
}

#[derive(Debug)]
pub enum AppMessage {
    ForecastFetched {
        generation: u64,
        location: String,
        /// Local wall-clock time of this machine when the result arrived.
        reference: NaiveDateTime,
        outcome: Result<Vec<HourlyForecastPoint>>,
    },
    RateFetched(Result<f64>),
}

pub struct AppController {
    itinerary: Itinerary,
    selected_day: usize,
    generation: u64,
    slots: HashMap<String, ForecastSlot>,
    rate: ExchangeRate,
    expenses: ExpenseBook,
}

impl AppController {
    pub fn new(itinerary: Itinerary, expenses: ExpenseBook, fallback_rate: ExchangeRate) -> Self {
        Self {
            itinerary,
            selected_day: 0,
            generation: 0,
            slots: HashMap::new(),
            rate: fallback_rate,
            expenses,
        }
    }

    pub fn itinerary(&self) -> &Itinerary {
        &self.itinerary
    }

    pub fn selected_index(&self) -> usize {
        self.selected_day
    }

    pub fn selected_day(&self) -> Option<&DaySchedule> {
        self.itinerary.day(self.selected_day)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn rate(&self) -> ExchangeRate {
        self.rate
    }

    /// The day to open on: the one matching `today`, otherwise the first.
    pub fn initial_day_index(&self, today: NaiveDate) -> usize {
        self.itinerary.index_of(today).unwrap_or(0)
    }

    /// Switches the selected day and returns the fetches for its locations.
    pub fn select_day(&mut self, index: usize) -> Result<Vec<ForecastRequest>> {
        if index >= self.itinerary.len() {
            return Err(TripError::InvalidInput(format!(
                "day {} is out of range (trip has {} days)",
                index + 1,
                self.itinerary.len()
            )));
        }
        self.selected_day = index;
        Ok(self.start_generation())
    }

    /// Re-requests every location of the current day.
    pub fn refresh(&mut self) -> Vec<ForecastRequest> {
        self.start_generation()
    }

    fn start_generation(&mut self) -> Vec<ForecastRequest> {
        self.generation += 1;
        self.slots.clear();
        let locations = self
            .selected_day()
            .map(|day| day.weather_locations.clone())
            .unwrap_or_default();
        for location in &locations {
            self.slots.insert(location.name.clone(), ForecastSlot::Pending);
        }
        tracing::debug!(
            generation = self.generation,
            day = self.selected_day,
            locations = locations.len(),
            "forecast generation started"
        );
        locations
            .into_iter()
            .map(|location| ForecastRequest {
                generation: self.generation,
                location,
            })
            .collect()
    }

    pub fn apply(&mut self, message: AppMessage) {
        match message {
            AppMessage::ForecastFetched {
                generation,
                location,
                reference,
                outcome,
            } => self.apply_forecast(generation, location, reference, outcome),
            AppMessage::RateFetched(outcome) => self.apply_rate(outcome),
        }
    }

    fn apply_forecast(
        &mut self,
        generation: u64,
        location: String,
        reference: NaiveDateTime,
        outcome: Result<Vec<HourlyForecastPoint>>,
    ) {
        if generation != self.generation {
            tracing::debug!(
                location = %location,
                generation,
                current = self.generation,
                "dropping stale forecast"
            );
            return;
        }
        let Some(slot) = self.slots.get_mut(&location) else {
            tracing::debug!(location = %location, "forecast for unknown location ignored");
            return;
        };
        *slot = match outcome {
            Ok(points) => ForecastSlot::Ready(ForecastWindowReducer::reduce(&points, reference)),
            Err(err) => {
                tracing::warn!(location = %location, error = %err, "forecast unavailable");
                ForecastSlot::Failed
            }
        };
    }

    fn apply_rate(&mut self, outcome: Result<f64>) {
        if self.rate.source() == RateSource::Live {
            tracing::debug!("live rate already applied; ignoring update");
            return;
        }
        match outcome.and_then(ExchangeRate::live) {
            Ok(rate) => {
                tracing::info!(rate = rate.secondary_to_primary(), "live exchange rate applied");
                self.rate = rate;
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    fallback = self.rate.secondary_to_primary(),
                    "exchange rate unavailable; keeping fallback"
                );
            }
        }
    }

    pub fn slot(&self, location: &str) -> Option<&ForecastSlot> {
        self.slots.get(location)
    }

    pub fn has_pending_forecasts(&self) -> bool {
        self.slots
            .values()
            .any(|slot| matches!(slot, ForecastSlot::Pending))
    }

    /// The selected day's locations in itinerary order. Pending and failed
    /// locations come back with no points.
    pub fn forecast_windows(&self) -> Vec<LocationForecastWindow> {
        let Some(day) = self.selected_day() else {
            return Vec::new();
        };
        day.weather_locations
            .iter()
            .map(|location| LocationForecastWindow {
                location_name: location.name.clone(),
                points: self
                    .slots
                    .get(&location.name)
                    .map(|slot| slot.points().to_vec())
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn expenses(&self) -> &[ExpenseRecord] {
        self.expenses.records()
    }

    pub fn add_expense(&mut self, draft: ExpenseDraft, now: DateTime<Utc>) -> Result<ExpenseRecord> {
        self.expenses.add(draft, now)
    }

    pub fn remove_expense(&mut self, id: &str) -> Result<bool> {
        self.expenses.remove(id)
    }

    pub fn find_expense(&self, id: &str) -> Option<&ExpenseRecord> {
        self.expenses.find(id)
    }

    pub fn summary(&self) -> ExpenseSummary {
        ExpenseAggregator::summarize(self.expenses.records(), &self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{currency::Currency, domain::ExpenseCategory, storage::MemoryStore};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn controller() -> AppController {
        let book = ExpenseBook::open(Arc::new(MemoryStore::new()), "expenses");
        AppController::new(Itinerary::builtin(), book, ExchangeRate::default())
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 12)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn series() -> Vec<HourlyForecastPoint> {
        (0..48)
            .map(|i| HourlyForecastPoint::new(at(0) + chrono::Duration::hours(i), 21.4, 1))
            .collect()
    }

    fn fetched(generation: u64, location: &str, outcome: Result<Vec<HourlyForecastPoint>>) -> AppMessage {
        AppMessage::ForecastFetched {
            generation,
            location: location.into(),
            reference: at(20),
            outcome,
        }
    }

    #[test]
    fn select_day_issues_one_request_per_location() {
        let mut ctl = controller();
        let requests = ctl.select_day(1).unwrap();
        let names: Vec<_> = requests.iter().map(|r| r.location.name.as_str()).collect();
        assert_eq!(names, vec!["Manzamo", "American Village"]);
        assert!(requests.iter().all(|r| r.generation == ctl.generation()));
        assert_eq!(ctl.slot("Manzamo"), Some(&ForecastSlot::Pending));
        assert!(ctl.select_day(9).is_err());
        assert_eq!(ctl.selected_index(), 1);
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut ctl = controller();
        let first = ctl.select_day(1).unwrap();
        ctl.select_day(2).unwrap();
        ctl.apply(fetched(first[0].generation, "Manzamo", Ok(series())));
        assert_eq!(ctl.slot("Manzamo"), None);
        assert!(ctl.forecast_windows().iter().all(|w| w.is_loading()));
    }

    #[test]
    fn refresh_invalidates_in_flight_results() {
        let mut ctl = controller();
        let before = ctl.select_day(0).unwrap();
        ctl.refresh();
        ctl.apply(fetched(before[0].generation, "Naha", Ok(series())));
        assert_eq!(ctl.slot("Naha"), Some(&ForecastSlot::Pending));
    }

    #[test]
    fn one_failure_does_not_affect_other_locations() {
        let mut ctl = controller();
        let generation = ctl.select_day(1).unwrap()[0].generation;
        ctl.apply(fetched(generation, "Manzamo", Ok(series())));
        ctl.apply(fetched(
            generation,
            "American Village",
            Err(TripError::Network("timeout".into())),
        ));

        assert_eq!(ctl.slot("American Village"), Some(&ForecastSlot::Failed));
        let windows = ctl.forecast_windows();
        assert_eq!(windows[0].location_name, "Manzamo");
        assert_eq!(windows[0].points.len(), 5);
        assert_eq!(windows[0].points[0].hour_label, "20:00");
        assert!(windows[1].is_loading());
    }

    #[test]
    fn live_rate_replaces_fallback_once() {
        let mut ctl = controller();
        assert_eq!(ctl.rate().source(), RateSource::Fallback);
        ctl.apply(AppMessage::RateFetched(Ok(0.2)));
        assert_eq!(ctl.rate().source(), RateSource::Live);
        ctl.apply(AppMessage::RateFetched(Ok(0.3)));
        assert_eq!(ctl.rate().secondary_to_primary(), 0.2);
    }

    #[test]
    fn failed_or_invalid_rate_keeps_fallback() {
        let mut ctl = controller();
        ctl.apply(AppMessage::RateFetched(Err(TripError::Network("offline".into()))));
        ctl.apply(AppMessage::RateFetched(Ok(0.0)));
        assert_eq!(ctl.rate(), ExchangeRate::default());
    }

    #[test]
    fn initial_day_matches_full_date() {
        let ctl = controller();
        let trip_day = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        assert_eq!(ctl.initial_day_index(trip_day), 2);
        let same_day_other_month = NaiveDate::from_ymd_opt(2026, 4, 13).unwrap();
        assert_eq!(ctl.initial_day_index(same_day_other_month), 0);
    }

    #[test]
    fn summary_uses_session_rate() {
        let mut ctl = controller();
        ctl.apply(AppMessage::RateFetched(Ok(0.2)));
        let draft = ExpenseDraft::new(1000.0, Currency::Secondary, ExpenseCategory::Food);
        ctl.add_expense(draft, Utc::now()).unwrap();
        let summary = ctl.summary();
        assert!((summary.total - 200.0).abs() < 1e-9);
        assert_eq!(summary.rate.source(), RateSource::Live);
    }
}
