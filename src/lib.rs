#![doc(test(attr(deny(warnings))))]

//! Trip Core holds the state behind a day-by-day trip planner: the itinerary,
//! a trimmed hourly forecast per destination, and a two-currency expense log
//! with category totals.
//!
//! ```
//! use chrono::NaiveDate;
//! use trip_core::core::services::ForecastWindowReducer;
//! use trip_core::domain::HourlyForecastPoint;
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 12).unwrap();
//! let points: Vec<_> = (0..24)
//!     .map(|h| HourlyForecastPoint::new(day.and_hms_opt(h, 0, 0).unwrap(), 22.5, 1))
//!     .collect();
//! let window = ForecastWindowReducer::reduce(&points, day.and_hms_opt(21, 40, 0).unwrap());
//! assert_eq!(window.len(), 3);
//! assert_eq!(window[0].temperature_celsius, 23);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod providers;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Trip Core tracing initialized.");
    });
}
