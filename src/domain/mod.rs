//! Pure domain models for the itinerary, forecasts, and expenses.
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod common;
pub mod expense;
pub mod forecast;
pub mod itinerary;

pub use common::{Displayable, Identifiable};
pub use expense::{ExpenseCategory, ExpenseDraft, ExpenseRecord};
pub use forecast::{ForecastDisplayPoint, HourlyForecastPoint, LocationForecastWindow, SkyIcon};
pub use itinerary::{DaySchedule, EventKind, Itinerary, ItineraryItem, WeatherLocation};
