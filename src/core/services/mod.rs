pub mod expense_service;
pub mod forecast_service;

pub use expense_service::{CategoryShare, ExpenseAggregator, ExpenseSummary};
pub use forecast_service::ForecastWindowReducer;
