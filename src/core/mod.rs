pub mod controller;
pub mod expense_book;
pub mod services;

pub use controller::{AppController, AppMessage, ForecastRequest, ForecastSlot};
pub use expense_book::ExpenseBook;
