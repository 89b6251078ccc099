//! Expense records logged during the trip.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::Currency;
use crate::errors::{Result, TripError};

use super::common::{Displayable, Identifiable};

/// Spending buckets shown in the breakdown and its legend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    Food,
    Transport,
    Shopping,
    Stay,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Food,
        ExpenseCategory::Transport,
        ExpenseCategory::Shopping,
        ExpenseCategory::Stay,
        ExpenseCategory::Other,
    ];

    /// Legend colour used by breakdown renderers.
    pub fn color_hex(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "#eab308",
            ExpenseCategory::Transport => "#3b82f6",
            ExpenseCategory::Shopping => "#ec4899",
            ExpenseCategory::Stay => "#a855f7",
            ExpenseCategory::Other => "#78716c",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let value = input.trim().to_ascii_lowercase();
        ExpenseCategory::ALL
            .into_iter()
            .find(|category| category.to_string() == value)
            .ok_or_else(|| {
                TripError::InvalidInput(format!(
                    "unknown category `{}` (use food, transport, shopping, stay or other)",
                    input.trim()
                ))
            })
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ExpenseCategory::Food => "food",
            ExpenseCategory::Transport => "transport",
            ExpenseCategory::Shopping => "shopping",
            ExpenseCategory::Stay => "stay",
            ExpenseCategory::Other => "other",
        };
        f.pad(label)
    }
}

/// A single logged expense. Immutable once created; only deletion is allowed.
///
/// Serialized with the creation instant as `date` in epoch milliseconds, the
/// shape browser-kept expense lists already use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    pub amount: f64,
    pub currency: Currency,
    pub category: ExpenseCategory,
    #[serde(default)]
    pub note: String,
    #[serde(rename = "date", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ExpenseRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Displayable for ExpenseRecord {
    fn display_label(&self) -> String {
        if self.note.is_empty() {
            self.category.to_string()
        } else {
            format!("{}: {}", self.category, self.note)
        }
    }
}

/// User-entered fields for an expense that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub currency: Currency,
    pub category: ExpenseCategory,
    pub note: String,
}

impl ExpenseDraft {
    pub fn new(amount: f64, currency: Currency, category: ExpenseCategory) -> Self {
        Self {
            amount,
            currency,
            category,
            note: String::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into().trim().to_string();
        self
    }

    /// Stamps the draft with a fresh v4 id and the creation instant.
    pub fn into_record(self, now: DateTime<Utc>) -> ExpenseRecord {
        ExpenseRecord {
            id: Uuid::new_v4().to_string(),
            amount: self.amount,
            currency: self.currency,
            category: self.category,
            note: self.note,
            created_at: now,
        }
    }
}
