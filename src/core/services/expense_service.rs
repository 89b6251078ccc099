//! Currency normalisation and aggregation over the expense list.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    currency::{Currency, ExchangeRate},
    domain::{ExpenseCategory, ExpenseRecord},
    errors::{Result, TripError},
};

/// One row of the category breakdown, already expressed in the primary currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: ExpenseCategory,
    pub amount: f64,
    pub share_percent: f64,
}

/// Totals computed from a single rate snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseSummary {
    pub rate: ExchangeRate,
    pub total: f64,
    pub breakdown: Vec<CategoryShare>,
    pub record_count: usize,
}

pub struct ExpenseAggregator;

impl ExpenseAggregator {
    /// Converts `amount` into the primary currency.
    pub fn normalize(amount: f64, currency: Currency, rate: &ExchangeRate) -> f64 {
        match currency {
            Currency::Primary => amount,
            Currency::Secondary => amount * rate.secondary_to_primary(),
        }
    }

    pub fn total(records: &[ExpenseRecord], rate: &ExchangeRate) -> f64 {
        records
            .iter()
            .map(|record| Self::normalize(record.amount, record.currency, rate))
            .sum()
    }

    /// Sums per category. Categories without records are absent, not zero.
    pub fn subtotals_by_category(
        records: &[ExpenseRecord],
        rate: &ExchangeRate,
    ) -> BTreeMap<ExpenseCategory, f64> {
        let mut subtotals = BTreeMap::new();
        for record in records {
            *subtotals.entry(record.category).or_insert(0.0) +=
                Self::normalize(record.amount, record.currency, rate);
        }
        subtotals
    }

    /// The "≈ other currency" figure shown beside each record.
    pub fn secondary_equivalent(amount: f64, currency: Currency, rate: &ExchangeRate) -> f64 {
        match currency {
            Currency::Primary => amount / rate.secondary_to_primary(),
            Currency::Secondary => amount * rate.secondary_to_primary(),
        }
    }

    pub fn summarize(records: &[ExpenseRecord], rate: &ExchangeRate) -> ExpenseSummary {
        let subtotals = Self::subtotals_by_category(records, rate);
        let total: f64 = subtotals.values().sum();
        let breakdown = subtotals
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                category,
                amount,
                share_percent: if total > 0.0 {
                    amount / total * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        ExpenseSummary {
            rate: *rate,
            total,
            breakdown,
            record_count: records.len(),
        }
    }

    /// Prepends `record`, newest first.
    pub fn add(records: &[ExpenseRecord], record: ExpenseRecord) -> Result<Vec<ExpenseRecord>> {
        Self::validate_amount(record.amount)?;
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(TripError::InvalidInput(format!(
                "expense id `{}` already exists",
                record.id
            )));
        }
        let mut updated = Vec::with_capacity(records.len() + 1);
        updated.push(record);
        updated.extend_from_slice(records);
        Ok(updated)
    }

    /// Drops the record with `id`. Unknown ids leave the list unchanged.
    pub fn remove(records: &[ExpenseRecord], id: &str) -> Vec<ExpenseRecord> {
        records
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect()
    }

    /// Parses a user-entered amount, rejecting anything that is not a positive number.
    pub fn parse_amount(input: &str) -> Result<f64> {
        let trimmed = input.trim().replace(',', "");
        if trimmed.is_empty() {
            return Err(TripError::InvalidInput("amount is required".into()));
        }
        let amount: f64 = trimmed
            .parse()
            .map_err(|_| TripError::InvalidInput(format!("`{}` is not a number", input.trim())))?;
        Self::validate_amount(amount)?;
        Ok(amount)
    }

    fn validate_amount(amount: f64) -> Result<()> {
        if amount.is_finite() && amount > 0.0 {
            Ok(())
        } else {
            Err(TripError::InvalidInput(format!(
                "amount must be greater than zero, got {}",
                amount
            )))
        }
    }
}
