//! The persisted expense list.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    core::services::ExpenseAggregator,
    domain::{ExpenseDraft, ExpenseRecord, Identifiable},
    errors::Result,
    storage::KeyValueStore,
};

/// Owns the expense list and writes it back to the store after every mutation.
pub struct ExpenseBook {
    store: Arc<dyn KeyValueStore>,
    key: String,
    records: Vec<ExpenseRecord>,
}

impl ExpenseBook {
    /// Loads the list stored under `key`. A missing or unparseable value starts
    /// an empty list rather than failing the session. Records with a
    /// non-positive amount or a repeated id are dropped on load.
    pub fn open(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let records = match store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ExpenseRecord>>(&raw) {
                Ok(records) => retain_valid(&key, records),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "stored expenses unreadable; starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(key = %key, error = %err, "expense store unavailable; starting empty");
                Vec::new()
            }
        };
        tracing::info!(key = %key, count = records.len(), "expense list loaded");
        Self {
            store,
            key,
            records,
        }
    }

    /// Newest first.
    pub fn records(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    pub fn add(&mut self, draft: ExpenseDraft, now: DateTime<Utc>) -> Result<ExpenseRecord> {
        let record = draft.into_record(now);
        let updated = ExpenseAggregator::add(&self.records, record.clone())?;
        self.commit(updated)?;
        tracing::info!(id = %record.id, amount = record.amount, currency = %record.currency, "expense added");
        Ok(record)
    }

    /// Returns whether a record was removed. Unknown ids are not an error.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let updated = ExpenseAggregator::remove(&self.records, id);
        if updated.len() == self.records.len() {
            return Ok(false);
        }
        self.commit(updated)?;
        tracing::info!(id, "expense removed");
        Ok(true)
    }

    /// An emptied list drops its key instead of storing `[]`.
    fn commit(&mut self, updated: Vec<ExpenseRecord>) -> Result<()> {
        if updated.is_empty() {
            self.store.remove(&self.key)?;
        } else {
            let json = serde_json::to_string(&updated)?;
            self.store.set(&self.key, &json)?;
        }
        self.records = updated;
        Ok(())
    }
}

/// Keeps the first record for each id and only positive, finite amounts.
fn retain_valid(key: &str, records: Vec<ExpenseRecord>) -> Vec<ExpenseRecord> {
    let loaded = records.len();
    let mut seen = HashSet::new();
    let mut invalid_amounts = 0usize;
    let mut duplicate_ids = 0usize;
    let kept: Vec<ExpenseRecord> = records
        .into_iter()
        .filter(|record| {
            if !record.amount.is_finite() || record.amount <= 0.0 {
                invalid_amounts += 1;
                return false;
            }
            if !seen.insert(record.id.clone()) {
                duplicate_ids += 1;
                return false;
            }
            true
        })
        .collect();
    if kept.len() != loaded {
        tracing::warn!(
            key,
            invalid_amounts,
            duplicate_ids,
            kept = kept.len(),
            "dropped stored expenses that break list invariants"
        );
    }
    kept
}
