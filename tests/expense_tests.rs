mod common;

use std::sync::Arc;

use chrono::Utc;
use common::record;
use tempfile::tempdir;
use trip_core::{
    core::{services::ExpenseAggregator, ExpenseBook},
    currency::{Currency, ExchangeRate},
    domain::{ExpenseCategory, ExpenseDraft},
    storage::{JsonFileStore, KeyValueStore, MemoryStore},
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn normalized_total_matches_hand_computation() {
    let rate = ExchangeRate::live(0.2).unwrap();
    let records = vec![
        record(1000.0, Currency::Secondary, ExpenseCategory::Food),
        record(50.0, Currency::Primary, ExpenseCategory::Food),
    ];
    assert!(approx(ExpenseAggregator::total(&records, &rate), 250.0));

    let summary = ExpenseAggregator::summarize(&records, &rate);
    assert_eq!(summary.breakdown.len(), 1);
    assert_eq!(summary.breakdown[0].category, ExpenseCategory::Food);
    assert!(approx(summary.breakdown[0].share_percent, 100.0));
}

#[test]
fn fallback_rate_is_used_until_replaced() {
    let records = vec![record(1000.0, Currency::Secondary, ExpenseCategory::Stay)];
    let total = ExpenseAggregator::total(&records, &ExchangeRate::default());
    assert!(approx(total, 215.0));
}

#[test]
fn book_round_trips_through_json_file_store() {
    let dir = tempdir().unwrap();
    let key = "okinawa_expenses";
    let first_id;
    {
        let store = Arc::new(JsonFileStore::in_dir(dir.path()).unwrap());
        let mut book = ExpenseBook::open(store, key);
        let draft = ExpenseDraft::new(1280.0, Currency::Secondary, ExpenseCategory::Food)
            .with_note("soba");
        first_id = book.add(draft, Utc::now()).unwrap().id;
        let draft = ExpenseDraft::new(450.0, Currency::Primary, ExpenseCategory::Transport);
        book.add(draft, Utc::now()).unwrap();
    }

    let store = Arc::new(JsonFileStore::in_dir(dir.path()).unwrap());
    let book = ExpenseBook::open(store, key);
    assert_eq!(book.len(), 2);
    assert_eq!(book.records()[1].id, first_id);
    assert_eq!(book.records()[1].note, "soba");
    assert_eq!(book.records()[0].category, ExpenseCategory::Transport);
}

#[test]
fn legacy_browser_records_load() {
    let legacy = r#"[
        {"id":"1710230400000","amount":1500,"currency":"JPY","category":"food","note":"taco rice","date":1710230400000},
        {"id":"1710234000000","amount":120,"currency":"TWD","category":"transport","date":1710234000000}
    ]"#;
    let store = Arc::new(MemoryStore::with_entry("okinawa_expenses", legacy));
    let book = ExpenseBook::open(store, "okinawa_expenses");

    assert_eq!(book.len(), 2);
    assert_eq!(book.records()[0].currency, Currency::Secondary);
    assert_eq!(book.records()[1].currency, Currency::Primary);
    assert_eq!(book.records()[1].note, "");
    assert_eq!(
        book.records()[0].created_at.timestamp_millis(),
        1_710_230_400_000
    );
}

#[test]
fn saved_list_uses_wire_field_names() {
    let store = Arc::new(MemoryStore::new());
    let mut book = ExpenseBook::open(store.clone(), "okinawa_expenses");
    let draft = ExpenseDraft::new(300.0, Currency::Primary, ExpenseCategory::Shopping);
    book.add(draft, Utc::now()).unwrap();

    let raw = store.get("okinawa_expenses").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entry = &value[0];
    assert_eq!(entry["currency"], "primary");
    assert_eq!(entry["category"], "shopping");
    assert!(entry["date"].is_i64());
}

#[test]
fn unparseable_store_value_starts_empty() {
    let store = Arc::new(MemoryStore::with_entry("okinawa_expenses", "not-json"));
    let book = ExpenseBook::open(store, "okinawa_expenses");
    assert!(book.is_empty());
}
