use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use common::models::DividendObservation;
use market_data::{DividendFetcher, FetchError};
use monitor::{AlertDispatcher, DispatchError, DividendMonitor, MonitorSettings};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use storage::{JsonFileStore, StateStore};
use tokio::sync::Mutex;

struct FixedFetcher {
    data: HashMap<String, (Decimal, NaiveDate)>,
}

impl FixedFetcher {
    fn new(entries: &[(&str, Decimal, &str)]) -> Self {
        let data = entries
            .iter()
            .map(|(symbol, amount, date)| {
                (
                    symbol.to_string(),
                    (
                        *amount,
                        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    ),
                )
            })
            .collect();
        Self { data }
    }
}

#[async_trait]
impl DividendFetcher for FixedFetcher {
    async fn fetch(&self, symbol: &str) -> Result<DividendObservation, FetchError> {
        let (amount, date) = self
            .data
            .get(symbol)
            .ok_or_else(|| FetchError::EmptyResult(symbol.to_string()))?;
        Ok(DividendObservation::new(*amount, *date)?)
    }
}

#[derive(Default)]
struct Outbox {
    messages: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AlertDispatcher for Outbox {
    async fn send(&self, symbol: &str, _subject: &str, body: &str) -> Result<(), DispatchError> {
        self.messages
            .lock()
            .await
            .push((symbol.to_string(), body.to_string()));
        Ok(())
    }
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_run_against_legacy_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dividend_data.json");
    std::fs::write(
        &path,
        r#"{
  "MSFT": {"amount": 1.0, "date": "2024-01-15", "last_updated": "2024-01-16T07:00:00.000001"},
  "GE": {"amount": 2.0, "date": "2024-01-15", "last_updated": "2024-01-16T07:00:00"},
  "XOM": {"amount": 0.95, "date": "2024-02-14", "last_updated": "2024-02-15T07:00:00"},
  "OLD": {"amount": 0.1, "date": "2020-01-01", "last_updated": "2020-01-02T07:00:00"}
}"#,
    )
    .unwrap();

    let store = Arc::new(JsonFileStore::new(&path));
    let outbox = Arc::new(Outbox::default());
    let monitor = DividendMonitor::new(
        MonitorSettings {
            threshold: dec!(0.2),
        },
        Arc::new(FixedFetcher::new(&[
            ("MSFT", dec!(1.25), "2024-04-15"),
            ("GE", dec!(0), "2024-04-15"),
            ("KO", dec!(0.50), "2024-01-15"),
        ])),
        store.clone(),
        outbox.clone(),
    );

    let report = monitor
        .run(&symbols(&["MSFT", "GE", "XOM", "KO"]))
        .await
        .unwrap();

    assert_eq!(report.alerts, 2);
    assert_eq!(report.skipped_zero, 1);
    assert_eq!(report.fetch_failures, 1);

    let messages = outbox.messages.lock().await;
    assert_eq!(messages[0].0, "MSFT");
    assert!(messages[0].1.contains("Significant change: increased by 25.0%"));
    assert_eq!(messages[1].0, "KO");
    assert!(messages[1].1.contains("First dividend recorded"));

    let saved = store.load().await;
    assert_eq!(saved.len(), 5);
    assert_eq!(saved["MSFT"].amount(), dec!(1.25));
    assert_eq!(saved["MSFT"].date_label(), "2024-04-15");
    assert_eq!(saved["GE"].amount(), dec!(2.0));
    assert_eq!(saved["GE"].date_label(), "2024-01-15");
    assert_eq!(saved["XOM"].amount(), dec!(0.95));
    assert_eq!(saved["KO"].amount(), dec!(0.50));
    assert!(saved.contains_key("OLD"));
}

#[tokio::test]
async fn test_corrupt_state_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dividend_data.json");
    std::fs::write(&path, "{\"AAPL\": {\"amount\": ").unwrap();

    let store = Arc::new(JsonFileStore::new(&path));
    let outbox = Arc::new(Outbox::default());
    let monitor = DividendMonitor::new(
        MonitorSettings {
            threshold: dec!(0.2),
        },
        Arc::new(FixedFetcher::new(&[("AAPL", dec!(0.25), "2024-05-10")])),
        store.clone(),
        outbox.clone(),
    );

    let report = monitor.run(&symbols(&["AAPL"])).await.unwrap();
    assert_eq!(report.alerts, 1);
    assert!(outbox.messages.lock().await[0].1.contains("First dividend recorded"));

    let second = monitor.run(&symbols(&["AAPL"])).await.unwrap();
    assert_eq!(second.alerts, 0);
    assert_eq!(store.load().await["AAPL"].date_label(), "2024-05-10");
}
