use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use common::models::SymbolState;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::{error::StorageError, traits::StateStore};

/// Flat JSON file keyed by symbol.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "dividend_data.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonFileStore {
    async fn load(&self) -> SymbolState {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "No dividend state at {}, starting fresh",
                    self.path.display()
                );
                return SymbolState::new();
            }
            Err(e) => {
                warn!(
                    "Failed to read dividend state {}: {}. Starting fresh",
                    self.path.display(),
                    e
                );
                return SymbolState::new();
            }
        };

        match serde_json::from_str::<SymbolState>(&text) {
            Ok(state) => {
                debug!("Loaded {} records from {}", state.len(), self.path.display());
                state
            }
            Err(e) => {
                warn!(
                    "Dividend state {} is corrupt ({}). Starting fresh",
                    self.path.display(),
                    e
                );
                SymbolState::new()
            }
        }
    }

    async fn save(&self, state: &SymbolState) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::io(parent, e))?;
            }
        }

        // Write beside the target and rename over it so a crash never leaves a torn file.
        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .await
            .map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::io(&self.path, e))?;

        debug!("Saved {} records to {}", state.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use common::models::DividendRecord;
    use rust_decimal_macros::dec;

    fn record(amount: rust_decimal::Decimal, date: &str) -> DividendRecord {
        DividendRecord::new(
            amount,
            Some(NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()),
            Utc.with_ymd_and_hms(2024, 4, 16, 9, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("absent.json"));

        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/state.json"));

        let mut state = SymbolState::new();
        state.insert("KO".to_string(), record(dec!(0.485), "2024-06-14"));
        state.insert("AAPL".to_string(), record(dec!(0.25), "2024-05-10"));
        store.save(&state).await.unwrap();

        assert_eq!(store.load().await, state);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let mut first = SymbolState::new();
        first.insert("T".to_string(), record(dec!(0.2775), "2024-04-09"));
        store.save(&first).await.unwrap();

        let mut second = SymbolState::new();
        second.insert("VZ".to_string(), record(dec!(0.665), "2024-04-09"));
        store.save(&second).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("VZ"));
    }

    #[tokio::test]
    async fn test_file_uses_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store = JsonFileStore::new(&path);

        let mut state = SymbolState::new();
        state.insert("PEP".to_string(), record(dec!(1.355), "2024-06-06"));
        store.save(&state).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["PEP"]["date"], "2024-06-06");
        assert_eq!(raw["PEP"]["amount"], serde_json::json!(1.355));
    }
}
