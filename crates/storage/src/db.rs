use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use common::models::{DividendRecord, SymbolState};
use rust_decimal::Decimal;
use sqlx::sqlite::{self, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use crate::{error::StorageError, traits::StateStore};

const SCHEMA: &str = include_str!("../../../sql/schema.sql");

/// Dividend state kept in a single SQLite table, one row per symbol.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA).execute(&pool).await?;
        Ok(Self { pool })
    }

    async fn fetch_rows(&self) -> Result<Vec<(String, String, String, String)>, sqlx::Error> {
        sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT symbol, amount, effective_date, last_updated FROM dividend_state ORDER BY symbol",
        )
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn load(&self) -> SymbolState {
        let rows = match self.fetch_rows().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Failed to read dividend state from database: {}. Starting fresh", e);
                return SymbolState::new();
            }
        };

        let mut state = SymbolState::new();
        for (symbol, amount, date, last_updated) in rows {
            let record = Decimal::from_str(&amount)
                .map_err(|e| e.to_string())
                .and_then(|amount| {
                    DividendRecord::from_parts(amount, &date, &last_updated)
                        .map_err(|e| e.to_string())
                });

            match record {
                Ok(record) => {
                    state.insert(symbol, record);
                }
                Err(e) => warn!("Skipping invalid stored row for {}: {}", symbol, e),
            }
        }
        debug!("Loaded {} records from database", state.len());
        state
    }

    async fn save(&self, state: &SymbolState) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM dividend_state")
            .execute(&mut *tx)
            .await?;

        for (symbol, record) in state {
            sqlx::query(
                r#"
                    INSERT INTO dividend_state (
                        symbol, amount, effective_date, last_updated
                    ) VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(symbol)
            .bind(record.amount().to_string())
            .bind(record.date_label())
            .bind(record.last_observed_at().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!("Saved {} records to database", state.len());
        Ok(())
    }
}
