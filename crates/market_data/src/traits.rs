use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::models::DividendObservation;

use crate::error::FetchError;

/// Source of the latest dividend event for a ticker.
#[async_trait]
pub trait DividendFetcher: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<DividendObservation, FetchError>;
}

pub trait RemoteResponse<T> {
    fn to_domain(&self) -> Result<T, FetchError>;

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}
