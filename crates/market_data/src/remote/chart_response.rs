use std::collections::HashMap;

use chrono::DateTime;
use common::models::DividendObservation;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{error::FetchError, traits::RemoteResponse};

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    pub events: Option<ChartEvents>,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    pub symbol: String,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartEvents {
    // Keyed by the event's unix timestamp as a string.
    #[serde(default)]
    pub dividends: HashMap<String, DividendEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DividendEvent {
    pub amount: Decimal,
    pub date: i64,
}

impl ChartResponse {
    pub fn provider_error(&self) -> Option<FetchError> {
        self.chart.error.as_ref().map(|e| FetchError::Provider {
            code: e.code.clone(),
            description: e.description.clone(),
        })
    }
}

/// Picks the most recent dividend event. A symbol without any event in the
/// requested range reports a zero amount dated today.
impl RemoteResponse<DividendObservation> for ChartResponse {
    fn to_domain(&self) -> Result<DividendObservation, FetchError> {
        if let Some(err) = self.provider_error() {
            return Err(err);
        }

        let result = self
            .chart
            .result
            .as_ref()
            .and_then(|r| r.first())
            .ok_or_else(|| FetchError::EmptyResult("chart".to_string()))?;

        let latest = result
            .events
            .as_ref()
            .and_then(|events| events.dividends.values().max_by_key(|ev| ev.date));

        match latest {
            Some(event) => {
                let date = DateTime::from_timestamp(event.date, 0)
                    .ok_or_else(|| {
                        FetchError::InvalidEvent(format!(
                            "{}: timestamp {} out of range",
                            result.meta.symbol, event.date
                        ))
                    })?
                    .date_naive();
                Ok(DividendObservation::new(
                    event.amount.round_dp(6).normalize(),
                    date,
                )?)
            }
            None => Ok(DividendObservation::new(Decimal::ZERO, self.today())?),
        }
    }
}
