use std::time::Duration;

use async_trait::async_trait;
use common::models::DividendObservation;
use reqwest::Client;
use tracing::{debug, error};

use crate::{
    error::FetchError,
    remote::{ChartResponse, DEFAULT_BASE_URL},
    traits::{DividendFetcher, RemoteResponse},
};

#[derive(Debug, Clone)]
pub struct YahooSettings {
    pub base_url: String,
    /// History window passed as `range`, e.g. `1y`, `2y`, `5y`.
    pub range: String,
    pub timeout: Duration,
}

impl Default for YahooSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            range: "2y".to_string(),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Reads the dividend events from Yahoo Finance's chart endpoint.
#[derive(Clone)]
pub struct YahooDividendClient {
    client: Client,
    base_url: String,
    range: String,
}

impl YahooDividendClient {
    pub fn new(settings: YahooSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; dividend-monitor/0.1)")
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            range: settings.range,
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    async fn make_request(&self, symbol: &str) -> Result<ChartResponse, FetchError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[
                ("range", self.range.as_str()),
                ("interval", "1d"),
                ("events", "div"),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Unknown symbols come back as 404 with the reason in the chart envelope.
            if let Some(err) = serde_json::from_str::<ChartResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.provider_error())
            {
                return Err(err);
            }
            error!("Yahoo chart request for {} failed: {}", symbol, status);
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str::<ChartResponse>(&body)?)
    }
}

#[async_trait]
impl DividendFetcher for YahooDividendClient {
    async fn fetch(&self, symbol: &str) -> Result<DividendObservation, FetchError> {
        debug!("Fetching dividend history for {}", symbol);
        let response = self.make_request(symbol).await?;
        let observation = response.to_domain()?;
        debug!(
            "{}: latest dividend {} on {}",
            symbol,
            observation.amount(),
            observation.effective_date()
        );
        Ok(observation)
    }
}
