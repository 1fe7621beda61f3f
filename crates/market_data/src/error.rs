use common::models::RecordError;
use thiserror::Error;

/// Why a dividend observation could not be obtained for a symbol.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Provider error ({code}): {description}")]
    Provider { code: String, description: String },
    #[error("No chart data returned for {0}")]
    EmptyResult(String),
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid dividend event: {0}")]
    InvalidEvent(String),
    #[error(transparent)]
    Record(#[from] RecordError),
}
