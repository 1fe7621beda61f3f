use async_trait::async_trait;
use tracing::info;

use super::{AlertDispatcher, DispatchError};

/// Dry-run dispatcher: alerts only reach the log.
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    async fn send(&self, symbol: &str, subject: &str, body: &str) -> Result<(), DispatchError> {
        info!(symbol, "{}\n{}", subject, body);
        Ok(())
    }
}
