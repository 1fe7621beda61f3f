use async_trait::async_trait;
use common::models::SymbolState;

use crate::error::StorageError;

/// Durable mapping from symbol to its last-known dividend record.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Never fails: missing, unreadable or corrupt state loads as empty.
    async fn load(&self) -> SymbolState;

    /// Replaces the whole stored mapping.
    async fn save(&self, state: &SymbolState) -> Result<(), StorageError>;
}
