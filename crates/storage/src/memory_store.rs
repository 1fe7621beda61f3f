use async_trait::async_trait;
use common::models::SymbolState;
use tokio::sync::Mutex;

use crate::{error::StorageError, traits::StateStore};

/// Keeps state in process memory only.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<SymbolState>,
}

impl MemoryStore {
    pub fn with_state(state: SymbolState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn snapshot(&self) -> SymbolState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self) -> SymbolState {
        self.snapshot().await
    }

    async fn save(&self, state: &SymbolState) -> Result<(), StorageError> {
        let mut current = self.state.lock().await;
        *current = state.clone();
        Ok(())
    }
}
