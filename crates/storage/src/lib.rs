use std::path::PathBuf;
use std::sync::Arc;

pub mod db;
pub mod error;
pub mod json_store;
pub mod memory_store;
pub mod traits;

pub use db::SqliteStore;
pub use error::StorageError;
pub use json_store::JsonFileStore;
pub use memory_store::MemoryStore;
pub use traits::StateStore;

/// Where the last-known dividend state lives between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    JsonFile(PathBuf),
    Sqlite(String),
    /// Nothing survives the process.
    None,
}

pub async fn open_store(backend: &StorageBackend) -> Result<Arc<dyn StateStore>, StorageError> {
    let store: Arc<dyn StateStore> = match backend {
        StorageBackend::JsonFile(path) => Arc::new(JsonFileStore::new(path.clone())),
        StorageBackend::Sqlite(url) => Arc::new(SqliteStore::connect(url).await?),
        StorageBackend::None => Arc::new(MemoryStore::default()),
    };
    Ok(store)
}
