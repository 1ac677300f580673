use crate::{domain::BoardState, error::Result};
use async_trait::async_trait;

#[cfg(feature = "file-storage")]
pub mod file_storage;
pub mod memory_storage;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Well-known key the board record is stored under
pub const DEFAULT_STORAGE_KEY: &str = "taskManagerPro";

/// Storage trait for persisting the board record
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Replaces the stored record with the given board
    async fn save_board(&self, board: &BoardState) -> Result<()>;

    /// Loads the stored record.
    ///
    /// Returns `BoardNotInitialized` when nothing has been stored yet and a
    /// serialization error when the record is malformed.
    async fn load_board(&self) -> Result<BoardState>;

    /// Checks if a record exists
    async fn is_initialized(&self) -> bool;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for std::sync::Arc<S> {
    async fn initialize(&self) -> Result<()> {
        (**self).initialize().await
    }

    async fn save_board(&self, board: &BoardState) -> Result<()> {
        (**self).save_board(board).await
    }

    async fn load_board(&self) -> Result<BoardState> {
        (**self).load_board().await
    }

    async fn is_initialized(&self) -> bool {
        (**self).is_initialized().await
    }
}
