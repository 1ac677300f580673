use crate::{
    domain::BoardState,
    error::{BoardError, Result},
    storage::{Storage, DEFAULT_STORAGE_KEY},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

/// In-memory key/value storage holding serialized records
#[derive(Default)]
pub struct MemoryStorage {
    key: String,
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            key: DEFAULT_STORAGE_KEY.to_string(),
            ..Default::default()
        }
    }

    /// Seeds the record with raw contents, which need not be valid JSON
    pub fn with_raw(contents: impl Into<String>) -> Self {
        let storage = Self::new();
        storage.set_raw(contents);
        storage
    }

    pub fn set_raw(&self, contents: impl Into<String>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(self.key.clone(), contents.into());
        }
    }

    /// Raw contents of the record, if any
    pub fn raw(&self) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&self.key).cloned())
    }

    /// Number of successful saves
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes subsequent saves fail until reset
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        Ok(())
    }

    async fn save_board(&self, board: &BoardState) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BoardError::StorageError("storage is read-only".to_string()));
        }

        let json = serde_json::to_string(board)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| BoardError::StorageError(e.to_string()))?;
        entries.insert(self.key.clone(), json);
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    async fn load_board(&self) -> Result<BoardState> {
        let contents = self.raw().ok_or(BoardError::BoardNotInitialized)?;
        let board: BoardState = serde_json::from_str(&contents)?;
        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.raw().is_some()
    }
}
