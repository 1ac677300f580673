use crate::{
    domain::BoardState,
    error::{BoardError, Result},
    storage::{Storage, DEFAULT_STORAGE_KEY},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// File-based storage: one JSON file per storage key
pub struct FileStorage {
    root_path: PathBuf,
    key: String,
}

impl FileStorage {
    /// Creates a FileStorage using the default storage key
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self::with_key(data_dir, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(data_dir: impl AsRef<Path>, key: impl Into<String>) -> Self {
        Self {
            root_path: data_dir.as_ref().to_path_buf(),
            key: key.into(),
        }
    }

    /// Path of the board record
    pub fn board_file(&self) -> PathBuf {
        self.root_path.join(format!("{}.json", self.key))
    }

    fn temp_file(&self) -> PathBuf {
        self.root_path.join(format!("{}.json.tmp", self.key))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await
    }

    async fn save_board(&self, board: &BoardState) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        let tmp = self.temp_file();
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, self.board_file()).await?;

        Ok(())
    }

    async fn load_board(&self) -> Result<BoardState> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(BoardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: BoardState = serde_json::from_str(&contents)?;

        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.board_file().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Collection, Priority, Task, TaskId};
    use tempfile::TempDir;

    fn sample_board() -> BoardState {
        let mut board = BoardState::default();
        let now = chrono::Utc::now();
        board.push(
            Collection::Todo,
            Task::new(TaskId::from_millis(1), "Buy milk", Priority::High, now).unwrap(),
        );
        board.push(
            Collection::InProgress,
            Task::new(TaskId::from_millis(2), "Write report", Priority::Low, now).unwrap(),
        );
        board
    }

    #[tokio::test]
    async fn test_storage_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("board"));

        assert!(!storage.is_initialized().await);

        storage.initialize().await.unwrap();
        assert!(temp_dir.path().join("board").exists());

        // Only a saved record counts as initialized
        assert!(!storage.is_initialized().await);
    }

    #[tokio::test]
    async fn test_load_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        let err = storage.load_board().await.unwrap_err();
        assert!(matches!(err, BoardError::BoardNotInitialized));
    }

    #[tokio::test]
    async fn test_board_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        let board = sample_board();

        storage.save_board(&board).await.unwrap();
        assert!(storage.is_initialized().await);
        assert!(!storage.temp_file().exists());

        let loaded = storage.load_board().await.unwrap();
        assert_eq!(loaded, board);
    }

    #[tokio::test]
    async fn test_record_uses_storage_key() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_key(temp_dir.path(), "customKey");

        storage.save_board(&BoardState::default()).await.unwrap();
        assert!(temp_dir.path().join("customKey.json").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());

        storage.save_board(&sample_board()).await.unwrap();
        storage.save_board(&BoardState::default()).await.unwrap();

        let loaded = storage.load_board().await.unwrap();
        assert_eq!(loaded.counts().total(), 0);
    }

    #[tokio::test]
    async fn test_malformed_record_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        std::fs::write(storage.board_file(), "{ not json").unwrap();

        let err = storage.load_board().await.unwrap_err();
        assert!(matches!(err, BoardError::SerializationError(_)));
    }
}
