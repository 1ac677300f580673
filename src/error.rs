use thiserror::Error;

pub type Result<T> = std::result::Result<T, BoardError>;

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task text cannot be empty")]
    EmptyTaskText,

    #[error("Invalid task ID format: {0}")]
    InvalidTaskId(String),

    #[error("Unknown collection: {0}")]
    InvalidCollection(String),

    #[error("Board not initialized")]
    BoardNotInitialized,

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl BoardError {
    /// Validation failures are handled with a visual cue rather than reported
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyTaskText)
    }
}
