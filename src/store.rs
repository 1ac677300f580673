//! The task store: the board state plus its persistence.
//!
//! Every mutation is applied in memory first and then written through the
//! [`Storage`] backend as a full record. Calls that change nothing do not
//! write. A failed write is logged and kept for the caller to report; it is
//! never fatal and never rolls back the in-memory change.

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::{
    domain::{BoardState, Collection, Counts, Priority, Task, TaskId},
    error::{BoardError, Result},
    storage::Storage,
};

pub struct TaskStore {
    board: BoardState,
    storage: Box<dyn Storage>,
    dirty: bool,
    persist_error: Option<BoardError>,
}

impl TaskStore {
    /// Loads the stored board, falling back to an empty one when the record
    /// is absent or unreadable.
    pub async fn load(storage: Box<dyn Storage>) -> Self {
        let board = if !storage.is_initialized().await {
            info!("no stored board, starting empty");
            BoardState::default()
        } else {
            match storage.load_board().await {
                Ok(mut board) => {
                    let blank = board.drop_blank();
                    if !blank.is_empty() {
                        warn!(dropped = ?blank, "dropped tasks with blank text from stored board");
                    }
                    let dropped = board.dedupe();
                    if !dropped.is_empty() {
                        warn!(?dropped, "dropped duplicated task ids from stored board");
                    }
                    board
                }
                Err(e) => {
                    warn!(error = %e, "stored board unreadable, starting empty");
                    BoardState::default()
                }
            }
        };

        Self {
            board,
            storage,
            dirty: false,
            persist_error: None,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn counts(&self) -> Counts {
        self.board.counts()
    }

    pub fn find(&self, id: &TaskId) -> Option<(Collection, &Task)> {
        self.board.find(id)
    }

    /// Whether the in-memory board has changes the backend has not accepted
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the last write failure once
    pub fn take_persist_error(&mut self) -> Option<BoardError> {
        self.persist_error.take()
    }

    /// Adds a task to the end of `todo`
    pub async fn add(&mut self, text: &str, priority: Priority) -> Result<Task> {
        self.add_at(text, priority, Utc::now()).await
    }

    /// Adds a task created at the given time
    pub async fn add_at(
        &mut self,
        text: &str,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Result<Task> {
        let id = self.board.next_id(created_at.timestamp_millis());
        let task = Task::new(id, text, priority, created_at)?;

        self.board.push(Collection::Todo, task.clone());
        info!(id = %task.id, priority = task.priority.as_str(), "task added");
        self.persist().await;

        Ok(task)
    }

    /// Edits a task wherever it is. Returns the collection holding it, or
    /// `None` when no task has that id.
    pub async fn update(
        &mut self,
        id: &TaskId,
        text: &str,
        priority: Priority,
    ) -> Result<Option<Collection>> {
        let found = self.board.edit(id, text, priority)?;
        match found {
            Some(collection) => {
                info!(%id, %collection, "task updated");
                self.persist().await;
            }
            None => warn!(%id, "update for unknown task ignored"),
        }
        Ok(found)
    }

    /// Removes a task from the named collection
    pub async fn remove(&mut self, id: &TaskId, collection: Collection) -> Option<Task> {
        let removed = self.board.take(id, collection);
        match &removed {
            Some(_) => {
                info!(%id, %collection, "task removed");
                self.persist().await;
            }
            None => warn!(%id, %collection, "remove for absent task ignored"),
        }
        removed
    }

    /// Moves a task to the end of another collection. Returns whether it moved.
    pub async fn move_task(&mut self, id: &TaskId, from: Collection, to: Collection) -> bool {
        if from == to {
            return false;
        }
        let moved = self.board.transfer(id, from, to);
        if moved {
            info!(%id, %from, %to, "task moved");
            self.persist().await;
        } else {
            warn!(%id, %from, "move for absent task ignored");
        }
        moved
    }

    /// Writes the full board, returning any failure to the caller
    pub async fn flush(&mut self) -> Result<()> {
        self.storage.save_board(&self.board).await?;
        self.dirty = false;
        Ok(())
    }

    async fn persist(&mut self) {
        if let Err(e) = self.flush().await {
            error!(error = %e, "failed to persist board");
            self.dirty = true;
            self.persist_error = Some(e);
        }
    }
}
