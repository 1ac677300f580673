use crate::domain::task::{Priority, Task, TaskId};
use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

/// One of the three fixed board columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Todo,
    InProgress,
    Completed,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Todo,
        Collection::InProgress,
        Collection::Completed,
    ];

    /// Key used in the persisted record
    pub fn key(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
        }
    }

    /// Key split into words at capitals, lower-cased ("in progress")
    pub fn human_name(self) -> String {
        split_words(self.key())
    }

    /// Column heading
    pub fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Completed => 2,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(BoardError::InvalidCollection(s.to_string())),
        }
    }
}

fn split_words(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 2);
    for ch in key.chars() {
        if ch.is_uppercase() {
            out.push(' ');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// Number of tasks in each collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub todo: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl Counts {
    pub fn get(&self, collection: Collection) -> usize {
        match collection {
            Collection::Todo => self.todo,
            Collection::InProgress => self.in_progress,
            Collection::Completed => self.completed,
        }
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.completed
    }
}

/// The three collections together; the unit of persistence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    #[serde(default)]
    pub todo: Vec<Task>,
    #[serde(default)]
    pub in_progress: Vec<Task>,
    #[serde(default)]
    pub completed: Vec<Task>,
}

impl BoardState {
    pub fn tasks(&self, collection: Collection) -> &[Task] {
        match collection {
            Collection::Todo => &self.todo,
            Collection::InProgress => &self.in_progress,
            Collection::Completed => &self.completed,
        }
    }

    fn tasks_mut(&mut self, collection: Collection) -> &mut Vec<Task> {
        match collection {
            Collection::Todo => &mut self.todo,
            Collection::InProgress => &mut self.in_progress,
            Collection::Completed => &mut self.completed,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            todo: self.todo.len(),
            in_progress: self.in_progress.len(),
            completed: self.completed.len(),
        }
    }

    /// Finds a task across all collections, first match wins
    pub fn find(&self, id: &TaskId) -> Option<(Collection, &Task)> {
        Collection::ALL.into_iter().find_map(|collection| {
            self.tasks(collection)
                .iter()
                .find(|task| &task.id == id)
                .map(|task| (collection, task))
        })
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.find(id).is_some()
    }

    /// Generates an id from the timestamp, stepping past ids already in use
    pub fn next_id(&self, now_millis: i64) -> TaskId {
        let mut candidate = now_millis;
        loop {
            let id = TaskId::from_millis(candidate);
            if !self.contains(&id) {
                return id;
            }
            candidate += 1;
        }
    }

    /// Appends a task to the end of a collection
    pub fn push(&mut self, collection: Collection, task: Task) {
        self.tasks_mut(collection).push(task);
    }

    /// Edits a task in place wherever it is. Returns the holding collection.
    pub fn edit(
        &mut self,
        id: &TaskId,
        text: &str,
        priority: Priority,
    ) -> Result<Option<Collection>, BoardError> {
        for collection in Collection::ALL {
            if let Some(task) = self.tasks_mut(collection).iter_mut().find(|t| &t.id == id) {
                task.edit(text, priority)?;
                return Ok(Some(collection));
            }
        }
        Ok(None)
    }

    /// Removes a task from one collection
    pub fn take(&mut self, id: &TaskId, collection: Collection) -> Option<Task> {
        let tasks = self.tasks_mut(collection);
        let index = tasks.iter().position(|t| &t.id == id)?;
        Some(tasks.remove(index))
    }

    /// Moves a task to the end of another collection. Returns whether it moved.
    pub fn transfer(&mut self, id: &TaskId, from: Collection, to: Collection) -> bool {
        if from == to {
            return false;
        }
        match self.take(id, from) {
            Some(task) => {
                self.push(to, task);
                true
            }
            None => false,
        }
    }

    /// Drops tasks whose text is empty after trimming. Returns their ids.
    pub fn drop_blank(&mut self) -> Vec<TaskId> {
        let mut dropped = Vec::new();
        for collection in Collection::ALL {
            self.tasks_mut(collection).retain(|task| {
                let keep = !task.text.trim().is_empty();
                if !keep {
                    dropped.push(task.id.clone());
                }
                keep
            });
        }
        dropped
    }

    /// Drops every repeated id after its first occurrence.
    ///
    /// Returns the dropped ids.
    pub fn dedupe(&mut self) -> Vec<TaskId> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        for collection in Collection::ALL {
            self.tasks_mut(collection).retain(|task| {
                if seen.insert(task.id.clone()) {
                    true
                } else {
                    dropped.push(task.id.clone());
                    false
                }
            });
        }
        dropped
    }
}
