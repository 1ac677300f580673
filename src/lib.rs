//! # Taskboard
//!
//! A three-column task board (todo, in progress, completed) with local
//! persistence and a terminal front end.
//!
//! The domain types and the [`TaskStore`] know nothing about the terminal;
//! the `ui` module holds the view model, the interaction controller and the
//! ratatui/crossterm front end built on top of them.

pub mod config;
pub mod domain;
pub mod error;
pub mod storage;
pub mod store;
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use domain::{BoardState, Collection, Counts, Priority, Task, TaskId};
pub use error::{BoardError, Result};
pub use storage::Storage;
pub use store::TaskStore;
