pub mod board;
pub mod task;

pub use board::{BoardState, Collection, Counts};
pub use task::{Priority, Task, TaskId};
