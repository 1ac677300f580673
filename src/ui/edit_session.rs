use crate::domain::{Priority, Task, TaskId};
use crate::ui::input::{InputField, TextEdit};

/// The edit modal's state: which task is open, if any, and the modal fields
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    task: Option<TaskId>,
    pub text: InputField,
    pub priority: Priority,
}

impl EditSession {
    /// Populates the fields from the task and shows the modal
    pub fn open(&mut self, task: &Task) {
        self.task = Some(task.id.clone());
        self.text.set(&task.text);
        self.priority = task.priority;
    }

    /// Hides the modal, discarding any field edits
    pub fn close(&mut self) {
        self.task = None;
        self.text.clear();
        self.priority = Priority::default();
    }

    pub fn is_open(&self) -> bool {
        self.task.is_some()
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        self.task.as_ref()
    }

    pub fn edit_text(&mut self, edit: TextEdit) {
        if self.is_open() {
            self.text.apply(edit);
        }
    }

    pub fn cycle_priority(&mut self) {
        if self.is_open() {
            self.priority = self.priority.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task() -> Task {
        Task::new(TaskId::from_millis(11), "Buy milk", Priority::High, Utc::now()).unwrap()
    }

    #[test]
    fn test_starts_closed() {
        let session = EditSession::default();
        assert!(!session.is_open());
        assert!(session.task_id().is_none());
    }

    #[test]
    fn test_open_populates_fields() {
        let mut session = EditSession::default();
        session.open(&task());

        assert!(session.is_open());
        assert_eq!(session.task_id().unwrap().as_str(), "11");
        assert_eq!(session.text.value, "Buy milk");
        assert_eq!(session.priority, Priority::High);
    }

    #[test]
    fn test_close_clears_slot_and_fields() {
        let mut session = EditSession::default();
        session.open(&task());
        session.edit_text(TextEdit::Insert('!'));
        session.cycle_priority();
        session.close();

        assert!(!session.is_open());
        assert!(session.text.value.is_empty());
        assert_eq!(session.priority, Priority::Medium);
    }

    #[test]
    fn test_edits_ignored_while_closed() {
        let mut session = EditSession::default();
        session.edit_text(TextEdit::Insert('x'));
        session.cycle_priority();

        assert!(session.text.value.is_empty());
        assert_eq!(session.priority, Priority::Medium);
    }

    #[test]
    fn test_reopening_replaces_the_slot() {
        let mut session = EditSession::default();
        session.open(&task());
        let other =
            Task::new(TaskId::from_millis(12), "Walk dog", Priority::Low, Utc::now()).unwrap();
        session.open(&other);

        assert_eq!(session.task_id().unwrap().as_str(), "12");
        assert_eq!(session.text.value, "Walk dog");
    }
}
