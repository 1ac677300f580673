//! Abstract input events.
//!
//! The terminal front end translates key and mouse input into these; the
//! controller never sees raw terminal events.

use crate::domain::{Collection, TaskId};
use crate::ui::input::TextEdit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// Text entry, routed to the edit modal when open, else the add form
    Text(TextEdit),
    /// Advance the focused priority selector
    CyclePriority,
    /// Add button or Enter in the add form
    SubmitAdd,
    EditClicked(TaskId),
    DeleteClicked(TaskId),
    SaveEdit,
    CloseEdit,
    ClickOutsideModal,
    DragStart(TaskId),
    DragEnter(Collection),
    DragOver(Collection),
    DragLeave(Collection),
    Drop(Collection),
    DragEnd,
    /// Mouse wheel over a column, in rows
    Scroll {
        collection: Collection,
        delta: i16,
    },
    Quit,
}
