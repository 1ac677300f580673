//! View model: one row per task, grouped by column.
//!
//! Rows mirror the store but are updated incrementally by the controller, so
//! a row can still be visible during its removal transition after the task
//! has already left the store.

use std::ops::Range;
use std::time::{Duration, Instant};

use crate::domain::{BoardState, Collection, Counts, Priority, Task, TaskId};
use crate::ui::transient::TransitionTimings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPhase {
    Inserting { since: Instant },
    Settled,
    Removing { since: Instant },
}

#[derive(Debug, Clone)]
pub struct RowView {
    pub id: TaskId,
    pub text: String,
    pub priority: Priority,
    pub phase: RowPhase,
    pub dragging: bool,
}

impl RowView {
    fn new(task: &Task, now: Instant) -> Self {
        Self {
            id: task.id.clone(),
            text: task.text.clone(),
            priority: task.priority,
            phase: RowPhase::Inserting { since: now },
            dragging: false,
        }
    }

    pub fn is_removing(&self) -> bool {
        matches!(self.phase, RowPhase::Removing { .. })
    }

    /// Progress of the removal transition in `0.0..=1.0`
    pub fn removal_progress(&self, now: Instant, duration: Duration) -> f32 {
        match self.phase {
            RowPhase::Removing { since } if !duration.is_zero() => {
                let elapsed = now.saturating_duration_since(since);
                (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
            }
            RowPhase::Removing { .. } => 1.0,
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardView {
    columns: [Vec<RowView>; 3],
    /// First row shown in each column
    scroll: [usize; 3],
    badges: Counts,
    timings: TransitionTimings,
}

impl BoardView {
    pub fn new(timings: TransitionTimings) -> Self {
        Self {
            columns: Default::default(),
            scroll: [0; 3],
            badges: Counts::default(),
            timings,
        }
    }

    pub fn timings(&self) -> &TransitionTimings {
        &self.timings
    }

    /// Rebuilds every row from the board
    pub fn reload(&mut self, board: &BoardState, now: Instant) {
        for collection in Collection::ALL {
            self.columns[collection.index()] = board
                .tasks(collection)
                .iter()
                .map(|task| RowView::new(task, now))
                .collect();
        }
        self.badges = board.counts();
        self.scroll = [0; 3];
    }

    pub fn rows(&self, collection: Collection) -> &[RowView] {
        &self.columns[collection.index()]
    }

    /// Scrolls a column by `delta` rows, never past its last row
    pub fn scroll_by(&mut self, collection: Collection, delta: isize) {
        let last = self.rows(collection).len().saturating_sub(1);
        let offset = &mut self.scroll[collection.index()];
        *offset = offset.saturating_add_signed(delta).min(last);
    }

    /// Indices of the rows shown in a column `height` lines tall
    pub fn visible_window(&self, collection: Collection, height: usize) -> Range<usize> {
        let len = self.rows(collection).len();
        let first = self.scroll[collection.index()].min(len.saturating_sub(height));
        first..(first + height).min(len)
    }

    pub fn badges(&self) -> Counts {
        self.badges
    }

    pub fn set_badges(&mut self, counts: Counts) {
        self.badges = counts;
    }

    /// The column currently holding the row
    pub fn locate(&self, id: &TaskId) -> Option<(Collection, usize)> {
        Collection::ALL.into_iter().find_map(|collection| {
            self.rows(collection)
                .iter()
                .position(|row| &row.id == id)
                .map(|index| (collection, index))
        })
    }

    pub fn row(&self, id: &TaskId) -> Option<&RowView> {
        self.locate(id)
            .map(|(collection, index)| &self.columns[collection.index()][index])
    }

    fn row_mut(&mut self, id: &TaskId) -> Option<&mut RowView> {
        let (collection, index) = self.locate(id)?;
        self.columns[collection.index()].get_mut(index)
    }

    pub fn append(&mut self, collection: Collection, task: &Task, now: Instant) {
        self.columns[collection.index()].push(RowView::new(task, now));
    }

    /// Detaches the row and appends it to `to`. Returns false when absent.
    pub fn relocate(&mut self, id: &TaskId, to: Collection) -> bool {
        let Some((from, index)) = self.locate(id) else {
            return false;
        };
        let row = self.columns[from.index()].remove(index);
        self.columns[to.index()].push(row);
        true
    }

    /// Re-reads text and priority from the task, leaving the row in place
    pub fn refresh(&mut self, task: &Task) -> bool {
        match self.row_mut(&task.id) {
            Some(row) => {
                row.text = task.text.clone();
                row.priority = task.priority;
                true
            }
            None => false,
        }
    }

    pub fn begin_removal(&mut self, id: &TaskId, now: Instant) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.phase = RowPhase::Removing { since: now };
                row.dragging = false;
                true
            }
            None => false,
        }
    }

    pub fn set_dragging(&mut self, id: &TaskId, dragging: bool) -> bool {
        match self.row_mut(id) {
            Some(row) => {
                row.dragging = dragging;
                true
            }
            None => false,
        }
    }

    /// Settles finished insertions and detaches finished removals.
    ///
    /// Returns the ids of detached rows.
    pub fn tick(&mut self, now: Instant) -> Vec<TaskId> {
        let insert = self.timings.row_insert;
        let remove = self.timings.row_remove;
        let mut detached = Vec::new();

        for rows in self.columns.iter_mut() {
            rows.retain_mut(|row| match row.phase {
                RowPhase::Inserting { since } => {
                    if now.saturating_duration_since(since) >= insert {
                        row.phase = RowPhase::Settled;
                    }
                    true
                }
                RowPhase::Removing { since } => {
                    if now.saturating_duration_since(since) >= remove {
                        detached.push(row.id.clone());
                        false
                    } else {
                        true
                    }
                }
                RowPhase::Settled => true,
            });
        }

        detached
    }
}
