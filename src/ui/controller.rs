//! Interaction controller.
//!
//! Turns [`BoardEvent`]s into store mutations and keeps the view model,
//! edit session, drag state and transient widgets in step with them. Every
//! handler runs to completion before the next event is dispatched.

use std::time::Instant;

use tracing::{debug, error, warn};

use crate::domain::{Collection, Priority, TaskId};
use crate::store::TaskStore;
use crate::ui::edit_session::EditSession;
use crate::ui::event::BoardEvent;
use crate::ui::input::InputField;
use crate::ui::transient::{InvalidCue, Toast, TransitionTimings};
use crate::ui::view::BoardView;

pub const UPDATED_MESSAGE: &str = "Task updated successfully!";

/// Drag-and-drop state of the board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    /// A row is being dragged; the payload is its task id
    Dragging { payload: TaskId },
}

/// The add-task form
#[derive(Debug, Clone, Default)]
pub struct AddForm {
    pub text: InputField,
    pub priority: Priority,
    pub cue: Option<InvalidCue>,
}

pub struct Controller {
    store: TaskStore,
    view: BoardView,
    form: AddForm,
    edit: EditSession,
    edit_cue: Option<InvalidCue>,
    drag: DragState,
    highlight: Option<Collection>,
    toast: Option<Toast>,
    timings: TransitionTimings,
    should_quit: bool,
}

impl Controller {
    /// Builds the controller and renders every stored task
    pub fn new(store: TaskStore, timings: TransitionTimings, now: Instant) -> Self {
        let mut view = BoardView::new(timings);
        view.reload(store.board(), now);

        Self {
            store,
            view,
            form: AddForm::default(),
            edit: EditSession::default(),
            edit_cue: None,
            drag: DragState::Idle,
            highlight: None,
            toast: None,
            timings,
            should_quit: false,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut TaskStore {
        &mut self.store
    }

    pub fn view(&self) -> &BoardView {
        &self.view
    }

    pub fn form(&self) -> &AddForm {
        &self.form
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn edit_cue(&self) -> Option<&InvalidCue> {
        self.edit_cue.as_ref()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn highlight(&self) -> Option<Collection> {
        self.highlight
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn dispatch(&mut self, event: BoardEvent, now: Instant) {
        debug!(?event, "dispatch");
        match event {
            BoardEvent::Text(edit) => {
                if self.edit.is_open() {
                    self.edit.edit_text(edit);
                } else {
                    self.form.text.apply(edit);
                }
            }
            BoardEvent::CyclePriority => {
                if self.edit.is_open() {
                    self.edit.cycle_priority();
                } else {
                    self.form.priority = self.form.priority.next();
                }
            }
            BoardEvent::SubmitAdd => self.submit_add(now).await,
            BoardEvent::EditClicked(id) => self.open_edit(&id),
            BoardEvent::DeleteClicked(id) => self.delete(&id, now).await,
            BoardEvent::SaveEdit => self.save_edit(now).await,
            BoardEvent::CloseEdit | BoardEvent::ClickOutsideModal => self.close_edit(),
            BoardEvent::DragStart(id) => self.drag_start(id),
            BoardEvent::DragEnter(target) | BoardEvent::DragOver(target) => {
                if matches!(self.drag, DragState::Dragging { .. }) {
                    self.highlight = Some(target);
                }
            }
            BoardEvent::DragLeave(target) => {
                if self.highlight == Some(target) {
                    self.highlight = None;
                }
            }
            BoardEvent::Drop(target) => self.drop_on(target, now).await,
            BoardEvent::DragEnd => self.drag_end(),
            BoardEvent::Scroll { collection, delta } => {
                self.view.scroll_by(collection, isize::from(delta));
            }
            BoardEvent::Quit => self.should_quit = true,
        }
        self.report_persist_error(now);
    }

    /// Advances timed state: expires toasts and cues, settles and detaches rows
    pub fn tick(&mut self, now: Instant) {
        if self.toast.as_ref().is_some_and(|t| t.is_expired(now)) {
            self.toast = None;
        }
        if self.form.cue.is_some_and(|c| !c.is_flagged(now)) {
            self.form.cue = None;
        }
        if self.edit_cue.is_some_and(|c| !c.is_flagged(now)) {
            self.edit_cue = None;
        }

        let detached = self.view.tick(now);
        if !detached.is_empty() {
            debug!(?detached, "rows detached");
            self.view.set_badges(self.store.counts());
        }
    }

    fn show_toast(&mut self, message: impl Into<String>, now: Instant) {
        self.toast = Some(Toast::new(message, now, &self.timings));
    }

    fn report_persist_error(&mut self, now: Instant) {
        if let Some(e) = self.store.take_persist_error() {
            self.show_toast(format!("Could not save board: {e}"), now);
        }
    }

    async fn submit_add(&mut self, now: Instant) {
        if self.edit.is_open() {
            return;
        }
        match self.store.add(&self.form.text.value, self.form.priority).await {
            Ok(task) => {
                self.view.append(Collection::Todo, &task, now);
                self.form.text.clear();
                self.form.cue = None;
                self.view.set_badges(self.store.counts());
            }
            Err(e) if e.is_validation() => {
                debug!("empty task text rejected");
                self.form.cue = Some(InvalidCue::new(now, &self.timings));
            }
            Err(e) => error!(error = %e, "add failed"),
        }
    }

    fn open_edit(&mut self, id: &TaskId) {
        match self.store.find(id) {
            Some((_, task)) => {
                self.edit.open(task);
                self.edit_cue = None;
            }
            None => warn!(%id, "edit requested for a row the store does not hold"),
        }
    }

    fn close_edit(&mut self) {
        self.edit.close();
        self.edit_cue = None;
    }

    async fn save_edit(&mut self, now: Instant) {
        let Some(id) = self.edit.task_id().cloned() else {
            return;
        };

        let result = self
            .store
            .update(&id, &self.edit.text.value, self.edit.priority)
            .await;
        match result {
            Ok(Some(_)) => {
                if let Some((_, task)) = self.store.find(&id) {
                    if !self.view.refresh(task) {
                        warn!(%id, "updated task has no row");
                    }
                }
                self.close_edit();
                self.show_toast(UPDATED_MESSAGE, now);
            }
            Ok(None) => self.close_edit(),
            Err(e) if e.is_validation() => {
                self.edit_cue = Some(InvalidCue::new(now, &self.timings));
            }
            Err(e) => error!(error = %e, "update failed"),
        }
    }

    async fn delete(&mut self, id: &TaskId, now: Instant) {
        let Some((collection, _)) = self.view.locate(id) else {
            warn!(%id, "delete requested for a row the view does not hold");
            return;
        };
        if self.view.row(id).is_some_and(|row| row.is_removing()) {
            return;
        }

        self.store.remove(id, collection).await;
        if self.drag == (DragState::Dragging { payload: id.clone() }) {
            self.drag = DragState::Idle;
        }
        self.view.begin_removal(id, now);
    }

    fn drag_start(&mut self, id: TaskId) {
        if self.view.row(&id).map_or(true, |row| row.is_removing()) {
            warn!(%id, "drag started on a row the view does not hold");
            return;
        }
        self.drag_end();
        self.view.set_dragging(&id, true);
        self.drag = DragState::Dragging { payload: id };
    }

    fn drag_end(&mut self) {
        if let DragState::Dragging { payload } = std::mem::take(&mut self.drag) {
            self.view.set_dragging(&payload, false);
        }
        self.highlight = None;
    }

    async fn drop_on(&mut self, target: Collection, now: Instant) {
        self.highlight = None;

        let DragState::Dragging { payload } = &self.drag else {
            return;
        };
        let id = payload.clone();

        let Some((source, _)) = self.view.locate(&id) else {
            warn!(%id, "dropped row is no longer on the board");
            return;
        };
        if source == target {
            return;
        }

        if self.store.move_task(&id, source, target).await {
            self.view.relocate(&id, target);
            self.view.set_badges(self.store.counts());
            self.show_toast(format!("Task moved to {}", target.human_name()), now);
        } else {
            warn!(%id, %source, "view and store disagree on the dropped row");
        }
    }
}
