//! Terminal front end: crossterm input translation and the draw loop.

use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::Context;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use crate::domain::{Collection, TaskId};
use crate::store::TaskStore;
use crate::ui::controller::Controller;
use crate::ui::event::BoardEvent;
use crate::ui::input::TextEdit;
use crate::ui::render::{self, HitMap, HitTarget};
use crate::ui::transient::TransitionTimings;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Left-button pointer state between press and release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Pointer {
    #[default]
    Idle,
    /// Pressed on a row; moving turns it into a drag
    Pressed { id: TaskId },
    Dragging { over: Option<Collection> },
}

/// Turns crossterm events into board events using the last frame's hit map
#[derive(Debug, Default)]
pub struct EventTranslator {
    pointer: Pointer,
}

impl EventTranslator {
    pub fn translate(&mut self, event: &Event, hits: &HitMap, modal_open: bool) -> Vec<BoardEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                translate_key(key, modal_open).into_iter().collect()
            }
            Event::Mouse(mouse) => self.translate_mouse(mouse, hits),
            _ => Vec::new(),
        }
    }

    fn translate_mouse(&mut self, mouse: &MouseEvent, hits: &HitMap) -> Vec<BoardEvent> {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.pointer = Pointer::Idle;
                match hits.resolve(col, row) {
                    Some(HitTarget::Row(id)) => {
                        self.pointer = Pointer::Pressed { id };
                        Vec::new()
                    }
                    Some(target) => click(target).into_iter().collect(),
                    None => Vec::new(),
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let under = hits.column_at(col, row);
                match std::mem::take(&mut self.pointer) {
                    Pointer::Pressed { id } => {
                        let mut events = vec![BoardEvent::DragStart(id)];
                        events.extend(under.map(BoardEvent::DragEnter));
                        self.pointer = Pointer::Dragging { over: under };
                        events
                    }
                    Pointer::Dragging { over } => {
                        let mut events = Vec::new();
                        if over == under {
                            events.extend(under.map(BoardEvent::DragOver));
                        } else {
                            events.extend(over.map(BoardEvent::DragLeave));
                            events.extend(under.map(BoardEvent::DragEnter));
                        }
                        self.pointer = Pointer::Dragging { over: under };
                        events
                    }
                    Pointer::Idle => Vec::new(),
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown if hits.modal.is_none() => {
                let delta = if mouse.kind == MouseEventKind::ScrollUp { -1 } else { 1 };
                hits
                    .column_at(col, row)
                    .map(|collection| BoardEvent::Scroll { collection, delta })
                    .into_iter()
                    .collect()
            }
            MouseEventKind::Up(MouseButton::Left) => match std::mem::take(&mut self.pointer) {
                Pointer::Dragging { .. } => {
                    let mut events: Vec<_> = hits
                        .column_at(col, row)
                        .map(BoardEvent::Drop)
                        .into_iter()
                        .collect();
                    events.push(BoardEvent::DragEnd);
                    events
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}

fn click(target: HitTarget) -> Option<BoardEvent> {
    match target {
        HitTarget::Edit(id) => Some(BoardEvent::EditClicked(id)),
        HitTarget::Delete(id) => Some(BoardEvent::DeleteClicked(id)),
        HitTarget::AddPriority | HitTarget::ModalPriority => Some(BoardEvent::CyclePriority),
        HitTarget::AddButton => Some(BoardEvent::SubmitAdd),
        HitTarget::ModalSave => Some(BoardEvent::SaveEdit),
        HitTarget::ModalClose => Some(BoardEvent::CloseEdit),
        HitTarget::Backdrop => Some(BoardEvent::ClickOutsideModal),
        HitTarget::Row(_) | HitTarget::Column(_) | HitTarget::AddInput | HitTarget::ModalBody => {
            None
        }
    }
}

fn translate_key(key: &KeyEvent, modal_open: bool) -> Option<BoardEvent> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(BoardEvent::Quit),
            _ => None,
        };
    }

    let event = match key.code {
        KeyCode::Enter if modal_open => BoardEvent::SaveEdit,
        KeyCode::Enter => BoardEvent::SubmitAdd,
        KeyCode::Esc if modal_open => BoardEvent::CloseEdit,
        KeyCode::Tab | KeyCode::BackTab => BoardEvent::CyclePriority,
        KeyCode::Char(c) => BoardEvent::Text(TextEdit::Insert(c)),
        KeyCode::Backspace => BoardEvent::Text(TextEdit::Backspace),
        KeyCode::Delete => BoardEvent::Text(TextEdit::Delete),
        KeyCode::Left => BoardEvent::Text(TextEdit::Left),
        KeyCode::Right => BoardEvent::Text(TextEdit::Right),
        KeyCode::Home => BoardEvent::Text(TextEdit::Home),
        KeyCode::End => BoardEvent::Text(TextEdit::End),
        _ => return None,
    };
    Some(event)
}

/// Runs the interactive board until the user quits.
pub async fn run(store: TaskStore, timings: TransitionTimings) -> anyhow::Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut controller = Controller::new(store, timings, Instant::now());
    info!("board opened");
    let result = event_loop(&mut terminal, &mut controller).await;

    // Every restore step runs even when an earlier one fails
    let restored = first_error([
        disable_raw_mode(),
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        ),
        terminal.show_cursor(),
    ]);
    if let Err(e) = &restored {
        error!(error = %e, "failed to restore terminal");
    }

    let flushed = if controller.store().is_dirty() {
        controller.store_mut().flush().await
    } else {
        Ok(())
    };
    if let Err(e) = &flushed {
        error!(error = %e, "board still unsaved at exit");
    }

    result?;
    restored.context("failed to restore terminal")?;
    flushed.context("could not save board on exit")
}

/// Keeps the first failure of a sequence of already-run steps
fn first_error(steps: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    steps.into_iter().fold(Ok(()), |first, step| first.and(step))
}

async fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    controller: &mut Controller,
) -> anyhow::Result<()> {
    let mut hits = HitMap::default();
    let mut translator = EventTranslator::default();

    while !controller.should_quit() {
        let now = Instant::now();
        controller.tick(now);
        terminal.draw(|frame| render::draw(frame, controller, now, &mut hits))?;

        if event::poll(POLL_INTERVAL)? {
            let event = event::read()?;
            let modal_open = controller.edit().is_open();
            for board_event in translator.translate(&event, &hits, modal_open) {
                controller.dispatch(board_event, Instant::now()).await;
            }
        }
    }

    debug!("event loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn id(n: i64) -> TaskId {
        TaskId::from_millis(n)
    }

    /// Three 10-wide columns on rows 0..10, one task row in `todo`
    fn hits() -> HitMap {
        HitMap {
            columns: vec![
                (Rect::new(0, 0, 10, 10), Collection::Todo),
                (Rect::new(10, 0, 10, 10), Collection::InProgress),
                (Rect::new(20, 0, 10, 10), Collection::Completed),
            ],
            rows: vec![(Rect::new(1, 1, 8, 1), id(1))],
            edit_buttons: vec![(Rect::new(6, 1, 1, 1), id(1))],
            delete_buttons: vec![(Rect::new(8, 1, 1, 1), id(1))],
            add_button: Some(Rect::new(0, 12, 5, 3)),
            ..HitMap::default()
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    const LEFT: MouseButton = MouseButton::Left;

    #[test]
    fn test_press_drag_release_drops_on_column() {
        let hits = hits();
        let mut t = EventTranslator::default();

        assert!(t
            .translate(&mouse(MouseEventKind::Down(LEFT), 2, 1), &hits, false)
            .is_empty());
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Drag(LEFT), 12, 3), &hits, false),
            vec![
                BoardEvent::DragStart(id(1)),
                BoardEvent::DragEnter(Collection::InProgress)
            ]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Up(LEFT), 12, 3), &hits, false),
            vec![BoardEvent::Drop(Collection::InProgress), BoardEvent::DragEnd]
        );
    }

    #[test]
    fn test_drag_across_columns_leaves_and_enters() {
        let hits = hits();
        let mut t = EventTranslator::default();
        t.translate(&mouse(MouseEventKind::Down(LEFT), 2, 1), &hits, false);
        t.translate(&mouse(MouseEventKind::Drag(LEFT), 3, 2), &hits, false);

        assert_eq!(
            t.translate(&mouse(MouseEventKind::Drag(LEFT), 4, 2), &hits, false),
            vec![BoardEvent::DragOver(Collection::Todo)]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Drag(LEFT), 25, 2), &hits, false),
            vec![
                BoardEvent::DragLeave(Collection::Todo),
                BoardEvent::DragEnter(Collection::Completed)
            ]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Drag(LEFT), 40, 2), &hits, false),
            vec![BoardEvent::DragLeave(Collection::Completed)]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Up(LEFT), 40, 2), &hits, false),
            vec![BoardEvent::DragEnd]
        );
    }

    #[test]
    fn test_plain_click_on_row_does_nothing() {
        let hits = hits();
        let mut t = EventTranslator::default();
        t.translate(&mouse(MouseEventKind::Down(LEFT), 2, 1), &hits, false);

        assert!(t
            .translate(&mouse(MouseEventKind::Up(LEFT), 2, 1), &hits, false)
            .is_empty());
        assert!(t
            .translate(&mouse(MouseEventKind::Drag(LEFT), 3, 1), &hits, false)
            .is_empty());
    }

    #[test]
    fn test_clicks_on_controls() {
        let hits = hits();
        let mut t = EventTranslator::default();

        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 6, 1), &hits, false),
            vec![BoardEvent::EditClicked(id(1))]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 8, 1), &hits, false),
            vec![BoardEvent::DeleteClicked(id(1))]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 1, 13), &hits, false),
            vec![BoardEvent::SubmitAdd]
        );
    }

    #[test]
    fn test_modal_clicks() {
        let mut hits = hits();
        hits.modal = Some(Rect::new(5, 2, 20, 6));
        hits.modal_save = Some(Rect::new(6, 5, 8, 2));
        hits.modal_close = Some(Rect::new(15, 5, 8, 2));
        let mut t = EventTranslator::default();

        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 7, 6), &hits, true),
            vec![BoardEvent::SaveEdit]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 16, 6), &hits, true),
            vec![BoardEvent::CloseEdit]
        );
        assert!(t
            .translate(&mouse(MouseEventKind::Down(LEFT), 10, 3), &hits, true)
            .is_empty());
        assert_eq!(
            t.translate(&mouse(MouseEventKind::Down(LEFT), 2, 1), &hits, true),
            vec![BoardEvent::ClickOutsideModal]
        );
    }

    #[test]
    fn test_wheel_scrolls_the_column_under_the_pointer() {
        let mut hits = hits();
        let mut t = EventTranslator::default();

        assert_eq!(
            t.translate(&mouse(MouseEventKind::ScrollDown, 12, 4), &hits, false),
            vec![BoardEvent::Scroll {
                collection: Collection::InProgress,
                delta: 1
            }]
        );
        assert_eq!(
            t.translate(&mouse(MouseEventKind::ScrollUp, 2, 4), &hits, false),
            vec![BoardEvent::Scroll {
                collection: Collection::Todo,
                delta: -1
            }]
        );
        assert!(t
            .translate(&mouse(MouseEventKind::ScrollDown, 40, 4), &hits, false)
            .is_empty());

        hits.modal = Some(Rect::new(0, 0, 30, 10));
        assert!(t
            .translate(&mouse(MouseEventKind::ScrollDown, 12, 4), &hits, true)
            .is_empty());
    }

    #[test]
    fn test_first_error_keeps_earliest_failure() {
        let err = |msg: &str| io::Error::new(io::ErrorKind::Other, msg.to_string());

        assert!(first_error([Ok(()), Ok(())]).is_ok());
        let failed = first_error([Ok(()), Err(err("raw mode")), Err(err("screen"))]);
        assert_eq!(failed.unwrap_err().to_string(), "raw mode");
    }

    #[test]
    fn test_keys() {
        let hits = HitMap::default();
        let mut t = EventTranslator::default();
        let none = KeyModifiers::NONE;

        assert_eq!(
            t.translate(&key(KeyCode::Enter, none), &hits, false),
            vec![BoardEvent::SubmitAdd]
        );
        assert_eq!(
            t.translate(&key(KeyCode::Enter, none), &hits, true),
            vec![BoardEvent::SaveEdit]
        );
        assert_eq!(
            t.translate(&key(KeyCode::Esc, none), &hits, true),
            vec![BoardEvent::CloseEdit]
        );
        assert!(t.translate(&key(KeyCode::Esc, none), &hits, false).is_empty());
        assert_eq!(
            t.translate(&key(KeyCode::Tab, none), &hits, false),
            vec![BoardEvent::CyclePriority]
        );
        assert_eq!(
            t.translate(&key(KeyCode::Char('q'), KeyModifiers::SHIFT), &hits, false),
            vec![BoardEvent::Text(TextEdit::Insert('q'))]
        );
        assert_eq!(
            t.translate(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), &hits, false),
            vec![BoardEvent::Quit]
        );
        assert_eq!(
            t.translate(&key(KeyCode::Char('c'), KeyModifiers::CONTROL), &hits, true),
            vec![BoardEvent::Quit]
        );
    }
}
