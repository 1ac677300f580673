//! Frame drawing.
//!
//! Draws the board from the controller's view state and records the
//! clickable areas of this frame into a [`HitMap`].

use std::time::Instant;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::domain::{Collection, Priority, TaskId};
use crate::ui::controller::Controller;
use crate::ui::input::InputField;
use crate::ui::transient::{InvalidCue, ToastPhase};
use crate::ui::view::{RowPhase, RowView};

const AMBER: Color = Color::Rgb(255, 176, 0);
const ACCENT: Color = Color::Cyan;
const INVALID: Color = Color::Red;
const MUTED: Color = Color::DarkGray;

const EDIT_GLYPH: &str = "✎";
const DELETE_GLYPH: &str = "✕";
const MARKER: &str = "●";

/// Where a mouse position lands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Column(Collection),
    Row(TaskId),
    Edit(TaskId),
    Delete(TaskId),
    AddInput,
    AddPriority,
    AddButton,
    ModalPriority,
    ModalSave,
    ModalClose,
    ModalBody,
    Backdrop,
}

/// Clickable areas cached on every draw
#[derive(Debug, Default, Clone)]
pub struct HitMap {
    pub columns: Vec<(Rect, Collection)>,
    pub rows: Vec<(Rect, TaskId)>,
    pub edit_buttons: Vec<(Rect, TaskId)>,
    pub delete_buttons: Vec<(Rect, TaskId)>,
    pub add_input: Option<Rect>,
    pub add_priority: Option<Rect>,
    pub add_button: Option<Rect>,
    pub modal: Option<Rect>,
    pub modal_priority: Option<Rect>,
    pub modal_save: Option<Rect>,
    pub modal_close: Option<Rect>,
}

impl HitMap {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The column region under the position, ignoring the modal
    pub fn column_at(&self, col: u16, row: u16) -> Option<Collection> {
        self.columns
            .iter()
            .find(|(rect, _)| contains(rect, col, row))
            .map(|(_, collection)| *collection)
    }

    pub fn row_at(&self, col: u16, row: u16) -> Option<&TaskId> {
        find(&self.rows, col, row)
    }

    /// Resolves a click. While the modal is open nothing behind it is reachable.
    pub fn resolve(&self, col: u16, row: u16) -> Option<HitTarget> {
        let hit = |rect: &Option<Rect>| rect.is_some_and(|r| contains(&r, col, row));

        if let Some(modal) = self.modal {
            let target = if hit(&self.modal_save) {
                HitTarget::ModalSave
            } else if hit(&self.modal_close) {
                HitTarget::ModalClose
            } else if hit(&self.modal_priority) {
                HitTarget::ModalPriority
            } else if contains(&modal, col, row) {
                HitTarget::ModalBody
            } else {
                HitTarget::Backdrop
            };
            return Some(target);
        }

        if let Some(id) = find(&self.edit_buttons, col, row) {
            return Some(HitTarget::Edit(id.clone()));
        }
        if let Some(id) = find(&self.delete_buttons, col, row) {
            return Some(HitTarget::Delete(id.clone()));
        }
        if let Some(id) = self.row_at(col, row) {
            return Some(HitTarget::Row(id.clone()));
        }
        if hit(&self.add_input) {
            return Some(HitTarget::AddInput);
        }
        if hit(&self.add_priority) {
            return Some(HitTarget::AddPriority);
        }
        if hit(&self.add_button) {
            return Some(HitTarget::AddButton);
        }
        self.column_at(col, row).map(HitTarget::Column)
    }
}

fn find<T>(areas: &[(Rect, T)], col: u16, row: u16) -> Option<&T> {
    areas
        .iter()
        .find(|(rect, _)| contains(rect, col, row))
        .map(|(_, value)| value)
}

/// Checks whether (col, row) lies inside the rect
pub fn contains(rect: &Rect, col: u16, row: u16) -> bool {
    col >= rect.x
        && col < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// A `width` x `height` rect centred in `area`, clipped to it
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::Low => Style::default().fg(Color::Green),
        Priority::Medium => Style::default().fg(AMBER),
        Priority::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

pub fn draw(frame: &mut Frame, controller: &Controller, now: Instant, hits: &mut HitMap) {
    hits.reset();
    let area = frame.area();

    let [header_area, form_area, board_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    draw_header(frame, header_area, controller);
    draw_form(frame, form_area, controller, now, hits);
    draw_columns(frame, board_area, controller, now, hits);
    draw_footer(frame, footer_area, controller);

    if let Some(toast) = controller.toast() {
        draw_toast(frame, &toast.message, toast.phase(now));
    }
    if controller.edit().is_open() {
        draw_modal(frame, controller, now, hits);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, controller: &Controller) {
    let total = controller.view().badges().total();
    let line = Line::from(vec![
        Span::styled(
            " Task Board ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("{total} tasks"), Style::default().fg(MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, controller: &Controller) {
    let hint = if controller.edit().is_open() {
        " Enter save · Tab priority · Esc close"
    } else {
        " Enter add · Tab priority · drag rows between columns · Ctrl-Q quit"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(MUTED))),
        area,
    );
}

fn draw_form(
    frame: &mut Frame,
    area: Rect,
    controller: &Controller,
    now: Instant,
    hits: &mut HitMap,
) {
    let form = controller.form();
    let [input_area, priority_area, button_area] = Layout::horizontal([
        Constraint::Min(12),
        Constraint::Length(16),
        Constraint::Length(9),
    ])
    .areas(area);

    let focused = !controller.edit().is_open();
    draw_text_field(
        frame,
        input_area,
        " New task ",
        &form.text,
        form.cue.as_ref(),
        now,
        focused,
    );
    draw_priority_selector(frame, priority_area, form.priority);
    draw_button(frame, button_area, "Add", ACCENT);

    hits.add_input = Some(input_area);
    hits.add_priority = Some(priority_area);
    hits.add_button = Some(button_area);
}

fn draw_text_field(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    field: &InputField,
    cue: Option<&InvalidCue>,
    now: Instant,
    focused: bool,
) {
    let flagged = cue.is_some_and(|c| c.is_flagged(now));
    let offset = cue.map_or(0, |c| c.offset(now));
    let area = shift(area, offset, frame.area());

    let border = if flagged {
        INVALID
    } else if focused {
        ACCENT
    } else {
        MUTED
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.width == 0 || inner.height == 0 {
        return;
    }

    // Keep the cursor in view by scrolling the text left
    let width = usize::from(inner.width);
    let skip = field.cursor.saturating_sub(width.saturating_sub(1));
    let visible: String = field.value.chars().skip(skip).take(width).collect();
    frame.render_widget(Paragraph::new(visible), inner);

    if focused {
        let x = inner.x + u16::try_from(field.cursor - skip).unwrap_or(inner.width - 1);
        frame.set_cursor_position(Position::new(x.min(inner.right() - 1), inner.y));
    }
}

fn shift(area: Rect, offset: i16, bounds: Rect) -> Rect {
    let x = i32::from(area.x) + i32::from(offset);
    let max_x = i32::from(bounds.right().saturating_sub(area.width));
    let x = x.clamp(i32::from(bounds.x), max_x.max(i32::from(bounds.x)));
    Rect {
        x: u16::try_from(x).unwrap_or(area.x),
        ..area
    }
}

fn draw_priority_selector(frame: &mut Frame, area: Rect, priority: Priority) {
    let line = Line::from(vec![
        Span::styled("◀ ", Style::default().fg(MUTED)),
        Span::styled(priority.to_string(), priority_style(priority)),
        Span::styled(" ▶", Style::default().fg(MUTED)),
    ]);
    let widget = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .title(" Priority ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(MUTED)),
    );
    frame.render_widget(widget, area);
}

fn draw_button(frame: &mut Frame, area: Rect, label: &str, color: Color) {
    let widget = Paragraph::new(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    frame.render_widget(widget, area);
}

fn draw_columns(
    frame: &mut Frame,
    area: Rect,
    controller: &Controller,
    now: Instant,
    hits: &mut HitMap,
) {
    let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let badges = controller.view().badges();

    for (collection, column_area) in Collection::ALL.into_iter().zip(areas.iter().copied()) {
        let height = column_area.height.saturating_sub(2);
        let window = controller
            .view()
            .visible_window(collection, usize::from(height));
        let total = controller.view().rows(collection).len();

        let highlighted = controller.highlight() == Some(collection);
        let mut block = Block::default()
            .title(format!(" {} ({}) ", collection.title(), badges.get(collection)))
            .borders(Borders::ALL);
        if let Some(hint) = scroll_hint(window.start, total - window.end) {
            block = block.title_bottom(Line::styled(hint, Style::default().fg(MUTED)));
        }
        let block = if highlighted {
            block
                .border_type(BorderType::Thick)
                .border_style(Style::default().fg(ACCENT))
        } else {
            block.border_style(Style::default().fg(MUTED))
        };
        let inner = block.inner(column_area);
        frame.render_widget(block, column_area);
        hits.columns.push((column_area, collection));

        let rows = &controller.view().rows(collection)[window];
        for (line, row) in (inner.y..inner.bottom()).zip(rows) {
            let line_area = Rect::new(inner.x, line, inner.width, 1);
            draw_row(frame, line_area, row, controller, now, hits);
        }
    }
}

/// Bottom-border note on rows scrolled out of view
fn scroll_hint(above: usize, below: usize) -> Option<String> {
    match (above, below) {
        (0, 0) => None,
        (0, below) => Some(format!(" ↓ {below} more ")),
        (above, 0) => Some(format!(" ↑ {above} more ")),
        (above, below) => Some(format!(" ↑ {above} · ↓ {below} ")),
    }
}

fn draw_row(
    frame: &mut Frame,
    area: Rect,
    row: &RowView,
    controller: &Controller,
    now: Instant,
    hits: &mut HitMap,
) {
    // marker and space before the text, then " ✎ ✕"
    const CHROME: u16 = 6;
    if area.width <= CHROME {
        return;
    }

    let mut text_style = Style::default();
    let mut indent = 0u16;
    match row.phase {
        RowPhase::Inserting { .. } => text_style = text_style.add_modifier(Modifier::ITALIC),
        RowPhase::Removing { .. } => {
            let progress = row.removal_progress(now, controller.view().timings().row_remove);
            // Up to four columns of slide
            indent = (progress * 4.0) as u16;
            text_style = text_style.add_modifier(Modifier::DIM);
        }
        RowPhase::Settled => {}
    }
    if row.dragging {
        text_style = text_style.fg(MUTED).add_modifier(Modifier::DIM);
    }

    let area = Rect {
        x: area.x + indent.min(area.width - CHROME),
        width: area.width - indent.min(area.width - CHROME),
        ..area
    };
    let text_width = usize::from(area.width - CHROME);
    let text: String = row.text.chars().take(text_width).collect();
    let padding = text_width - text.chars().count();

    let line = Line::from(vec![
        Span::styled(MARKER, priority_style(row.priority)),
        Span::raw(" "),
        Span::styled(text, text_style),
        Span::raw(" ".repeat(padding + 1)),
        Span::styled(EDIT_GLYPH, Style::default().fg(ACCENT)),
        Span::raw(" "),
        Span::styled(DELETE_GLYPH, Style::default().fg(INVALID)),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if !row.is_removing() {
        let right = area.right();
        hits.rows.push((area, row.id.clone()));
        hits.edit_buttons
            .push((Rect::new(right - 3, area.y, 1, 1), row.id.clone()));
        hits.delete_buttons
            .push((Rect::new(right - 1, area.y, 1, 1), row.id.clone()));
    }
}

fn draw_toast(frame: &mut Frame, message: &str, phase: ToastPhase) {
    if phase == ToastPhase::Expired {
        return;
    }
    let area = frame.area();
    if area.height < 6 || area.width < 8 {
        return;
    }

    let width = u16::try_from(message.chars().count() + 6)
        .unwrap_or(u16::MAX)
        .min(area.width - 4);
    let rect = Rect::new(
        area.x + (area.width - width) / 2,
        area.bottom() - 4,
        width,
        3,
    );

    let mut style = Style::default().add_modifier(Modifier::BOLD);
    if phase != ToastPhase::Shown {
        style = style.add_modifier(Modifier::DIM);
    }

    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(message)
            .style(style)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Green)),
            ),
        rect,
    );
}

fn draw_modal(frame: &mut Frame, controller: &Controller, now: Instant, hits: &mut HitMap) {
    let area = frame.area();
    frame
        .buffer_mut()
        .set_style(area, Style::default().fg(MUTED).add_modifier(Modifier::DIM));

    let modal = centered_rect(area, 50, 11);
    frame.render_widget(Clear, modal);
    let block = Block::default()
        .title(" Edit Task ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(modal);
    frame.render_widget(block, modal);
    hits.modal = Some(modal);

    let [text_area, priority_area, buttons_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(inner);

    let edit = controller.edit();
    draw_text_field(
        frame,
        text_area,
        " Text ",
        &edit.text,
        controller.edit_cue(),
        now,
        true,
    );
    draw_priority_selector(frame, priority_area, edit.priority);
    hits.modal_priority = Some(priority_area);

    let [save_area, close_area] =
        Layout::horizontal([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
            .areas(buttons_area);
    draw_button(frame, save_area, "Save", ACCENT);
    draw_button(frame, close_area, "Close", MUTED);
    hits.modal_save = Some(save_area);
    hits.modal_close = Some(close_area);
}
