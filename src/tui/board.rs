//! Kanban board rendering and cursor handling.
//!
//! A board shows one column per key. While a card is grabbed every column
//! gets a trailing "drop here" slot; dropping there, or into an empty
//! column, appends to that column.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::board::{Board, DropTarget};
use crate::format::{format_due_relative, truncate};
use crate::task::{Task, TaskId};
use crate::tui::colors::{severity_color, text_on, GRAB_BLUE};
use crate::tui::enums::CardFilter;

const CARD_HEIGHT: u16 = 5;
const SLOT_HEIGHT: u16 = 3;

/// The cards one column shows under the current filter.
pub struct ColumnView<'a> {
    pub key: String,
    pub cards: Vec<&'a Task>,
}

pub fn visible_columns<'a>(board: &'a Board, keys: &[String], filter: CardFilter) -> Vec<ColumnView<'a>> {
    keys.iter()
        .map(|key| {
            let mut cards: Vec<&Task> = board.column(key).iter().filter(|t| filter.shows(t)).collect();
            if filter == CardFilter::OpenFirst {
                cards.sort_by_key(|t| t.completed);
            }
            ColumnView { key: key.clone(), cards }
        })
        .collect()
}

/// Drop target under the cursor: a card slot, or the column end when the
/// cursor sits past the last card.
pub fn drop_target(columns: &[ColumnView], column: usize, card: usize) -> Option<DropTarget> {
    let view = columns.get(column)?;
    Some(match view.cards.get(card) {
        Some(task) => DropTarget::TaskSlot(task.id.clone()),
        None => DropTarget::ContainerEnd(view.key.clone()),
    })
}

/// Cursor position on a board plus per-column scroll offsets.
#[derive(Debug, Default, Clone)]
pub struct BoardCursor {
    pub column: usize,
    pub card: usize,
    scroll: Vec<usize>,
}

impl BoardCursor {
    /// Keep the cursor inside `slots`, the selectable slot count per column.
    pub fn clamp(&mut self, slots: &[usize]) {
        if slots.is_empty() {
            self.column = 0;
            self.card = 0;
            return;
        }
        self.column = self.column.min(slots.len() - 1);
        self.card = self.card.min(slots[self.column].saturating_sub(1));
        self.scroll.resize(slots.len(), 0);
    }

    pub fn left(&mut self, slots: &[usize]) {
        self.column = self.column.saturating_sub(1);
        self.clamp(slots);
    }

    pub fn right(&mut self, slots: &[usize]) {
        self.column += 1;
        self.clamp(slots);
    }

    pub fn up(&mut self) {
        self.card = self.card.saturating_sub(1);
    }

    pub fn down(&mut self, slots: &[usize]) {
        self.card += 1;
        self.clamp(slots);
    }

    /// Put the cursor on the card with `id`, if shown.
    pub fn focus(&mut self, columns: &[ColumnView], id: &TaskId) {
        for (c, view) in columns.iter().enumerate() {
            if let Some(i) = view.cards.iter().position(|t| &t.id == id) {
                self.column = c;
                self.card = i;
            }
        }
    }

    pub fn selected<'a>(&self, columns: &[ColumnView<'a>]) -> Option<&'a Task> {
        columns.get(self.column)?.cards.get(self.card).copied()
    }

    /// First visible card index for `column`, adjusted so the cursor card fits.
    fn scroll_for(&mut self, column: usize, visible: usize) -> usize {
        if self.scroll.len() <= column {
            self.scroll.resize(column + 1, 0);
        }
        if column == self.column && visible > 0 {
            let start = self.scroll[column];
            if self.card < start {
                self.scroll[column] = self.card;
            } else if self.card >= start + visible {
                self.scroll[column] = self.card + 1 - visible;
            }
        }
        self.scroll[column]
    }
}

/// What the board renderer needs to know besides the cards.
pub struct BoardRender<'a> {
    pub title: &'a str,
    pub grabbed: Option<&'a TaskId>,
}

pub fn render_board(f: &mut Frame, area: Rect, columns: &[ColumnView], cursor: &mut BoardCursor, opts: &BoardRender) {
    let outer = Block::default().borders(Borders::ALL).title(opts.title);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    if columns.is_empty() {
        f.render_widget(Paragraph::new("No columns configured."), inner);
        return;
    }

    let constraints: Vec<Constraint> = columns
        .iter()
        .map(|_| Constraint::Ratio(1, columns.len() as u32))
        .collect();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for (i, view) in columns.iter().enumerate() {
        render_column(f, areas[i], i, view, cursor, opts);
    }
}

fn render_column(f: &mut Frame, area: Rect, index: usize, view: &ColumnView, cursor: &mut BoardCursor, opts: &BoardRender) {
    let is_selected = index == cursor.column;
    let open = view.cards.iter().filter(|t| !t.completed).count();

    let border_style = if is_selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ({open})", view.key))
        .border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let grabbing = opts.grabbed.is_some();
    let visible = (inner.height / CARD_HEIGHT).max(1) as usize;
    let offset = cursor.scroll_for(index, visible);
    let today = Local::now().date_naive();

    let mut y = inner.y;
    let bottom = inner.y + inner.height;
    let mut rendered = 0;
    for (card_index, task) in view.cards.iter().enumerate().skip(offset) {
        if y + CARD_HEIGHT > bottom {
            break;
        }
        let card_area = Rect::new(inner.x, y, inner.width, CARD_HEIGHT);
        let selected = is_selected && card_index == cursor.card;
        let grabbed = opts.grabbed == Some(&task.id);
        render_card(f, card_area, task, selected, grabbed, today);
        y += CARD_HEIGHT;
        rendered += 1;
    }

    if grabbing && y + SLOT_HEIGHT <= bottom && offset + rendered == view.cards.len() {
        let slot_selected = is_selected && cursor.card == view.cards.len();
        let style = if slot_selected {
            Style::default().fg(GRAB_BLUE).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let slot = Paragraph::new("drop here")
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Double))
            .style(style);
        f.render_widget(slot, Rect::new(inner.x, y, inner.width, SLOT_HEIGHT));
    } else if view.cards.is_empty() {
        f.render_widget(
            Paragraph::new("(empty)").style(Style::default().fg(Color::DarkGray)),
            Rect::new(inner.x, inner.y, inner.width, 1.min(inner.height)),
        );
    }

    if offset > 0 {
        let indicator = Paragraph::new(format!("▲ +{offset} above")).style(Style::default().fg(Color::Cyan));
        f.render_widget(indicator, Rect::new(inner.x, inner.y, inner.width, 1));
    }
    let remaining = view.cards.len().saturating_sub(offset + rendered);
    if remaining > 0 && inner.height > 0 {
        let indicator = Paragraph::new(format!("▼ +{remaining} below")).style(Style::default().fg(Color::Cyan));
        f.render_widget(indicator, Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1));
    }
}

fn render_card(f: &mut Frame, area: Rect, task: &Task, selected: bool, grabbed: bool, today: chrono::NaiveDate) {
    let color = severity_color(task.severity);
    let mut style = if grabbed {
        Style::default().bg(GRAB_BLUE).fg(Color::White).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().bg(color).fg(text_on(color)).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    if task.completed {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }

    let width = area.width.saturating_sub(2) as usize;
    let mark = if task.completed { "[x]" } else { "[ ]" };
    let who = if task.assignee.is_empty() { "-" } else { task.assignee.as_str() };
    let lines = vec![
        Line::from(truncate(&format!("{mark} {}", task.id), width)),
        Line::from(task.description.clone()),
        Line::from(truncate(&format!("{who} | {}", format_due_relative(task.due, today)), width)),
    ];
    let card = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .style(style)
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}
