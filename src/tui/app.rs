//! Main application logic for the terminal user interface.
//!
//! `App` owns the tracker session, routes key presses to the current tab or
//! popup, and renders tabs, the overall table, the boards and the detail
//! editor. Every change goes through the tracker, which writes the affected
//! collection back to the store.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use log::debug;
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};

use crate::board::DropTarget;
use crate::config::Config;
use crate::fields::{BoardKind, Severity, Source, ViewTab};
use crate::format::{format_due_relative, truncate};
use crate::list::Upsert;
use crate::session::Tracker;
use crate::store::BlobStore;
use crate::task::Task;
use crate::tui::{
    board::{drop_target, render_board, visible_columns, BoardCursor, BoardRender},
    colors::{severity_color, BAR_NAVY, CRITICAL_RED, GRAB_BLUE, MODERATE_AMBER},
    enums::{AppState, BoardMode, CardFilter, Grab, PendingDelete},
    task_form::{
        AddForm, DetailForm, FormTarget, DETAIL_SEVERITY_FIELD, DUE_FIELD, NOTES_FIELD, SEVERITY_FIELD,
        STATUS_FIELD, WHAT_FIELD, WHEN_FIELD, WHO_FIELD,
    },
    utils::centered_rect,
};

const HELP: &str = "1/2/3 or Tab: views | arrows: move | Space: grab/drop | a: add | c: toggle | x: delete | Enter: detail | t: done/active | q: quit";

pub struct App<S: BlobStore> {
    tracker: Tracker<S>,
    config: Config,
    state: AppState,
    list_state: TableState,
    group_cursor: BoardCursor,
    member_cursor: BoardCursor,
    group_mode: BoardMode,
    grab: Option<Grab>,
    add_form: Option<AddForm>,
    detail_form: Option<DetailForm>,
    confirm: Option<PendingDelete>,
    status_message: String,
}

impl<S: BlobStore> App<S> {
    pub fn new(tracker: Tracker<S>, config: Config) -> Self {
        let mut app = App {
            tracker,
            config,
            state: AppState::Browse,
            list_state: TableState::default(),
            group_cursor: BoardCursor::default(),
            member_cursor: BoardCursor::default(),
            group_mode: BoardMode::Active,
            grab: None,
            add_form: None,
            detail_form: None,
            confirm: None,
            status_message: String::new(),
        };
        app.sync_cursors();
        app
    }

    pub fn tracker(&self) -> &Tracker<S> {
        &self.tracker
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    fn active_tab(&self) -> ViewTab {
        self.tracker.state().active_tab()
    }

    fn overall_rows(&self) -> Vec<&Task> {
        self.tracker.state().overall.display_order()
    }

    fn card_filter(&self, kind: BoardKind) -> CardFilter {
        match kind {
            BoardKind::Groups => self.group_mode.into(),
            BoardKind::Members => CardFilter::OpenFirst,
        }
    }

    fn board_keys(&self, kind: BoardKind) -> Vec<String> {
        self.tracker.state().board(kind).display_keys(self.config.columns(kind))
    }

    /// Selectable slots per column: the shown cards, plus the drop slot while grabbing.
    fn slots(&self, kind: BoardKind) -> Vec<usize> {
        let keys = self.board_keys(kind);
        let extra = usize::from(self.grab.is_some());
        visible_columns(self.tracker.state().board(kind), &keys, self.card_filter(kind))
            .iter()
            .map(|c| c.cards.len() + extra)
            .collect()
    }

    fn cursor_mut(&mut self, kind: BoardKind) -> &mut BoardCursor {
        match kind {
            BoardKind::Groups => &mut self.group_cursor,
            BoardKind::Members => &mut self.member_cursor,
        }
    }

    /// Keep every cursor on an existing row or card after a change.
    fn sync_cursors(&mut self) {
        let rows = self.tracker.state().overall.len();
        if rows == 0 {
            self.list_state.select(None);
        } else {
            let selected = self.list_state.selected().unwrap_or(0).min(rows - 1);
            self.list_state.select(Some(selected));
        }
        for kind in [BoardKind::Groups, BoardKind::Members] {
            let slots = self.slots(kind);
            self.cursor_mut(kind).clamp(&slots);
        }
    }

    /// Task under the cursor on the current tab and where it lives.
    fn selected_task(&self) -> Option<(Task, Source)> {
        match self.active_tab() {
            ViewTab::Overall => {
                let index = self.list_state.selected()?;
                let task = self.overall_rows().get(index).map(|t| (*t).clone())?;
                Some((task, Source::Overall))
            }
            ViewTab::Groups | ViewTab::Members => {
                let kind = self.active_tab().board_kind()?;
                let keys = self.board_keys(kind);
                let columns = visible_columns(self.tracker.state().board(kind), &keys, self.card_filter(kind));
                let cursor = match kind {
                    BoardKind::Groups => &self.group_cursor,
                    BoardKind::Members => &self.member_cursor,
                };
                let task = cursor.selected(&columns)?;
                Some((task.clone(), kind.source(&columns[cursor.column].key)))
            }
            ViewTab::Detail => None,
        }
    }

    fn switch_tab(&mut self, tab: ViewTab) {
        if self.grab.take().is_some() {
            self.set_status_message("Move cancelled");
        }
        self.tracker.set_active_tab(tab);
    }

    fn move_cursor(&mut self, code: KeyCode) {
        match self.active_tab() {
            ViewTab::Overall => {
                let rows = self.tracker.state().overall.len();
                if rows == 0 {
                    return;
                }
                let current = self.list_state.selected().unwrap_or(0);
                let next = match code {
                    KeyCode::Up => current.saturating_sub(1),
                    KeyCode::Down => (current + 1).min(rows - 1),
                    _ => current,
                };
                self.list_state.select(Some(next));
            }
            tab => {
                let Some(kind) = tab.board_kind() else {
                    return;
                };
                let slots = self.slots(kind);
                let cursor = self.cursor_mut(kind);
                match code {
                    KeyCode::Left => cursor.left(&slots),
                    KeyCode::Right => cursor.right(&slots),
                    KeyCode::Up => cursor.up(),
                    KeyCode::Down => cursor.down(&slots),
                    _ => {}
                }
            }
        }
    }

    /// Space: pick up the card under the cursor, or drop the one held.
    fn grab_or_drop(&mut self) {
        let Some(grab) = self.grab.clone() else {
            let Some((task, source)) = self.selected_task() else {
                self.set_status_message("Nothing to move");
                return;
            };
            if source == Source::Overall && task.completed {
                self.set_status_message("Completed issues cannot be moved");
                return;
            }
            self.set_status_message(format!("Moving {}: arrows to choose, Space to drop, Esc to cancel", task.id));
            self.grab = Some(Grab { id: task.id, source });
            self.sync_cursors();
            return;
        };

        match self.active_tab().board_kind() {
            None => self.drop_in_overall(grab),
            Some(kind) => self.drop_on_board(kind, grab),
        }
    }

    fn drop_in_overall(&mut self, grab: Grab) {
        let Some((over, _)) = self.selected_task() else {
            return;
        };
        if over.completed {
            self.set_status_message("Drop onto an open issue");
            return;
        }
        self.grab = None;
        if over.id == grab.id {
            self.set_status_message("No change");
            return;
        }
        let target = DropTarget::TaskSlot(over.id);
        if self.tracker.reorder_overall(&grab.id, &target) {
            let index = self.overall_rows().iter().position(|t| t.id == grab.id);
            self.list_state.select(index);
            self.set_status_message(format!("Moved {}", grab.id));
        } else {
            self.set_status_message("No change");
        }
    }

    fn drop_on_board(&mut self, kind: BoardKind, grab: Grab) {
        let keys = self.board_keys(kind);
        let target = {
            let columns = visible_columns(self.tracker.state().board(kind), &keys, self.card_filter(kind));
            let cursor = match kind {
                BoardKind::Groups => &self.group_cursor,
                BoardKind::Members => &self.member_cursor,
            };
            drop_target(&columns, cursor.column, cursor.card)
        };
        self.grab = None;
        let Some(target) = target else {
            self.set_status_message("No change");
            return;
        };
        if target == DropTarget::TaskSlot(grab.id.clone()) {
            self.set_status_message("No change");
            self.sync_cursors();
            return;
        }

        let known = self.config.columns(kind).to_vec();
        if self.tracker.move_on_board(kind, &grab.id, &target, &known) {
            let key = self
                .tracker
                .state()
                .board(kind)
                .locate(&grab.id)
                .map(|(key, _)| key)
                .unwrap_or_default();
            debug!("event=card_dropped id={} column={key}", grab.id);
            self.set_status_message(format!("Moved {} to {key}", grab.id));
            self.sync_cursors();
            let columns = visible_columns(self.tracker.state().board(kind), &keys, self.card_filter(kind));
            match kind {
                BoardKind::Groups => self.group_cursor.focus(&columns, &grab.id),
                BoardKind::Members => self.member_cursor.focus(&columns, &grab.id),
            }
        } else {
            self.set_status_message("No change");
        }
    }

    fn toggle_selected(&mut self) {
        let Some((task, source)) = self.selected_task() else {
            return;
        };
        let changed = match &source {
            Source::Overall => self.tracker.toggle_overall(&task.id),
            Source::Group(key) => self.tracker.toggle_on_board(BoardKind::Groups, key, &task.id),
            Source::Member(key) => self.tracker.toggle_on_board(BoardKind::Members, key, &task.id),
        };
        if changed {
            let state = if task.completed { "reopened" } else { "completed" };
            self.set_status_message(format!("{} {state}", task.id));
        }
    }

    fn ask_delete(&mut self) {
        let Some((task, source)) = self.selected_task() else {
            return;
        };
        self.confirm = Some(PendingDelete {
            label: format!("delete '{}'", truncate(&task.description, 40)),
            id: task.id,
            source,
        });
        self.state = AppState::Confirm;
    }

    fn delete_confirmed(&mut self, pending: PendingDelete) {
        let changed = match &pending.source {
            Source::Overall => self.tracker.delete_overall(&pending.id),
            Source::Group(key) => self.tracker.delete_from_board(BoardKind::Groups, key, &pending.id),
            Source::Member(key) => self.tracker.delete_from_board(BoardKind::Members, key, &pending.id),
        };
        if changed {
            self.set_status_message(format!("Deleted {}", pending.id));
        }
    }

    fn open_add_form(&mut self) {
        let target = match self.active_tab().board_kind() {
            None => FormTarget::Overall,
            Some(kind) => {
                let keys = self.board_keys(kind);
                let column = self.cursor_mut(kind).column;
                let Some(key) = keys.get(column) else {
                    self.set_status_message("No column to add to");
                    return;
                };
                FormTarget::Board(kind, key.clone())
            }
        };
        self.grab = None;
        self.add_form = Some(AddForm::new(target));
        self.state = AppState::AddTask;
    }

    fn submit_add_form(&mut self) {
        let Some(form) = self.add_form.as_ref() else {
            return;
        };
        let task = match form.build() {
            Ok(task) => task,
            Err(e) => {
                self.status_message = e.to_string();
                return;
            }
        };
        let id = task.id.clone();
        match form.target.clone() {
            FormTarget::Overall => self.tracker.add_overall(task),
            FormTarget::Board(kind, key) => self.tracker.add_to_board(kind, &key, task),
        }
        self.add_form = None;
        self.state = AppState::Browse;
        self.set_status_message(format!("Added {id}"));
    }

    fn open_detail(&mut self) {
        let Some((task, source)) = self.selected_task() else {
            return;
        };
        self.grab = None;
        self.detail_form = Some(DetailForm::from_task(&task));
        self.tracker.select(task, source);
    }

    fn close_detail(&mut self) {
        self.detail_form = None;
        self.tracker.close_detail();
    }

    /// Ctrl+S saves the form; Ctrl+D saves it marked complete.
    fn save_detail(&mut self, mark_complete: bool) {
        let Some(selection) = self.tracker.state().selection() else {
            self.set_status_message("Nothing selected");
            return;
        };
        let key = selection.source.key().unwrap_or_default().to_string();
        let Some(form) = self.detail_form.as_ref() else {
            return;
        };
        let current_field = form.current_field;
        let edited = match form.apply(&selection.task) {
            Ok(task) if mark_complete => task.marked_complete(),
            Ok(task) => task,
            Err(e) => {
                self.status_message = e.to_string();
                return;
            }
        };

        let message = match self.tracker.save_detail(edited) {
            Some(Upsert::Updated) if mark_complete => "Marked complete".to_string(),
            Some(Upsert::Updated) => "Saved".to_string(),
            Some(Upsert::Inserted) => format!("Saved (re-added to {})", if key.is_empty() { "list" } else { key.as_str() }),
            None => "Nothing selected".to_string(),
        };
        if let Some(selection) = self.tracker.state().selection() {
            let mut form = DetailForm::from_task(&selection.task);
            while form.current_field != current_field {
                form.next_field();
            }
            self.detail_form = Some(form);
        }
        self.set_status_message(message);
    }

    fn handle_browse_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('1') => self.switch_tab(ViewTab::Overall),
            KeyCode::Char('2') => self.switch_tab(ViewTab::Groups),
            KeyCode::Char('3') => self.switch_tab(ViewTab::Members),
            KeyCode::Tab => {
                let tabs = ViewTab::BROWSABLE;
                let index = tabs.iter().position(|t| *t == self.active_tab()).unwrap_or(0);
                self.switch_tab(tabs[(index + 1) % tabs.len()]);
            }
            KeyCode::Esc => {
                if self.grab.take().is_some() {
                    self.set_status_message("Move cancelled");
                }
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => self.move_cursor(key),
            KeyCode::Char(' ') => self.grab_or_drop(),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('c') => self.toggle_selected(),
            KeyCode::Char('x') => self.ask_delete(),
            KeyCode::Enter => self.open_detail(),
            KeyCode::Char('t') if self.active_tab() == ViewTab::Groups => {
                self.group_mode = self.group_mode.toggled();
                self.grab = None;
                self.set_status_message(format!("Showing {} issues", self.group_mode.label()));
            }
            KeyCode::Char('h') | KeyCode::Char('?') => self.set_status_message(HELP),
            _ => {}
        }
        false
    }

    fn handle_form_input(&mut self, key: KeyCode) {
        if key == KeyCode::Esc {
            self.add_form = None;
            self.state = AppState::Browse;
            return;
        }
        if key == KeyCode::Enter {
            self.submit_add_form();
            return;
        }
        let Some(form) = self.add_form.as_mut() else {
            self.state = AppState::Browse;
            return;
        };
        match key {
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Left => form.handle_left_right(false),
            KeyCode::Right => form.handle_left_right(true),
            KeyCode::Backspace => form.handle_backspace(),
            KeyCode::Char(c) => form.handle_char(c),
            _ => {}
        }
    }

    fn handle_confirm_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(pending) = self.confirm.take() {
                    self.delete_confirmed(pending);
                }
                self.state = AppState::Browse;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.confirm = None;
                self.state = AppState::Browse;
            }
            _ => {}
        }
    }

    fn handle_detail_input(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        let control = modifiers.contains(KeyModifiers::CONTROL);
        match key {
            KeyCode::Char('s') if control => self.save_detail(false),
            KeyCode::Char('d') if control => self.save_detail(true),
            KeyCode::Esc => self.close_detail(),
            _ => {
                let Some(form) = self.detail_form.as_mut() else {
                    return;
                };
                match key {
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                    KeyCode::Left => form.handle_left_right(false),
                    KeyCode::Right => form.handle_left_right(true),
                    KeyCode::Backspace => form.handle_backspace(),
                    KeyCode::Delete => form.handle_delete(),
                    KeyCode::Char(c) if !control => form.handle_char(c),
                    _ => {}
                }
            }
        }
    }

    /// Route one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) -> bool {
        self.status_message.clear();

        let quit = match self.state {
            AppState::AddTask => {
                self.handle_form_input(key);
                false
            }
            AppState::Confirm => {
                self.handle_confirm_input(key);
                false
            }
            AppState::Browse if self.active_tab() == ViewTab::Detail => {
                self.handle_detail_input(key, modifiers);
                false
            }
            AppState::Browse => self.handle_browse_input(key, modifiers),
        };

        if let Some(e) = self.tracker.take_persist_error() {
            self.set_status_message(format!("Save failed: {e}"));
        }
        self.sync_cursors();
        quit
    }

    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key.code, key.modifiers));
                }
            }
        }
        Ok(false)
    }

    fn render_tabs(&self, f: &mut Frame, area: Rect) {
        let titles: Vec<Line> = [ViewTab::Overall, ViewTab::Groups, ViewTab::Members, ViewTab::Detail]
            .iter()
            .enumerate()
            .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
            .collect();
        let selected = match self.active_tab() {
            ViewTab::Overall => 0,
            ViewTab::Groups => 1,
            ViewTab::Members => 2,
            ViewTab::Detail => 3,
        };
        let tabs = Tabs::new(titles)
            .select(selected)
            .block(Block::default().borders(Borders::ALL).title("TEAMBOARD"))
            .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        f.render_widget(tabs, area);
    }

    fn render_overall(&mut self, f: &mut Frame, area: Rect) {
        let today = Local::now().date_naive();
        let grabbed = self.grab.as_ref().map(|g| g.id.clone());
        let list = &self.tracker.state().overall;
        let open = list.tasks().iter().filter(|t| !t.completed).count();

        let header = Row::new(["", "ID", "Severity", "What", "Who", "When", "Status"].map(|h| {
            Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))
        }))
        .style(Style::default().bg(BAR_NAVY).fg(Color::White));

        let rows: Vec<Row> = list
            .display_order()
            .into_iter()
            .map(|task| {
                let color = severity_color(task.severity);
                let style = if grabbed.as_ref() == Some(&task.id) {
                    Style::default().bg(GRAB_BLUE).fg(Color::White)
                } else if task.completed {
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
                } else {
                    Style::default().fg(color)
                };
                Row::new(vec![
                    Cell::from(if task.completed { "[x]" } else { "[ ]" }),
                    Cell::from(task.id.to_string()),
                    Cell::from(Severity::effective(task.severity).label()),
                    Cell::from(task.description.clone()),
                    Cell::from(task.assignee.clone()),
                    Cell::from(format_due_relative(task.due, today)),
                    Cell::from(task.status.clone()),
                ])
                .style(style)
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(15),
            Constraint::Length(9),
            Constraint::Min(25),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(14),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Overall issues ({open} open / {} total)", list.len())),
            )
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    fn render_board_tab(&mut self, f: &mut Frame, area: Rect, kind: BoardKind) {
        let keys = self.board_keys(kind);
        let filter = self.card_filter(kind);
        let title = match kind {
            BoardKind::Groups => format!("Group boards [{}] - t: switch view", self.group_mode.label()),
            BoardKind::Members => "Member boards".to_string(),
        };
        let columns = visible_columns(self.tracker.state().board(kind), &keys, filter);
        let cursor = match kind {
            BoardKind::Groups => &mut self.group_cursor,
            BoardKind::Members => &mut self.member_cursor,
        };
        let opts = BoardRender {
            title: &title,
            grabbed: self.grab.as_ref().map(|g| &g.id),
        };
        render_board(f, area, &columns, cursor, &opts);
    }

    fn render_detail(&self, f: &mut Frame, area: Rect) {
        let (Some(selection), Some(form)) = (self.tracker.state().selection(), self.detail_form.as_ref()) else {
            f.render_widget(
                Paragraph::new("No task selected. Press Enter on a task to open it.")
                    .block(Block::default().borders(Borders::ALL).title("Detail")),
                area,
            );
            return;
        };
        let task = &selection.task;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7), // Summary
                Constraint::Length(3), // Due
                Constraint::Length(3), // Severity
                Constraint::Length(6), // Notes
                Constraint::Length(3), // Status
                Constraint::Min(0),
            ])
            .split(area);

        let where_from = match &selection.source {
            Source::Overall => "Overall list".to_string(),
            Source::Group(key) => format!("Group {key}"),
            Source::Member(key) => format!("Member {key}"),
        };
        let summary = vec![
            Line::from(vec![Span::styled(
                format!("{}  {}", task.id, task.description),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(format!("From:      {where_from}")),
            Line::from(format!("Who:       {}", if task.assignee.is_empty() { "-" } else { task.assignee.as_str() })),
            Line::from(format!("Completed: {}", if task.completed { "yes" } else { "no" })),
            Line::from("Ctrl+S: save | Ctrl+D: mark complete | Tab: next field | Esc: close"),
        ];
        f.render_widget(
            Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("Detail")),
            chunks[0],
        );

        let field_style = |field: usize| {
            if form.current_field == field {
                Style::default().fg(MODERATE_AMBER)
            } else {
                Style::default()
            }
        };
        let boxed = |title: &'static str, field: usize| {
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(field_style(field))
        };

        f.render_widget(
            Paragraph::new(form.due.display()).block(boxed("Due (YYYY-MM-DD, today, in 3d...)", DUE_FIELD)),
            chunks[1],
        );
        let severity = form.selected_severity();
        f.render_widget(
            Paragraph::new(format!("< {} >", severity.label()))
                .style(Style::default().fg(severity_color(Some(severity))))
                .block(boxed("Severity", DETAIL_SEVERITY_FIELD)),
            chunks[2],
        );
        f.render_widget(
            Paragraph::new(form.notes.display())
                .wrap(Wrap { trim: false })
                .block(boxed("Notes", NOTES_FIELD)),
            chunks[3],
        );
        f.render_widget(
            Paragraph::new(form.status.display()).block(boxed("Status", STATUS_FIELD)),
            chunks[4],
        );
    }

    fn render_add_form(&self, f: &mut Frame, area: Rect) {
        let Some(form) = self.add_form.as_ref() else {
            return;
        };
        let area = centered_rect(60, 60, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} (Enter: add, Esc: cancel)", form.target.title()));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let fields = form.target.fields();
        let constraints: Vec<Constraint> = fields.iter().map(|_| Constraint::Length(3)).collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        let overall = form.target == FormTarget::Overall;
        for (i, &field) in fields.iter().enumerate() {
            let (title, text) = match field {
                WHAT_FIELD => (if overall { "What *" } else { "Content *" }, form.what.display()),
                WHO_FIELD => (if overall { "Who *" } else { "Who" }, form.who.display()),
                WHEN_FIELD => ("When * (YYYY-MM-DD, tomorrow, next fri...)", form.when.display()),
                SEVERITY_FIELD => ("Severity", format!("< {} >", form.selected_severity().label())),
                _ => continue,
            };
            let style = if form.current_field() == field {
                Style::default().fg(MODERATE_AMBER)
            } else {
                Style::default()
            };
            f.render_widget(
                Paragraph::new(text).block(Block::default().borders(Borders::ALL).title(title).border_style(style)),
                chunks[i],
            );
        }
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(CRITICAL_RED));

        let area = centered_rect(50, 20, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(self.confirm.as_ref().map(|c| c.label.as_str()).unwrap_or("")),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];
        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(grab) = &self.grab {
            format!("Moving {}: Space to drop, Esc to cancel", grab.id)
        } else {
            match self.state {
                AppState::AddTask => "Add task".to_string(),
                AppState::Confirm => "Confirm delete".to_string(),
                AppState::Browse => match self.active_tab() {
                    ViewTab::Detail => "Detail editor".to_string(),
                    _ => "Press 'h' for help".to_string(),
                },
            }
        };
        let style = if self.status_message.starts_with("Save failed") {
            Style::default().bg(CRITICAL_RED).fg(Color::White)
        } else {
            Style::default().bg(BAR_NAVY).fg(Color::White)
        };
        f.render_widget(Paragraph::new(text).style(style), area);
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_tabs(f, chunks[0]);
        match self.active_tab() {
            ViewTab::Overall => self.render_overall(f, chunks[1]),
            ViewTab::Groups => self.render_board_tab(f, chunks[1], BoardKind::Groups),
            ViewTab::Members => self.render_board_tab(f, chunks[1], BoardKind::Members),
            ViewTab::Detail => self.render_detail(f, chunks[1]),
        }
        match self.state {
            AppState::AddTask => self.render_add_form(f, chunks[1]),
            AppState::Confirm => self.render_confirm(f, chunks[1]),
            AppState::Browse => {}
        }
        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop: draw, then handle at most one key, until quit.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
