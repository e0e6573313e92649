//! Forms for adding a task and for the detail editor.
//!
//! The add form collects what/who/when for the overall list, what and an
//! optional who for a group board, and only the content for a member board.
//! The detail form edits due date, severity, notes and status of a selected
//! task.

use crate::error::{Result, TrackerError};
use crate::fields::{BoardKind, Severity};
use crate::format::parse_due_input;
use crate::task::Task;
use crate::tui::input::InputField;

pub const WHAT_FIELD: usize = 0;
pub const WHO_FIELD: usize = 1;
pub const WHEN_FIELD: usize = 2;
pub const SEVERITY_FIELD: usize = 3;

pub const DUE_FIELD: usize = 0;
pub const DETAIL_SEVERITY_FIELD: usize = 1;
pub const NOTES_FIELD: usize = 2;
pub const STATUS_FIELD: usize = 3;
const DETAIL_FIELD_COUNT: usize = 4;

/// Where a new task goes.
#[derive(Clone, Debug, PartialEq)]
pub enum FormTarget {
    Overall,
    Board(BoardKind, String),
}

impl FormTarget {
    pub fn title(&self) -> String {
        match self {
            FormTarget::Overall => "New issue".to_string(),
            FormTarget::Board(BoardKind::Groups, key) => format!("New issue for {key}"),
            FormTarget::Board(BoardKind::Members, key) => format!("New task for {key}"),
        }
    }

    /// Fields shown for this target, in tab order.
    pub fn fields(&self) -> &'static [usize] {
        match self {
            FormTarget::Overall => &[WHAT_FIELD, WHO_FIELD, WHEN_FIELD, SEVERITY_FIELD],
            FormTarget::Board(BoardKind::Groups, _) => &[WHAT_FIELD, WHO_FIELD, SEVERITY_FIELD],
            FormTarget::Board(BoardKind::Members, _) => &[WHAT_FIELD, SEVERITY_FIELD],
        }
    }
}

fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1) % len
    } else if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

/// Severity index into `Severity::ALL`, defaulting to minor.
fn severity_index(severity: Option<Severity>) -> usize {
    let effective = Severity::effective(severity);
    Severity::ALL.iter().position(|s| *s == effective).unwrap_or(1)
}

pub struct AddForm {
    pub target: FormTarget,
    pub what: InputField,
    pub who: InputField,
    pub when: InputField,
    pub severity: usize,
    /// Position within `target.fields()`.
    pub current: usize,
}

impl AddForm {
    pub fn new(target: FormTarget) -> Self {
        let mut form = AddForm {
            target,
            what: InputField::new(),
            who: InputField::new(),
            when: InputField::new(),
            severity: severity_index(None),
            current: 0,
        };
        form.update_active_field();
        form
    }

    pub fn current_field(&self) -> usize {
        self.target.fields()[self.current]
    }

    pub fn next_field(&mut self) {
        self.current = cycle(self.current, self.target.fields().len(), true);
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current = cycle(self.current, self.target.fields().len(), false);
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        let current = self.current_field();
        self.what.active = current == WHAT_FIELD;
        self.who.active = current == WHO_FIELD;
        self.when.active = current == WHEN_FIELD;
    }

    fn input_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field() {
            WHAT_FIELD => Some(&mut self.what),
            WHO_FIELD => Some(&mut self.who),
            WHEN_FIELD => Some(&mut self.when),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.input_mut() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.input_mut() {
            input.handle_backspace();
        }
    }

    /// Cursor movement in text fields; cycles the severity selector.
    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field() == SEVERITY_FIELD {
            self.severity = cycle(self.severity, Severity::ALL.len(), right);
        } else if let Some(input) = self.input_mut() {
            if right {
                input.move_cursor_right();
            } else {
                input.move_cursor_left();
            }
        }
    }

    pub fn selected_severity(&self) -> Severity {
        Severity::ALL[self.severity]
    }

    /// Build the task, or explain which field is missing.
    pub fn build(&self) -> Result<Task> {
        let what = self.what.value.trim();
        if what.is_empty() {
            return Err(TrackerError::Conflict("What is required".into()));
        }
        let task = match &self.target {
            FormTarget::Overall => {
                let who = self.who.value.trim();
                if who.is_empty() || self.when.value.trim().is_empty() {
                    return Err(TrackerError::Conflict("What, who and when are all required".into()));
                }
                Task::for_overall(what, who, parse_due_input(&self.when.value)?)
            }
            FormTarget::Board(BoardKind::Groups, key) => {
                let who = Some(self.who.value.trim()).filter(|w| !w.is_empty());
                Task::for_group(key, what, who)
            }
            FormTarget::Board(BoardKind::Members, key) => Task::for_member(key, what),
        };
        Ok(task.with_severity(self.selected_severity()))
    }
}

pub struct DetailForm {
    pub due: InputField,
    pub severity: usize,
    /// Selector position when the form opened.
    opened_severity: usize,
    pub notes: InputField,
    pub status: InputField,
    pub current_field: usize,
}

impl DetailForm {
    pub fn from_task(task: &Task) -> Self {
        let severity = severity_index(task.severity);
        let mut form = DetailForm {
            due: InputField::with_value(&task.due.map(|d| d.to_string()).unwrap_or_default()),
            severity,
            opened_severity: severity,
            notes: InputField::with_value(task.notes.as_deref().unwrap_or("")),
            status: InputField::with_value(&task.status),
            current_field: DUE_FIELD,
        };
        form.update_active_field();
        form
    }

    pub fn next_field(&mut self) {
        self.current_field = cycle(self.current_field, DETAIL_FIELD_COUNT, true);
        self.update_active_field();
    }

    pub fn prev_field(&mut self) {
        self.current_field = cycle(self.current_field, DETAIL_FIELD_COUNT, false);
        self.update_active_field();
    }

    fn update_active_field(&mut self) {
        self.due.active = self.current_field == DUE_FIELD;
        self.notes.active = self.current_field == NOTES_FIELD;
        self.status.active = self.current_field == STATUS_FIELD;
    }

    fn input_mut(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            DUE_FIELD => Some(&mut self.due),
            NOTES_FIELD => Some(&mut self.notes),
            STATUS_FIELD => Some(&mut self.status),
            _ => None,
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if let Some(input) = self.input_mut() {
            input.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if let Some(input) = self.input_mut() {
            input.handle_backspace();
        }
    }

    pub fn handle_delete(&mut self) {
        if let Some(input) = self.input_mut() {
            input.handle_delete();
        }
    }

    pub fn handle_left_right(&mut self, right: bool) {
        if self.current_field == DETAIL_SEVERITY_FIELD {
            self.severity = cycle(self.severity, Severity::ALL.len(), right);
        } else if let Some(input) = self.input_mut() {
            if right {
                input.move_cursor_right();
            } else {
                input.move_cursor_left();
            }
        }
    }

    pub fn selected_severity(&self) -> Severity {
        Severity::ALL[self.severity]
    }

    /// `base` with the form's values applied. An empty due field clears the
    /// date; an untouched severity selector keeps `base.severity` as is.
    pub fn apply(&self, base: &Task) -> Result<Task> {
        let due = match self.due.value.trim() {
            "" => None,
            text => Some(parse_due_input(text)?),
        };
        let notes = Some(self.notes.value.clone()).filter(|n| !n.trim().is_empty());
        let severity = if self.severity == self.opened_severity {
            base.severity
        } else {
            Some(self.selected_severity())
        };
        Ok(Task {
            due,
            severity,
            notes,
            status: self.status.value.trim().to_string(),
            ..base.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn type_text(form: &mut AddForm, text: &str) {
        for c in text.chars() {
            form.handle_char(c);
        }
    }

    #[test]
    fn overall_form_requires_all_three() {
        let mut form = AddForm::new(FormTarget::Overall);
        type_text(&mut form, "Brake squeal");
        assert!(form.build().is_err());
        form.next_field();
        type_text(&mut form, "Tommy");
        form.next_field();
        type_text(&mut form, "2024-06-01");
        let task = form.build().unwrap();
        assert_eq!(task.description, "Brake squeal");
        assert_eq!(task.assignee, "Tommy");
        assert_eq!(task.due, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(task.status, "Not started");
        assert_eq!(task.severity, Some(Severity::Minor));
    }

    #[test]
    fn member_form_skips_who_and_when() {
        let mut form = AddForm::new(FormTarget::Board(BoardKind::Members, "Maru".into()));
        type_text(&mut form, "solder");
        form.next_field();
        assert_eq!(form.current_field(), SEVERITY_FIELD);
        form.handle_left_right(true);
        form.handle_left_right(true);
        let task = form.build().unwrap();
        assert!(task.id.has_owner_prefix("Maru"));
        assert_eq!(task.severity, Some(Severity::Major));
        form.next_field();
        assert_eq!(form.current_field(), WHAT_FIELD);
    }

    #[test]
    fn detail_form_round_trips_fields() {
        let mut task = Task::new("Control-1", "pid").with_severity(Severity::Critical);
        task.notes = Some("oscillates".into());
        task.status = "Investigating".into();
        let mut form = DetailForm::from_task(&task);
        assert_eq!(form.selected_severity(), Severity::Critical);

        for c in "later".chars() {
            form.handle_char(c);
        }
        assert!(form.apply(&task).is_err());

        form.due = InputField::with_value("2024-07-01");
        form.next_field();
        form.handle_left_right(false);
        let edited = form.apply(&task).unwrap();
        assert_eq!(edited.due, NaiveDate::from_ymd_opt(2024, 7, 1));
        assert_eq!(edited.severity, Some(Severity::Major));
        assert_eq!(edited.notes.as_deref(), Some("oscillates"));
        assert_eq!(edited.id, task.id);
    }

    #[test]
    fn untouched_severity_stays_unset() {
        let task = Task::new(7, "camera");
        assert_eq!(task.severity, None);
        let mut form = DetailForm::from_task(&task);
        form.notes = InputField::with_value("lens cracked");
        let edited = form.apply(&task).unwrap();
        assert_eq!(edited.severity, None);
        assert_eq!(edited.notes.as_deref(), Some("lens cracked"));

        form.current_field = DETAIL_SEVERITY_FIELD;
        form.handle_left_right(true);
        assert_eq!(form.apply(&task).unwrap().severity, Some(Severity::Moderate));
    }
}
