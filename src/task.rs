//! Task data structure and identifier handling.
//!
//! A `Task` is one issue on the tracker. The serialized field names follow the
//! blob format written by earlier versions of the tracker (`what`, `who`,
//! `when`, `member`), so stored collections load without conversion.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Severity, STATUS_DONE, STATUS_NOT_STARTED};

static LAST_CLOCK_VALUE: AtomicU64 = AtomicU64::new(0);

/// Milliseconds since the epoch, bumped so one process never issues the same
/// value twice.
pub fn next_clock_value() -> u64 {
    let now = Utc::now().timestamp_millis().max(0) as u64;
    let mut last = LAST_CLOCK_VALUE.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_CLOCK_VALUE.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => last = actual,
        }
    }
}

/// Task identifier: a bare clock value or an owner-prefixed string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(u64),
    Text(String),
}

impl TaskId {
    /// Fresh numeric id from the monotonic clock.
    pub fn generate() -> Self {
        TaskId::Number(next_clock_value())
    }

    /// Fresh `{owner}-{clock}` id.
    pub fn prefixed(owner: &str) -> Self {
        TaskId::Text(format!("{}-{}", owner, next_clock_value()))
    }

    /// Whether the id already carries `{owner}-` in front.
    pub fn has_owner_prefix(&self, owner: &str) -> bool {
        match self {
            TaskId::Text(text) => text
                .strip_prefix(owner)
                .is_some_and(|rest| rest.starts_with('-')),
            TaskId::Number(_) => false,
        }
    }

    /// Compare against an id typed by a user, where `17` and `"17"` are the same.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            TaskId::Number(n) => text.trim().parse::<u64>().is_ok_and(|parsed| parsed == *n),
            TaskId::Text(s) => s == text,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TaskId::Text(s) if s.is_empty())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for TaskId {
    fn from(n: u64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// One issue on the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "what", alias = "content", default)]
    pub description: String,
    #[serde(rename = "who", default)]
    pub assignee: String,
    #[serde(rename = "when", default, with = "due_date")]
    pub due: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "member", alias = "group", default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl Task {
    /// A bare task with only an id and description.
    pub fn new(id: impl Into<TaskId>, description: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            description: description.into(),
            assignee: String::new(),
            due: None,
            completed: false,
            status: String::new(),
            severity: None,
            notes: None,
            owner: None,
        }
    }

    /// New overall-list issue: all of what, who and when are filled in.
    pub fn for_overall(what: &str, who: &str, due: NaiveDate) -> Self {
        Task {
            assignee: who.trim().to_string(),
            due: Some(due),
            status: STATUS_NOT_STARTED.to_string(),
            ..Task::new(TaskId::generate(), what.trim())
        }
    }

    /// New group-board issue with an id prefixed by the group name.
    pub fn for_group(group: &str, what: &str, who: Option<&str>) -> Self {
        Task {
            assignee: who.map(|w| w.trim().to_string()).unwrap_or_default(),
            owner: Some(group.to_string()),
            ..Task::new(TaskId::prefixed(group), what.trim())
        }
    }

    /// New member-board task with an id prefixed by the member name.
    pub fn for_member(member: &str, content: &str) -> Self {
        Task {
            owner: Some(member.to_string()),
            ..Task::new(TaskId::prefixed(member), content.trim())
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// Copy every editable field of `edited` onto this task, keeping the id.
    pub fn merge_from(&mut self, edited: &Task) {
        self.description = edited.description.clone();
        self.assignee = edited.assignee.clone();
        self.due = edited.due;
        self.completed = edited.completed;
        self.status = edited.status.clone();
        self.severity = edited.severity;
        self.notes = edited.notes.clone();
        if edited.owner.is_some() {
            self.owner = edited.owner.clone();
        }
    }

    /// Copy of this task with the completion flag set and the status label "Done".
    pub fn marked_complete(&self) -> Task {
        Task {
            completed: true,
            status: STATUS_DONE.to_string(),
            ..self.clone()
        }
    }
}

/// `when` is stored as `YYYY-MM-DD`, or an empty string for no date.
mod due_date {
    use chrono::NaiveDate;
    use log::warn;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(due: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match due {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => match NaiveDate::parse_from_str(text, FORMAT) {
                Ok(date) => Ok(Some(date)),
                Err(err) => {
                    warn!("event=due_date_dropped module=task value={text:?} reason={err}");
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_values_strictly_increase() {
        let first = next_clock_value();
        let second = next_clock_value();
        assert!(second > first);
    }

    #[test]
    fn prefixed_ids_carry_owner() {
        let id = TaskId::prefixed("Control");
        assert!(id.has_owner_prefix("Control"));
        assert!(!id.has_owner_prefix("Contr"));
        assert!(!TaskId::Number(5).has_owner_prefix("Control"));
    }

    #[test]
    fn numeric_and_text_ids_match_typed_text() {
        assert!(TaskId::Number(17).matches_text("17"));
        assert!(!TaskId::Number(17).matches_text("x17"));
        assert!(TaskId::from("Maru-3").matches_text("Maru-3"));
    }

    #[test]
    fn reads_legacy_blob_fields() {
        let json = r#"{"id":1700000000000,"what":"Arm jams","who":"Tommy","when":"2024-05-01","status":"Not started","completed":false,"severity":4,"description":"check the hinge"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, TaskId::Number(1_700_000_000_000));
        assert_eq!(task.description, "Arm jams");
        assert_eq!(task.assignee, "Tommy");
        assert_eq!(task.due, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(task.severity, Some(Severity::Major));
        assert_eq!(task.notes.as_deref(), Some("check the hinge"));
    }

    #[test]
    fn reads_member_content_alias_and_empty_due() {
        let json = r#"{"id":"Maru-1","content":"Order bolts","completed":true,"member":"Maru","when":""}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.description, "Order bolts");
        assert_eq!(task.owner.as_deref(), Some("Maru"));
        assert_eq!(task.due, None);
        assert!(task.completed);
    }

    #[test]
    fn unparseable_due_is_dropped_not_fatal() {
        let json = r#"{"id":2,"what":"x","when":"someday"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due, None);
    }

    #[test]
    fn merge_keeps_id() {
        let mut original = Task::new(1, "old");
        let mut edited = Task::new(99, "new").with_severity(Severity::Critical);
        edited.notes = Some("more".into());
        original.merge_from(&edited);
        assert_eq!(original.id, TaskId::Number(1));
        assert_eq!(original.description, "new");
        assert_eq!(original.severity, Some(Severity::Critical));
        assert_eq!(original.notes.as_deref(), Some("more"));
    }

    #[test]
    fn marked_complete_sets_flag_and_label() {
        let task = Task::new(1, "x").marked_complete();
        assert!(task.completed);
        assert_eq!(task.status, STATUS_DONE);
    }
}
