//! Keyed boards: a map from group or member name to an ordered column of tasks.
//!
//! Cards move within a column or across columns by drop target. Moving a card
//! into another column rewrites its owner tag to that column's key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::list::Upsert;
use crate::task::{Task, TaskId};

/// Where a dragged card was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Onto another card: take that card's position.
    TaskSlot(TaskId),
    /// Onto a column itself: append to the end of it.
    ContainerEnd(String),
}

/// Column key -> ordered tasks, serialized as a JSON object of arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    columns: BTreeMap<String, Vec<Task>>,
}

impl Board {
    pub fn column(&self, key: &str) -> &[Task] {
        self.columns.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut BTreeMap<String, Vec<Task>> {
        &mut self.columns
    }

    /// Task count across all columns.
    pub fn total_len(&self) -> usize {
        self.columns.values().map(Vec::len).sum()
    }

    /// Column key and index of the first card with this id.
    pub fn locate(&self, id: &TaskId) -> Option<(String, usize)> {
        self.columns.iter().find_map(|(key, tasks)| {
            tasks
                .iter()
                .position(|t| &t.id == id)
                .map(|index| (key.clone(), index))
        })
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.columns.values().flatten().find(|t| &t.id == id)
    }

    /// Find the stored id matching text typed by a user.
    pub fn resolve_id(&self, text: &str) -> Option<TaskId> {
        self.columns
            .values()
            .flatten()
            .find(|t| t.id.matches_text(text))
            .map(|t| t.id.clone())
    }

    /// Append to the column, creating it, and tag the task with the key.
    pub fn add(&mut self, key: &str, mut task: Task) {
        task.owner = Some(key.to_string());
        self.columns.entry(key.to_string()).or_default().push(task);
    }

    pub fn toggle(&mut self, key: &str, id: &TaskId) -> bool {
        let Some(task) = self
            .columns
            .get_mut(key)
            .and_then(|tasks| tasks.iter_mut().find(|t| &t.id == id))
        else {
            return false;
        };
        task.toggle_completed();
        true
    }

    /// Move `active` to the drop target, within or across columns.
    ///
    /// Returns `false` and leaves the board untouched when the dragged card or
    /// the target card cannot be found. `ContainerEnd` always resolves; the
    /// column is created when missing.
    pub fn move_task(&mut self, active: &TaskId, target: &DropTarget) -> bool {
        let Some((source_key, source_index)) = self.locate(active) else {
            return false;
        };
        let (target_key, target_index) = match target {
            DropTarget::TaskSlot(over) => match self.locate(over) {
                Some(found) => (found.0, Some(found.1)),
                None => return false,
            },
            DropTarget::ContainerEnd(key) => (key.clone(), None),
        };

        let Some(source) = self.columns.get_mut(&source_key) else {
            return false;
        };
        let mut moving = source.remove(source_index);

        if source_key != target_key {
            moving.owner = Some(target_key.clone());
        }
        let column = self.columns.entry(target_key).or_default();
        let index = target_index.unwrap_or(column.len()).min(column.len());
        column.insert(index, moving);
        true
    }

    pub fn delete(&mut self, key: &str, id: &TaskId) -> Option<Task> {
        let tasks = self.columns.get_mut(key)?;
        let index = tasks.iter().position(|t| &t.id == id)?;
        Some(tasks.remove(index))
    }

    /// Merge into the same id within `key`, or append there when it is gone.
    pub fn upsert(&mut self, key: &str, mut edited: Task) -> Upsert {
        edited.owner = Some(key.to_string());
        let tasks = self.columns.entry(key.to_string()).or_default();
        match tasks.iter_mut().find(|t| t.id == edited.id) {
            Some(existing) => {
                existing.merge_from(&edited);
                Upsert::Updated
            }
            None => {
                tasks.push(edited);
                Upsert::Inserted
            }
        }
    }

    /// Column keys in display order: configured names first, then any stored
    /// key the configuration does not list.
    pub fn display_keys(&self, configured: &[String]) -> Vec<String> {
        let mut keys: Vec<String> = configured.to_vec();
        for key in self.columns.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(board: &Board, key: &str) -> Vec<String> {
        board.column(key).iter().map(|t| t.id.to_string()).collect()
    }

    fn sample() -> Board {
        let mut board = Board::default();
        board.add("Mechanical", Task::new("m-1", "gearbox"));
        board.add("Mechanical", Task::new("m-2", "chassis"));
        board.add("Control", Task::new("c-1", "pid"));
        board
    }

    #[test]
    fn add_tags_owner_and_grows() {
        let board = sample();
        assert_eq!(board.total_len(), 3);
        let task = board.get(&TaskId::from("c-1")).unwrap();
        assert_eq!(task.owner.as_deref(), Some("Control"));
    }

    #[test]
    fn move_across_columns_rewrites_owner() {
        let mut board = sample();
        assert!(board.move_task(
            &TaskId::from("m-1"),
            &DropTarget::TaskSlot(TaskId::from("c-1"))
        ));
        assert_eq!(ids(&board, "Mechanical"), vec!["m-2"]);
        assert_eq!(ids(&board, "Control"), vec!["m-1", "c-1"]);
        assert_eq!(
            board.get(&TaskId::from("m-1")).unwrap().owner.as_deref(),
            Some("Control")
        );
        assert_eq!(board.total_len(), 3);
    }

    #[test]
    fn move_within_column_never_duplicates() {
        let mut board = sample();
        assert!(board.move_task(
            &TaskId::from("m-1"),
            &DropTarget::TaskSlot(TaskId::from("m-2"))
        ));
        assert_eq!(ids(&board, "Mechanical"), vec!["m-2", "m-1"]);
        assert_eq!(board.total_len(), 3);
    }

    #[test]
    fn container_end_appends_and_creates_column() {
        let mut board = sample();
        assert!(board.move_task(
            &TaskId::from("c-1"),
            &DropTarget::ContainerEnd("Mechanical".into())
        ));
        assert_eq!(ids(&board, "Mechanical"), vec!["m-1", "m-2", "c-1"]);
        assert!(ids(&board, "Control").is_empty());

        assert!(board.move_task(
            &TaskId::from("m-1"),
            &DropTarget::ContainerEnd("Circuit".into())
        ));
        assert_eq!(ids(&board, "Circuit"), vec!["m-1"]);
        assert_eq!(
            board.get(&TaskId::from("m-1")).unwrap().owner.as_deref(),
            Some("Circuit")
        );
    }

    #[test]
    fn container_end_in_same_column_moves_to_back() {
        let mut board = sample();
        assert!(board.move_task(
            &TaskId::from("m-1"),
            &DropTarget::ContainerEnd("Mechanical".into())
        ));
        assert_eq!(ids(&board, "Mechanical"), vec!["m-2", "m-1"]);
    }

    #[test]
    fn unresolved_move_is_noop() {
        let mut board = sample();
        assert!(!board.move_task(
            &TaskId::from("m-1"),
            &DropTarget::TaskSlot(TaskId::from("ghost"))
        ));
        assert!(!board.move_task(
            &TaskId::from("ghost"),
            &DropTarget::ContainerEnd("Control".into())
        ));
        assert_eq!(board, sample());
    }

    #[test]
    fn toggle_and_delete_need_matching_key() {
        let mut board = sample();
        assert!(!board.toggle("Control", &TaskId::from("m-1")));
        assert!(board.toggle("Mechanical", &TaskId::from("m-1")));
        assert!(board.delete("Control", &TaskId::from("m-1")).is_none());
        assert!(board.delete("Mechanical", &TaskId::from("m-1")).is_some());
        assert!(board.delete("Nowhere", &TaskId::from("m-2")).is_none());
        assert_eq!(board.total_len(), 2);
    }

    #[test]
    fn upsert_updates_or_appends_with_owner() {
        let mut board = sample();
        let mut edited = board.get(&TaskId::from("c-1")).unwrap().clone();
        edited.assignee = "Shoda".into();
        assert_eq!(board.upsert("Control", edited), Upsert::Updated);
        assert_eq!(board.column("Control").len(), 1);
        assert_eq!(board.column("Control")[0].assignee, "Shoda");

        let stray = Task::new("x-1", "rewire");
        assert_eq!(board.upsert("Circuit", stray), Upsert::Inserted);
        assert_eq!(board.column("Circuit")[0].owner.as_deref(), Some("Circuit"));
    }

    #[test]
    fn display_keys_lists_configured_then_stored() {
        let board = sample();
        let keys = board.display_keys(&["Circuit".to_string(), "Control".to_string()]);
        assert_eq!(keys, vec!["Circuit", "Control", "Mechanical"]);
    }

    #[test]
    fn round_trips_through_json_object() {
        let board = sample();
        let json = serde_json::to_string(&board).unwrap();
        assert!(json.starts_with('{'));
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }
}
