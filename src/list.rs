//! The overall issue list: one ordered sequence of tasks.

use serde::{Deserialize, Serialize};

use crate::board::DropTarget;
use crate::task::{Task, TaskId};

/// Outcome of a detail save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Updated,
    Inserted,
}

/// Ordered sequence of tasks, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskList { tasks }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn position(&self, id: &TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| &t.id == id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn get_mut(&mut self, id: &TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| &t.id == id)
    }

    /// Find the stored id matching text typed by a user.
    pub fn resolve_id(&self, text: &str) -> Option<TaskId> {
        self.tasks
            .iter()
            .find(|t| t.id.matches_text(text))
            .map(|t| t.id.clone())
    }

    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    pub fn toggle(&mut self, id: &TaskId) -> bool {
        match self.get_mut(id) {
            Some(task) => {
                task.toggle_completed();
                true
            }
            None => false,
        }
    }

    /// Move `active` to the drop target. `ContainerEnd` means the end of the list.
    ///
    /// Returns `false` and leaves the list untouched when either side cannot be
    /// resolved.
    pub fn reorder(&mut self, active: &TaskId, target: &DropTarget) -> bool {
        let Some(old_index) = self.position(active) else {
            return false;
        };
        let new_index = match target {
            DropTarget::TaskSlot(over) => match self.position(over) {
                Some(index) => index,
                None => return false,
            },
            DropTarget::ContainerEnd(_) => self.tasks.len() - 1,
        };
        let moved = self.tasks.remove(old_index);
        self.tasks.insert(new_index, moved);
        true
    }

    pub fn delete(&mut self, id: &TaskId) -> Option<Task> {
        let index = self.position(id)?;
        Some(self.tasks.remove(index))
    }

    /// Merge into the task with the same id, or append when it is gone.
    pub fn upsert(&mut self, edited: Task) -> Upsert {
        match self.get_mut(&edited.id) {
            Some(existing) => {
                existing.merge_from(&edited);
                Upsert::Updated
            }
            None => {
                self.tasks.push(edited);
                Upsert::Inserted
            }
        }
    }

    /// Display order: incomplete tasks first, then completed, each in stored order.
    pub fn display_order(&self) -> Vec<&Task> {
        let (open, done): (Vec<&Task>, Vec<&Task>) = self.tasks.iter().partition(|t| !t.completed);
        open.into_iter().chain(done).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &TaskList) -> Vec<TaskId> {
        list.tasks().iter().map(|t| t.id.clone()).collect()
    }

    fn sample() -> TaskList {
        TaskList::new(vec![Task::new(1, "one"), Task::new(2, "two"), Task::new(3, "three")])
    }

    #[test]
    fn add_grows_by_one_and_is_retrievable() {
        let mut list = sample();
        list.add(Task::new(4, "four"));
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(&TaskId::Number(4)).unwrap().description, "four");
    }

    #[test]
    fn toggle_twice_restores_task() {
        let mut list = sample();
        let before = list.clone();
        assert!(list.toggle(&TaskId::Number(2)));
        assert!(list.get(&TaskId::Number(2)).unwrap().completed);
        assert!(list.toggle(&TaskId::Number(2)));
        assert_eq!(list, before);
    }

    #[test]
    fn toggle_unknown_id_is_noop() {
        let mut list = sample();
        assert!(!list.toggle(&TaskId::Number(42)));
        assert_eq!(list, sample());
    }

    #[test]
    fn reorder_swaps_two_items() {
        let mut list = TaskList::new(vec![Task::new(1, "a"), Task::new(2, "b")]);
        assert!(list.reorder(&TaskId::Number(1), &DropTarget::TaskSlot(TaskId::Number(2))));
        assert_eq!(ids(&list), vec![TaskId::Number(2), TaskId::Number(1)]);
    }

    #[test]
    fn reorder_to_unknown_target_is_noop() {
        let mut list = TaskList::new(vec![Task::new(1, "a"), Task::new(2, "b")]);
        assert!(!list.reorder(&TaskId::Number(1), &DropTarget::TaskSlot(TaskId::Number(99))));
        assert_eq!(ids(&list), vec![TaskId::Number(1), TaskId::Number(2)]);
        assert!(!list.reorder(&TaskId::Number(99), &DropTarget::TaskSlot(TaskId::Number(1))));
    }

    #[test]
    fn reorder_upwards_lands_before_target() {
        let mut list = sample();
        assert!(list.reorder(&TaskId::Number(3), &DropTarget::TaskSlot(TaskId::Number(1))));
        assert_eq!(
            ids(&list),
            vec![TaskId::Number(3), TaskId::Number(1), TaskId::Number(2)]
        );
    }

    #[test]
    fn reorder_preserves_ids_and_count() {
        let mut list = sample();
        list.reorder(&TaskId::Number(1), &DropTarget::TaskSlot(TaskId::Number(3)));
        let mut after = ids(&list);
        after.sort();
        assert_eq!(after, ids(&sample()));
    }

    #[test]
    fn container_end_moves_to_back() {
        let mut list = sample();
        assert!(list.reorder(&TaskId::Number(1), &DropTarget::ContainerEnd("overall".into())));
        assert_eq!(
            ids(&list),
            vec![TaskId::Number(2), TaskId::Number(3), TaskId::Number(1)]
        );
    }

    #[test]
    fn delete_removes_only_the_match() {
        let mut list = sample();
        assert!(list.delete(&TaskId::Number(2)).is_some());
        assert!(list.delete(&TaskId::Number(2)).is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn upsert_updates_in_place_or_appends() {
        let mut list = sample();
        let mut edited = list.get(&TaskId::Number(2)).unwrap().clone();
        edited.notes = Some("loose wire".into());
        assert_eq!(list.upsert(edited), Upsert::Updated);
        assert_eq!(list.len(), 3);
        assert_eq!(list.position(&TaskId::Number(2)), Some(1));
        assert_eq!(list.get(&TaskId::Number(2)).unwrap().notes.as_deref(), Some("loose wire"));

        assert_eq!(list.upsert(Task::new(7, "new")), Upsert::Inserted);
        assert_eq!(list.len(), 4);
        assert_eq!(list.position(&TaskId::Number(7)), Some(3));
    }

    #[test]
    fn display_order_puts_completed_last() {
        let mut list = sample();
        list.toggle(&TaskId::Number(1));
        let order: Vec<TaskId> = list.display_order().iter().map(|t| t.id.clone()).collect();
        assert_eq!(order, vec![TaskId::Number(2), TaskId::Number(3), TaskId::Number(1)]);
    }

    #[test]
    fn resolve_id_accepts_typed_number() {
        let list = sample();
        assert_eq!(list.resolve_id("3"), Some(TaskId::Number(3)));
        assert_eq!(list.resolve_id("nope"), None);
    }

    #[test]
    fn round_trips_through_json() {
        let mut list = sample();
        list.toggle(&TaskId::Number(1));
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.starts_with('['));
        let back: TaskList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
