//! Application state: the three task collections, the selection cursor used
//! by the detail editor, and tab routing.
//!
//! Every mutation here is pure and synchronous. Methods report whether state
//! changed so the session layer knows which collection to write back.

use log::{debug, warn};

use crate::board::{Board, DropTarget};
use crate::fields::{BoardKind, Collection, Source, ViewTab};
use crate::list::{TaskList, Upsert};
use crate::task::{Task, TaskId};

/// The task currently open in the detail editor and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub task: Task,
    pub source: Source,
}

#[derive(Debug, Default)]
pub struct TrackerState {
    pub overall: TaskList,
    pub groups: Board,
    pub members: Board,
    selection: Option<Selection>,
    active_tab: ViewTab,
    return_tab: ViewTab,
}

impl TrackerState {
    pub fn new(overall: TaskList, groups: Board, members: Board) -> Self {
        TrackerState {
            overall,
            groups,
            members,
            ..TrackerState::default()
        }
    }

    pub fn board(&self, kind: BoardKind) -> &Board {
        match kind {
            BoardKind::Groups => &self.groups,
            BoardKind::Members => &self.members,
        }
    }

    pub fn board_mut(&mut self, kind: BoardKind) -> &mut Board {
        match kind {
            BoardKind::Groups => &mut self.groups,
            BoardKind::Members => &mut self.members,
        }
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Overall => self.overall.len(),
            Collection::Groups => self.groups.total_len(),
            Collection::Members => self.members.total_len(),
        }
    }

    // Overall list

    pub fn add_overall(&mut self, task: Task) {
        debug!("event=task_added collection=overall id={}", task.id);
        self.overall.add(task);
    }

    pub fn toggle_overall(&mut self, id: &TaskId) -> bool {
        self.overall.toggle(id)
    }

    pub fn reorder_overall(&mut self, active: &TaskId, target: &DropTarget) -> bool {
        self.overall.reorder(active, target)
    }

    pub fn delete_overall(&mut self, id: &TaskId) -> bool {
        self.overall.delete(id).is_some()
    }

    // Boards

    pub fn add_to_board(&mut self, kind: BoardKind, key: &str, task: Task) {
        debug!(
            "event=task_added collection={:?} key={} id={}",
            kind, key, task.id
        );
        self.board_mut(kind).add(key, task);
    }

    pub fn toggle_on_board(&mut self, kind: BoardKind, key: &str, id: &TaskId) -> bool {
        self.board_mut(kind).toggle(key, id)
    }

    pub fn move_on_board(&mut self, kind: BoardKind, active: &TaskId, target: &DropTarget) -> bool {
        self.board_mut(kind).move_task(active, target)
    }

    pub fn delete_from_board(&mut self, kind: BoardKind, key: &str, id: &TaskId) -> bool {
        self.board_mut(kind).delete(key, id).is_some()
    }

    // Selection cursor and tabs

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn active_tab(&self) -> ViewTab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: ViewTab) {
        self.active_tab = tab;
    }

    /// Open a task in the detail editor.
    pub fn select(&mut self, task: Task, source: Source) {
        self.return_tab = source.return_tab();
        self.selection = Some(Selection { task, source });
        self.active_tab = ViewTab::Detail;
    }

    /// Close the detail editor and go back to the view it was opened from.
    pub fn close_detail(&mut self) {
        self.selection = None;
        self.active_tab = self.return_tab;
    }

    /// Save a detail edit into the selection's source collection.
    ///
    /// Looks the id up in the recorded source and merges in place; appends
    /// when the task is no longer there. Returns the collection written and
    /// whether the task was updated or inserted, or `None` with nothing
    /// selected.
    pub fn save_detail(&mut self, edited: Task) -> Option<(Collection, Upsert)> {
        let Some(selection) = self.selection.as_ref() else {
            warn!("event=detail_save_skipped reason=no_selection id={}", edited.id);
            return None;
        };
        let source = selection.source.clone();
        let outcome = match &source {
            Source::Overall => self.overall.upsert(edited.clone()),
            Source::Group(key) => self.groups.upsert(key, edited.clone()),
            Source::Member(key) => self.members.upsert(key, edited.clone()),
        };

        let stored = match &source {
            Source::Overall => self.overall.get(&edited.id).cloned(),
            Source::Group(_) => self.groups.get(&edited.id).cloned(),
            Source::Member(_) => self.members.get(&edited.id).cloned(),
        };
        self.selection = Some(Selection {
            task: stored.unwrap_or(edited),
            source: source.clone(),
        });
        debug!(
            "event=detail_saved collection={:?} outcome={:?}",
            source.collection(),
            outcome
        );
        Some((source.collection(), outcome))
    }

    /// Point the selection cursor at renamed ids after a migration.
    pub fn remap_selection(&mut self, id_map: &[(TaskId, TaskId)]) -> bool {
        let Some(selection) = self.selection.as_mut() else {
            return false;
        };
        match id_map.iter().find(|(old, _)| old == &selection.task.id) {
            Some((_, new_id)) => {
                selection.task.id = new_id.clone();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{Severity, STATUS_DONE};

    fn state() -> TrackerState {
        let mut state = TrackerState::default();
        state.add_overall(Task::new(1, "brakes"));
        state.add_overall(Task::new(2, "camera"));
        state.add_to_board(BoardKind::Groups, "Mechanical", Task::new("Mechanical-1", "arm"));
        state.add_to_board(BoardKind::Groups, "Control", Task::new("Control-1", "pid"));
        state.add_to_board(BoardKind::Members, "Maru", Task::new("Maru-1", "bolts"));
        state
    }

    #[test]
    fn add_grows_each_collection_by_one() {
        let mut state = state();
        let before = state.len(Collection::Members);
        state.add_to_board(BoardKind::Members, "Tommy", Task::new("Tommy-1", "solder"));
        assert_eq!(state.len(Collection::Members), before + 1);
        assert!(state.members.get(&TaskId::from("Tommy-1")).is_some());
    }

    #[test]
    fn move_between_groups_keeps_total() {
        let mut state = state();
        let total = state.len(Collection::Groups);
        assert!(state.move_on_board(
            BoardKind::Groups,
            &TaskId::from("Mechanical-1"),
            &DropTarget::ContainerEnd("Control".into()),
        ));
        assert!(state.groups.column("Mechanical").is_empty());
        let moved = state.groups.get(&TaskId::from("Mechanical-1")).unwrap();
        assert_eq!(moved.owner.as_deref(), Some("Control"));
        assert_eq!(state.len(Collection::Groups), total);
    }

    #[test]
    fn select_and_close_routes_tabs() {
        let mut state = state();
        state.set_active_tab(ViewTab::Groups);
        let task = state.groups.get(&TaskId::from("Control-1")).unwrap().clone();
        state.select(task, Source::Group("Control".into()));
        assert_eq!(state.active_tab(), ViewTab::Detail);
        state.close_detail();
        assert_eq!(state.active_tab(), ViewTab::Groups);
        assert!(state.selection().is_none());
    }

    #[test]
    fn save_existing_updates_without_duplicate() {
        let mut state = state();
        let task = state.overall.get(&TaskId::Number(2)).unwrap().clone();
        state.select(task.clone(), Source::Overall);
        let edited = Task {
            notes: Some("lens cracked".into()),
            ..task
        }
        .with_severity(Severity::Major);

        let outcome = state.save_detail(edited);
        assert_eq!(outcome, Some((Collection::Overall, Upsert::Updated)));
        assert_eq!(state.overall.len(), 2);
        let stored = state.overall.get(&TaskId::Number(2)).unwrap();
        assert_eq!(stored.severity, Some(Severity::Major));
        assert_eq!(state.selection().unwrap().task.notes.as_deref(), Some("lens cracked"));
    }

    #[test]
    fn save_after_delete_appends() {
        let mut state = state();
        let task = state.members.get(&TaskId::from("Maru-1")).unwrap().clone();
        state.select(task.clone(), Source::Member("Maru".into()));
        assert!(state.delete_from_board(BoardKind::Members, "Maru", &task.id));

        let outcome = state.save_detail(task.marked_complete());
        assert_eq!(outcome, Some((Collection::Members, Upsert::Inserted)));
        let stored = state.members.get(&TaskId::from("Maru-1")).unwrap();
        assert!(stored.completed);
        assert_eq!(stored.status, STATUS_DONE);
        assert_eq!(stored.owner.as_deref(), Some("Maru"));
    }

    #[test]
    fn save_targets_only_recorded_source() {
        let mut state = state();
        let task = state.overall.get(&TaskId::Number(1)).unwrap().clone();
        state.select(task.clone(), Source::Group("Circuit".into()));
        state.save_detail(task);
        assert_eq!(state.overall.len(), 2);
        assert_eq!(state.groups.column("Circuit").len(), 1);
    }

    #[test]
    fn save_without_selection_is_noop() {
        let mut state = state();
        assert_eq!(state.save_detail(Task::new(9, "x")), None);
        assert_eq!(state.overall.len(), 2);
    }

    #[test]
    fn remap_selection_follows_renamed_id() {
        let mut state = state();
        let task = state.members.get(&TaskId::from("Maru-1")).unwrap().clone();
        state.select(task, Source::Member("Maru".into()));
        let map = vec![(TaskId::from("Maru-1"), TaskId::from("Maru-Maru-1"))];
        assert!(state.remap_selection(&map));
        assert_eq!(state.selection().unwrap().task.id, TaskId::from("Maru-Maru-1"));
    }
}
