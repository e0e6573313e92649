//! A tracker session: state plus the store it mirrors.
//!
//! Every applied mutation writes the whole affected collection back to the
//! store. No-op mutations write nothing. A failed write is logged and kept
//! for the caller; the in-memory change stands.

use log::{error, info};

use crate::board::DropTarget;
use crate::error::{Result, TrackerError};
use crate::fields::{BoardKind, Collection, Source, ViewTab};
use crate::list::Upsert;
use crate::migrate::{run_pending, MigrationReport};
use crate::persist::{load_state, save_collection};
use crate::state::TrackerState;
use crate::store::BlobStore;
use crate::task::{Task, TaskId};

pub struct Tracker<S: BlobStore> {
    state: TrackerState,
    store: S,
    migration: MigrationReport,
    persist_error: Option<TrackerError>,
}

impl<S: BlobStore> Tracker<S> {
    /// Rehydrate from the store and run pending migrations.
    pub fn open(mut store: S) -> Self {
        let mut state = load_state(&store);
        let migration = match run_pending(&mut store, &mut state) {
            Ok(report) => report,
            Err(e) => {
                error!("event=migration_failed error={e}");
                MigrationReport::default()
            }
        };
        info!(
            "event=tracker_open schema_version={} migrations_applied={}",
            migration.to_version,
            migration.applied.len()
        );
        Tracker {
            state,
            store,
            migration,
            persist_error: None,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn migration_report(&self) -> &MigrationReport {
        &self.migration
    }

    /// Last write failure since the previous call, if any.
    pub fn take_persist_error(&mut self) -> Option<TrackerError> {
        self.persist_error.take()
    }

    fn persist(&mut self, collection: Collection) {
        if let Err(e) = save_collection(&mut self.store, &self.state, collection) {
            error!("event=save_failed collection={collection:?} error={e}");
            self.persist_error = Some(e);
        }
    }

    fn persist_if(&mut self, changed: bool, collection: Collection) -> bool {
        if changed {
            self.persist(collection);
        }
        changed
    }

    // Overall list

    pub fn add_overall(&mut self, task: Task) {
        self.state.add_overall(task);
        self.persist(Collection::Overall);
    }

    pub fn toggle_overall(&mut self, id: &TaskId) -> bool {
        let changed = self.state.toggle_overall(id);
        self.persist_if(changed, Collection::Overall)
    }

    pub fn reorder_overall(&mut self, active: &TaskId, target: &DropTarget) -> bool {
        let changed = self.state.reorder_overall(active, target);
        self.persist_if(changed, Collection::Overall)
    }

    pub fn delete_overall(&mut self, id: &TaskId) -> bool {
        let changed = self.state.delete_overall(id);
        self.persist_if(changed, Collection::Overall)
    }

    // Boards

    pub fn add_to_board(&mut self, kind: BoardKind, key: &str, task: Task) {
        self.state.add_to_board(kind, key, task);
        self.persist(kind.collection());
    }

    pub fn toggle_on_board(&mut self, kind: BoardKind, key: &str, id: &TaskId) -> bool {
        let changed = self.state.toggle_on_board(kind, key, id);
        self.persist_if(changed, kind.collection())
    }

    /// Move a card. `ContainerEnd` must name a column in `known_columns` or one
    /// already stored; anything else is a no-op.
    pub fn move_on_board(
        &mut self,
        kind: BoardKind,
        active: &TaskId,
        target: &DropTarget,
        known_columns: &[String],
    ) -> bool {
        if let DropTarget::ContainerEnd(key) = target {
            let known = known_columns.iter().any(|k| k == key) || self.state.board(kind).has_column(key);
            if !known {
                return false;
            }
        }
        let changed = self.state.move_on_board(kind, active, target);
        self.persist_if(changed, kind.collection())
    }

    pub fn delete_from_board(&mut self, kind: BoardKind, key: &str, id: &TaskId) -> bool {
        let changed = self.state.delete_from_board(kind, key, id);
        self.persist_if(changed, kind.collection())
    }

    // Detail editor

    pub fn select(&mut self, task: Task, source: Source) {
        self.state.select(task, source);
    }

    pub fn close_detail(&mut self) {
        self.state.close_detail();
    }

    pub fn set_active_tab(&mut self, tab: ViewTab) {
        self.state.set_active_tab(tab);
    }

    pub fn save_detail(&mut self, edited: Task) -> Option<Upsert> {
        let (collection, outcome) = self.state.save_detail(edited)?;
        self.persist(collection);
        Some(outcome)
    }

    /// Look a typed id up in one collection and return the stored id and,
    /// for boards, its column key.
    pub fn resolve(&self, collection: Collection, text: &str) -> Result<(TaskId, Option<String>)> {
        let not_found = || TrackerError::TaskNotFound {
            id: text.to_string(),
            collection: collection.display_name().to_string(),
        };
        match BoardKind::from_collection(collection) {
            None => self
                .state
                .overall
                .resolve_id(text)
                .map(|id| (id, None))
                .ok_or_else(not_found),
            Some(kind) => {
                let board = self.state.board(kind);
                let id = board.resolve_id(text).ok_or_else(not_found)?;
                let (key, _) = board.locate(&id).ok_or_else(not_found)?;
                Ok((id, Some(key)))
            }
        }
    }
}
