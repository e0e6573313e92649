//! Persistence adapter between the collections and a blob store.
//!
//! Each collection lives under its own key and is always written whole. Loads
//! never fail: a missing blob means an empty collection, and a blob that
//! cannot be read or parsed is logged and replaced by an empty collection.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::board::Board;
use crate::error::Result;
use crate::fields::Collection;
use crate::list::TaskList;
use crate::state::TrackerState;
use crate::store::BlobStore;

pub const OVERALL_KEY: &str = "overallTasks";
pub const GROUPS_KEY: &str = "groupTasks";
pub const MEMBERS_KEY: &str = "membersTasks";
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

pub fn storage_key(collection: Collection) -> &'static str {
    match collection {
        Collection::Overall => OVERALL_KEY,
        Collection::Groups => GROUPS_KEY,
        Collection::Members => MEMBERS_KEY,
    }
}

/// Read and parse one blob, falling back to `T::default()`.
pub fn load_or_default<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: BlobStore,
{
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!("event=load_failed key={key} stage=read error={e}");
            return T::default();
        }
    };
    if raw.trim().is_empty() {
        return T::default();
    }
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("event=load_failed key={key} stage=parse error={e}");
            T::default()
        }
    }
}

/// Rehydrate all three collections.
pub fn load_state<S: BlobStore>(store: &S) -> TrackerState {
    let overall: TaskList = load_or_default(store, OVERALL_KEY);
    let groups: Board = load_or_default(store, GROUPS_KEY);
    let members: Board = load_or_default(store, MEMBERS_KEY);
    info!(
        "event=state_loaded overall={} groups={} members={}",
        overall.len(),
        groups.total_len(),
        members.total_len()
    );
    TrackerState::new(overall, groups, members)
}

pub fn save_value<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize,
    S: BlobStore,
{
    let blob = serde_json::to_string(value)?;
    store.set(key, &blob)?;
    Ok(())
}

/// Overwrite the blob of one collection with its full current contents.
pub fn save_collection<S: BlobStore>(
    store: &mut S,
    state: &TrackerState,
    collection: Collection,
) -> Result<()> {
    let key = storage_key(collection);
    match collection {
        Collection::Overall => save_value(store, key, &state.overall),
        Collection::Groups => save_value(store, key, &state.groups),
        Collection::Members => save_value(store, key, &state.members),
    }
}

/// Stored schema version; 0 when never written or unreadable.
pub fn load_schema_version<S: BlobStore>(store: &S) -> u32 {
    load_or_default(store, SCHEMA_VERSION_KEY)
}

pub fn save_schema_version<S: BlobStore>(store: &mut S, version: u32) -> Result<()> {
    save_value(store, SCHEMA_VERSION_KEY, &version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::BoardKind;
    use crate::store::MemoryStore;
    use crate::task::{Task, TaskId};

    #[test]
    fn absent_blobs_load_empty() {
        let store = MemoryStore::default();
        let state = load_state(&store);
        assert!(state.overall.is_empty());
        assert_eq!(state.groups.total_len(), 0);
        assert_eq!(load_schema_version(&store), 0);
    }

    #[test]
    fn malformed_blob_loads_empty_and_leaves_others() {
        let store = MemoryStore::default()
            .with_blob(OVERALL_KEY, "{not json")
            .with_blob(GROUPS_KEY, r#"{"Control":[{"id":"Control-1","what":"pid","member":"Control"}]}"#);
        let state = load_state(&store);
        assert!(state.overall.is_empty());
        assert_eq!(state.groups.column("Control").len(), 1);
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let store = MemoryStore::default().with_blob(MEMBERS_KEY, "[1,2,3]");
        let state = load_state(&store);
        assert_eq!(state.members.total_len(), 0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut store = MemoryStore::default();
        let mut state = TrackerState::default();
        state.add_overall(Task::new(1, "brakes"));
        state.add_to_board(BoardKind::Members, "Maru", Task::new("Maru-1", "bolts"));
        for collection in [Collection::Overall, Collection::Groups, Collection::Members] {
            save_collection(&mut store, &state, collection).unwrap();
        }
        assert_eq!(store.raw(GROUPS_KEY), Some("{}"));

        let loaded = load_state(&store);
        assert_eq!(loaded.overall, state.overall);
        assert_eq!(loaded.members, state.members);
        assert!(loaded.members.get(&TaskId::from("Maru-1")).is_some());
    }

    #[test]
    fn populated_tasks_round_trip_field_by_field() {
        use crate::fields::Severity;
        use chrono::NaiveDate;

        let mut task = Task::for_overall("Brake squeal", "Tommy", NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
            .with_severity(Severity::Critical);
        task.notes = Some("front left only".into());
        task.status = "Investigating".into();
        task.completed = true;
        task.owner = Some("Mechanical".into());

        let mut state = TrackerState::default();
        state.add_overall(task.clone());
        state.add_to_board(BoardKind::Groups, "Mechanical", task.clone());
        let mut member_task = Task::for_member("Maru", "bolts").with_severity(Severity::Low);
        member_task.notes = Some("M6".into());
        member_task.completed = true;
        state.add_to_board(BoardKind::Members, "Maru", member_task.clone());

        let mut store = MemoryStore::default();
        for collection in [Collection::Overall, Collection::Groups, Collection::Members] {
            save_collection(&mut store, &state, collection).unwrap();
        }
        let loaded = load_state(&store);

        assert_eq!(loaded.overall.tasks(), &[task.clone()]);
        assert_eq!(loaded.groups.column("Mechanical"), &[task]);
        let maru = &loaded.members.column("Maru")[0];
        assert_eq!(maru, &member_task);
        assert_eq!(maru.owner.as_deref(), Some("Maru"));
        assert_eq!(maru.severity, Some(Severity::Low));
    }

    #[test]
    fn schema_version_round_trips() {
        let mut store = MemoryStore::default();
        save_schema_version(&mut store, 3).unwrap();
        assert_eq!(load_schema_version(&store), 3);
    }
}
