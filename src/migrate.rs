//! Versioned migrations over the stored collections.
//!
//! # Invariants
//! - `version` values are strictly increasing.
//! - The applied version is stored under the `schemaVersion` key.
//! - A migration only runs when the stored version is below its own.

use log::{info, warn};

use crate::error::Result;
use crate::fields::Collection;
use crate::persist::{load_schema_version, save_collection, save_schema_version};
use crate::state::TrackerState;
use crate::store::BlobStore;
use crate::task::{next_clock_value, TaskId};

/// What one migration step did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub examined: usize,
    pub rewritten: usize,
    pub touched: Vec<Collection>,
    pub id_map: Vec<(TaskId, TaskId)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedMigration {
    pub version: u32,
    pub name: &'static str,
    pub examined: usize,
    pub rewritten: usize,
}

/// Summary of one migration run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub from_version: u32,
    pub to_version: u32,
    pub applied: Vec<AppliedMigration>,
    pub id_map: Vec<(TaskId, TaskId)>,
    /// The store was written by a newer build; nothing was touched.
    pub newer_than_supported: bool,
}

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    apply: fn(&mut TrackerState) -> StepOutcome,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "prefix_member_ids",
    apply: prefix_member_ids,
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Apply every pending migration to freshly loaded state and write back what
/// changed.
pub fn run_pending<S: BlobStore>(store: &mut S, state: &mut TrackerState) -> Result<MigrationReport> {
    let current = load_schema_version(store);
    let latest = latest_version();
    let mut report = MigrationReport {
        from_version: current,
        to_version: current,
        ..MigrationReport::default()
    };

    if current > latest {
        warn!(
            "event=migration_skipped reason=newer_schema stored={current} supported={latest}"
        );
        report.newer_than_supported = true;
        return Ok(report);
    }
    if current == latest {
        return Ok(report);
    }

    let mut touched: Vec<Collection> = Vec::new();
    for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
        let outcome = (migration.apply)(state);
        info!(
            "event=migration_applied version={} name={} examined={} rewritten={} unchanged={}",
            migration.version,
            migration.name,
            outcome.examined,
            outcome.rewritten,
            outcome.examined - outcome.rewritten
        );
        if outcome.rewritten > 0 {
            for collection in outcome.touched {
                if !touched.contains(&collection) {
                    touched.push(collection);
                }
            }
        }
        report.applied.push(AppliedMigration {
            version: migration.version,
            name: migration.name,
            examined: outcome.examined,
            rewritten: outcome.rewritten,
        });
        report.id_map.extend(outcome.id_map);
        report.to_version = migration.version;
    }

    for collection in touched {
        save_collection(store, state, collection)?;
    }
    save_schema_version(store, report.to_version)?;

    if state.remap_selection(&report.id_map) {
        info!("event=selection_remapped reason=migration");
    }
    Ok(report)
}

/// v1: every member-board id starts with `{member}-`.
fn prefix_member_ids(state: &mut TrackerState) -> StepOutcome {
    let mut outcome = StepOutcome {
        touched: vec![Collection::Members],
        ..StepOutcome::default()
    };
    for (member, tasks) in state.members.columns_mut().iter_mut() {
        for task in tasks.iter_mut() {
            outcome.examined += 1;
            if task.id.has_owner_prefix(member) {
                continue;
            }
            let suffix = if task.id.is_empty() {
                next_clock_value().to_string()
            } else {
                task.id.to_string()
            };
            let new_id = TaskId::Text(format!("{member}-{suffix}"));
            outcome.id_map.push((task.id.clone(), new_id.clone()));
            task.id = new_id;
            outcome.rewritten += 1;
        }
    }
    outcome
}
