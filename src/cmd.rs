//! Command implementations for the CLI interface.
//!
//! Each handler works on an open `Tracker` and returns `Result<()>`; `main`
//! turns an `Err` into a message on stderr and exit code 1. Mutations that
//! change nothing print "No change".

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::Subcommand;
use clap_complete::{generate, Shell};
use log::info;

use crate::board::DropTarget;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::fields::{BoardKind, Collection, Severity, Source};
use crate::format::{parse_due_input, print_board, print_overall, print_task_detail};
use crate::list::Upsert;
use crate::persist::{GROUPS_KEY, MEMBERS_KEY, OVERALL_KEY, SCHEMA_VERSION_KEY};
use crate::session::Tracker;
use crate::store::{BlobStore, FileStore};
use crate::task::{Task, TaskId};
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive terminal interface.
    Ui,

    /// Print a view: incomplete tasks first, then completed ones.
    List {
        #[arg(long, value_enum, default_value_t = Collection::Overall)]
        view: Collection,
    },

    /// Add a task to the overall list or a board.
    Add {
        #[command(subcommand)]
        target: AddTarget,
    },

    /// Toggle a task's completion flag.
    Toggle {
        #[arg(long, value_enum, default_value_t = Collection::Overall)]
        view: Collection,
        /// Task id.
        id: String,
    },

    /// Reorder the overall list.
    Reorder {
        /// Id of the task to move.
        active: String,
        /// Id of the task whose slot it takes.
        #[arg(required_unless_present = "end", conflicts_with = "end")]
        over: Option<String>,
        /// Move to the end of the list.
        #[arg(long)]
        end: bool,
    },

    /// Move a card within or across board columns.
    Move {
        /// Board to work on: groups | members.
        #[arg(long, value_enum)]
        view: Collection,
        /// Id of the card to move.
        active: String,
        /// Drop onto this card's slot.
        #[arg(long, conflicts_with = "end", required_unless_present = "end")]
        before: Option<String>,
        /// Append to the end of this column.
        #[arg(long)]
        end: Option<String>,
    },

    /// Delete a task.
    Delete {
        #[arg(long, value_enum, default_value_t = Collection::Overall)]
        view: Collection,
        id: String,
    },

    /// Show every field of one task.
    Show {
        #[arg(long, value_enum, default_value_t = Collection::Overall)]
        view: Collection,
        id: String,
    },

    /// Edit a task's details and save them back.
    Edit {
        #[arg(long, value_enum, default_value_t = Collection::Overall)]
        view: Collection,
        id: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", "in 3d", "next friday".
        #[arg(long)]
        when: Option<String>,
        #[arg(long, value_enum)]
        severity: Option<Severity>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        what: Option<String>,
        #[arg(long)]
        who: Option<String>,
        /// Mark complete (status "Done").
        #[arg(long)]
        complete: bool,
    },

    /// Print the schema migrations applied when the data was opened.
    Migrate,

    /// Copy the stored blobs into backup/.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum AddTarget {
    /// Add to the overall list. What, who and when are all required.
    Overall {
        what: String,
        #[arg(long)]
        who: String,
        #[arg(long)]
        when: String,
        #[arg(long, value_enum)]
        severity: Option<Severity>,
    },
    /// Add to a group board.
    Group {
        group: String,
        what: String,
        #[arg(long)]
        who: Option<String>,
        #[arg(long, value_enum)]
        severity: Option<Severity>,
    },
    /// Add to a member board.
    Member {
        member: String,
        what: String,
        #[arg(long, value_enum)]
        severity: Option<Severity>,
    },
}

/// Edits requested by `tb edit`.
#[derive(Debug, Default)]
pub struct EditArgs {
    pub when: Option<String>,
    pub severity: Option<Severity>,
    pub notes: Option<String>,
    pub status: Option<String>,
    pub what: Option<String>,
    pub who: Option<String>,
    pub complete: bool,
}

fn report<S: BlobStore>(tracker: &mut Tracker<S>, changed: bool, done: String) -> Result<()> {
    if let Some(e) = tracker.take_persist_error() {
        return Err(e);
    }
    if changed {
        println!("{done}");
    } else {
        println!("No change");
    }
    Ok(())
}

/// Resolve a typed id for a mutation. An unknown id makes the mutation a
/// no-op, so it is logged and reported as "No change" by the caller.
fn lookup<S: BlobStore>(tracker: &Tracker<S>, view: Collection, text: &str) -> Option<(TaskId, Option<String>)> {
    match tracker.resolve(view, text) {
        Ok(found) => Some(found),
        Err(e) => {
            info!("event=mutation_skipped reason=unresolved_id error={e}");
            None
        }
    }
}

fn board_kind(view: Collection) -> Result<BoardKind> {
    BoardKind::from_collection(view)
        .ok_or_else(|| TrackerError::Conflict("--view must be groups or members for this command".into()))
}

/// A column key must be configured or already stored.
fn check_column<S: BlobStore>(tracker: &Tracker<S>, config: &Config, kind: BoardKind, key: &str) -> Result<()> {
    let known = config.columns(kind).iter().any(|k| k == key) || tracker.state().board(kind).has_column(key);
    if known {
        Ok(())
    } else {
        Err(TrackerError::UnknownColumn {
            kind: kind.collection().column_noun().to_string(),
            name: key.to_string(),
        })
    }
}

/// Launch the terminal user interface.
pub fn cmd_ui(tracker: Tracker<FileStore>, config: &Config) -> Result<()> {
    run_tui(tracker, config)
}

pub fn cmd_list<S: BlobStore>(tracker: &Tracker<S>, config: &Config, view: Collection) -> Result<()> {
    let state = tracker.state();
    match BoardKind::from_collection(view) {
        None => print_overall(&state.overall),
        Some(kind) => {
            let board = state.board(kind);
            print_board(board, &board.display_keys(config.columns(kind)));
        }
    }
    Ok(())
}

pub fn cmd_add<S: BlobStore>(tracker: &mut Tracker<S>, config: &Config, target: AddTarget) -> Result<()> {
    let (task, placed) = match target {
        AddTarget::Overall { what, who, when, severity } => {
            if what.trim().is_empty() || who.trim().is_empty() {
                return Err(TrackerError::Conflict("what and --who must not be empty".into()));
            }
            let due = parse_due_input(&when)?;
            let task = Task::for_overall(&what, &who, due);
            let task = match severity {
                Some(s) => task.with_severity(s),
                None => task,
            };
            tracker.add_overall(task.clone());
            (task, Collection::Overall.display_name().to_string())
        }
        AddTarget::Group { group, what, who, severity } => {
            check_column(tracker, config, BoardKind::Groups, &group)?;
            let mut task = Task::for_group(&group, &what, who.as_deref());
            task.severity = severity;
            tracker.add_to_board(BoardKind::Groups, &group, task.clone());
            (task, group)
        }
        AddTarget::Member { member, what, severity } => {
            check_column(tracker, config, BoardKind::Members, &member)?;
            let mut task = Task::for_member(&member, &what);
            task.severity = severity;
            tracker.add_to_board(BoardKind::Members, &member, task.clone());
            (task, member)
        }
    };
    info!("event=task_added id={} placed={placed}", task.id);
    report(tracker, true, format!("Added {} to {placed}", task.id))
}

pub fn cmd_toggle<S: BlobStore>(tracker: &mut Tracker<S>, view: Collection, id: &str) -> Result<()> {
    let Some((id, key)) = lookup(tracker, view, id) else {
        return report(tracker, false, String::new());
    };
    let changed = match (BoardKind::from_collection(view), key) {
        (Some(kind), Some(key)) => tracker.toggle_on_board(kind, &key, &id),
        _ => tracker.toggle_overall(&id),
    };
    report(tracker, changed, format!("Toggled {id}"))
}

pub fn cmd_reorder<S: BlobStore>(tracker: &mut Tracker<S>, active: &str, over: Option<&str>, end: bool) -> Result<()> {
    let over = match (over, end) {
        (Some(over), false) => Some(over),
        (None, true) => None,
        _ => return Err(TrackerError::Conflict("give either a target id or --end".into())),
    };
    let Some((active, _)) = lookup(tracker, Collection::Overall, active) else {
        return report(tracker, false, String::new());
    };
    let target = match over {
        Some(over) => match lookup(tracker, Collection::Overall, over) {
            Some((over, _)) => DropTarget::TaskSlot(over),
            None => return report(tracker, false, String::new()),
        },
        None => DropTarget::ContainerEnd(Collection::Overall.column_noun().to_string()),
    };
    let changed = tracker.reorder_overall(&active, &target);
    report(tracker, changed, format!("Moved {active}"))
}

pub fn cmd_move<S: BlobStore>(
    tracker: &mut Tracker<S>,
    config: &Config,
    view: Collection,
    active: &str,
    before: Option<&str>,
    end: Option<&str>,
) -> Result<()> {
    let kind = board_kind(view)?;
    let target = match (before, end) {
        (Some(before), None) => match lookup(tracker, view, before) {
            Some((before, _)) => DropTarget::TaskSlot(before),
            None => return report(tracker, false, String::new()),
        },
        (None, Some(key)) => {
            check_column(tracker, config, kind, key)?;
            DropTarget::ContainerEnd(key.to_string())
        }
        _ => return Err(TrackerError::Conflict("give exactly one of --before or --end".into())),
    };
    let Some((active, _)) = lookup(tracker, view, active) else {
        return report(tracker, false, String::new());
    };
    let changed = tracker.move_on_board(kind, &active, &target, config.columns(kind));
    report(tracker, changed, format!("Moved {active}"))
}

pub fn cmd_delete<S: BlobStore>(tracker: &mut Tracker<S>, view: Collection, id: &str) -> Result<()> {
    let Some((id, key)) = lookup(tracker, view, id) else {
        return report(tracker, false, String::new());
    };
    let changed = match (BoardKind::from_collection(view), key) {
        (Some(kind), Some(key)) => tracker.delete_from_board(kind, &key, &id),
        _ => tracker.delete_overall(&id),
    };
    report(tracker, changed, format!("Deleted {id}"))
}

pub fn cmd_show<S: BlobStore>(tracker: &Tracker<S>, view: Collection, id: &str) -> Result<()> {
    let (id, _) = tracker.resolve(view, id)?;
    let state = tracker.state();
    let task = match BoardKind::from_collection(view) {
        None => state.overall.get(&id),
        Some(kind) => state.board(kind).get(&id),
    };
    if let Some(task) = task {
        print_task_detail(task);
    }
    Ok(())
}

/// Select the task, apply the edits and save through the detail editor path.
pub fn cmd_edit<S: BlobStore>(tracker: &mut Tracker<S>, view: Collection, id: &str, args: EditArgs) -> Result<()> {
    let (id, key) = tracker.resolve(view, id)?;
    let state = tracker.state();
    let (task, source) = match (BoardKind::from_collection(view), key) {
        (Some(kind), Some(key)) => (state.board(kind).get(&id).cloned(), kind.source(&key)),
        _ => (state.overall.get(&id).cloned(), Source::Overall),
    };
    let Some(task) = task else {
        return Err(TrackerError::TaskNotFound {
            id: id.to_string(),
            collection: view.display_name().to_string(),
        });
    };

    let mut edited = task.clone();
    if let Some(when) = args.when.as_deref() {
        edited.due = if when.trim().is_empty() {
            None
        } else {
            Some(parse_due_input(when)?)
        };
    }
    if let Some(severity) = args.severity {
        edited.severity = Some(severity);
    }
    if let Some(notes) = args.notes {
        edited.notes = if notes.is_empty() { None } else { Some(notes) };
    }
    if let Some(status) = args.status {
        edited.status = status;
    }
    if let Some(what) = args.what {
        edited.description = what;
    }
    if let Some(who) = args.who {
        edited.assignee = who;
    }
    if args.complete {
        edited = edited.marked_complete();
    }
    if edited == task {
        println!("No change");
        return Ok(());
    }

    tracker.select(task, source);
    let outcome = tracker.save_detail(edited);
    tracker.close_detail();
    let done = match outcome {
        Some(Upsert::Inserted) => format!("Re-added {id}"),
        _ => format!("Saved {id}"),
    };
    report(tracker, outcome.is_some(), done)
}

pub fn cmd_migrate<S: BlobStore>(tracker: &Tracker<S>) -> Result<()> {
    let report = tracker.migration_report();
    if report.newer_than_supported {
        println!(
            "Stored schema version {} is newer than this build supports ({}); nothing migrated.",
            report.from_version, report.to_version
        );
        return Ok(());
    }
    println!("Schema version: {} -> {}", report.from_version, report.to_version);
    if report.applied.is_empty() {
        println!("No migrations applied.");
        return Ok(());
    }
    for step in &report.applied {
        println!(
            "  v{} {}: {} examined, {} rewritten",
            step.version, step.name, step.examined, step.rewritten
        );
    }
    for (old, new) in &report.id_map {
        println!("  {old} -> {new}");
    }
    Ok(())
}

/// Copy every stored blob to `backup/<timestamp>_<key>.json`.
pub fn create_backup(store: &FileStore) -> Result<Vec<PathBuf>> {
    let backup_dir = store.dir().join("backup");
    fs::create_dir_all(&backup_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let mut written = Vec::new();
    for key in [OVERALL_KEY, GROUPS_KEY, MEMBERS_KEY, SCHEMA_VERSION_KEY] {
        let source = store.path_for(key);
        if !source.exists() {
            continue;
        }
        let target = backup_dir.join(format!("{timestamp}_{key}.json"));
        fs::copy(&source, &target)?;
        written.push(target);
    }
    Ok(written)
}

pub fn cmd_backup(store: &FileStore) -> Result<()> {
    let written = create_backup(store)?;
    if written.is_empty() {
        println!("Nothing to back up.");
    }
    for path in &written {
        println!("Backup created: {}", path.display());
    }
    info!("event=backup files={}", written.len());
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::task::TaskId;

    fn setup() -> (Tracker<MemoryStore>, Config) {
        let mut tracker = Tracker::open(MemoryStore::default());
        tracker.add_overall(Task::new(1, "brakes"));
        tracker.add_overall(Task::new(2, "camera"));
        tracker.add_to_board(BoardKind::Groups, "Control", Task::new("Control-1", "pid"));
        (tracker, Config::default())
    }

    #[test]
    fn add_group_rejects_unknown_column() {
        let (mut tracker, config) = setup();
        let target = AddTarget::Group {
            group: "Kitchen".into(),
            what: "snacks".into(),
            who: None,
            severity: None,
        };
        assert!(matches!(
            cmd_add(&mut tracker, &config, target),
            Err(TrackerError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn add_member_prefixes_id() {
        let (mut tracker, config) = setup();
        let target = AddTarget::Member {
            member: "Maru".into(),
            what: "wiring".into(),
            severity: Some(Severity::Major),
        };
        cmd_add(&mut tracker, &config, target).unwrap();
        let column = tracker.state().members.column("Maru");
        assert_eq!(column.len(), 1);
        assert!(column[0].id.has_owner_prefix("Maru"));
        assert_eq!(column[0].severity, Some(Severity::Major));
    }

    #[test]
    fn reorder_to_end_and_before() {
        let (mut tracker, _) = setup();
        cmd_reorder(&mut tracker, "1", None, true).unwrap();
        let ids: Vec<String> = tracker.state().overall.tasks().iter().map(|t| t.id.to_string()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert!(cmd_reorder(&mut tracker, "1", Some("2"), true).is_err());
    }

    #[test]
    fn unknown_ids_are_no_change() {
        let (mut tracker, config) = setup();
        let overall = tracker.state().overall.clone();
        let groups = tracker.state().groups.clone();
        let writes = tracker.store().writes;

        cmd_reorder(&mut tracker, "1", Some("99"), false).unwrap();
        cmd_reorder(&mut tracker, "99", None, true).unwrap();
        cmd_toggle(&mut tracker, Collection::Overall, "99").unwrap();
        cmd_delete(&mut tracker, Collection::Groups, "Control-9").unwrap();
        cmd_move(&mut tracker, &config, Collection::Groups, "Control-9", None, Some("Circuit")).unwrap();
        cmd_move(&mut tracker, &config, Collection::Groups, "Control-1", Some("Circuit-9"), None).unwrap();

        assert_eq!(tracker.state().overall, overall);
        assert_eq!(tracker.state().groups, groups);
        assert_eq!(tracker.store().writes, writes);
        assert!(cmd_show(&tracker, Collection::Overall, "99").is_err());
    }

    #[test]
    fn move_requires_a_board_view() {
        let (mut tracker, config) = setup();
        assert!(cmd_move(&mut tracker, &config, Collection::Overall, "1", None, Some("Control")).is_err());
        cmd_move(&mut tracker, &config, Collection::Groups, "Control-1", None, Some("Circuit")).unwrap();
        let task = tracker.state().groups.get(&TaskId::from("Control-1")).unwrap();
        assert_eq!(task.owner.as_deref(), Some("Circuit"));
    }

    #[test]
    fn edit_complete_marks_done() {
        let (mut tracker, _) = setup();
        let args = EditArgs {
            complete: true,
            notes: Some("checked".into()),
            ..EditArgs::default()
        };
        cmd_edit(&mut tracker, Collection::Groups, "Control-1", args).unwrap();
        let task = tracker.state().groups.get(&TaskId::from("Control-1")).unwrap();
        assert!(task.completed);
        assert_eq!(task.status, "Done");
        assert_eq!(task.notes.as_deref(), Some("checked"));
        assert_eq!(tracker.state().groups.total_len(), 1);
    }

    #[test]
    fn edit_rejects_bad_date() {
        let (mut tracker, _) = setup();
        let args = EditArgs {
            when: Some("someday".into()),
            ..EditArgs::default()
        };
        assert!(matches!(
            cmd_edit(&mut tracker, Collection::Overall, "1", args),
            Err(TrackerError::InvalidDue(_))
        ));
    }

    #[test]
    fn delete_and_toggle_resolve_ids() {
        let (mut tracker, _) = setup();
        cmd_toggle(&mut tracker, Collection::Overall, "2").unwrap();
        assert!(tracker.state().overall.get(&TaskId::Number(2)).unwrap().completed);
        cmd_delete(&mut tracker, Collection::Groups, "Control-1").unwrap();
        assert_eq!(tracker.state().groups.total_len(), 0);
        cmd_delete(&mut tracker, Collection::Groups, "Control-1").unwrap();
        assert_eq!(tracker.state().groups.total_len(), 0);
    }

    #[test]
    fn backup_copies_existing_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let mut tracker = Tracker::open(store);
        tracker.add_overall(Task::new(1, "brakes"));
        let written = create_backup(tracker.store()).unwrap();
        assert!(written.iter().any(|p| p.to_string_lossy().ends_with("_overallTasks.json")));
        assert!(written.iter().all(|p| p.exists()));
    }
}
