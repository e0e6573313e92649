//! Date parsing and plain-text rendering for the CLI.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::board::Board;
use crate::error::{Result, TrackerError};
use crate::fields::Severity;
use crate::list::TaskList;
use crate::task::Task;

/// Parse a due date typed by a user, relative to today.
///
/// Accepts `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday`, `eow`, `eom`,
/// `in 3d` / `in 2w` / `in 1m`, and weekdays (`fri`, `this friday`,
/// `next friday`).
pub fn parse_due_input(s: &str) -> Result<NaiveDate> {
    parse_due_on(s, Local::now().date_naive()).ok_or_else(|| TrackerError::InvalidDue(s.to_string()))
}

pub fn parse_due_on(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_signed(Duration::days(1)),
        "yesterday" => return today.checked_sub_signed(Duration::days(1)),
        "end of week" | "eow" => return Some(start_end_of_this_week(today).1),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        let (amount, unit_days) = if let Some(n) = rest.strip_suffix('d') {
            (n, 1)
        } else if let Some(n) = rest.strip_suffix('w') {
            (n, 7)
        } else if let Some(n) = rest.strip_suffix('m') {
            (n, 30)
        } else {
            return None;
        };
        let amount: i64 = amount.trim().parse().ok()?;
        let days = amount.checked_mul(unit_days)?;
        return today.checked_add_signed(Duration::try_days(days)?);
    }

    let (next_week, day) = match s.strip_prefix("next ") {
        Some(day) => (true, day),
        None => (false, s.strip_prefix("this ").unwrap_or(&s)),
    };
    if let Some(target) = weekday_index(day) {
        let current = today.weekday().num_days_from_monday() as i64;
        let ahead = (target + 7 - current) % 7;
        let ahead = if next_week { ahead + 7 } else { ahead };
        return today.checked_add_signed(Duration::days(ahead));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<i64> {
    const DAYS: [&str; 7] = ["monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday"];
    DAYS.iter()
        .position(|d| *d == name || (name.len() == 3 && d.starts_with(name)))
        .map(|i| i as i64)
}

/// Monday and Sunday of the week containing `today`.
pub fn start_end_of_this_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    (start, start + Duration::days(6))
}

/// "today", "tomorrow", "in 3d", "2d late", or "-".
pub fn format_due_relative(due: Option<NaiveDate>, today: NaiveDate) -> String {
    let Some(d) = due else {
        return "-".into();
    };
    match (d - today).num_days() {
        0 => "today".into(),
        1 => "tomorrow".into(),
        n if n > 1 => format!("in {n}d"),
        n => format!("{}d late", -n),
    }
}

/// Truncate to `width` characters, ending with an ellipsis when cut.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

fn check(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

fn task_row(task: &Task, today: NaiveDate) -> String {
    format!(
        "{} {:<22} {:<9} {:<12} {:<10} {:<12} {}",
        check(task),
        truncate(&task.id.to_string(), 22),
        Severity::effective(task.severity).label(),
        format_due_relative(task.due, today),
        truncate(or_dash(&task.assignee), 10),
        truncate(or_dash(&task.status), 12),
        task.description
    )
}

fn header() -> String {
    format!(
        "    {:<22} {:<9} {:<12} {:<10} {:<12} {}",
        "ID", "Severity", "Due", "Who", "Status", "What"
    )
}

/// Print the overall list, incomplete tasks first.
pub fn print_overall(list: &TaskList) {
    if list.is_empty() {
        println!("No tasks.");
        return;
    }
    let today = Local::now().date_naive();
    println!("{}", header());
    for task in list.display_order() {
        println!("{}", task_row(task, today));
    }
}

/// Print one board, a section per column in `keys` order.
pub fn print_board(board: &Board, keys: &[String]) {
    let today = Local::now().date_naive();
    for key in keys {
        let column = board.column(key);
        let open = column.iter().filter(|t| !t.completed).count();
        println!("== {key} ({open} open, {} total)", column.len());
        if column.is_empty() {
            println!("   (empty)");
            continue;
        }
        println!("{}", header());
        let (done, pending): (Vec<&Task>, Vec<&Task>) = column.iter().partition(|t| t.completed);
        for task in pending.into_iter().chain(done) {
            println!("{}", task_row(task, today));
        }
    }
}

/// Print every field of one task.
pub fn print_task_detail(task: &Task) {
    let today = Local::now().date_naive();
    let due = match task.due {
        Some(d) => format!("{d} ({})", format_due_relative(Some(d), today)),
        None => "-".into(),
    };
    println!("ID:        {}", task.id);
    println!("What:      {}", task.description);
    println!("Who:       {}", or_dash(&task.assignee));
    println!("Due:       {due}");
    println!("Severity:  {}", Severity::effective(task.severity).label());
    println!("Status:    {}", or_dash(&task.status));
    println!("Completed: {}", if task.completed { "yes" } else { "no" });
    println!("Owner:     {}", task.owner.as_deref().unwrap_or("-"));
    println!("Notes:\n{}", task.notes.as_deref().unwrap_or("-"));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_natural_dates() {
        // 2024-05-15 is a Wednesday.
        let today = date(2024, 5, 15);
        assert_eq!(parse_due_on("today", today), Some(today));
        assert_eq!(parse_due_on("Tomorrow", today), Some(date(2024, 5, 16)));
        assert_eq!(parse_due_on("in 3d", today), Some(date(2024, 5, 18)));
        assert_eq!(parse_due_on("in 2w", today), Some(date(2024, 5, 29)));
        assert_eq!(parse_due_on("fri", today), Some(date(2024, 5, 17)));
        assert_eq!(parse_due_on("next friday", today), Some(date(2024, 5, 24)));
        assert_eq!(parse_due_on("wednesday", today), Some(today));
        assert_eq!(parse_due_on("eom", today), Some(date(2024, 5, 31)));
        assert_eq!(parse_due_on("eow", today), Some(date(2024, 5, 19)));
        assert_eq!(parse_due_on("2024-12-01", today), Some(date(2024, 12, 1)));
        assert_eq!(parse_due_on("someday", today), None);
        assert_eq!(parse_due_on("in xd", today), None);
    }

    #[test]
    fn december_end_of_month() {
        assert_eq!(parse_due_on("end of month", date(2024, 12, 3)), Some(date(2024, 12, 31)));
    }

    #[test]
    fn invalid_due_is_an_error() {
        assert!(matches!(parse_due_input("whenever"), Err(TrackerError::InvalidDue(_))));
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let today = date(2024, 5, 15);
        assert_eq!(parse_due_on("in 99999999d", today), None);
        assert_eq!(parse_due_on("in 9223372036854775807w", today), None);
        assert_eq!(parse_due_on("in -9223372036854775808m", today), None);
        assert_eq!(parse_due_on("tomorrow", NaiveDate::MAX), None);
        assert_eq!(parse_due_on("yesterday", NaiveDate::MIN), None);
        assert_eq!(parse_due_on("next monday", NaiveDate::MAX), None);
        assert!(matches!(parse_due_input("in 99999999d"), Err(TrackerError::InvalidDue(_))));
    }

    #[test]
    fn relative_due_labels() {
        let today = date(2024, 5, 15);
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(Some(today), today), "today");
        assert_eq!(format_due_relative(Some(date(2024, 5, 16)), today), "tomorrow");
        assert_eq!(format_due_relative(Some(date(2024, 5, 20)), today), "in 5d");
        assert_eq!(format_due_relative(Some(date(2024, 5, 13)), today), "2d late");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("制御班の課題です", 4), "制御班…");
    }
}
