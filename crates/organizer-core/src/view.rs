//! List views over a loaded task set.
//!
//! Everything here is pure: callers load tasks once (see
//! [`crate::organizer::Organizer::load_tasks`]) and slice them per tab.

use crate::model::{ParseEnumError, Task};
use chrono::{DateTime, Days, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::{fmt, str::FromStr};

/// Which slice of the task list is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    /// Open tasks in store order.
    #[default]
    Main,
    /// Open tasks with a due date, soonest first.
    Upcoming,
    /// Completed tasks, most recently completed first.
    Completed,
}

impl Tab {
    pub const ALL: [Self; 3] = [Self::Main, Self::Upcoming, Self::Completed];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
        }
    }

    /// Whether `task` belongs on this tab, ignoring search.
    #[must_use]
    pub const fn admits(self, task: &Task) -> bool {
        match self {
            Self::Main => !task.is_completed,
            Self::Upcoming => !task.is_completed && task.due_date.is_some(),
            Self::Completed => task.is_completed,
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tab {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(Self::Main),
            "upcoming" => Ok(Self::Upcoming),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(ParseEnumError {
                expected: "tab",
                got: s.to_string(),
            }),
        }
    }
}

/// Case-insensitive substring match over title and description.
///
/// An empty query matches everything.
#[must_use]
pub fn matches_search(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    task.title.to_lowercase().contains(&needle) || task.description.to_lowercase().contains(&needle)
}

/// Tasks visible on `tab` for `search`, sorted the way the tab shows them.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], tab: Tab, search: &str) -> Vec<&'a Task> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| tab.admits(task) && matches_search(task, search))
        .collect();

    match tab {
        Tab::Main => {}
        Tab::Upcoming => visible.sort_by(|a, b| missing_last(a.due_date, b.due_date)),
        Tab::Completed => visible.sort_by(|a, b| newest_first(a.completed_at, b.completed_at)),
    }
    visible
}

/// Ascending, with `None` after every `Some`. Stable for equal keys.
fn missing_last(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Descending, with `None` after every `Some`.
fn newest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => missing_last(a, b),
    }
}

/// Split into `(pinned, regular)`, keeping order within each side.
#[must_use]
pub fn partition_pinned<'a>(tasks: Vec<&'a Task>) -> (Vec<&'a Task>, Vec<&'a Task>) {
    tasks.into_iter().partition(|task| task.is_pinned)
}

/// Number of tasks on each tab, ignoring search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TabCounts {
    pub main: usize,
    pub upcoming: usize,
    pub completed: usize,
}

impl TabCounts {
    #[must_use]
    pub fn of(tasks: &[Task]) -> Self {
        let count = |tab: Tab| tasks.iter().filter(|task| tab.admits(task)).count();
        Self {
            main: count(Tab::Main),
            upcoming: count(Tab::Upcoming),
            completed: count(Tab::Completed),
        }
    }

    #[must_use]
    pub const fn get(self, tab: Tab) -> usize {
        match tab {
            Tab::Main => self.main,
            Tab::Upcoming => self.upcoming,
            Tab::Completed => self.completed,
        }
    }
}

/// Short due label relative to `now` in `zone`: `Today`, `Tomorrow`, else
/// month and day (`Jan 5`).
#[must_use]
pub fn due_label<Z: TimeZone>(due: DateTime<Utc>, now: DateTime<Utc>, zone: &Z) -> String
where
    Z::Offset: fmt::Display,
{
    let due_local = due.with_timezone(zone);
    let today = now.with_timezone(zone).date_naive();
    let due_day = due_local.date_naive();

    if due_day == today {
        return "Today".to_string();
    }
    if today.checked_add_days(Days::new(1)) == Some(due_day) {
        return "Tomorrow".to_string();
    }
    due_local.format("%b %-d").to_string()
}

/// Full timestamp in `zone`, e.g. `Jan 5, 2024, 9:30 AM`.
#[must_use]
pub fn format_timestamp<Z: TimeZone>(ts: DateTime<Utc>, zone: &Z) -> String
where
    Z::Offset: fmt::Display,
{
    ts.with_timezone(zone)
        .format("%b %-d, %Y, %-I:%M %p")
        .to_string()
}

/// Open task whose due date has passed.
#[must_use]
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    !task.is_completed && task.due_date.is_some_and(|due| due < now)
}

/// `(checked, total)` over the task's checklist.
#[must_use]
pub fn checklist_progress(task: &Task) -> (usize, usize) {
    task.checklist_progress()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChecklistItem;
    use chrono::FixedOffset;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn task(id: &str, title: &str) -> Task {
        let ts = utc(2024, 1, 1, 0, 0);
        Task {
            id: id.into(),
            owner: "alice".into(),
            title: title.into(),
            description: String::new(),
            is_pinned: false,
            is_completed: false,
            due_date: None,
            completed_at: None,
            position: 0,
            recurrence: None,
            created_at: ts,
            updated_at: ts,
            checklist: Vec::new(),
        }
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn tabs_split_by_completion_and_due() {
        let open = task("tk-open", "Open");
        let mut dated = task("tk-dated", "Dated");
        dated.due_date = Some(utc(2024, 2, 1, 9, 0));
        let mut done = task("tk-done", "Done");
        done.is_completed = true;
        done.due_date = Some(utc(2024, 2, 1, 9, 0));
        let tasks = vec![open, dated, done];

        assert_eq!(ids(&filter_tasks(&tasks, Tab::Main, "")), vec!["tk-open", "tk-dated"]);
        assert_eq!(ids(&filter_tasks(&tasks, Tab::Upcoming, "")), vec!["tk-dated"]);
        assert_eq!(ids(&filter_tasks(&tasks, Tab::Completed, "")), vec!["tk-done"]);
        assert_eq!(
            TabCounts::of(&tasks),
            TabCounts {
                main: 2,
                upcoming: 1,
                completed: 1
            }
        );
    }

    #[test]
    fn search_covers_title_and_description() {
        let a = task("tk-a", "Buy MILK");
        let mut b = task("tk-b", "Errands");
        b.description = "milk and eggs".into();
        let c = task("tk-c", "Call mom");
        let tasks = vec![a, b, c];

        assert_eq!(ids(&filter_tasks(&tasks, Tab::Main, "Milk")), vec!["tk-a", "tk-b"]);
        assert_eq!(filter_tasks(&tasks, Tab::Main, "").len(), 3);
    }

    #[test]
    fn upcoming_sorts_soonest_first() {
        let mut late = task("tk-late", "Late");
        late.due_date = Some(utc(2024, 5, 1, 9, 0));
        let mut soon = task("tk-soon", "Soon");
        soon.due_date = Some(utc(2024, 2, 1, 9, 0));
        let tasks = vec![late, soon];
        assert_eq!(
            ids(&filter_tasks(&tasks, Tab::Upcoming, "")),
            vec!["tk-soon", "tk-late"]
        );
    }

    #[test]
    fn completed_sorts_recent_first_missing_last() {
        let mut old = task("tk-old", "Old");
        old.is_completed = true;
        old.completed_at = Some(utc(2024, 1, 2, 0, 0));
        let mut unknown = task("tk-unknown", "Unknown");
        unknown.is_completed = true;
        let mut recent = task("tk-recent", "Recent");
        recent.is_completed = true;
        recent.completed_at = Some(utc(2024, 3, 2, 0, 0));
        let tasks = vec![old, unknown, recent];
        assert_eq!(
            ids(&filter_tasks(&tasks, Tab::Completed, "")),
            vec!["tk-recent", "tk-old", "tk-unknown"]
        );
    }

    #[test]
    fn pinned_partition_keeps_order() {
        let mut p1 = task("tk-p1", "P1");
        p1.is_pinned = true;
        let r1 = task("tk-r1", "R1");
        let mut p2 = task("tk-p2", "P2");
        p2.is_pinned = true;
        let tasks = vec![p1, r1, p2];
        let (pinned, regular) = partition_pinned(filter_tasks(&tasks, Tab::Main, ""));
        assert_eq!(ids(&pinned), vec!["tk-p1", "tk-p2"]);
        assert_eq!(ids(&regular), vec!["tk-r1"]);
    }

    #[test]
    fn due_labels_are_relative_to_local_day() {
        let now = utc(2024, 1, 4, 12, 0);
        assert_eq!(due_label(utc(2024, 1, 4, 23, 0), now, &Utc), "Today");
        assert_eq!(due_label(utc(2024, 1, 5, 1, 0), now, &Utc), "Tomorrow");
        assert_eq!(due_label(utc(2024, 1, 15, 9, 0), now, &Utc), "Jan 15");
        assert_eq!(due_label(utc(2024, 1, 3, 9, 0), now, &Utc), "Jan 3");

        // 23:00 UTC on Jan 4 is already Jan 5 at UTC+2.
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(due_label(utc(2024, 1, 4, 23, 0), now, &zone), "Tomorrow");
    }

    #[test]
    fn timestamps_use_twelve_hour_clock() {
        assert_eq!(
            format_timestamp(utc(2024, 1, 5, 9, 30), &Utc),
            "Jan 5, 2024, 9:30 AM"
        );
        assert_eq!(
            format_timestamp(utc(2024, 12, 25, 18, 5), &Utc),
            "Dec 25, 2024, 6:05 PM"
        );
    }

    #[test]
    fn overdue_needs_past_due_and_open() {
        let now = utc(2024, 1, 4, 12, 0);
        let mut t = task("tk-a", "A");
        assert!(!is_overdue(&t, now));
        t.due_date = Some(utc(2024, 1, 4, 11, 0));
        assert!(is_overdue(&t, now));
        t.is_completed = true;
        assert!(!is_overdue(&t, now));
    }

    #[test]
    fn progress_counts_checked_items() {
        let mut t = task("tk-a", "Pack");
        for (i, checked) in [true, false, true].into_iter().enumerate() {
            t.checklist.push(ChecklistItem {
                id: format!("ci-{i}"),
                task_id: "tk-a".into(),
                text: format!("item {i}"),
                is_checked: checked,
                position: i64::try_from(i).unwrap(),
            });
        }
        assert_eq!(checklist_progress(&t), (2, 3));
    }

    #[test]
    fn tab_parses_case_insensitively() {
        assert_eq!("Upcoming".parse::<Tab>(), Ok(Tab::Upcoming));
        assert_eq!("done".parse::<Tab>(), Ok(Tab::Completed));
        assert!("later".parse::<Tab>().is_err());
    }
}
