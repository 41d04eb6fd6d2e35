pub mod add;
pub mod check;
pub mod completions;
pub mod delete;
pub mod describe;
pub mod done;
pub mod edit;
pub mod list;
pub mod move_cmd;
pub mod notify;
pub mod push;
pub mod show;
pub mod watch;

use crate::output::{OutputMode, pretty_kv, pretty_section};
use anyhow::Context as _;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use organizer_core::Organizer;
use organizer_core::clock::{SystemClock, resolve_local};
use organizer_core::config::UserConfig;
use organizer_core::db;
use organizer_core::error::TaskError;
use organizer_core::model::{Interval, Recurrence, RecurrenceKind, Task};
use organizer_core::notify::MORNING_HOUR;
use organizer_core::view;
use std::io::{self, Write};
use std::path::PathBuf;

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub config: UserConfig,
    /// Where `config` came from, and where `org notify` writes it back.
    pub config_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub owner: String,
}

impl Context {
    /// Open the store and wrap it in an [`Organizer`] for the resolved owner
    /// with the configured reminder settings.
    pub fn open_organizer(&self) -> anyhow::Result<Organizer<SystemClock>> {
        let conn = db::open_db(&self.db_path)
            .with_context(|| format!("open task store {}", self.db_path.display()))?;
        let notifications = &self.config.notifications;
        Ok(Organizer::new(conn, self.owner.clone(), SystemClock)
            .with_notifications(notifications.enabled, notifications.lead_times()))
    }
}

/// Parse a `--due` value in `zone`.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, and a bare
/// `YYYY-MM-DD`, which means 09:00 that day.
pub fn parse_due<Z: TimeZone>(input: &str, zone: &Z) -> Result<DateTime<Utc>, TaskError> {
    let input = input.trim();
    let invalid = || TaskError::InvalidDate(input.to_string());

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(MORNING_HOUR, 0, 0))
        })
        .ok_or_else(invalid)?;

    resolve_local(zone, naive).ok_or_else(invalid)
}

/// Build a recurrence from `--recur`/`--every`, filling the missing half
/// from `base` (or the simple weekly default).
pub fn recurrence_from_flags(
    recur: Option<RecurrenceKind>,
    every: Option<Interval>,
    base: Option<Recurrence>,
) -> Option<Recurrence> {
    if recur.is_none() && every.is_none() {
        return base;
    }
    let base = base.unwrap_or_default();
    Some(Recurrence::new(
        recur.unwrap_or(base.kind),
        every.unwrap_or(base.interval),
    ))
}

fn status_marker(task: &Task) -> &'static str {
    if task.is_completed { "[x]" } else { "[ ]" }
}

fn recurrence_label(recurrence: Recurrence) -> String {
    format!("{}, {}", recurrence.kind, recurrence.interval)
}

/// One tab-separated line: id, status, title, due (RFC 3339 or `-`),
/// checklist progress, recurrence.
pub fn write_task_text(w: &mut dyn Write, task: &Task) -> io::Result<()> {
    let (checked, total) = view::checklist_progress(task);
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{checked}/{total}\t{}",
        task.id,
        if task.is_completed { "done" } else { "open" },
        task.title,
        task.due_date
            .map_or_else(|| "-".to_string(), |due| due.to_rfc3339()),
        task.recurrence
            .map_or_else(|| "-".to_string(), |r| format!("{}/{}", r.kind, r.interval)),
    )
}

/// One list row for people: marker, id, title, then due label, checklist
/// progress, and repeat badges when they apply.
pub fn write_task_pretty(w: &mut dyn Write, task: &Task, now: DateTime<Utc>) -> io::Result<()> {
    let mut badges = Vec::new();
    if let Some(due) = task.due_date {
        let label = view::due_label(due, now, &Local);
        if view::is_overdue(task, now) {
            badges.push(format!("due {label} (overdue)"));
        } else {
            badges.push(format!("due {label}"));
        }
    }
    let (checked, total) = view::checklist_progress(task);
    if total > 0 {
        badges.push(format!("{checked}/{total}"));
    }
    if let Some(recurrence) = task.recurrence {
        badges.push(format!("↻ {}", recurrence_label(recurrence)));
    }

    if badges.is_empty() {
        writeln!(w, "  {} {}  {}", status_marker(task), task.id, task.title)
    } else {
        writeln!(
            w,
            "  {} {}  {}  · {}",
            status_marker(task),
            task.id,
            task.title,
            badges.join(" · ")
        )
    }
}

/// Full task view: fields, description, then checklist items with ids.
pub fn write_task_detail(w: &mut dyn Write, task: &Task, now: DateTime<Utc>) -> io::Result<()> {
    pretty_section(w, &format!("{}  {}", task.id, task.title))?;
    pretty_kv(
        w,
        "Status",
        if task.is_completed { "completed" } else { "open" },
    )?;
    if task.is_pinned {
        pretty_kv(w, "Pinned", "yes")?;
    }
    if let Some(due) = task.due_date {
        let mut value = view::format_timestamp(due, &Local);
        if view::is_overdue(task, now) {
            value.push_str(" (overdue)");
        }
        pretty_kv(w, "Due", value)?;
    }
    if let Some(recurrence) = task.recurrence {
        pretty_kv(w, "Repeats", recurrence_label(recurrence))?;
    }
    if let Some(completed_at) = task.completed_at {
        pretty_kv(w, "Completed", view::format_timestamp(completed_at, &Local))?;
    }
    pretty_kv(w, "Created", view::format_timestamp(task.created_at, &Local))?;

    if !task.description.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Description")?;
        writeln!(w, "{}", task.description)?;
    }

    if !task.checklist.is_empty() {
        let (checked, total) = view::checklist_progress(task);
        writeln!(w)?;
        pretty_section(w, &format!("Checklist {checked}/{total}"))?;
        for item in &task.checklist {
            let marker = if item.is_checked { "[x]" } else { "[ ]" };
            writeln!(w, "  {marker} {}  {}", item.id, item.text)?;
        }
    }
    Ok(())
}

/// Text-mode counterpart of [`write_task_detail`].
pub fn write_task_detail_text(w: &mut dyn Write, task: &Task) -> io::Result<()> {
    write_task_text(w, task)?;
    if !task.description.is_empty() {
        writeln!(w, "description\t{}", task.description.replace('\n', "\\n"))?;
    }
    for item in &task.checklist {
        writeln!(
            w,
            "item\t{}\t{}\t{}",
            item.id,
            if item.is_checked { "checked" } else { "unchecked" },
            item.text
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn plus_two() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    #[test]
    fn rfc3339_is_taken_as_is() {
        let due = parse_due("2024-03-10T14:00:00Z", &plus_two()).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 10, 14, 0, 0).unwrap());
    }

    #[test]
    fn local_datetime_uses_zone() {
        let due = parse_due("2024-03-10T14:00", &plus_two()).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap());

        let spaced = parse_due("2024-03-10 14:00", &plus_two()).unwrap();
        assert_eq!(spaced, due);
    }

    #[test]
    fn bare_date_means_nine_am() {
        let due = parse_due("2024-03-10", &Utc).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_invalid_date() {
        let err = parse_due("next tuesday", &Utc).unwrap_err();
        assert_eq!(err, TaskError::InvalidDate("next tuesday".into()));
    }

    #[test]
    fn recurrence_flags_fill_from_base() {
        assert_eq!(recurrence_from_flags(None, None, None), None);
        assert_eq!(
            recurrence_from_flags(None, Some(Interval::Daily), None),
            Some(Recurrence::new(RecurrenceKind::Simple, Interval::Daily))
        );
        assert_eq!(
            recurrence_from_flags(
                Some(RecurrenceKind::Progressive),
                None,
                Some(Recurrence::new(RecurrenceKind::Simple, Interval::Monthly))
            ),
            Some(Recurrence::new(
                RecurrenceKind::Progressive,
                Interval::Monthly
            ))
        );
    }

    #[test]
    fn text_line_has_fixed_columns() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let task = Task {
            id: "tk-abcd".into(),
            owner: "alice".into(),
            title: "Water plants".into(),
            description: String::new(),
            is_pinned: false,
            is_completed: false,
            due_date: None,
            completed_at: None,
            position: 0,
            recurrence: Some(Recurrence::default()),
            created_at: ts,
            updated_at: ts,
            checklist: Vec::new(),
        };
        let mut buf = Vec::new();
        write_task_text(&mut buf, &task).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "tk-abcd\topen\tWater plants\t-\t0/0\tsimple/weekly\n"
        );
    }
}
