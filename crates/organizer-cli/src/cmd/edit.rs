//! `org edit` — change an existing task.
//!
//! Only the flags given are applied; everything else keeps its stored value.

use crate::cmd::{Context, parse_due, recurrence_from_flags, write_task_detail, write_task_text};
use crate::output::render_mode;
use chrono::Local;
use clap::Args;
use organizer_core::clock::Clock;
use organizer_core::model::{Interval, RecurrenceKind};
use organizer_core::state::TaskForm;
use std::io::Write;

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task ID (full or unique prefix).
    pub id: String,

    /// New title.
    #[arg(long)]
    pub title: Option<String>,

    /// New description.
    #[arg(long = "desc", value_name = "TEXT")]
    pub description: Option<String>,

    /// New due date: YYYY-MM-DD (09:00), YYYY-MM-DDTHH:MM, or RFC 3339.
    #[arg(long, value_name = "WHEN", conflicts_with = "no_due")]
    pub due: Option<String>,

    /// Remove the due date.
    #[arg(long)]
    pub no_due: bool,

    /// Pin the task.
    #[arg(long, conflicts_with = "unpin")]
    pub pin: bool,

    /// Unpin the task.
    #[arg(long)]
    pub unpin: bool,

    /// Append a checklist item (repeatable).
    #[arg(long = "check", value_name = "ITEM")]
    pub checklist: Vec<String>,

    /// Drop the existing checklist before appending `--check` items.
    #[arg(long)]
    pub clear_checklist: bool,

    /// Recurrence kind: simple or progressive.
    #[arg(long, value_name = "KIND", conflicts_with = "no_recur")]
    pub recur: Option<RecurrenceKind>,

    /// Recurrence interval: daily, weekly, or monthly.
    #[arg(long, value_name = "INTERVAL", conflicts_with = "no_recur")]
    pub every: Option<Interval>,

    /// Stop the task from recurring.
    #[arg(long)]
    pub no_recur: bool,
}

impl EditArgs {
    /// Apply the given flags on top of `form`.
    fn apply(&self, mut form: TaskForm, due: Option<chrono::DateTime<chrono::Utc>>) -> TaskForm {
        if let Some(title) = &self.title {
            form = form.with_title(title.as_str());
        }
        if let Some(description) = &self.description {
            form = form.with_description(description.as_str());
        }
        if self.no_due {
            form = form.with_due_date(None);
        } else if due.is_some() {
            form = form.with_due_date(due);
        }
        if self.pin {
            form = form.with_pinned(true);
        } else if self.unpin {
            form = form.with_pinned(false);
        }
        if self.clear_checklist {
            form.checklist.clear();
        }
        form = self
            .checklist
            .iter()
            .fold(form, |form, item| form.add_checklist_item(item.as_str()));

        let recurrence = if self.no_recur {
            None
        } else {
            recurrence_from_flags(self.recur, self.every, form.recurrence)
        };
        form.with_recurrence(recurrence)
    }
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let existing = organizer.get_task(&id)?;
    let due = args
        .due
        .as_deref()
        .map(|raw| parse_due(raw, &Local))
        .transpose()?;

    let form = args.apply(TaskForm::from_task(&existing), due);
    let task = organizer.save_task(form, Some(&id))?;
    let now = organizer.clock().now();

    render_mode(
        ctx.output,
        &task,
        |task, w| write_task_text(w, task),
        |task, w| {
            writeln!(w, "✓ Updated {}", task.id)?;
            write_task_detail(w, task, now)
        },
    )
}
