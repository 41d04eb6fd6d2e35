//! `org add` — create a task.

use crate::cmd::{Context, parse_due, recurrence_from_flags, write_task_detail, write_task_text};
use crate::output::render_mode;
use chrono::Local;
use clap::Args;
use organizer_core::clock::Clock;
use organizer_core::model::{Interval, RecurrenceKind};
use organizer_core::state::TaskForm;
use std::io::Write;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title. Must not be blank.
    pub title: String,

    /// Longer free-form description.
    #[arg(long = "desc", value_name = "TEXT")]
    pub description: Option<String>,

    /// Due date: YYYY-MM-DD (09:00), YYYY-MM-DDTHH:MM, or RFC 3339.
    #[arg(long, value_name = "WHEN")]
    pub due: Option<String>,

    /// Pin the task above the regular list.
    #[arg(long)]
    pub pin: bool,

    /// Checklist item (repeatable).
    #[arg(long = "check", value_name = "ITEM")]
    pub checklist: Vec<String>,

    /// Make the task recur: `simple` keeps the title, `progressive` bumps
    /// the first number in it.
    #[arg(long, value_name = "KIND")]
    pub recur: Option<RecurrenceKind>,

    /// Recurrence interval: daily, weekly, or monthly.
    #[arg(long, value_name = "INTERVAL")]
    pub every: Option<Interval>,
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let due_date = args
        .due
        .as_deref()
        .map(|raw| parse_due(raw, &Local))
        .transpose()?;

    let form = args.checklist.iter().fold(
        TaskForm::blank()
            .with_title(args.title.as_str())
            .with_description(args.description.clone().unwrap_or_default())
            .with_due_date(due_date)
            .with_pinned(args.pin)
            .with_recurrence(recurrence_from_flags(args.recur, args.every, None)),
        |form, item| form.add_checklist_item(item.as_str()),
    );

    let task = organizer.save_task(form, None)?;
    let now = organizer.clock().now();

    render_mode(
        ctx.output,
        &task,
        |task, w| write_task_text(w, task),
        |task, w| {
            writeln!(w, "✓ Added {}", task.id)?;
            write_task_detail(w, task, now)
        },
    )
}
