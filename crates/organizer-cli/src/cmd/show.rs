//! `org show` — one task with its checklist.

use crate::cmd::{Context, write_task_detail, write_task_detail_text};
use crate::output::render_mode;
use clap::Args;
use organizer_core::clock::Clock;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Task ID (full or unique prefix).
    pub id: String,
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let task = organizer.get_task(&id)?;
    let now = organizer.clock().now();

    render_mode(
        ctx.output,
        &task,
        |task, w| write_task_detail_text(w, task),
        |task, w| write_task_detail(w, task, now),
    )
}
