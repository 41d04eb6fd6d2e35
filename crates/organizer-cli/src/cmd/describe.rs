//! `org describe` — replace a task's description.

use crate::cmd::{Context, write_task_detail, write_task_detail_text};
use crate::output::render_mode;
use clap::Args;
use organizer_core::clock::Clock;

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Task ID (full or unique prefix).
    pub id: String,

    /// New description; surrounding whitespace is trimmed. Pass "" to clear.
    pub text: String,
}

pub fn run_describe(args: &DescribeArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let task = organizer.save_description(&id, &args.text)?;
    let now = organizer.clock().now();

    render_mode(
        ctx.output,
        &task,
        |task, w| write_task_detail_text(w, task),
        |task, w| write_task_detail(w, task, now),
    )
}
