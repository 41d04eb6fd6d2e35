//! `org done` — toggle a task between open and completed.
//!
//! Completing a recurring task also creates its next occurrence, which is
//! reported alongside the completed task.

use crate::cmd::{Context, write_task_pretty, write_task_text};
use crate::output::render_mode;
use clap::Args;
use organizer_core::clock::Clock;
use std::io::Write;

#[derive(Args, Debug)]
pub struct DoneArgs {
    /// Task ID (full or unique prefix).
    pub id: String,
}

pub fn run_done(args: &DoneArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let completion = organizer.toggle_complete(&id)?;
    let now = organizer.clock().now();

    render_mode(
        ctx.output,
        &completion,
        |completion, w| {
            write_task_text(w, &completion.task)?;
            if let Some(next) = &completion.spawned {
                write_task_text(w, next)?;
            }
            Ok(())
        },
        |completion, w| {
            let verb = if completion.task.is_completed {
                "Completed"
            } else {
                "Reopened"
            };
            writeln!(w, "✓ {verb} {}  {}", completion.task.id, completion.task.title)?;
            if let Some(next) = &completion.spawned {
                writeln!(w, "Next occurrence:")?;
                write_task_pretty(w, next, now)?;
            }
            Ok(())
        },
    )
}
