//! `org move` — reorder a regular task within a tab.
//!
//! Indexes count regular (unpinned) tasks as `org list` shows them for the
//! same `--tab` and `--search`, starting at 0. The whole visible list is
//! renumbered afterwards.

use crate::cmd::Context;
use crate::output::render_mode;
use clap::Args;
use organizer_core::view::Tab;
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Task ID (full or unique prefix).
    pub id: String,

    /// Target index among the regular tasks shown.
    #[arg(long, value_name = "N")]
    pub to: usize,

    /// Tab whose order is being changed.
    #[arg(long, default_value = "main")]
    pub tab: Tab,

    /// Search filter in effect, as passed to `org list`.
    #[arg(long, short = 's', value_name = "QUERY", default_value = "")]
    pub search: String,
}

#[derive(Debug, Serialize)]
struct MoveResult<'a> {
    id: &'a str,
    to: usize,
    order: Vec<String>,
}

pub fn run_move(args: &MoveArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let order = organizer.move_task(&id, args.tab, &args.search, args.to)?;

    let result = MoveResult {
        id: &id,
        to: args.to,
        order,
    };
    render_mode(
        ctx.output,
        &result,
        |r, w| {
            for (index, task_id) in r.order.iter().enumerate() {
                writeln!(w, "{index}\t{task_id}")?;
            }
            Ok(())
        },
        |r, w| writeln!(w, "✓ Moved {} to position {}", r.id, r.to),
    )
}
