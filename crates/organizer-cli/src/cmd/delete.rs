//! `org delete` — remove a task and its checklist.
//!
//! On a terminal the user is asked to confirm. Without a terminal `--yes`
//! is required, so scripts never delete by accident.

use crate::cmd::Context;
use crate::output::{CliError, render};
use clap::Args;
use serde::Serialize;
use std::io::{IsTerminal, Write};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Task ID (full or unique prefix).
    pub id: String,

    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct DeleteResult {
    id: String,
    title: String,
    deleted: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Confirmation {
    Confirmed,
    Declined,
    NeedsFlag,
}

fn confirm_delete(id: &str, title: &str) -> anyhow::Result<Confirmation> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(Confirmation::NeedsFlag);
    }

    eprint!("Delete {id} '{title}'? [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(if is_yes(&input) {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    })
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let id = organizer.resolve_task(&args.id)?;
    let task = organizer.get_task(&id)?;

    if !args.yes {
        match confirm_delete(&task.id, &task.title)? {
            Confirmation::Confirmed => {}
            Confirmation::Declined => {
                let result = DeleteResult {
                    id: task.id,
                    title: task.title,
                    deleted: false,
                };
                return render(ctx.output, &result, |r, w| {
                    writeln!(w, "Kept {}", r.id)
                });
            }
            Confirmation::NeedsFlag => {
                return Err(CliError::new(format!(
                    "refusing to delete {} without confirmation",
                    task.id
                ))
                .with_suggestion("Pass --yes to delete non-interactively.")
                .into());
            }
        }
    }

    let task = organizer.delete_task(&task.id)?;
    let result = DeleteResult {
        id: task.id,
        title: task.title,
        deleted: true,
    };
    render(ctx.output, &result, |r, w| {
        writeln!(w, "✓ Deleted {}  {}", r.id, r.title)
    })
}
