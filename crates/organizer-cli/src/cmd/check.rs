//! `org check` — toggle one checklist item.

use crate::cmd::Context;
use crate::output::render;
use clap::Args;
use std::io::Write;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Checklist item ID (full or unique prefix), as listed by `org show`.
    pub item_id: String,
}

pub fn run_check(args: &CheckArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    let item = organizer.toggle_checklist_item(&args.item_id)?;

    render(ctx.output, &item, |item, w| {
        let marker = if item.is_checked { "[x]" } else { "[ ]" };
        writeln!(w, "{marker} {}  {}", item.id, item.text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_item_id() {
        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CheckArgs,
        }
        let w = Wrapper::parse_from(["test", "ci-42"]);
        assert_eq!(w.args.item_id, "ci-42");
    }
}
