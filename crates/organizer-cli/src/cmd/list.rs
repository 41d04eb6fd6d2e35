//! `org list` — one tab of the task list.
//!
//! Pinned tasks are shown in their own section above the rest. The tab
//! header carries per-tab counts, which ignore the search filter. Expanded
//! tasks also show their description and checklist.

use crate::cmd::{Context, write_task_pretty, write_task_text};
use crate::output::{pretty_rule, pretty_section, render_mode};
use clap::Args;
use organizer_core::clock::Clock;
use organizer_core::model::Task;
use organizer_core::state::ViewState;
use organizer_core::view::{Tab, TabCounts};
use serde::Serialize;
use std::io::{self, Write};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Tab to show: main, upcoming, or completed.
    #[arg(long, default_value = "main")]
    pub tab: Tab,

    /// Case-insensitive filter on title and description.
    #[arg(long, short = 's', value_name = "QUERY", default_value = "")]
    pub search: String,

    /// Show the description and checklist of this task (repeatable).
    #[arg(long, short = 'x', value_name = "ID")]
    pub expand: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ListView<'a> {
    tab: Tab,
    search: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    expanded: Vec<String>,
    counts: TabCounts,
    pinned: Vec<&'a Task>,
    tasks: Vec<&'a Task>,
}

pub fn run_list(args: &ListArgs, ctx: &Context) -> anyhow::Result<()> {
    let organizer = ctx.open_organizer()?;
    let expanded = args
        .expand
        .iter()
        .map(|input| organizer.resolve_task(input))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let state = view_state(args.tab, &args.search, &expanded);
    let tasks = organizer.tasks()?;
    let now = organizer.clock().now();

    let (pinned, regular) = state.visible(&tasks);
    let list = ListView {
        tab: state.tab,
        search: &state.search,
        expanded,
        counts: TabCounts::of(&tasks),
        pinned,
        tasks: regular,
    };

    render_mode(
        ctx.output,
        &list,
        |list, w| {
            for task in list.pinned.iter().chain(&list.tasks) {
                write_task_text(w, task)?;
            }
            Ok(())
        },
        |list, w| {
            let header: Vec<String> = Tab::ALL
                .iter()
                .map(|&tab| {
                    let label = format!("{tab} ({})", list.counts.get(tab));
                    if tab == list.tab { format!("[{label}]") } else { label }
                })
                .collect();
            writeln!(w, "{}", header.join("  "))?;
            pretty_rule(w)?;

            if list.pinned.is_empty() && list.tasks.is_empty() {
                return writeln!(w, "{}", empty_message(list.tab, list.search));
            }
            if !list.pinned.is_empty() {
                pretty_section(w, "Pinned")?;
                for task in &list.pinned {
                    write_task_pretty(w, task, now)?;
                    write_expanded(w, task, &state)?;
                }
                writeln!(w)?;
                if !list.tasks.is_empty() {
                    pretty_section(w, "Tasks")?;
                }
            }
            for task in &list.tasks {
                write_task_pretty(w, task, now)?;
                write_expanded(w, task, &state)?;
            }
            Ok(())
        },
    )
}

fn view_state(tab: Tab, search: &str, expanded: &[String]) -> ViewState {
    expanded.iter().fold(
        ViewState::default().with_tab(tab).with_search(search),
        |state, id| state.toggle_expanded(id),
    )
}

fn write_expanded(w: &mut dyn Write, task: &Task, state: &ViewState) -> io::Result<()> {
    if !state.is_expanded(&task.id) {
        return Ok(());
    }
    for line in task.description.lines() {
        writeln!(w, "      {line}")?;
    }
    for item in &task.checklist {
        let mark = if item.is_checked { "x" } else { " " };
        writeln!(w, "      [{mark}] {}  {}", item.text, item.id)?;
    }
    Ok(())
}

fn empty_message(tab: Tab, search: &str) -> String {
    if !search.trim().is_empty() {
        return format!("No tasks match \"{}\".", search.trim());
    }
    match tab {
        Tab::Main => "No open tasks. Add one with `org add <title>`.".to_string(),
        Tab::Upcoming => "Nothing upcoming. Tasks with a due date show up here.".to_string(),
        Tab::Completed => "No completed tasks yet.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: ListArgs,
    }

    #[test]
    fn defaults_to_main_tab() {
        let w = Wrapper::parse_from(["test"]);
        assert_eq!(w.args.tab, Tab::Main);
        assert!(w.args.search.is_empty());
    }

    #[test]
    fn parses_tab_and_search() {
        let w = Wrapper::parse_from(["test", "--tab", "completed", "-s", "milk"]);
        assert_eq!(w.args.tab, Tab::Completed);
        assert_eq!(w.args.search, "milk");
    }

    #[test]
    fn expand_is_repeatable() {
        let w = Wrapper::parse_from(["test", "-x", "tk-a", "--expand", "tk-b"]);
        assert_eq!(w.args.expand, vec!["tk-a", "tk-b"]);
    }

    #[test]
    fn view_state_carries_flags() {
        let state = view_state(Tab::Upcoming, "gym", &["tk-a".to_string(), "tk-a".to_string(), "tk-b".to_string()]);
        assert_eq!(state.tab, Tab::Upcoming);
        assert_eq!(state.search, "gym");
        // Naming a task twice toggles it back.
        assert!(!state.is_expanded("tk-a"));
        assert!(state.is_expanded("tk-b"));
    }

    #[test]
    fn empty_message_mentions_search() {
        assert_eq!(empty_message(Tab::Main, " milk "), "No tasks match \"milk\".");
        assert!(empty_message(Tab::Upcoming, "").starts_with("Nothing upcoming"));
    }
}
