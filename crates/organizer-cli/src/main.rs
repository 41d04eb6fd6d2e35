#![forbid(unsafe_code)]

mod cmd;
mod identity;
mod output;

use anyhow::Context as _;
use clap::{CommandFactory, Parser, Subcommand};
use organizer_core::config::{self, UserConfig};
use organizer_core::error::ErrorCode;
use output::{CliError, OutputMode, render_error};
use std::env;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "org: personal tasks with recurrence and due-date reminders",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Emit JSON output (shorthand for `--format json`).
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    format: Option<OutputMode>,

    /// Act as this user (overrides ORGANIZER_USER and USER).
    #[arg(long, global = true, value_name = "NAME")]
    user: Option<String>,

    /// Task database path (overrides ORGANIZER_DB and the config).
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Tasks",
        about = "Create a task",
        long_about = "Create a task at the end of the list, optionally with a due date, checklist and recurrence.",
        after_help = "EXAMPLES:\n    # A plain task\n    org add \"Buy milk\"\n\n    # Due tomorrow at 18:00, with a checklist\n    org add \"Pack\" --due 2024-03-11T18:00 --check passport --check charger\n\n    # A progressive daily task: \"Run 3 km\" becomes \"Run 4 km\" when done\n    org add \"Run 3 km\" --due 2024-03-10 --recur progressive --every daily"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Change a task",
        long_about = "Update a task's fields. Flags that aren't given keep their stored value.",
        after_help = "EXAMPLES:\n    # Rename and move the due date\n    org edit tk-3f9a --title \"Buy oat milk\" --due 2024-03-12\n\n    # Stop recurring and unpin\n    org edit tk-3f9a --no-recur --unpin"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Complete or reopen a task",
        long_about = "Toggle a task's completion. Completing a recurring task creates its next occurrence.",
        after_help = "EXAMPLES:\n    # Complete a task\n    org done tk-3f9a\n\n    # Emit machine-readable output\n    org done tk-3f9a --json"
    )]
    Done(cmd::done::DoneArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Delete a task",
        long_about = "Delete a task and its checklist. Asks for confirmation on a terminal.",
        after_help = "EXAMPLES:\n    # Delete after confirming\n    org delete tk-3f9a\n\n    # Delete from a script\n    org delete tk-3f9a --yes"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Replace a task's description",
        after_help = "EXAMPLES:\n    # Set the description\n    org describe tk-3f9a \"Use the blue bag\"\n\n    # Clear it\n    org describe tk-3f9a \"\""
    )]
    Describe(cmd::describe::DescribeArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Toggle a checklist item",
        after_help = "EXAMPLES:\n    # Item ids are listed by `org show`\n    org check ci-8c21"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Tasks",
        about = "Reorder a task",
        long_about = "Move a regular (unpinned) task to another position within a tab.",
        after_help = "EXAMPLES:\n    # Move to the top of the main tab\n    org move tk-3f9a --to 0\n\n    # Reorder within a search result\n    org move tk-3f9a --to 1 --search gym"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tasks",
        long_about = "List one tab: main (open), upcoming (open with a due date), or completed.",
        after_help = "EXAMPLES:\n    # Open tasks\n    org list\n\n    # Due dates, soonest first\n    org list --tab upcoming\n\n    # Search titles and descriptions\n    org list --search milk --json\n\n    # Show one task's description and checklist inline\n    org list --expand tk-3f9a"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one task",
        long_about = "Show a task with its description and checklist.",
        after_help = "EXAMPLES:\n    # Show a task\n    org show tk-3f9a\n\n    # Use a short prefix when unique\n    org show 3f"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Reminders",
        about = "Reminder permission and lead times",
        after_help = "EXAMPLES:\n    # Allow reminders\n    org notify enable\n\n    # Skip the two-hour reminder\n    org notify set --two-hours off\n\n    # What is armed right now\n    org notify status"
    )]
    Notify(cmd::notify::NotifyArgs),

    #[command(
        next_help_heading = "Reminders",
        about = "Deliver reminders in this terminal",
        long_about = "Arm reminders for open tasks and print them as they come due. Reminders that went off during the last poll interval are delivered on start-up, and `org notify` changes apply on the next poll.",
        after_help = "EXAMPLES:\n    # Keep running\n    org watch\n\n    # Deliver what came due since the last poll, then exit\n    org watch --once --json"
    )]
    Watch(cmd::watch::WatchArgs),

    #[command(
        next_help_heading = "Reminders",
        about = "Render a push notification",
        after_help = "EXAMPLES:\n    # Default reminder\n    org push\n\n    # Custom payload and a click on Close\n    org push --payload '{\"title\":\"Gym\",\"body\":\"Leg day\"}' --action close"
    )]
    Push(cmd::push::PushArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n    # Bash\n    org completions bash > ~/.local/share/bash-completion/completions/org"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env("ORGANIZER_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "organizer=debug,info"
        } else if quiet {
            "error"
        } else {
            "organizer=warn"
        })
    });

    let format = env::var("ORGANIZER_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<UserConfig> {
    match path {
        Some(path) => config::load_config_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(UserConfig::default()),
    }
}

fn run(command: &Commands, ctx: &cmd::Context) -> anyhow::Result<()> {
    match command {
        Commands::Add(args) => cmd::add::run_add(args, ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, ctx),
        Commands::Done(args) => cmd::done::run_done(args, ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, ctx),
        Commands::Describe(args) => cmd::describe::run_describe(args, ctx),
        Commands::Check(args) => cmd::check::run_check(args, ctx),
        Commands::Move(args) => cmd::move_cmd::run_move(args, ctx),
        Commands::List(args) => cmd::list::run_list(args, ctx),
        Commands::Show(args) => cmd::show::run_show(args, ctx),
        Commands::Notify(args) => cmd::notify::run_notify(args, ctx),
        Commands::Watch(args) => cmd::watch::run_watch(args, ctx),
        Commands::Push(args) => cmd::push::run_push(args, ctx.output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let config_path = config::config_path();
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let output = output::resolve_output_mode(cli.format, cli.json, None);
            render_error(
                output,
                &CliError::coded(format!("{err:#}"), ErrorCode::ConfigParseError),
            )?;
            std::process::exit(1);
        }
    };

    let ctx = cmd::Context {
        output: output::resolve_output_mode(cli.format, cli.json, config.output.as_deref()),
        db_path: config::resolve_db_path(cli.db.as_deref(), &config),
        owner: identity::resolve_owner(cli.user.as_deref()),
        config,
        config_path,
    };
    debug!(owner = %ctx.owner, db = %ctx.db_path.display(), "resolved context");

    if let Err(err) = run(&cli.command, &ctx) {
        render_error(ctx.output, &CliError::from(&err))?;
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["org", "list", "--json"]);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::parse_from([
            "org", "--user", "alice", "--db", "/tmp/t.db", "--format", "text", "-v", "show", "tk-a",
        ]);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
        assert_eq!(cli.format, Some(OutputMode::Text));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Show(_)));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["org", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn notify_subcommands_parse() {
        let cli = Cli::parse_from(["org", "notify", "set", "--day-before", "off"]);
        assert!(matches!(cli.command, Commands::Notify(_)));
    }

    #[test]
    fn all_subcommands_listed() {
        let cases: &[&[&str]] = &[
            &["org", "add", "x"],
            &["org", "edit", "tk-a"],
            &["org", "done", "tk-a"],
            &["org", "delete", "tk-a", "--yes"],
            &["org", "describe", "tk-a", "text"],
            &["org", "check", "ci-a"],
            &["org", "move", "tk-a", "--to", "0"],
            &["org", "list"],
            &["org", "show", "tk-a"],
            &["org", "notify", "status"],
            &["org", "watch", "--once"],
            &["org", "push"],
            &["org", "completions", "zsh"],
        ];
        for argv in cases {
            assert!(Cli::try_parse_from(*argv).is_ok(), "failed to parse {argv:?}");
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
