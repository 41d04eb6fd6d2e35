//! `org notify` — reminder permission and lead times.
//!
//! Settings live in the `[notifications]` section of the user config.
//! `status` arms a scheduler from the store and lists what would fire.

use crate::cmd::Context;
use crate::output::{CliError, pretty_kv, pretty_section, render_mode};
use anyhow::Context as _;
use chrono::{DateTime, Local, Utc};
use clap::{Args, Subcommand, ValueEnum};
use organizer_core::config::{NotificationConfig, save_config_to};
use organizer_core::notify::LeadTimes;
use organizer_core::view;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Args, Debug)]
pub struct NotifyArgs {
    #[command(subcommand)]
    pub command: NotifyCommand,
}

#[derive(Subcommand, Debug)]
pub enum NotifyCommand {
    /// Allow reminders to be delivered.
    Enable,
    /// Stop delivering reminders.
    Disable,
    /// Show settings and the reminders that are armed.
    Status,
    /// Choose which lead times fire.
    Set(SetArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("lead").required(true).multiple(true))]
pub struct SetArgs {
    /// 09:00 the day before the due date.
    #[arg(long, value_name = "on|off", group = "lead")]
    pub day_before: Option<Switch>,

    /// 09:00 on the due date.
    #[arg(long, value_name = "on|off", group = "lead")]
    pub day_of: Option<Switch>,

    /// Two hours before the due time.
    #[arg(long, value_name = "on|off", group = "lead")]
    pub two_hours: Option<Switch>,
}

impl SetArgs {
    fn apply(&self, lead: LeadTimes) -> LeadTimes {
        LeadTimes {
            day_before: self.day_before.map_or(lead.day_before, Switch::is_on),
            day_of: self.day_of.map_or(lead.day_of, Switch::is_on),
            two_hours: self.two_hours.map_or(lead.two_hours, Switch::is_on),
        }
    }
}

#[derive(Debug, Serialize)]
struct ArmedTask {
    id: String,
    title: String,
    fire_at: Vec<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct NotifyStatus {
    enabled: bool,
    day_before: bool,
    day_of: bool,
    two_hours: bool,
    pending: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    armed: Vec<ArmedTask>,
}

pub fn run_notify(args: &NotifyArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut settings = ctx.config.notifications.clone();
    match &args.command {
        NotifyCommand::Enable => {
            settings.enabled = true;
            persist(ctx, &settings)?;
        }
        NotifyCommand::Disable => {
            settings.enabled = false;
            persist(ctx, &settings)?;
        }
        NotifyCommand::Set(set) => {
            settings.set_lead_times(set.apply(settings.lead_times()));
            persist(ctx, &settings)?;
        }
        NotifyCommand::Status => {}
    }

    let status = status_for(ctx, &settings)?;
    render_mode(ctx.output, &status, write_status_text, write_status_pretty)
}

fn persist(ctx: &Context, settings: &NotificationConfig) -> anyhow::Result<()> {
    let Some(path) = ctx.config_path.as_deref() else {
        return Err(CliError::new("no config location to save settings to")
            .with_suggestion("Set ORGANIZER_CONFIG to a writable file path.")
            .into());
    };
    save_settings(path, ctx, settings)
}

fn save_settings(path: &Path, ctx: &Context, settings: &NotificationConfig) -> anyhow::Result<()> {
    let mut config = ctx.config.clone();
    config.notifications = settings.clone();
    save_config_to(path, &config).context("saving notification settings")?;
    tracing::info!(
        enabled = settings.enabled,
        day_before = settings.day_before,
        day_of = settings.day_of,
        two_hours = settings.two_hours,
        "notification settings saved"
    );
    Ok(())
}

fn status_for(ctx: &Context, settings: &NotificationConfig) -> anyhow::Result<NotifyStatus> {
    let mut organizer = ctx
        .open_organizer()?
        .with_notifications(settings.enabled, settings.lead_times());
    let tasks = organizer.load_tasks()?;

    let armed = tasks
        .iter()
        .filter_map(|task| {
            let fire_at = organizer.scheduler().armed_for(&task.id);
            (!fire_at.is_empty()).then(|| ArmedTask {
                id: task.id.clone(),
                title: task.title.clone(),
                fire_at,
            })
        })
        .collect();

    Ok(NotifyStatus {
        enabled: settings.enabled,
        day_before: settings.day_before,
        day_of: settings.day_of,
        two_hours: settings.two_hours,
        pending: organizer.scheduler().pending_len(),
        armed,
    })
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn write_status_text(status: &NotifyStatus, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "enabled\t{}", on_off(status.enabled))?;
    writeln!(w, "day_before\t{}", on_off(status.day_before))?;
    writeln!(w, "day_of\t{}", on_off(status.day_of))?;
    writeln!(w, "two_hours\t{}", on_off(status.two_hours))?;
    for task in &status.armed {
        for fire_at in &task.fire_at {
            writeln!(w, "armed\t{}\t{}", task.id, fire_at.to_rfc3339())?;
        }
    }
    Ok(())
}

fn write_status_pretty(status: &NotifyStatus, w: &mut dyn Write) -> std::io::Result<()> {
    pretty_section(w, "Reminders")?;
    pretty_kv(w, "Enabled", on_off(status.enabled))?;
    pretty_kv(w, "Day before", on_off(status.day_before))?;
    pretty_kv(w, "Day of", on_off(status.day_of))?;
    pretty_kv(w, "2h before", on_off(status.two_hours))?;
    pretty_kv(w, "Pending", status.pending.to_string())?;

    if !status.armed.is_empty() {
        writeln!(w)?;
        for task in &status.armed {
            writeln!(w, "  {}  {}", task.id, task.title)?;
            for fire_at in &task.fire_at {
                writeln!(w, "      {}", view::format_timestamp(*fire_at, &Local))?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: NotifyCommand,
    }

    #[test]
    fn parses_plain_subcommands() {
        assert!(matches!(
            Wrapper::parse_from(["test", "enable"]).command,
            NotifyCommand::Enable
        ));
        assert!(matches!(
            Wrapper::parse_from(["test", "status"]).command,
            NotifyCommand::Status
        ));
    }

    #[test]
    fn set_requires_a_lead_time() {
        assert!(Wrapper::try_parse_from(["test", "set"]).is_err());
    }

    #[test]
    fn set_overrides_only_given_lead_times() {
        let Wrapper {
            command: NotifyCommand::Set(set),
        } = Wrapper::parse_from(["test", "set", "--two-hours", "off", "--day-of", "on"])
        else {
            panic!("expected set");
        };
        let lead = set.apply(LeadTimes {
            day_before: true,
            day_of: false,
            two_hours: true,
        });
        assert_eq!(
            lead,
            LeadTimes {
                day_before: true,
                day_of: true,
                two_hours: false
            }
        );
    }
}
