//! `org watch` — deliver reminders in the terminal.
//!
//! Arms every open task with a due date and first delivers whatever went
//! off during the last poll interval. Then it sleeps until the next fire time
//! or the poll interval, whichever comes first. Each wake-up re-reads the
//! config and the store, so `org notify` and edits from other `org`
//! invocations are picked up.

use crate::cmd::Context;
use crate::output::{CliError, OutputMode, render};
use chrono::{DateTime, Utc};
use clap::Args;
use organizer_core::Organizer;
use organizer_core::clock::Clock;
use organizer_core::config;
use organizer_core::notify::{Notification, Notifier};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Deliver reminders that went off within the last poll interval,
    /// report, and exit. Run it every `watch.poll_secs` seconds from a
    /// scheduler such as cron.
    #[arg(long)]
    pub once: bool,
}

/// Prints notifications to stdout, one per line (one JSON object per line
/// in JSON mode).
pub struct TerminalNotifier {
    output: OutputMode,
}

impl TerminalNotifier {
    pub const fn new(output: OutputMode) -> Self {
        Self { output }
    }
}

impl Notifier for TerminalNotifier {
    fn show(&mut self, notification: &Notification) -> anyhow::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self.output {
            OutputMode::Json => {
                serde_json::to_writer(&mut out, notification)?;
                writeln!(out)?;
            }
            OutputMode::Text => {
                writeln!(out, "{}\t{}", notification.title, notification.body)?;
            }
            OutputMode::Pretty => {
                writeln!(out, "\x07🔔 {}: {}", notification.title, notification.body)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WatchSummary {
    armed: usize,
    delivered: usize,
    next_fire_at: Option<DateTime<Utc>>,
}

/// Re-read reminder settings from the config file.
fn reload_settings<C: Clock>(organizer: &mut Organizer<C>, path: Option<&Path>) {
    let Some(path) = path else {
        return;
    };
    let settings = match config::load_config_from(path) {
        Ok(config) => config.notifications,
        Err(err) => {
            warn!(error = %err, "failed to reload config; keeping current settings");
            return;
        }
    };
    match organizer.apply_settings(settings.enabled, settings.lead_times()) {
        Ok(true) => info!(
            enabled = settings.enabled,
            day_before = settings.day_before,
            day_of = settings.day_of,
            two_hours = settings.two_hours,
            "reminder settings changed"
        ),
        Ok(false) => {}
        Err(err) => warn!(error = %err, "failed to apply reminder settings"),
    }
}

/// How long to sleep: until `next_fire` if that is sooner than `poll`.
fn next_sleep(next_fire: Option<DateTime<Utc>>, now: DateTime<Utc>, poll: Duration) -> Duration {
    next_fire
        .map(|at| (at - now).to_std().unwrap_or(Duration::ZERO))
        .map_or(poll, |until| until.min(poll))
}

pub fn run_watch(args: &WatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut organizer = ctx.open_organizer()?;
    if !organizer.scheduler().is_enabled() {
        return Err(CliError::new("reminders are disabled")
            .with_suggestion("Run `org notify enable` first.")
            .into());
    }

    organizer.load_tasks()?;
    let armed = organizer.scheduler().pending_len();
    let mut notifier = TerminalNotifier::new(ctx.output);
    let poll = Duration::from_secs(ctx.config.watch.poll_secs.max(1));
    info!(armed, poll_secs = poll.as_secs(), "watching for reminders");

    let window = chrono::Duration::from_std(poll)?;
    let caught_up = organizer.fire_missed(window, &mut notifier)?;

    if args.once {
        let delivered = caught_up + organizer.fire_due(&mut notifier);
        let summary = WatchSummary {
            armed,
            delivered,
            next_fire_at: organizer.next_fire_at(),
        };
        return render(ctx.output, &summary, |s, w| {
            writeln!(w, "armed\t{}", s.armed)?;
            writeln!(w, "delivered\t{}", s.delivered)?;
            match s.next_fire_at {
                Some(at) => writeln!(w, "next\t{}", at.to_rfc3339()),
                None => writeln!(w, "next\t-"),
            }
        });
    }

    loop {
        let sleep = next_sleep(organizer.next_fire_at(), organizer.clock().now(), poll);
        debug!(sleep_ms = sleep.as_millis(), "sleeping");
        std::thread::sleep(sleep);

        reload_settings(&mut organizer, ctx.config_path.as_deref());
        if let Err(err) = organizer.sync_reminders() {
            warn!(error = %err, "failed to reload tasks; keeping current reminders");
        }
        let delivered = organizer.fire_due(&mut notifier);
        if delivered > 0 {
            debug!(delivered, "delivered reminders");
        }
    }
}
