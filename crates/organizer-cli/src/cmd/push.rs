//! `org push` — render the notification a push message would produce.
//!
//! With `--action`, also report what clicking that action does.

use crate::output::{OutputMode, pretty_kv, render_mode};
use clap::Args;
use organizer_core::notify::Notification;
use organizer_core::notify::push::{ClickOutcome, click_outcome, notification_from_push};
use serde::Serialize;
use std::io::Write;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Raw push payload, usually JSON with `title` and `body`.
    #[arg(long, value_name = "JSON")]
    pub payload: Option<String>,

    /// Simulate a click on this action (`open`, `close`, or "" for the body).
    #[arg(long, value_name = "ACTION")]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
struct PushView {
    notification: Notification,
    #[serde(skip_serializing_if = "Option::is_none")]
    click: Option<&'static str>,
}

const fn outcome_label(outcome: ClickOutcome) -> &'static str {
    match outcome {
        ClickOutcome::OpenApp => "open_app",
        ClickOutcome::Dismiss => "dismiss",
    }
}

pub fn run_push(args: &PushArgs, output: OutputMode) -> anyhow::Result<()> {
    let view = PushView {
        notification: notification_from_push(args.payload.as_deref()),
        click: args
            .action
            .as_ref()
            .map(|action| outcome_label(click_outcome(Some(action.as_str())))),
    };

    render_mode(
        output,
        &view,
        |view, w| {
            writeln!(w, "{}\t{}", view.notification.title, view.notification.body)?;
            if let Some(click) = view.click {
                writeln!(w, "click\t{click}")?;
            }
            Ok(())
        },
        |view, w| {
            let n = &view.notification;
            pretty_kv(w, "Title", &n.title)?;
            pretty_kv(w, "Body", &n.body)?;
            let actions: Vec<&str> = n.actions.iter().map(|a| a.title.as_str()).collect();
            pretty_kv(w, "Actions", actions.join(", "))?;
            if let Some(click) = view.click {
                pretty_kv(w, "Click", click)?;
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: PushArgs,
    }

    #[test]
    fn all_flags_optional() {
        let w = Wrapper::parse_from(["test"]);
        assert!(w.args.payload.is_none());
        assert!(w.args.action.is_none());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(outcome_label(click_outcome(Some("open"))), "open_app");
        assert_eq!(outcome_label(click_outcome(Some(""))), "open_app");
        assert_eq!(outcome_label(click_outcome(Some("close"))), "dismiss");
    }
}
