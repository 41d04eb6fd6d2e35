//! Push-delivered reminders.
//!
//! A push message carries an optional JSON payload. Missing or unreadable
//! payloads still produce a generic reminder.

use super::{Notification, NotificationAction, REMINDER_ICON, REMINDER_TITLE};
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_PUSH_BODY: &str = "You have a task reminder";
pub const ACTION_OPEN: &str = "open";
pub const ACTION_CLOSE: &str = "close";

const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
}

/// What a click on a push notification should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Focus or open the app at its root.
    OpenApp,
    /// Just close the notification.
    Dismiss,
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.is_empty())
}

/// Build the notification for a push message.
#[must_use]
pub fn notification_from_push(raw: Option<&str>) -> Notification {
    let data = raw.and_then(|text| match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(error = %err, "push payload is not JSON; using defaults");
            None
        }
    });
    let payload = data
        .as_ref()
        .and_then(|value| PushPayload::deserialize(value).ok())
        .unwrap_or_default();

    Notification {
        title: non_empty(payload.title).unwrap_or_else(|| REMINDER_TITLE.to_string()),
        body: non_empty(payload.body).unwrap_or_else(|| DEFAULT_PUSH_BODY.to_string()),
        tag: None,
        icon: REMINDER_ICON.to_string(),
        badge: Some(REMINDER_ICON.to_string()),
        require_interaction: false,
        vibrate: VIBRATE_PATTERN.to_vec(),
        actions: vec![
            NotificationAction {
                action: ACTION_OPEN.to_string(),
                title: "Open App".to_string(),
            },
            NotificationAction {
                action: ACTION_CLOSE.to_string(),
                title: "Close".to_string(),
            },
        ],
        data,
    }
}

/// Resolve a click. A click on the body (no action) opens the app too.
#[must_use]
pub fn click_outcome(action: Option<&str>) -> ClickOutcome {
    match action {
        None | Some("" | ACTION_OPEN) => ClickOutcome::OpenApp,
        Some(_) => ClickOutcome::Dismiss,
    }
}
