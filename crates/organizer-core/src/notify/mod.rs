//! Due-date reminders.
//!
//! - [`fire_times`] computes when the enabled lead-time reminders of a task
//!   should go off.
//! - [`scheduler::ReminderScheduler`] owns the pending timers, keyed by task.
//! - [`push`] turns push payloads into notifications with actions.
//! - A [`Notifier`] displays a [`Notification`] on whatever surface the host
//!   provides.

pub mod push;
pub mod scheduler;

use crate::clock::resolve_local;
use crate::model::Task;
use chrono::{DateTime, Days, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use scheduler::{ReminderScheduler, TimerId};

/// Title shown on every reminder.
pub const REMINDER_TITLE: &str = "Task Reminder";
/// Icon shown with reminders.
pub const REMINDER_ICON: &str = "/icon-192.png";
/// Local time at which the day-before and day-of reminders fire.
pub const MORNING_HOUR: u32 = 9;

/// Which lead-time reminders are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadTimes {
    /// The day before the due date at 09:00.
    pub day_before: bool,
    /// The due date at 09:00.
    pub day_of: bool,
    /// Two hours before the due time.
    pub two_hours: bool,
}

impl Default for LeadTimes {
    fn default() -> Self {
        Self::all()
    }
}

impl LeadTimes {
    #[must_use]
    pub const fn all() -> Self {
        Self {
            day_before: true,
            day_of: true,
            two_hours: true,
        }
    }

    #[must_use]
    pub const fn none() -> Self {
        Self {
            day_before: false,
            day_of: false,
            two_hours: false,
        }
    }

    #[must_use]
    pub const fn enabled(self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::DayBefore => self.day_before,
            ReminderKind::DayOf => self.day_of,
            ReminderKind::TwoHours => self.two_hours,
        }
    }
}

/// One of the three lead times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    DayBefore,
    DayOf,
    TwoHours,
}

impl ReminderKind {
    pub const ALL: [Self; 3] = [Self::DayBefore, Self::DayOf, Self::TwoHours];

    /// Prefix of the notification body.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::DayBefore => "Due tomorrow",
            Self::DayOf => "Due today",
            Self::TwoHours => "Due in 2 hours",
        }
    }

    /// When this reminder fires for a task due at `due`.
    ///
    /// `None` if the wall-clock time can't be represented in `zone`.
    #[must_use]
    pub fn fire_at<Z: TimeZone>(self, due: DateTime<Utc>, zone: &Z) -> Option<DateTime<Utc>> {
        let morning = NaiveTime::from_hms_opt(MORNING_HOUR, 0, 0)?;
        let local_date = due.with_timezone(zone).date_naive();
        match self {
            Self::DayBefore => {
                let date = local_date.checked_sub_days(Days::new(1))?;
                resolve_local(zone, date.and_time(morning))
            }
            Self::DayOf => resolve_local(zone, local_date.and_time(morning)),
            Self::TwoHours => due.checked_sub_signed(Duration::hours(2)),
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A reminder computed for a task, not yet armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedReminder {
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
}

fn planned<Z: TimeZone>(
    due: DateTime<Utc>,
    lead: LeadTimes,
    zone: &Z,
) -> impl Iterator<Item = PlannedReminder> + '_ {
    ReminderKind::ALL
        .into_iter()
        .filter(move |kind| lead.enabled(*kind))
        .filter_map(move |kind| {
            kind.fire_at(due, zone)
                .map(|fire_at| PlannedReminder { kind, fire_at })
        })
}

/// Reminders to arm for a task due at `due`: one per enabled lead time whose
/// fire time is strictly after `now`.
#[must_use]
pub fn fire_times<Z: TimeZone>(
    due: DateTime<Utc>,
    lead: LeadTimes,
    zone: &Z,
    now: DateTime<Utc>,
) -> Vec<PlannedReminder> {
    planned(due, lead, zone)
        .filter(|planned| planned.fire_at > now)
        .collect()
}

/// Reminders that went off in `(since, now]`, earliest first.
///
/// Timers are only armed for the future, so a host that starts late uses
/// this to catch up on what it missed.
#[must_use]
pub fn missed_between<Z: TimeZone>(
    due: DateTime<Utc>,
    lead: LeadTimes,
    zone: &Z,
    since: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<PlannedReminder> {
    let mut missed: Vec<_> = planned(due, lead, zone)
        .filter(|planned| planned.fire_at > since && planned.fire_at <= now)
        .collect();
    missed.sort_by_key(|planned| planned.fire_at);
    missed
}

/// Action button attached to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Something to show the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// De-duplication key; reminders use the task id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub icon: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    pub require_interaction: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vibrate: Vec<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub actions: Vec<NotificationAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Notification {
    /// The notification a fired reminder produces.
    #[must_use]
    pub fn reminder(kind: ReminderKind, task_id: &str, task_title: &str) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            body: format!("{}: {task_title}", kind.message()),
            tag: Some(task_id.to_string()),
            icon: REMINDER_ICON.to_string(),
            badge: None,
            require_interaction: false,
            vibrate: Vec::new(),
            actions: Vec::new(),
            data: None,
        }
    }
}

/// Displays notifications.
pub trait Notifier {
    /// # Errors
    ///
    /// Returns an error if the notification surface rejects the notification.
    fn show(&mut self, notification: &Notification) -> anyhow::Result<()>;
}

/// Collects notifications in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    pub shown: Vec<Notification>,
}

impl Notifier for MemoryNotifier {
    fn show(&mut self, notification: &Notification) -> anyhow::Result<()> {
        self.shown.push(notification.clone());
        Ok(())
    }
}

/// Whether a task is eligible for reminders at all.
#[must_use]
pub const fn wants_reminders(task: &Task) -> bool {
    task.due_date.is_some() && !task.is_completed
}
