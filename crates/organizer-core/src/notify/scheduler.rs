//! Pending reminder timers.
//!
//! The scheduler is the single owner of timer handles. Each task id maps to
//! the timers armed for it, so re-arming a task always cancels what it had
//! before. Nothing here outlives the process: hosts re-arm from the store on
//! every load.
//!
//! Timers don't run on their own. The host asks for [`ReminderScheduler::next_fire_at`],
//! waits, then collects whatever is due with [`ReminderScheduler::fire_due`].

use super::{LeadTimes, Notification, ReminderKind, fire_times, wants_reminders};
use crate::model::Task;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

/// Handle of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct PendingReminder {
    task_id: String,
    task_title: String,
    kind: ReminderKind,
}

/// Owns every armed reminder timer.
#[derive(Debug)]
pub struct ReminderScheduler {
    enabled: bool,
    lead: LeadTimes,
    next_id: u64,
    by_task: HashMap<String, Vec<TimerId>>,
    /// Ordered by fire time, then arming order.
    queue: BTreeMap<(DateTime<Utc>, TimerId), PendingReminder>,
}

impl ReminderScheduler {
    #[must_use]
    pub fn new(enabled: bool, lead: LeadTimes) -> Self {
        Self {
            enabled,
            lead,
            next_id: 0,
            by_task: HashMap::new(),
            queue: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub const fn lead_times(&self) -> LeadTimes {
        self.lead
    }

    /// Turn delivery on or off. Turning it off drops every pending timer.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Change the lead times used by future [`arm`](Self::arm) calls.
    ///
    /// Already armed timers are untouched until their task is re-armed.
    pub fn set_lead_times(&mut self, lead: LeadTimes) {
        self.lead = lead;
    }

    /// Arm reminders for `task`, replacing any it already had.
    ///
    /// Returns the number of timers armed. Tasks without a due date,
    /// completed tasks, and a disabled scheduler arm nothing (but still
    /// cancel the old timers).
    pub fn arm<Z: TimeZone>(&mut self, task: &Task, now: DateTime<Utc>, zone: &Z) -> usize {
        self.cancel(&task.id);

        if !self.enabled || !wants_reminders(task) {
            return 0;
        }
        let Some(due) = task.due_date else {
            return 0;
        };

        let planned = fire_times(due, self.lead, zone, now);
        let mut handles = Vec::with_capacity(planned.len());
        for reminder in planned {
            let id = TimerId(self.next_id);
            self.next_id += 1;
            self.queue.insert(
                (reminder.fire_at, id),
                PendingReminder {
                    task_id: task.id.clone(),
                    task_title: task.title.clone(),
                    kind: reminder.kind,
                },
            );
            debug!(task = %task.id, kind = ?reminder.kind, fire_at = %reminder.fire_at, "armed reminder");
            handles.push(id);
        }

        let armed = handles.len();
        if armed > 0 {
            self.by_task.insert(task.id.clone(), handles);
        }
        armed
    }

    /// Cancel every timer armed for `task_id`. Returns how many were pending.
    pub fn cancel(&mut self, task_id: &str) -> usize {
        let Some(handles) = self.by_task.remove(task_id) else {
            return 0;
        };
        let before = self.queue.len();
        self.queue.retain(|(_, id), _| !handles.contains(id));
        let cancelled = before - self.queue.len();
        if cancelled > 0 {
            debug!(task = %task_id, cancelled, "cancelled reminders");
        }
        cancelled
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.by_task.clear();
        self.queue.clear();
    }

    /// Remove and return the notifications whose fire time is at or before
    /// `now`, earliest first.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> Vec<Notification> {
        let mut fired = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            let (fire_at, id) = *entry.key();
            if fire_at > now {
                break;
            }
            let pending = entry.remove();
            if let Some(handles) = self.by_task.get_mut(&pending.task_id) {
                handles.retain(|h| *h != id);
                if handles.is_empty() {
                    self.by_task.remove(&pending.task_id);
                }
            }
            info!(task = %pending.task_id, kind = ?pending.kind, "reminder fired");
            fired.push(Notification::reminder(
                pending.kind,
                &pending.task_id,
                &pending.task_title,
            ));
        }
        fired
    }

    /// Earliest pending fire time.
    #[must_use]
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.queue.keys().next().map(|(at, _)| *at)
    }

    /// Fire times currently armed for `task_id`, earliest first.
    #[must_use]
    pub fn armed_for(&self, task_id: &str) -> Vec<DateTime<Utc>> {
        let Some(handles) = self.by_task.get(task_id) else {
            return Vec::new();
        };
        self.queue
            .keys()
            .filter(|(_, id)| handles.contains(id))
            .map(|(at, _)| *at)
            .collect()
    }

    /// Total number of pending timers.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }
}

impl Default for ReminderScheduler {
    fn default() -> Self {
        Self::new(false, LeadTimes::default())
    }
}
