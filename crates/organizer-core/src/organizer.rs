//! Task service: store writes plus reminder bookkeeping.
//!
//! An [`Organizer`] is scoped to one owner. Every mutation goes through here
//! so the reminder timers stay in step with what's in the store:
//!
//! - saving a task re-arms its reminders
//! - completing cancels them; completing a recurring task also inserts the
//!   next occurrence in the same transaction and arms that instead
//! - reopening re-arms, deleting cancels
//!
//! Timers live only as long as the `Organizer`. Hosts that deliver reminders
//! call [`Organizer::load_tasks`] once and then [`Organizer::sync_reminders`]
//! to pick up writes made by other processes.

use crate::clock::Clock;
use crate::db::{query, write};
use crate::error::TaskError;
use crate::model::{ChecklistItem, Task};
use crate::notify::{
    LeadTimes, Notification, Notifier, ReminderScheduler, missed_between, wants_reminders,
};
use crate::recurrence;
use crate::state::TaskForm;
use crate::view::{self, Tab};
use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of [`Organizer::toggle_complete`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    /// The toggled task as stored afterwards.
    pub task: Task,
    /// Next occurrence created by completing a recurring task.
    pub spawned: Option<Task>,
}

/// Counts from one [`Organizer::sync_reminders`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Tasks whose reminders were (re-)armed.
    pub rearmed: usize,
    /// Tasks that vanished and had their reminders dropped.
    pub dropped: usize,
    /// Tasks left as they were.
    pub unchanged: usize,
}

/// Fields that decide what a task's reminders look like.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReminderKey {
    title: String,
    due_date: Option<DateTime<Utc>>,
    is_completed: bool,
}

impl ReminderKey {
    fn of(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            due_date: task.due_date,
            is_completed: task.is_completed,
        }
    }
}

pub struct Organizer<C: Clock> {
    conn: Connection,
    owner: String,
    clock: C,
    scheduler: ReminderScheduler,
    seen: HashMap<String, ReminderKey>,
}

impl<C: Clock> Organizer<C> {
    /// Service for `owner` over an open, migrated store. Reminders start
    /// disabled.
    pub fn new(conn: Connection, owner: impl Into<String>, clock: C) -> Self {
        Self {
            conn,
            owner: owner.into(),
            clock,
            scheduler: ReminderScheduler::default(),
            seen: HashMap::new(),
        }
    }

    /// Set whether reminders are delivered and which lead times apply.
    #[must_use]
    pub fn with_notifications(mut self, enabled: bool, lead: LeadTimes) -> Self {
        self.scheduler = ReminderScheduler::new(enabled, lead);
        self
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    #[must_use]
    pub const fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    /// The owner's tasks in store order, without touching reminders.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn tasks(&self) -> Result<Vec<Task>> {
        query::list_tasks(&self.conn, &self.owner)
    }

    /// Load the owner's tasks and arm reminders for each of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn load_tasks(&mut self) -> Result<Vec<Task>> {
        let tasks = self.tasks()?;
        let mut armed = 0;
        for task in &tasks {
            armed += self.arm(task);
        }
        debug!(owner = %self.owner, tasks = tasks.len(), armed, "loaded tasks");
        Ok(tasks)
    }

    /// Resolve user input (full id or unique prefix) to one of the owner's
    /// task ids.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] or [`TaskError::AmbiguousId`].
    pub fn resolve_task(&self, input: &str) -> Result<String> {
        query::resolve_task_id(&self.conn, &self.owner, input)
    }

    /// Fetch one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] if the task is missing or belongs to
    /// someone else.
    pub fn get_task(&self, task_id: &str) -> Result<Task> {
        match query::get_task(&self.conn, task_id)? {
            Some(task) if task.owner == self.owner => Ok(task),
            _ => Err(TaskError::NotFound(task_id.to_string()).into()),
        }
    }

    /// Create a task from `form`, or update `editing` with it.
    ///
    /// New tasks go to the end (position = current task count). Edits keep
    /// the task's position and completion state and replace its checklist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::EmptyTitle`] for a blank title,
    /// [`TaskError::NotFound`] for an unknown `editing` id, or a store error.
    pub fn save_task(&mut self, form: TaskForm, editing: Option<&str>) -> Result<Task> {
        let position = match editing {
            Some(task_id) => self.get_task(task_id)?.position,
            None => query::count_tasks(&self.conn, &self.owner)?,
        };
        let draft = form.into_draft(position)?;
        let now = self.clock.now();

        let tx = self.conn.transaction().context("begin save")?;
        let task_id = if let Some(task_id) = editing {
            write::update_task_fields(&tx, task_id, &draft, now)?;
            write::replace_checklist(&tx, task_id, &draft.checklist, now)?;
            task_id.to_string()
        } else {
            write::insert_task(&tx, &self.owner, &draft, now)?
        };
        tx.commit().context("commit save")?;

        let task = self.get_task(&task_id)?;
        let armed = self.arm(&task);
        info!(
            task = %task.id,
            created = editing.is_none(),
            reminders = armed,
            "saved task"
        );
        Ok(task)
    }

    /// Flip a task between open and completed.
    ///
    /// Completing a recurring task inserts its next occurrence in the same
    /// transaction; if that insert fails the completion is rolled back.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] or a store error.
    pub fn toggle_complete(&mut self, task_id: &str) -> Result<Completion> {
        let task = self.get_task(task_id)?;
        let now = self.clock.now();
        let completing = !task.is_completed;

        let next = if completing {
            recurrence::next_occurrence(&task, &self.clock.zone())
        } else {
            None
        };

        let tx = self.conn.transaction().context("begin completion")?;
        write::set_completion(&tx, &task.id, completing.then_some(now), now)?;
        let spawned_id = match next {
            Some(draft) => Some(write::insert_task(&tx, &self.owner, &draft, now)?),
            None => None,
        };
        tx.commit().context("commit completion")?;

        let task = self.get_task(&task.id)?;
        let spawned = spawned_id.map(|id| self.get_task(&id)).transpose()?;

        if completing {
            self.scheduler.cancel(&task.id);
            self.seen.insert(task.id.clone(), ReminderKey::of(&task));
        } else {
            self.arm(&task);
        }
        if let Some(next) = &spawned {
            self.arm(next);
            info!(task = %task.id, next = %next.id, title = %next.title, "spawned next occurrence");
        }
        info!(task = %task.id, completed = task.is_completed, "toggled completion");

        Ok(Completion { task, spawned })
    }

    /// Delete a task and cancel its reminders.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] or a store error.
    pub fn delete_task(&mut self, task_id: &str) -> Result<Task> {
        let task = self.get_task(task_id)?;
        self.scheduler.cancel(&task.id);
        self.seen.remove(&task.id);
        write::delete_task(&self.conn, &task.id)?;
        info!(task = %task.id, "deleted task");
        Ok(task)
    }

    /// Replace a task's description with `text`, trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::NotFound`] or a store error.
    pub fn save_description(&mut self, task_id: &str, text: &str) -> Result<Task> {
        let task = self.get_task(task_id)?;
        write::update_description(&self.conn, &task.id, text.trim(), self.clock.now())?;
        debug!(task = %task.id, "saved description");
        self.get_task(&task.id)
    }

    /// Flip one checklist item, found by id or unique prefix.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::ChecklistItemNotFound`], [`TaskError::AmbiguousId`]
    /// or a store error.
    pub fn toggle_checklist_item(&mut self, item: &str) -> Result<ChecklistItem> {
        let mut item = query::resolve_checklist_item(&self.conn, &self.owner, item)?;
        item.is_checked = write::toggle_checklist_item(&self.conn, &item.id, self.clock.now())?;
        debug!(item = %item.id, checked = item.is_checked, "toggled checklist item");
        Ok(item)
    }

    /// Move the regular (unpinned) task at `from` to `to` within the list
    /// `tab` and `search` show, then renumber that list from 0.
    ///
    /// Returns the task ids in their new order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidMove`] when an index is out of range, or a
    /// store error.
    pub fn reorder(
        &mut self,
        tab: Tab,
        search: &str,
        from: usize,
        to: usize,
    ) -> Result<Vec<String>> {
        let tasks = self.tasks()?;
        let (_, regular) = view::partition_pinned(view::filter_tasks(&tasks, tab, search));
        let mut ids: Vec<String> = regular.iter().map(|task| task.id.clone()).collect();

        if from >= ids.len() || to >= ids.len() {
            return Err(TaskError::InvalidMove(format!(
                "position {} is outside 0..{}",
                from.max(to),
                ids.len()
            ))
            .into());
        }
        let moved = ids.remove(from);
        ids.insert(to, moved);

        let now = self.clock.now();
        let tx = self.conn.transaction().context("begin reorder")?;
        for (position, task_id) in (0_i64..).zip(&ids) {
            write::set_position(&tx, task_id, position, now)?;
        }
        tx.commit().context("commit reorder")?;

        info!(tab = %tab, from, to, count = ids.len(), "reordered tasks");
        Ok(ids)
    }

    /// [`reorder`](Self::reorder) addressed by task id instead of index.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::InvalidMove`] when the task is pinned or not in
    /// the list, or whatever [`reorder`](Self::reorder) returns.
    pub fn move_task(
        &mut self,
        task_id: &str,
        tab: Tab,
        search: &str,
        to: usize,
    ) -> Result<Vec<String>> {
        let task = self.get_task(task_id)?;
        if task.is_pinned {
            return Err(TaskError::InvalidMove(format!("{} is pinned", task.id)).into());
        }
        let tasks = self.tasks()?;
        let (_, regular) = view::partition_pinned(view::filter_tasks(&tasks, tab, search));
        let from = regular
            .iter()
            .position(|candidate| candidate.id == task.id)
            .ok_or_else(|| TaskError::InvalidMove(format!("{} is not on the {tab} tab", task.id)))?;
        self.reorder(tab, search, from, to)
    }

    /// Turn reminders on and arm every eligible task. Returns the number of
    /// timers armed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn enable_notifications(&mut self) -> Result<usize> {
        self.scheduler.set_enabled(true);
        info!(owner = %self.owner, "notifications enabled");
        self.reschedule_all()
    }

    /// Turn reminders off and drop every pending timer.
    pub fn disable_notifications(&mut self) {
        self.scheduler.set_enabled(false);
        self.seen.clear();
        info!(owner = %self.owner, "notifications disabled");
    }

    /// Change lead times and re-arm everything with them.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn set_lead_times(&mut self, lead: LeadTimes) -> Result<usize> {
        self.scheduler.set_lead_times(lead);
        self.reschedule_all()
    }

    /// Bring the scheduler in line with settings read back from the config.
    ///
    /// Returns `true` when anything changed. Disabling drops every timer;
    /// enabling or changing lead times re-arms from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn apply_settings(&mut self, enabled: bool, lead: LeadTimes) -> Result<bool> {
        let was_enabled = self.scheduler.is_enabled();
        let lead_changed = self.scheduler.lead_times() != lead;
        match (was_enabled, enabled) {
            (true, false) => {
                self.scheduler.set_lead_times(lead);
                self.disable_notifications();
            }
            (false, true) => {
                self.scheduler.set_lead_times(lead);
                self.enable_notifications()?;
            }
            (true, true) if lead_changed => {
                self.set_lead_times(lead)?;
            }
            (false, false) => self.scheduler.set_lead_times(lead),
            (true, true) => return Ok(false),
        }
        Ok(was_enabled != enabled || lead_changed)
    }

    /// Drop every timer and arm again from the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn reschedule_all(&mut self) -> Result<usize> {
        let tasks = self.tasks()?;
        self.scheduler.clear();
        self.seen.clear();
        let armed: usize = tasks.iter().map(|task| self.arm(task)).sum();
        debug!(owner = %self.owner, armed, "rescheduled reminders");
        Ok(armed)
    }

    /// Reload from the store and bring the timers in line with it.
    ///
    /// New tasks and tasks whose title, due date or completion changed are
    /// re-armed; tasks that disappeared lose their timers.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn sync_reminders(&mut self) -> Result<SyncReport> {
        let tasks = self.tasks()?;
        let mut report = SyncReport::default();

        let mut stale: Vec<String> = self.seen.keys().cloned().collect();
        for task in &tasks {
            stale.retain(|id| id != &task.id);
            if self.seen.get(&task.id) == Some(&ReminderKey::of(task)) {
                report.unchanged += 1;
            } else {
                self.arm(task);
                report.rearmed += 1;
            }
        }
        for task_id in stale {
            self.scheduler.cancel(&task_id);
            self.seen.remove(&task_id);
            report.dropped += 1;
        }

        if report.rearmed > 0 || report.dropped > 0 {
            debug!(rearmed = report.rearmed, dropped = report.dropped, "synced reminders");
        }
        Ok(report)
    }

    /// Show every reminder due by now. Returns how many were delivered.
    ///
    /// A notifier failure is logged and the rest are still attempted.
    pub fn fire_due(&mut self, notifier: &mut dyn Notifier) -> usize {
        let mut delivered = 0;
        for notification in self.scheduler.fire_due(self.clock.now()) {
            match notifier.show(&notification) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(
                    tag = ?notification.tag,
                    error = %err,
                    "failed to show notification"
                ),
            }
        }
        delivered
    }

    /// Show reminders that went off within `window` before now.
    ///
    /// Armed timers only cover the future, so a host starting up uses this
    /// for whatever it wasn't around to deliver. Only open tasks with a due
    /// date count, and only when reminders are enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the store query fails.
    pub fn fire_missed(&mut self, window: Duration, notifier: &mut dyn Notifier) -> Result<usize> {
        if !self.scheduler.is_enabled() {
            return Ok(0);
        }
        let now = self.clock.now();
        let since = now.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let zone = self.clock.zone();
        let lead = self.scheduler.lead_times();

        let mut missed: Vec<(DateTime<Utc>, Notification)> = Vec::new();
        for task in self.tasks()?.iter().filter(|task| wants_reminders(task)) {
            let Some(due) = task.due_date else { continue };
            for planned in missed_between(due, lead, &zone, since, now) {
                missed.push((
                    planned.fire_at,
                    Notification::reminder(planned.kind, &task.id, &task.title),
                ));
            }
        }
        missed.sort_by_key(|(fire_at, _)| *fire_at);

        let mut delivered = 0;
        for (fire_at, notification) in missed {
            match notifier.show(&notification) {
                Ok(()) => delivered += 1,
                Err(err) => warn!(
                    tag = ?notification.tag,
                    %fire_at,
                    error = %err,
                    "failed to show missed notification"
                ),
            }
        }
        if delivered > 0 {
            info!(delivered, window_secs = window.num_seconds(), "delivered missed reminders");
        }
        Ok(delivered)
    }

    /// Earliest pending reminder.
    #[must_use]
    pub fn next_fire_at(&self) -> Option<DateTime<Utc>> {
        self.scheduler.next_fire_at()
    }

    fn arm(&mut self, task: &Task) -> usize {
        self.seen.insert(task.id.clone(), ReminderKey::of(task));
        self.scheduler.arm(task, self.clock.now(), &self.clock.zone())
    }
}
