//! Immutable UI snapshots.
//!
//! Hosts keep one [`ViewState`] and at most one [`TaskForm`]; every
//! transition consumes the old value and returns the next one.

use crate::error::TaskError;
use crate::model::{ChecklistDraft, Recurrence, Task, TaskDraft};
use crate::view::{self, Tab};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// What the list shows: tab, search text, and which tasks are expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub tab: Tab,
    pub search: String,
    expanded: BTreeSet<String>,
}

impl ViewState {
    #[must_use]
    pub fn with_tab(self, tab: Tab) -> Self {
        Self { tab, ..self }
    }

    #[must_use]
    pub fn with_search(self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self
        }
    }

    #[must_use]
    pub fn toggle_expanded(mut self, task_id: &str) -> Self {
        if !self.expanded.remove(task_id) {
            self.expanded.insert(task_id.to_string());
        }
        self
    }

    #[must_use]
    pub fn is_expanded(&self, task_id: &str) -> bool {
        self.expanded.contains(task_id)
    }

    /// Tasks this state shows, split into pinned and regular.
    #[must_use]
    pub fn visible<'a>(&self, tasks: &'a [Task]) -> (Vec<&'a Task>, Vec<&'a Task>) {
        view::partition_pinned(view::filter_tasks(tasks, self.tab, &self.search))
    }

    /// Fresh state, as after signing out.
    #[must_use]
    pub fn reset(self) -> Self {
        Self::default()
    }
}

/// The add/edit form before it's saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub checklist: Vec<ChecklistDraft>,
    pub recurrence: Option<Recurrence>,
}

impl TaskForm {
    /// Empty form for a new task.
    #[must_use]
    pub const fn blank() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: None,
            is_pinned: false,
            checklist: Vec::new(),
            recurrence: None,
        }
    }

    /// Form pre-filled from an existing task, checklist included.
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task.due_date,
            is_pinned: task.is_pinned,
            checklist: task
                .checklist
                .iter()
                .map(|item| ChecklistDraft {
                    text: item.text.clone(),
                    is_checked: item.is_checked,
                })
                .collect(),
            recurrence: task.recurrence,
        }
    }

    #[must_use]
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self
        }
    }

    #[must_use]
    pub fn with_due_date(self, due_date: Option<DateTime<Utc>>) -> Self {
        Self { due_date, ..self }
    }

    #[must_use]
    pub fn with_pinned(self, is_pinned: bool) -> Self {
        Self { is_pinned, ..self }
    }

    /// `None` turns recurrence off.
    #[must_use]
    pub fn with_recurrence(self, recurrence: Option<Recurrence>) -> Self {
        Self { recurrence, ..self }
    }

    /// Append an unchecked item.
    #[must_use]
    pub fn add_checklist_item(mut self, text: impl Into<String>) -> Self {
        self.checklist.push(ChecklistDraft {
            text: text.into(),
            is_checked: false,
        });
        self
    }

    /// Flip the item at `index`; out-of-range indexes are ignored.
    #[must_use]
    pub fn toggle_checklist_item(mut self, index: usize) -> Self {
        if let Some(item) = self.checklist.get_mut(index) {
            item.is_checked = !item.is_checked;
        }
        self
    }

    /// Drop the item at `index`; out-of-range indexes are ignored.
    #[must_use]
    pub fn remove_checklist_item(mut self, index: usize) -> Self {
        if index < self.checklist.len() {
            self.checklist.remove(index);
        }
        self
    }

    /// Validate and turn the form into a draft at `position`.
    ///
    /// The title is trimmed and must not be empty. Checklist texts are
    /// trimmed and blank lines dropped; the store numbers what's left.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::EmptyTitle`] when the trimmed title is empty.
    pub fn into_draft(self, position: i64) -> Result<TaskDraft, TaskError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }

        let checklist = self
            .checklist
            .into_iter()
            .filter_map(|item| {
                let text = item.text.trim();
                (!text.is_empty()).then(|| ChecklistDraft {
                    text: text.to_string(),
                    is_checked: item.is_checked,
                })
            })
            .collect();

        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description,
            is_pinned: self.is_pinned,
            due_date: self.due_date,
            position,
            recurrence: self.recurrence,
            checklist,
        })
    }
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChecklistItem, Interval, RecurrenceKind};
    use chrono::TimeZone;

    #[test]
    fn view_state_transitions() {
        let state = ViewState::default()
            .with_tab(Tab::Upcoming)
            .with_search("milk")
            .toggle_expanded("tk-a")
            .toggle_expanded("tk-b")
            .toggle_expanded("tk-a");

        assert_eq!(state.tab, Tab::Upcoming);
        assert_eq!(state.search, "milk");
        assert!(!state.is_expanded("tk-a"));
        assert!(state.is_expanded("tk-b"));

        let cleared = state.reset();
        assert_eq!(cleared, ViewState::default());
        assert_eq!(cleared.tab, Tab::Main);
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = TaskForm::blank().with_title("   ").into_draft(0).unwrap_err();
        assert_eq!(err, TaskError::EmptyTitle);
    }

    #[test]
    fn draft_trims_and_drops_blank_checklist_lines() {
        let draft = TaskForm::blank()
            .with_title("  Pack  ")
            .add_checklist_item(" passport ")
            .add_checklist_item("   ")
            .add_checklist_item("socks")
            .toggle_checklist_item(2)
            .into_draft(7)
            .unwrap();

        assert_eq!(draft.title, "Pack");
        assert_eq!(draft.position, 7);
        let lines: Vec<_> = draft
            .checklist
            .iter()
            .map(|i| (i.text.as_str(), i.is_checked))
            .collect();
        assert_eq!(lines, vec![("passport", false), ("socks", true)]);
    }

    #[test]
    fn checklist_edits_ignore_bad_indexes() {
        let form = TaskForm::blank()
            .add_checklist_item("a")
            .add_checklist_item("b")
            .remove_checklist_item(0)
            .remove_checklist_item(9)
            .toggle_checklist_item(9);
        assert_eq!(form.checklist.len(), 1);
        assert_eq!(form.checklist[0].text, "b");
        assert!(!form.checklist[0].is_checked);
    }

    #[test]
    fn visible_follows_tab_and_search() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let make = |id: &str, title: &str, pinned: bool, done: bool| Task {
            id: id.into(),
            owner: "alice".into(),
            title: title.into(),
            description: String::new(),
            is_pinned: pinned,
            is_completed: done,
            due_date: None,
            completed_at: done.then_some(ts),
            position: 0,
            recurrence: None,
            created_at: ts,
            updated_at: ts,
            checklist: Vec::new(),
        };
        let tasks = vec![
            make("tk-a", "Buy milk", true, false),
            make("tk-b", "Buy bread", false, false),
            make("tk-c", "Call mom", false, false),
            make("tk-d", "Buy eggs", false, true),
        ];

        let state = ViewState::default().with_search("buy");
        let (pinned, regular) = state.visible(&tasks);
        assert_eq!(pinned.len(), 1);
        assert_eq!(pinned[0].id, "tk-a");
        assert_eq!(regular.len(), 1);
        assert_eq!(regular[0].id, "tk-b");

        let (pinned, regular) = state.with_tab(Tab::Completed).visible(&tasks);
        assert!(pinned.is_empty());
        assert_eq!(regular[0].id, "tk-d");
    }

    #[test]
    fn from_task_copies_fields_and_checklist() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let task = Task {
            id: "tk-a".into(),
            owner: "alice".into(),
            title: "Run 3".into(),
            description: "easy".into(),
            is_pinned: true,
            is_completed: false,
            due_date: Some(ts),
            completed_at: None,
            position: 3,
            recurrence: Some(Recurrence::new(RecurrenceKind::Progressive, Interval::Daily)),
            created_at: ts,
            updated_at: ts,
            checklist: vec![ChecklistItem {
                id: "ci-1".into(),
                task_id: "tk-a".into(),
                text: "shoes".into(),
                is_checked: true,
                position: 0,
            }],
        };

        let form = TaskForm::from_task(&task);
        assert_eq!(form.title, "Run 3");
        assert_eq!(form.due_date, Some(ts));
        assert!(form.is_pinned);
        assert_eq!(form.recurrence, task.recurrence);
        assert_eq!(
            form.checklist,
            vec![ChecklistDraft {
                text: "shoes".into(),
                is_checked: true
            }]
        );

        let draft = form.with_recurrence(None).into_draft(task.position).unwrap();
        assert!(draft.recurrence.is_none());
        assert_eq!(draft.position, 3);
    }
}
