use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How a recurring task's title evolves between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    /// Same title and description every cycle.
    Simple,
    /// The first number in the title increments; description resets.
    Progressive,
}

impl RecurrenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Progressive => "progressive",
        }
    }
}

/// Distance between a task's due date and its successor's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

/// Recurrence descriptor. A task without one does not recur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    pub interval: Interval,
}

impl Recurrence {
    #[must_use]
    pub const fn new(kind: RecurrenceKind, interval: Interval) -> Self {
        Self { kind, interval }
    }
}

impl Default for Recurrence {
    /// The defaults a fresh form offers: simple, weekly.
    fn default() -> Self {
        Self::new(RecurrenceKind::Simple, Interval::Weekly)
    }
}

/// One line of a task's checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub task_id: String,
    pub text: String,
    pub is_checked: bool,
    pub position: i64,
}

/// A persisted task with its checklist attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub owner: String,
    pub title: String,
    pub description: String,
    pub is_pinned: bool,
    pub is_completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub position: i64,
    pub recurrence: Option<Recurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl Task {
    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }

    /// `(checked, total)` over the checklist.
    #[must_use]
    pub fn checklist_progress(&self) -> (usize, usize) {
        let checked = self.checklist.iter().filter(|i| i.is_checked).count();
        (checked, self.checklist.len())
    }
}

/// Checklist line of a draft; ids are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDraft {
    pub text: String,
    pub is_checked: bool,
}

/// Task fields before they are written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub is_pinned: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub position: i64,
    pub recurrence: Option<Recurrence>,
    pub checklist: Vec<ChecklistDraft>,
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for RecurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.interval)
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase()
}

impl FromStr for RecurrenceKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "simple" => Ok(Self::Simple),
            "progressive" => Ok(Self::Progressive),
            _ => Err(ParseEnumError {
                expected: "recurrence type",
                got: s.to_string(),
            }),
        }
    }
}

impl FromStr for Interval {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseEnumError {
                expected: "interval",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_task() -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: "tk-sample01".into(),
            owner: "alice".into(),
            title: "Sample".into(),
            description: String::new(),
            is_pinned: false,
            is_completed: false,
            due_date: None,
            completed_at: None,
            position: 0,
            recurrence: None,
            created_at: ts,
            updated_at: ts,
            checklist: Vec::new(),
        }
    }

    #[test]
    fn enum_json_uses_lowercase() {
        assert_eq!(
            serde_json::to_string(&RecurrenceKind::Progressive).unwrap(),
            "\"progressive\""
        );
        assert_eq!(
            serde_json::from_str::<Interval>("\"monthly\"").unwrap(),
            Interval::Monthly
        );
    }

    #[test]
    fn parse_is_case_insensitive_and_rejects_unknown() {
        assert_eq!(
            RecurrenceKind::from_str(" Simple ").unwrap(),
            RecurrenceKind::Simple
        );
        assert_eq!(Interval::from_str("WEEKLY").unwrap(), Interval::Weekly);
        let err = Interval::from_str("yearly").unwrap_err();
        assert_eq!(err.to_string(), "invalid interval: 'yearly'");
        assert!(RecurrenceKind::from_str("fancy").is_err());
    }

    #[test]
    fn default_recurrence_is_simple_weekly() {
        let r = Recurrence::default();
        assert_eq!(r.kind, RecurrenceKind::Simple);
        assert_eq!(r.interval, Interval::Weekly);
        assert_eq!(r.to_string(), "simple weekly");
    }

    #[test]
    fn checklist_progress_counts_checked() {
        let mut task = sample_task();
        assert_eq!(task.checklist_progress(), (0, 0));
        for (i, checked) in [true, false, true].into_iter().enumerate() {
            task.checklist.push(ChecklistItem {
                id: format!("ci-{i}"),
                task_id: task.id.clone(),
                text: format!("step {i}"),
                is_checked: checked,
                position: i64::try_from(i).unwrap(),
            });
        }
        assert_eq!(task.checklist_progress(), (2, 3));
        assert!(!task.is_recurring());
    }
}
